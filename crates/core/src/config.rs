//! Configuration system for the simulator.
//!
//! This module defines all configuration structures used to parameterize the
//! simulator. It provides:
//! 1. **Defaults:** Baseline hardware constants (memory size, hart count,
//!    cache geometry, scheduling slice).
//! 2. **Structures:** Hierarchical config for general, feature, memory, and
//!    cache settings.
//! 3. **Feature gating:** The statically-known feature switches consulted on
//!    every status-register write.
//!
//! Configuration is supplied as JSON (`serde_json`) or via `Config::default()`
//! for the CLI.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden.
mod defaults {
    /// Total size of simulated physical memory (128 MiB).
    pub const MEM_SIZE: usize = 128 * 1024 * 1024;

    /// Number of harts constructed by the harness.
    pub const NHARTS: usize = 1;

    /// Entry point assigned to hart 0 when none is given.
    pub const START_PC: u64 = 0;

    /// Instructions retired per hart per scheduling slice.
    pub const STEPS_PER_SLICE: usize = 100;

    /// Default cache set count.
    pub const CACHE_SETS: usize = 64;

    /// Default cache associativity (number of ways).
    pub const CACHE_WAYS: usize = 2;

    /// Default cache line size in bytes.
    pub const CACHE_LINE: usize = 64;
}

/// Build-time feature switches.
///
/// Presence or absence of each feature is statically known for a processor:
/// the corresponding enable bit in the status register is silently masked
/// off on every write when the feature is disabled. Evaluated at processor
/// construction, replacing per-write conditional compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FeatureSet {
    /// 64-bit addressing modes (SX/UX status bits).
    #[serde(default = "FeatureSet::default_on")]
    pub rv64: bool,

    /// Floating-point unit (EF status bit).
    #[serde(default = "FeatureSet::default_on")]
    pub fpu: bool,

    /// Compressed instruction encoding (EC status bit).
    #[serde(default = "FeatureSet::default_on")]
    pub compressed: bool,

    /// Vector-thread extension (EV status bit).
    #[serde(default = "FeatureSet::default_on")]
    pub vector: bool,
}

impl FeatureSet {
    /// Every feature defaults to present.
    fn default_on() -> bool {
        true
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            rv64: true,
            fpu: true,
            compressed: true,
            vector: true,
        }
    }
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use vtsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.general.nharts, 1);
/// assert!(config.features.fpu);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Build-time feature switches.
    #[serde(default)]
    pub features: FeatureSet,
    /// Physical memory configuration.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Cache statistics sink configuration.
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Number of harts to construct.
    #[serde(default = "GeneralConfig::default_nharts")]
    pub nharts: usize,

    /// Entry point for hart 0.
    #[serde(default = "GeneralConfig::default_start_pc")]
    pub start_pc: u64,

    /// Emit a disassembly line for every retired instruction.
    #[serde(default)]
    pub trace: bool,

    /// Instructions retired per hart per scheduling slice.
    #[serde(default = "GeneralConfig::default_steps_per_slice")]
    pub steps_per_slice: usize,
}

impl GeneralConfig {
    /// Returns the default hart count.
    fn default_nharts() -> usize {
        defaults::NHARTS
    }

    /// Returns the default entry point.
    fn default_start_pc() -> u64 {
        defaults::START_PC
    }

    /// Returns the default scheduling slice length.
    fn default_steps_per_slice() -> usize {
        defaults::STEPS_PER_SLICE
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            nharts: defaults::NHARTS,
            start_pc: defaults::START_PC,
            trace: false,
            steps_per_slice: defaults::STEPS_PER_SLICE,
        }
    }
}

/// Physical memory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Physical memory size in bytes.
    #[serde(default = "MemoryConfig::default_memsz")]
    pub memsz: usize,
}

impl MemoryConfig {
    /// Returns the default physical memory size.
    fn default_memsz() -> usize {
        defaults::MEM_SIZE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            memsz: defaults::MEM_SIZE,
        }
    }
}

/// Cache statistics sink configuration.
///
/// Each sink is an independent hit/miss model attached to the MMU; disabled
/// sinks cost nothing on the fetch and data paths.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheHierarchyConfig {
    /// Instruction cache sink.
    #[serde(default)]
    pub icache: CacheConfig,
    /// Data cache sink.
    #[serde(default)]
    pub dcache: CacheConfig,
}

/// Individual cache sink configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Enable this sink.
    #[serde(default)]
    pub enabled: bool,

    /// Number of sets.
    #[serde(default = "CacheConfig::default_sets")]
    pub sets: usize,

    /// Associativity (number of ways).
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Cache line size in bytes.
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,
}

impl CacheConfig {
    /// Returns the default set count.
    fn default_sets() -> usize {
        defaults::CACHE_SETS
    }

    /// Returns the default associativity.
    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    /// Returns the default line size in bytes.
    fn default_line() -> usize {
        defaults::CACHE_LINE
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sets: defaults::CACHE_SETS,
            ways: defaults::CACHE_WAYS,
            line_bytes: defaults::CACHE_LINE,
        }
    }
}
