//! Physical memory access and statistics modelling.
//!
//! This module contains the memory-side collaborators of the processor core:
//! 1. **MMU:** Bounds-checked little-endian access over shared physical
//!    memory, with virtual-memory toggling, a flushable TLB, compressed
//!    parcel expansion on fetch, and fault reporting.
//! 2. **Cache sinks:** Opaque hit/miss counters attached to the fetch and
//!    data paths, printed when the owning processor is dropped.

/// Cache/TLB statistics sink.
pub mod cache;

/// Memory management unit.
pub mod mmu;

pub use cache::CacheSim;
pub use mmu::Mmu;
