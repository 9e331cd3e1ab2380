//! Simulation harness.
//!
//! This module contains the outer shell around the processor cores:
//! 1. **Simulator:** Owns physical memory and the hart vector, slices
//!    execution across harts, and routes inter-processor interrupts.
//! 2. **Loader:** Reads flat binary images into physical memory.

/// Flat-binary image loading.
pub mod loader;

/// The multi-hart harness.
pub mod simulator;

pub use simulator::Simulator;
