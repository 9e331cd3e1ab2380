//! Common types shared across the simulator core.
//!
//! This module provides the fundamental building blocks used by every other
//! component. It includes:
//! 1. **Constants:** Status-register, cause-register, and FP-status layouts.
//! 2. **Traps:** The architectural fault enumeration and the control-flow
//!    signal type raised by instruction handlers.
//! 3. **Instructions:** The 32-bit instruction word with field extractors.

/// Status/cause/FP-status bit layouts and system-wide sizes.
pub mod constants;

/// Instruction word representation and field extraction.
pub mod insn;

/// Trap definitions and handler control-flow signals.
pub mod trap;

pub use insn::Insn;
pub use trap::{Signal, Trap, NUM_TRAPS};
