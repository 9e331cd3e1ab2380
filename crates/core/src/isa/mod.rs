//! Instruction set.
//!
//! This module holds everything that knows about individual instruction
//! encodings:
//! 1. **Opcodes:** Match/mask encoding pairs for every instruction.
//! 2. **Registry:** The flat `(name, opcode, mask, handler)` table the
//!    dispatch table is built from.
//! 3. **Handlers:** The semantic functions invoked through dispatch.
//! 4. **Disassembly:** The diagnostic line emitted in noisy mode.

/// Diagnostic disassembly.
pub mod disasm;

/// Instruction semantic handlers.
pub mod exec;

/// Match/mask encoding constants.
pub mod opcodes;

/// The flat instruction registry.
pub mod registry;

pub use registry::{InsnDesc, REGISTRY};
