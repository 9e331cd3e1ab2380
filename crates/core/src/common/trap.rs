//! Trap and control-flow signal definitions.
//!
//! This module defines the error handling vocabulary of the simulator core.
//! It provides:
//! 1. **Trap Representation:** The architectural fault enumeration routed
//!    through trap delivery.
//! 2. **Control-Flow Signals:** The sum type instruction handlers return to
//!    escape the dispatch loop without unwinding.
//! 3. **Error Handling:** Integration with standard Rust error traits.

use std::fmt;

/// Architectural trap causes.
///
/// A trap diverts control to the trap vector unless traps are disabled, in
/// which case it is a fatal double-fault condition. The discriminant of each
/// variant is the exception code written to the cause register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Instruction fetch from an address that is not instruction-aligned.
    InstructionAddressMisaligned = 0,
    /// Instruction fetch outside implemented physical memory.
    InstructionAccessFault = 1,
    /// Instruction encoding matched no registry entry.
    IllegalInstruction = 2,
    /// Supervisor-only instruction executed in user mode.
    PrivilegedInstruction = 3,
    /// FP instruction executed with the FPU disabled.
    FpDisabled = 4,
    /// Asynchronous interrupt delivery.
    ///
    /// At the point of delivery an interrupt is indistinguishable from a
    /// synchronous trap; the pending source is identified through the
    /// interrupt-pending field of the cause register.
    Interrupt = 5,
    /// Environment call.
    Syscall = 6,
    /// Breakpoint instruction.
    Breakpoint = 7,
    /// Load from a misaligned address.
    LoadAddressMisaligned = 8,
    /// Store to a misaligned address.
    StoreAddressMisaligned = 9,
    /// Load outside implemented physical memory.
    LoadAccessFault = 10,
    /// Store outside implemented physical memory.
    StoreAccessFault = 11,
    /// Vector instruction executed with the vector unit disabled.
    VectorDisabled = 12,
    /// Vector instruction encoding matched no registry entry.
    VectorIllegalInstruction = 13,
    /// Vector configuration left no register-file elements to allocate.
    VectorBank = 14,
}

/// Number of architectural trap causes.
pub const NUM_TRAPS: usize = 15;

impl Trap {
    /// Returns the exception code written to the cause register.
    pub fn code(self) -> u64 {
        self as u64
    }

    /// Converts a raw exception code back to a trap.
    ///
    /// # Arguments
    ///
    /// * `code` - The exception code, as read from a cause register.
    ///
    /// # Returns
    ///
    /// The corresponding `Trap`, or `None` if the code is out of range.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Trap::InstructionAddressMisaligned),
            1 => Some(Trap::InstructionAccessFault),
            2 => Some(Trap::IllegalInstruction),
            3 => Some(Trap::PrivilegedInstruction),
            4 => Some(Trap::FpDisabled),
            5 => Some(Trap::Interrupt),
            6 => Some(Trap::Syscall),
            7 => Some(Trap::Breakpoint),
            8 => Some(Trap::LoadAddressMisaligned),
            9 => Some(Trap::StoreAddressMisaligned),
            10 => Some(Trap::LoadAccessFault),
            11 => Some(Trap::StoreAccessFault),
            12 => Some(Trap::VectorDisabled),
            13 => Some(Trap::VectorIllegalInstruction),
            14 => Some(Trap::VectorBank),
            _ => None,
        }
    }

    /// Returns the diagnostic name of the trap.
    pub fn name(self) -> &'static str {
        match self {
            Trap::InstructionAddressMisaligned => "instruction_address_misaligned",
            Trap::InstructionAccessFault => "instruction_access_fault",
            Trap::IllegalInstruction => "illegal_instruction",
            Trap::PrivilegedInstruction => "privileged_instruction",
            Trap::FpDisabled => "fp_disabled",
            Trap::Interrupt => "interrupt",
            Trap::Syscall => "syscall",
            Trap::Breakpoint => "breakpoint",
            Trap::LoadAddressMisaligned => "load_address_misaligned",
            Trap::StoreAddressMisaligned => "store_address_misaligned",
            Trap::LoadAccessFault => "load_access_fault",
            Trap::StoreAccessFault => "store_access_fault",
            Trap::VectorDisabled => "vector_disabled",
            Trap::VectorIllegalInstruction => "vector_illegal_instruction",
            Trap::VectorBank => "vector_bank",
        }
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::error::Error for Trap {}

/// Control-flow signal raised from within an instruction handler.
///
/// Handlers return `Ok(next_pc)` on ordinary retirement; a `Signal` escapes
/// to the top of the execution engine, which unwinds it explicitly. The
/// variants are mutually exclusive per instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// An architectural fault; delivered through trap entry, after which the
    /// engine keeps stepping.
    Trap(Trap),
    /// End the current step burst, preserving all state.
    Stop,
    /// Reset the processor and return from the step burst immediately.
    Halt,
}

impl From<Trap> for Signal {
    fn from(t: Trap) -> Self {
        Signal::Trap(t)
    }
}
