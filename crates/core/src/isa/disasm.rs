//! Diagnostic disassembly.
//!
//! Purely diagnostic output for noisy stepping: one line per retirement
//! with the hart id, the address, the raw encoding, and the mnemonic
//! resolved against the registry.

use crate::common::Insn;
use crate::isa::registry::REGISTRY;

/// Resolves the mnemonic for an instruction word.
///
/// # Returns
///
/// The name of the first registry entry whose masked bits match, or
/// `"unknown"` when nothing matches.
pub fn lookup_name(insn: Insn) -> &'static str {
    REGISTRY
        .iter()
        .find(|desc| insn.bits() & desc.mask == desc.opcode)
        .map(|desc| desc.name)
        .unwrap_or("unknown")
}

/// Formats the diagnostic line for one retirement.
pub fn line(id: u32, insn: Insn, pc: u64) -> String {
    format!(
        "core {:3}: {:#018x} ({:#010x}) {}",
        id,
        pc,
        insn.bits(),
        lookup_name(insn)
    )
}

/// Prints the diagnostic line for one retirement to stdout.
pub(crate) fn print_line(id: u32, insn: Insn, pc: u64) {
    println!("{}", line(id, insn, pc));
}
