//! Hashed opcode dispatch table.
//!
//! If the low bits of an instruction encoding uniquely identify a registry
//! entry, the table slot points directly at that handler; otherwise the
//! slot holds the short chain of colliding entries, probed linearly at
//! dispatch time. The table is process-wide, built once on first processor
//! construction, and read-only thereafter, so concurrently stepping harts
//! borrow it without synchronization.

use std::sync::OnceLock;

use crate::common::constants::DISPATCH_TABLE_SIZE;
use crate::common::{Insn, Signal, Trap};
use crate::core::Processor;
use crate::isa::registry::REGISTRY;

/// Semantic handler for one instruction.
///
/// Receives the processor, the fetched word, and its address; returns the
/// next program counter or a control-flow signal.
pub type InsnFunc = fn(&mut Processor, Insn, u64) -> Result<u64, Signal>;

/// One entry of a collision chain.
pub struct InsnChain {
    /// Encoding bits that identify the instruction under `mask`.
    pub opcode: u32,
    /// Bits of the encoding that are significant for the match.
    pub mask: u32,
    /// Semantic handler.
    pub func: InsnFunc,
}

/// One dispatch-table slot.
enum Slot {
    /// Exactly one registry entry maps here; dispatch without matching.
    Direct(InsnFunc),
    /// Zero or several entries collide here; probe linearly.
    Chain(Vec<InsnChain>),
}

/// The process-wide dispatch table.
pub struct DispatchTable {
    slots: Vec<Slot>,
}

impl DispatchTable {
    /// Dispatches one instruction to its handler.
    ///
    /// Looks up the slot for the word's low-order bits; a direct slot
    /// invokes its handler immediately, a chain slot probes for the first
    /// entry whose masked bits match. No match raises
    /// `illegal_instruction`.
    pub fn dispatch(&self, p: &mut Processor, insn: Insn, pc: u64) -> Result<u64, Signal> {
        let idx = insn.bits() as usize % DISPATCH_TABLE_SIZE;
        match &self.slots[idx] {
            Slot::Direct(func) => func(p, insn, pc),
            Slot::Chain(chain) => {
                for entry in chain {
                    if insn.bits() & entry.mask == entry.opcode {
                        return (entry.func)(p, insn, pc);
                    }
                }
                Err(Signal::Trap(Trap::IllegalInstruction))
            }
        }
    }
}

static TABLE: OnceLock<DispatchTable> = OnceLock::new();

/// Returns the process-wide dispatch table, building it on first use.
///
/// Construction is idempotent: every call returns the same table.
pub fn table() -> &'static DispatchTable {
    TABLE.get_or_init(build)
}

/// Builds the table from the opcode registry.
///
/// An instruction joins `chain[i]` iff its encoding could hash to `i`:
/// `(i & mask) == (opcode & mask & (DISPATCH_TABLE_SIZE - 1))`. Singleton
/// chains collapse to direct slots.
fn build() -> DispatchTable {
    let mut chains: Vec<Vec<InsnChain>> = Vec::with_capacity(DISPATCH_TABLE_SIZE);
    for i in 0..DISPATCH_TABLE_SIZE {
        let mut chain = Vec::new();
        for desc in REGISTRY {
            if (i as u32) & desc.mask == desc.opcode & desc.mask & (DISPATCH_TABLE_SIZE as u32 - 1)
            {
                chain.push(InsnChain {
                    opcode: desc.opcode,
                    mask: desc.mask,
                    func: desc.func,
                });
            }
        }
        chains.push(chain);
    }

    let slots = chains
        .into_iter()
        .map(|chain| {
            if chain.len() == 1 {
                Slot::Direct(chain[0].func)
            } else {
                Slot::Chain(chain)
            }
        })
        .collect();

    DispatchTable { slots }
}
