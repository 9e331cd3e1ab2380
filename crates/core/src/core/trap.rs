//! Interrupt and trap delivery.
//!
//! This module implements the trap controller of the processor. It
//! performs the following:
//! 1. **Interrupt Check:** Computes the pending mask from the cause and
//!    status registers at every instruction boundary.
//! 2. **Trap Entry:** Saves the privilege and PC context, loads the trap
//!    vector, and refreshes the faulting address from the MMU.
//! 3. **Timer:** The wraparound-safe count/compare crossing predicate.
//! 4. **IPI Port:** The release/acquire mailbox through which other
//!    threads post inter-processor interrupts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::common::constants::{
    CAUSE_EXCCODE, CAUSE_EXCCODE_SHIFT, CAUSE_IP, CAUSE_IP_SHIFT, SR_ET, SR_IM, SR_IM_SHIFT,
    SR_PS, SR_S,
};
use crate::common::{Signal, Trap};
use crate::core::Processor;

/// Cross-thread inter-processor interrupt mailbox.
///
/// Raising from any thread stores with release ordering; the target hart
/// drains with acquire ordering at its next instruction boundary. Racing
/// raises coalesce into the single pending flag.
#[derive(Clone)]
pub struct IpiPort {
    pending: Arc<AtomicBool>,
}

impl IpiPort {
    /// Creates an empty mailbox.
    pub fn new() -> Self {
        Self {
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Posts an IPI; visible to the target at its next boundary.
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Drains the mailbox, returning whether an IPI was pending.
    pub(crate) fn take(&self) -> bool {
        self.pending.swap(false, Ordering::Acquire)
    }
}

impl Default for IpiPort {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns whether a burst of `added` retirements crossed the timer
/// compare value.
///
/// The crossing is derived from the pre-update count, the overflow-checked
/// sum, and the compare value, so it fires exactly once per crossing -
/// including the crossing where the addition wraps past the 64-bit maximum.
pub fn timer_fired(pre: u64, added: u64, compare: u64) -> bool {
    let (post, wrapped) = pre.overflowing_add(added);
    if wrapped {
        pre < compare || post >= compare
    } else {
        pre < compare && post >= compare
    }
}

impl Processor {
    /// Checks for a deliverable interrupt at an instruction boundary.
    ///
    /// Drains the IPI port first, then intersects the pending field of the
    /// cause register with the status register's interrupt mask. A nonzero
    /// intersection with traps enabled raises the `interrupt` signal, which
    /// is indistinguishable from a synchronous trap at delivery.
    pub fn take_interrupt(&mut self) -> Result<(), Signal> {
        self.poll_ipi();

        let pending = ((self.state.cause & CAUSE_IP) >> CAUSE_IP_SHIFT) as u32
            & ((self.state.sr & SR_IM) >> SR_IM_SHIFT);
        if pending != 0 && self.state.sr & SR_ET != 0 {
            return Err(Signal::Trap(Trap::Interrupt));
        }
        Ok(())
    }

    /// Delivers a trap.
    ///
    /// Atomically enters supervisor mode with traps disabled, saving the
    /// previous supervisor bit; records the exception code, the trapping
    /// PC, and the MMU's faulting address; and transfers control to the
    /// trap vector.
    ///
    /// # Panics
    ///
    /// Panics with a fatal diagnostic if traps are disabled: the trap
    /// handler itself trapped ("error mode"), a double-fault condition the
    /// architecture cannot recover from.
    pub fn take_trap(&mut self, t: Trap, noisy: bool) {
        if self.state.sr & SR_ET == 0 {
            panic!(
                "error mode on core {}: trap {}, pc {:#018x}",
                self.state.id, t, self.state.pc
            );
        }
        if noisy {
            println!(
                "core {:3}: trap {}, pc {:#018x}",
                self.state.id, t, self.state.pc
            );
        }

        let sr = self.state.sr;
        let saved_s = if sr & SR_S != 0 { SR_PS } else { 0 };
        self.set_sr((((sr & !SR_ET) | SR_S) & !SR_PS) | saved_s);

        self.state.cause =
            (self.state.cause & !CAUSE_EXCCODE) | (t.code() << CAUSE_EXCCODE_SHIFT);
        self.state.epc = self.state.pc;
        self.state.pc = self.state.evec;
        self.state.badvaddr = self.mmu.get_badvaddr();
    }
}
