//! Execution engine.
//!
//! This module implements the fetch-dispatch-commit loop of the processor.
//! Each retirement checks for deliverable interrupts, fetches one
//! instruction word through the MMU, dispatches it through the hashed
//! table, and forces the zero register back to zero. Control-flow signals
//! raised by handlers or the interrupt check unwind to the top of the
//! burst, where traps are delivered and the loop re-entered. Cycle and
//! count accounting happens once per burst, counting every boundary
//! crossed including the one at which a signal was raised.

use crate::common::constants::{CAUSE_IP_SHIFT, SR_EC, TIMER_IRQ};
use crate::common::Signal;
use crate::core::dispatch;
use crate::core::trap::timer_fired;
use crate::core::Processor;
use crate::isa::disasm;

impl Processor {
    /// Attempts to retire up to `n` instructions.
    ///
    /// Returns immediately when the run gate is clear (after draining the
    /// IPI port, which may set it). A trap increments the retired count for
    /// its boundary, delivers, and resumes; `stop` ends the burst; `halt`
    /// resets the processor and returns without counter updates. When
    /// `noisy`, a disassembly line is printed per retirement.
    ///
    /// # Arguments
    ///
    /// * `n` - Maximum number of instructions to retire.
    /// * `noisy` - Emit per-instruction diagnostics.
    pub fn step(&mut self, n: usize, noisy: bool) {
        self.poll_ipi();
        if !self.state.run {
            return;
        }

        let mut i: usize = 0;
        loop {
            match self.burst(n, &mut i, noisy) {
                Ok(()) => break,
                Err(Signal::Trap(t)) => {
                    i += 1;
                    self.take_trap(t, noisy);
                }
                Err(Signal::Stop) => {
                    i += 1;
                    break;
                }
                Err(Signal::Halt) => {
                    self.reset();
                    return;
                }
            }
        }

        self.state.cycle = self.state.cycle.wrapping_add(i as u64);

        let old_count = self.state.count;
        self.state.count = old_count.wrapping_add(i as u64);
        if timer_fired(old_count, i as u64, self.state.compare) {
            self.state.cause |= 1 << (TIMER_IRQ + CAUSE_IP_SHIFT);
        }
    }

    /// Runs retirements `*i..n`, leaving `*i` at the boundary where a
    /// signal was raised.
    ///
    /// The quiet path is unrolled by four; the unroll is an optimization
    /// only, and accounting stays per-instruction so it cannot perturb the
    /// counters.
    fn burst(&mut self, n: usize, i: &mut usize, noisy: bool) -> Result<(), Signal> {
        self.take_interrupt()?;

        if noisy {
            while *i < n {
                self.execute_one(true)?;
                *i += 1;
            }
        } else {
            while n > 3 && *i < n - 3 {
                self.execute_one(false)?;
                *i += 1;
                self.execute_one(false)?;
                *i += 1;
                self.execute_one(false)?;
                *i += 1;
                self.execute_one(false)?;
                *i += 1;
            }
            while *i < n {
                self.execute_one(false)?;
                *i += 1;
            }
        }
        Ok(())
    }

    /// Retires a single instruction.
    #[inline(always)]
    fn execute_one(&mut self, noisy: bool) -> Result<(), Signal> {
        let pc = self.state.pc;
        let insn = self
            .mmu
            .load_insn(pc, self.state.sr & SR_EC != 0)
            .map_err(Signal::Trap)?;
        if noisy {
            disasm::print_line(self.state.id, insn, pc);
        }
        let next_pc = dispatch::table().dispatch(self, insn, pc)?;
        self.state.pc = next_pc;
        self.state.xpr[0] = 0;
        Ok(())
    }
}
