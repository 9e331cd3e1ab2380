//! Processor core.
//!
//! This module defines the central `Processor` structure: one instance
//! models one hart plus its micro-thread pool. It owns:
//! 1. **Architectural State:** The register and control-word record.
//! 2. **Memory Interface:** An MMU aliasing the shared physical memory.
//! 3. **Micro-Threads:** The vector extension's auxiliary contexts.
//! 4. **Lifecycle:** Construction, initialization, reset, and the
//!    statistics printout on teardown.
//!
//! The execution engine and the trap controller are implemented in the
//! sibling `execute` and `trap` modules as further `impl` blocks.

/// Hashed opcode dispatch table.
pub mod dispatch;

/// The fetch-dispatch-commit execution engine.
pub mod execute;

/// Architectural state block and vector configuration.
pub mod state;

/// Interrupt and trap delivery.
pub mod trap;

use crate::common::constants::{MAX_UTS, SR_EC, SR_EF, SR_EV};
use crate::config::FeatureSet;
use crate::mem::{CacheSim, Mmu};

pub use state::ArchState;

use self::trap::IpiPort;

/// Processor model for a single hart.
///
/// Aggregates the architectural state block, the MMU binding, the feature
/// switches, and the micro-thread pool. Micro-threads are themselves
/// `Processor` values whose own pool is always empty; the recursion is one
/// level deep, flagged by `state.utidx`.
pub struct Processor {
    /// Architectural state, mutable by instruction handlers.
    pub state: ArchState,
    /// Memory interface; exclusively owned by this hart.
    pub mmu: Mmu,
    /// Micro-thread pool; populated by `init` on primary harts only.
    pub uts: Vec<Processor>,
    features: FeatureSet,
    ipi: IpiPort,
}

// Safety: the MMU's raw memory pointer is the only non-Send field; the
// single-threaded step contract (documented on `Mmu`) makes moving the
// processor between threads sound.
unsafe impl Send for Processor {}

impl Processor {
    /// Constructs a processor over shared physical memory.
    ///
    /// Builds the process-wide dispatch table if this is the first
    /// construction, binds an MMU over `(mem, memsz)`, and resets.
    ///
    /// # Arguments
    ///
    /// * `mem` - Pointer to the start of shared physical memory.
    /// * `memsz` - Size of the region in bytes.
    /// * `features` - Statically-known feature switches.
    pub fn new(mem: *mut u8, memsz: usize, features: FeatureSet) -> Self {
        dispatch::table();

        let mut p = Self {
            state: ArchState::new(),
            mmu: Mmu::new(mem, memsz),
            uts: Vec::new(),
            features,
            ipi: IpiPort::new(),
        };
        p.reset();
        p
    }

    /// Returns the feature switches this processor was built with.
    pub fn features(&self) -> FeatureSet {
        self.features
    }

    /// Assigns the hart id, allocates the micro-thread pool, and attaches
    /// statistics sinks.
    ///
    /// Each micro-thread is a full processor over the same physical memory
    /// with the FPU and vector enable bits set, the parent's id, and its
    /// pool index in `utidx`. The instruction and data cache sinks are
    /// cloned from the given templates; a TLB reach model accompanies each.
    ///
    /// # Arguments
    ///
    /// * `id` - Hart id.
    /// * `icache_template` - Instruction cache sink template, if any.
    /// * `dcache_template` - Data cache sink template, if any.
    pub fn init(
        &mut self,
        id: u32,
        icache_template: Option<&CacheSim>,
        dcache_template: Option<&CacheSim>,
    ) {
        self.state.id = id;

        self.uts.clear();
        for i in 0..MAX_UTS {
            let mut ut = Processor::new(self.mmu.mem_ptr(), self.mmu.mem_size(), self.features);
            ut.state.id = id;
            let sr = ut.state.sr;
            ut.set_sr(sr | SR_EF);
            let sr = ut.state.sr;
            ut.set_sr(sr | SR_EV);
            ut.state.utidx = i as i32;
            self.uts.push(ut);
        }

        if let Some(template) = icache_template {
            self.mmu.set_icsim(Some(template.clone()));
            self.mmu.set_itlbsim(Some(CacheSim::new(1, 8, 4096, "ITLB")));
        }
        if let Some(template) = dcache_template {
            self.mmu.set_dcsim(Some(template.clone()));
            self.mmu.set_dtlbsim(Some(CacheSim::new(1, 8, 4096, "DTLB")));
        }

        log::debug!("core {}: initialized with {} micro-threads", id, self.uts.len());
    }

    /// Resets the processor to its architectural power-on state.
    ///
    /// Zeroes registers and control words, enters supervisor mode with
    /// 64-bit supervisor width, restores the vector configuration defaults,
    /// clears the run gate, and drops the micro-thread pool. The hart
    /// identity (`id`, `utidx`) is preserved.
    pub fn reset(&mut self) {
        self.state.run = false;

        self.state.xpr = [0; 32];
        self.state.fpr = [0; 32];

        self.state.pc = 0;
        self.state.evec = 0;
        self.state.epc = 0;
        self.state.badvaddr = 0;
        self.state.cause = 0;
        self.state.pcr_k0 = 0;
        self.state.pcr_k1 = 0;
        self.state.tohost = 0;
        self.state.fromhost = 0;
        self.state.count = 0;
        self.state.compare = 0;
        self.state.cycle = 0;
        self.set_sr(crate::common::constants::SR_S | crate::common::constants::SR_SX);
        self.set_fsr(0);

        self.state.vecbanks = 0xff;
        self.state.vecbanks_count = 8;
        self.state.vlmax = 32;
        self.state.vl = 0;
        self.state.nxfpr_bank = 256;
        self.state.nxpr_use = 32;
        self.state.nfpr_use = 32;

        self.uts.clear();
    }

    /// Writes the status register.
    ///
    /// Reserved bits are cleared and any enable bit whose feature is absent
    /// from this build is forced off. The virtual-memory and supervisor
    /// bits propagate to the MMU, the TLB is flushed, and the effective
    /// register width is recomputed from the active privilege's width bit.
    pub fn set_sr(&mut self, val: u32) {
        use crate::common::constants::{SR_S, SR_SX, SR_UX, SR_VM, SR_ZERO};

        let mut sr = val & !SR_ZERO;
        if !self.features.rv64 {
            sr &= !(SR_SX | SR_UX);
        }
        if !self.features.fpu {
            sr &= !SR_EF;
        }
        if !self.features.compressed {
            sr &= !SR_EC;
        }
        if !self.features.vector {
            sr &= !SR_EV;
        }
        self.state.sr = sr;

        self.mmu.set_vm_enabled(sr & SR_VM != 0);
        self.mmu.set_supervisor(sr & SR_S != 0);
        self.mmu.flush_tlb();

        let wide = if sr & SR_S != 0 { sr & SR_SX } else { sr & SR_UX };
        self.state.xprlen = if wide != 0 { 64 } else { 32 };
    }

    /// Writes the FP status register, clearing reserved bits.
    pub fn set_fsr(&mut self, val: u32) {
        self.state.fsr = val & !crate::common::constants::FSR_ZERO;
    }

    /// Posts an inter-processor interrupt to this hart.
    ///
    /// Sets the IPI bit in the cause register's pending field and the run
    /// gate. Safe to call between bursts; for delivery from another thread
    /// while the hart is stepping, use a cloned [`Processor::ipi_port`],
    /// whose effect becomes visible at the next instruction boundary.
    pub fn deliver_ipi(&mut self) {
        self.ipi.raise();
        self.poll_ipi();
    }

    /// Returns a cloneable cross-thread handle that posts IPIs to this
    /// hart.
    pub fn ipi_port(&self) -> IpiPort {
        self.ipi.clone()
    }

    /// Drains the IPI port into the architectural pending state.
    pub(crate) fn poll_ipi(&mut self) {
        use crate::common::constants::{CAUSE_IP_SHIFT, IPI_IRQ};

        if self.ipi.take() {
            self.state.cause |= 1 << (IPI_IRQ + CAUSE_IP_SHIFT);
            self.state.run = true;
        }
    }
}

impl Drop for Processor {
    /// Prints and releases the statistics sinks in fixed order: icache,
    /// ITLB, dcache, DTLB.
    fn drop(&mut self) {
        if let Some(sim) = self.mmu.icsim() {
            sim.print_stats();
        }
        if let Some(sim) = self.mmu.itlbsim() {
            sim.print_stats();
        }
        if let Some(sim) = self.mmu.dcsim() {
            sim.print_stats();
        }
        if let Some(sim) = self.mmu.dtlbsim() {
            sim.print_stats();
        }
    }
}
