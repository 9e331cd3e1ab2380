//! Multi-hart harness.
//!
//! The simulator owns the physical memory block and every processor
//! aliasing it. Execution is sliced: each call to `step_all` gives every
//! running hart one burst of the configured length, so long programs are
//! driven by repeated small slices rather than one unbounded burst.

use crate::config::Config;
use crate::core::Processor;
use crate::mem::CacheSim;

/// Top-level simulation harness.
///
/// Construction order matters for teardown: processors are declared before
/// the memory block so their statistics print while the block is still
/// alive.
pub struct Simulator {
    procs: Vec<Processor>,
    mem: Box<[u8]>,
    steps_per_slice: usize,
    trace: bool,
}

impl Simulator {
    /// Builds the memory block and the configured number of harts.
    ///
    /// Each hart gets an MMU over the shared memory and, when enabled in
    /// the configuration, instruction/data cache sinks cloned from
    /// templates built here.
    ///
    /// # Arguments
    ///
    /// * `config` - The simulator configuration.
    pub fn new(config: &Config) -> Self {
        let memsz = config.memory.memsz;
        let mut mem = vec![0u8; memsz].into_boxed_slice();

        let icache_template = config.cache.icache.enabled.then(|| {
            CacheSim::new(
                config.cache.icache.sets,
                config.cache.icache.ways,
                config.cache.icache.line_bytes,
                "ICACHE",
            )
        });
        let dcache_template = config.cache.dcache.enabled.then(|| {
            CacheSim::new(
                config.cache.dcache.sets,
                config.cache.dcache.ways,
                config.cache.dcache.line_bytes,
                "DCACHE",
            )
        });

        let mut procs = Vec::with_capacity(config.general.nharts);
        for id in 0..config.general.nharts {
            let mut p = Processor::new(mem.as_mut_ptr(), memsz, config.features);
            p.init(
                id as u32,
                icache_template.as_ref(),
                dcache_template.as_ref(),
            );
            procs.push(p);
        }

        Self {
            procs,
            mem,
            steps_per_slice: config.general.steps_per_slice.max(1),
            trace: config.general.trace,
        }
    }

    /// Copies a flat binary image into physical memory.
    ///
    /// # Panics
    ///
    /// Panics if the image does not fit at `addr`.
    pub fn load_binary_at(&mut self, data: &[u8], addr: u64) {
        let start = addr as usize;
        let end = start
            .checked_add(data.len())
            .expect("image end overflows address space");
        assert!(
            end <= self.mem.len(),
            "image of {} bytes does not fit at {:#x} (memory is {} bytes)",
            data.len(),
            addr,
            self.mem.len()
        );
        self.mem[start..end].copy_from_slice(data);
    }

    /// Points hart 0 at the entry address and releases its run gate.
    pub fn start(&mut self, entry: u64) {
        let hart = &mut self.procs[0];
        hart.state.pc = entry;
        hart.state.run = true;
        log::debug!("hart 0 started at {:#x}", entry);
    }

    /// Gives every running hart one burst.
    ///
    /// # Returns
    ///
    /// `true` while at least one hart still has its run gate set.
    pub fn step_all(&mut self) -> bool {
        for p in &mut self.procs {
            p.step(self.steps_per_slice, self.trace);
        }
        self.procs.iter().any(|p| p.state.run)
    }

    /// Runs slices until every hart has stopped.
    pub fn run(&mut self) {
        while self.step_all() {}
        log::debug!("all harts halted");
    }

    /// Posts an inter-processor interrupt to the given hart.
    pub fn deliver_ipi(&mut self, target: usize) {
        self.procs[target].deliver_ipi();
    }

    /// Returns the number of harts.
    pub fn nharts(&self) -> usize {
        self.procs.len()
    }

    /// Borrows a hart.
    pub fn hart(&self, idx: usize) -> &Processor {
        &self.procs[idx]
    }

    /// Mutably borrows a hart.
    pub fn hart_mut(&mut self, idx: usize) -> &mut Processor {
        &mut self.procs[idx]
    }

    /// Reads back a range of physical memory (for result inspection).
    pub fn mem(&self, addr: u64, len: usize) -> &[u8] {
        &self.mem[addr as usize..addr as usize + len]
    }
}
