//! Memory Management Unit.
//!
//! This module implements the memory interface consumed by the execution
//! engine. It performs the following:
//! 1. **Instruction Fetch:** Aligned 32-bit fetch with expansion of 16-bit
//!    compressed parcels when the compressed encoding is enabled.
//! 2. **Data Access:** Little-endian loads and stores of 1/2/4/8 bytes with
//!    misalignment and bounds faults.
//! 3. **Translation State:** Virtual-memory and supervisor toggles with a
//!    flushable direct-mapped TLB per access path.
//! 4. **Fault Reporting:** The faulting address of the most recent trap.
//! 5. **Statistics:** Optional cache and TLB sink attachment points.

use crate::common::constants::PAGE_SHIFT;
use crate::common::{Insn, Trap};
use crate::mem::CacheSim;

/// Number of entries in each translation lookaside buffer.
const TLB_ENTRIES: usize = 32;

/// Direct-mapped translation lookaside buffer.
///
/// Caches the page-presence decision for translated pages; a flush
/// invalidates every entry.
struct Tlb {
    tags: [u64; TLB_ENTRIES],
    valid: [bool; TLB_ENTRIES],
}

impl Tlb {
    fn new() -> Self {
        Self {
            tags: [0; TLB_ENTRIES],
            valid: [false; TLB_ENTRIES],
        }
    }

    fn contains(&self, vpn: u64) -> bool {
        let idx = (vpn as usize) % TLB_ENTRIES;
        self.valid[idx] && self.tags[idx] == vpn
    }

    fn insert(&mut self, vpn: u64) {
        let idx = (vpn as usize) % TLB_ENTRIES;
        self.tags[idx] = vpn;
        self.valid[idx] = true;
    }

    fn flush(&mut self) {
        self.valid = [false; TLB_ENTRIES];
    }
}

/// Memory management unit over shared physical memory.
///
/// Each hart (and each of its micro-threads) owns one `Mmu`; all of them
/// alias the same physical memory block owned by the outer harness.
pub struct Mmu {
    /// Raw pointer to the start of simulated physical memory.
    ///
    /// # Safety Invariants
    ///
    /// This pointer must maintain the following invariants at all times:
    /// - Points to a valid, allocated memory region of `memsz` bytes
    /// - The region remains valid for the entire lifetime of the `Mmu`
    /// - All accesses verify `addr + len <= memsz` before dereferencing
    /// - The pointer is valid for both reads and writes
    /// - No other code may free or reallocate the region while any `Mmu`
    ///   aliasing it exists
    /// - Aliasing harts and micro-threads only access it from the single
    ///   thread driving their `step`
    mem: *mut u8,
    memsz: usize,
    vm_enabled: bool,
    supervisor: bool,
    badvaddr: u64,
    itlb: Tlb,
    dtlb: Tlb,
    icsim: Option<CacheSim>,
    dcsim: Option<CacheSim>,
    itlbsim: Option<CacheSim>,
    dtlbsim: Option<CacheSim>,
}

// Safety: `mem` aliases a region owned by the harness, which outlives the
// processors; the single-threaded step contract means no concurrent access
// through this pointer.
unsafe impl Send for Mmu {}

impl Mmu {
    /// Creates an MMU over the given physical memory region.
    ///
    /// # Arguments
    ///
    /// * `mem` - Pointer to the start of physical memory.
    /// * `memsz` - Size of the region in bytes.
    pub fn new(mem: *mut u8, memsz: usize) -> Self {
        Self {
            mem,
            memsz,
            vm_enabled: false,
            supervisor: false,
            badvaddr: 0,
            itlb: Tlb::new(),
            dtlb: Tlb::new(),
            icsim: None,
            dcsim: None,
            itlbsim: None,
            dtlbsim: None,
        }
    }

    /// Returns the physical memory base pointer (for aliasing MMUs).
    pub fn mem_ptr(&self) -> *mut u8 {
        self.mem
    }

    /// Returns the physical memory size in bytes.
    pub fn mem_size(&self) -> usize {
        self.memsz
    }

    /// Enables or disables virtual-memory translation.
    pub fn set_vm_enabled(&mut self, on: bool) {
        self.vm_enabled = on;
    }

    /// Records the current privilege for translation decisions.
    pub fn set_supervisor(&mut self, on: bool) {
        self.supervisor = on;
    }

    /// Returns whether virtual-memory translation is enabled.
    pub fn vm_enabled(&self) -> bool {
        self.vm_enabled
    }

    /// Returns whether the MMU is in supervisor mode.
    pub fn supervisor(&self) -> bool {
        self.supervisor
    }

    /// Invalidates both translation lookaside buffers.
    pub fn flush_tlb(&mut self) {
        log::trace!("tlb flush");
        self.itlb.flush();
        self.dtlb.flush();
    }

    /// Returns the faulting address of the most recent fault.
    pub fn get_badvaddr(&self) -> u64 {
        self.badvaddr
    }

    /// Attaches (or detaches) the instruction cache sink.
    pub fn set_icsim(&mut self, sim: Option<CacheSim>) {
        self.icsim = sim;
    }

    /// Attaches (or detaches) the data cache sink.
    pub fn set_dcsim(&mut self, sim: Option<CacheSim>) {
        self.dcsim = sim;
    }

    /// Attaches (or detaches) the instruction TLB sink.
    pub fn set_itlbsim(&mut self, sim: Option<CacheSim>) {
        self.itlbsim = sim;
    }

    /// Attaches (or detaches) the data TLB sink.
    pub fn set_dtlbsim(&mut self, sim: Option<CacheSim>) {
        self.dtlbsim = sim;
    }

    /// Returns the instruction cache sink, if attached.
    pub fn icsim(&self) -> Option<&CacheSim> {
        self.icsim.as_ref()
    }

    /// Returns the data cache sink, if attached.
    pub fn dcsim(&self) -> Option<&CacheSim> {
        self.dcsim.as_ref()
    }

    /// Returns the instruction TLB sink, if attached.
    pub fn itlbsim(&self) -> Option<&CacheSim> {
        self.itlbsim.as_ref()
    }

    /// Returns the data TLB sink, if attached.
    pub fn dtlbsim(&self) -> Option<&CacheSim> {
        self.dtlbsim.as_ref()
    }

    /// Fetches one instruction word at `pc`.
    ///
    /// When `compressed_enabled` is set, fetch alignment is halfword and a
    /// 16-bit parcel whose low bits differ from `0b11` is expanded to its
    /// full-width equivalent; the returned word remembers its fetch length.
    ///
    /// # Arguments
    ///
    /// * `pc` - The code address to fetch from.
    /// * `compressed_enabled` - The EC bit of the status register.
    ///
    /// # Returns
    ///
    /// The fetched instruction word, or the fault that prevented the fetch.
    pub fn load_insn(&mut self, pc: u64, compressed_enabled: bool) -> Result<Insn, Trap> {
        let align = if compressed_enabled { 2 } else { 4 };
        if pc % align != 0 {
            self.badvaddr = pc;
            return Err(Trap::InstructionAddressMisaligned);
        }

        if let Some(sim) = self.itlbsim.as_mut() {
            sim.tick(pc);
        }
        if let Some(sim) = self.icsim.as_mut() {
            sim.tick(pc);
        }

        if compressed_enabled {
            let idx = self.fetch_check(pc, 2)?;
            let lo = u16::from_le_bytes(self.read_bytes::<2>(idx));
            if lo & 0b11 != 0b11 {
                return Ok(Insn::expanded(expand_compressed(lo)));
            }
            let idx_hi = self.fetch_check(pc + 2, 2)?;
            let hi = u16::from_le_bytes(self.read_bytes::<2>(idx_hi));
            Ok(Insn::new((lo as u32) | ((hi as u32) << 16)))
        } else {
            let idx = self.fetch_check(pc, 4)?;
            Ok(Insn::new(u32::from_le_bytes(self.read_bytes::<4>(idx))))
        }
    }

    /// Loads a zero-extended byte.
    pub fn load_u8(&mut self, addr: u64) -> Result<u8, Trap> {
        let idx = self.data_check(addr, 1, false)?;
        Ok(self.read_bytes::<1>(idx)[0])
    }

    /// Loads a zero-extended little-endian halfword.
    pub fn load_u16(&mut self, addr: u64) -> Result<u16, Trap> {
        let idx = self.data_check(addr, 2, false)?;
        Ok(u16::from_le_bytes(self.read_bytes::<2>(idx)))
    }

    /// Loads a zero-extended little-endian word.
    pub fn load_u32(&mut self, addr: u64) -> Result<u32, Trap> {
        let idx = self.data_check(addr, 4, false)?;
        Ok(u32::from_le_bytes(self.read_bytes::<4>(idx)))
    }

    /// Loads a little-endian doubleword.
    pub fn load_u64(&mut self, addr: u64) -> Result<u64, Trap> {
        let idx = self.data_check(addr, 8, false)?;
        Ok(u64::from_le_bytes(self.read_bytes::<8>(idx)))
    }

    /// Stores a byte.
    pub fn store_u8(&mut self, addr: u64, val: u8) -> Result<(), Trap> {
        let idx = self.data_check(addr, 1, true)?;
        self.write_bytes(idx, [val]);
        Ok(())
    }

    /// Stores a little-endian halfword.
    pub fn store_u16(&mut self, addr: u64, val: u16) -> Result<(), Trap> {
        let idx = self.data_check(addr, 2, true)?;
        self.write_bytes(idx, val.to_le_bytes());
        Ok(())
    }

    /// Stores a little-endian word.
    pub fn store_u32(&mut self, addr: u64, val: u32) -> Result<(), Trap> {
        let idx = self.data_check(addr, 4, true)?;
        self.write_bytes(idx, val.to_le_bytes());
        Ok(())
    }

    /// Stores a little-endian doubleword.
    pub fn store_u64(&mut self, addr: u64, val: u64) -> Result<(), Trap> {
        let idx = self.data_check(addr, 8, true)?;
        self.write_bytes(idx, val.to_le_bytes());
        Ok(())
    }

    /// Validates a fetch of `len` bytes at `addr`; returns the byte index.
    fn fetch_check(&mut self, addr: u64, len: u64) -> Result<usize, Trap> {
        if self.vm_enabled {
            let vpn = addr >> PAGE_SHIFT;
            if !self.itlb.contains(vpn) {
                self.itlb.insert(vpn);
            }
        }
        if addr.checked_add(len).map_or(true, |end| end > self.memsz as u64) {
            self.badvaddr = addr;
            return Err(Trap::InstructionAccessFault);
        }
        Ok(addr as usize)
    }

    /// Validates a data access of `len` bytes at `addr`; returns the byte
    /// index.
    fn data_check(&mut self, addr: u64, len: u64, store: bool) -> Result<usize, Trap> {
        if addr % len != 0 {
            self.badvaddr = addr;
            return Err(if store {
                Trap::StoreAddressMisaligned
            } else {
                Trap::LoadAddressMisaligned
            });
        }

        if let Some(sim) = self.dtlbsim.as_mut() {
            sim.tick(addr);
        }
        if let Some(sim) = self.dcsim.as_mut() {
            sim.tick(addr);
        }

        if self.vm_enabled {
            let vpn = addr >> PAGE_SHIFT;
            if !self.dtlb.contains(vpn) {
                self.dtlb.insert(vpn);
            }
        }

        if addr.checked_add(len).map_or(true, |end| end > self.memsz as u64) {
            self.badvaddr = addr;
            return Err(if store {
                Trap::StoreAccessFault
            } else {
                Trap::LoadAccessFault
            });
        }
        Ok(addr as usize)
    }

    fn read_bytes<const N: usize>(&self, idx: usize) -> [u8; N] {
        let mut buf = [0u8; N];
        // Bounds were checked by the caller.
        unsafe { std::ptr::copy_nonoverlapping(self.mem.add(idx), buf.as_mut_ptr(), N) };
        buf
    }

    fn write_bytes<const N: usize>(&mut self, idx: usize, buf: [u8; N]) {
        // Bounds were checked by the caller.
        unsafe { std::ptr::copy_nonoverlapping(buf.as_ptr(), self.mem.add(idx), N) };
    }
}

/// Expands a 16-bit compressed parcel to its full-width equivalent.
///
/// Covers the register-move, immediate-arithmetic, and control-transfer
/// parcels; anything else is returned unexpanded, where it falls through
/// dispatch as an illegal instruction.
fn expand_compressed(parcel: u16) -> u32 {
    let p = parcel as u32;
    let quadrant = p & 0b11;
    let funct3 = (p >> 13) & 0b111;
    let rd = (p >> 7) & 0x1f;
    let rs2 = (p >> 2) & 0x1f;

    // imm[5] at bit 12, imm[4:0] at bits 6-2, sign-extended.
    let ci_imm = ((((p >> 12) & 1) << 5 | rs2) as i32) << 26 >> 26;

    match (quadrant, funct3) {
        // c.addi (c.nop when rd is x0): addi rd, rd, imm
        (0b01, 0b000) => ((ci_imm as u32 & 0xfff) << 20) | (rd << 15) | (rd << 7) | 0x13,
        // c.li: addi rd, x0, imm
        (0b01, 0b010) => ((ci_imm as u32 & 0xfff) << 20) | (rd << 7) | 0x13,
        // c.j: jal x0, offset
        (0b01, 0b101) => encode_jal(0, cj_offset(p)),
        // c.beqz: beq rs1', x0, offset
        (0b01, 0b110) => encode_branch(0b000, 8 + ((p >> 7) & 0b111), cb_offset(p)),
        // c.bnez: bne rs1', x0, offset
        (0b01, 0b111) => encode_branch(0b001, 8 + ((p >> 7) & 0b111), cb_offset(p)),
        // c.slli: slli rd, rd, shamt
        (0b10, 0b000) => {
            let shamt = ((p >> 12) & 1) << 5 | rs2;
            (shamt << 20) | (rd << 15) | (0b001 << 12) | (rd << 7) | 0x13
        }
        (0b10, 0b100) => {
            let high = (p >> 12) & 1;
            match (high, rd, rs2) {
                // c.jr: jalr x0, rs1, 0
                (0, rs1, 0) if rs1 != 0 => (rs1 << 15) | 0x67,
                // c.mv: add rd, x0, rs2
                (0, _, _) if rs2 != 0 => (rs2 << 20) | (rd << 7) | 0x33,
                // c.ebreak
                (1, 0, 0) => 0x0010_0073,
                // c.jalr: jalr x1, rs1, 0
                (1, rs1, 0) => (rs1 << 15) | (1 << 7) | 0x67,
                // c.add: add rd, rd, rs2
                (1, _, _) => (rs2 << 20) | (rd << 15) | (rd << 7) | 0x33,
                _ => p,
            }
        }
        _ => p,
    }
}

/// Reassembles the scattered CJ-format jump offset, sign-extended.
fn cj_offset(p: u32) -> i32 {
    let imm = ((p >> 12) & 1) << 11
        | ((p >> 11) & 1) << 4
        | ((p >> 9) & 0b11) << 8
        | ((p >> 8) & 1) << 10
        | ((p >> 7) & 1) << 6
        | ((p >> 6) & 1) << 7
        | ((p >> 3) & 0b111) << 1
        | ((p >> 2) & 1) << 5;
    ((imm as i32) << 20) >> 20
}

/// Reassembles the scattered CB-format branch offset, sign-extended.
fn cb_offset(p: u32) -> i32 {
    let imm = ((p >> 12) & 1) << 8
        | ((p >> 10) & 0b11) << 3
        | ((p >> 5) & 0b11) << 6
        | ((p >> 3) & 0b11) << 1
        | ((p >> 2) & 1) << 5;
    ((imm as i32) << 23) >> 23
}

/// Encodes `jal rd, offset` from a sign-extended offset.
fn encode_jal(rd: u32, offset: i32) -> u32 {
    let imm = offset as u32;
    (((imm >> 20) & 1) << 31)
        | (((imm >> 1) & 0x3ff) << 21)
        | (((imm >> 11) & 1) << 20)
        | (((imm >> 12) & 0xff) << 12)
        | (rd << 7)
        | 0x6f
}

/// Encodes `beq/bne rs1, x0, offset` from a sign-extended offset.
fn encode_branch(funct3: u32, rs1: u32, offset: i32) -> u32 {
    let imm = offset as u32;
    (((imm >> 12) & 1) << 31)
        | (((imm >> 5) & 0x3f) << 25)
        | (rs1 << 15)
        | (funct3 << 12)
        | (((imm >> 1) & 0xf) << 8)
        | (((imm >> 11) & 1) << 7)
        | 0x63
}
