//! Global architectural constants.
//!
//! This module defines the bit layouts of the architectural control words and
//! the fixed sizes of the simulator. It includes:
//! 1. **Status register:** Field masks for the 32-bit `sr` word.
//! 2. **Cause register:** Exception-code and interrupt-pending subfields.
//! 3. **FP status:** Accrued-flag and rounding-mode fields of `fsr`.
//! 4. **Control registers:** The PCR numbering used by `mfpcr`/`mtpcr`.
//! 5. **Sizes:** Register-file widths, micro-thread pool bound, dispatch
//!    table size.

/// Traps-enabled bit in the status register.
pub const SR_ET: u32 = 1 << 0;

/// FPU-enabled bit in the status register.
pub const SR_EF: u32 = 1 << 1;

/// Vector-unit-enabled bit in the status register.
pub const SR_EV: u32 = 1 << 2;

/// Compressed-encoding-enabled bit in the status register.
pub const SR_EC: u32 = 1 << 3;

/// Previous-supervisor bit in the status register.
pub const SR_PS: u32 = 1 << 4;

/// Supervisor-mode bit in the status register.
pub const SR_S: u32 = 1 << 5;

/// 64-bit user mode bit in the status register.
pub const SR_UX: u32 = 1 << 6;

/// 64-bit supervisor mode bit in the status register.
pub const SR_SX: u32 = 1 << 7;

/// Bit shift of the 8-bit interrupt mask field in the status register.
pub const SR_IM_SHIFT: u32 = 8;

/// Interrupt mask field in the status register.
pub const SR_IM: u32 = 0xff << SR_IM_SHIFT;

/// Virtual-memory-enabled bit in the status register.
pub const SR_VM: u32 = 1 << 16;

/// Reserved status-register bits; always read as zero.
pub const SR_ZERO: u32 =
    !(SR_ET | SR_EF | SR_EV | SR_EC | SR_PS | SR_S | SR_UX | SR_SX | SR_IM | SR_VM);

/// Accrued exception flags field in the FP status register.
pub const FSR_FLAGS: u32 = 0x1f;

/// Bit shift of the rounding mode field in the FP status register.
pub const FSR_RD_SHIFT: u32 = 5;

/// Rounding mode field in the FP status register.
pub const FSR_RD: u32 = 0x7 << FSR_RD_SHIFT;

/// Reserved FP-status bits; always read as zero.
pub const FSR_ZERO: u32 = !(FSR_FLAGS | FSR_RD);

/// Bit shift of the exception code field in the cause register.
pub const CAUSE_EXCCODE_SHIFT: u32 = 0;

/// Exception code field in the cause register.
pub const CAUSE_EXCCODE: u64 = 0x1f << CAUSE_EXCCODE_SHIFT;

/// Bit shift of the 8-bit interrupt-pending field in the cause register.
pub const CAUSE_IP_SHIFT: u32 = 8;

/// Interrupt-pending field in the cause register.
pub const CAUSE_IP: u64 = 0xff << CAUSE_IP_SHIFT;

/// Interrupt number of the inter-processor interrupt.
pub const IPI_IRQ: u32 = 5;

/// Interrupt number of the count/compare timer interrupt.
pub const TIMER_IRQ: u32 = 7;

/// Number of integer registers.
pub const NXPR: usize = 32;

/// Number of floating-point registers.
pub const NFPR: usize = 32;

/// Maximum number of micro-threads a hart may own.
pub const MAX_UTS: usize = 2048;

/// Number of slots in the hashed dispatch table (power of two).
pub const DISPATCH_TABLE_SIZE: usize = 1024;

/// Page size used by the MMU's translation granularity.
pub const PAGE_SIZE: u64 = 4096;

/// Number of bits to shift to convert between bytes and pages.
pub const PAGE_SHIFT: u32 = 12;

/// Status register PCR number.
pub const PCR_STATUS: u32 = 0;

/// Exception PC PCR number.
pub const PCR_EPC: u32 = 1;

/// Faulting address PCR number.
pub const PCR_BADVADDR: u32 = 2;

/// Trap vector PCR number.
pub const PCR_EVEC: u32 = 3;

/// Retired-instruction counter PCR number.
pub const PCR_COUNT: u32 = 4;

/// Timer compare PCR number.
pub const PCR_COMPARE: u32 = 5;

/// Cause register PCR number.
pub const PCR_CAUSE: u32 = 6;

/// Clear-pending-IPI PCR number.
pub const PCR_CLR_IPI: u32 = 9;

/// Hart id PCR number (read-only).
pub const PCR_COREID: u32 = 10;

/// Supervisor scratch register 0 PCR number.
pub const PCR_K0: u32 = 12;

/// Supervisor scratch register 1 PCR number.
pub const PCR_K1: u32 = 13;

/// Vector bank-enable bitmap PCR number.
pub const PCR_VECBANK: u32 = 18;

/// Target-to-host mailbox PCR number.
pub const PCR_TOHOST: u32 = 30;

/// Host-to-target mailbox PCR number.
pub const PCR_FROMHOST: u32 = 31;
