//! # Instruction Semantics Tests
//!
//! Handler behavior exercised through the dispatch table: arithmetic edge
//! cases, control transfer, memory access, privilege and feature gating,
//! control-register moves, and the vector-thread group.

use crate::common::harness::TestContext;
use vtsim_core::common::constants::{SR_ET, SR_EV, SR_PS, SR_S, SR_SX};
use vtsim_core::common::{Insn, Signal, Trap};
use vtsim_core::core::dispatch;
use vtsim_core::core::Processor;

fn exec(p: &mut Processor, bits: u32, pc: u64) -> Result<u64, Signal> {
    dispatch::table().dispatch(p, Insn::new(bits), pc)
}

// === integer arithmetic ===

#[test]
fn test_addi_wraps() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = u64::MAX;

    // addi x2, x1, 1
    let next = exec(&mut ctx.proc, 0x0010_8113, 0x100).unwrap();

    assert_eq!(ctx.proc.state.xpr[2], 0);
    assert_eq!(next, 0x104);
}

#[test]
fn test_addiw_truncates_and_sign_extends() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = 0x7fff_ffff;

    // addiw x2, x1, 1
    exec(&mut ctx.proc, 0x0010_811b, 0x100).unwrap();

    assert_eq!(ctx.proc.state.xpr[2], 0xffff_ffff_8000_0000);
}

#[test]
fn test_srai_is_arithmetic() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = (-8i64) as u64;

    // srai x2, x1, 1
    exec(&mut ctx.proc, 0x4010_d113, 0x100).unwrap();

    assert_eq!(ctx.proc.state.xpr[2] as i64, -4);
}

#[test]
fn test_sltu_is_unsigned() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = 1;
    ctx.proc.state.xpr[2] = u64::MAX;

    // sltu x3, x1, x2
    exec(&mut ctx.proc, 0x0020_b1b3, 0x100).unwrap();

    assert_eq!(ctx.proc.state.xpr[3], 1);
}

#[test]
fn test_div_by_zero_yields_all_ones() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = 42;
    ctx.proc.state.xpr[2] = 0;

    // div x3, x1, x2
    exec(&mut ctx.proc, 0x0220_c1b3, 0x100).unwrap();

    assert_eq!(ctx.proc.state.xpr[3], u64::MAX);
}

#[test]
fn test_div_overflow_wraps() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = i64::MIN as u64;
    ctx.proc.state.xpr[2] = (-1i64) as u64;

    exec(&mut ctx.proc, 0x0220_c1b3, 0x100).unwrap();

    assert_eq!(ctx.proc.state.xpr[3], i64::MIN as u64);
}

// === control transfer ===

#[test]
fn test_jal_links_past_the_instruction() {
    let mut ctx = TestContext::new();

    // jal x1, 8
    let next = exec(&mut ctx.proc, 0x0080_00ef, 0x100).unwrap();

    assert_eq!(next, 0x108);
    assert_eq!(ctx.proc.state.xpr[1], 0x104);
}

#[test]
fn test_jalr_clears_the_low_bit() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = 0x203;

    // jalr x2, x1, 0
    let next = exec(&mut ctx.proc, 0x0000_8167, 0x100).unwrap();

    assert_eq!(next, 0x202);
    assert_eq!(ctx.proc.state.xpr[2], 0x104);
}

#[test]
fn test_branch_taken_and_not_taken() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = 7;
    ctx.proc.state.xpr[2] = 7;

    // beq x1, x2, 8
    let taken = exec(&mut ctx.proc, 0x0020_8463, 0x100).unwrap();
    assert_eq!(taken, 0x108);

    ctx.proc.state.xpr[2] = 8;
    let not_taken = exec(&mut ctx.proc, 0x0020_8463, 0x100).unwrap();
    assert_eq!(not_taken, 0x104);
}

#[test]
fn test_blt_is_signed() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = (-1i64) as u64;
    ctx.proc.state.xpr[2] = 1;

    // blt x1, x2, 8
    let next = exec(&mut ctx.proc, 0x0020_c463, 0x100).unwrap();

    assert_eq!(next, 0x108);
}

// === memory access ===

#[test]
fn test_load_store_round_trip() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = 0x200;
    ctx.proc.state.xpr[2] = 0xdead_beef_cafe_f00d;

    // sd x2, 8(x1) then ld x3, 8(x1)
    exec(&mut ctx.proc, 0x0020_b423, 0x100).unwrap();
    exec(&mut ctx.proc, 0x0080_b183, 0x104).unwrap();

    assert_eq!(ctx.proc.state.xpr[3], 0xdead_beef_cafe_f00d);
}

#[test]
fn test_lw_sign_extends() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = 0x200;
    ctx.proc.mmu.store_u32(0x200, 0x8000_0000).unwrap();

    // lw x3, 0(x1)
    exec(&mut ctx.proc, 0x0000_a183, 0x100).unwrap();

    assert_eq!(ctx.proc.state.xpr[3], 0xffff_ffff_8000_0000);
}

#[test]
fn test_misaligned_load_signals_trap() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = 0x201;

    // lw x3, 0(x1)
    let result = exec(&mut ctx.proc, 0x0000_a183, 0x100);

    assert_eq!(result, Err(Signal::Trap(Trap::LoadAddressMisaligned)));
}

// === system ===

#[test]
fn test_syscall_and_break_signal_their_traps() {
    let mut ctx = TestContext::new();

    assert_eq!(
        exec(&mut ctx.proc, 0x0000_0073, 0x100),
        Err(Signal::Trap(Trap::Syscall))
    );
    assert_eq!(
        exec(&mut ctx.proc, 0x0010_0073, 0x100),
        Err(Signal::Trap(Trap::Breakpoint))
    );
}

#[test]
fn test_eret_returns_to_epc_and_restores_mode() {
    let mut ctx = TestContext::new();
    // As left by trap entry: supervisor, PS set (came from supervisor),
    // traps disabled.
    ctx.proc.set_sr(SR_S | SR_SX | SR_PS);
    ctx.proc.state.epc = 0x2000;

    // eret
    let next = exec(&mut ctx.proc, 0x1000_0073, 0x100).unwrap();

    assert_eq!(next, 0x2000);
    assert_ne!(ctx.proc.state.sr & SR_S, 0);
    assert_ne!(ctx.proc.state.sr & SR_ET, 0);
}

#[test]
fn test_eret_drops_to_user_when_ps_clear() {
    let mut ctx = TestContext::new();
    ctx.proc.set_sr(SR_S | SR_SX);
    ctx.proc.state.epc = 0x2000;

    exec(&mut ctx.proc, 0x1000_0073, 0x100).unwrap();

    assert_eq!(ctx.proc.state.sr & SR_S, 0);
}

#[test]
fn test_eret_requires_supervisor() {
    let mut ctx = TestContext::new();
    ctx.proc.set_sr(SR_SX);

    let result = exec(&mut ctx.proc, 0x1000_0073, 0x100);

    assert_eq!(result, Err(Signal::Trap(Trap::PrivilegedInstruction)));
}

#[test]
fn test_mtpcr_mfpcr_round_trip_scratch_register() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = 0xabcd;

    // mtpcr x0, x1, k0 then mfpcr x2, k0
    exec(&mut ctx.proc, 0x00c0_9073, 0x100).unwrap();
    exec(&mut ctx.proc, 0x00c0_2173, 0x104).unwrap();

    assert_eq!(ctx.proc.state.pcr_k0, 0xabcd);
    assert_eq!(ctx.proc.state.xpr[2], 0xabcd);
}

#[test]
fn test_pcr_moves_require_supervisor() {
    let mut ctx = TestContext::new();
    ctx.proc.set_sr(SR_SX);

    let result = exec(&mut ctx.proc, 0x00c0_2173, 0x100);

    assert_eq!(result, Err(Signal::Trap(Trap::PrivilegedInstruction)));
}

#[test]
fn test_unknown_pcr_is_illegal() {
    let mut ctx = TestContext::new();

    // mfpcr x2, pcr 40
    let result = exec(&mut ctx.proc, 0x0280_2173, 0x100);

    assert_eq!(result, Err(Signal::Trap(Trap::IllegalInstruction)));
}

#[test]
fn test_compare_write_acknowledges_timer() {
    use vtsim_core::common::constants::{CAUSE_IP_SHIFT, TIMER_IRQ};

    let mut ctx = TestContext::new();
    ctx.proc.state.cause = 1 << (TIMER_IRQ + CAUSE_IP_SHIFT);
    ctx.proc.state.xpr[1] = 500;

    // mtpcr x0, x1, compare
    exec(&mut ctx.proc, 0x0050_9073, 0x100).unwrap();

    assert_eq!(ctx.proc.state.compare, 500);
    assert_eq!(ctx.proc.state.cause, 0);
}

#[test]
fn test_nonzero_tohost_write_halts() {
    let mut ctx = TestContext::new();
    ctx.proc.state.xpr[1] = 1;

    // mtpcr x0, x1, tohost
    let result = exec(&mut ctx.proc, 0x01e0_9073, 0x100);

    assert_eq!(result, Err(Signal::Halt));
}

// === floating point ===

#[test]
fn test_fp_requires_the_enable_bit() {
    let mut ctx = TestContext::new();
    // Reset state leaves EF clear.

    // fmv.d.x x0 -> f1
    let result = exec(&mut ctx.proc, 0xf200_00d3, 0x100);

    assert_eq!(result, Err(Signal::Trap(Trap::FpDisabled)));
}

#[test]
fn test_fadd_d_adds_doubles() {
    let mut ctx = TestContext::new();
    let sr = ctx.proc.state.sr;
    ctx.proc.set_sr(sr | vtsim_core::common::constants::SR_EF);
    ctx.proc.state.fpr[1] = 1.5f64.to_bits();
    ctx.proc.state.fpr[2] = 2.25f64.to_bits();

    // fadd.d f3, f1, f2
    exec(&mut ctx.proc, 0x0220_81d3, 0x100).unwrap();

    assert_eq!(f64::from_bits(ctx.proc.state.fpr[3]), 3.75);
}

#[test]
fn test_fld_fsd_round_trip() {
    let mut ctx = TestContext::new();
    let sr = ctx.proc.state.sr;
    ctx.proc.set_sr(sr | vtsim_core::common::constants::SR_EF);
    ctx.proc.state.xpr[1] = 0x200;
    ctx.proc.state.fpr[2] = 2.5f64.to_bits();

    // fsd f2, 0(x1) then fld f3, 0(x1)
    exec(&mut ctx.proc, 0x0020_b027, 0x100).unwrap();
    exec(&mut ctx.proc, 0x0000_b187, 0x104).unwrap();

    assert_eq!(f64::from_bits(ctx.proc.state.fpr[3]), 2.5);
}

// === vector thread ===

#[test]
fn test_vector_ops_require_the_enable_bit() {
    let mut ctx = TestContext::new();

    // vsetvl x1, x1
    let result = exec(&mut ctx.proc, 0x0000_908b, 0x100);

    assert_eq!(result, Err(Signal::Trap(Trap::VectorDisabled)));
}

#[test]
fn test_vsetvl_writes_back_the_granted_length() {
    let mut ctx = TestContext::new();
    ctx.proc.set_sr(SR_S | SR_SX | SR_EV);
    ctx.proc.state.xpr[1] = 100;

    // vsetvl x2, x1
    exec(&mut ctx.proc, 0x0000_910b, 0x100).unwrap();

    assert_eq!(ctx.proc.state.xpr[2], 32);
    assert_eq!(ctx.proc.state.vl, 32);
}

#[test]
fn test_vsetcfg_reconfigures_vlmax() {
    let mut ctx = TestContext::new();
    ctx.proc.set_sr(SR_S | SR_SX | SR_EV);

    // vsetcfg with nxpr = 4, nfpr = 4: 256 / 7 * 8 = 288, clamped later
    // by setvl requests.
    let imm = (4u32 << 6) | 4;
    exec(&mut ctx.proc, (imm << 20) | 0x0b, 0x100).unwrap();

    assert_eq!(ctx.proc.state.nxpr_use, 4);
    assert_eq!(ctx.proc.state.nfpr_use, 4);
    assert_eq!(ctx.proc.state.vlmax, (256 / 7) * 8);
}

#[test]
fn test_vsetcfg_with_no_banks_is_a_bank_fault() {
    let mut ctx = TestContext::new();
    ctx.proc.set_sr(SR_S | SR_SX | SR_EV);
    ctx.proc.state.xpr[1] = 0;

    // mtpcr x0, x1, vecbank: disable every bank, then reconfigure.
    exec(&mut ctx.proc, 0x0120_9073, 0x100).unwrap();
    let result = exec(&mut ctx.proc, 0x0000_000b, 0x104);

    assert_eq!(ctx.proc.state.vecbanks_count, 0);
    assert_eq!(result, Err(Signal::Trap(Trap::VectorBank)));
}

#[test]
fn test_vmvv_broadcasts_to_active_micro_threads() {
    let mut ctx = TestContext::new();
    ctx.proc.init(0, None, None);
    ctx.proc.set_sr(SR_S | SR_SX | SR_EV);
    ctx.proc.state.vl = 4;
    ctx.proc.state.xpr[1] = 0x77;

    // vmvv x5 <- x1
    exec(&mut ctx.proc, 0x0000_c28b, 0x100).unwrap();

    for ut in ctx.proc.uts.iter().take(4) {
        assert_eq!(ut.state.xpr[5], 0x77);
    }
    assert_eq!(ctx.proc.uts[4].state.xpr[5], 0);
}

#[test]
fn test_utidx_distinguishes_primary_from_micro_thread() {
    let mut ctx = TestContext::new();
    ctx.proc.set_sr(SR_S | SR_SX | SR_EV);

    // utidx x1
    exec(&mut ctx.proc, 0x0000_208b, 0x100).unwrap();

    assert_eq!(ctx.proc.state.xpr[1], u64::MAX);
}
