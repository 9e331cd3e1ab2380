//! # Vector Configuration Tests
//!
//! The vlmax recomputation, vector-length clamping, and the micro-thread
//! pool.

use crate::common::harness::TestContext;
use vtsim_core::common::constants::{MAX_UTS, SR_EF, SR_EV};
use vtsim_core::core::ArchState;

fn vector_state() -> ArchState {
    let mut state = ArchState::new();
    state.nxfpr_bank = 256;
    state.vecbanks_count = 8;
    state
}

// === vcfg ===

#[test]
fn test_vcfg_with_no_register_use_spans_all_banks() {
    let mut state = vector_state();
    state.nxpr_use = 0;
    state.nfpr_use = 0;

    state.vcfg();

    let unclamped: u32 = 256 * 8;
    assert_eq!(state.vlmax, u32::min(unclamped, MAX_UTS as u32));
}

#[test]
fn test_vcfg_divides_bank_capacity_among_registers() {
    let mut state = vector_state();
    state.nxpr_use = 32;
    state.nfpr_use = 32;

    state.vcfg();

    // 256 / 63 = 4 elements per bank, times 8 banks.
    assert_eq!(state.vlmax, 32);
}

#[test]
fn test_vcfg_single_register_counts_as_free() {
    let mut state = vector_state();
    state.nxpr_use = 1;
    state.nfpr_use = 0;

    state.vcfg();

    assert_eq!(state.vlmax, u32::min(256 * 8, MAX_UTS as u32));
}

#[test]
fn test_vcfg_clamps_to_pool_bound() {
    let mut state = vector_state();
    state.nxfpr_bank = 4096;
    state.vecbanks_count = 8;
    state.nxpr_use = 0;
    state.nfpr_use = 0;

    state.vcfg();

    assert_eq!(state.vlmax, MAX_UTS as u32);
}

// === setvl ===

#[test]
fn test_setvl_clamps_to_vlmax() {
    let mut state = vector_state();
    state.vlmax = 32;

    assert_eq!(state.setvl(64), 32);
    assert_eq!(state.vl, 32);
}

#[test]
fn test_setvl_accepts_requests_below_vlmax() {
    let mut state = vector_state();
    state.vlmax = 32;

    assert_eq!(state.setvl(10), 10);
    assert_eq!(state.vl, 10);
}

#[test]
fn test_setvl_clamps_negative_requests_to_zero() {
    let mut state = vector_state();
    state.vlmax = 32;
    state.vl = 7;

    assert_eq!(state.setvl(-5), 0);
    assert_eq!(state.vl, 0);
}

#[test]
fn test_vl_never_exceeds_vlmax() {
    let mut state = vector_state();
    for (nxpr, nfpr) in [(0, 0), (2, 2), (32, 32), (63, 63)] {
        state.nxpr_use = nxpr;
        state.nfpr_use = nfpr;
        state.vcfg();
        for request in [-1i64, 0, 1, 31, 32, 33, 4096, i64::MAX] {
            state.setvl(request);
            assert!(state.vl <= state.vlmax);
            assert!(state.vlmax <= MAX_UTS as u32);
        }
    }
}

// === micro-thread pool ===

#[test]
fn test_init_allocates_the_full_pool() {
    let mut ctx = TestContext::new();

    ctx.proc.init(2, None, None);

    assert_eq!(ctx.proc.uts.len(), MAX_UTS);
}

#[test]
fn test_micro_threads_share_id_and_are_indexed() {
    let mut ctx = TestContext::new();
    ctx.proc.init(2, None, None);

    for (i, ut) in ctx.proc.uts.iter().enumerate().take(4) {
        assert_eq!(ut.state.id, 2);
        assert_eq!(ut.state.utidx, i as i32);
        assert!(ut.uts.is_empty());
    }
    assert_eq!(ctx.proc.state.utidx, -1);
}

#[test]
fn test_micro_threads_start_with_fpu_and_vector_enabled() {
    let mut ctx = TestContext::new();
    ctx.proc.init(0, None, None);

    let ut = &ctx.proc.uts[0];
    assert_ne!(ut.state.sr & SR_EF, 0);
    assert_ne!(ut.state.sr & SR_EV, 0);
}

#[test]
fn test_micro_threads_share_physical_memory() {
    let mut ctx = TestContext::new();
    ctx.proc.init(0, None, None);

    ctx.proc.mmu.store_u64(0x800, 0xdead_beef).unwrap();
    let observed = ctx.proc.uts[0].mmu.load_u64(0x800).unwrap();

    assert_eq!(observed, 0xdead_beef);
}
