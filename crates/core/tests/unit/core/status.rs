//! # Status Register Tests
//!
//! Write-port masking, feature gating, MMU propagation, and the derived
//! register width.

use crate::common::harness::TestContext;
use vtsim_core::common::constants::{
    FSR_ZERO, SR_EC, SR_EF, SR_ET, SR_EV, SR_IM, SR_S, SR_SX, SR_UX, SR_VM, SR_ZERO,
};
use vtsim_core::config::FeatureSet;

#[test]
fn test_set_sr_clears_reserved_bits() {
    let mut ctx = TestContext::new();

    ctx.proc.set_sr(0xffff_ffff);

    assert_eq!(ctx.proc.state.sr & SR_ZERO, 0);
}

#[test]
fn test_set_sr_is_a_fixed_point() {
    let mut ctx = TestContext::new();

    for value in [0u32, 0xffff_ffff, SR_S | SR_SX | SR_ET, SR_IM | SR_VM] {
        ctx.proc.set_sr(value);
        let once = ctx.proc.state.sr;
        ctx.proc.set_sr(once);
        assert_eq!(ctx.proc.state.sr, once);
    }
}

#[test]
fn test_set_sr_masks_disabled_features() {
    let features = FeatureSet {
        rv64: false,
        fpu: false,
        compressed: false,
        vector: false,
    };
    let mut ctx = TestContext::with_features(features);

    ctx.proc.set_sr(SR_S | SR_SX | SR_UX | SR_EF | SR_EC | SR_EV);

    let sr = ctx.proc.state.sr;
    assert_eq!(sr & (SR_SX | SR_UX), 0);
    assert_eq!(sr & SR_EF, 0);
    assert_eq!(sr & SR_EC, 0);
    assert_eq!(sr & SR_EV, 0);
    assert_ne!(sr & SR_S, 0);
}

#[test]
fn test_set_sr_keeps_enabled_features() {
    let mut ctx = TestContext::new();

    ctx.proc.set_sr(SR_S | SR_SX | SR_EF | SR_EC | SR_EV);

    let sr = ctx.proc.state.sr;
    assert_ne!(sr & SR_EF, 0);
    assert_ne!(sr & SR_EC, 0);
    assert_ne!(sr & SR_EV, 0);
}

#[test]
fn test_xprlen_follows_active_privilege_width() {
    let mut ctx = TestContext::new();

    ctx.proc.set_sr(SR_S | SR_SX);
    assert_eq!(ctx.proc.state.xprlen, 64);

    // Supervisor without SX is narrow even if UX is set.
    ctx.proc.set_sr(SR_S | SR_UX);
    assert_eq!(ctx.proc.state.xprlen, 32);

    // User width comes from UX.
    ctx.proc.set_sr(SR_UX);
    assert_eq!(ctx.proc.state.xprlen, 64);

    ctx.proc.set_sr(0);
    assert_eq!(ctx.proc.state.xprlen, 32);
}

#[test]
fn test_xprlen_is_32_without_the_wide_feature() {
    let features = FeatureSet {
        rv64: false,
        ..FeatureSet::default()
    };
    let mut ctx = TestContext::with_features(features);

    ctx.proc.set_sr(SR_S | SR_SX);

    assert_eq!(ctx.proc.state.xprlen, 32);
}

#[test]
fn test_set_sr_propagates_translation_state_to_mmu() {
    let mut ctx = TestContext::new();

    ctx.proc.set_sr(SR_S | SR_SX | SR_VM);
    assert!(ctx.proc.mmu.vm_enabled());
    assert!(ctx.proc.mmu.supervisor());

    ctx.proc.set_sr(SR_SX);
    assert!(!ctx.proc.mmu.vm_enabled());
    assert!(!ctx.proc.mmu.supervisor());
}

#[test]
fn test_set_fsr_clears_reserved_bits() {
    let mut ctx = TestContext::new();

    ctx.proc.set_fsr(0xffff_ffff);

    assert_eq!(ctx.proc.state.fsr & FSR_ZERO, 0);
    assert_eq!(ctx.proc.state.fsr, 0xff);
}
