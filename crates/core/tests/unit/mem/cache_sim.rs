//! # Cache Sink Tests
//!
//! Hit/miss accounting, eviction under the round-robin policy, and
//! counter reset.

use vtsim_core::mem::CacheSim;

#[test]
fn test_first_access_misses_then_hits() {
    let mut sim = CacheSim::new(4, 2, 16, "L1");

    sim.tick(0x40);
    sim.tick(0x40);
    sim.tick(0x44); // same line

    assert_eq!(sim.accesses(), 3);
    assert_eq!(sim.misses(), 1);
}

#[test]
fn test_ways_hold_colliding_lines() {
    let mut sim = CacheSim::new(4, 2, 16, "L1");

    // Two tags mapping to set 0; a 2-way set holds both.
    sim.tick(0x000);
    sim.tick(0x100);
    sim.tick(0x000);
    sim.tick(0x100);

    assert_eq!(sim.misses(), 2);
}

#[test]
fn test_eviction_on_set_overflow() {
    let mut sim = CacheSim::new(4, 2, 16, "L1");

    // Three tags in a 2-way set: the third install evicts the first.
    sim.tick(0x000);
    sim.tick(0x100);
    sim.tick(0x200);
    sim.tick(0x000);

    assert_eq!(sim.misses(), 4);
}

#[test]
fn test_reset_stats_zeroes_counters() {
    let mut sim = CacheSim::new(4, 2, 16, "L1");
    sim.tick(0x40);
    sim.tick(0x80);

    sim.reset_stats();

    assert_eq!(sim.accesses(), 0);
    assert_eq!(sim.misses(), 0);
}

#[test]
fn test_template_clone_keeps_geometry() {
    let template = CacheSim::new(8, 4, 64, "ICACHE");
    let mut clone = template.clone();

    clone.tick(0x1000);

    assert_eq!(clone.name(), "ICACHE");
    assert_eq!(clone.accesses(), 1);
    assert_eq!(template.accesses(), 0);
}
