//! # End-To-End Tests
//!
//! Whole programs of real encodings run through the harness.

use vtsim_core::common::constants::{CAUSE_IP_SHIFT, IPI_IRQ, SR_ET};
use vtsim_core::{Config, Simulator};

fn small_config() -> Config {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut config = Config::default();
    config.memory.memsz = 64 * 1024;
    config
}

fn as_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

#[test]
fn test_compute_store_and_halt() {
    let program = [
        0x0050_0093, // addi x1, x0, 5
        0x0070_0113, // addi x2, x0, 7
        0x0020_81b3, // add  x3, x1, x2
        0x1030_2023, // sw   x3, 256(x0)
        0x0010_0213, // addi x4, x0, 1
        0x01e2_1073, // mtpcr x0, x4, tohost
    ];

    let mut sim = Simulator::new(&small_config());
    sim.load_binary_at(&as_bytes(&program), 0);
    sim.start(0);
    sim.run();

    assert!(!sim.hart(0).state.run);
    let result = u32::from_le_bytes(sim.mem(256, 4).try_into().unwrap());
    assert_eq!(result, 12);
}

#[test]
fn test_trap_vectors_into_handler_program() {
    let program = [
        0x0000_0073, // syscall
    ];
    let handler = [
        0x0010_0213, // addi x4, x0, 1
        0x01e2_1073, // mtpcr x0, x4, tohost
    ];

    let mut sim = Simulator::new(&small_config());
    sim.load_binary_at(&as_bytes(&program), 0);
    sim.load_binary_at(&as_bytes(&handler), 0x40);
    {
        let hart = sim.hart_mut(0);
        let sr = hart.state.sr;
        hart.set_sr(sr | SR_ET);
        hart.state.evec = 0x40;
    }
    sim.start(0);
    sim.run();

    assert!(!sim.hart(0).state.run);
}

#[test]
fn test_ipi_wakes_a_sleeping_hart() {
    let program = [
        0x0010_0213, // addi x4, x0, 1
        0x01e2_1073, // mtpcr x0, x4, tohost
    ];

    let mut config = small_config();
    config.general.nharts = 2;
    let mut sim = Simulator::new(&config);
    sim.load_binary_at(&as_bytes(&program), 0);
    assert!(!sim.hart(1).state.run);

    sim.deliver_ipi(1);

    assert!(sim.hart(1).state.run);
    assert_ne!(
        sim.hart(1).state.cause & (1 << (IPI_IRQ + CAUSE_IP_SHIFT)),
        0
    );

    // Both harts run the same image to completion.
    sim.start(0);
    sim.run();
    assert!(!sim.hart(0).state.run);
    assert!(!sim.hart(1).state.run);
}
