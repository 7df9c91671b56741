//! End-to-end pipeline scenarios.
//!
//! Whole programs built from encoded instructions, run through the loader
//! and the full out-of-order core to the termination sentinel.

use crate::common::encode::*;
use crate::common::{processor, processor_with_config, run_program, run_program_with_data};
use rv32_core::config::Config;
use rv32_core::isa::{decode, Instruction};

#[test]
fn test_immediate_only() {
    let exit = run_program(&[addi(10, 0, 7), halt()]);
    assert_eq!(exit, 7);
}

#[test]
fn test_sentinel_does_not_overwrite_a0() {
    let mut cpu = processor(&[addi(10, 0, 7), halt()], &[]);
    assert_eq!(cpu.run().unwrap(), 7);
    // a0 still holds the pre-sentinel value
    assert_eq!(cpu.register(10), 7);
}

#[test]
fn test_raw_hazard() {
    let exit = run_program(&[
        addi(5, 0, 3),
        addi(6, 0, 4),
        add(10, 5, 6),
        halt(),
    ]);
    assert_eq!(exit, 7);
}

#[test]
fn test_raw_chain_through_same_register() {
    let exit = run_program(&[
        addi(5, 0, 1),
        addi(5, 5, 1),
        addi(5, 5, 1),
        addi(10, 5, 0),
        halt(),
    ]);
    assert_eq!(exit, 3);
}

#[test]
fn test_taken_branch_skips_instruction() {
    let exit = run_program(&[
        addi(5, 0, 1),
        beq(5, 5, 8),
        addi(10, 0, 99), // skipped
        addi(10, 0, 42),
        halt(),
    ]);
    assert_eq!(exit, 42);
}

#[test]
fn test_not_taken_branch_falls_through() {
    let exit = run_program(&[
        addi(5, 0, 1),
        beq(5, 0, 8), // x5 != x0: not taken
        addi(10, 0, 33),
        halt(),
    ]);
    assert_eq!(exit, 33);
}

#[test]
fn test_load_store_round_trip() {
    let exit = run_program_with_data(
        &[
            lui(5, 1), // x5 = 0x1000
            lw(6, 5, 0),
            sw(6, 5, 4),
            lw(10, 5, 4),
            halt(),
        ],
        &[(0x1000, 0xDEAD_BEEF)],
    );
    assert_eq!(exit, 0xEF);
}

#[test]
fn test_store_visible_in_memory_after_run() {
    let mut cpu = processor(
        &[
            addi(5, 0, 77),
            sw(5, 0, 0x100),
            halt(),
        ],
        &[],
    );
    cpu.run().unwrap();
    assert_eq!(cpu.memory().read_word(0x100), 77);
}

#[test]
fn test_jal_link_value() {
    let exit = run_program(&[
        jal(1, 8),       // link = 4, jump over the next instruction
        addi(10, 0, 1),  // skipped
        add(10, 1, 0),   // x10 = link
        halt(),
    ]);
    assert_eq!(exit, 4);
}

#[test]
fn test_jalr_indirect_jump_and_link() {
    let exit = run_program(&[
        addi(1, 0, 16),
        jalr(5, 1, 0),   // to 16, link x5 = 8
        addi(10, 0, 55), // squashed
        addi(10, 0, 56), // squashed
        add(10, 5, 0),   // at 16: x10 = 8
        halt(),
    ]);
    assert_eq!(exit, 8);
}

#[test]
fn test_mispredicted_loop_recovery() {
    // Counts x5 down from 5; the loop branch is mispredicted at least on
    // first sight and at exit.
    let mut cpu = processor(
        &[
            addi(5, 0, 5),
            addi(5, 5, -1),
            bne(5, 0, -4),
            addi(10, 0, 0),
            halt(),
        ],
        &[],
    );
    assert_eq!(cpu.run().unwrap(), 0);
    assert_eq!(cpu.register(5), 0);
    assert!(cpu.stats.mispredictions >= 2);
    assert!(cpu.stats.flushes >= 2);
}

#[test]
fn test_squashed_store_never_reaches_memory() {
    let mut cpu = processor(
        &[
            addi(5, 0, 1),
            beq(5, 5, 8),   // taken: the store below is wrong-path
            sw(5, 0, 0x100), // squashed
            addi(10, 0, 9),
            halt(),
        ],
        &[],
    );
    assert_eq!(cpu.run().unwrap(), 9);
    assert_eq!(cpu.memory().read_word(0x100), 0);
}

#[test]
fn test_committed_store_survives_recovery() {
    // The store commits before the mispredicted branch resolves its
    // recovery; its write must still land.
    let mut cpu = processor(
        &[
            addi(5, 0, 7),
            sw(5, 0, 0x100),
            addi(6, 0, 1),
            bne(6, 0, 8),   // taken; first sight is predicted not-taken
            addi(7, 0, 2),  // squashed
            addi(10, 0, 3),
            halt(),
        ],
        &[],
    );
    assert_eq!(cpu.run().unwrap(), 3);
    assert_eq!(cpu.memory().read_word(0x100), 7);
}

#[test]
fn test_x0_writes_are_dropped() {
    let exit = run_program(&[
        addi(0, 0, 5),
        add(10, 0, 0),
        halt(),
    ]);
    assert_eq!(exit, 0);
}

#[test]
fn test_jal_link_to_x0_is_discarded() {
    let exit = run_program(&[
        jal(0, 8),
        addi(10, 0, 1), // skipped
        add(10, 0, 0),  // x10 = x0 = 0
        halt(),
    ]);
    assert_eq!(exit, 0);
}

#[test]
fn test_at_most_one_commit_per_cycle() {
    let mut cpu = processor(
        &[
            addi(5, 0, 3),
            addi(6, 0, 4),
            add(10, 5, 6),
            halt(),
        ],
        &[],
    );
    let mut committed = 0;
    for _ in 0..1000 {
        let before = cpu.stats.committed;
        let done = cpu.step().unwrap();
        assert!(cpu.stats.committed - before <= 1);
        if done.is_some() {
            committed = cpu.stats.committed;
            break;
        }
    }
    assert_eq!(committed, 4);
}

#[test]
fn test_upper_immediates() {
    // LUI then mask: 0xABCDE000 >> 12 & 0xFF via SRLI
    let exit = run_program(&[
        lui(5, 0xABCDE),
        srli(10, 5, 12),
        andi(10, 10, 0xFF),
        halt(),
    ]);
    assert_eq!(exit, 0xDE);

    // AUIPC at pc=4 with imm 0 is 4
    let exit = run_program(&[
        addi(0, 0, 0),
        auipc(10, 0),
        halt(),
    ]);
    assert_eq!(exit, 4);
}

#[test]
fn test_signed_vs_unsigned_byte_loads() {
    // lb sign-extends 0x85; a logical shift right by 8 exposes the
    // extension bits, lbu leaves them clear.
    let exit = run_program_with_data(
        &[
            lui(5, 1),
            lb(6, 5, 0),
            srli(10, 6, 8),
            andi(10, 10, 0xFF),
            halt(),
        ],
        &[(0x1000, 0x85)],
    );
    assert_eq!(exit, 0xFF);

    let exit = run_program_with_data(
        &[
            lui(5, 1),
            lbu(6, 5, 0),
            srli(10, 6, 8),
            halt(),
        ],
        &[(0x1000, 0x85)],
    );
    assert_eq!(exit, 0);
}

#[test]
fn test_byte_store_merges_into_word() {
    let mut cpu = processor(
        &[
            lui(5, 1),
            addi(6, 0, 0x42),
            sb(6, 5, 1),
            lw(10, 5, 0),
            halt(),
        ],
        &[(0x1000, 0x1111_1111)],
    );
    assert_eq!(cpu.run().unwrap(), 0x11);
    assert_eq!(cpu.memory().read_word(0x1000), 0x1111_4211);
}

#[test]
fn test_arith_mix() {
    let exit = run_program(&[
        addi(5, 0, -8),
        srai(6, 5, 2),   // -2
        sub(7, 0, 6),    // 2
        sll(7, 7, 7),    // 2 << 2 = 8
        slt(8, 5, 0),    // 1
        add(10, 7, 8),   // 9
        xor(10, 10, 0),  // unchanged
        halt(),
    ]);
    assert_eq!(exit, 9);
}

#[test]
fn test_branch_loop_with_memory_traffic() {
    // Sums the words 1..=4 stored at 0x1000.. into x10.
    let words = [
        lui(5, 1),        // base
        addi(6, 0, 4),    // counter
        addi(10, 0, 0),   // acc
        // loop:
        lw(7, 5, 0),      // 0x0C
        add(10, 10, 7),
        addi(5, 5, 4),
        addi(6, 6, -1),
        bne(6, 0, -16),
        halt(),
    ];
    let data = [(0x1000, 1), (0x1004, 2), (0x1008, 3), (0x100C, 4)];
    let exit = run_program_with_data(&words, &data);
    assert_eq!(exit, 10);
}

#[test]
fn test_single_cycle_memory_config() {
    let config = Config {
        mem_latency: 1,
        ..Config::default()
    };
    let mut cpu = processor_with_config(
        &[
            lui(5, 1),
            lw(10, 5, 0),
            halt(),
        ],
        &[(0x1000, 123)],
        &config,
    );
    assert_eq!(cpu.run().unwrap(), 123);
}

#[test]
fn test_small_rob_still_correct() {
    let config = Config {
        rob_entries: 2,
        rs_entries: 2,
        lsb_entries: 2,
        ..Config::default()
    };
    let mut cpu = processor_with_config(
        &[
            addi(5, 0, 3),
            addi(6, 0, 4),
            add(10, 5, 6),
            halt(),
        ],
        &[],
        &config,
    );
    assert_eq!(cpu.run().unwrap(), 7);
}

#[test]
fn test_invalid_instruction_with_empty_rob_is_fatal() {
    // A word of zeros decodes to nothing; with no in-flight instructions
    // there is no recovery path.
    let mut cpu = processor(&[0x0000_0000], &[]);
    assert!(cpu.run().is_err());
}

#[test]
fn test_decoder_round_trip() {
    let vectors = [
        addi(10, 0, -5),
        add(3, 4, 5),
        sub(3, 4, 5),
        lw(6, 5, -4),
        sw(6, 5, 12),
        beq(1, 2, -8),
        bne(1, 2, 4094),
        blt(1, 2, 16),
        jal(1, -2048),
        jalr(1, 2, 100),
        lui(7, 0xFFFFF),
        auipc(7, 1),
        srai(2, 3, 31),
    ];
    for word in vectors {
        let instr = decode(word);
        assert_ne!(instr, Instruction::Invalid, "word {:#010x}", word);
    }
    // Spot-check full field recovery on a couple of them
    assert_eq!(
        decode(addi(10, 0, -5)),
        Instruction::I {
            op: rv32_core::isa::instruction::IOp::Arith(rv32_core::isa::instruction::AluOp::Add),
            rd: 10,
            rs1: 0,
            imm: -5
        }
    );
    assert_eq!(
        decode(jal(1, -2048)),
        Instruction::J { rd: 1, imm: -2048 }
    );
}
