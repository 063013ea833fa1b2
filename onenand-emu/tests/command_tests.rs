// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Tests for command dispatch onto the controller windows.

mod common;

use common::{chip, controller, map, words, Access, GEO};
use onenand_emu::lock::block_range;
use onenand_emu::regs::{ctrl, TSRF};
use onenand_emu::{
    BufferArea, ChipOptions, ChipState, Command, Error, Geometry, Reg, Window, S3C64XX,
};

// =============================================================================
// READ_OOB
// =============================================================================

#[test]
fn test_read_oob_sets_and_clears_transfer_spare() {
    let mut ctrl = controller();
    let mut chip = chip();

    ctrl.command(&mut chip, Command::ReadOob, GEO.page_offset(1, 2), 0).unwrap();

    assert_eq!(ctrl.bus().reg_writes(Reg::TransSpare), vec![TSRF, 0]);
    let set = ctrl.bus().position(|a| *a == Access::WriteReg(Reg::TransSpare, TSRF)).unwrap();
    let clear = ctrl.bus().position(|a| *a == Access::WriteReg(Reg::TransSpare, 0)).unwrap();
    let first_read = ctrl.bus().position(|a| matches!(a, Access::ReadCmd(_))).unwrap();
    assert!(set < first_read && first_read < clear);
}

#[test]
fn test_read_oob_transfers_main_before_spare() {
    let mut ctrl = controller();
    let mut chip = chip();
    let main: Vec<u8> = vec![0x11; 2048];
    let spare: Vec<u8> = (0..64).collect();
    ctrl.bus_mut().data.extend(words(&main));
    ctrl.bus_mut().data.extend(words(&spare));

    ctrl.command(&mut chip, Command::ReadOob, GEO.page_offset(1, 2), 0).unwrap();

    assert_eq!(ctrl.bus().cmd_reads().len(), (2048 + 64) / 4);
    assert!(ctrl
        .bus()
        .cmd_reads()
        .iter()
        .all(|&a| a == map(&S3C64XX, Window::Data, 1, 2)));

    let mut out_main = vec![0u8; 2048];
    let mut out_spare = vec![0u8; 64];
    ctrl.read_bufferram(&chip, BufferArea::Data, &mut out_main, 0).unwrap();
    ctrl.read_bufferram(&chip, BufferArea::Spare, &mut out_spare, 0).unwrap();
    assert_eq!(out_main, main);
    assert_eq!(out_spare, spare);
}

#[test]
fn test_read_oob_with_oversized_spare_does_not_touch_transfer_flag() {
    let mut ctrl = controller();
    let mut chip = ChipState::new(Geometry::new(2048, 128, 64, 16), ChipOptions::NONE);

    assert_eq!(
        ctrl.command(&mut chip, Command::ReadOob, 0, 0),
        Err(Error::Geometry)
    );
    assert!(ctrl.bus().reg_writes(Reg::TransSpare).is_empty());
    assert!(ctrl.bus().cmd_reads().is_empty());
    assert_eq!(chip.bufferram_index, 0);
}

// =============================================================================
// PROGRAM / PROGRAM_OOB
// =============================================================================

#[test]
fn test_program_oob_dummy_main_then_spare() {
    let mut ctrl = controller();
    let mut chip = chip();
    let spare: Vec<u8> = (100..164).collect();
    ctrl.write_bufferram(&chip, BufferArea::Spare, &spare, 0).unwrap();
    // Main data in the buffer must not be sent
    ctrl.write_bufferram(&chip, BufferArea::Data, &[0u8; 2048], 0).unwrap();

    ctrl.command(&mut chip, Command::ProgramOob, GEO.page_offset(4, 0), 0).unwrap();

    let writes = ctrl.bus().cmd_writes();
    assert_eq!(writes.len(), (2048 + 64) / 4);
    let target = map(&S3C64XX, Window::Data, 4, 0);
    assert!(writes.iter().all(|&(addr, _)| addr == target));
    assert!(writes[..512].iter().all(|&(_, v)| v == u32::MAX));
    let sent: Vec<u32> = writes[512..].iter().map(|&(_, v)| v).collect();
    assert_eq!(sent, words(&spare));
    assert_eq!(ctrl.bus().reg_writes(Reg::TransSpare), vec![TSRF, 0]);
}

#[test]
fn test_program_does_not_touch_transfer_spare() {
    let mut ctrl = controller();
    let mut chip = chip();

    ctrl.command(&mut chip, Command::Program, 0, 0).unwrap();

    assert!(ctrl.bus().reg_writes(Reg::TransSpare).is_empty());
    assert_eq!(ctrl.bus().cmd_writes().len(), 512);
}

// =============================================================================
// Control commands
// =============================================================================

#[test]
fn test_single_word_control_commands() {
    let cases = [
        (Command::Erase, ctrl::ERASE_START),
        (Command::MultiBlockErase, ctrl::MULTI_ERASE_SET),
        (Command::EraseVerify, ctrl::ERASE_VERIFY),
        (Command::UnlockAll, ctrl::UNLOCK_ALL),
    ];
    for (cmd, code) in cases {
        let mut ctrl = controller();
        let mut chip = chip();

        ctrl.command(&mut chip, cmd, GEO.page_offset(7, 0), 0).unwrap();

        assert_eq!(
            ctrl.bus().cmd_writes(),
            vec![(map(&S3C64XX, Window::Control, 7, 0), code)],
            "{:?}",
            cmd
        );
        assert!(ctrl.bus().cmd_reads().is_empty());
    }
}

#[test]
fn test_lock_single_block_range() {
    let mut ctrl = controller();
    let mut chip = chip();
    let block5 = map(&S3C64XX, Window::Control, 5, 0);

    ctrl.command(&mut chip, Command::Lock, GEO.page_offset(5, 0), GEO.block_size() as usize)
        .unwrap();

    assert_eq!(
        ctrl.bus().cmd_writes(),
        vec![(block5, ctrl::LOCK_START), (block5, ctrl::LOCK_END)]
    );
}

#[test]
fn test_block_range_saturates_at_last_block() {
    let last = (u32::MAX as u64) << GEO.erase_shift;
    let two_blocks = 2 * GEO.block_size() as usize;

    assert_eq!(block_range(&GEO, last, two_blocks), (u32::MAX, u32::MAX));
    assert_eq!(block_range(&GEO, 0, usize::MAX), (0, u32::MAX));
    assert_eq!(block_range(&GEO, GEO.page_offset(3, 0), 1), (3, 3));
}

#[test]
fn test_unlock_range_start_and_end() {
    let mut ctrl = controller();
    let mut chip = chip();
    let len = 3 * GEO.block_size() as usize;

    ctrl.command(&mut chip, Command::Unlock, GEO.page_offset(2, 0), len).unwrap();

    assert_eq!(
        ctrl.bus().cmd_writes(),
        vec![
            (map(&S3C64XX, Window::Control, 2, 0), ctrl::UNLOCK_START),
            (map(&S3C64XX, Window::Control, 4, 0), ctrl::UNLOCK_END),
        ]
    );
}

// =============================================================================
// BufferRAM index handling
// =============================================================================

#[test]
fn test_bufferram_command_only_toggles() {
    let mut ctrl = controller();
    let mut chip = chip();

    ctrl.command(&mut chip, Command::BufferRam, 0, 0).unwrap();
    assert_eq!(chip.bufferram_index, 1);
    ctrl.command(&mut chip, Command::BufferRam, 0, 0).unwrap();
    assert_eq!(chip.bufferram_index, 0);
    assert!(ctrl.bus().log.is_empty());
}

#[test]
fn test_only_reads_advance_bufferram() {
    let mut ctrl = controller();
    let mut chip = chip();

    for cmd in [Command::Program, Command::ProgramOob, Command::Erase, Command::UnlockAll] {
        ctrl.command(&mut chip, cmd, 0, 0).unwrap();
        assert_eq!(chip.bufferram_index, 0, "{:?}", cmd);
    }
    ctrl.command(&mut chip, Command::ReadOob, 0, 0).unwrap();
    assert_eq!(chip.bufferram_index, 1);
}

#[test]
fn test_failed_read_keeps_bufferram_index() {
    let mut ctrl = controller();
    let mut chip = ChipState::new(Geometry::new(4096, 128, 64, 16), ChipOptions::NONE);

    assert_eq!(ctrl.command(&mut chip, Command::Read, 0, 0), Err(Error::Geometry));
    assert_eq!(ctrl.command(&mut chip, Command::ReadOob, 0, 0), Err(Error::Geometry));
    assert_eq!(chip.bufferram_index, 0);
    assert!(ctrl.bus().log.is_empty());
}

#[test]
fn test_read_with_oversized_spare_still_reads_main() {
    let mut ctrl = controller();
    let mut chip = ChipState::new(Geometry::new(2048, 128, 64, 16), ChipOptions::NONE);

    ctrl.command(&mut chip, Command::Read, 0, 0).unwrap();

    assert_eq!(chip.bufferram_index, 1);
    assert_eq!(ctrl.bus().cmd_reads().len(), 2048 / 4);
}

#[test]
fn test_opcodes() {
    assert_eq!(Command::Read.opcode(), 0x00);
    assert_eq!(Command::ReadOob.opcode(), 0x13);
    assert_eq!(Command::Program.opcode(), 0x80);
    assert_eq!(Command::ProgramOob.opcode(), 0x1A);
    assert_eq!(Command::Erase.opcode(), 0x94);
    assert_eq!(Command::UnlockAll.opcode(), 0x27);
}
