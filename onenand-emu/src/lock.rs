// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Block locking, unlock-all and the lock-status audit.

use heapless::Vec;

use crate::chip::{ChipState, FlashState, Geometry};
use crate::command::Command;
use crate::controller::Controller;
use crate::regs::{ctrl, int, Reg, RegisterBus};
use crate::soc::Window;
use crate::timer::TickSource;

/// Locked block numbers kept in a [`LockReport`].
pub const LOCK_REPORT_CAPACITY: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockOp {
    Lock,
    Unlock,
}

impl LockOp {
    /// Control codes for the start and end block of a range.
    const fn codes(self) -> (u32, u32) {
        match self {
            LockOp::Lock => (ctrl::LOCK_START, ctrl::LOCK_END),
            LockOp::Unlock => (ctrl::UNLOCK_START, ctrl::UNLOCK_END),
        }
    }
}

/// Result of a lock-status audit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LockReport {
    /// Blocks probed.
    pub blocks: u32,
    /// Blocks found write-protected.
    pub locked: u32,
    /// First locked block numbers, up to [`LOCK_REPORT_CAPACITY`].
    pub first_locked: Vec<u32, LOCK_REPORT_CAPACITY>,
}

impl LockReport {
    pub fn is_clean(&self) -> bool {
        self.locked == 0
    }
}

/// Inclusive block range covered by `len` bytes at `ofs`.
///
/// A length shorter than one block still covers the starting block. The end
/// saturates at the last representable block number.
pub fn block_range(geo: &Geometry, ofs: u64, len: usize) -> (u32, u32) {
    let start = (ofs >> geo.erase_shift) as u32;
    let count = ((len as u64) >> geo.erase_shift).clamp(1, u32::MAX as u64) as u32;
    (start, start.saturating_add(count - 1))
}

impl<B: RegisterBus, T: TickSource> Controller<B, T> {
    /// Write the start/end control words for a lock or unlock range.
    pub(crate) fn write_lock_range(&mut self, geo: &Geometry, ofs: u64, len: usize, op: LockOp) {
        let (start, end) = block_range(geo, ofs, len);
        let start_mem_addr = self.mem_addr(start, 0, 0);
        let end_mem_addr = self.mem_addr(end, 0, 0);
        let (start_code, end_code) = op.codes();

        debug!("onenand: {} blocks {}..={}", op, start, end);

        let start_addr = self.cmd_addr(Window::Control, start_mem_addr);
        let end_addr = self.cmd_addr(Window::Control, end_mem_addr);
        self.bus.write_cmd(start_addr, start_code);
        self.bus.write_cmd(end_addr, end_code);
    }

    /// Lock or unlock `len` bytes of blocks at `ofs` and wait for it.
    ///
    /// The wait result is not propagated; [`Controller::check_lock_status`]
    /// is the way to find blocks that did not change.
    pub fn lock_range(&mut self, chip: &mut ChipState, ofs: u64, len: usize, op: LockOp) {
        let geo = chip.geometry;
        self.write_lock_range(&geo, ofs, len, op);
        let _ = self.wait(chip, FlashState::Locking);
    }

    /// Probe every block and report the write-protected ones.
    pub fn check_lock_status(&mut self, chip: &ChipState) -> LockReport {
        self.check_lock_status_with(chip, |_, _| {})
    }

    /// Like [`Controller::check_lock_status`], calling `on_block` with each
    /// block number and whether it is locked.
    pub fn check_lock_status_with<F>(&mut self, chip: &ChipState, mut on_block: F) -> LockReport
    where
        F: FnMut(u32, bool),
    {
        let end = chip.geometry.blocks();
        let mut report = LockReport {
            blocks: end,
            ..LockReport::default()
        };

        for block in 0..end {
            let probe = self.cmd_addr(Window::Data, self.mem_addr(block, 0, 0));
            self.bus.read_cmd(probe);

            let locked = self.bus.read_reg(Reg::IntErrStat) & int::LOCKED_BLK != 0;
            if locked {
                warn!("block {} is write-protected!", block);
                self.bus.write_reg(Reg::IntErrAck, int::LOCKED_BLK);
                report.locked += 1;
                let _ = report.first_locked.push(block);
            }
            on_block(block, locked);
        }

        report
    }

    /// Unlock every block of the chip, then audit the result.
    pub fn unlock_all(&mut self, chip: &mut ChipState) -> LockReport {
        self.unlock_all_with(chip, |_, _| {})
    }

    /// [`Controller::unlock_all`] with a per-block audit callback.
    pub fn unlock_all_with<F>(&mut self, chip: &mut ChipState, on_block: F) -> LockReport
    where
        F: FnMut(u32, bool),
    {
        let mut ofs = 0u64;
        let mut len = chip.geometry.chip_size;

        // Sub-page writes are not supported by this controller
        chip.subpage_size = chip.geometry.page_size;
        chip.subpage_shift = 0;

        if chip.has_unlock_all() {
            let _ = self.command(chip, Command::UnlockAll, 0, 0);
            let _ = self.wait(chip, FlashState::Locking);

            if !chip.is_ddp() {
                return self.check_lock_status_with(chip, on_block);
            }

            // Unlock-all only reaches the first die
            ofs = chip.geometry.chip_size >> 1;
            len = chip.geometry.chip_size >> 1;
        }

        self.lock_range(chip, ofs, len as usize, LockOp::Unlock);
        self.check_lock_status_with(chip, on_block)
    }
}
