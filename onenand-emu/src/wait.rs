// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Completion waiting and failure classification.
//!
//! After a command the interrupt status register is polled until a flag of
//! the awaited operation shows up or the 20 ms deadline passes. The status
//! is then re-read and acknowledged unconditionally, so a timed-out wait
//! still leaves the register clean for the next operation.
//!
//! A deadline that passes without any flag is reported as success: the
//! status model has no way to tell it apart from a completed operation.

use crate::chip::{ChipState, FlashState};
use crate::controller::{Controller, WAIT_TIMEOUT_MS};
use crate::error::{Error, Result};
use crate::regs::{int, Reg, RegisterBus, ECC_4BIT_UNCORRECTABLE};
use crate::timer::{poll_until, PollOutcome, TickSource};

/// Status flags that end the polling loop for `state`.
pub const fn completion_flags(state: FlashState) -> u32 {
    let base = int::INT_ACT;
    match state {
        FlashState::Reading => base | int::BLK_RW_CMP | int::LOAD_CMP,
        FlashState::Writing => base | int::BLK_RW_CMP | int::PGM_CMP,
        FlashState::Erasing => base | int::BLK_RW_CMP | int::ERS_CMP,
        FlashState::Locking => base | int::BLK_RW_CMP,
        FlashState::Ready | FlashState::Resetting => base,
    }
}

impl<B: RegisterBus, T: TickSource> Controller<B, T> {
    /// Poll for `flags`, then read and acknowledge the interrupt status.
    fn poll_status(&mut self, flags: u32) -> u32 {
        let bus = &mut self.bus;
        let outcome = poll_until(&mut self.ticks, WAIT_TIMEOUT_MS, || {
            bus.read_reg(Reg::IntErrStat) & flags != 0
        });

        // Re-read so a timeout still reports the latest status
        let stat = self.bus.read_reg(Reg::IntErrStat);
        self.bus.write_reg(Reg::IntErrAck, stat);

        if outcome == PollOutcome::TimedOut {
            debug!("onenand: wait timed out (status 0x{:04x})", stat);
        }
        stat
    }

    fn ecc_uncorrectable(&mut self) -> Option<u32> {
        let ecc = self.bus.read_reg(Reg::EccErrStat);
        (ecc & ECC_4BIT_UNCORRECTABLE != 0).then_some(ecc)
    }

    /// Wait for the operation `state` to complete.
    ///
    /// ECC status is examined before the controller fault bits: after a
    /// power-off recovery only the ECC status is reliable.
    pub fn wait(&mut self, chip: &mut ChipState, state: FlashState) -> Result<()> {
        let stat = self.poll_status(completion_flags(state));

        if stat & int::LOAD_CMP != 0 {
            if let Some(ecc) = self.ecc_uncorrectable() {
                info!("onenand: ECC error = 0x{:04x}", ecc);
                chip.ecc_stats.failed = chip.ecc_stats.failed.wrapping_add(1);
                return Err(Error::UncorrectableEcc { ecc_status: ecc });
            }
        }

        if stat & int::FAULT_MASK != 0 {
            info!("onenand: controller error = 0x{:04x}", stat);
            if stat & int::LOCKED_BLK != 0 {
                info!("onenand: it's locked error = 0x{:04x}", stat);
            }
            return Err(Error::ControllerFault { status: stat });
        }

        Ok(())
    }

    /// Wait used while scanning for the bad block table.
    ///
    /// Any load or ECC failure resets the controller and reports
    /// [`Error::BadBlockRead`].
    pub fn bbt_wait(&mut self, _chip: &mut ChipState, _state: FlashState) -> Result<()> {
        let stat = self.poll_status(int::INT_ACT | int::LOAD_CMP);

        if stat & int::LD_FAIL_ECC_ERR != 0 {
            self.reset();
            return Err(Error::BadBlockRead);
        }

        if stat & int::LOAD_CMP != 0 && self.ecc_uncorrectable().is_some() {
            self.reset();
            return Err(Error::BadBlockRead);
        }

        Ok(())
    }
}
