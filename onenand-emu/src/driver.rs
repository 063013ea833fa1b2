// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Low-level driver interface consumed by the generic OneNAND layer.

use crate::bufferram::BufferArea;
use crate::chip::{ChipState, FlashState};
use crate::command::Command;
use crate::controller::Controller;
use crate::error::Result;
use crate::lock::LockReport;
use crate::regs::RegisterBus;
use crate::timer::TickSource;

/// Operations a OneNAND chip driver must provide.
pub trait OneNandDriver {
    fn read_word(&mut self, reg: u32) -> u16;

    fn write_word(&mut self, value: u16, reg: u32);

    fn command(&mut self, chip: &mut ChipState, cmd: Command, addr: u64, len: usize) -> Result<()>;

    fn wait(&mut self, chip: &mut ChipState, state: FlashState) -> Result<()>;

    fn bbt_wait(&mut self, chip: &mut ChipState, state: FlashState) -> Result<()>;

    /// Copy bytes out of the current BufferRAM.
    fn read_bufferram(
        &mut self,
        chip: &ChipState,
        area: BufferArea,
        buf: &mut [u8],
        offset: usize,
    ) -> Result<()>;

    /// Copy bytes into the current BufferRAM.
    fn write_bufferram(
        &mut self,
        chip: &ChipState,
        area: BufferArea,
        buf: &[u8],
        offset: usize,
    ) -> Result<()>;

    fn unlock_all(&mut self, chip: &mut ChipState) -> LockReport;
}

impl<B: RegisterBus, T: TickSource> Controller<B, T> {
    /// Copy bytes out of the chip's current BufferRAM half.
    pub fn read_bufferram(
        &self,
        chip: &ChipState,
        area: BufferArea,
        buf: &mut [u8],
        offset: usize,
    ) -> Result<()> {
        let index = chip.current_bufferram();
        self.bufferram.read(&chip.geometry, area, index, offset, buf)
    }

    /// Copy bytes into the chip's current BufferRAM half.
    pub fn write_bufferram(
        &mut self,
        chip: &ChipState,
        area: BufferArea,
        buf: &[u8],
        offset: usize,
    ) -> Result<()> {
        let index = chip.current_bufferram();
        self.bufferram.write(&chip.geometry, area, index, offset, buf)
    }
}

impl<B: RegisterBus, T: TickSource> OneNandDriver for Controller<B, T> {
    fn read_word(&mut self, reg: u32) -> u16 {
        Controller::read_word(self, reg)
    }

    fn write_word(&mut self, value: u16, reg: u32) {
        Controller::write_word(self, value, reg)
    }

    fn command(&mut self, chip: &mut ChipState, cmd: Command, addr: u64, len: usize) -> Result<()> {
        Controller::command(self, chip, cmd, addr, len)
    }

    fn wait(&mut self, chip: &mut ChipState, state: FlashState) -> Result<()> {
        Controller::wait(self, chip, state)
    }

    fn bbt_wait(&mut self, chip: &mut ChipState, state: FlashState) -> Result<()> {
        Controller::bbt_wait(self, chip, state)
    }

    fn read_bufferram(
        &mut self,
        chip: &ChipState,
        area: BufferArea,
        buf: &mut [u8],
        offset: usize,
    ) -> Result<()> {
        Controller::read_bufferram(self, chip, area, buf, offset)
    }

    fn write_bufferram(
        &mut self,
        chip: &ChipState,
        area: BufferArea,
        buf: &[u8],
        offset: usize,
    ) -> Result<()> {
        Controller::write_bufferram(self, chip, area, buf, offset)
    }

    fn unlock_all(&mut self, chip: &mut ChipState) -> LockReport {
        Controller::unlock_all(self, chip)
    }
}
