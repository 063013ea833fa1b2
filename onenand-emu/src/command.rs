// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command dispatch: BufferRAM-style commands to controller window accesses.
//!
//! Data commands move whole pages between the data window and the current
//! BufferRAM half, one 32-bit word at a time. Control commands are single
//! writes to the control window. Nothing here waits; completion is observed
//! by a following [`Controller::wait`].

use crate::bufferram::{BufferArea, BufferRam};
use crate::chip::{ChipState, Geometry};
use crate::controller::Controller;
use crate::error::Result;
use crate::lock::LockOp;
use crate::regs::{ctrl, Reg, RegisterBus, TSRF};
use crate::soc::Window;
use crate::timer::TickSource;

/// Commands the generic OneNAND layer issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Read,
    ReadOob,
    Program,
    ProgramOob,
    /// Only advance the BufferRAM index.
    BufferRam,
    Erase,
    MultiBlockErase,
    EraseVerify,
    UnlockAll,
    Lock,
    Unlock,
}

impl Command {
    /// OneNAND command register opcode.
    pub const fn opcode(self) -> u16 {
        match self {
            Command::Read => 0x00,
            Command::ReadOob => 0x13,
            Command::Program => 0x80,
            Command::ProgramOob => 0x1A,
            Command::BufferRam => 0x1978,
            Command::Erase => 0x94,
            Command::MultiBlockErase => 0x95,
            Command::EraseVerify => 0x71,
            Command::UnlockAll => 0x27,
            Command::Lock => 0x2A,
            Command::Unlock => 0x23,
        }
    }

    /// Commands that switch to the other BufferRAM before selecting a half.
    pub const fn advances_bufferram(self) -> bool {
        matches!(self, Command::Read | Command::ReadOob | Command::BufferRam)
    }
}

/// Word-copy from a command address into `dst`.
fn read_words<B: RegisterBus>(bus: &mut B, cmd_addr: u32, dst: &mut [u8]) {
    for word in dst.chunks_exact_mut(4) {
        word.copy_from_slice(&bus.read_cmd(cmd_addr).to_le_bytes());
    }
}

/// Word-copy `src` to a command address.
fn write_words<B: RegisterBus>(bus: &mut B, cmd_addr: u32, src: &[u8]) {
    for word in src.chunks_exact(4) {
        bus.write_cmd(cmd_addr, u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
    }
}

/// Write `count` all-ones words to a command address.
fn dummy_write<B: RegisterBus>(bus: &mut B, cmd_addr: u32, count: usize) {
    for _ in 0..count {
        bus.write_cmd(cmd_addr, u32::MAX);
    }
}

impl<B: RegisterBus, T: TickSource> Controller<B, T> {
    /// Issue `cmd` for the flash byte offset `addr`.
    ///
    /// `len` is only used by `Lock`/`Unlock`, where it is the length of the
    /// block range starting at `addr`.
    pub fn command(
        &mut self,
        chip: &mut ChipState,
        cmd: Command,
        addr: u64,
        len: usize,
    ) -> Result<()> {
        let geo = chip.geometry;
        let fba = (addr >> geo.erase_shift) as u32;
        let fpa = (addr >> geo.page_shift) as u32 & geo.page_mask;
        let mem_addr = self.mem_addr(fba, fpa, 0);
        let cmd_map_01 = self.cmd_addr(Window::Data, mem_addr);
        let cmd_map_10 = self.cmd_addr(Window::Control, mem_addr);

        trace!("onenand: cmd 0x{:04x} block {} page {}", cmd.opcode(), fba, fpa);

        // A read that cannot fit leaves the index where it was
        match cmd {
            Command::Read => BufferRam::check_area(&geo, BufferArea::Data)?,
            Command::ReadOob => BufferRam::check_geometry(&geo)?,
            _ => {}
        }
        if cmd.advances_bufferram() {
            chip.next_bufferram();
        }
        // One snapshot of the index for the whole transfer
        let index = chip.current_bufferram();

        match cmd {
            Command::Read => {
                let main = self.bufferram.half_mut(&geo, BufferArea::Data, index)?;
                read_words(&mut self.bus, cmd_map_01, main);
            }
            Command::ReadOob => {
                self.bus.write_reg(Reg::TransSpare, TSRF);
                let result = self.read_main_and_spare(&geo, index, cmd_map_01);
                self.bus.write_reg(Reg::TransSpare, 0);
                result?;
            }
            Command::Program => {
                let main = self.bufferram.half(&geo, BufferArea::Data, index)?;
                write_words(&mut self.bus, cmd_map_01, main);
            }
            Command::ProgramOob => {
                BufferRam::check_geometry(&geo)?;
                self.bus.write_reg(Reg::TransSpare, TSRF);
                // Main area must be clocked through before the spare
                dummy_write(&mut self.bus, cmd_map_01, geo.page_size as usize / 4);
                let result = self
                    .bufferram
                    .half(&geo, BufferArea::Spare, index)
                    .map(|spare| write_words(&mut self.bus, cmd_map_01, spare));
                self.bus.write_reg(Reg::TransSpare, 0);
                result?;
            }
            Command::BufferRam => {}
            Command::UnlockAll => self.bus.write_cmd(cmd_map_10, ctrl::UNLOCK_ALL),
            Command::Erase => self.bus.write_cmd(cmd_map_10, ctrl::ERASE_START),
            Command::MultiBlockErase => self.bus.write_cmd(cmd_map_10, ctrl::MULTI_ERASE_SET),
            Command::EraseVerify => self.bus.write_cmd(cmd_map_10, ctrl::ERASE_VERIFY),
            Command::Lock => self.write_lock_range(&geo, addr, len, LockOp::Lock),
            Command::Unlock => self.write_lock_range(&geo, addr, len, LockOp::Unlock),
        }

        Ok(())
    }

    fn read_main_and_spare(&mut self, geo: &Geometry, index: usize, cmd_map_01: u32) -> Result<()> {
        let main = self.bufferram.half_mut(geo, BufferArea::Data, index)?;
        read_words(&mut self.bus, cmd_map_01, main);
        let spare = self.bufferram.half_mut(geo, BufferArea::Spare, index)?;
        read_words(&mut self.bus, cmd_map_01, spare);
        Ok(())
    }
}
