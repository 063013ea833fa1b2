// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Word register emulation for the generic OneNAND probe code.
//!
//! The generic layer expects a flat 16-bit register file at the chip's
//! base. This controller has no such file: identity and configuration
//! reads are redirected to dedicated controller registers, configuration
//! and lock-range writes are dropped, and READ_ID/RESET written into the
//! BootRAM range switch the boot-mode readback on and off. Anything else
//! goes straight through the direct-access window and is reported.

use crate::controller::Controller;
use crate::regs::{Reg, RegisterBus, MEM_RESET_COLD};
use crate::soc::Window;
use crate::timer::TickSource;

/// Byte offsets of the OneNAND chip register file.
pub mod onenand {
    pub const BOOTRAM: u32 = 0x0000;
    pub const DATARAM: u32 = 0x0200;
    pub const SPARERAM: u32 = 0x1_0020;

    pub const REG_MANUFACTURER_ID: u32 = 0x1_E000;
    pub const REG_DEVICE_ID: u32 = 0x1_E002;
    pub const REG_VERSION_ID: u32 = 0x1_E004;
    pub const REG_DATA_BUFFER_SIZE: u32 = 0x1_E006;
    pub const REG_BOOT_BUFFER_SIZE: u32 = 0x1_E008;
    pub const REG_NUM_BUFFERS: u32 = 0x1_E00A;
    pub const REG_TECHNOLOGY: u32 = 0x1_E00C;
    pub const REG_START_ADDRESS1: u32 = 0x1_E200;
    pub const REG_START_ADDRESS2: u32 = 0x1_E202;
    pub const REG_START_ADDRESS8: u32 = 0x1_E20E;
    pub const REG_START_BUFFER: u32 = 0x1_E400;
    pub const REG_COMMAND: u32 = 0x1_E440;
    pub const REG_SYS_CFG1: u32 = 0x1_E442;
    pub const REG_CTRL_STATUS: u32 = 0x1_E480;
    pub const REG_INTERRUPT: u32 = 0x1_E482;
    pub const REG_START_BLOCK_ADDRESS: u32 = 0x1_E498;
    pub const REG_WP_STATUS: u32 = 0x1_E49C;
    pub const REG_ECC_STATUS: u32 = 0x1_FE00;

    /// Write-protect status: block is unlocked.
    pub const WP_US: u16 = 1 << 2;
    pub const WP_LS: u16 = 1 << 1;
    pub const WP_LTS: u16 = 1 << 0;

    pub const CMD_READID: u16 = 0x90;
    pub const CMD_RESET: u16 = 0xF0;
}

impl<B: RegisterBus, T: TickSource> Controller<B, T> {
    /// Read the 16-bit chip register at byte offset `reg`.
    pub fn read_word(&mut self, reg: u32) -> u16 {
        let word_addr = reg >> 1;

        // Probe-time identity registers
        let redirect = match reg {
            onenand::REG_MANUFACTURER_ID => Some(Reg::ManufactId),
            onenand::REG_DEVICE_ID => Some(Reg::DeviceId),
            onenand::REG_VERSION_ID => Some(Reg::FlashVerId),
            onenand::REG_DATA_BUFFER_SIZE => Some(Reg::DataBufSize),
            onenand::REG_TECHNOLOGY => Some(Reg::Tech),
            onenand::REG_SYS_CFG1 => Some(Reg::MemCfg),
            // Polled by unlock-all
            onenand::REG_CTRL_STATUS => return 0,
            onenand::REG_WP_STATUS => return onenand::WP_US,
            _ => None,
        };
        if let Some(target) = redirect {
            return self.bus.read_reg(target) as u16;
        }

        if reg < onenand::DATARAM && self.bootram_command {
            let target = match word_addr {
                0 => Some(Reg::ManufactId),
                1 => Some(Reg::DeviceId),
                2 => Some(Reg::FlashVerId),
                _ => None,
            };
            if let Some(target) = target {
                return self.bus.read_reg(target) as u16;
            }
        }

        let cmd_addr = self.cmd_addr(Window::Direct, word_addr);
        let value = (self.bus.read_cmd(cmd_addr) & 0xffff) as u16;
        info!(
            "onenand: read_word: illegal access at reg 0x{:x}, value 0x{:x}",
            word_addr,
            value
        );
        value
    }

    /// Write the 16-bit chip register at byte offset `reg`.
    pub fn write_word(&mut self, value: u16, reg: u32) {
        let word_addr = reg >> 1;

        match reg {
            // Writing MemCfg through hangs the controller
            onenand::REG_SYS_CFG1 => return,
            onenand::REG_START_ADDRESS1 | onenand::REG_START_ADDRESS2 => return,
            // Lock ranges are issued as control commands instead
            onenand::REG_START_BLOCK_ADDRESS => return,
            _ => {}
        }

        if reg < onenand::DATARAM {
            if value == onenand::CMD_READID {
                self.bootram_command = true;
                return;
            }
            if value == onenand::CMD_RESET {
                self.bus.write_reg(Reg::MemReset, MEM_RESET_COLD);
                self.bootram_command = false;
                return;
            }
        }

        info!(
            "onenand: write_word: illegal access at reg 0x{:x}, value 0x{:x}",
            word_addr,
            value
        );
        let cmd_addr = self.cmd_addr(Window::Direct, word_addr);
        self.bus.write_cmd(cmd_addr, u32::from(value));
    }
}
