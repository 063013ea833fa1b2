// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Controller register table and the bus abstraction used to reach it.
//!
//! Registers are addressed by name through [`Reg`], never by overlaying a
//! struct on the register block. The bulk access region is reached through
//! command addresses built by [`crate::soc::Window`].

/// Named registers of the controller register block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reg {
    MemCfg,
    BurstLen,
    MemReset,
    IntErrStat,
    IntErrMask,
    IntErrAck,
    EccErrStat,
    ManufactId,
    DeviceId,
    DataBufSize,
    BootBufSize,
    BufAmount,
    Tech,
    Fba,
    Fpa,
    Fsa,
    SyncMode,
    TransSpare,
    ErrPageAddr,
    IntPinEn,
    AccClock,
    ErrBlkAddr,
    FlashVerId,
    ColdReset,
    DdpDevice,
    TransMode,
}

impl Reg {
    /// Byte offset from the register block base.
    pub const fn offset(self) -> u32 {
        match self {
            Reg::MemCfg => 0x000,
            Reg::BurstLen => 0x010,
            Reg::MemReset => 0x020,
            Reg::IntErrStat => 0x030,
            Reg::IntErrMask => 0x040,
            Reg::IntErrAck => 0x050,
            Reg::EccErrStat => 0x060,
            Reg::ManufactId => 0x070,
            Reg::DeviceId => 0x080,
            Reg::DataBufSize => 0x090,
            Reg::BootBufSize => 0x0A0,
            Reg::BufAmount => 0x0B0,
            Reg::Tech => 0x0C0,
            Reg::Fba => 0x0D0,
            Reg::Fpa => 0x0E0,
            Reg::Fsa => 0x0F0,
            Reg::SyncMode => 0x130,
            Reg::TransSpare => 0x140,
            Reg::ErrPageAddr => 0x180,
            Reg::IntPinEn => 0x1A0,
            Reg::AccClock => 0x1C0,
            Reg::ErrBlkAddr => 0x1E0,
            Reg::FlashVerId => 0x1F0,
            Reg::ColdReset => 0x2A0,
            Reg::DdpDevice => 0x2B0,
            Reg::TransMode => 0x2E0,
        }
    }
}

/// Size of the register block in bytes.
pub const REG_BLOCK_SIZE: u32 = 0x400;

/// `MemReset` values.
pub const MEM_RESET_WARM: u32 = 0x1;
pub const MEM_RESET_COLD: u32 = 0x2;
pub const MEM_RESET_HOT: u32 = 0x3;

/// `IntErrStat` / `IntErrAck` bits.
pub mod int {
    pub const CACHE_OP_ERR: u32 = 1 << 13;
    pub const RST_CMP: u32 = 1 << 12;
    pub const RDY_ACT: u32 = 1 << 11;
    pub const INT_ACT: u32 = 1 << 10;
    pub const UNSUP_CMD: u32 = 1 << 9;
    pub const LOCKED_BLK: u32 = 1 << 8;
    pub const BLK_RW_CMP: u32 = 1 << 7;
    pub const ERS_CMP: u32 = 1 << 6;
    pub const PGM_CMP: u32 = 1 << 5;
    pub const LOAD_CMP: u32 = 1 << 4;
    pub const ERS_FAIL: u32 = 1 << 3;
    pub const PGM_FAIL: u32 = 1 << 2;
    pub const INT_TO: u32 = 1 << 1;
    pub const LD_FAIL_ECC_ERR: u32 = 1 << 0;

    /// Any of these after a wait is a controller fault.
    pub const FAULT_MASK: u32 = LOCKED_BLK | ERS_FAIL | PGM_FAIL | LD_FAIL_ECC_ERR;
}

/// `TransSpare` transfer-spare flag.
pub const TSRF: u32 = 1 << 0;

/// `EccErrStat` value flagging an uncorrectable error in any sector.
pub const ECC_4BIT_UNCORRECTABLE: u32 = 0x1010;

/// Control codes written through the control window.
pub mod ctrl {
    pub const ERASE_STATUS: u32 = 0x00;
    pub const MULTI_ERASE_SET: u32 = 0x01;
    pub const ERASE_START: u32 = 0x03;
    pub const UNLOCK_START: u32 = 0x08;
    pub const UNLOCK_END: u32 = 0x09;
    pub const LOCK_START: u32 = 0x0A;
    pub const LOCK_END: u32 = 0x0B;
    pub const LOCK_TIGHT_START: u32 = 0x0C;
    pub const LOCK_TIGHT_END: u32 = 0x0D;
    pub const UNLOCK_ALL: u32 = 0x0E;
    pub const OTP_ACCESS: u32 = 0x12;
    pub const SPARE_ACCESS_ONLY: u32 = 0x13;
    pub const MAIN_ACCESS_ONLY: u32 = 0x14;
    pub const ERASE_VERIFY: u32 = 0x15;
    pub const MAIN_SPARE_ACCESS: u32 = 0x16;
    pub const PIPELINE_READ: u32 = 0x4000;
}

/// Word-level access to the controller.
///
/// Implemented by [`MmioBus`] on hardware and by software models on the
/// host. All accesses are 32 bits wide.
pub trait RegisterBus {
    /// Read a named register.
    fn read_reg(&mut self, reg: Reg) -> u32;

    /// Write a named register.
    fn write_reg(&mut self, reg: Reg, value: u32);

    /// Read one word at a window-tagged command address.
    fn read_cmd(&mut self, cmd_addr: u32) -> u32;

    /// Write one word at a window-tagged command address.
    fn write_cmd(&mut self, cmd_addr: u32, value: u32);
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read_reg(&mut self, reg: Reg) -> u32 {
        (**self).read_reg(reg)
    }

    fn write_reg(&mut self, reg: Reg, value: u32) {
        (**self).write_reg(reg, value)
    }

    fn read_cmd(&mut self, cmd_addr: u32) -> u32 {
        (**self).read_cmd(cmd_addr)
    }

    fn write_cmd(&mut self, cmd_addr: u32, value: u32) {
        (**self).write_cmd(cmd_addr, value)
    }
}

#[cfg(feature = "embedded")]
pub use mmio::MmioBus;

#[cfg(feature = "embedded")]
mod mmio {
    use super::{Reg, RegisterBus, REG_BLOCK_SIZE};
    use crate::soc::SocVariant;

    /// Volatile MMIO access to the controller of one SoC variant.
    pub struct MmioBus {
        reg_base: usize,
        ahb_base: usize,
        ahb_span: u32,
    }

    impl MmioBus {
        /// Create a bus for the controller at the variant's base addresses.
        ///
        /// # Safety
        /// The variant must describe the SoC actually running this code and
        /// nothing else may access the controller while the bus is alive.
        pub unsafe fn new(soc: &SocVariant) -> Self {
            Self {
                reg_base: soc.reg_base as usize,
                ahb_base: soc.ahb_base as usize,
                ahb_span: soc.ahb_span(),
            }
        }

        fn reg_ptr(&self, reg: Reg) -> *mut u32 {
            let offset = reg.offset();
            debug_assert!(offset < REG_BLOCK_SIZE);
            (self.reg_base + offset as usize) as *mut u32
        }

        fn cmd_ptr(&self, cmd_addr: u32) -> Option<*mut u32> {
            if cmd_addr >= self.ahb_span || cmd_addr & 0x3 != 0 {
                error!("command address 0x{:08x} outside bulk region", cmd_addr);
                return None;
            }
            Some((self.ahb_base + cmd_addr as usize) as *mut u32)
        }
    }

    impl RegisterBus for MmioBus {
        fn read_reg(&mut self, reg: Reg) -> u32 {
            unsafe { self.reg_ptr(reg).read_volatile() }
        }

        fn write_reg(&mut self, reg: Reg, value: u32) {
            unsafe { self.reg_ptr(reg).write_volatile(value) }
        }

        fn read_cmd(&mut self, cmd_addr: u32) -> u32 {
            match self.cmd_ptr(cmd_addr) {
                Some(ptr) => unsafe { ptr.read_volatile() },
                None => u32::MAX,
            }
        }

        fn write_cmd(&mut self, cmd_addr: u32, value: u32) {
            if let Some(ptr) = self.cmd_ptr(cmd_addr) {
                unsafe { ptr.write_volatile(value) }
            }
        }
    }
}
