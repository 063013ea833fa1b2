// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Recording register bus and scripted tick source shared by the tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};

use onenand_emu::regs::{int, MEM_RESET_COLD};
use onenand_emu::{
    ChipOptions, ChipState, Controller, Geometry, Reg, RegisterBus, SocVariant, TickSource,
    Window, S3C64XX,
};

/// 16 blocks of 64 x 2 KiB pages.
pub const GEO: Geometry = Geometry::new(2048, 64, 64, 16);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    ReadReg(Reg),
    WriteReg(Reg, u32),
    ReadCmd(u32),
    WriteCmd(u32, u32),
}

/// Bus that records every access and answers from scripted state.
pub struct FakeBus {
    pub soc: &'static SocVariant,
    pub log: Vec<Access>,
    /// Current `IntErrStat` value; acknowledged bits are cleared.
    pub status: u32,
    pub ecc: u32,
    /// Plain register values for everything else.
    pub regs: HashMap<Reg, u32>,
    /// Words returned by successive command-window reads.
    pub data: VecDeque<u32>,
    /// Blocks that raise `LOCKED_BLK` when probed through the data window.
    pub locked: HashSet<u32>,
    /// Whether a cold reset raises `RST_CMP`.
    pub reset_completes: bool,
}

impl FakeBus {
    pub fn new(soc: &'static SocVariant) -> Self {
        Self {
            soc,
            log: Vec::new(),
            status: 0,
            ecc: 0,
            regs: HashMap::new(),
            data: VecDeque::new(),
            locked: HashSet::new(),
            reset_completes: true,
        }
    }

    pub fn cmd_writes(&self) -> Vec<(u32, u32)> {
        self.log
            .iter()
            .filter_map(|a| match a {
                Access::WriteCmd(addr, value) => Some((*addr, *value)),
                _ => None,
            })
            .collect()
    }

    pub fn cmd_reads(&self) -> Vec<u32> {
        self.log
            .iter()
            .filter_map(|a| match a {
                Access::ReadCmd(addr) => Some(*addr),
                _ => None,
            })
            .collect()
    }

    pub fn reg_writes(&self, reg: Reg) -> Vec<u32> {
        self.log
            .iter()
            .filter_map(|a| match a {
                Access::WriteReg(r, value) if *r == reg => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Position of the first access matching `pred`.
    pub fn position(&self, pred: impl Fn(&Access) -> bool) -> Option<usize> {
        self.log.iter().position(pred)
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl RegisterBus for FakeBus {
    fn read_reg(&mut self, reg: Reg) -> u32 {
        self.log.push(Access::ReadReg(reg));
        match reg {
            Reg::IntErrStat => self.status,
            Reg::EccErrStat => self.ecc,
            _ => self.regs.get(&reg).copied().unwrap_or(0),
        }
    }

    fn write_reg(&mut self, reg: Reg, value: u32) {
        self.log.push(Access::WriteReg(reg, value));
        match reg {
            Reg::IntErrAck => self.status &= !value,
            Reg::EccErrStat => self.ecc = value,
            Reg::MemReset if value == MEM_RESET_COLD && self.reset_completes => {
                self.status |= int::RST_CMP
            }
            _ => {
                self.regs.insert(reg, value);
            }
        }
    }

    fn read_cmd(&mut self, cmd_addr: u32) -> u32 {
        self.log.push(Access::ReadCmd(cmd_addr));
        let (window, mem) = self.soc.decode(cmd_addr);
        if window == Window::Data {
            let (block, _, _) = self.soc.unpack(mem);
            if self.locked.contains(&block) {
                self.status |= int::LOCKED_BLK;
            }
        }
        self.data.pop_front().unwrap_or(u32::MAX)
    }

    fn write_cmd(&mut self, cmd_addr: u32, value: u32) {
        self.log.push(Access::WriteCmd(cmd_addr, value));
    }
}

/// Tick source that advances one tick per query at 1 kHz.
pub struct FakeTicks {
    pub now: u64,
    pub hz: u64,
    pub queries: u64,
}

impl FakeTicks {
    pub fn new() -> Self {
        Self {
            now: 0,
            hz: 1000,
            queries: 0,
        }
    }
}

impl TickSource for FakeTicks {
    fn ticks(&mut self) -> u64 {
        self.queries += 1;
        self.now += 1;
        self.now
    }

    fn tick_hz(&self) -> u64 {
        self.hz
    }
}

pub type TestController = Controller<FakeBus, FakeTicks>;

pub fn controller() -> TestController {
    controller_for(&S3C64XX)
}

pub fn controller_for(soc: &'static SocVariant) -> TestController {
    Controller::new(soc, FakeBus::new(soc), FakeTicks::new())
}

pub fn chip() -> ChipState {
    ChipState::new(GEO, ChipOptions::NONE)
}

pub fn chip_with(options: ChipOptions) -> ChipState {
    ChipState::new(GEO, options)
}

/// Command address of `window` for (block, page) on `soc`.
pub fn map(soc: &SocVariant, window: Window, block: u32, page: u32) -> u32 {
    window.address(soc, soc.mem_addr(block, page, 0))
}

/// Little-endian words of `bytes`.
pub fn words(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .collect()
}
