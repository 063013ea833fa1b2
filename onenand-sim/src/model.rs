// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Behavioral model of the OneNAND controller and the chip behind it.
//!
//! The model answers the same register and window accesses as the real
//! controller. Data window transfers stream one word at a time: main words
//! first, then spare words when the transfer-spare flag was set at the
//! first word. A transfer that reaches its end raises the completion flags.
//! Any register access drops a partial transfer; such a transfer (the lock
//! audit probes) only raises `LOCKED_BLK` if its block is locked.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use onenand_emu::regs::{ctrl, int, ECC_4BIT_UNCORRECTABLE, MEM_RESET_COLD, TSRF};
use onenand_emu::{ChipOptions, Geometry, LockOp, Reg, RegisterBus, Soc, SocVariant, Window};

pub const SAMSUNG_MANUFACTURER_ID: u16 = 0x00EC;
pub const DEFAULT_DEVICE_ID: u16 = 0x0050;
pub const DEFAULT_VERSION_ID: u16 = 0x0013;
/// Device ID bit flagging a dual-die package.
pub const DEVICE_ID_DDP: u16 = 1 << 3;

/// Persistent contents of a simulated chip.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FlashImage {
    pub soc: Soc,
    pub geometry: Geometry,
    pub options: ChipOptions,
    pub manufacturer_id: u16,
    pub device_id: u16,
    pub version_id: u16,
    /// Programmed pages by page number: main bytes followed by spare bytes.
    pub pages: BTreeMap<u32, Vec<u8>>,
    pub locked: BTreeSet<u32>,
    /// Pages whose loads report an uncorrectable ECC error.
    pub ecc_faults: BTreeSet<u32>,
}

impl FlashImage {
    /// A fully erased chip. Every block starts locked, as after power-up.
    pub fn new(soc: Soc, geometry: Geometry, options: ChipOptions) -> Self {
        let mut device_id = DEFAULT_DEVICE_ID;
        if options.contains(ChipOptions::DDP) {
            device_id |= DEVICE_ID_DDP;
        }
        Self {
            soc,
            geometry,
            options,
            manufacturer_id: SAMSUNG_MANUFACTURER_ID,
            device_id,
            version_id: DEFAULT_VERSION_ID,
            pages: BTreeMap::new(),
            locked: (0..geometry.blocks()).collect(),
            ecc_faults: BTreeSet::new(),
        }
    }

    pub fn page_number(&self, block: u32, page: u32) -> u32 {
        block * self.geometry.pages_per_block() + page
    }

    /// Bytes stored per page, main plus spare.
    pub fn page_len(&self) -> usize {
        (self.geometry.page_size + self.geometry.oob_size) as usize
    }

    /// Contents of a page; unprogrammed pages read as erased.
    pub fn read_page(&self, page_no: u32) -> Vec<u8> {
        self.pages
            .get(&page_no)
            .cloned()
            .unwrap_or_else(|| vec![0xFF; self.page_len()])
    }

    /// Program bytes into a page. Bits can only go from 1 to 0.
    pub fn program(&mut self, page_no: u32, data: &[u8]) {
        let len = self.page_len();
        let page = self
            .pages
            .entry(page_no)
            .or_insert_with(|| vec![0xFF; len]);
        for (cell, byte) in page.iter_mut().zip(data) {
            *cell &= *byte;
        }
        if page.iter().all(|&b| b == 0xFF) {
            self.pages.remove(&page_no);
        }
    }

    pub fn erase_block(&mut self, block: u32) {
        let ppb = self.geometry.pages_per_block();
        let first = block * ppb;
        let pages: Vec<u32> = self.pages.range(first..first + ppb).map(|(&p, _)| p).collect();
        for page in pages {
            self.pages.remove(&page);
        }
        self.ecc_faults.retain(|&p| p < first || p >= first + ppb);
    }

    pub fn is_block_erased(&self, block: u32) -> bool {
        let ppb = self.geometry.pages_per_block();
        let first = block * ppb;
        self.pages.range(first..first + ppb).next().is_none()
    }

    pub fn is_locked(&self, block: u32) -> bool {
        self.locked.contains(&block)
    }

    /// Blocks reachable by the unlock-all command.
    pub fn first_die_blocks(&self) -> u32 {
        if self.options.contains(ChipOptions::DDP) {
            self.geometry.blocks() / 2
        } else {
            self.geometry.blocks()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Load,
    Program,
}

/// A data window transfer in progress.
#[derive(Debug)]
struct Transfer {
    page_no: u32,
    block: u32,
    direction: Direction,
    data: Vec<u8>,
    pos: usize,
}

/// Controller plus chip, answering accesses like the hardware.
pub struct FlashModel {
    image: FlashImage,
    soc: &'static SocVariant,
    int_stat: u32,
    ecc_stat: u32,
    trans_spare: bool,
    regs: HashMap<Reg, u32>,
    transfer: Option<Transfer>,
    range_start: Option<(LockOp, u32)>,
    pending_erase: Vec<u32>,
}

impl FlashModel {
    pub fn new(image: FlashImage) -> Self {
        let soc = image.soc.variant();
        Self {
            image,
            soc,
            int_stat: 0,
            ecc_stat: 0,
            trans_spare: false,
            regs: HashMap::new(),
            transfer: None,
            range_start: None,
            pending_erase: Vec::new(),
        }
    }

    pub fn image(&self) -> &FlashImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut FlashImage {
        &mut self.image
    }

    pub fn into_image(self) -> FlashImage {
        self.image
    }

    fn cold_reset(&mut self) {
        self.transfer = None;
        self.range_start = None;
        self.pending_erase.clear();
        self.trans_spare = false;
        self.ecc_stat = 0;
        self.int_stat = int::RST_CMP;
    }

    /// (block, page number) of a memory address, if it is on the chip.
    fn locate(&self, mem_addr: u32) -> Option<(u32, u32)> {
        let (block, page, _) = self.soc.unpack(mem_addr);
        let geo = &self.image.geometry;
        if block >= geo.blocks() || page >= geo.pages_per_block() {
            return None;
        }
        Some((block, self.image.page_number(block, page)))
    }

    fn continues(&self, page_no: u32, direction: Direction) -> bool {
        matches!(
            &self.transfer,
            Some(t) if t.page_no == page_no && t.direction == direction
        )
    }

    fn start_transfer(&mut self, block: u32, page_no: u32, direction: Direction) {
        let geo = &self.image.geometry;
        let len = if self.trans_spare {
            (geo.page_size + geo.oob_size) as usize
        } else {
            geo.page_size as usize
        };
        let data = match direction {
            Direction::Load => {
                let mut page = self.image.read_page(page_no);
                page.truncate(len);
                page
            }
            Direction::Program => vec![0xFF; len],
        };
        if self.image.is_locked(block) {
            self.int_stat |= int::LOCKED_BLK;
        }
        self.transfer = Some(Transfer {
            page_no,
            block,
            direction,
            data,
            pos: 0,
        });
    }

    fn finish_transfer(&mut self) {
        let Some(transfer) = self.transfer.take() else {
            return;
        };
        match transfer.direction {
            Direction::Load => {
                self.int_stat &= !int::LOCKED_BLK;
                self.int_stat |= int::INT_ACT | int::BLK_RW_CMP | int::LOAD_CMP;
                if self.image.ecc_faults.contains(&transfer.page_no) {
                    self.ecc_stat = ECC_4BIT_UNCORRECTABLE;
                    self.int_stat |= int::LD_FAIL_ECC_ERR;
                } else {
                    self.ecc_stat = 0;
                }
            }
            Direction::Program => {
                if self.image.is_locked(transfer.block) {
                    self.int_stat |= int::INT_ACT | int::LOCKED_BLK;
                } else {
                    self.image.program(transfer.page_no, &transfer.data);
                    self.int_stat |= int::INT_ACT | int::BLK_RW_CMP | int::PGM_CMP;
                }
            }
        }
    }

    fn data_read(&mut self, mem_addr: u32) -> u32 {
        let Some((block, page_no)) = self.locate(mem_addr) else {
            self.int_stat |= int::INT_ACT | int::UNSUP_CMD;
            return u32::MAX;
        };
        if !self.continues(page_no, Direction::Load) {
            self.start_transfer(block, page_no, Direction::Load);
        }
        let Some(transfer) = self.transfer.as_mut() else {
            return u32::MAX;
        };
        let value = match transfer.data.get(transfer.pos..transfer.pos + 4) {
            Some(w) => u32::from_le_bytes([w[0], w[1], w[2], w[3]]),
            None => u32::MAX,
        };
        transfer.pos += 4;
        if transfer.pos >= transfer.data.len() {
            self.finish_transfer();
        }
        value
    }

    fn data_write(&mut self, mem_addr: u32, value: u32) {
        let Some((block, page_no)) = self.locate(mem_addr) else {
            self.int_stat |= int::INT_ACT | int::UNSUP_CMD;
            return;
        };
        if !self.continues(page_no, Direction::Program) {
            self.start_transfer(block, page_no, Direction::Program);
        }
        let Some(transfer) = self.transfer.as_mut() else {
            return;
        };
        if let Some(word) = transfer.data.get_mut(transfer.pos..transfer.pos + 4) {
            word.copy_from_slice(&value.to_le_bytes());
        }
        transfer.pos += 4;
        if transfer.pos >= transfer.data.len() {
            self.finish_transfer();
        }
    }

    fn erase(&mut self, block: u32) {
        let mut blocks = std::mem::take(&mut self.pending_erase);
        blocks.push(block);
        let mut status = int::INT_ACT | int::BLK_RW_CMP | int::ERS_CMP;
        for block in blocks {
            if self.image.is_locked(block) {
                status |= int::LOCKED_BLK;
            } else {
                self.image.erase_block(block);
            }
        }
        self.int_stat |= status;
    }

    fn lock_range_end(&mut self, op: LockOp, end: u32) {
        match self.range_start.take() {
            Some((start_op, start)) if start_op == op && start <= end => {
                for block in start..=end {
                    match op {
                        LockOp::Lock => self.image.locked.insert(block),
                        LockOp::Unlock => self.image.locked.remove(&block),
                    };
                }
                self.int_stat |= int::INT_ACT | int::BLK_RW_CMP;
            }
            _ => self.int_stat |= int::INT_ACT | int::UNSUP_CMD,
        }
    }

    fn control(&mut self, mem_addr: u32, code: u32) {
        let Some((block, _)) = self.locate(mem_addr) else {
            self.int_stat |= int::INT_ACT | int::UNSUP_CMD;
            return;
        };
        match code {
            ctrl::ERASE_START => self.erase(block),
            ctrl::MULTI_ERASE_SET => {
                if self.image.is_locked(block) {
                    self.int_stat |= int::INT_ACT | int::LOCKED_BLK;
                } else {
                    self.pending_erase.push(block);
                    self.int_stat |= int::INT_ACT;
                }
            }
            ctrl::ERASE_VERIFY => {
                let mut status = int::INT_ACT | int::BLK_RW_CMP | int::ERS_CMP;
                if !self.image.is_block_erased(block) {
                    status |= int::ERS_FAIL;
                }
                self.int_stat |= status;
            }
            ctrl::LOCK_START => self.range_start = Some((LockOp::Lock, block)),
            ctrl::UNLOCK_START => self.range_start = Some((LockOp::Unlock, block)),
            ctrl::LOCK_END => self.lock_range_end(LockOp::Lock, block),
            ctrl::UNLOCK_END => self.lock_range_end(LockOp::Unlock, block),
            ctrl::UNLOCK_ALL => {
                // Only the first die of a dual-die package answers
                for block in 0..self.image.first_die_blocks() {
                    self.image.locked.remove(&block);
                }
                self.int_stat |= int::INT_ACT | int::BLK_RW_CMP;
            }
            _ => self.int_stat |= int::INT_ACT | int::UNSUP_CMD,
        }
    }
}

impl RegisterBus for FlashModel {
    fn read_reg(&mut self, reg: Reg) -> u32 {
        self.transfer = None;
        let geo = &self.image.geometry;
        match reg {
            Reg::IntErrStat => self.int_stat,
            Reg::EccErrStat => self.ecc_stat,
            Reg::TransSpare => u32::from(self.trans_spare),
            Reg::ManufactId => u32::from(self.image.manufacturer_id),
            Reg::DeviceId => u32::from(self.image.device_id),
            Reg::FlashVerId => u32::from(self.image.version_id),
            // Sizes are reported in 16-bit words
            Reg::DataBufSize => geo.page_size / 2,
            Reg::BootBufSize => 0x200,
            Reg::BufAmount => 2,
            Reg::DdpDevice => u32::from(self.image.options.contains(ChipOptions::DDP)),
            _ => self.regs.get(&reg).copied().unwrap_or(0),
        }
    }

    fn write_reg(&mut self, reg: Reg, value: u32) {
        self.transfer = None;
        match reg {
            Reg::MemReset if value == MEM_RESET_COLD => self.cold_reset(),
            Reg::IntErrAck => self.int_stat &= !value,
            Reg::EccErrStat => self.ecc_stat = value,
            Reg::TransSpare => self.trans_spare = value & TSRF != 0,
            _ => {
                self.regs.insert(reg, value);
            }
        }
    }

    fn read_cmd(&mut self, cmd_addr: u32) -> u32 {
        match self.soc.decode(cmd_addr) {
            (Window::Data, mem_addr) => self.data_read(mem_addr),
            (Window::Buffer, _) => u32::MAX,
            // Chip registers are not modelled behind the direct window
            (Window::Control, _) | (Window::Direct, _) => 0,
        }
    }

    fn write_cmd(&mut self, cmd_addr: u32, value: u32) {
        match self.soc.decode(cmd_addr) {
            (Window::Data, mem_addr) => self.data_write(mem_addr, value),
            (Window::Control, mem_addr) => self.control(mem_addr, value),
            (Window::Buffer, _) | (Window::Direct, _) => {}
        }
    }
}
