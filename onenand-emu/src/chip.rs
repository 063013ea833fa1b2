// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Chip state owned by the generic OneNAND layer.
//!
//! The emulator never owns this state: geometry, the alternating BufferRAM
//! index, capability options and ECC statistics are passed in on every call.

use serde::{Deserialize, Serialize};

/// Flash geometry as discovered by the generic layer.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    /// Main data bytes per page.
    pub page_size: u32,
    /// Spare (OOB) bytes per page.
    pub oob_size: u32,
    /// log2 of the erase block size in bytes.
    pub erase_shift: u32,
    /// log2 of the page size in bytes.
    pub page_shift: u32,
    /// Pages per block minus one.
    pub page_mask: u32,
    /// Total chip size in bytes.
    pub chip_size: u64,
}

impl Geometry {
    /// Build a geometry from power-of-two page size and pages per block.
    pub const fn new(page_size: u32, oob_size: u32, pages_per_block: u32, blocks: u32) -> Self {
        let page_shift = page_size.trailing_zeros();
        let erase_shift = page_shift + pages_per_block.trailing_zeros();
        Self {
            page_size,
            oob_size,
            erase_shift,
            page_shift,
            page_mask: pages_per_block - 1,
            chip_size: (blocks as u64) << erase_shift,
        }
    }

    pub const fn block_size(&self) -> u32 {
        1 << self.erase_shift
    }

    pub const fn pages_per_block(&self) -> u32 {
        self.page_mask + 1
    }

    pub const fn blocks(&self) -> u32 {
        (self.chip_size >> self.erase_shift) as u32
    }

    /// Byte offset of the first byte of `page` within `block`.
    pub const fn page_offset(&self, block: u32, page: u32) -> u64 {
        ((block as u64) << self.erase_shift) | ((page as u64) << self.page_shift)
    }
}

/// Capability bits of the attached chip.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipOptions(u32);

impl ChipOptions {
    pub const NONE: Self = Self(0);
    /// The chip accepts a single unlock-all command.
    pub const HAS_UNLOCK_ALL: Self = Self(1 << 2);
    /// Two dies addressed as one logical chip.
    pub const DDP: Self = Self(1 << 8);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for ChipOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// ECC counters visible to the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EccStats {
    pub corrected: u32,
    pub failed: u32,
}

/// Operation being awaited by [`crate::Controller::wait`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashState {
    Ready,
    Reading,
    Writing,
    Erasing,
    Locking,
    Resetting,
}

/// Per-chip state shared between the generic layer and this driver.
#[derive(Clone, Debug)]
pub struct ChipState {
    pub geometry: Geometry,
    pub options: ChipOptions,
    /// Currently selected BufferRAM (0 or 1).
    pub bufferram_index: u8,
    pub ecc_stats: EccStats,
    pub subpage_size: u32,
    pub subpage_shift: u32,
}

impl ChipState {
    pub fn new(geometry: Geometry, options: ChipOptions) -> Self {
        Self {
            geometry,
            options,
            bufferram_index: 0,
            ecc_stats: EccStats::default(),
            subpage_size: geometry.page_size,
            subpage_shift: 0,
        }
    }

    pub fn current_bufferram(&self) -> usize {
        usize::from(self.bufferram_index & 1)
    }

    /// Switch to the other BufferRAM.
    pub fn next_bufferram(&mut self) {
        self.bufferram_index = (self.bufferram_index & 1) ^ 1;
    }

    pub fn has_unlock_all(&self) -> bool {
        self.options.contains(ChipOptions::HAS_UNLOCK_ALL)
    }

    pub fn is_ddp(&self) -> bool {
        self.options.contains(ChipOptions::DDP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_shifts_for_2k_pages() {
        let geo = Geometry::new(2048, 64, 64, 1024);
        assert_eq!(geo.page_shift, 11);
        assert_eq!(geo.erase_shift, 17);
        assert_eq!(geo.page_mask, 63);
        assert_eq!(geo.chip_size, 128 * 1024 * 1024);
        assert_eq!(geo.blocks(), 1024);
        assert_eq!(geo.block_size(), 128 * 1024);
    }

    #[test]
    fn test_page_offset() {
        let geo = Geometry::new(2048, 64, 64, 16);
        assert_eq!(geo.page_offset(0, 0), 0);
        assert_eq!(geo.page_offset(1, 0), 0x2_0000);
        assert_eq!(geo.page_offset(1, 3), 0x2_1800);
    }

    #[test]
    fn test_options_contains() {
        let opts = ChipOptions::HAS_UNLOCK_ALL | ChipOptions::DDP;
        assert!(opts.contains(ChipOptions::DDP));
        assert!(opts.contains(ChipOptions::HAS_UNLOCK_ALL));
        assert!(!ChipOptions::NONE.contains(ChipOptions::DDP));
    }

    #[test]
    fn test_bufferram_toggles() {
        let mut chip = ChipState::new(Geometry::new(2048, 64, 64, 16), ChipOptions::NONE);
        assert_eq!(chip.current_bufferram(), 0);
        chip.next_bufferram();
        assert_eq!(chip.current_bufferram(), 1);
        chip.next_bufferram();
        assert_eq!(chip.current_bufferram(), 0);
    }
}
