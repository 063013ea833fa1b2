// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! SoC variant descriptors and controller address translation.
//!
//! The controller decodes a command address as a two-bit window tag placed
//! above a packed "memory address". The memory address itself carries the
//! flash block (FBA), page (FPA) and sector (FSA) at SoC-specific bit
//! positions:
//!
//! | SoC      | tag bit | FBA | FPA | FSA |
//! |----------|---------|-----|-----|-----|
//! | S3C64XX  | 24      | 12  | 6   | 4   |
//! | S5PC100  | 26      | 13  | 7   | 5   |

use serde::{Deserialize, Serialize};

/// Static description of one SoC integration of the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SocVariant {
    pub name: &'static str,
    /// Base address of the controller register block.
    pub reg_base: u32,
    /// Base address of the command-mapped bulk access region.
    pub ahb_base: u32,
    /// Bit position of the two-bit window tag.
    pub map_shift: u32,
    pub block_shift: u32,
    pub page_shift: u32,
    pub sector_shift: u32,
}

pub const S3C64XX: SocVariant = SocVariant {
    name: "s3c64xx",
    reg_base: 0x7010_0000,
    ahb_base: 0x2000_0000,
    map_shift: 24,
    block_shift: 12,
    page_shift: 6,
    sector_shift: 4,
};

pub const S5PC100: SocVariant = SocVariant {
    name: "s5pc100",
    reg_base: 0xE710_0000,
    ahb_base: 0xB000_0000,
    map_shift: 26,
    block_shift: 13,
    page_shift: 7,
    sector_shift: 5,
};

/// Startup selector for the built-in variants.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Soc {
    S3c64xx,
    S5pc100,
}

impl Soc {
    pub const fn variant(self) -> &'static SocVariant {
        match self {
            Soc::S3c64xx => &S3C64XX,
            Soc::S5pc100 => &S5PC100,
        }
    }
}

impl SocVariant {
    /// Pack (block, page, sector) into the controller memory address.
    pub const fn mem_addr(&self, fba: u32, fpa: u32, fsa: u32) -> u32 {
        (fba << self.block_shift) | (fpa << self.page_shift) | (fsa << self.sector_shift)
    }

    /// Split a packed memory address back into (block, page, sector).
    pub const fn unpack(&self, mem_addr: u32) -> (u32, u32, u32) {
        let fba = mem_addr >> self.block_shift;
        let fpa = (mem_addr >> self.page_shift) & low_mask(self.block_shift - self.page_shift);
        let fsa = (mem_addr >> self.sector_shift) & low_mask(self.page_shift - self.sector_shift);
        (fba, fpa, fsa)
    }

    /// Number of bytes covered by the four windows together.
    pub const fn ahb_span(&self) -> u32 {
        4 << self.map_shift
    }

    /// Payload bits available below the window tag.
    pub const fn payload_mask(&self) -> u32 {
        low_mask(self.map_shift)
    }

    /// Recover the window and unscaled payload from a command address.
    pub fn decode(&self, cmd_addr: u32) -> (Window, u32) {
        let window = Window::from_tag(cmd_addr >> self.map_shift);
        let payload = cmd_addr & self.payload_mask();
        (window, payload >> window.scale())
    }
}

/// One of the four disjoint address windows of the bulk access region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Window {
    /// MAP_00: XIP buffer-relative access.
    Buffer,
    /// MAP_01: data transfers to and from the memory device.
    Data,
    /// MAP_10: control commands (erase, lock, unlock).
    Control,
    /// MAP_11: direct access to the memory device registers.
    Direct,
}

impl Window {
    pub const fn tag(self) -> u32 {
        match self {
            Window::Buffer => 0,
            Window::Data => 1,
            Window::Control => 2,
            Window::Direct => 3,
        }
    }

    const fn from_tag(tag: u32) -> Self {
        match tag & 0x3 {
            0 => Window::Buffer,
            1 => Window::Data,
            2 => Window::Control,
            _ => Window::Direct,
        }
    }

    /// Left shift applied to the payload inside this window.
    const fn scale(self) -> u32 {
        match self {
            Window::Buffer => 1,
            Window::Data | Window::Control => 0,
            Window::Direct => 2,
        }
    }

    /// Command address for `value` inside this window on `soc`.
    pub const fn address(self, soc: &SocVariant, value: u32) -> u32 {
        (self.tag() << soc.map_shift) | ((value << self.scale()) & soc.payload_mask())
    }
}

const fn low_mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_addr_s3c64xx_layout() {
        assert_eq!(S3C64XX.mem_addr(1, 0, 0), 0x1000);
        assert_eq!(S3C64XX.mem_addr(0, 1, 0), 0x40);
        assert_eq!(S3C64XX.mem_addr(0, 0, 1), 0x10);
    }

    #[test]
    fn test_mem_addr_s5pc100_layout() {
        assert_eq!(S5PC100.mem_addr(1, 0, 0), 0x2000);
        assert_eq!(S5PC100.mem_addr(0, 1, 0), 0x80);
        assert_eq!(S5PC100.mem_addr(0, 0, 1), 0x20);
    }

    #[test]
    fn test_window_tags() {
        assert_eq!(Window::Buffer.address(&S3C64XX, 0), 0x0000_0000);
        assert_eq!(Window::Data.address(&S3C64XX, 0), 0x0100_0000);
        assert_eq!(Window::Control.address(&S3C64XX, 0), 0x0200_0000);
        assert_eq!(Window::Direct.address(&S3C64XX, 0), 0x0300_0000);
        assert_eq!(Window::Control.address(&S5PC100, 0), 0x0800_0000);
    }

    #[test]
    fn test_window_payload_scaling() {
        assert_eq!(Window::Buffer.address(&S3C64XX, 0x10), 0x20);
        assert_eq!(Window::Data.address(&S3C64XX, 0x10), 0x0100_0010);
        assert_eq!(Window::Direct.address(&S3C64XX, 0x10), 0x0300_0040);
    }

    #[test]
    fn test_payload_never_spills_into_tag() {
        let addr = Window::Data.address(&S3C64XX, u32::MAX);
        assert_eq!(addr >> S3C64XX.map_shift, Window::Data.tag());
    }

    #[test]
    fn test_decode_inverts_address() {
        for soc in [&S3C64XX, &S5PC100] {
            let mem = soc.mem_addr(77, 5, 0);
            for window in [Window::Buffer, Window::Data, Window::Control, Window::Direct] {
                assert_eq!(soc.decode(window.address(soc, mem)), (window, mem));
            }
        }
    }

    #[test]
    fn test_soc_selector() {
        assert_eq!(Soc::S3c64xx.variant(), &S3C64XX);
        assert_eq!(Soc::S5pc100.variant(), &S5PC100);
    }
}
