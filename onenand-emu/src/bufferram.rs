// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Software BufferRAM.
//!
//! The controller has no onboard page buffers, so two fixed regions stand
//! in for them: one for main data and one for spare (OOB) data. Each region
//! is split into two halves addressed by the chip's alternating BufferRAM
//! index, emulating BufferRAM A and B.
//!
//! ```text
//! main:  [ half 0: page_size ][ half 1: page_size ] ... up to PAGE_BUF_SIZE
//! spare: [ half 0: oob_size  ][ half 1: oob_size  ] ... up to OOB_BUF_SIZE
//! ```

use crate::chip::Geometry;
use crate::error::{Error, Result};

/// Capacity of the main data region (two halves of up to 2 KiB).
pub const PAGE_BUF_SIZE: usize = 4 * 1024;
/// Capacity of the spare region (two halves of up to 64 bytes).
pub const OOB_BUF_SIZE: usize = 128;

/// Which emulated BufferRAM area an access targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferArea {
    /// Main data area (the chip's DataRAM).
    Data,
    /// Spare area (the chip's SpareRAM).
    Spare,
}

/// Main and spare buffer regions, erased to 0xFF.
pub struct BufferRam {
    main: [u8; PAGE_BUF_SIZE],
    spare: [u8; OOB_BUF_SIZE],
}

impl BufferRam {
    pub const fn new() -> Self {
        Self {
            main: [0xFF; PAGE_BUF_SIZE],
            spare: [0xFF; OOB_BUF_SIZE],
        }
    }

    /// Check that both halves of both areas fit for `geometry`.
    pub fn check_geometry(geometry: &Geometry) -> Result<()> {
        let main = 2 * geometry.page_size as usize;
        let spare = 2 * geometry.oob_size as usize;
        if main > PAGE_BUF_SIZE || spare > OOB_BUF_SIZE || geometry.page_size % 4 != 0 {
            return Err(Error::Geometry);
        }
        Ok(())
    }

    /// Check that both halves of `area` fit for `geometry`.
    pub fn check_area(geometry: &Geometry, area: BufferArea) -> Result<()> {
        let capacity = match area {
            BufferArea::Data => PAGE_BUF_SIZE,
            BufferArea::Spare => OOB_BUF_SIZE,
        };
        if 2 * Self::area_len(geometry, area) > capacity {
            return Err(Error::Geometry);
        }
        Ok(())
    }

    fn area_len(geometry: &Geometry, area: BufferArea) -> usize {
        match area {
            BufferArea::Data => geometry.page_size as usize,
            BufferArea::Spare => geometry.oob_size as usize,
        }
    }

    /// The `index` half of `area`.
    pub fn half(&self, geometry: &Geometry, area: BufferArea, index: usize) -> Result<&[u8]> {
        let len = Self::area_len(geometry, area);
        let start = (index & 1) * len;
        let region: &[u8] = match area {
            BufferArea::Data => &self.main,
            BufferArea::Spare => &self.spare,
        };
        region.get(start..start + len).ok_or(Error::Geometry)
    }

    /// Mutable access to the `index` half of `area`.
    pub fn half_mut(
        &mut self,
        geometry: &Geometry,
        area: BufferArea,
        index: usize,
    ) -> Result<&mut [u8]> {
        let len = Self::area_len(geometry, area);
        let start = (index & 1) * len;
        let region: &mut [u8] = match area {
            BufferArea::Data => &mut self.main,
            BufferArea::Spare => &mut self.spare,
        };
        region.get_mut(start..start + len).ok_or(Error::Geometry)
    }

    /// Copy `buf.len()` bytes out of a half, starting at `offset`.
    pub fn read(
        &self,
        geometry: &Geometry,
        area: BufferArea,
        index: usize,
        offset: usize,
        buf: &mut [u8],
    ) -> Result<()> {
        let half = self.half(geometry, area, index)?;
        let src = offset
            .checked_add(buf.len())
            .and_then(|end| half.get(offset..end))
            .ok_or(Error::OutOfBounds)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    /// Copy `buf` into a half, starting at `offset`.
    pub fn write(
        &mut self,
        geometry: &Geometry,
        area: BufferArea,
        index: usize,
        offset: usize,
        buf: &[u8],
    ) -> Result<()> {
        let half = self.half_mut(geometry, area, index)?;
        let dst = offset
            .checked_add(buf.len())
            .and_then(|end| half.get_mut(offset..end))
            .ok_or(Error::OutOfBounds)?;
        dst.copy_from_slice(buf);
        Ok(())
    }
}

impl Default for BufferRam {
    fn default() -> Self {
        Self::new()
    }
}
