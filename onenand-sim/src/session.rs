// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! A driver session over a persisted flash image.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};

use onenand_emu::{
    BufferArea, ChipState, Command, Controller, FlashState, OneNandDriver, TickSource,
};

use crate::image;
use crate::model::{FlashImage, FlashModel};

/// Microsecond tick source backed by the host monotonic clock.
pub struct HostTicks {
    start: Instant,
}

impl HostTicks {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl TickSource for HostTicks {
    fn ticks(&mut self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    fn tick_hz(&self) -> u64 {
        1_000_000
    }
}

pub type SimController = Controller<FlashModel, HostTicks>;

/// Controller handle, chip state and the image file they came from.
pub struct Session {
    pub ctrl: SimController,
    pub chip: ChipState,
    path: PathBuf,
}

impl Session {
    /// Load an image and cold-reset the controller in front of it.
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::load(path)?;
        Self::from_image(image, path)
    }

    pub fn from_image(image: FlashImage, path: &Path) -> Result<Self> {
        let soc = image.soc.variant();
        let chip = ChipState::new(image.geometry, image.options);
        let mut ctrl = Controller::new(soc, FlashModel::new(image), HostTicks::new());
        if !ctrl.reset() {
            bail!("Controller reset did not complete");
        }
        Ok(Self {
            ctrl,
            chip,
            path: path.to_path_buf(),
        })
    }

    pub fn image(&self) -> &FlashImage {
        self.ctrl.bus().image()
    }

    /// Write the image back to the file it was opened from.
    pub fn save(self) -> Result<()> {
        let (model, _) = self.ctrl.release();
        image::save(&self.path, &model.into_image())
    }

    pub fn check_block(&self, block: u32) -> Result<()> {
        let blocks = self.chip.geometry.blocks();
        if block >= blocks {
            bail!("Block {} out of range (chip has {} blocks)", block, blocks);
        }
        Ok(())
    }

    /// Check `count` blocks starting at `block` and return the last one.
    pub fn check_range(&self, block: u32, count: u32) -> Result<u32> {
        if count == 0 {
            bail!("Block count must be at least 1");
        }
        let last = block
            .checked_add(count - 1)
            .with_context(|| format!("Block range {} + {} overflows", block, count))?;
        self.check_block(block)?;
        self.check_block(last)?;
        Ok(last)
    }

    pub fn check_page(&self, block: u32, page: u32) -> Result<()> {
        self.check_block(block)?;
        let pages = self.chip.geometry.pages_per_block();
        if page >= pages {
            bail!("Page {} out of range (block has {} pages)", page, pages);
        }
        Ok(())
    }

    /// Load a page into BufferRAM and copy it out.
    ///
    /// Returns the main area and, if `with_oob`, the spare area.
    pub fn read_page(&mut self, block: u32, page: u32, with_oob: bool) -> Result<(Vec<u8>, Vec<u8>)> {
        self.check_page(block, page)?;
        let geo = self.chip.geometry;
        let cmd = if with_oob { Command::ReadOob } else { Command::Read };

        self.ctrl
            .command(&mut self.chip, cmd, geo.page_offset(block, page), geo.page_size as usize)?;
        self.ctrl
            .wait(&mut self.chip, FlashState::Reading)
            .with_context(|| format!("Read of block {} page {} failed", block, page))?;

        let mut main = vec![0u8; geo.page_size as usize];
        self.ctrl.read_bufferram(&self.chip, BufferArea::Data, &mut main, 0)?;
        let mut spare = Vec::new();
        if with_oob {
            spare = vec![0u8; geo.oob_size as usize];
            self.ctrl.read_bufferram(&self.chip, BufferArea::Spare, &mut spare, 0)?;
        }
        Ok((main, spare))
    }

    /// Program main and/or spare data into a page.
    ///
    /// Short buffers are padded with 0xFF, which leaves those bits as they are.
    pub fn program_page(
        &mut self,
        block: u32,
        page: u32,
        main: Option<&[u8]>,
        spare: Option<&[u8]>,
    ) -> Result<()> {
        self.check_page(block, page)?;
        let geo = self.chip.geometry;
        let ofs = geo.page_offset(block, page);

        if let Some(main) = main {
            let buf = padded(main, geo.page_size as usize)?;
            self.ctrl.write_bufferram(&self.chip, BufferArea::Data, &buf, 0)?;
            self.ctrl.command(&mut self.chip, Command::Program, ofs, buf.len())?;
            self.ctrl
                .wait(&mut self.chip, FlashState::Writing)
                .with_context(|| format!("Program of block {} page {} failed", block, page))?;
        }

        if let Some(spare) = spare {
            let buf = padded(spare, geo.oob_size as usize)?;
            self.ctrl.write_bufferram(&self.chip, BufferArea::Spare, &buf, 0)?;
            self.ctrl.command(&mut self.chip, Command::ProgramOob, ofs, buf.len())?;
            self.ctrl
                .wait(&mut self.chip, FlashState::Writing)
                .with_context(|| format!("OOB program of block {} page {} failed", block, page))?;
        }

        Ok(())
    }

    /// Erase `count` blocks starting at `block`.
    ///
    /// All but the last block are queued with the multi-block erase command;
    /// the final erase starts the whole batch. `on_block` is called as each
    /// block is queued or erased.
    pub fn erase_blocks<F>(&mut self, block: u32, count: u32, mut on_block: F) -> Result<()>
    where
        F: FnMut(u32),
    {
        if count == 0 {
            return Ok(());
        }
        let last = self.check_range(block, count)?;
        let geo = self.chip.geometry;

        for b in block..last {
            self.ctrl
                .command(&mut self.chip, Command::MultiBlockErase, geo.page_offset(b, 0), 0)?;
            self.ctrl
                .wait(&mut self.chip, FlashState::Erasing)
                .with_context(|| format!("Queueing block {} for erase failed", b))?;
            on_block(b);
        }

        self.ctrl
            .command(&mut self.chip, Command::Erase, geo.page_offset(last, 0), 0)?;
        self.ctrl
            .wait(&mut self.chip, FlashState::Erasing)
            .with_context(|| format!("Erase of blocks {}..={} failed", block, last))?;
        on_block(last);
        Ok(())
    }

    /// Check that a block reads back erased.
    pub fn verify_erased(&mut self, block: u32) -> Result<()> {
        self.check_block(block)?;
        let ofs = self.chip.geometry.page_offset(block, 0);
        self.ctrl.command(&mut self.chip, Command::EraseVerify, ofs, 0)?;
        self.ctrl
            .wait(&mut self.chip, FlashState::Erasing)
            .with_context(|| format!("Erase verify of block {} failed", block))?;
        Ok(())
    }

    /// Read the first page's spare area of a block with the bad block table wait.
    ///
    /// Returns true if the block is bad: the load failed or the bad block
    /// marker byte is not 0xFF.
    pub fn scan_block(&mut self, block: u32) -> Result<bool> {
        self.check_block(block)?;
        let geo = self.chip.geometry;

        self.ctrl
            .command(&mut self.chip, Command::ReadOob, geo.page_offset(block, 0), 0)?;
        if OneNandDriver::bbt_wait(&mut self.ctrl, &mut self.chip, FlashState::Reading).is_err() {
            return Ok(true);
        }

        let mut marker = [0u8; 1];
        self.ctrl.read_bufferram(&self.chip, BufferArea::Spare, &mut marker, 0)?;
        Ok(marker[0] != 0xFF)
    }
}

fn padded(data: &[u8], len: usize) -> Result<Vec<u8>> {
    if data.len() > len {
        bail!("{} bytes do not fit in a {} byte area", data.len(), len);
    }
    let mut buf = vec![0xFF; len];
    buf[..data.len()].copy_from_slice(data);
    Ok(buf)
}
