// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use crc::{Crc, CRC_32_ISO_HDLC};
use indicatif::{ProgressBar, ProgressStyle};

use onenand_emu::bufferram::BufferRam;
use onenand_emu::shim::onenand;
use onenand_emu::{ChipOptions, Geometry, LockOp, Soc};

use crate::cli::CreateArgs;
use crate::image;
use crate::model::FlashImage;
use crate::session::Session;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

fn progress_bar(len: u64, unit: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {}",
                unit
            ))?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Check a requested layout against the controller and buffer limits.
pub fn validate_geometry(args: &CreateArgs) -> Result<Geometry> {
    if !args.page_size.is_power_of_two() || !args.pages_per_block.is_power_of_two() {
        bail!("Page size and pages per block must be powers of two");
    }
    if args.oob_size % 4 != 0 {
        bail!("Spare size must be a multiple of 4 bytes");
    }
    if args.blocks == 0 {
        bail!("Chip needs at least one block");
    }
    if args.ddp && args.blocks % 2 != 0 {
        bail!("A dual-die chip needs an even number of blocks");
    }

    let soc = Soc::from(args.soc).variant();
    let max_pages = 1u32 << (soc.block_shift - soc.page_shift);
    if args.pages_per_block > max_pages {
        bail!("{} addresses at most {} pages per block", soc.name, max_pages);
    }
    let max_blocks = soc.payload_mask() >> soc.block_shift;
    if args.blocks > max_blocks + 1 {
        bail!("{} addresses at most {} blocks", soc.name, max_blocks + 1);
    }

    let geometry = Geometry::new(args.page_size, args.oob_size, args.pages_per_block, args.blocks);
    BufferRam::check_geometry(&geometry)
        .map_err(|e| anyhow::anyhow!("{}x{} pages: {}", args.page_size, args.oob_size, e))?;
    Ok(geometry)
}

/// Create a new erased image.
pub fn create(path: &Path, args: &CreateArgs) -> Result<()> {
    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let geometry = validate_geometry(args)?;

    let mut options = ChipOptions::NONE;
    if args.unlock_all {
        options = options | ChipOptions::HAS_UNLOCK_ALL;
    }
    if args.ddp {
        options = options | ChipOptions::DDP;
    }

    let image = FlashImage::new(args.soc.into(), geometry, options);
    image::save(path, &image)?;

    println!(
        "Created {}: {} blocks x {} pages x {}+{} bytes ({} MiB)",
        path.display(),
        geometry.blocks(),
        geometry.pages_per_block(),
        geometry.page_size,
        geometry.oob_size,
        geometry.chip_size >> 20
    );
    println!("All blocks are locked. Use 'unlock-all' before writing.");
    Ok(())
}

/// Show identity and image statistics.
pub fn info(path: &Path) -> Result<()> {
    let mut session = Session::open(path)?;
    let ctrl = &mut session.ctrl;

    let manufacturer = ctrl.read_word(onenand::REG_MANUFACTURER_ID);
    let device = ctrl.read_word(onenand::REG_DEVICE_ID);
    let version = ctrl.read_word(onenand::REG_VERSION_ID);
    let buffer_words = ctrl.read_word(onenand::REG_DATA_BUFFER_SIZE);

    // The same identity as read back in boot mode
    ctrl.write_word(onenand::CMD_READID, onenand::BOOTRAM);
    let boot_id = (ctrl.read_word(onenand::BOOTRAM), ctrl.read_word(onenand::BOOTRAM + 2));
    ctrl.write_word(onenand::CMD_RESET, onenand::BOOTRAM);

    let image = session.image();
    let geo = image.geometry;
    println!("Image: {}", path.display());
    println!("  SoC:           {}", image.soc.variant().name);
    println!("  Manufacturer:  0x{:04x}", manufacturer);
    println!("  Device:        0x{:04x}", device);
    println!("  Version:       0x{:04x}", version);
    println!("  Boot ID:       0x{:04x}/0x{:04x}", boot_id.0, boot_id.1);
    println!("  DataRAM:       {} bytes", u32::from(buffer_words) * 2);
    println!(
        "  Geometry:      {} blocks x {} pages x {}+{} bytes",
        geo.blocks(),
        geo.pages_per_block(),
        geo.page_size,
        geo.oob_size
    );
    println!(
        "  Options:       unlock-all={} ddp={}",
        image.options.contains(ChipOptions::HAS_UNLOCK_ALL),
        image.options.contains(ChipOptions::DDP)
    );
    println!("  Programmed:    {} pages", image.pages.len());
    println!("  Locked:        {} blocks", image.locked.len());
    println!("  ECC faults:    {} pages", image.ecc_faults.len());
    Ok(())
}

fn hex_dump(data: &[u8], base: usize) {
    for (i, line) in data.chunks(16).enumerate() {
        let hex: Vec<String> = line.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = line
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
            .collect();
        println!("{:06x}  {:<47}  {}", base + i * 16, hex.join(" "), ascii);
    }
}

/// Read one page.
pub fn read(path: &Path, block: u32, page: u32, oob: bool, output: Option<&Path>) -> Result<()> {
    let mut session = Session::open(path)?;
    let (main, spare) = session.read_page(block, page, oob)?;

    println!(
        "Block {} page {}: main CRC32 0x{:08x}",
        block,
        page,
        CRC32.checksum(&main)
    );
    match output {
        Some(out) => {
            fs::write(out, &main).with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Main area written to {}", out.display());
        }
        None => hex_dump(&main, 0),
    }

    if oob {
        println!("Spare area: CRC32 0x{:08x}", CRC32.checksum(&spare));
        hex_dump(&spare, 0);
    }
    Ok(())
}

/// Program one page from files.
pub fn write(
    path: &Path,
    block: u32,
    page: u32,
    file: Option<&Path>,
    oob: Option<&Path>,
) -> Result<()> {
    if file.is_none() && oob.is_none() {
        bail!("Nothing to write: give a main area file and/or --oob");
    }
    let main = file
        .map(|f| fs::read(f).with_context(|| format!("Failed to read {}", f.display())))
        .transpose()?;
    let spare = oob
        .map(|f| fs::read(f).with_context(|| format!("Failed to read {}", f.display())))
        .transpose()?;

    let mut session = Session::open(path)?;
    session.program_page(block, page, main.as_deref(), spare.as_deref())?;

    if let Some(main) = &main {
        println!(
            "Programmed block {} page {} ({} bytes, CRC32: 0x{:08x})",
            block,
            page,
            main.len(),
            CRC32.checksum(main)
        );
    }
    if let Some(spare) = &spare {
        println!("Programmed spare area ({} bytes)", spare.len());
    }
    session.save()
}

/// Erase a range of blocks.
pub fn erase(path: &Path, block: u32, count: u32, verify: bool) -> Result<()> {
    let mut session = Session::open(path)?;
    let last = session.check_range(block, count)?;

    let pb = progress_bar(count as u64, "blocks")?;
    let result = session.erase_blocks(block, count, |_| pb.inc(1));
    if let Err(e) = result {
        pb.abandon();
        return Err(e);
    }
    pb.finish();

    if verify {
        for b in block..=last {
            session.verify_erased(b)?;
        }
        println!("Verified {} blocks", count);
    }

    println!("Erased blocks {}..={}", block, last);
    session.save()
}

/// Lock or unlock a range of blocks.
pub fn lock(path: &Path, block: u32, count: u32, op: LockOp) -> Result<()> {
    let mut session = Session::open(path)?;
    let last = session.check_range(block, count)?;

    let geo = session.chip.geometry;
    let len = count as usize * geo.block_size() as usize;
    session
        .ctrl
        .lock_range(&mut session.chip, geo.page_offset(block, 0), len, op);

    let report = session.ctrl.check_lock_status(&session.chip);
    println!(
        "{:?} blocks {}..={}: {} of {} blocks now locked",
        op,
        block,
        last,
        report.locked,
        report.blocks
    );
    session.save()
}

/// Unlock the whole chip and report what stayed locked.
pub fn unlock_all(path: &Path) -> Result<()> {
    let mut session = Session::open(path)?;

    let pb = progress_bar(session.chip.geometry.blocks() as u64, "blocks checked")?;
    let report = session
        .ctrl
        .unlock_all_with(&mut session.chip, |_, _| pb.inc(1));
    pb.finish();

    if report.is_clean() {
        println!("All {} blocks unlocked", report.blocks);
    } else {
        println!(
            "{} of {} blocks still locked (first: {:?})",
            report.locked, report.blocks, &report.first_locked[..]
        );
    }
    session.save()
}

/// Scan every block for bad block markers.
pub fn scan(path: &Path) -> Result<()> {
    let mut session = Session::open(path)?;
    let blocks = session.chip.geometry.blocks();

    let pb = progress_bar(blocks as u64, "blocks")?;
    let mut bad = Vec::new();
    for block in 0..blocks {
        if session.scan_block(block)? {
            bad.push(block);
        }
        pb.inc(1);
    }
    pb.finish();

    if bad.is_empty() {
        println!("No bad blocks");
    } else {
        println!("{} bad blocks: {:?}", bad.len(), bad);
    }
    Ok(())
}

/// Inject an uncorrectable ECC error into a page.
pub fn corrupt(path: &Path, block: u32, page: u32) -> Result<()> {
    let mut session = Session::open(path)?;
    session.check_page(block, page)?;

    let model = session.ctrl.bus_mut();
    let page_no = model.image().page_number(block, page);
    model.image_mut().ecc_faults.insert(page_no);

    println!(
        "Loads of block {} page {} now report an uncorrectable ECC error",
        block, page
    );
    session.save()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SocArg;

    fn args() -> CreateArgs {
        CreateArgs {
            soc: SocArg::S3c64xx,
            page_size: 2048,
            oob_size: 64,
            pages_per_block: 64,
            blocks: 64,
            unlock_all: true,
            ddp: false,
            force: false,
        }
    }

    // =========================================================================
    // Geometry validation
    // =========================================================================

    #[test]
    fn test_validate_default_geometry() {
        let geo = validate_geometry(&args()).unwrap();
        assert_eq!(geo.blocks(), 64);
        assert_eq!(geo.block_size(), 128 * 1024);
    }

    #[test]
    fn test_validate_rejects_large_pages() {
        let a = CreateArgs {
            page_size: 4096,
            oob_size: 128,
            ..args()
        };
        assert!(validate_geometry(&a).is_err());
    }

    #[test]
    fn test_validate_rejects_too_many_pages_per_block() {
        let a = CreateArgs {
            pages_per_block: 128,
            ..args()
        };
        assert!(validate_geometry(&a).is_err());
        // Both variants carry a six-bit page field
        let a = CreateArgs {
            soc: SocArg::S5pc100,
            pages_per_block: 128,
            ..args()
        };
        assert!(validate_geometry(&a).is_err());
    }

    #[test]
    fn test_validate_rejects_odd_ddp() {
        let a = CreateArgs {
            ddp: true,
            blocks: 63,
            ..args()
        };
        assert!(validate_geometry(&a).is_err());
    }

    // =========================================================================
    // End to end through the image file
    // =========================================================================

    #[test]
    fn test_create_unlock_write_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flash.img");
        let data = dir.path().join("page.bin");
        fs::write(&data, b"hello onenand").unwrap();

        create(&path, &args()).unwrap();
        // Locked chip refuses the program
        assert!(write(&path, 2, 3, Some(&data), None).is_err());

        unlock_all(&path).unwrap();
        write(&path, 2, 3, Some(&data), None).unwrap();

        let mut session = Session::open(&path).unwrap();
        let (main, _) = session.read_page(2, 3, false).unwrap();
        assert_eq!(&main[..13], b"hello onenand");
    }

    #[test]
    fn test_create_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flash.img");

        create(&path, &args()).unwrap();
        assert!(create(&path, &args()).is_err());
        create(&path, &CreateArgs { force: true, ..args() }).unwrap();
    }

    #[test]
    fn test_lock_then_erase_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flash.img");
        create(&path, &args()).unwrap();
        unlock_all(&path).unwrap();

        lock(&path, 10, 2, LockOp::Lock).unwrap();

        assert!(erase(&path, 11, 1, false).is_err());
        erase(&path, 12, 1, true).unwrap();
        let image = image::load(&path).unwrap();
        assert!(image.is_locked(10) && image.is_locked(11));
        assert!(!image.is_locked(12));
    }

    #[test]
    fn test_block_range_overflow_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flash.img");
        create(&path, &args()).unwrap();
        unlock_all(&path).unwrap();

        assert!(lock(&path, u32::MAX, 2, LockOp::Lock).is_err());
        assert!(lock(&path, 63, 2, LockOp::Lock).is_err());
        assert!(erase(&path, 10, u32::MAX, false).is_err());
        assert!(erase(&path, 10, 0, false).is_err());
        assert!(image::load(&path).unwrap().locked.is_empty());
    }

    #[test]
    fn test_ddp_unlock_all_reaches_second_die() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flash.img");
        create(&path, &CreateArgs { ddp: true, ..args() }).unwrap();

        unlock_all(&path).unwrap();

        assert!(image::load(&path).unwrap().locked.is_empty());
    }

    #[test]
    fn test_corrupt_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flash.img");
        create(&path, &args()).unwrap();
        unlock_all(&path).unwrap();

        corrupt(&path, 5, 1).unwrap();

        let mut session = Session::open(&path).unwrap();
        assert!(session.read_page(5, 1, false).is_err());
        assert!(session.read_page(5, 2, false).is_ok());
    }
}
