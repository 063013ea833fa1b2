// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use onenand_emu::{LockOp, Soc};

use crate::commands;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "onenand-sim")]
#[command(about = "OneNAND controller model and BufferRAM driver exerciser")]
pub struct Cli {
    /// Flash image file
    #[arg(short, long, default_value = "onenand.img")]
    pub image: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// SoC integration of the controller.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SocArg {
    S3c64xx,
    S5pc100,
}

impl From<SocArg> for Soc {
    fn from(arg: SocArg) -> Self {
        match arg {
            SocArg::S3c64xx => Soc::S3c64xx,
            SocArg::S5pc100 => Soc::S5pc100,
        }
    }
}

/// Chip layout and capabilities for a new image.
#[derive(clap::Args, Clone, Copy, Debug)]
pub struct CreateArgs {
    /// Controller variant
    #[arg(long, value_enum, default_value_t = SocArg::S3c64xx)]
    pub soc: SocArg,

    /// Main bytes per page
    #[arg(long, default_value = "2048")]
    pub page_size: u32,

    /// Spare bytes per page
    #[arg(long, default_value = "64")]
    pub oob_size: u32,

    /// Pages per erase block
    #[arg(long, default_value = "64")]
    pub pages_per_block: u32,

    /// Number of erase blocks
    #[arg(long, default_value = "1024")]
    pub blocks: u32,

    /// Chip accepts the single unlock-all command
    #[arg(long)]
    pub unlock_all: bool,

    /// Dual-die package
    #[arg(long)]
    pub ddp: bool,

    /// Overwrite an existing image
    #[arg(short, long)]
    pub force: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create an erased image with every block locked
    Create(CreateArgs),

    /// Show chip identity, geometry and image statistics
    Info,

    /// Read a page and dump it
    Read {
        #[arg(short, long)]
        block: u32,

        #[arg(short, long, default_value = "0")]
        page: u32,

        /// Also read the spare area
        #[arg(long)]
        oob: bool,

        /// Write the main area to a file instead of dumping it
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Program a page from a file
    Write {
        #[arg(short, long)]
        block: u32,

        #[arg(short, long, default_value = "0")]
        page: u32,

        /// Main area contents
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Spare area contents
        #[arg(long, value_name = "FILE")]
        oob: Option<PathBuf>,
    },

    /// Erase one or more blocks
    Erase {
        #[arg(short, long)]
        block: u32,

        #[arg(short, long, default_value = "1")]
        count: u32,

        /// Verify each block afterwards
        #[arg(long)]
        verify: bool,
    },

    /// Lock a range of blocks
    Lock {
        #[arg(short, long)]
        block: u32,

        #[arg(short, long, default_value = "1")]
        count: u32,
    },

    /// Unlock a range of blocks
    Unlock {
        #[arg(short, long)]
        block: u32,

        #[arg(short, long, default_value = "1")]
        count: u32,
    },

    /// Unlock the whole chip and audit the lock state
    UnlockAll,

    /// Scan every block for bad block markers
    Scan,

    /// Make loads of a page report an uncorrectable ECC error
    Corrupt {
        #[arg(short, long)]
        block: u32,

        #[arg(short, long, default_value = "0")]
        page: u32,
    },
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    let path = cli.image.as_path();

    match cli.command {
        Commands::Create(args) => commands::create(path, &args),
        Commands::Info => commands::info(path),
        Commands::Read {
            block,
            page,
            oob,
            output,
        } => commands::read(path, block, page, oob, output.as_deref()),
        Commands::Write {
            block,
            page,
            file,
            oob,
        } => commands::write(path, block, page, file.as_deref(), oob.as_deref()),
        Commands::Erase {
            block,
            count,
            verify,
        } => commands::erase(path, block, count, verify),
        Commands::Lock { block, count } => commands::lock(path, block, count, LockOp::Lock),
        Commands::Unlock { block, count } => commands::lock(path, block, count, LockOp::Unlock),
        Commands::UnlockAll => commands::unlock_all(path),
        Commands::Scan => commands::scan(path),
        Commands::Corrupt { block, page } => commands::corrupt(path, block, page),
    }
}
