// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host-side OneNAND controller model driven through the BufferRAM driver.
//!
//! Usage:
//!   onenand-sim --image flash.img create --unlock-all
//!   onenand-sim --image flash.img unlock-all
//!   onenand-sim --image flash.img write --block 2 --page 0 page.bin
//!   onenand-sim --image flash.img read --block 2 --page 0 --oob
//!   onenand-sim --image flash.img scan

mod cli;
mod commands;
mod image;
mod model;
mod session;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args)
}
