// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! BufferRAM emulation for the Samsung S3C64XX/S5PC100 OneNAND controller.
//!
//! The SoC controller exposes a direct, address-mapped command interface,
//! while the generic OneNAND layer expects a chip with two onboard
//! BufferRAMs. This crate bridges the two:
//! - Two software buffer halves stand in for BufferRAM A/B
//! - Read/program/erase/lock requests become window-tagged command writes
//! - Completion is observed by bounded polling of the interrupt status
//!
//! Features:
//! - Default: `no_std`, no logging backend
//! - `std`: `std::error::Error` for host tools
//! - `defmt`: route diagnostics through `defmt`
//! - `embedded`: volatile MMIO register bus for the real controller

#![cfg_attr(not(feature = "std"), no_std)]

// Must come first so the logging macros are visible to every module.
mod fmt;

pub mod bufferram;
pub mod chip;
pub mod command;
pub mod controller;
pub mod driver;
pub mod error;
pub mod lock;
pub mod regs;
pub mod shim;
pub mod soc;
pub mod timer;
pub mod wait;

// Re-export commonly used types
pub use bufferram::{BufferArea, OOB_BUF_SIZE, PAGE_BUF_SIZE};
pub use chip::{ChipOptions, ChipState, EccStats, FlashState, Geometry};
pub use command::Command;
pub use controller::Controller;
pub use driver::OneNandDriver;
pub use error::{Error, Result};
pub use lock::{LockOp, LockReport};
pub use regs::{Reg, RegisterBus};
pub use soc::{Soc, SocVariant, Window, S3C64XX, S5PC100};
pub use timer::TickSource;

#[cfg(feature = "embedded")]
pub use regs::MmioBus;
