// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Error types.

use core::fmt;

use crate::regs::int;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A load completed with an uncorrectable ECC error.
    UncorrectableEcc { ecc_status: u32 },
    /// The controller reported a locked block or a failed erase/program/load.
    ControllerFault { status: u32 },
    /// A bad-block-table scan read failed; the controller has been reset.
    BadBlockRead,
    /// A buffer access does not fit in the current BufferRAM half.
    OutOfBounds,
    /// The chip geometry does not fit the emulated buffers.
    Geometry,
}

impl Error {
    /// True for a fault caused by accessing a write-protected block.
    pub fn is_locked_block(&self) -> bool {
        matches!(self, Error::ControllerFault { status } if status & int::LOCKED_BLK != 0)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UncorrectableEcc { ecc_status } => {
                write!(f, "uncorrectable ECC error (ecc status 0x{:04x})", ecc_status)
            }
            Error::ControllerFault { status } if status & int::LOCKED_BLK != 0 => {
                write!(f, "block is locked (status 0x{:04x})", status)
            }
            Error::ControllerFault { status } => {
                write!(f, "controller error (status 0x{:04x})", status)
            }
            Error::BadBlockRead => write!(f, "bad block table read error"),
            Error::OutOfBounds => write!(f, "access outside the current BufferRAM"),
            Error::Geometry => write!(f, "geometry does not fit the emulated BufferRAM"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
