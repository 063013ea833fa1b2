// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Controller handle and reset sequencing.

use crate::bufferram::BufferRam;
use crate::regs::{int, Reg, RegisterBus, MEM_RESET_COLD};
use crate::soc::{SocVariant, Window};
use crate::timer::{poll_iterations, PollOutcome, TickSource};

/// Poll bound for the reset-complete flag.
pub const RESET_MAX_POLLS: u32 = 0x10000;

/// Completion deadline for data and control operations, in milliseconds.
pub const WAIT_TIMEOUT_MS: u64 = 20;

/// Handle to one OneNAND controller.
///
/// Owns the register bus, the tick source, the emulated BufferRAM and the
/// boot-mode flag. The caller owns the handle and passes the chip state in
/// on every call; one operation is in flight at a time.
pub struct Controller<B, T> {
    pub(crate) soc: &'static SocVariant,
    pub(crate) bus: B,
    pub(crate) ticks: T,
    pub(crate) bufferram: BufferRam,
    /// Set by a READ_ID written to the BootRAM range, cleared by RESET.
    pub(crate) bootram_command: bool,
}

impl<B: RegisterBus, T: TickSource> Controller<B, T> {
    /// Create a handle with both BufferRAM regions erased to 0xFF.
    pub fn new(soc: &'static SocVariant, bus: B, ticks: T) -> Self {
        debug!("onenand: {} controller at 0x{:08x}", soc.name, soc.reg_base);
        Self {
            soc,
            bus,
            ticks,
            bufferram: BufferRam::new(),
            bootram_command: false,
        }
    }

    pub fn soc(&self) -> &'static SocVariant {
        self.soc
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn is_boot_mode(&self) -> bool {
        self.bootram_command
    }

    /// Give back the bus and tick source.
    pub fn release(self) -> (B, T) {
        (self.bus, self.ticks)
    }

    pub(crate) fn mem_addr(&self, fba: u32, fpa: u32, fsa: u32) -> u32 {
        self.soc.mem_addr(fba, fpa, fsa)
    }

    pub(crate) fn cmd_addr(&self, window: Window, value: u32) -> u32 {
        window.address(self.soc, value)
    }

    /// Cold-reset the memory device.
    ///
    /// Interrupt and ECC status are acknowledged and cleared whether or not
    /// the reset-complete flag was seen. Returns true if it was.
    pub fn reset(&mut self) -> bool {
        self.bus.write_reg(Reg::MemReset, MEM_RESET_COLD);

        let bus = &mut self.bus;
        let outcome = poll_iterations(RESET_MAX_POLLS, || {
            bus.read_reg(Reg::IntErrStat) & int::RST_CMP != 0
        });

        let stat = self.bus.read_reg(Reg::IntErrStat);
        self.bus.write_reg(Reg::IntErrAck, stat);

        // Clear interrupt and ECC status
        self.bus.write_reg(Reg::IntErrAck, 0);
        self.bus.write_reg(Reg::EccErrStat, 0);

        if outcome == PollOutcome::TimedOut {
            warn!("onenand: reset did not complete (status 0x{:04x})", stat);
            return false;
        }
        true
    }
}
