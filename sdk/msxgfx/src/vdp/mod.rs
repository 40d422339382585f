//! # VDP Access
//!
//! Everything the engine needs from the video chip goes through the [`Vdp`]
//! trait. On a real machine it wraps the I/O ports:
//!
//! | Port   | Use                                              |
//! |--------|--------------------------------------------------|
//! | `$98`  | VRAM data                                        |
//! | `$99`  | Register writes, VRAM address setup, status read |
//! | `$9A`  | Palette data                                     |
//! | `$9B`  | Indirect register writes                         |
//!
//! [`SimVdp`](sim::SimVdp) implements the same trait in memory, with a
//! working command engine, so the whole engine runs on a host.
//!
//! Hardware drawing commands are built as a [`VdpCommand`] and handed to
//! [`submit`], which writes the command registers (R#32–R#46) with interrupts
//! masked and then polls the `CE` bit of status register 2.

pub mod command;
pub mod sim;

pub use command::{submit, wait_ready, Arg, LogicOp, Opcode, VdpCommand};

/// 128 KiB of VRAM on a V9938/V9958.
pub const VRAM_SIZE: usize = 0x20000;

/// Palette pointer register.
pub const REG_PALETTE: u8 = 16;
/// Pattern name table base; also selects the displayed page in bitmap modes.
pub const REG_NAME_TABLE: u8 = 2;

bitflags::bitflags! {
    /// Status register S#0.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Status0: u8 {
        /// Vertical retrace interrupt pending.
        const F            = 0b1000_0000;
        /// More than four (or eight) sprites on one line.
        const FIFTH_SPRITE = 0b0100_0000;
        /// Two sprites overlapped.
        const COLLISION    = 0b0010_0000;
    }

    /// Status register S#2.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Status2: u8 {
        /// Transfer ready (CPU-fed commands).
        const TR = 0b1000_0000;
        /// Vertical retrace.
        const VR = 0b0100_0000;
        /// Horizontal retrace.
        const HR = 0b0010_0000;
        /// Border color found (SRCH).
        const BD = 0b0001_0000;
        /// Odd field.
        const EO = 0b0000_0010;
        /// Command executing.
        const CE = 0b0000_0001;
    }
}

/// Port-level access to the video chip.
///
/// Implementations own address latching and status register selection; the
/// engine only ever asks for whole operations.
pub trait Vdp {
    /// Read one byte of VRAM (17-bit address).
    fn read_vram(&mut self, addr: u32) -> u8;

    /// Write one byte of VRAM (17-bit address).
    fn write_vram(&mut self, addr: u32, value: u8);

    /// Write a control register.
    fn write_register(&mut self, reg: u8, value: u8);

    /// Read status register `reg`, leaving S#0 selected afterwards.
    fn read_status(&mut self, reg: u8) -> u8;

    /// Write one byte to the palette port.
    fn write_palette(&mut self, value: u8);

    /// Block until the next vertical blank.
    fn wait_vblank(&mut self);

    /// Run `f` with interrupts masked (`di` ... `ei`).
    ///
    /// Register sequences must not be split by an interrupt handler that also
    /// talks to the VDP.
    fn without_interrupts<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        f(self)
    }
}
