//! # VDP Command Builder
//!
//! The V9938 command engine is programmed through fifteen registers, written
//! in order and started by the final write to R#46:
//!
//! | Register  | Name | Description                                 |
//! |-----------|------|---------------------------------------------|
//! | R#32–33   | SX   | Source X (9 bits)                           |
//! | R#34–35   | SY   | Source Y (10 bits, spans all pages)         |
//! | R#36–37   | DX   | Destination X (9 bits)                      |
//! | R#38–39   | DY   | Destination Y (10 bits)                     |
//! | R#40–41   | NX   | Width, or long side for LINE                |
//! | R#42–43   | NY   | Height, or short side for LINE              |
//! | R#44      | CLR  | Color                                       |
//! | R#45      | ARG  | Direction and axis flags ([`Arg`])          |
//! | R#46      | CMD  | [`Opcode`] in the high nibble, [`LogicOp`] low |
//!
//! A [`VdpCommand`] holds those fields; [`submit`] is the only place that
//! touches the registers.

use log::trace;

use crate::config::WaitPolicy;
use crate::error::GfxError;
use crate::vdp::{Status2, Vdp};

/// First command register (SX low byte).
pub const REG_SX: u8 = 32;
/// Command register; writing it starts execution.
pub const REG_CMD: u8 = 46;
/// Number of command registers, R#32 through R#46.
pub const COMMAND_REGISTERS: usize = 15;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Stop = 0x0,
    Point = 0x4,
    Pset = 0x5,
    Srch = 0x6,
    Line = 0x7,
    /// Logical fill (pixel granularity).
    Lmmv = 0x8,
    /// Logical VRAM to VRAM copy.
    Lmmm = 0x9,
    Lmcm = 0xA,
    Lmmc = 0xB,
    /// High-speed fill (byte granularity).
    Hmmv = 0xC,
    /// High-speed VRAM to VRAM copy.
    Hmmm = 0xD,
    Ymmm = 0xE,
    Hmmc = 0xF,
}

impl Opcode {
    /// Decode the high nibble of R#46. The unused codes 1–3 act as STOP.
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble & 0x0F {
            0x4 => Opcode::Point,
            0x5 => Opcode::Pset,
            0x6 => Opcode::Srch,
            0x7 => Opcode::Line,
            0x8 => Opcode::Lmmv,
            0x9 => Opcode::Lmmm,
            0xA => Opcode::Lmcm,
            0xB => Opcode::Lmmc,
            0xC => Opcode::Hmmv,
            0xD => Opcode::Hmmm,
            0xE => Opcode::Ymmm,
            0xF => Opcode::Hmmc,
            _ => Opcode::Stop,
        }
    }
}

/// Logical operation applied by the L-prefixed commands, LINE and PSET.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LogicOp {
    Imp = 0x0,
    And = 0x1,
    Or = 0x2,
    Xor = 0x3,
    Not = 0x4,
    TImp = 0x8,
    TAnd = 0x9,
    TOr = 0xA,
    TXor = 0xB,
    TNot = 0xC,
}

impl LogicOp {
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble & 0x0F {
            0x1 => LogicOp::And,
            0x2 => LogicOp::Or,
            0x3 => LogicOp::Xor,
            0x4 => LogicOp::Not,
            0x8 => LogicOp::TImp,
            0x9 => LogicOp::TAnd,
            0xA => LogicOp::TOr,
            0xB => LogicOp::TXor,
            0xC => LogicOp::TNot,
            _ => LogicOp::Imp,
        }
    }

    #[inline(always)]
    pub fn is_transparent(self) -> bool {
        (self as u8) & 0x8 != 0
    }

    /// Combine source color `src` with destination color `dst`.
    ///
    /// `None` means the write is skipped (transparent op with `src == 0`).
    /// The result is not masked to the pixel width.
    pub fn apply(self, src: u8, dst: u8) -> Option<u8> {
        if self.is_transparent() && src == 0 {
            return None;
        }
        Some(match self {
            LogicOp::Imp | LogicOp::TImp => src,
            LogicOp::And | LogicOp::TAnd => src & dst,
            LogicOp::Or | LogicOp::TOr => src | dst,
            LogicOp::Xor | LogicOp::TXor => src ^ dst,
            LogicOp::Not | LogicOp::TNot => !src,
        })
    }
}

bitflags::bitflags! {
    /// Argument register R#45.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Arg: u8 {
        /// LINE: the long side runs along Y.
        const MAJ = 0b0000_0001;
        /// SRCH: stop on equal color.
        const EQ  = 0b0000_0010;
        /// Walk X leftwards.
        const DIX = 0b0000_0100;
        /// Walk Y upwards.
        const DIY = 0b0000_1000;
        /// Source in expansion RAM.
        const MXS = 0b0001_0000;
        /// Destination in expansion RAM.
        const MXD = 0b0010_0000;
    }
}

/// One command-engine instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VdpCommand {
    pub sx: u16,
    pub sy: u16,
    pub dx: u16,
    pub dy: u16,
    pub nx: u16,
    pub ny: u16,
    pub color: u8,
    pub arg: Arg,
    pub opcode: Opcode,
    pub logic: LogicOp,
}

impl VdpCommand {
    fn new(opcode: Opcode) -> Self {
        Self {
            sx: 0,
            sy: 0,
            dx: 0,
            dy: 0,
            nx: 0,
            ny: 0,
            color: 0,
            arg: Arg::empty(),
            opcode,
            logic: LogicOp::Imp,
        }
    }

    /// Logical fill of a `width`×`height` rectangle (LMMV).
    pub fn fill(x: u16, y: u16, width: u16, height: u16, color: u8) -> Self {
        Self {
            dx: x,
            dy: y,
            nx: width,
            ny: height,
            color,
            ..Self::new(Opcode::Lmmv)
        }
    }

    /// Single pixel, issued as a 1×1 logical fill.
    pub fn pset(x: u16, y: u16, color: u8) -> Self {
        Self::fill(x, y, 1, 1, color)
    }

    /// Byte-granular fill (HMMV). `packed` must already hold the color
    /// replicated across the byte.
    pub fn fill_bytes(x: u16, y: u16, width: u16, height: u16, packed: u8) -> Self {
        Self {
            opcode: Opcode::Hmmv,
            ..Self::fill(x, y, width, height, packed)
        }
    }

    /// LINE from (`x1`, `y1`) to (`x2`, `y2`), endpoints inclusive.
    ///
    /// NX carries the long side and NY the short side, both as deltas; the
    /// engine plots NX + 1 dots.
    pub fn line(x1: u16, y1: u16, x2: u16, y2: u16, color: u8) -> Self {
        let mut arg = Arg::empty();
        let mut long = x2 as i32 - x1 as i32;
        let mut short = y2 as i32 - y1 as i32;
        if long < 0 {
            long = -long;
            arg |= Arg::DIX;
        }
        if short < 0 {
            short = -short;
            arg |= Arg::DIY;
        }
        if long < short {
            core::mem::swap(&mut long, &mut short);
            arg |= Arg::MAJ;
        }
        Self {
            dx: x1,
            dy: y1,
            nx: long as u16,
            ny: short as u16,
            color,
            arg,
            ..Self::new(Opcode::Line)
        }
    }

    /// Logical VRAM to VRAM copy (LMMM). When the destination lies right of
    /// or below the source the walk starts from the far edge, so overlapping
    /// copies read each pixel before it is overwritten.
    pub fn copy(sx: u16, sy: u16, width: u16, height: u16, dx: u16, dy: u16) -> Self {
        let mut command = Self {
            sx,
            sy,
            dx,
            dy,
            nx: width,
            ny: height,
            ..Self::new(Opcode::Lmmm)
        };
        if width == 0 || height == 0 {
            return command;
        }
        if dx > sx {
            command.arg |= Arg::DIX;
            command.sx += width - 1;
            command.dx += width - 1;
        }
        if dy > sy {
            command.arg |= Arg::DIY;
            command.sy += height - 1;
            command.dy += height - 1;
        }
        command
    }

    pub fn with_logic(mut self, logic: LogicOp) -> Self {
        self.logic = logic;
        self
    }

    /// Values for R#32 through R#46, masked to the register widths.
    pub fn registers(&self) -> [u8; COMMAND_REGISTERS] {
        [
            self.sx as u8,
            (self.sx >> 8) as u8 & 0x01,
            self.sy as u8,
            (self.sy >> 8) as u8 & 0x03,
            self.dx as u8,
            (self.dx >> 8) as u8 & 0x01,
            self.dy as u8,
            (self.dy >> 8) as u8 & 0x03,
            self.nx as u8,
            (self.nx >> 8) as u8 & 0x03,
            self.ny as u8,
            (self.ny >> 8) as u8 & 0x03,
            self.color,
            self.arg.bits(),
            (self.opcode as u8) << 4 | self.logic as u8,
        ]
    }

    /// Rebuild a command from the register file, as the VDP sees it.
    pub fn from_registers(regs: &[u8; COMMAND_REGISTERS]) -> Self {
        let word = |lo: usize, mask: u8| regs[lo] as u16 | ((regs[lo + 1] & mask) as u16) << 8;
        Self {
            sx: word(0, 0x01),
            sy: word(2, 0x03),
            dx: word(4, 0x01),
            dy: word(6, 0x03),
            nx: word(8, 0x03),
            ny: word(10, 0x03),
            color: regs[12],
            arg: Arg::from_bits_truncate(regs[13]),
            opcode: Opcode::from_nibble(regs[14] >> 4),
            logic: LogicOp::from_nibble(regs[14]),
        }
    }
}

/// Poll S#2 until the `CE` bit clears.
pub fn wait_ready<V: Vdp>(vdp: &mut V, wait: WaitPolicy) -> Result<(), GfxError> {
    let mut polls: u32 = 0;
    loop {
        let status = vdp.without_interrupts(|vdp| Status2::from_bits_truncate(vdp.read_status(2)));
        if !status.contains(Status2::CE) {
            return Ok(());
        }
        polls = polls.saturating_add(1);
        if let WaitPolicy::Bounded { polls: limit } = wait {
            if polls >= limit {
                return Err(GfxError::CommandTimeout { polls });
            }
        }
        core::hint::spin_loop();
    }
}

/// Wait for the engine to go idle, load `command` and wait for it to finish.
pub fn submit<V: Vdp>(vdp: &mut V, command: &VdpCommand, wait: WaitPolicy) -> Result<(), GfxError> {
    wait_ready(vdp, wait)?;

    trace!(target: "vdp", "{:?}", command);
    let registers = command.registers();
    vdp.without_interrupts(|vdp| {
        for (offset, value) in registers.iter().enumerate() {
            vdp.write_register(REG_SX + offset as u8, *value);
        }
    });

    wait_ready(vdp, wait)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_flags_follow_deltas() {
        let steep_up_left = VdpCommand::line(10, 50, 5, 20, 7);
        assert_eq!(steep_up_left.arg, Arg::DIX | Arg::DIY | Arg::MAJ);
        assert_eq!((steep_up_left.nx, steep_up_left.ny), (30, 5));

        let shallow = VdpCommand::line(0, 0, 9, 2, 1);
        assert_eq!(shallow.arg, Arg::empty());
        assert_eq!((shallow.nx, shallow.ny), (9, 2));
    }

    #[test]
    fn registers_mask_to_hardware_widths() {
        let command = VdpCommand::fill(511, 1023, 512, 212, 0x0F).with_logic(LogicOp::TXor);
        let regs = command.registers();
        assert_eq!(regs[4], 0xFF);
        assert_eq!(regs[5], 0x01);
        assert_eq!(regs[7], 0x03);
        assert_eq!(regs[9], 0x02);
        assert_eq!(regs[14], 0x8B);
        assert_eq!(VdpCommand::from_registers(&regs), command);
    }

    #[test]
    fn overlapping_copy_walks_from_far_edge() {
        let right = VdpCommand::copy(10, 10, 4, 3, 12, 10);
        assert_eq!(right.arg, Arg::DIX);
        assert_eq!((right.sx, right.dx), (13, 15));
        assert_eq!(right.sy, 10);

        let left = VdpCommand::copy(10, 10, 4, 3, 8, 5);
        assert_eq!(left.arg, Arg::empty());
    }

    #[test]
    fn transparent_ops_skip_zero() {
        assert_eq!(LogicOp::TImp.apply(0, 5), None);
        assert_eq!(LogicOp::TOr.apply(2, 5), Some(7));
        assert_eq!(LogicOp::Xor.apply(3, 5), Some(6));
        assert_eq!(LogicOp::Not.apply(0x0F, 0).map(|c| c & 0x0F), Some(0));
    }
}
