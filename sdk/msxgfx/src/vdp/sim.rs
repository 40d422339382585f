//! In-memory V9938 for hosts and tests.
//!
//! Executes commands synchronously when R#46 is written, then reports itself
//! busy for a configurable number of S#2 reads. VRAM is addressed linearly in
//! every bitmap mode (no SCREEN 7/8 bank interleave).

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use bit_field::BitField;
use log::{debug, warn};

use crate::backend::planar::{self, COLOR_TABLE, PATTERN_GENERATOR};
use crate::mode::{ScreenMode, PAGE_LINES};
use crate::palette::{grb332_to_rgb888, rgb333_to_rgb888, yjk_to_rgb888, DEFAULT_PALETTE};
use crate::vdp::command::{LogicOp, Opcode, VdpCommand, COMMAND_REGISTERS, REG_CMD, REG_SX};
use crate::vdp::{Arg, Status0, Status2, Vdp, REG_NAME_TABLE, REG_PALETTE, VRAM_SIZE};

const REG_MODE0: usize = 0;
const REG_MODE1: usize = 1;
const REG_BACKDROP: usize = 7;
const REG_MODE25: usize = 25;

/// An RGBA8 image of the displayed page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub struct SimVdp {
    vram: Box<[u8]>,
    regs: [u8; 64],
    status: [u8; 10],
    palette: [(u8, u8, u8); 16],
    palette_low: Option<u8>,

    busy_polls: u32,
    pending: u32,
    hung: bool,

    interrupts_enabled: bool,
    unguarded_command_writes: u32,
    commands_executed: u32,
    frames: u32,
}

impl Default for SimVdp {
    fn default() -> Self {
        Self::new()
    }
}

impl SimVdp {
    pub fn new() -> Self {
        Self {
            vram: vec![0u8; VRAM_SIZE].into_boxed_slice(),
            regs: [0; 64],
            status: [0; 10],
            palette: DEFAULT_PALETTE,
            palette_low: None,
            busy_polls: 0,
            pending: 0,
            hung: false,
            interrupts_enabled: true,
            unguarded_command_writes: 0,
            commands_executed: 0,
            frames: 0,
        }
    }

    /// Keep `CE` set for `polls` status reads after each command.
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Never clear `CE` once a command has started.
    pub fn set_hung(&mut self, hung: bool) {
        self.hung = hung;
        self.update_ce();
    }

    /// Load the mode registers directly, as the BIOS `CHGMOD` call would.
    pub fn set_mode(&mut self, mode: ScreenMode) {
        let (r0, r1, r25) = mode.mode_registers();
        self.regs[REG_MODE0] = r0;
        self.regs[REG_MODE1] = r1 | 0x40;
        self.regs[REG_MODE25] = r25;
        self.regs[REG_NAME_TABLE as usize] = mode.display_page_register(0);
    }

    pub fn mode(&self) -> Option<ScreenMode> {
        ScreenMode::from_registers(self.regs[REG_MODE0], self.regs[REG_MODE1], self.regs[REG_MODE25])
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.regs[(reg & 0x3F) as usize]
    }

    pub fn palette(&self, index: u8) -> (u8, u8, u8) {
        self.palette[(index & 0x0F) as usize]
    }

    pub fn commands_executed(&self) -> u32 {
        self.commands_executed
    }

    /// Command register writes that happened with interrupts enabled.
    pub fn unguarded_command_writes(&self) -> u32 {
        self.unguarded_command_writes
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Latch status bits the sprite hardware would raise.
    pub fn raise_status0(&mut self, bits: Status0) {
        self.status[0] |= bits.bits();
    }

    fn update_ce(&mut self) {
        let busy = self.hung || self.pending > 0;
        self.status[2].set_bit(0, busy);
    }

    fn read_pixel(&self, mode: &ScreenMode, x: u16, y: u16) -> u8 {
        let addr = mode.pixel_address(x, y) as usize;
        match self.vram.get(addr) {
            Some(byte) => byte.get_bits(mode.pixel_bits(x)),
            None => 0,
        }
    }

    fn write_pixel(&mut self, mode: &ScreenMode, x: i32, y: i32, color: u8, logic: LogicOp) {
        if x < 0 || y < 0 || x >= mode.width() as i32 || y >= mode.vram_lines() as i32 {
            return;
        }
        let (x, y) = (x as u16, y as u16);
        let mask = mode.color_mask();
        let dst = self.read_pixel(mode, x, y);
        let Some(value) = logic.apply(color & mask, dst) else {
            return;
        };
        let addr = mode.pixel_address(x, y) as usize;
        self.vram[addr].set_bits(mode.pixel_bits(x), value & mask);
    }

    fn execute(&mut self) {
        let mut regs = [0u8; COMMAND_REGISTERS];
        regs.copy_from_slice(&self.regs[REG_SX as usize..=REG_CMD as usize]);
        let command = VdpCommand::from_registers(&regs);

        if command.opcode == Opcode::Stop {
            self.pending = 0;
            self.update_ce();
            return;
        }

        let Some(mode) = self.mode().filter(ScreenMode::is_bitmap) else {
            warn!(target: "vdp", "{:?} ignored outside the bitmap modes", command.opcode);
            return;
        };

        debug!(target: "vdp", "execute {:?}", command);
        self.commands_executed += 1;

        let lines = mode.vram_lines() as u16;
        let nx = if command.nx == 0 { mode.width() } else { command.nx };
        let ny = if command.ny == 0 { lines } else { command.ny };
        let step_x: i32 = if command.arg.contains(Arg::DIX) { -1 } else { 1 };
        let step_y: i32 = if command.arg.contains(Arg::DIY) { -1 } else { 1 };

        match command.opcode {
            Opcode::Hmmv => {
                for row in 0..ny as i32 {
                    let y = command.dy as i32 + row * step_y;
                    for col in 0..nx as i32 {
                        let x = command.dx as i32 + col * step_x;
                        let color = command.color.get_bits(mode.pixel_bits(x.max(0) as u16));
                        self.write_pixel(&mode, x, y, color, LogicOp::Imp);
                    }
                }
            }
            Opcode::Lmmv => {
                for row in 0..ny as i32 {
                    let y = command.dy as i32 + row * step_y;
                    for col in 0..nx as i32 {
                        let x = command.dx as i32 + col * step_x;
                        self.write_pixel(&mode, x, y, command.color, command.logic);
                    }
                }
            }
            Opcode::Lmmm | Opcode::Hmmm => {
                let logic = match command.opcode {
                    Opcode::Hmmm => LogicOp::Imp,
                    _ => command.logic,
                };
                for row in 0..ny as i32 {
                    let sy = command.sy as i32 + row * step_y;
                    let dy = command.dy as i32 + row * step_y;
                    for col in 0..nx as i32 {
                        let sx = command.sx as i32 + col * step_x;
                        let dx = command.dx as i32 + col * step_x;
                        let color = if sx < 0 || sy < 0 || sx >= mode.width() as i32 || sy >= lines as i32 {
                            0
                        } else {
                            self.read_pixel(&mode, sx as u16, sy as u16)
                        };
                        self.write_pixel(&mode, dx, dy, color, logic);
                    }
                }
            }
            Opcode::Line => {
                let long = command.nx as i32;
                let short = command.ny as i32;
                let (mut x, mut y) = (command.dx as i32, command.dy as i32);
                let mut err = 0i32;
                for _ in 0..=long {
                    self.write_pixel(&mode, x, y, command.color, command.logic);
                    if command.arg.contains(Arg::MAJ) {
                        y += step_y;
                    } else {
                        x += step_x;
                    }
                    err += short * 2;
                    if err > long {
                        if command.arg.contains(Arg::MAJ) {
                            x += step_x;
                        } else {
                            y += step_y;
                        }
                        err -= long * 2;
                    }
                }
            }
            Opcode::Pset => {
                self.write_pixel(&mode, command.dx as i32, command.dy as i32, command.color, command.logic);
            }
            Opcode::Point => {
                let (x, y) = (command.sx, command.sy);
                self.status[7] = if x < mode.width() && y < lines {
                    self.read_pixel(&mode, x, y)
                } else {
                    0
                };
            }
            other => {
                warn!(target: "vdp", "unsupported command {:?}", other);
                return;
            }
        }

        self.pending = self.busy_polls;
        self.update_ce();
    }

    /// Render the displayed page to RGBA.
    ///
    /// Returns `None` in modes without a graphics backend.
    pub fn render_rgba(&self) -> Option<Frame> {
        let mode = self.mode()?;
        let (width, height) = (mode.width() as u32, mode.height() as u32);
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        let backdrop = self.regs[REG_BACKDROP] & 0x0F;

        if !mode.is_bitmap() {
            for y in 0..mode.height() {
                for x in 0..mode.width() {
                    let (offset, bit) = planar::cell(x, y);
                    let pattern = self.vram[(PATTERN_GENERATOR + offset) as usize];
                    let color = self.vram[(COLOR_TABLE + offset) as usize];
                    let mut index = if pattern.get_bit(bit) { color >> 4 } else { color & 0x0F };
                    if index == 0 {
                        index = backdrop;
                    }
                    pixels.extend_from_slice(&rgb333_to_rgb888(self.palette(index)));
                    pixels.push(0xFF);
                }
            }
            return Some(Frame { width, height, pixels });
        }

        let page = mode.display_page_from_register(self.regs[REG_NAME_TABLE as usize]);
        let top = page as u16 * PAGE_LINES;
        for y in top..top + mode.height() {
            for x in 0..mode.width() {
                let rgb = match mode.number() {
                    8 => grb332_to_rgb888(self.read_pixel(&mode, x, y)),
                    10..=12 => self.yjk_pixel(&mode, x, y),
                    _ => rgb333_to_rgb888(self.palette(self.read_pixel(&mode, x, y))),
                };
                pixels.extend_from_slice(&rgb);
                pixels.push(0xFF);
            }
        }
        Some(Frame { width, height, pixels })
    }

    fn yjk_pixel(&self, mode: &ScreenMode, x: u16, y: u16) -> [u8; 3] {
        let group = mode.pixel_address(x & !3, y) as usize;
        let bytes = &self.vram[group..group + 4];
        let byte = bytes[(x & 3) as usize];
        // SCREEN 10/11 mark palette pixels with the A bit
        if mode.number() == 10 && byte.get_bit(3) {
            return rgb333_to_rgb888(self.palette(byte >> 4));
        }
        let signed6 = |lo: u8, hi: u8| -> i8 { (((hi & 7) << 3 | (lo & 7)) << 2) as i8 >> 2 };
        let k = signed6(bytes[0], bytes[1]);
        let j = signed6(bytes[2], bytes[3]);
        yjk_to_rgb888(byte >> 3, j, k)
    }
}

impl Vdp for SimVdp {
    fn read_vram(&mut self, addr: u32) -> u8 {
        self.vram[addr as usize % VRAM_SIZE]
    }

    fn write_vram(&mut self, addr: u32, value: u8) {
        self.vram[addr as usize % VRAM_SIZE] = value;
    }

    fn write_register(&mut self, reg: u8, value: u8) {
        let reg = reg & 0x3F;
        self.regs[reg as usize] = value;
        if (REG_SX..=REG_CMD).contains(&reg) && self.interrupts_enabled {
            self.unguarded_command_writes += 1;
        }
        match reg {
            REG_PALETTE => self.palette_low = None,
            REG_CMD => self.execute(),
            _ => {}
        }
    }

    fn read_status(&mut self, reg: u8) -> u8 {
        let reg = (reg & 0x0F) as usize;
        let Some(&value) = self.status.get(reg) else {
            return 0xFF;
        };
        match reg {
            0 => {
                let cleared = Status0::F | Status0::FIFTH_SPRITE | Status0::COLLISION;
                self.status[0] &= !cleared.bits();
            }
            2 => {
                self.pending = self.pending.saturating_sub(1);
                self.update_ce();
            }
            _ => {}
        }
        value
    }

    fn write_palette(&mut self, value: u8) {
        let index = (self.regs[REG_PALETTE as usize] & 0x0F) as usize;
        match self.palette_low.take() {
            None => self.palette_low = Some(value),
            Some(rb) => {
                self.palette[index] = ((rb >> 4) & 0x07, value & 0x07, rb & 0x07);
                self.regs[REG_PALETTE as usize] = ((index + 1) & 0x0F) as u8;
            }
        }
    }

    fn wait_vblank(&mut self) {
        self.frames += 1;
        self.status[0] |= Status0::F.bits();
        self.status[2] |= Status2::VR.bits();
    }

    fn without_interrupts<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.interrupts_enabled;
        self.interrupts_enabled = false;
        let result = f(self);
        self.interrupts_enabled = previous;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaitPolicy;
    use crate::vdp::{submit, wait_ready};
    use crate::GfxError;

    fn screen5() -> SimVdp {
        let mut vdp = SimVdp::new();
        vdp.set_mode(ScreenMode::from_number(5).unwrap());
        vdp
    }

    #[test]
    fn busy_flag_counts_down_per_poll() {
        let mut vdp = screen5().with_busy_polls(3);
        submit(&mut vdp, &VdpCommand::pset(0, 0, 1), WaitPolicy::Unbounded).unwrap();
        assert_eq!(vdp.read_status(2) & Status2::CE.bits(), 0);
        assert_eq!(vdp.unguarded_command_writes(), 0);
    }

    #[test]
    fn hung_engine_times_out_when_bounded() {
        let mut vdp = screen5();
        vdp.set_hung(true);
        let err = wait_ready(&mut vdp, WaitPolicy::Bounded { polls: 10 }).unwrap_err();
        assert_eq!(err, GfxError::CommandTimeout { polls: 10 });
    }

    #[test]
    fn transparent_fill_keeps_destination() {
        let mut vdp = screen5();
        let wait = WaitPolicy::Unbounded;
        submit(&mut vdp, &VdpCommand::fill(0, 0, 4, 1, 5), wait).unwrap();
        submit(&mut vdp, &VdpCommand::fill(0, 0, 4, 1, 0).with_logic(LogicOp::TImp), wait).unwrap();
        assert_eq!(&vdp.vram()[..2], &[0x55, 0x55]);
        submit(&mut vdp, &VdpCommand::fill(0, 0, 2, 1, 3).with_logic(LogicOp::Xor), wait).unwrap();
        assert_eq!(vdp.vram()[0], 0x66);
    }

    #[test]
    fn line_reaches_both_endpoints() {
        let mut vdp = screen5();
        let mode = vdp.mode().unwrap();
        submit(&mut vdp, &VdpCommand::line(20, 30, 3, 2, 7), WaitPolicy::Unbounded).unwrap();
        assert_eq!(vdp.read_pixel(&mode, 20, 30), 7);
        assert_eq!(vdp.read_pixel(&mode, 3, 2), 7);
    }

    #[test]
    fn point_reports_through_status7() {
        let mut vdp = screen5();
        submit(&mut vdp, &VdpCommand::pset(9, 9, 0xC), WaitPolicy::Unbounded).unwrap();
        let point = VdpCommand { sx: 9, sy: 9, opcode: Opcode::Point, ..VdpCommand::pset(0, 0, 0) };
        submit(&mut vdp, &point, WaitPolicy::Unbounded).unwrap();
        assert_eq!(vdp.read_status(7), 0xC);
    }

    #[test]
    fn palette_port_auto_increments() {
        let mut vdp = SimVdp::new();
        vdp.write_register(REG_PALETTE, 14);
        vdp.write_palette(0x70);
        vdp.write_palette(0x07);
        vdp.write_palette(0x07);
        vdp.write_palette(0x00);
        assert_eq!(vdp.palette(14), (7, 7, 0));
        assert_eq!(vdp.palette(15), (0, 0, 7));
    }

    #[test]
    fn render_uses_display_page() {
        let mut vdp = screen5();
        let mode = vdp.mode().unwrap();
        vdp.write_vram(256 * 128, 0xF0);
        vdp.write_register(REG_NAME_TABLE, mode.display_page_register(1));
        let frame = vdp.render_rgba().unwrap();
        assert_eq!((frame.width, frame.height), (256, 212));
        assert_eq!(&frame.pixels[..4], &[255, 255, 255, 255]);
        assert_eq!(&frame.pixels[4..8], &[0, 0, 0, 255]);
    }
}
