//! Lines, boxes, circles and ellipses.
//!
//! Rasterizers work in `i32` so that centers near the screen edge plus a
//! large radius never overflow; every point goes through the clipping plot.
//! A negative radius draws nothing and leaves the cursor where it was.

use crate::backend::Backend;
use crate::graphics::{Graphics, Point};
use crate::vdp::Vdp;

/// `LINE` variants: plain line, outline box, filled box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LineStyle {
    #[default]
    Line,
    Box,
    BoxFill,
}

/// sin(θ) × 256 for θ = 0..=90 degrees.
const SIN256: [u16; 91] = [
    0, 4, 9, 13, 18, 22, 27, 31, 36, 40, 44, 49, 53, 58, 62, 66, 71, 75, 79, 83, 88, 92, 96, 100, 104, 108, 112, 116,
    120, 124, 128, 132, 136, 139, 143, 147, 150, 154, 158, 161, 165, 168, 171, 175, 178, 181, 184, 187, 190, 193, 196,
    199, 202, 204, 207, 210, 212, 215, 217, 219, 222, 224, 226, 228, 230, 232, 234, 236, 237, 239, 241, 242, 243, 245,
    246, 247, 248, 249, 250, 251, 252, 253, 254, 254, 255, 255, 255, 256, 256, 256, 256,
];

fn sin256(deg: i32) -> i32 {
    let deg = deg.rem_euclid(360);
    let (index, negative) = match deg {
        0..=90 => (deg, false),
        91..=180 => (180 - deg, false),
        181..=270 => (deg - 180, true),
        _ => (360 - deg, true),
    };
    let value = SIN256[index as usize] as i32;
    if negative {
        -value
    } else {
        value
    }
}

#[inline(always)]
fn cos256(deg: i32) -> i32 {
    sin256(deg + 90)
}

/// First octant of a midpoint circle, `(dx, dy)` with `dx <= dy`.
pub(crate) struct CircleOctant {
    dx: i32,
    dy: i32,
    d: i32,
}

impl CircleOctant {
    pub(crate) fn new(radius: i32) -> Self {
        Self { dx: 0, dy: radius, d: 1 - radius }
    }
}

impl Iterator for CircleOctant {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.dx > self.dy {
            return None;
        }
        let point = (self.dx, self.dy);
        if self.d < 0 {
            self.d += 2 * self.dx + 3;
        } else {
            self.d += 2 * (self.dx - self.dy) + 5;
            self.dy -= 1;
        }
        self.dx += 1;
        Some(point)
    }
}

/// First quadrant of a midpoint ellipse, from (0, ry) to (rx, 0).
///
/// Decision variables are kept ×4 so the half-pixel terms stay integral.
pub(crate) struct EllipseQuadrant {
    rx: i64,
    rx2: i64,
    ry2: i64,
    dx: i64,
    dy: i64,
    px: i64,
    py: i64,
    p: i64,
    upper: bool,
}

impl EllipseQuadrant {
    pub(crate) fn new(rx: i32, ry: i32) -> Self {
        let rx2 = rx as i64 * rx as i64;
        let ry2 = ry as i64 * ry as i64;
        Self {
            rx: rx as i64,
            rx2,
            ry2,
            dx: 0,
            dy: ry as i64,
            px: 0,
            py: 2 * rx2 * ry as i64,
            p: 4 * ry2 - 4 * rx2 * ry as i64 + rx2,
            upper: true,
        }
    }
}

impl Iterator for EllipseQuadrant {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.upper && self.px >= self.py {
            self.upper = false;
            let half = 2 * self.dx + 1;
            self.p = self.ry2 * half * half + 4 * self.rx2 * (self.dy - 1) * (self.dy - 1) - 4 * self.rx2 * self.ry2;
        }
        if self.dy < 0 {
            return None;
        }
        let point = (self.dx as i32, self.dy as i32);
        if self.upper {
            self.dx += 1;
            self.px += 2 * self.ry2;
            if self.p < 0 {
                self.p += 4 * (self.ry2 + self.px);
            } else {
                self.dy -= 1;
                self.py -= 2 * self.rx2;
                self.p += 4 * (self.ry2 + self.px - self.py);
            }
        } else if self.dy == 0 && self.dx < self.rx {
            // flat ellipses leave region 2 short of rx
            self.dx += 1;
        } else {
            self.dy -= 1;
            self.py -= 2 * self.rx2;
            if self.p > 0 {
                self.p += 4 * (self.rx2 - self.py);
            } else {
                self.dx += 1;
                self.px += 2 * self.ry2;
                self.p += 4 * (self.rx2 - self.py + self.px);
            }
        }
        Some(point)
    }
}

impl<V: Vdp> Graphics<V> {
    /// Line between two points, endpoints included. The cursor ends on
    /// (`x2`, `y2`) even when that point is off screen.
    pub fn line(&mut self, x1: i16, y1: i16, x2: i16, y2: i16, color: u8) {
        let accelerated = match &self.backend {
            Backend::Bitmap(b) => b.draw_line(&mut self.vdp, x1, y1, x2, y2, color),
            Backend::Planar(_) => false,
        };
        if !accelerated {
            self.bresenham(x1 as i32, y1 as i32, x2 as i32, y2 as i32, color);
        }
        self.cursor = Point::new(x2, y2);
    }

    fn bresenham(&mut self, mut x: i32, mut y: i32, x2: i32, y2: i32, color: u8) {
        let dx = (x2 - x).abs();
        let dy = (y2 - y).abs();
        let sx = if x < x2 { 1 } else { -1 };
        let sy = if y < y2 { 1 } else { -1 };
        let mut err = dx - dy;
        loop {
            self.plot(x, y, color);
            if x == x2 && y == y2 {
                break;
            }
            let e2 = err * 2;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// `LINE (x1,y1)-(x2,y2),color[,B|BF]`.
    pub fn line_styled(&mut self, x1: i16, y1: i16, x2: i16, y2: i16, color: u8, style: LineStyle) {
        match style {
            LineStyle::Line => self.line(x1, y1, x2, y2, color),
            LineStyle::Box => self.r#box(x1, y1, x2, y2, color),
            LineStyle::BoxFill => self.boxfill(x1, y1, x2, y2, color),
        }
    }

    /// `LINE -(x2,y2)`: from the cursor.
    pub fn line_to(&mut self, x2: i16, y2: i16, color: u8, style: LineStyle) {
        let Point { x, y } = self.cursor;
        self.line_styled(x, y, x2, y2, color, style);
    }

    /// `LINE -STEP(dx,dy)`: from the cursor to an offset of it.
    pub fn line_step(&mut self, dx: i16, dy: i16, color: u8, style: LineStyle) {
        let Point { x, y } = self.cursor;
        self.line_styled(x, y, x.saturating_add(dx), y.saturating_add(dy), color, style);
    }

    /// Outline rectangle; corner order does not matter.
    pub fn r#box(&mut self, x1: i16, y1: i16, x2: i16, y2: i16, color: u8) {
        self.line(x1, y1, x2, y1, color);
        self.line(x2, y1, x2, y2, color);
        self.line(x2, y2, x1, y2, color);
        self.line(x1, y2, x1, y1, color);
        self.cursor = Point::new(x2, y2);
    }

    pub fn boxfill(&mut self, x1: i16, y1: i16, x2: i16, y2: i16, color: u8) {
        if let Backend::Bitmap(b) = &self.backend {
            b.fill_rect(&mut self.vdp, x1, y1, x2, y2, color);
        } else {
            for y in y1.min(y2)..=y1.max(y2) {
                self.hline(x1 as i32, x2 as i32, y as i32, color);
            }
        }
        self.cursor = Point::new(x2, y2);
    }

    pub fn circle(&mut self, x: i16, y: i16, radius: i16, color: u8) {
        if radius < 0 {
            return;
        }
        let (cx, cy) = (x as i32, y as i32);
        for (dx, dy) in CircleOctant::new(radius as i32) {
            self.plot(cx + dx, cy + dy, color);
            self.plot(cx - dx, cy + dy, color);
            self.plot(cx + dx, cy - dy, color);
            self.plot(cx - dx, cy - dy, color);
            self.plot(cx + dy, cy + dx, color);
            self.plot(cx - dy, cy + dx, color);
            self.plot(cx + dy, cy - dx, color);
            self.plot(cx - dy, cy - dx, color);
        }
        self.cursor = Point::new(x, y);
    }

    /// `CIRCLE` with start/end angles (degrees) and an aspect ratio in
    /// percent (100 is round; `<= 0` means 100).
    ///
    /// Points are placed one degree apart from `start` to `end` inclusive,
    /// counter-clockwise, wrapping past 359. Large radii leave gaps and tiny
    /// radii plot the same pixel repeatedly.
    #[allow(clippy::too_many_arguments)]
    pub fn circle_arc(&mut self, x: i16, y: i16, radius: i16, color: u8, start: i16, end: i16, aspect: i16) {
        if radius < 0 {
            return;
        }
        let aspect = if aspect <= 0 { 100 } else { aspect as i32 };
        let radius = radius as i32;
        let (rx, ry) = if aspect >= 100 {
            (radius, radius * 100 / aspect)
        } else {
            (radius * aspect / 100, radius)
        };
        let start = (start as i32).rem_euclid(360);
        let end = (end as i32).rem_euclid(360);
        let (cx, cy) = (x as i32, y as i32);

        let mut deg = start;
        loop {
            let px = cx + rx * cos256(deg) / 256;
            let py = cy - ry * sin256(deg) / 256;
            self.plot(px, py, color);
            if deg == end {
                break;
            }
            deg = (deg + 1) % 360;
        }
        self.cursor = Point::new(x, y);
    }

    /// Outline ellipse with independent radii.
    pub fn ellipse(&mut self, x: i16, y: i16, rx: i16, ry: i16, color: u8) {
        if rx < 0 || ry < 0 {
            return;
        }
        let (cx, cy) = (x as i32, y as i32);
        for (dx, dy) in EllipseQuadrant::new(rx as i32, ry as i32) {
            self.plot(cx + dx, cy + dy, color);
            self.plot(cx - dx, cy + dy, color);
            self.plot(cx + dx, cy - dy, color);
            self.plot(cx - dx, cy - dy, color);
        }
        self.cursor = Point::new(x, y);
    }

    pub fn circle_fill(&mut self, x: i16, y: i16, radius: i16, color: u8) {
        if radius < 0 {
            return;
        }
        let (cx, cy) = (x as i32, y as i32);
        for (dx, dy) in CircleOctant::new(radius as i32) {
            self.hline(cx - dx, cx + dx, cy + dy, color);
            self.hline(cx - dx, cx + dx, cy - dy, color);
            self.hline(cx - dy, cx + dy, cy + dx, color);
            self.hline(cx - dy, cx + dy, cy - dx, color);
        }
        self.cursor = Point::new(x, y);
    }

    /// Filled ellipse: one chord per row, as wide as the outline on that row.
    pub fn ellipse_fill(&mut self, x: i16, y: i16, rx: i16, ry: i16, color: u8) {
        if rx < 0 || ry < 0 {
            return;
        }
        let (cx, cy) = (x as i32, y as i32);
        let mut row: Option<(i32, i32)> = None;
        let chord = |gfx: &mut Self, (dx, dy): (i32, i32)| {
            gfx.hline(cx - dx, cx + dx, cy + dy, color);
            if dy != 0 {
                gfx.hline(cx - dx, cx + dx, cy - dy, color);
            }
        };
        for (dx, dy) in EllipseQuadrant::new(rx as i32, ry as i32) {
            // the widest point of a row is the last one emitted for it
            if let Some(prev) = row.filter(|prev| prev.1 != dy) {
                chord(self, prev);
            }
            row = Some((dx, dy));
        }
        if let Some(last) = row {
            chord(self, last);
        }
        self.cursor = Point::new(x, y);
    }
}
