//! # msxgfx
//!
//! MSX BASIC style raster graphics for the TMS9918 / V9938 / V9958 family:
//! `PSET`, `LINE`, `CIRCLE`, `PAINT`, `DRAW`, `GET`/`PUT`, `COPY`, pages,
//! palette and sprites.
//!
//! Two storage models sit behind one coordinate API:
//!
//! - SCREEN 2 and 4 keep one pattern bit per pixel plus a fg/bg color byte
//!   per 8-pixel row, edited from the CPU;
//! - SCREEN 5 to 12 are bitmaps drawn with the VDP command engine.
//!
//! ```
//! use msxgfx::{Graphics, SimVdp};
//!
//! let mut gfx = Graphics::new(SimVdp::new(), 5)?;
//! gfx.circle(128, 100, 40, 15);
//! gfx.paint(128, 100, 4, 15);
//! gfx.draw("BM10,10 C8 R20 D20 L20 U20");
//! assert_eq!(gfx.point(128, 100), 4);
//! # Ok::<(), msxgfx::GfxError>(())
//! ```

#![no_std]
extern crate alloc;

pub mod backend;
pub mod block;
pub mod config;
pub mod draw;
pub mod error;
pub mod graphics;
pub mod mode;
pub mod paint;
pub mod palette;
pub mod shapes;
pub mod sprite;
pub mod vdp;

pub use block::{capture_len, ImageBlock, RasterOp};
pub use config::{GfxConfig, WaitPolicy};
pub use draw::{DrawCommands, DrawOp, PenState};
pub use error::GfxError;
pub use graphics::{Graphics, Point};
pub use mode::{BackendKind, ScreenMode};
pub use paint::PAINT_STACK_CAPACITY;
pub use shapes::LineStyle;
pub use sprite::SpriteSize;
pub use vdp::sim::{Frame, SimVdp};
pub use vdp::Vdp;
