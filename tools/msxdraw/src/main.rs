mod scenes;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image::RgbaImage;
use msxgfx::{GfxConfig, Graphics, SimVdp, WaitPolicy};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::scenes::Scene;

#[derive(Parser)]
#[command(name = "msxdraw")]
#[command(version, about = "Render MSX graphics on a simulated VDP", long_about = None)]
struct Cli {
    /// Screen mode: 2, 4, 5-8 or 10-12
    #[arg(short, long, default_value_t = 5)]
    screen: u8,

    /// Foreground color
    #[arg(long, default_value_t = 15)]
    fg: u8,

    /// Background color
    #[arg(long, default_value_t = 4)]
    bg: u8,

    /// Output PNG file
    #[arg(short, long, default_value = "msxdraw.png")]
    output: PathBuf,

    /// Abandon a VDP command after this many busy status polls
    #[arg(long)]
    wait_polls: Option<u32>,

    /// Status polls each simulated command stays busy for
    #[arg(long, default_value_t = 0)]
    busy: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a built-in scene
    Demo {
        #[arg(value_enum, default_value_t = Scene::Shapes)]
        scene: Scene,
    },

    /// Run a DRAW string
    Draw {
        /// Commands, e.g. "BM40,40 R20 D20 L20 U20"
        commands: String,

        /// Starting pen position
        #[arg(long, value_parser = parse_point, default_value = "0,0")]
        start: (i16, i16),

        /// Flood fill from this point afterwards
        #[arg(long, value_parser = parse_point)]
        paint: Option<(i16, i16)>,

        /// Fill color for --paint (defaults to the foreground)
        #[arg(long)]
        fill: Option<u8>,
    },
}

fn parse_point(s: &str) -> Result<(i16, i16), String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected x,y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("x: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("y: {e}"))?;
    Ok((x, y))
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .compact()
        .init();
}

fn render(cli: &Cli) -> Result<Graphics<SimVdp>> {
    let wait = match cli.wait_polls {
        Some(polls) => WaitPolicy::Bounded { polls },
        None => WaitPolicy::Unbounded,
    };
    let vdp = SimVdp::new().with_busy_polls(cli.busy);
    let mut gfx = Graphics::with_config(vdp, cli.screen, GfxConfig::default().with_wait(wait))
        .with_context(|| format!("cannot open screen {}", cli.screen))?;
    gfx.set_colors(cli.fg, cli.bg);
    gfx.clear();

    match &cli.command {
        Commands::Demo { scene } => {
            info!("rendering {:?} in screen {}", scene, cli.screen);
            scene.render(&mut gfx);
        }
        Commands::Draw { commands, start, paint, fill } => {
            gfx.move_to(start.0, start.1);
            gfx.draw(commands);
            debug!("pen ended at {:?}", gfx.cursor());
            if let Some((x, y)) = *paint {
                let (fg, _) = gfx.colors();
                gfx.paint(x, y, fill.unwrap_or(fg), fg);
            }
        }
    }
    Ok(gfx)
}

fn save_png(gfx: &Graphics<SimVdp>, path: &Path) -> Result<()> {
    let frame = gfx.vdp().render_rgba().context("VDP is not in a graphics mode")?;
    let (width, height) = (frame.width, frame.height);
    let image = RgbaImage::from_raw(width, height, frame.pixels).context("frame size does not match its pixels")?;
    image.save(path).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}x{} image to {}", width, height, path.display());
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let gfx = render(&cli)?;
    let stray = gfx.vdp().unguarded_command_writes();
    if stray > 0 {
        warn!("{} command register writes happened with interrupts enabled", stray);
    }
    save_png(&gfx, &cli.output)
}
