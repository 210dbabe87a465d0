// Keypad:
//   1 2 3 C        1 2 3 4
//   4 5 6 D   <-   Q W E R
//   7 8 9 E   <-   A S D F
//   A 0 B F        Z X C V
//
// The window presents ~60 frames per second; each frame runs ips / 60
// machine steps, and each step also ticks both timers once.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use minifb::Scale;

use emuchip8::{BoundsPolicy, Config, Emulator, SpriteEdge};
use sound::Sound;
use window::Screen;

mod keyboard;
mod sound;
mod window;

const FRAMES_PER_SECOND: u32 = 60;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Edge {
    Clip,
    Wrap,
    Spill,
}

impl From<Edge> for SpriteEdge {
    fn from(edge: Edge) -> Self {
        match edge {
            Edge::Clip => SpriteEdge::Clip,
            Edge::Wrap => SpriteEdge::Wrap,
            Edge::Spill => SpriteEdge::Spill,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter", long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Instructions per second
    #[arg(long, default_value_t = 700)]
    ips: u32,

    /// Window scale, one of 1, 2, 4, 8, 16, 32
    #[arg(long, default_value_t = 16, value_parser = parse_scale)]
    scale: u32,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Stop on stack or memory faults instead of wrapping
    #[arg(long)]
    strict: bool,

    /// What happens to sprite pixels past the screen edge
    #[arg(long, value_enum, default_value_t = Edge::Clip)]
    sprite_edge: Edge,

    /// Never open an audio device
    #[arg(long)]
    mute: bool,
}

fn parse_scale(arg: &str) -> Result<u32, String> {
    match arg.parse::<u32>() {
        Ok(scale @ (1 | 2 | 4 | 8 | 16 | 32)) => Ok(scale),
        _ => Err(format!("{arg} is not one of 1, 2, 4, 8, 16, 32")),
    }
}

fn window_scale(scale: u32) -> Scale {
    match scale {
        1 => Scale::X1,
        2 => Scale::X2,
        4 => Scale::X4,
        8 => Scale::X8,
        32 => Scale::X32,
        _ => Scale::X16,
    }
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default().with_sprite_edge(self.sprite_edge.into());
        if self.strict {
            config = config.with_bounds(BoundsPolicy::Strict);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = std::fs::read(&args.rom)
        .with_context(|| format!("could not read ROM {}", args.rom.display()))?;
    let mut emu = Emulator::with_config(args.config());
    emu.load(&rom)?;
    info!(
        "loaded {} ({} bytes), {:?}",
        args.rom.display(),
        rom.len(),
        emu.config()
    );

    let mut screen = Screen::new(window_scale(args.scale)).context("could not open window")?;
    let mut sound = if args.mute {
        None
    } else {
        match Sound::new() {
            Ok(sound) => Some(sound),
            Err(err) => {
                warn!("audio disabled: {:#}", err);
                None
            }
        }
    };

    let steps_per_frame = (args.ips / FRAMES_PER_SECOND).max(1);
    while screen.is_open() {
        *emu.keys_mut() = keyboard::pad_state(&screen.held_keys());
        for _ in 0..steps_per_frame {
            if let Err(err) = emu.step() {
                error!("halted at {:#06X}: {}", emu.pc(), err);
                return Err(err.into());
            }
        }
        if let Some(sound) = sound.as_mut() {
            sound.set_playing(emu.is_beeping());
        }
        screen.sync(emu.pixels())?;
    }
    Ok(())
}
