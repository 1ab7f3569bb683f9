use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rose-bloom",
    version,
    about = "Procedural rose point cloud that melts, disperses and blooms under two control channels"
)]
pub struct Config {
    #[arg(long, value_enum, default_value_t = PresetKind::Melt)]
    pub preset: PresetKind,

    #[arg(long, value_enum, default_value_t = SourceKind::Keyboard)]
    pub source: SourceKind,

    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    /// Replace the preset's color policy.
    #[arg(long, value_enum)]
    pub palette: Option<PaletteChoice>,

    /// Frame-rate target (default 60).
    #[arg(long)]
    pub fps: Option<u32>,

    #[arg(long)]
    pub point_size: Option<u32>,

    /// Show the control source's preview image in the corner.
    #[arg(long, action = clap::ArgAction::Set)]
    pub overlay: Option<bool>,

    /// Left hand spins, right hand morphs.
    #[arg(long, default_value_t = false)]
    pub swap_hands: bool,

    /// Spin in bursts when the spin hand closes, instead of a steady speed.
    #[arg(long, default_value_t = false)]
    pub pulse_spin: bool,

    /// Input device name filter for `--source audio`.
    #[arg(long)]
    pub device: Option<String>,

    #[arg(long, default_value_t = false)]
    pub list_devices: bool,

    /// Control script for `--source replay`.
    #[arg(long)]
    pub replay: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub replay_loop: bool,

    /// TOML file with control thresholds and render options.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_probe: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    /// Raise log verbosity (logs go to stderr).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetKind {
    Melt,
    #[value(alias = "sand")]
    Dispersal,
    #[value(alias = "dahlia", alias = "surface")]
    Bloom,
}

impl PresetKind {
    pub const fn all() -> [Self; 3] {
        [Self::Melt, Self::Dispersal, Self::Bloom]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    #[value(alias = "keys")]
    Keyboard,
    #[value(alias = "mic")]
    Audio,
    Demo,
    Replay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaletteChoice {
    #[value(name = "anchor-mix", alias = "mix")]
    AnchorMix,
    #[value(alias = "lerp")]
    Radial,
    Spiral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
    Kitty,
}

impl RendererMode {
    /// Pixels per terminal cell (width, height).
    pub fn cell_pixels(self) -> (usize, usize) {
        match self {
            Self::HalfBlock => (1, 2),
            Self::Braille | Self::Kitty => (2, 4),
        }
    }
}
