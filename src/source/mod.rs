mod audio;
mod demo;
mod keyboard;
mod replay;

pub use audio::{list_input_devices, AudioSource, AtomicSpectrum, Spectrum};
pub use demo::DemoSource;
pub use keyboard::KeyboardSource;
pub use replay::{ReplayError, ReplayScript, ReplaySource};

use crate::control::RawControlReading;
use crate::raster::PreviewImage;
use crossterm::event::KeyCode;

/// Producer of the two per-frame openness readings.
pub trait ControlSource {
    fn label(&self) -> &'static str;

    /// Latest reading; `elapsed` is seconds since the session started.
    fn read(&mut self, elapsed: f64) -> RawControlReading;

    /// Diagnostic image for the corner overlay.
    fn preview(&self) -> Option<&PreviewImage> {
        None
    }

    /// Returns true when the key was consumed.
    fn handle_key(&mut self, _code: KeyCode) -> bool {
        false
    }
}

/// Vertical bar gauge used by several previews. `level` in `[0, 1]`.
pub(crate) fn draw_gauge(img: &mut PreviewImage, x0: usize, width: usize, level: Option<f32>, color: [u8; 3]) {
    let h = img.height;
    let Some(level) = level else {
        // Hatched column for "no signal".
        for y in (0..h).step_by(3) {
            for x in x0..(x0 + width).min(img.width) {
                img.put(x, y, [60, 60, 60]);
            }
        }
        return;
    };
    let filled = ((level.clamp(0.0, 1.0) * h as f32).round() as usize).min(h);
    for y in h - filled..h {
        for x in x0..(x0 + width).min(img.width) {
            img.put(x, y, color);
        }
    }
}
