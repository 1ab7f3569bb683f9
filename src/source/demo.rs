use super::ControlSource;
use crate::control::RawControlReading;

/// Closed-form sweep of both channels with periodic "hand lost" gaps.
/// Pure function of elapsed time, so runs are reproducible.
pub struct DemoSource {
    gaps: bool,
}

impl DemoSource {
    pub fn new() -> Self {
        Self { gaps: true }
    }

    pub fn without_gaps() -> Self {
        Self { gaps: false }
    }

    pub fn sample(&self, t: f64) -> RawControlReading {
        let left = 0.17 + 0.15 * (t * 0.35).sin();
        let right = 0.15 + 0.12 * (t * 0.23 + 1.3).sin();
        let left_lost = self.gaps && t.rem_euclid(23.0) > 20.5;
        let right_lost = self.gaps && t.rem_euclid(31.0) > 29.0;
        RawControlReading {
            left: (!left_lost).then_some(left.max(0.0) as f32),
            right: (!right_lost).then_some(right.max(0.0) as f32),
        }
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSource for DemoSource {
    fn label(&self) -> &'static str {
        "demo"
    }

    fn read(&mut self, elapsed: f64) -> RawControlReading {
        self.sample(elapsed)
    }
}
