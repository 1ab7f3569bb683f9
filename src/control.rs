use serde::Deserialize;

/// Dead-zone + linear ramp from a raw distance to a `[0, 1]` target.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdMap {
    pub low: f32,
    pub high: f32,
}

impl ThresholdMap {
    pub fn target(&self, distance: f32) -> f32 {
        // Also catches NaN.
        if !(distance > self.low) {
            return 0.0;
        }
        let span = self.high - self.low;
        if span <= 0.0 {
            return 1.0;
        }
        ((distance - self.low) / span).clamp(0.0, 1.0)
    }
}

/// How the spin channel turns into rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SpinMode {
    /// Openness maps through `ControlTuning::rotation` to a steady speed.
    #[default]
    Velocity,
    /// Closing a pinch kicks the spin; the speed then coasts down.
    Pulse(PulseTuning),
}

/// Decays are exponential rates per second, so the coast is frame-rate independent.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PulseTuning {
    /// A closing hand only kicks below this distance.
    pub close_below: f32,
    /// Degrees per second added per unit of distance closed in one frame.
    pub gain_deg_per_s: f32,
    /// Always-on coast decay.
    pub decay_rate: f32,
    /// Extra decay while the hand opens.
    pub release_rate: f32,
    /// Extra decay while the smoothed morph exceeds `friction_above`.
    pub morph_friction_rate: f32,
    pub friction_above: f32,
}

impl Default for PulseTuning {
    fn default() -> Self {
        Self {
            close_below: 0.08,
            gain_deg_per_s: 3000.0,
            // x0.97, x0.9 and x0.9 per frame at 60 Hz.
            decay_rate: 1.83,
            release_rate: 6.32,
            morph_friction_rate: 6.32,
            friction_above: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlTuning {
    pub morph: ThresholdMap,
    pub rotation: ThresholdMap,
    /// First-order smoothing rate for the morph channel, per second.
    pub smoothing_rate: f32,
    /// Spin speed at full rotation target, degrees per second.
    pub max_spin_deg_per_s: f32,
    /// Drive morph from the right channel and rotation from the left.
    pub swap_channels: bool,
    pub spin: SpinMode,
}

impl Default for ControlTuning {
    fn default() -> Self {
        Self {
            morph: ThresholdMap { low: 0.06, high: 0.28 },
            rotation: ThresholdMap { low: 0.05, high: 0.30 },
            smoothing_rate: 4.0,
            max_spin_deg_per_s: 180.0,
            swap_channels: false,
            spin: SpinMode::Velocity,
        }
    }
}

/// One frame of external input; `None` means no hand was detected.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawControlReading {
    pub left: Option<f32>,
    pub right: Option<f32>,
}

impl RawControlReading {
    pub const NONE: Self = Self {
        left: None,
        right: None,
    };

    pub fn both(left: f32, right: f32) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub smoothed_morph: f32,
    /// Unbounded accumulator; f64 keeps long sessions precise.
    pub rotation_deg: f64,
    /// Current spin speed in degrees per second.
    pub spin_deg_per_s: f64,
}

impl ControlState {
    /// Rotation reduced to `[0, 360)` for the camera transform.
    pub fn render_rotation_deg(&self) -> f32 {
        self.rotation_deg.rem_euclid(360.0) as f32
    }
}

pub struct ControlMapper {
    tuning: ControlTuning,
    state: ControlState,
    last_targets: (f32, f32),
    /// Spin-channel reading from the previous update, for pulse detection.
    prev_spin: Option<f32>,
}

impl ControlMapper {
    pub fn new(tuning: ControlTuning, initial_rotation_deg: f64) -> Self {
        Self {
            tuning,
            state: ControlState {
                smoothed_morph: 0.0,
                rotation_deg: initial_rotation_deg,
                spin_deg_per_s: 0.0,
            },
            last_targets: (0.0, 0.0),
            prev_spin: None,
        }
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Morph and spin targets computed by the last `update`.
    pub fn last_targets(&self) -> (f32, f32) {
        self.last_targets
    }

    pub fn update(&mut self, raw: RawControlReading, dt: f32) -> ControlState {
        let dt = if dt > 0.0 { dt } else { 0.0 };
        let (morph_raw, spin_raw) = if self.tuning.swap_channels {
            (raw.right, raw.left)
        } else {
            (raw.left, raw.right)
        };

        let morph_target = self.tuning.morph.target(morph_raw.unwrap_or(0.0));
        let k = (self.tuning.smoothing_rate * dt).clamp(0.0, 1.0);
        let morph = self.state.smoothed_morph + (morph_target - self.state.smoothed_morph) * k;
        self.state.smoothed_morph = morph.clamp(0.0, 1.0);

        let spin_target = self.tuning.rotation.target(spin_raw.unwrap_or(0.0));
        let dt = f64::from(dt);
        match self.tuning.spin {
            SpinMode::Velocity => {
                self.state.spin_deg_per_s = f64::from(spin_target * self.tuning.max_spin_deg_per_s);
                self.state.rotation_deg += self.state.spin_deg_per_s * dt;
            }
            SpinMode::Pulse(pulse) => self.pulse(pulse, spin_raw, dt),
        }
        self.prev_spin = spin_raw;

        self.last_targets = (morph_target, spin_target);
        self.state
    }

    fn pulse(&mut self, p: PulseTuning, spin_raw: Option<f32>, dt: f64) {
        let decay = |rate: f32| (-f64::from(rate) * dt).exp();
        let mut speed = self.state.spin_deg_per_s;
        if let (Some(prev), Some(dist)) = (self.prev_spin, spin_raw) {
            if dist < prev && dist < p.close_below {
                speed += f64::from((prev - dist) * p.gain_deg_per_s);
            } else if dist > prev {
                speed *= decay(p.release_rate);
            }
        }

        self.state.rotation_deg += speed * dt;
        speed *= decay(p.decay_rate);
        if self.state.smoothed_morph > p.friction_above {
            speed *= decay(p.morph_friction_rate);
        }
        self.state.spin_deg_per_s = speed;
    }
}
