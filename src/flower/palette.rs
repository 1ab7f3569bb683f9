use glam::Vec3;

pub const WHITE: Vec3 = Vec3::ONE;

pub const fn rgb(r: f32, g: f32, b: f32) -> Vec3 {
    Vec3::new(r, g, b)
}

pub fn hex(code: u32) -> Vec3 {
    let r = ((code >> 16) & 0xff) as f32 / 255.0;
    let g = ((code >> 8) & 0xff) as f32 / 255.0;
    let b = (code & 0xff) as f32 / 255.0;
    Vec3::new(r, g, b)
}

/// Per-vertex inputs a palette may look at.
#[derive(Debug, Clone, Copy)]
pub struct ColorSample {
    pub index: usize,
    pub rho: f32,
    pub theta_deg: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorPolicy {
    /// Weighted by `max(0, y)`, `max(0, -y)` and `|x|`.
    AnchorMix { top: Vec3, bottom: Vec3, side: Vec3 },
    /// Linear blend from `inner` at ρ = 0 to `outer` at ρ = 1.
    RadialLerp { inner: Vec3, outer: Vec3 },
    /// Spiral hue walk with a green core, light tips and seeded grain.
    Spiral {
        core: Vec3,
        hot: Vec3,
        warm: Vec3,
        cool: Vec3,
        grain: f32,
        seed: u64,
    },
}

impl ColorPolicy {
    pub fn eval(&self, s: &ColorSample) -> Vec3 {
        match *self {
            Self::AnchorMix { top, bottom, side } => {
                let up = s.position.y.max(0.0);
                let down = (-s.position.y).max(0.0);
                let lateral = s.position.x.abs();
                let mut total = up + down + lateral;
                if total <= 0.0 {
                    total = 1.0;
                }
                (top * up + bottom * down + side * lateral) / total
            }
            Self::RadialLerp { inner, outer } => inner.lerp(outer, s.rho.clamp(0.0, 1.0)),
            Self::Spiral {
                core,
                hot,
                warm,
                cool,
                grain,
                seed,
            } => {
                let base = spiral_hue(core, hot, warm, cool, s.rho, s.theta_deg);
                let mut rng = fastrand::Rng::with_seed(seed ^ (s.index as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15));
                let noise = (rng.f32() - 0.5) * grain;
                (base + Vec3::splat(noise)).clamp(Vec3::ZERO, Vec3::ONE)
            }
        }
    }
}

fn spiral_hue(core: Vec3, hot: Vec3, warm: Vec3, cool: Vec3, rho: f32, theta_deg: f32) -> Vec3 {
    if rho < 0.12 {
        return core.lerp(hot, rho * 5.0);
    }

    let picker = (theta_deg.to_radians() * 0.1 + rho * 2.0).sin();
    let hue = if picker > 0.3 {
        hot
    } else if picker > -0.3 {
        hot.lerp(warm, (picker + 0.3) / 0.6)
    } else {
        warm.lerp(cool, picker.abs())
    };
    hue.lerp(WHITE, rho.powf(1.5) * 0.7)
}

/// Whether a policy is evaluated once at generation or on every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorTiming {
    Baked(ColorPolicy),
    /// Evaluated on the displaced position; no per-vertex seed is stored.
    Live(ColorPolicy),
}
