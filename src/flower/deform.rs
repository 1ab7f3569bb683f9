use super::palette::{ColorPolicy, ColorSample, WHITE};
use super::shape::{BaseMesh, BaseVertex};
use glam::{Vec3, Vec4};

/// Displaced, shaded vertex ready for rasterization. `color.w` is alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedVertex {
    pub position: Vec3,
    pub color: Vec4,
}

/// Delays the inner rows: `local = max(0, morph - (1 - ρ)·rate)^onset_power`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub rate: f32,
    pub onset_power: f32,
}

impl Attenuation {
    pub fn local(&self, morph: f32, rho: f32) -> f32 {
        (morph - (1.0 - rho) * self.rate).max(0.0).powf(self.onset_power)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeltParams {
    pub wave_frequency: f32,
    pub wave_speed: f32,
    pub sway: f32,
    pub ripple: f32,
    pub droop: f32,
}

/// Shared low-frequency noise field layered over the dispersal seeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turbulence {
    pub frequency: f32,
    pub amplitude: f32,
    pub speed: f32,
}

impl Turbulence {
    pub fn sample(&self, p: Vec3, time: f32) -> Vec3 {
        let f = self.frequency;
        let t = time * self.speed;
        let nx = (p.x * f + t).sin() * (p.z * f + t).cos() + (p.x * f * 3.0 + t).sin() * 0.3;
        let nz = (p.x * f - t).cos() * (p.z * f + t).sin() + (p.z * f * 3.0 + t).cos() * 0.3;
        Vec3::new(nx, nx * nz, nz) * self.amplitude
    }
}

/// Per-grain speed multiplier in `[min, max]`, derived from the vertex index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrainSpeed {
    pub min: f32,
    pub max: f32,
}

impl GrainSpeed {
    pub fn at(&self, index: usize) -> f32 {
        let u = 0.5 + 0.5 * (index as f64 * 91.3458).sin();
        self.min + (self.max - self.min) * u as f32
    }
}

/// Sideways air current: `sin(time·speed + index)·amplitude·grain` on x and z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swirl {
    pub amplitude: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersalParams {
    pub exponent: f32,
    pub spread: f32,
    pub turbulence: Option<Turbulence>,
    pub grain_speed: Option<GrainSpeed>,
    /// Start delay at the top of the flower; the bottom crumbles first.
    pub height_delay: f32,
    /// World height mapped onto the `[0, 1]` delay ramp, centered on y = 0.
    pub delay_span: f32,
    /// Downward drop of `gravity·grain²`.
    pub gravity: f32,
    pub swirl: Option<Swirl>,
}

impl DispersalParams {
    /// Seed drift only: every grain at the same speed, no fall, no swirl.
    pub const fn drift(exponent: f32, spread: f32) -> Self {
        Self {
            exponent,
            spread,
            turbulence: None,
            grain_speed: None,
            height_delay: 0.0,
            delay_span: 1.0,
            gravity: 0.0,
            swirl: None,
        }
    }

    /// How far this grain is through its own dispersal.
    pub fn grain(&self, index: usize, y: f32, local: f32) -> f32 {
        let speed = self.grain_speed.map_or(1.0, |g| g.at(index));
        let delay = if self.delay_span > 0.0 {
            self.height_delay * (y / self.delay_span + 0.5).clamp(0.0, 1.0)
        } else {
            0.0
        };
        ((local - delay) * speed).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deformation {
    /// No displacement; the shape itself carries the animation.
    Rest,
    Melt(MeltParams),
    Dispersal(DispersalParams),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shading {
    pub falloff_radius: f32,
    pub glow_exponent: f32,
    pub glow_fades_with_morph: bool,
    pub base_alpha: f32,
    pub alpha_fade: f32,
}

impl Shading {
    pub fn white_factor(&self, displaced: Vec3, local: f32) -> f32 {
        let dist = displaced.length() / self.falloff_radius;
        let mut white = (1.0 - dist).max(0.0).powf(self.glow_exponent);
        if self.glow_fades_with_morph {
            white *= 1.0 - local.min(1.0);
        }
        white
    }

    pub fn alpha(&self, local: f32) -> f32 {
        self.base_alpha * (1.0 - local * self.alpha_fade).clamp(0.0, 1.0)
    }

    pub fn shade(&self, displaced: Vec3, base: Vec3, local: f32) -> Vec4 {
        let white = self.white_factor(displaced, local);
        let rgb = base * (1.0 - white) + WHITE * white;
        rgb.extend(self.alpha(local))
    }
}

/// Per-vertex closed-form deformation plus glow shading; O(1) per vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeformationEngine {
    pub attenuation: Attenuation,
    pub deformation: Deformation,
    pub shading: Shading,
}

impl DeformationEngine {
    /// `index` is the vertex's position in the mesh; dispersal derives
    /// per-grain variation from it.
    pub fn displace(&self, v: &BaseVertex, index: usize, seed: Vec3, local: f32, time: f32) -> Vec3 {
        let p = v.position;
        match self.deformation {
            Deformation::Rest => p,
            Deformation::Melt(m) => {
                let wave = time * m.wave_speed;
                let along_y = (p.y * m.wave_frequency + wave).sin();
                let along_x = (p.x * m.wave_frequency + wave).sin();
                let lift = (p.x * m.wave_frequency + wave).cos();
                Vec3::new(
                    p.x + along_y * m.sway * local,
                    p.y - v.rho * m.droop * local + lift * m.ripple * local,
                    p.z + along_x * m.sway * local,
                )
            }
            Deformation::Dispersal(d) => {
                let grain = d.grain(index, p.y, local);
                let strength = grain.powf(d.exponent);
                let mut drift = seed;
                if let Some(turb) = d.turbulence {
                    drift += turb.sample(p, time);
                }
                let mut out = p + drift * (strength * d.spread);
                out.y -= d.gravity * grain * grain;
                if let Some(swirl) = d.swirl {
                    let phase = (index % 4096) as f32;
                    let w = (time * swirl.speed + phase).sin() * swirl.amplitude * grain;
                    out.x += w;
                    out.z += w;
                }
                out
            }
        }
    }

    /// Fills `out` with one shaded vertex per base vertex, in mesh order.
    ///
    /// Vertices without a baked color use `live` evaluated on the displaced
    /// position, or white when neither is available.
    pub fn apply(
        &self,
        mesh: &BaseMesh,
        live: Option<&ColorPolicy>,
        morph: f32,
        time: f32,
        out: &mut Vec<ShadedVertex>,
    ) {
        out.clear();
        out.reserve(mesh.len());
        let morph = morph.clamp(0.0, 1.0);

        for (i, v) in mesh.vertices.iter().enumerate() {
            let local = self.attenuation.local(morph, v.rho);
            let seed = mesh.seeds.as_ref().map_or(Vec3::ZERO, |s| s[i]);
            let position = self.displace(v, i, seed, local, time);

            let base = match (&mesh.colors, live) {
                (Some(colors), _) => colors[i],
                (None, Some(policy)) => policy.eval(&ColorSample {
                    index: i,
                    rho: v.rho,
                    theta_deg: position.x.atan2(position.z).to_degrees(),
                    position,
                }),
                (None, None) => WHITE,
            };

            out.push(ShadedVertex {
                position,
                color: self.shading.shade(position, base, local),
            });
        }
    }
}
