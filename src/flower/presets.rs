use super::deform::{
    Attenuation, Deformation, DeformationEngine, DispersalParams, GrainSpeed, MeltParams, Shading, Swirl,
    Turbulence,
};
use super::palette::{hex, rgb, ColorPolicy, ColorTiming};
use super::shape::{generate, Droop, Grid, MeshSpec, PetalCut, Ripple, SeedPattern, ShapeConstants};
use super::{CrossFade, DisplacedMesh, GeometrySource, OpeningRamp, RegeneratedMesh};
use crate::config::{PaletteChoice, PresetKind};
use crate::raster::{CameraRig, SpinAxis};
use glam::Vec3;

/// World-space size shared by every preset.
const WORLD_SCALE: f64 = 300.0 * 0.0074;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    /// Generate once, displace per frame.
    Displace,
    /// Regenerate per frame with the opening constant following morph.
    Regenerate(OpeningRamp),
}

/// Complete, independent configuration for one flower variant.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowerPreset {
    pub kind: PresetKind,
    pub name: &'static str,
    pub grid: Grid,
    pub shape: ShapeConstants,
    pub colors: ColorTiming,
    pub seeds: Option<SeedPattern>,
    pub engine: DeformationEngine,
    pub strategy: Strategy,
    pub strips: bool,
    /// Adds a point layer over the strips when set.
    pub cross_fade: Option<CrossFade>,
    pub camera: CameraRig,
    pub initial_rotation_deg: f64,
    pub point_size: u32,
}

impl FlowerPreset {
    pub fn new(kind: PresetKind) -> Self {
        match kind {
            PresetKind::Melt => melt(),
            PresetKind::Dispersal => dispersal(),
            PresetKind::Bloom => bloom(),
        }
    }

    pub fn all() -> Vec<Self> {
        PresetKind::all().into_iter().map(Self::new).collect()
    }

    /// Generator input with the baked palette (if any) attached.
    pub fn mesh_spec(&self) -> MeshSpec {
        MeshSpec {
            grid: self.grid,
            shape: self.shape,
            baked_colors: match self.colors {
                ColorTiming::Baked(policy) => Some(policy),
                ColorTiming::Live(_) => None,
            },
            seeds: self.seeds,
        }
    }

    /// Swaps the palette policy, keeping whether it is baked or live.
    pub fn with_palette(mut self, choice: PaletteChoice) -> Self {
        let policy = default_policy(choice);
        self.colors = match self.colors {
            ColorTiming::Baked(_) => ColorTiming::Baked(policy),
            ColorTiming::Live(_) => ColorTiming::Live(policy),
        };
        self
    }

    pub fn build(&self) -> Box<dyn GeometrySource> {
        let live = match self.colors {
            ColorTiming::Live(policy) => Some(policy),
            ColorTiming::Baked(_) => None,
        };
        match self.strategy {
            Strategy::Displace => Box::new(DisplacedMesh::new(
                generate(&self.mesh_spec()),
                self.engine,
                live,
                self.strips,
            )),
            Strategy::Regenerate(ramp) => {
                let mesh = RegeneratedMesh::new(self.mesh_spec(), ramp, self.engine, live, self.strips);
                match self.cross_fade {
                    Some(fade) => Box::new(mesh.with_cross_fade(fade)),
                    None => Box::new(mesh),
                }
            }
        }
    }
}

pub fn default_policy(choice: PaletteChoice) -> ColorPolicy {
    match choice {
        PaletteChoice::AnchorMix => ColorPolicy::AnchorMix {
            top: rgb(1.0, 0.2, 0.4),
            bottom: rgb(0.5, 0.0, 1.0),
            side: rgb(0.0, 0.6, 1.0),
        },
        PaletteChoice::Radial => ColorPolicy::RadialLerp {
            inner: rgb(1.0, 0.78, 0.32),
            outer: rgb(0.92, 0.12, 0.48),
        },
        PaletteChoice::Spiral => ColorPolicy::Spiral {
            core: hex(0x0a3d1a),
            hot: hex(0xff4d6d),
            warm: hex(0xffb703),
            cool: hex(0x8ecae6),
            grain: 0.15,
            seed: 0x5eed,
        },
    }
}

fn melt() -> FlowerPreset {
    FlowerPreset {
        kind: PresetKind::Melt,
        name: "Melting Rose",
        grid: Grid {
            radial_steps: 40,
            angular_steps: 1200,
            angular_span_deg: 3600.0,
            closed_end: false,
        },
        shape: ShapeConstants {
            opening_deg: 90.0,
            petal_decay_deg: 16.0 * 180.0,
            petal_cut: PetalCut::Folded {
                base: 0.75,
                alignment: 2.75,
            },
            droop: Droop {
                gain: 1.3,
                knee: 1.25,
                rho_power: 2,
                knee_power: 2,
            },
            taper_span_deg: 6500.0,
            ripple: Ripple::NONE,
            vertical_scale: 1.0,
            world_scale: WORLD_SCALE,
        },
        colors: ColorTiming::Baked(default_policy(PaletteChoice::AnchorMix)),
        seeds: None,
        engine: DeformationEngine {
            attenuation: Attenuation {
                rate: 0.7,
                onset_power: 1.0,
            },
            deformation: Deformation::Melt(MeltParams {
                wave_frequency: 1.2,
                wave_speed: 0.8,
                sway: 2.5,
                ripple: 1.0,
                droop: 6.0,
            }),
            shading: Shading {
                falloff_radius: 4.0,
                glow_exponent: 1.5,
                glow_fades_with_morph: false,
                base_alpha: 0.65,
                alpha_fade: 0.3,
            },
        },
        strategy: Strategy::Displace,
        strips: false,
        cross_fade: None,
        camera: CameraRig {
            translation: Vec3::new(0.0, -1.0, -15.0),
            spin_axis: SpinAxis::Depth,
            ..CameraRig::default()
        },
        initial_rotation_deg: 65.0,
        point_size: 2,
    }
}

fn dispersal() -> FlowerPreset {
    FlowerPreset {
        kind: PresetKind::Dispersal,
        name: "Sand Rose",
        grid: Grid {
            radial_steps: 30,
            angular_steps: 1500,
            angular_span_deg: 5400.0,
            closed_end: false,
        },
        shape: ShapeConstants {
            opening_deg: 90.0,
            petal_decay_deg: 8.0 * 180.0,
            petal_cut: PetalCut::Scallop { alignment: 3.6 },
            droop: Droop {
                gain: 2.0,
                knee: 1.3,
                rho_power: 2,
                knee_power: 2,
            },
            taper_span_deg: 9000.0,
            ripple: Ripple::NONE,
            vertical_scale: 1.0,
            world_scale: WORLD_SCALE,
        },
        colors: ColorTiming::Live(ColorPolicy::AnchorMix {
            top: rgb(1.0, 0.72, 0.3),
            bottom: rgb(0.78, 0.3, 0.1),
            side: rgb(0.2, 0.7, 0.75),
        }),
        seeds: Some(SeedPattern::CLASSIC),
        engine: DeformationEngine {
            attenuation: Attenuation {
                rate: 0.5,
                onset_power: 1.0,
            },
            deformation: Deformation::Dispersal(DispersalParams {
                exponent: 2.5,
                spread: 6.0,
                turbulence: Some(Turbulence {
                    frequency: 0.6,
                    amplitude: 0.8,
                    speed: 0.5,
                }),
                grain_speed: Some(GrainSpeed { min: 0.5, max: 2.0 }),
                height_delay: 0.2,
                delay_span: 2.96,
                gravity: 4.0,
                swirl: Some(Swirl {
                    amplitude: 1.5,
                    speed: 2.0,
                }),
            }),
            shading: Shading {
                falloff_radius: 3.0,
                glow_exponent: 5.0,
                glow_fades_with_morph: true,
                base_alpha: 0.8,
                alpha_fade: 0.85,
            },
        },
        strategy: Strategy::Displace,
        strips: false,
        cross_fade: None,
        camera: CameraRig {
            translation: Vec3::new(0.0, -0.5, -14.0),
            spin_axis: SpinAxis::Vertical,
            ..CameraRig::default()
        },
        initial_rotation_deg: 0.0,
        point_size: 2,
    }
}

fn bloom() -> FlowerPreset {
    let ramp = OpeningRamp {
        closed_deg: 60.0,
        open_deg: 180.0 / 1.75,
    };
    FlowerPreset {
        kind: PresetKind::Bloom,
        name: "Blooming Dahlia",
        grid: Grid {
            radial_steps: 36,
            angular_steps: 720,
            angular_span_deg: 180.0 * 45.0,
            closed_end: true,
        },
        shape: ShapeConstants {
            opening_deg: ramp.closed_deg,
            petal_decay_deg: 11.0 * 180.0,
            petal_cut: PetalCut::Fringed {
                base: 0.6,
                alignment: 9.75,
                fringe: 420.0,
                divisor: 3000.0,
            },
            droop: Droop {
                gain: 3.5,
                knee: 0.9,
                rho_power: 2,
                knee_power: 2,
            },
            taper_span_deg: 20000.0,
            ripple: Ripple {
                frequency: 0.5,
                amplitude: 0.025,
            },
            vertical_scale: -0.4,
            world_scale: WORLD_SCALE,
        },
        colors: ColorTiming::Baked(default_policy(PaletteChoice::Spiral)),
        seeds: None,
        engine: DeformationEngine {
            attenuation: Attenuation {
                rate: 0.6,
                onset_power: 1.0,
            },
            deformation: Deformation::Rest,
            shading: Shading {
                falloff_radius: 3.5,
                glow_exponent: 1.5,
                glow_fades_with_morph: false,
                base_alpha: 0.55,
                alpha_fade: 0.0,
            },
        },
        strategy: Strategy::Regenerate(ramp),
        strips: true,
        cross_fade: Some(CrossFade::Linear {
            surface_floor: 0.15,
            points_peak: 0.9,
        }),
        camera: CameraRig {
            translation: Vec3::new(0.0, 0.0, -13.0),
            face_deg: 250.0,
            spin_axis: SpinAxis::Depth,
            ..CameraRig::default()
        },
        initial_rotation_deg: 0.0,
        point_size: 1,
    }
}
