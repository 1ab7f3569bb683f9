use super::palette::{ColorPolicy, ColorSample};
use glam::Vec3;

/// Sampling lattice for the rose surface: `radial_steps + 1` rows of ρ in
/// `[0, 1]` and `angular_steps` (or `angular_steps + 1` when `closed_end`)
/// columns of θ spread over `angular_span_deg`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub radial_steps: u32,
    pub angular_steps: u32,
    pub angular_span_deg: f64,
    pub closed_end: bool,
}

impl Grid {
    pub fn rows(&self) -> usize {
        self.radial_steps as usize + 1
    }

    pub fn columns(&self) -> usize {
        self.angular_steps as usize + usize::from(self.closed_end)
    }

    pub fn vertex_count(&self) -> usize {
        self.rows() * self.columns()
    }

    pub fn rho(&self, row: usize) -> f64 {
        row as f64 / self.radial_steps.max(1) as f64
    }

    pub fn theta_deg(&self, column: usize) -> f64 {
        column as f64 * self.angular_span_deg / self.angular_steps.max(1) as f64
    }
}

/// Periodic modulation that carves the scalloped petal edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PetalCut {
    /// `1 - ½·(1.25·(1 - (aθ mod 360)/180)² - ¼)²`
    Scallop { alignment: f64 },
    /// `base + |asin(sin(aθ))|`
    Folded { base: f64, alignment: f64 },
    /// `base + |asin(sin(aθ)) + fringe·sin(aθ)| / divisor`
    Fringed {
        base: f64,
        alignment: f64,
        fringe: f64,
        divisor: f64,
    },
}

impl PetalCut {
    pub fn eval(&self, theta_deg: f64) -> f64 {
        match *self {
            Self::Scallop { alignment } => {
                let wrapped = (alignment * theta_deg).rem_euclid(360.0);
                let bowl = 1.0 - wrapped / 180.0;
                let edge = 1.25 * bowl * bowl - 0.25;
                1.0 - 0.5 * edge * edge
            }
            Self::Folded { base, alignment } => {
                let s = (alignment * theta_deg).to_radians().sin();
                base + s.asin().abs()
            }
            Self::Fringed {
                base,
                alignment,
                fringe,
                divisor,
            } => {
                let s = (alignment * theta_deg).to_radians().sin();
                base + (s.asin() + fringe * s).abs() / divisor
            }
        }
    }

    /// Angular period in degrees (`360 / alignment`).
    pub fn period_deg(&self) -> f64 {
        let alignment = match *self {
            Self::Scallop { alignment }
            | Self::Folded { alignment, .. }
            | Self::Fringed { alignment, .. } => alignment,
        };
        360.0 / alignment
    }
}

/// Petal droop: `gain · ρ^rho_power · (knee·ρ - 1)^knee_power · sin(phi)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Droop {
    pub gain: f64,
    pub knee: f64,
    pub rho_power: i32,
    pub knee_power: i32,
}

impl Droop {
    pub fn eval(&self, rho: f64, phi_rad: f64) -> f64 {
        self.gain * rho.powi(self.rho_power) * (self.knee * rho - 1.0).powi(self.knee_power) * phi_rad.sin()
    }
}

/// Small multiplicative wobble `1 + amplitude·sin(θ·frequency)` (θ in degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub frequency: f64,
    pub amplitude: f64,
}

impl Ripple {
    pub const NONE: Self = Self {
        frequency: 0.0,
        amplitude: 0.0,
    };

    fn eval(&self, theta_deg: f64) -> f64 {
        1.0 + self.amplitude * (theta_deg * self.frequency).sin()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeConstants {
    /// Phase amplitude at θ = 0 in degrees; the bloom "opening".
    pub opening_deg: f64,
    /// Decay rate `k` of `phi = opening·exp(-θ/k)`.
    pub petal_decay_deg: f64,
    pub petal_cut: PetalCut,
    pub droop: Droop,
    /// Spiral converges as `1 - θ/taper_span_deg`.
    pub taper_span_deg: f64,
    pub ripple: Ripple,
    pub vertical_scale: f64,
    pub world_scale: f64,
}

impl ShapeConstants {
    pub fn phi_deg(&self, theta_deg: f64) -> f64 {
        self.opening_deg * (-theta_deg / self.petal_decay_deg).exp()
    }

    /// World-space position of one lattice sample.
    pub fn point(&self, rho: f64, theta_deg: f64) -> Vec3 {
        let phi = self.phi_deg(theta_deg).to_radians();
        let theta = theta_deg.to_radians();
        let cut = self.petal_cut.eval(theta_deg);
        let hang = self.droop.eval(rho, phi);
        let taper = 1.0 - theta_deg / self.taper_span_deg;
        let factor = self.world_scale * taper * cut * self.ripple.eval(theta_deg);

        let extent = factor * (rho * phi.sin() + hang * phi.cos());
        let x = extent * theta.sin();
        let z = extent * theta.cos();
        let y = self.vertical_scale * factor * (rho * phi.cos() - hang * phi.sin());
        Vec3::new(x as f32, y as f32, z as f32)
    }
}

/// Index-derived direction pattern `(sin(i·a), cos(i·b), sin(i·c))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedPattern {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl SeedPattern {
    pub const CLASSIC: Self = Self {
        a: 12.9898,
        b: 78.233,
        c: 37.719,
    };

    pub fn direction(&self, index: usize) -> Vec3 {
        let i = index as f64;
        Vec3::new(
            (i * self.a).sin() as f32,
            (i * self.b).cos() as f32,
            (i * self.c).sin() as f32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseVertex {
    pub position: Vec3,
    pub rho: f32,
}

/// Everything the generator needs; identical specs yield identical meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSpec {
    pub grid: Grid,
    pub shape: ShapeConstants,
    pub baked_colors: Option<ColorPolicy>,
    pub seeds: Option<SeedPattern>,
}

/// Generated geometry in row-major emission order (ρ outer, θ inner).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseMesh {
    pub vertices: Vec<BaseVertex>,
    pub colors: Option<Vec<Vec3>>,
    pub seeds: Option<Vec<Vec3>>,
    pub rows: usize,
    pub columns: usize,
}

impl BaseMesh {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

pub fn generate(spec: &MeshSpec) -> BaseMesh {
    let mut mesh = BaseMesh::default();
    generate_into(spec, &mut mesh);
    mesh
}

/// Same as [`generate`] but reuses the allocations already held by `mesh`.
pub fn generate_into(spec: &MeshSpec, mesh: &mut BaseMesh) {
    let grid = spec.grid;
    let count = grid.vertex_count();
    mesh.rows = grid.rows();
    mesh.columns = grid.columns();
    mesh.vertices.clear();
    mesh.vertices.reserve(count);

    let mut colors = mesh.colors.take().unwrap_or_default();
    colors.clear();
    let mut seeds = mesh.seeds.take().unwrap_or_default();
    seeds.clear();

    for row in 0..grid.rows() {
        let rho = grid.rho(row);
        for column in 0..grid.columns() {
            let theta_deg = grid.theta_deg(column);
            let index = mesh.vertices.len();
            let position = spec.shape.point(rho, theta_deg);
            mesh.vertices.push(BaseVertex {
                position,
                rho: rho as f32,
            });

            if let Some(policy) = &spec.baked_colors {
                colors.push(policy.eval(&ColorSample {
                    index,
                    rho: rho as f32,
                    theta_deg: theta_deg as f32,
                    position,
                }));
            }
            if let Some(pattern) = &spec.seeds {
                seeds.push(pattern.direction(index));
            }
        }
    }

    mesh.colors = spec.baked_colors.as_ref().map(|_| colors);
    mesh.seeds = spec.seeds.as_ref().map(|_| seeds);
}
