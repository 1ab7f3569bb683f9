mod deform;
mod palette;
mod presets;
mod shape;

pub use deform::{
    Attenuation, Deformation, DeformationEngine, DispersalParams, GrainSpeed, MeltParams, ShadedVertex,
    Shading, Swirl, Turbulence,
};
pub use palette::{hex, rgb, ColorPolicy, ColorSample, ColorTiming, WHITE};
pub use presets::{default_policy, FlowerPreset, Strategy};
pub use shape::{
    generate, generate_into, BaseMesh, BaseVertex, Droop, Grid, MeshSpec, PetalCut, Ripple, SeedPattern,
    ShapeConstants,
};

/// How the frame's vertices are meant to be connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Points,
    /// `rows × columns` lattice drawn as one quad strip per adjacent row pair.
    QuadStrips { rows: usize, columns: usize },
    /// Quad-strip surface plus the same vertices as points, each layer with
    /// its own opacity from [`GeometrySource::layer_alphas`].
    Layered { rows: usize, columns: usize },
}

/// Surface/point opacity pair as a function of morph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossFade {
    /// Surface `lerp(1, surface_floor, m)`, points `lerp(0, points_peak, m)`.
    Linear { surface_floor: f32, points_peak: f32 },
    /// Surface `max(surface_floor, 1 - 2m)`, points `min(1, 2m)`; points are
    /// hidden below a morph of 0.01.
    Snappy { surface_floor: f32 },
}

impl CrossFade {
    pub fn alphas(&self, morph: f32) -> (f32, f32) {
        let m = if morph.is_finite() { morph.clamp(0.0, 1.0) } else { 0.0 };
        match *self {
            CrossFade::Linear {
                surface_floor,
                points_peak,
            } => (1.0 + (surface_floor - 1.0) * m, points_peak * m),
            CrossFade::Snappy { surface_floor } => {
                let points = if m < 0.01 { 0.0 } else { (2.0 * m).min(1.0) };
                ((1.0 - 2.0 * m).max(surface_floor), points)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCtx {
    /// Scene seconds; wraps with the session clock's period.
    pub time: f32,
    pub morph: f32,
}

/// Per-frame geometry producer. The render loop only talks to this.
pub trait GeometrySource {
    fn topology(&self) -> Topology;
    fn vertex_count(&self) -> usize;
    fn frame(&mut self, ctx: &FrameCtx) -> &[ShadedVertex];

    /// `(surface, points)` opacity for [`Topology::Layered`] output.
    fn layer_alphas(&self, _morph: f32) -> (f32, f32) {
        (1.0, 1.0)
    }
}

/// Immutable base mesh displaced every frame.
pub struct DisplacedMesh {
    base: BaseMesh,
    engine: DeformationEngine,
    live_colors: Option<ColorPolicy>,
    topology: Topology,
    out: Vec<ShadedVertex>,
}

impl DisplacedMesh {
    pub fn new(base: BaseMesh, engine: DeformationEngine, live_colors: Option<ColorPolicy>, strips: bool) -> Self {
        let topology = if strips {
            Topology::QuadStrips {
                rows: base.rows,
                columns: base.columns,
            }
        } else {
            Topology::Points
        };
        let out = Vec::with_capacity(base.len());
        Self {
            base,
            engine,
            live_colors,
            topology,
            out,
        }
    }
}

impl GeometrySource for DisplacedMesh {
    fn topology(&self) -> Topology {
        self.topology
    }

    fn vertex_count(&self) -> usize {
        self.base.len()
    }

    fn frame(&mut self, ctx: &FrameCtx) -> &[ShadedVertex] {
        self.engine
            .apply(&self.base, self.live_colors.as_ref(), ctx.morph, ctx.time, &mut self.out);
        &self.out
    }
}

/// Opening constant as a function of the smoothed morph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningRamp {
    pub closed_deg: f64,
    pub open_deg: f64,
}

impl OpeningRamp {
    pub fn at(&self, morph: f32) -> f64 {
        let m = f64::from(morph.clamp(0.0, 1.0));
        self.closed_deg + (self.open_deg - self.closed_deg) * m
    }
}

/// Re-runs the generator each frame with the opening constant driven by morph.
pub struct RegeneratedMesh {
    spec: MeshSpec,
    ramp: OpeningRamp,
    engine: DeformationEngine,
    live_colors: Option<ColorPolicy>,
    strips: bool,
    cross_fade: Option<CrossFade>,
    mesh: BaseMesh,
    out: Vec<ShadedVertex>,
    last_opening: Option<f64>,
}

impl RegeneratedMesh {
    pub fn new(
        spec: MeshSpec,
        ramp: OpeningRamp,
        engine: DeformationEngine,
        live_colors: Option<ColorPolicy>,
        strips: bool,
    ) -> Self {
        let mut spec = spec;
        spec.shape.opening_deg = ramp.at(0.0);
        let mesh = generate(&spec);
        Self {
            spec,
            ramp,
            engine,
            live_colors,
            strips,
            cross_fade: None,
            mesh,
            out: Vec::new(),
            last_opening: Some(ramp.at(0.0)),
        }
    }

    /// Draws the surface and a point cloud together, faded by morph.
    pub fn with_cross_fade(mut self, fade: CrossFade) -> Self {
        self.cross_fade = Some(fade);
        self
    }

    pub fn opening_deg(&self) -> f64 {
        self.spec.shape.opening_deg
    }
}

impl GeometrySource for RegeneratedMesh {
    fn topology(&self) -> Topology {
        let (rows, columns) = (self.spec.grid.rows(), self.spec.grid.columns());
        match (self.strips, self.cross_fade) {
            (true, Some(_)) => Topology::Layered { rows, columns },
            (true, None) => Topology::QuadStrips { rows, columns },
            (false, _) => Topology::Points,
        }
    }

    fn vertex_count(&self) -> usize {
        self.spec.grid.vertex_count()
    }

    fn frame(&mut self, ctx: &FrameCtx) -> &[ShadedVertex] {
        let opening = self.ramp.at(ctx.morph);
        // The generator is pure, so an unchanged opening can reuse last frame's mesh.
        if self.last_opening != Some(opening) {
            self.spec.shape.opening_deg = opening;
            generate_into(&self.spec, &mut self.mesh);
            self.last_opening = Some(opening);
        }
        self.engine
            .apply(&self.mesh, self.live_colors.as_ref(), ctx.morph, ctx.time, &mut self.out);
        &self.out
    }

    fn layer_alphas(&self, morph: f32) -> (f32, f32) {
        self.cross_fade.map_or((1.0, 1.0), |fade| fade.alphas(morph))
    }
}
