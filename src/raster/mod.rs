mod camera;

pub use camera::{CameraRig, SpinAxis};

use crate::flower::{ShadedVertex, Topology};
use glam::{Mat4, Vec3, Vec4};

/// Small RGB raster shown as a flat screen-space quad (diagnostic overlay).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: usize,
    pub height: usize,
    pub rgb: Vec<u8>,
}

impl PreviewImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rgb: vec![0; width * height * 3],
        }
    }

    pub fn clear(&mut self) {
        self.rgb.fill(0);
    }

    pub fn put(&mut self, x: usize, y: usize, c: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * 3;
        self.rgb[i..i + 3].copy_from_slice(&c);
    }

    fn get(&self, x: usize, y: usize) -> Vec3 {
        let i = (y * self.width + x) * 3;
        Vec3::new(
            f32::from(self.rgb[i]),
            f32::from(self.rgb[i + 1]),
            f32::from(self.rgb[i + 2]),
        ) / 255.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// `dst = clamp(dst + src.rgb · src.a)`
    Additive,
    /// `dst = src.rgb`
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub depth_test: bool,
    pub blend: BlendMode,
    pub point_size: u32,
    /// Multiplies every fragment's alpha under additive blending.
    pub opacity: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: true,
            blend: BlendMode::Additive,
            point_size: 2,
            opacity: 1.0,
        }
    }
}

/// Screen-space vertex: pixel coordinates, window depth in `[0, 1]`, color.
#[derive(Debug, Clone, Copy)]
struct Projected {
    x: f32,
    y: f32,
    z: f32,
    color: Vec4,
}

/// CPU stand-in for an immediate-mode 3-D context: float color + depth buffers.
pub struct Rasterizer {
    w: usize,
    h: usize,
    color: Vec<Vec3>,
    depth: Vec<f32>,
    rgba: Vec<u8>,
    projected: Vec<Option<Projected>>,
    pub state: RenderState,
}

impl Rasterizer {
    pub fn new(w: usize, h: usize) -> Self {
        let mut r = Self {
            w: 0,
            h: 0,
            color: Vec::new(),
            depth: Vec::new(),
            rgba: Vec::new(),
            projected: Vec::new(),
            state: RenderState::default(),
        };
        r.resize(w, h);
        r
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn aspect(&self) -> f32 {
        self.w.max(1) as f32 / self.h.max(1) as f32
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        if w == self.w && h == self.h {
            return;
        }
        self.w = w;
        self.h = h;
        self.color = vec![Vec3::ZERO; w * h];
        self.depth = vec![1.0; w * h];
        self.rgba = vec![0; w * h * 4];
    }

    pub fn clear(&mut self) {
        self.color.fill(Vec3::ZERO);
        self.depth.fill(1.0);
    }

    pub fn draw(&mut self, mvp: &Mat4, vertices: &[ShadedVertex], topology: Topology) {
        match topology {
            Topology::Points => self.draw_points(mvp, vertices),
            Topology::QuadStrips { rows, columns } => self.draw_quad_strips(mvp, vertices, rows, columns),
            Topology::Layered { rows, columns } => self.draw_layers(mvp, vertices, rows, columns, (1.0, 1.0)),
        }
    }

    /// Surface strips at `alphas.0`, then the same vertices as points at
    /// `alphas.1` without depth testing. A layer at zero opacity is skipped;
    /// the render state is restored afterward.
    pub fn draw_layers(
        &mut self,
        mvp: &Mat4,
        vertices: &[ShadedVertex],
        rows: usize,
        columns: usize,
        alphas: (f32, f32),
    ) {
        let saved = self.state;
        let (surface, points) = alphas;
        if surface > 0.0 {
            self.state.opacity = saved.opacity * surface;
            self.draw_quad_strips(mvp, vertices, rows, columns);
        }
        if points > 0.0 {
            self.state.opacity = saved.opacity * points;
            self.state.depth_test = false;
            self.draw_points(mvp, vertices);
        }
        self.state = saved;
    }

    pub fn draw_points(&mut self, mvp: &Mat4, vertices: &[ShadedVertex]) {
        let size = self.state.point_size.max(1) as i32;
        let half = (size as f32) * 0.5;
        for v in vertices {
            let Some(p) = self.project(mvp, v) else {
                continue;
            };
            let x0 = (p.x - half).round() as i32;
            let y0 = (p.y - half).round() as i32;
            for dy in 0..size {
                for dx in 0..size {
                    self.fragment(x0 + dx, y0 + dy, p.z, p.color);
                }
            }
        }
    }

    /// Draws `rows - 1` strips of `columns - 1` quads; vertex `(r, c)` sits at
    /// index `r * columns + c`.
    pub fn draw_quad_strips(&mut self, mvp: &Mat4, vertices: &[ShadedVertex], rows: usize, columns: usize) {
        if rows < 2 || columns < 2 || vertices.len() < rows * columns {
            return;
        }

        let mut projected = std::mem::take(&mut self.projected);
        projected.clear();
        projected.extend(vertices.iter().map(|v| self.project(mvp, v)));

        for r in 0..rows - 1 {
            for c in 0..columns - 1 {
                let a = r * columns + c;
                let b = a + 1;
                let d = a + columns;
                let e = d + 1;
                if let (Some(pa), Some(pb), Some(pd), Some(pe)) = (projected[a], projected[b], projected[d], projected[e]) {
                    self.triangle(pa, pb, pd);
                    self.triangle(pb, pe, pd);
                }
            }
        }

        self.projected = projected;
    }

    /// Screen-space overlay in the top-left corner; depth testing is off for
    /// the pass and restored afterward.
    pub fn draw_overlay(&mut self, image: &PreviewImage, max_w: usize, max_h: usize) {
        if image.width == 0 || image.height == 0 || max_w == 0 || max_h == 0 {
            return;
        }
        let scale = (max_w as f32 / image.width as f32).min(max_h as f32 / image.height as f32);
        let out_w = ((image.width as f32 * scale) as usize).max(1);
        let out_h = ((image.height as f32 * scale) as usize).max(1);
        let margin = 1i32;

        let saved = self.state.depth_test;
        self.state.depth_test = false;
        for y in 0..out_h {
            let sy = (y * image.height / out_h).min(image.height - 1);
            for x in 0..out_w {
                let sx = (x * image.width / out_w).min(image.width - 1);
                let c = image.get(sx, sy);
                self.fragment(margin + x as i32, margin + y as i32, 0.0, c.extend(1.0));
            }
        }
        self.state.depth_test = saved;
    }

    /// Converts the float buffer to RGBA8.
    pub fn resolve(&mut self) -> &[u8] {
        for (px, c) in self.rgba.chunks_exact_mut(4).zip(&self.color) {
            let c = c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
            px[0] = c.x as u8;
            px[1] = c.y as u8;
            px[2] = c.z as u8;
            px[3] = 255;
        }
        &self.rgba
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }

    fn project(&self, mvp: &Mat4, v: &ShadedVertex) -> Option<Projected> {
        let clip = *mvp * v.position.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }
        Some(Projected {
            x: (ndc.x * 0.5 + 0.5) * self.w as f32,
            y: (0.5 - ndc.y * 0.5) * self.h as f32,
            z: ndc.z * 0.5 + 0.5,
            color: v.color,
        })
    }

    fn triangle(&mut self, a: Projected, b: Projected, c: Projected) {
        let area = edge(a.x, a.y, b.x, b.y, c.x, c.y);
        if area.abs() < 1.0 {
            // Sub-pixel sliver: emit its centroid so dense strips leave no holes.
            let x = (a.x + b.x + c.x) / 3.0;
            let y = (a.y + b.y + c.y) / 3.0;
            let z = (a.z + b.z + c.z) / 3.0;
            let color = (a.color + b.color + c.color) / 3.0;
            self.fragment(x.floor() as i32, y.floor() as i32, z, color);
            return;
        }

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as i32;
        let max_x = a.x.max(b.x).max(c.x).ceil().min(self.w as f32) as i32;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as i32;
        let max_y = a.y.max(b.y).max(c.y).ceil().min(self.h as f32) as i32;

        for py in min_y..max_y {
            let sy = py as f32 + 0.5;
            for px in min_x..max_x {
                let sx = px as f32 + 0.5;
                let w0 = edge(b.x, b.y, c.x, c.y, sx, sy) / area;
                let w1 = edge(c.x, c.y, a.x, a.y, sx, sy) / area;
                let w2 = 1.0 - w0 - w1;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let z = a.z * w0 + b.z * w1 + c.z * w2;
                let color = a.color * w0 + b.color * w1 + c.color * w2;
                self.fragment(px, py, z, color);
            }
        }
    }

    fn fragment(&mut self, x: i32, y: i32, z: f32, rgba: Vec4) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return;
        }
        let i = y as usize * self.w + x as usize;
        if self.state.depth_test {
            if z >= self.depth[i] {
                return;
            }
            self.depth[i] = z;
        }
        let src = rgba.truncate();
        self.color[i] = match self.state.blend {
            BlendMode::Additive => (self.color[i] + src * (rgba.w * self.state.opacity)).min(Vec3::ONE),
            BlendMode::Replace => src,
        };
    }
}

#[inline]
fn edge(ax: f32, ay: f32, bx: f32, by: f32, px: f32, py: f32) -> f32 {
    (bx - ax) * (py - ay) - (by - ay) * (px - ax)
}
