use crate::capability::probe_renderer;
use crate::config::{Config, SourceKind};
use crate::control::{ControlMapper, ControlState, ControlTuning, PulseTuning, SpinMode};
use crate::flower::{FlowerPreset, FrameCtx, GeometrySource, Topology};
use crate::raster::Rasterizer;
use crate::render::{make_renderer, Frame};
use crate::settings::Settings;
use crate::source::{AudioSource, ControlSource, DemoSource, KeyboardSource, ReplayScript, ReplaySource};
use crate::terminal::TerminalGuard;
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::BufWriter;
use std::time::{Duration, Instant};

const DEFAULT_FPS: u32 = 60;

/// Per-stage timings of one `AppState::step`, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub control_ms: f32,
    pub geometry_ms: f32,
    pub raster_ms: f32,
    pub vertices: usize,
}

/// Session time kept in f64 so hours-long runs don't lose frame-sized steps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionClock {
    seconds: f64,
}

impl SessionClock {
    /// Period of the f32 time handed to geometry; keeps sin/cos arguments small.
    pub const SCENE_PERIOD_S: f64 = 3600.0;

    pub fn advance(&mut self, dt: f32) {
        self.seconds += f64::from(dt);
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn scene_time(&self) -> f32 {
        self.seconds.rem_euclid(Self::SCENE_PERIOD_S) as f32
    }
}

/// Everything one session mutates, owned by the render loop.
pub struct AppState {
    preset: FlowerPreset,
    geometry: Box<dyn GeometrySource>,
    mapper: ControlMapper,
    source: Box<dyn ControlSource>,
    raster: Rasterizer,
    clock: SessionClock,
    pub overlay: bool,
    pub running: bool,
}

impl AppState {
    pub fn new(
        preset: FlowerPreset,
        tuning: ControlTuning,
        source: Box<dyn ControlSource>,
        width: usize,
        height: usize,
    ) -> Self {
        let geometry = preset.build();
        let mapper = ControlMapper::new(tuning, preset.initial_rotation_deg);
        let mut raster = Rasterizer::new(width, height);
        raster.state.point_size = preset.point_size;
        log::info!(
            "preset {} ({} vertices, {:?})",
            preset.name,
            geometry.vertex_count(),
            geometry.topology()
        );
        Self {
            preset,
            geometry,
            mapper,
            source,
            raster,
            clock: SessionClock::default(),
            overlay: true,
            running: true,
        }
    }

    pub fn set_point_size(&mut self, size: u32) {
        self.raster.state.point_size = size.max(1);
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.raster.resize(width, height);
    }

    pub fn preset(&self) -> &FlowerPreset {
        &self.preset
    }

    pub fn source_label(&self) -> &'static str {
        self.source.label()
    }

    pub fn control(&self) -> ControlState {
        self.mapper.state()
    }

    pub fn targets(&self) -> (f32, f32) {
        self.mapper.last_targets()
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.seconds()
    }

    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        self.source.handle_key(code)
    }

    /// Advances the session by `dt` seconds and rasterizes the frame.
    pub fn step(&mut self, dt: f32) -> FrameStats {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.clock.advance(dt);

        let t0 = Instant::now();
        let raw = self.source.read(self.clock.seconds());
        let control = self.mapper.update(raw, dt);
        let t1 = Instant::now();

        let topology = self.geometry.topology();
        let layers = self.geometry.layer_alphas(control.smoothed_morph);
        let vertices = self.geometry.frame(&FrameCtx {
            time: self.clock.scene_time(),
            morph: control.smoothed_morph,
        });
        let t2 = Instant::now();

        let mvp = self
            .preset
            .camera
            .view_projection(self.raster.aspect(), control.render_rotation_deg());
        self.raster.clear();
        match topology {
            Topology::Layered { rows, columns } => self.raster.draw_layers(&mvp, vertices, rows, columns, layers),
            _ => self.raster.draw(&mvp, vertices, topology),
        }
        if self.overlay {
            if let Some(image) = self.source.preview() {
                let (w, h) = (self.raster.width() / 4, self.raster.height() / 4);
                self.raster.draw_overlay(image, w, h);
            }
        }
        self.raster.resolve();
        let t3 = Instant::now();

        FrameStats {
            control_ms: ms(t1 - t0),
            geometry_ms: ms(t2 - t1),
            raster_ms: ms(t3 - t2),
            vertices: vertices.len(),
        }
    }

    pub fn pixels(&self) -> &[u8] {
        self.raster.pixels()
    }
}

fn ms(d: Duration) -> f32 {
    d.as_secs_f32() * 1000.0
}

pub fn make_source(cfg: &Config) -> anyhow::Result<Box<dyn ControlSource>> {
    Ok(match cfg.source {
        SourceKind::Keyboard => Box::new(KeyboardSource::new()),
        SourceKind::Demo => Box::new(DemoSource::new()),
        SourceKind::Replay => {
            let path = cfg
                .replay
                .as_deref()
                .context("--source replay needs --replay <file>")?;
            let script = ReplayScript::load(path).with_context(|| format!("load replay {}", path.display()))?;
            log::info!("replay: {} keyframes over {:.1}s", script.len(), script.span_s());
            Box::new(ReplaySource::new(script, cfg.replay_loop))
        }
        SourceKind::Audio => match AudioSource::new(cfg.device.as_deref()) {
            Ok(src) => Box::new(src),
            Err(err) => {
                log::warn!("audio control unavailable ({err:#}); using keyboard");
                Box::new(KeyboardSource::new())
            }
        },
    })
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let settings = Settings::load(cfg.settings.as_deref()).context("load settings")?;
    let mut tuning = settings.control;
    tuning.swap_channels |= cfg.swap_hands;
    if cfg.pulse_spin && tuning.spin == SpinMode::Velocity {
        tuning.spin = SpinMode::Pulse(PulseTuning::default());
    }

    let mut preset = FlowerPreset::new(cfg.preset);
    if let Some(choice) = cfg.palette {
        preset = preset.with_palette(choice);
    }
    let fps_target = cfg.fps.or(settings.render.fps).unwrap_or(DEFAULT_FPS).max(1);
    let point_size = cfg.point_size.or(settings.render.point_size);
    let overlay = cfg.overlay.or(settings.render.overlay).unwrap_or(true);

    let caps = probe_renderer(cfg.renderer, cfg.auto_probe);
    let (px_w_mul, px_h_mul) = caps.renderer.cell_pixels();
    let source = make_source(&cfg)?;

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());
    let mut renderer = make_renderer(caps.renderer);

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.1 < 2 || last_size.0 < 4 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let mut show_hud = true;
    let mut show_help = false;
    let mut hud_rows = hud_rows_for_size(last_size, show_hud);
    let pixel_size = |size: (u16, u16), hud_rows: u16| {
        let visual_rows = size.1.saturating_sub(hud_rows).max(1);
        (size.0 as usize * px_w_mul, visual_rows as usize * px_h_mul)
    };

    let (w, h) = pixel_size(last_size, hud_rows);
    let mut app = AppState::new(preset, tuning, source, w, h);
    if let Some(size) = point_size {
        app.set_point_size(size);
    }
    app.overlay = overlay;

    let mut last_frame = Instant::now();
    let mut fps = FpsCounter::new();
    let mut stats = FrameStats::default();
    let mut last_present_ms = 0.0f32;

    while app.running {
        let now = Instant::now();

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    handle_key(&mut app, k.code, k.modifiers, &mut show_hud, &mut show_help);
                }
                Event::Resize(c, r) => last_size = (c, r),
                _ => {}
            }
        }
        if !app.running {
            break;
        }

        // Resize events can be missed in some terminals.
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
        }

        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        let (term_cols, term_rows) = last_size;
        let hud = if show_hud {
            build_wrapped_hud(
                term_cols as usize,
                &app,
                fps.fps(),
                &stats,
                last_present_ms,
                renderer.name(),
                &caps.status_label(),
            )
        } else {
            String::new()
        };
        hud_rows = hud_rows_for_text(term_rows, show_hud, &hud).min(hud_rows_for_size(last_size, show_hud));
        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let (w, h) = pixel_size(last_size, hud_rows);
        app.resize(w, h);

        stats = app.step(dt);

        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: app.pixels(),
            hud: &hud,
            hud_rows,
            overlay: show_help.then_some(HELP_TEXT),
            sync_updates: cfg.sync_updates,
        };

        let present_start = Instant::now();
        renderer.render(&frame, &mut out)?;
        last_present_ms = ms(present_start.elapsed());
        fps.tick();

        let target = Duration::from_secs_f32(1.0 / fps_target as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }

    log::info!("session ended after {:.1}s", app.elapsed());
    Ok(())
}

fn handle_key(app: &mut AppState, code: KeyCode, mods: KeyModifiers, show_hud: &mut bool, show_help: &mut bool) {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        app.running = false;
        return;
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => app.running = false,
        KeyCode::Char('i') | KeyCode::Char('I') => *show_hud = !*show_hud,
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => *show_help = !*show_help,
        KeyCode::Char('o') | KeyCode::Char('O') => app.overlay = !app.overlay,
        other => {
            if !app.handle_key(other) {
                log::trace!("unhandled key {other:?}");
            }
        }
    }
}

fn hud_rows_for_size(size: (u16, u16), show_hud: bool) -> u16 {
    if !show_hud || size.1 <= 1 {
        return 0;
    }
    (size.1 - 1).min(4)
}

fn hud_rows_for_text(term_rows: u16, show_hud: bool, hud: &str) -> u16 {
    if !show_hud {
        return 0;
    }
    (hud.lines().count() as u16).min(term_rows.saturating_sub(1))
}

fn build_wrapped_hud(
    cols: usize,
    app: &AppState,
    fps: f32,
    stats: &FrameStats,
    present_ms: f32,
    renderer_name: &str,
    probe: &str,
) -> String {
    let control = app.control();
    let (morph_target, spin_target) = app.targets();
    let logical_lines = [
        format!(
            "Preset: {} | Morph: {:>4.2} (->{:>4.2}) | Rotation: {:>6.1} deg ({:>5.0} deg/s, target {:>4.2}) | FPS: {:>4.1}",
            app.preset().name,
            control.smoothed_morph,
            morph_target,
            control.render_rotation_deg(),
            control.spin_deg_per_s,
            spin_target,
            fps,
        ),
        format!(
            "ms(C/G/R/P): {:>4.1}/{:>4.1}/{:>4.1}/{:>4.1} | Vertices: {} | Source: {} | Renderer: {} | Probe: {}",
            stats.control_ms,
            stats.geometry_ms,
            stats.raster_ms,
            present_ms,
            stats.vertices,
            app.source_label(),
            renderer_name,
            probe,
        ),
        "Keys: a/z k/m hands | x , hide hand | 0 reset | o overlay | i HUD | ?/h help | q quit".to_string(),
    ];

    let width = cols.max(1);
    logical_lines
        .iter()
        .flat_map(|line| hard_wrap_line(line, width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn hard_wrap_line(line: &str, width: usize) -> Vec<String> {
    let chars = line.chars().collect::<Vec<_>>();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(width.max(1)).map(|c| c.iter().collect()).collect()
}

const HELP_TEXT: &str = "Rose Bloom Hotkeys\n\
a / z  left hand open / close (morph)\n\
k / m  right hand open / close (spin)\n\
x / ,  left / right hand in or out of view\n\
0  relax both hands\n\
o  toggle control preview overlay\n\
i  show/hide HUD\n\
? or h or F1  toggle this help\n\
q or esc  quit";

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
