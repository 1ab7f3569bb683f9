use std::time::Instant;

use anyhow::Result;
use rose_bloom::app::AppState;
use rose_bloom::config::PresetKind;
use rose_bloom::control::ControlTuning;
use rose_bloom::flower::FlowerPreset;
use rose_bloom::source::DemoSource;

struct Args {
    frames: usize,
    w: usize,
    h: usize,
    preset: Option<PresetKind>,
    max_ms: Option<f64>,
}

fn parse_args() -> Args {
    let mut args = Args {
        frames: 180,
        w: 160,
        h: 88,
        preset: None,
        max_ms: None,
    };

    let argv = std::env::args().skip(1).collect::<Vec<_>>();
    let mut i = 0usize;
    while i < argv.len() {
        let k = argv[i].as_str();
        let v = argv.get(i + 1).map(|s| s.as_str());
        match (k, v) {
            ("--frames", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.frames = n.max(1);
                }
                i += 2;
            }
            ("--w", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.w = n.max(1);
                }
                i += 2;
            }
            ("--h", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.h = n.max(1);
                }
                i += 2;
            }
            ("--preset", Some(x)) => {
                args.preset = match x {
                    "melt" => Some(PresetKind::Melt),
                    "dispersal" | "sand" => Some(PresetKind::Dispersal),
                    "bloom" | "dahlia" => Some(PresetKind::Bloom),
                    _ => None,
                };
                i += 2;
            }
            ("--max-ms", Some(x)) => {
                if let Ok(v) = x.parse::<f64>() {
                    args.max_ms = Some(v.max(0.1));
                }
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }
    args
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn main() -> Result<()> {
    let args = parse_args();
    let kinds = match args.preset {
        Some(kind) => vec![kind],
        None => PresetKind::all().to_vec(),
    };

    println!(
        "Headless benchmark: presets={} frames/preset={} size={}x{}",
        kinds.len(),
        args.frames,
        args.w,
        args.h
    );

    let dt = 1.0 / 60.0;
    let mut slow = Vec::new();
    for kind in kinds {
        let preset = FlowerPreset::new(kind);
        let name = preset.name;
        let build_start = Instant::now();
        let mut app = AppState::new(
            preset,
            ControlTuning::default(),
            Box::new(DemoSource::without_gaps()),
            args.w,
            args.h,
        );
        let build_ms = build_start.elapsed().as_secs_f64() * 1000.0;

        let mut times = Vec::with_capacity(args.frames);
        let mut lit = 0usize;
        let mut geometry_ms = 0.0f64;
        let mut raster_ms = 0.0f64;
        let mut vertices = 0usize;
        for _ in 0..args.frames {
            let start = Instant::now();
            let stats = app.step(dt);
            times.push(start.elapsed().as_secs_f64() * 1000.0);
            geometry_ms += f64::from(stats.geometry_ms);
            raster_ms += f64::from(stats.raster_ms);
            vertices = stats.vertices;
            if app.pixels().chunks_exact(4).any(|p| p[0] != 0 || p[1] != 0 || p[2] != 0) {
                lit += 1;
            }
        }

        let n = times.len().max(1) as f64;
        let avg = times.iter().sum::<f64>() / n;
        times.sort_by(|a, b| a.total_cmp(b));
        let p95 = percentile(&times, 0.95);
        let control = app.control();
        println!(
            "  {:<16} build {:>7.2} ms  avg {:>7.3} ms  p95 {:>7.3} ms  (geom {:>6.3} / raster {:>6.3})  verts={} lit={}/{} morph={:.2} rot={:.1}",
            name,
            build_ms,
            avg,
            p95,
            geometry_ms / n,
            raster_ms / n,
            vertices,
            lit,
            args.frames,
            control.smoothed_morph,
            control.render_rotation_deg(),
        );

        if let Some(limit) = args.max_ms {
            if p95 > limit {
                slow.push((name, p95));
            }
        }
    }

    if !slow.is_empty() {
        for (name, p95) in &slow {
            eprintln!("slow preset: {name} p95 {p95:.3} ms");
        }
        anyhow::bail!("{} preset(s) over the frame budget", slow.len());
    }
    Ok(())
}
