use clap::Parser;
use rose_bloom::config::{Config, PaletteChoice, PresetKind, RendererMode, SourceKind};
use rose_bloom::control::{ControlTuning, PulseTuning, SpinMode, ThresholdMap};
use rose_bloom::settings::{Settings, SettingsError};

// ── CLI ─────────────────────────────────────────────────────────────────────

#[test]
fn cli_defaults() {
    let cfg = Config::try_parse_from(["rose-bloom"]).unwrap();
    assert_eq!(cfg.preset, PresetKind::Melt);
    assert_eq!(cfg.source, SourceKind::Keyboard);
    assert_eq!(cfg.renderer, RendererMode::HalfBlock);
    assert_eq!(cfg.palette, None);
    assert_eq!(cfg.fps, None);
    assert!(cfg.auto_probe && cfg.sync_updates && cfg.replay_loop);
    assert!(!cfg.swap_hands);
    assert!(!cfg.pulse_spin);
    assert!(Config::try_parse_from(["rose-bloom", "--pulse-spin"]).unwrap().pulse_spin);
}

#[test]
fn cli_accepts_aliases() {
    let cfg = Config::try_parse_from([
        "rose-bloom",
        "--preset",
        "sand",
        "--renderer",
        "hb",
        "--source",
        "mic",
        "--palette",
        "anchor-mix",
        "--overlay",
        "false",
        "-vv",
    ])
    .unwrap();
    assert_eq!(cfg.preset, PresetKind::Dispersal);
    assert_eq!(cfg.renderer, RendererMode::HalfBlock);
    assert_eq!(cfg.source, SourceKind::Audio);
    assert_eq!(cfg.palette, Some(PaletteChoice::AnchorMix));
    assert_eq!(cfg.overlay, Some(false));
    assert_eq!(cfg.verbose, 2);

    let cfg = Config::try_parse_from(["rose-bloom", "--preset", "dahlia", "--renderer", "dots"]).unwrap();
    assert_eq!(cfg.preset, PresetKind::Bloom);
    assert_eq!(cfg.renderer, RendererMode::Braille);
}

#[test]
fn cli_rejects_unknown_values() {
    assert!(Config::try_parse_from(["rose-bloom", "--preset", "tulip"]).is_err());
    assert!(Config::try_parse_from(["rose-bloom", "--renderer", "sixel"]).is_err());
}

#[test]
fn renderer_cell_geometry() {
    assert_eq!(RendererMode::HalfBlock.cell_pixels(), (1, 2));
    assert_eq!(RendererMode::Braille.cell_pixels(), (2, 4));
    assert_eq!(RendererMode::Kitty.cell_pixels(), (2, 4));
}

// ── Settings file ───────────────────────────────────────────────────────────

#[test]
fn settings_default_when_absent_or_empty() {
    assert_eq!(Settings::load(None).unwrap(), Settings::default());
    assert_eq!(Settings::parse("").unwrap(), Settings::default());
    assert_eq!(Settings::default().control, ControlTuning::default());
}

#[test]
fn settings_partial_tables_keep_defaults() {
    let s = Settings::parse(
        r#"
[control]
smoothing_rate = 6.0
morph = { low = 0.1, high = 0.3 }

[render]
point_size = 2
fps = 30
"#,
    )
    .unwrap();
    assert_eq!(s.control.smoothing_rate, 6.0);
    assert_eq!(s.control.morph, ThresholdMap { low: 0.1, high: 0.3 });
    assert_eq!(s.control.rotation, ControlTuning::default().rotation);
    assert!(!s.control.swap_channels);
    assert_eq!(s.render.point_size, Some(2));
    assert_eq!(s.render.fps, Some(30));
    assert_eq!(s.render.overlay, None);
}

#[test]
fn settings_reject_unknown_keys() {
    assert!(matches!(Settings::parse("[control]\ncolour = 1\n"), Err(SettingsError::Parse(_))));
    assert!(matches!(Settings::parse("[audio]\ngain = 2\n"), Err(SettingsError::Parse(_))));
    assert!(matches!(
        Settings::parse("[control]\nmorph = { low = 0.1 }\n"),
        Err(SettingsError::Parse(_))
    ));
}

#[test]
fn settings_validation() {
    let cases = [
        ("[control]\nmorph = { low = 0.3, high = 0.1 }\n", "control.morph"),
        ("[control]\nrotation = { low = 0.2, high = 0.2 }\n", "control.rotation"),
        ("[control]\nsmoothing_rate = 0.0\n", "control.smoothing_rate"),
        ("[control]\nmax_spin_deg_per_s = -1.0\n", "control.max_spin_deg_per_s"),
        ("[control.spin]\nmode = \"pulse\"\ndecay_rate = -1.0\n", "control.spin.decay_rate"),
        ("[render]\npoint_size = 0\n", "render.point_size"),
        ("[render]\nfps = 0\n", "render.fps"),
    ];
    for (text, expected) in cases {
        match Settings::parse(text) {
            Err(SettingsError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("{expected}: unexpected {other:?}"),
        }
    }
}

#[test]
fn settings_load_reads_a_file() {
    let path = std::env::temp_dir().join(format!("rose-bloom-settings-{}.toml", std::process::id()));
    std::fs::write(&path, "[control]\nswap_channels = true\n").unwrap();
    let loaded = Settings::load(Some(path.as_path()));
    let _ = std::fs::remove_file(&path);
    assert!(loaded.unwrap().control.swap_channels);

    let missing = std::env::temp_dir().join("rose-bloom-no-such-settings.toml");
    let err = Settings::load(Some(missing.as_path())).unwrap_err();
    assert!(matches!(err, SettingsError::Io { .. }));
    assert!(err.to_string().contains("rose-bloom-no-such-settings.toml"));
}

#[test]
fn settings_select_the_spin_mode() {
    assert_eq!(Settings::default().control.spin, SpinMode::Velocity);

    let s = Settings::parse("[control.spin]\nmode = \"pulse\"\nclose_below = 0.1\n").unwrap();
    assert_eq!(
        s.control.spin,
        SpinMode::Pulse(PulseTuning {
            close_below: 0.1,
            ..PulseTuning::default()
        })
    );

    let s = Settings::parse("[control]\nspin = { mode = \"velocity\" }\n").unwrap();
    assert_eq!(s.control.spin, SpinMode::Velocity);
    assert!(Settings::parse("[control.spin]\nmode = \"wobble\"\n").is_err());
}
