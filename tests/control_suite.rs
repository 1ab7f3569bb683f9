use rose_bloom::control::{ControlMapper, ControlTuning, PulseTuning, RawControlReading, SpinMode, ThresholdMap};

const DT: f32 = 1.0 / 60.0;

fn mapper(initial_rotation: f64) -> ControlMapper {
    ControlMapper::new(ControlTuning::default(), initial_rotation)
}

#[test]
fn zero_signal_holds_rest_state() {
    let mut m = mapper(65.0);
    for _ in 0..10 {
        let s = m.update(RawControlReading::NONE, DT);
        assert_eq!(s.smoothed_morph, 0.0);
        assert_eq!(s.rotation_deg, 65.0);
    }
}

#[test]
fn full_open_left_hand_converges_within_two_seconds() {
    let mut m = mapper(65.0);
    let mut state = m.state();
    for _ in 0..120 {
        state = m.update(
            RawControlReading {
                left: Some(0.30),
                right: None,
            },
            DT,
        );
    }
    assert!((state.smoothed_morph - 1.0).abs() < 0.01, "morph {}", state.smoothed_morph);
    assert_eq!(state.rotation_deg, 65.0, "absent right hand must not spin");
}

#[test]
fn threshold_gating() {
    let t = ThresholdMap { low: 0.06, high: 0.28 };
    assert_eq!(t.target(0.0), 0.0);
    assert_eq!(t.target(0.06), 0.0);
    assert_eq!(t.target(0.28), 1.0);
    assert_eq!(t.target(0.9), 1.0);
    assert!((t.target(0.17) - 0.5).abs() < 1e-6);
    assert_eq!(t.target(f32::NAN), 0.0);
    assert_eq!(t.target(-1.0), 0.0);

    // Degenerate band acts as a step.
    let step = ThresholdMap { low: 0.2, high: 0.2 };
    assert_eq!(step.target(0.2), 0.0);
    assert_eq!(step.target(0.21), 1.0);
}

#[test]
fn smoothing_is_monotonic_and_never_overshoots() {
    let mut m = mapper(0.0);
    let mut prev = 0.0f32;
    for i in 0..600 {
        // Irregular frame times, including a huge stall.
        let dt = if i == 300 { 5.0 } else { DT * (1.0 + (i % 3) as f32) };
        let s = m.update(RawControlReading::both(0.17, 0.0), dt);
        assert!(s.smoothed_morph >= prev, "frame {i}: {} < {prev}", s.smoothed_morph);
        assert!(s.smoothed_morph <= 0.5 + 1e-6);
        prev = s.smoothed_morph;
    }
    assert!((prev - 0.5).abs() < 1e-4);
}

#[test]
fn morph_relaxes_when_hand_leaves() {
    let mut m = mapper(0.0);
    for _ in 0..240 {
        m.update(RawControlReading::both(0.5, 0.0), DT);
    }
    let mut prev = m.state().smoothed_morph;
    for _ in 0..240 {
        let s = m.update(RawControlReading::NONE, DT);
        assert!(s.smoothed_morph <= prev);
        assert!(s.smoothed_morph >= 0.0);
        prev = s.smoothed_morph;
    }
    assert!(prev < 0.01);
}

#[test]
fn rotation_accumulates_linearly() {
    let mut m = mapper(10.0);
    // 0.175 sits halfway through the rotation band: 90 deg/s.
    for _ in 0..600 {
        m.update(RawControlReading::both(0.0, 0.175), DT);
    }
    let expected = 10.0 + 90.0 * 10.0;
    let got = m.state().rotation_deg;
    assert!((got - expected).abs() < 1e-2, "{got} vs {expected}");
    assert!((m.last_targets().1 - 0.5).abs() < 1e-6);
}

#[test]
fn rotation_is_unbounded_but_renders_reduced() {
    let mut m = mapper(0.0);
    // Full spin for 30 minutes of frames at 180 deg/s.
    for _ in 0..(30 * 60 * 60) {
        m.update(RawControlReading::both(0.0, 1.0), DT);
    }
    let s = m.state();
    let expected = 180.0 * 30.0 * 60.0;
    assert!((s.rotation_deg - expected).abs() < 1.0, "{}", s.rotation_deg);
    let r = s.render_rotation_deg();
    assert!((0.0..360.0).contains(&r));
}

#[test]
fn negative_and_nan_dt_are_treated_as_zero() {
    let mut m = mapper(65.0);
    let before = m.state();
    for dt in [-0.5, f32::NAN] {
        let s = m.update(RawControlReading::both(1.0, 1.0), dt);
        assert_eq!(s.smoothed_morph, before.smoothed_morph);
        assert_eq!(s.rotation_deg, before.rotation_deg);
    }
    // Targets still reflect the reading.
    assert_eq!(m.last_targets(), (1.0, 1.0));
}

#[test]
fn swapped_channels_exchange_roles() {
    let tuning = ControlTuning {
        swap_channels: true,
        ..ControlTuning::default()
    };
    let mut m = ControlMapper::new(tuning, 0.0);
    let reading = RawControlReading {
        left: Some(0.30),
        right: None,
    };
    for _ in 0..60 {
        m.update(reading, DT);
    }
    let s = m.state();
    assert_eq!(s.smoothed_morph, 0.0);
    assert!((s.rotation_deg - 180.0).abs() < 1e-3);
}

fn pulse_mapper() -> ControlMapper {
    let tuning = ControlTuning {
        spin: SpinMode::Pulse(PulseTuning::default()),
        ..ControlTuning::default()
    };
    ControlMapper::new(tuning, 0.0)
}

fn spin_only(right: f32) -> RawControlReading {
    RawControlReading {
        left: None,
        right: Some(right),
    }
}

fn coast(rate: f32, seconds: f64) -> f64 {
    (-f64::from(rate) * seconds).exp()
}

#[test]
fn pulse_kicks_when_the_hand_closes() {
    let p = PulseTuning::default();
    let mut m = pulse_mapper();
    m.update(spin_only(0.07), DT);
    assert_eq!(m.state().spin_deg_per_s, 0.0, "first reading has nothing to compare");

    let s = m.update(spin_only(0.05), DT);
    let kick = f64::from((0.07f32 - 0.05) * p.gain_deg_per_s);
    assert!((s.rotation_deg - kick * f64::from(DT)).abs() < 1e-6);
    assert!((s.spin_deg_per_s - kick * coast(p.decay_rate, f64::from(DT))).abs() < 1e-6);
}

#[test]
fn pulse_ignores_closing_above_the_threshold() {
    let mut m = pulse_mapper();
    m.update(spin_only(0.3), DT);
    let s = m.update(spin_only(0.2), DT);
    assert_eq!(s.spin_deg_per_s, 0.0);
    assert_eq!(s.rotation_deg, 0.0);

    // A hand appearing already closed is not a pinch.
    let mut m = pulse_mapper();
    m.update(RawControlReading::NONE, DT);
    assert_eq!(m.update(spin_only(0.01), DT).spin_deg_per_s, 0.0);
}

#[test]
fn pulse_coast_is_frame_rate_independent() {
    let p = PulseTuning::default();
    let run = |dt: f32, frames: usize| {
        let mut m = pulse_mapper();
        m.update(spin_only(0.07), dt);
        m.update(spin_only(0.05), dt);
        let mut s = m.state();
        for _ in 0..frames {
            s = m.update(spin_only(0.05), dt);
        }
        s
    };
    // Kick frame plus the rest adds up to one second either way.
    let fast = run(1.0 / 60.0, 59);
    let slow = run(1.0 / 30.0, 29);
    let expected = 60.0 * coast(p.decay_rate, 1.0);
    assert!((fast.spin_deg_per_s - expected).abs() < 1e-3, "{}", fast.spin_deg_per_s);
    assert!((slow.spin_deg_per_s - expected).abs() < 1e-3, "{}", slow.spin_deg_per_s);
    assert!(fast.rotation_deg > 0.0 && slow.rotation_deg > 0.0);
}

#[test]
fn pulse_releases_faster_when_the_hand_opens() {
    let p = PulseTuning::default();
    let mut holding = pulse_mapper();
    let mut opening = pulse_mapper();
    for m in [&mut holding, &mut opening] {
        m.update(spin_only(0.07), DT);
        m.update(spin_only(0.05), DT);
    }
    let held = holding.update(spin_only(0.05), DT).spin_deg_per_s;
    let opened = opening.update(spin_only(0.2), DT).spin_deg_per_s;
    assert!((opened - held * coast(p.release_rate, f64::from(DT))).abs() < 1e-6);
}

#[test]
fn pulse_gets_extra_friction_while_morphing() {
    let p = PulseTuning::default();
    let mut calm = pulse_mapper();
    let mut morphing = pulse_mapper();
    for _ in 0..60 {
        morphing.update(
            RawControlReading {
                left: Some(0.5),
                right: None,
            },
            DT,
        );
    }
    assert!(morphing.state().smoothed_morph > p.friction_above);

    let mut last = (0.0, 0.0);
    for right in [0.07, 0.05] {
        let c = calm.update(spin_only(right), DT);
        let m = morphing.update(RawControlReading { left: Some(0.5), right: Some(right) }, DT);
        last = (c.spin_deg_per_s, m.spin_deg_per_s);
    }
    let (calm_speed, morph_speed) = last;
    assert!(calm_speed > 0.0);
    assert!((morph_speed - calm_speed * coast(p.morph_friction_rate, f64::from(DT))).abs() < 1e-6);
}

#[test]
fn velocity_mode_reports_its_speed() {
    let mut m = mapper(0.0);
    let s = m.update(RawControlReading::both(0.0, 1.0), DT);
    assert_eq!(s.spin_deg_per_s, 180.0);
    let s = m.update(RawControlReading::NONE, DT);
    assert_eq!(s.spin_deg_per_s, 0.0);
}
