use crossterm::event::KeyCode;
use rose_bloom::control::RawControlReading;
use rose_bloom::source::{ControlSource, DemoSource, KeyboardSource, ReplayError, ReplayScript, ReplaySource};

const SCRIPT: &str = "\
# seconds left right
0.0 0.0 -
1.0 0.2 0.1   # both hands up
2.0 -   0.3
";

fn close(a: Option<f32>, b: f32) -> bool {
    a.is_some_and(|v| (v - b).abs() < 1e-5)
}

// ── Replay ──────────────────────────────────────────────────────────────────

#[test]
fn replay_parses_comments_and_absent_channels() {
    let script = ReplayScript::parse(SCRIPT).unwrap();
    assert_eq!(script.len(), 3);
    assert!(!script.is_empty());
    assert_eq!(script.span_s(), 2.0);
    assert_eq!(script.sample(0.0), RawControlReading { left: Some(0.0), right: None });
}

#[test]
fn replay_interpolates_present_channels() {
    let script = ReplayScript::parse(SCRIPT).unwrap();
    let mid = script.sample(0.5);
    assert!(close(mid.left, 0.1));
    // Right is absent at 0.0, so the earlier keyframe holds.
    assert_eq!(mid.right, None);

    let later = script.sample(1.5);
    assert!(close(later.left, 0.2), "left holds when the next frame drops it");
    assert!(close(later.right, 0.2));
}

#[test]
fn replay_clamps_outside_the_keyframes() {
    let script = ReplayScript::parse(SCRIPT).unwrap();
    assert_eq!(script.sample(-3.0), script.sample(0.0));
    assert_eq!(script.sample(9.0), RawControlReading { left: None, right: Some(0.3) });
}

#[test]
fn replay_sorts_out_of_order_lines() {
    let script = ReplayScript::parse("2 0.4 0.4\n0 0 0\n").unwrap();
    assert!(close(script.sample(1.0).left, 0.2));
}

#[test]
fn replay_errors_carry_line_numbers() {
    let err = ReplayScript::parse("# header\n0 0 0\n0.5 x 0\n").unwrap_err();
    match err {
        ReplayError::Parse { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        ReplayScript::parse("0.0 0.5"),
        Err(ReplayError::Parse { line: 1, .. })
    ));
    assert!(matches!(
        ReplayScript::parse("abc 0 0"),
        Err(ReplayError::Parse { line: 1, .. })
    ));
    assert!(matches!(
        ReplayScript::parse("-1 0 0"),
        Err(ReplayError::Parse { line: 1, .. })
    ));
    let out_of_range = ReplayScript::parse("0 1.5 0").unwrap_err();
    assert!(out_of_range.to_string().contains("within [0, 1]"), "{out_of_range}");
}

#[test]
fn replay_without_keyframes_is_empty() {
    assert!(matches!(ReplayScript::parse(""), Err(ReplayError::Empty)));
    assert!(matches!(ReplayScript::parse("# nothing\n\n"), Err(ReplayError::Empty)));
}

#[test]
fn replay_missing_file_is_io_error() {
    let path = std::env::temp_dir().join("rose-bloom-no-such-replay.txt");
    assert!(matches!(ReplayScript::load(&path), Err(ReplayError::Io(_))));
}

#[test]
fn replay_source_loops_over_the_script_span() {
    let script = ReplayScript::parse(SCRIPT).unwrap();
    let mut looping = ReplaySource::new(script.clone(), true);
    assert_eq!(looping.label(), "replay");
    assert!(close(looping.read(2.5).left, 0.1));

    let mut once = ReplaySource::new(script, false);
    assert_eq!(once.read(2.5), RawControlReading { left: None, right: Some(0.3) });
}

// ── Demo ────────────────────────────────────────────────────────────────────

#[test]
fn demo_is_a_pure_function_of_time() {
    let mut a = DemoSource::new();
    let mut b = DemoSource::new();
    for i in 0..200 {
        let t = i as f64 * 0.37;
        assert_eq!(a.read(t), b.read(t));
    }
    assert_eq!(a.label(), "demo");
}

#[test]
fn demo_drops_each_hand_periodically() {
    let demo = DemoSource::new();
    let lost_left = demo.sample(21.0);
    assert_eq!(lost_left.left, None);
    assert!(lost_left.right.is_some());

    let lost_right = demo.sample(30.0);
    assert!(lost_right.left.is_some());
    assert_eq!(lost_right.right, None);

    let steady = DemoSource::without_gaps();
    for t in [21.0, 30.0] {
        let r = steady.sample(t);
        assert!(r.left.is_some() && r.right.is_some());
    }
}

#[test]
fn demo_readings_stay_non_negative() {
    let demo = DemoSource::without_gaps();
    for i in 0..1000 {
        let r = demo.sample(i as f64 * 0.1);
        assert!(r.left.is_some_and(|v| v >= 0.0));
        assert!(r.right.is_some_and(|v| v >= 0.0));
    }
}

// ── Keyboard ────────────────────────────────────────────────────────────────

#[test]
fn keyboard_nudges_each_hand() {
    let mut kb = KeyboardSource::new();
    assert_eq!(kb.label(), "keyboard");
    assert_eq!(kb.read(0.0), RawControlReading::both(0.0, 0.0));

    for _ in 0..3 {
        assert!(kb.handle_key(KeyCode::Char('a')));
    }
    assert!(kb.handle_key(KeyCode::Char('k')));
    let r = kb.read(0.0);
    assert!(close(r.left, 0.06));
    assert!(close(r.right, 0.02));

    kb.handle_key(KeyCode::Char('z'));
    kb.handle_key(KeyCode::Char('m'));
    kb.handle_key(KeyCode::Char('m'));
    let r = kb.read(0.0);
    assert!(close(r.left, 0.04));
    assert_eq!(r.right, Some(0.0), "floor at zero");
}

#[test]
fn keyboard_toggles_presence_and_resets() {
    let mut kb = KeyboardSource::new();
    kb.handle_key(KeyCode::Char('a'));
    kb.handle_key(KeyCode::Char('x'));
    assert_eq!(kb.read(0.0).left, None);
    kb.handle_key(KeyCode::Char(','));
    assert_eq!(kb.read(0.0), RawControlReading::NONE);
    kb.handle_key(KeyCode::Char('x'));
    assert!(close(kb.read(0.0).left, 0.02), "value survives a toggle");

    kb.handle_key(KeyCode::Char('0'));
    assert_eq!(kb.read(0.0).left, Some(0.0));
}

#[test]
fn keyboard_ignores_unrelated_keys_and_has_a_preview() {
    let mut kb = KeyboardSource::new();
    assert!(!kb.handle_key(KeyCode::Char('q')));
    assert!(!kb.handle_key(KeyCode::Enter));
    let preview = kb.preview().expect("keyboard preview");
    assert!(preview.width > 0 && preview.height > 0);
    assert_eq!(preview.rgb.len(), preview.width * preview.height * 3);
}
