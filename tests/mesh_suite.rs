use rose_bloom::config::PresetKind;
use rose_bloom::flower::{
    generate, generate_into, BaseMesh, ColorPolicy, Droop, FlowerPreset, Grid, MeshSpec, PetalCut, Ripple,
    SeedPattern, ShapeConstants,
};

fn small_spec(kind: PresetKind) -> MeshSpec {
    let mut spec = FlowerPreset::new(kind).mesh_spec();
    // Same shape, coarser lattice keeps the suite quick.
    spec.grid.radial_steps = 8;
    spec.grid.angular_steps = 96;
    spec
}

fn all_finite(mesh: &BaseMesh) -> bool {
    mesh.vertices.iter().all(|v| v.position.is_finite())
        && mesh.colors.iter().flatten().all(|c| c.is_finite())
        && mesh.seeds.iter().flatten().all(|s| s.is_finite())
}

#[test]
fn generation_is_deterministic() {
    for kind in PresetKind::all() {
        let spec = small_spec(kind);
        let a = generate(&spec);
        let b = generate(&spec);
        assert_eq!(a, b, "{kind:?} mesh differs between runs");
    }
}

#[test]
fn generate_into_matches_fresh_generation() {
    let spec = small_spec(PresetKind::Dispersal);
    let mut reused = generate(&small_spec(PresetKind::Bloom));
    generate_into(&spec, &mut reused);
    assert_eq!(reused, generate(&spec));
}

#[test]
fn vertex_counts_follow_the_grid() {
    let open = Grid {
        radial_steps: 40,
        angular_steps: 1200,
        angular_span_deg: 3600.0,
        closed_end: false,
    };
    assert_eq!(open.rows(), 41);
    assert_eq!(open.columns(), 1200);
    assert_eq!(open.vertex_count(), 49_200);

    let closed = Grid { closed_end: true, ..open };
    assert_eq!(closed.columns(), 1201);
    assert_eq!(closed.theta_deg(1200), 3600.0);

    for preset in FlowerPreset::all() {
        let mesh = generate(&preset.mesh_spec());
        assert_eq!(mesh.len(), preset.grid.vertex_count(), "{}", preset.name);
        assert_eq!(mesh.rows * mesh.columns, mesh.len());
        // Keep every preset inside a real-time CPU budget.
        assert!(mesh.len() <= 60_000, "{} has {} vertices", preset.name, mesh.len());
    }
}

#[test]
fn radius_param_stays_in_unit_range_and_is_row_major() {
    let spec = small_spec(PresetKind::Melt);
    let mesh = generate(&spec);
    assert!(mesh.vertices.iter().all(|v| (0.0..=1.0).contains(&v.rho)));
    assert_eq!(mesh.vertices.first().map(|v| v.rho), Some(0.0));
    assert_eq!(mesh.vertices.last().map(|v| v.rho), Some(1.0));
    // ρ is constant along a row.
    let row = &mesh.vertices[mesh.columns..2 * mesh.columns];
    assert!(row.iter().all(|v| v.rho == row[0].rho));
}

#[test]
fn no_nan_anywhere_including_origin() {
    for kind in PresetKind::all() {
        let mesh = generate(&small_spec(kind));
        assert!(all_finite(&mesh), "{kind:?} produced a non-finite value");
    }
    let shape = FlowerPreset::new(PresetKind::Dispersal).shape;
    let origin = shape.point(0.0, 0.0);
    assert!(origin.is_finite());
    // ρ = 0 collapses the cross-section onto the axis.
    assert!(origin.length() < 1e-6);
}

#[test]
fn petal_cut_is_periodic() {
    let cuts = [
        PetalCut::Scallop { alignment: 3.6 },
        PetalCut::Folded {
            base: 0.75,
            alignment: 2.75,
        },
        PetalCut::Fringed {
            base: 0.6,
            alignment: 9.75,
            fringe: 420.0,
            divisor: 3000.0,
        },
    ];
    for cut in cuts {
        let period = cut.period_deg();
        for step in 0..200 {
            let theta = step as f64 * 17.3;
            let a = cut.eval(theta);
            let b = cut.eval(theta + period);
            assert!((a - b).abs() < 1e-6, "{cut:?} at {theta}: {a} vs {b}");
        }
    }
}

#[test]
fn scallop_cut_envelope() {
    let cut = PetalCut::Scallop { alignment: 1.0 };
    // Petal tip (wrapped 180°): 1 - ½·(−¼)² = 0.96875.
    assert!((cut.eval(180.0) - 0.96875).abs() < 1e-12);
    // Petal notch (wrapped 0°): 1 - ½·1² = 0.5.
    assert!((cut.eval(0.0) - 0.5).abs() < 1e-12);
}

#[test]
fn phase_decays_toward_vertical() {
    let shape = FlowerPreset::new(PresetKind::Melt).shape;
    assert_eq!(shape.phi_deg(0.0), shape.opening_deg);
    let later = shape.phi_deg(2880.0);
    assert!((later - 90.0 * (-1.0f64).exp()).abs() < 1e-9);
    assert!(shape.phi_deg(3000.0) < shape.phi_deg(100.0));
}

#[test]
fn droop_uses_integer_powers() {
    let droop = Droop {
        gain: 2.0,
        knee: 1.3,
        rho_power: 2,
        knee_power: 2,
    };
    let rho: f64 = 0.5;
    let phi = std::f64::consts::FRAC_PI_2;
    let expected = 2.0 * rho * rho * (1.3 * rho - 1.0).powi(2);
    assert!((droop.eval(rho, phi) - expected).abs() < 1e-12);
    assert_eq!(droop.eval(0.0, phi), 0.0);
}

#[test]
fn dispersal_seeds_follow_the_index_formula() {
    let mesh = generate(&small_spec(PresetKind::Dispersal));
    let seeds = mesh.seeds.as_ref().expect("dispersal preset carries seeds");
    assert_eq!(seeds.len(), mesh.len());
    for i in [0usize, 1, 7, 500] {
        let x = i as f64;
        let expected = glam::Vec3::new(
            (x * 12.9898).sin() as f32,
            (x * 78.233).cos() as f32,
            (x * 37.719).sin() as f32,
        );
        assert_eq!(seeds[i], expected);
        assert_eq!(SeedPattern::CLASSIC.direction(i), expected);
    }
    assert_eq!(seeds[0], glam::Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn baked_colors_only_when_requested() {
    let melt = generate(&small_spec(PresetKind::Melt));
    assert!(melt.colors.is_some());
    assert!(melt.seeds.is_none());

    let sand = generate(&small_spec(PresetKind::Dispersal));
    assert!(sand.colors.is_none(), "dispersal colors are live");
}

#[test]
fn radial_lerp_policy_tracks_rho() {
    let inner = glam::Vec3::new(1.0, 0.0, 0.0);
    let outer = glam::Vec3::new(0.0, 0.0, 1.0);
    let spec = MeshSpec {
        grid: Grid {
            radial_steps: 4,
            angular_steps: 8,
            angular_span_deg: 720.0,
            closed_end: false,
        },
        shape: ShapeConstants {
            opening_deg: 90.0,
            petal_decay_deg: 1440.0,
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
            world_scale: 1.0,
        },
        baked_colors: Some(ColorPolicy::RadialLerp { inner, outer }),
        seeds: None,
    };
    let mesh = generate(&spec);
    let colors = mesh.colors.as_ref().expect("baked colors");
    assert_eq!(colors[0], inner);
    assert_eq!(colors[mesh.len() - 1], outer);
    let mid = colors[2 * mesh.columns];
    assert!((mid - glam::Vec3::new(0.5, 0.0, 0.5)).length() < 1e-6);
}
