//! End-to-end interaction scenarios driven through clicks and actions

use common::Camera3D;
use glam::Vec2;
use ion_trap::config::rgba_from_hex;
use ion_trap::demo::STATUS_GROUND;
use ion_trap::ion::Tint;
use ion_trap::{ActionError, DemoConfig, IonId, IonTrapDemo, PulseKind, QubitLevel, Toggle};

fn camera() -> Camera3D {
    let mut camera = Camera3D::new(16.0 / 9.0);
    camera.distance = 12.0;
    camera.update_orbital();
    camera
}

/// Click the screen point where the given ion is drawn
fn click_ion(demo: &mut IonTrapDemo, camera: &Camera3D, id: usize) -> Option<Toggle> {
    let position = demo.ion(IonId(id)).unwrap().display_position;
    let ndc = camera.project_to_ndc(position).unwrap();
    demo.handle_click(ndc, camera)
}

fn run(demo: &mut IonTrapDemo, seconds: f32) {
    let dt = 1.0 / 60.0;
    let steps = (seconds / dt).ceil() as usize;
    for _ in 0..steps {
        demo.step(dt);
    }
}

#[test]
fn test_click_selects_and_labels() {
    let camera = camera();
    let mut demo = IonTrapDemo::new(DemoConfig::default());
    let ids: Vec<_> = demo.ions().iter().map(|ion| ion.id()).collect();
    assert_eq!(ids, (0..5).map(IonId).collect::<Vec<_>>());

    assert_eq!(click_ion(&mut demo, &camera, 2), Some(Toggle::Added));
    assert_eq!(demo.selection().ids(), &[IonId(2)]);
    assert_eq!(demo.selection_label(), "2");
}

#[test]
fn test_second_click_deselects() {
    let camera = camera();
    let mut demo = IonTrapDemo::default();
    click_ion(&mut demo, &camera, 2);
    assert_eq!(click_ion(&mut demo, &camera, 2), Some(Toggle::Removed));
    assert!(demo.selection().is_empty());
    assert_eq!(demo.selection_label(), "None");
}

#[test]
fn test_third_click_is_rejected() {
    let camera = camera();
    let mut demo = IonTrapDemo::default();
    click_ion(&mut demo, &camera, 2);
    click_ion(&mut demo, &camera, 4);
    assert_eq!(click_ion(&mut demo, &camera, 0), Some(Toggle::Rejected));
    assert_eq!(demo.selection().ids(), &[IonId(2), IonId(4)]);
    assert_eq!(demo.selection_label(), "2, 4");
    assert!(demo.alert().is_none(), "rejection is a log notice, not an alert");
}

#[test]
fn test_click_on_empty_space_is_ignored() {
    let camera = camera();
    let mut demo = IonTrapDemo::default();
    assert_eq!(demo.handle_click(Vec2::new(0.0, 0.95), &camera), None);
    assert!(demo.selection().is_empty());
}

#[test]
fn test_pi_pulse_excites_ground_ion() {
    let camera = camera();
    let mut demo = IonTrapDemo::default();
    click_ion(&mut demo, &camera, 3);
    demo.pulse_laser(PulseKind::Pi).unwrap();
    let seconds = demo.config().popup_duration + 0.1;
    run(&mut demo, seconds);

    assert_eq!(demo.ion(IonId(3)).unwrap().level, QubitLevel::Excited);
    assert!(demo.selection().is_empty());
    assert!(demo.effects().is_empty());
}

#[test]
fn test_half_pi_pulse_from_excited() {
    let mut demo = IonTrapDemo::default();
    demo.toggle_selection(IonId(1));
    demo.pulse_laser_named("pi").unwrap();
    assert_eq!(demo.ion(IonId(1)).unwrap().level, QubitLevel::Excited);

    demo.toggle_selection(IonId(1));
    demo.pulse_laser_named("half-pi").unwrap();
    assert_eq!(demo.ion(IonId(1)).unwrap().level, QubitLevel::Superposition);

    // π on a superposition falls back to ground
    demo.toggle_selection(IonId(1));
    demo.pulse_laser(PulseKind::Pi).unwrap();
    assert_eq!(demo.ion(IonId(1)).unwrap().level, QubitLevel::Ground);
}

#[test]
fn test_entangle_colors_now_and_clears_later() {
    let camera = camera();
    let mut demo = IonTrapDemo::default();
    click_ion(&mut demo, &camera, 0);
    click_ion(&mut demo, &camera, 1);

    demo.entangle_ions().unwrap();
    let entangled = rgba_from_hex(demo.config().entangled_color, 1.0);
    for id in [0, 1] {
        let ion = demo.ion(IonId(id)).unwrap();
        assert_eq!(ion.appearance.color, entangled);
        assert_eq!(ion.appearance.emissive, entangled);
    }
    assert_eq!(demo.effects().curves.len(), 1);

    let seconds = demo.config().curve_duration + 0.1;
    run(&mut demo, seconds);
    assert!(demo.effects().curves.is_empty());
    assert!(demo.is_entangling());

    let seconds = demo.config().entangle_duration - demo.config().curve_duration;
    run(&mut demo, seconds);
    assert!(!demo.is_entangling());
    assert!(demo.selection().is_empty());
    for id in [0, 1] {
        let ion = demo.ion(IonId(id)).unwrap();
        assert_eq!(ion.appearance.scale, 1.0);
        assert_eq!(ion.appearance.color, entangled, "entangled color is kept");
        assert_eq!(ion.tint, Tint::Entangled);
    }
}

#[test]
fn test_entangle_with_one_ion_changes_nothing() {
    let mut demo = IonTrapDemo::default();
    demo.toggle_selection(IonId(4));
    let before: Vec<_> = demo.ions().iter().map(|ion| ion.appearance).collect();

    assert_eq!(
        demo.entangle_ions(),
        Err(ActionError::WrongSelectionCount { got: 1 })
    );
    assert!(demo.take_alert().is_some());
    let after: Vec<_> = demo.ions().iter().map(|ion| ion.appearance).collect();
    assert_eq!(before, after);
    assert_eq!(demo.selection().ids(), &[IonId(4)]);
}

#[test]
fn test_cool_returns_chain_to_ground() {
    let mut demo = IonTrapDemo::default();
    demo.toggle_selection(IonId(0));
    demo.toggle_selection(IonId(2));
    demo.pulse_laser(PulseKind::HalfPi).unwrap();
    demo.toggle_selection(IonId(0));
    demo.toggle_selection(IonId(2));
    demo.entangle_ions().unwrap();

    demo.cool_ions();
    let seconds = demo.config().cooling_delay + 0.1;
    run(&mut demo, seconds);

    assert_eq!(demo.status(), STATUS_GROUND);
    assert!(demo.ions().iter().all(|ion| ion.level == QubitLevel::Ground));
    assert!(demo.ions().iter().all(|ion| ion.tint == Tint::Level));
}

#[test]
fn test_base_positions_never_move() {
    let mut demo = IonTrapDemo::default();
    let rest: Vec<_> = demo.ions().iter().map(|ion| ion.base_position()).collect();

    demo.toggle_selection(IonId(1));
    demo.toggle_selection(IonId(3));
    demo.entangle_ions().unwrap();
    for _ in 0..30 {
        demo.step(1.0 / 60.0);
        let now: Vec<_> = demo.ions().iter().map(|ion| ion.base_position()).collect();
        assert_eq!(now, rest);
    }
}
