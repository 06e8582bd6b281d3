//! Ion trap demo state: selection, laser pulses, entanglement, and cooling
//!
//! Controls map onto four actions ([`IonTrapDemo::cool_ions`],
//! [`IonTrapDemo::pulse_laser`] for π and π/2, [`IonTrapDemo::entangle_ions`])
//! plus click picking. Delayed consequences are driven by [`IonTrapDemo::step`]
//! from the render loop, so everything runs on one thread.

use crate::config::{rgba_from_hex, DemoConfig};
use crate::effects::{EffectEvent, EffectLayer};
use crate::error::ActionError;
use crate::ion::{appearance, chain_positions, Ion, IonId, QubitLevel, Tint};
use crate::pulse::PulseKind;
use crate::scheduler::{Scheduler, TimerHandle};
use crate::selection::{SelectionSet, Toggle};
use common::{Camera3D, Ray};
use glam::{Vec2, Vec3};
use log::{debug, info, warn};

pub const STATUS_IDLE: &str = "Idle";
pub const STATUS_COOLING: &str = "Cooling...";
pub const STATUS_GROUND: &str = "Idle (Ground State)";

/// Delayed events owned by the demo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoEvent {
    EntanglementEnded,
    CoolingFinished,
}

/// Trapped-ion chain plus everything the user can do to it
pub struct IonTrapDemo {
    config: DemoConfig,
    ions: Vec<Ion>,
    /// Level each ion's color currently reflects; lags `Ion::level` until its popup settles
    displayed_levels: Vec<QubitLevel>,
    selection: SelectionSet,
    status: String,
    /// Set while the entangling oscillation runs
    entangling: Option<(IonId, IonId)>,
    effects: EffectLayer,
    scheduler: Scheduler<DemoEvent>,
    entangle_timer: Option<TimerHandle>,
    cooling_timer: Option<TimerHandle>,
    state_latex: String,
    state_text: String,
    alert: Option<String>,
    time: f32,
}

impl IonTrapDemo {
    pub fn new(config: DemoConfig) -> Self {
        let ions: Vec<Ion> = chain_positions(config.ion_count, config.ion_spacing)
            .into_iter()
            .enumerate()
            .map(|(i, position)| Ion::new(IonId(i), position, &config))
            .collect();
        info!("Loaded {} ions into the trap", ions.len());

        let mut demo = Self {
            displayed_levels: vec![QubitLevel::Ground; ions.len()],
            config,
            ions,
            selection: SelectionSet::new(),
            status: STATUS_IDLE.to_string(),
            entangling: None,
            effects: EffectLayer::new(),
            scheduler: Scheduler::new(),
            entangle_timer: None,
            cooling_timer: None,
            state_latex: String::new(),
            state_text: String::new(),
            alert: None,
            time: 0.0,
        };
        demo.rebuild_state_labels();
        demo
    }

    // ============================================
    // Selection
    // ============================================

    /// Toggle selection of the ion under a click given in normalized device coordinates
    pub fn handle_click(&mut self, ndc: Vec2, camera: &Camera3D) -> Option<Toggle> {
        let ray = camera.ray_from_ndc(ndc);
        let id = self.pick(&ray)?;
        Some(self.toggle_selection(id))
    }

    /// Nearest ion hit by the ray
    pub fn pick(&self, ray: &Ray) -> Option<IonId> {
        self.ions
            .iter()
            .filter_map(|ion| {
                let radius = self.config.ion_radius * ion.appearance.scale;
                ray.intersect_sphere(ion.display_position, radius)
                    .map(|t| (t, ion.id()))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
    }

    /// Add or remove an ion from the selection; a third pick is refused
    pub fn toggle_selection(&mut self, id: IonId) -> Toggle {
        if id.0 >= self.ions.len() {
            return Toggle::Rejected;
        }

        let outcome = self.selection.toggle(id);
        match outcome {
            Toggle::Added => debug!("Selected ion {}", id),
            Toggle::Removed => debug!("Deselected ion {}", id),
            Toggle::Rejected => info!(
                "Ion {} not selected: already holding {} ions",
                id,
                self.selection.len()
            ),
        }
        self.refresh(id);
        outcome
    }

    // ============================================
    // Actions
    // ============================================

    /// Fire a pulse by name ("pi" or "half-pi")
    pub fn pulse_laser_named(&mut self, name: &str) -> Result<(), ActionError> {
        match name.parse::<PulseKind>() {
            Ok(kind) => self.pulse_laser(kind),
            Err(err) => self.fail(err),
        }
    }

    /// Drive every selected ion with a laser pulse, then release them from the selection
    pub fn pulse_laser(&mut self, kind: PulseKind) -> Result<(), ActionError> {
        if self.selection.is_empty() {
            return self.fail(ActionError::EmptySelection);
        }

        let targets = self.selection.ids().to_vec();
        let beam_color = rgba_from_hex(kind.beam_color(&self.config), 0.9);

        for &id in &targets {
            let ion = &mut self.ions[id.0];
            let previous = ion.level;
            let next = kind.apply(previous);
            let position = ion.display_position;

            self.effects.spawn_beam(
                id,
                self.config.laser_anchor,
                position,
                beam_color,
                self.config.beam_duration,
            );
            self.effects.spawn_popup(
                id,
                position + Vec3::Y * self.config.popup_height,
                kind,
                previous,
                next,
                appearance(previous, false, Tint::Level, &self.config).color,
                appearance(next, false, Tint::Level, &self.config).color,
                self.config.popup_rise,
                self.config.popup_duration,
            );

            ion.level = next;
            info!("{} on ion {}: {:?} -> {:?}", kind.label(), id, previous, next);
        }

        self.rebuild_state_labels();

        for id in targets {
            self.selection.remove(id);
            self.refresh(id);
        }
        Ok(())
    }

    /// Link the two selected ions with a shared color and a connecting arc
    pub fn entangle_ions(&mut self) -> Result<(), ActionError> {
        let Some((a, b)) = self.selection.pair() else {
            return self.fail(ActionError::WrongSelectionCount {
                got: self.selection.len(),
            });
        };

        if let Some(handle) = self.entangle_timer.take() {
            if self.scheduler.cancel(handle) {
                debug!("Superseding pending entanglement");
            }
        }

        self.entangling = Some((a, b));
        for id in [a, b] {
            self.ions[id.0].tint = Tint::Entangled;
            self.refresh(id);
        }

        self.effects.spawn_curve(
            (a, b),
            self.ions[a.0].display_position,
            self.ions[b.0].display_position,
            self.config.curve_lift,
            self.config.curve_segments,
            rgba_from_hex(self.config.entangled_color, 0.9),
            self.config.curve_duration,
        );

        self.entangle_timer = Some(
            self.scheduler
                .schedule(self.config.entangle_duration, DemoEvent::EntanglementEnded),
        );
        info!("Entangling ions {} and {}", a, b);
        Ok(())
    }

    /// Laser-cool the whole chain back to the ground state
    pub fn cool_ions(&mut self) {
        self.status = STATUS_COOLING.to_string();

        if let Some(handle) = self.cooling_timer.take() {
            if self.scheduler.cancel(handle) {
                debug!("Restarting cooling cycle");
            }
        }

        let margin = Vec3::X * self.config.ion_spacing;
        let (start, end) = match (self.ions.first(), self.ions.last()) {
            (Some(first), Some(last)) => (first.base_position() - margin, last.base_position() + margin),
            _ => (-margin, margin),
        };
        self.effects.spawn_wash(
            start,
            end,
            self.config.ion_radius * 2.5,
            rgba_from_hex(self.config.wash_color, 0.25),
            self.config.wash_duration,
        );

        self.cooling_timer = Some(
            self.scheduler
                .schedule(self.config.cooling_delay, DemoEvent::CoolingFinished),
        );
        info!("Cooling {} ions", self.ions.len());
    }

    // ============================================
    // Frame update
    // ============================================

    /// Advance effects and timers by `dt` seconds and update display positions
    pub fn step(&mut self, dt: f32) {
        self.time += dt;

        for event in self.effects.step(dt) {
            match event {
                EffectEvent::PopupSettled(id) => self.settle_color(id),
            }
        }

        for event in self.scheduler.advance(dt) {
            match event {
                DemoEvent::EntanglementEnded => self.finish_entanglement(),
                DemoEvent::CoolingFinished => self.finish_cooling(),
            }
        }

        let offset = Vec3::Y
            * self.config.oscillation_amplitude
            * (self.time * self.config.oscillation_frequency).sin();
        for ion in &mut self.ions {
            let oscillating = self
                .entangling
                .is_some_and(|(a, b)| ion.id() == a || ion.id() == b);
            ion.display_position = if oscillating {
                ion.base_position() + offset
            } else {
                ion.base_position()
            };
        }
    }

    fn settle_color(&mut self, id: IonId) {
        if let Some(ion) = self.ions.get_mut(id.0) {
            self.displayed_levels[id.0] = ion.level;
            ion.tint = Tint::Level;
        }
        self.refresh(id);
    }

    fn finish_entanglement(&mut self) {
        self.entangle_timer = None;
        self.entangling = None;
        self.selection.clear();
        // Tint is left as is: entangled ions keep their color until repainted
        for i in 0..self.ions.len() {
            self.refresh(IonId(i));
        }
        info!("Entanglement window closed");
    }

    fn finish_cooling(&mut self) {
        self.cooling_timer = None;
        self.effects.clear_popups();
        for (ion, displayed) in self.ions.iter_mut().zip(self.displayed_levels.iter_mut()) {
            ion.level = QubitLevel::Ground;
            ion.tint = Tint::Level;
            *displayed = QubitLevel::Ground;
        }
        for i in 0..self.ions.len() {
            self.refresh(IonId(i));
        }
        self.status = STATUS_GROUND.to_string();
        self.rebuild_state_labels();
        info!("All ions cooled to the ground state");
    }

    fn refresh(&mut self, id: IonId) {
        let selected = self.selection.contains(id);
        if let Some(ion) = self.ions.get_mut(id.0) {
            ion.appearance = appearance(self.displayed_levels[id.0], selected, ion.tint, &self.config);
        }
    }

    fn rebuild_state_labels(&mut self) {
        self.state_latex = self
            .ions
            .iter()
            .map(|ion| ion.level.latex_ket())
            .collect::<Vec<_>>()
            .join(r" \otimes ");
        self.state_text = self
            .ions
            .iter()
            .map(|ion| ion.level.ket())
            .collect::<Vec<_>>()
            .join(" ⊗ ");
    }

    fn fail(&mut self, err: ActionError) -> Result<(), ActionError> {
        warn!("{}", err);
        self.alert = Some(err.to_string());
        Err(err)
    }

    // ============================================
    // Accessors
    // ============================================

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn ions(&self) -> &[Ion] {
        &self.ions
    }

    pub fn ion(&self, id: IonId) -> Option<&Ion> {
        self.ions.get(id.0)
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_label(&self) -> String {
        self.selection.label()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Tensor product of every ion's ket, as LaTeX
    pub fn state_latex(&self) -> &str {
        &self.state_latex
    }

    /// Tensor product of every ion's ket, as Unicode
    pub fn state_text(&self) -> &str {
        &self.state_text
    }

    pub fn effects(&self) -> &EffectLayer {
        &self.effects
    }

    pub fn is_entangling(&self) -> bool {
        self.entangling.is_some()
    }

    pub fn entangled_pair(&self) -> Option<(IonId, IonId)> {
        self.entangling
    }

    pub fn is_cooling(&self) -> bool {
        self.cooling_timer.is_some()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Take the pending alert message, if any
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }
}

impl Default for IonTrapDemo {
    fn default() -> Self {
        Self::new(DemoConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(demo: &mut IonTrapDemo, ids: &[usize]) {
        for &i in ids {
            assert_eq!(demo.toggle_selection(IonId(i)), Toggle::Added);
        }
    }

    fn run(demo: &mut IonTrapDemo, seconds: f32) {
        let steps = (seconds / 0.05).ceil() as usize;
        for _ in 0..steps {
            demo.step(0.05);
        }
    }

    #[test]
    fn test_ions_have_unique_stable_ids() {
        let demo = IonTrapDemo::default();
        for (i, ion) in demo.ions().iter().enumerate() {
            assert_eq!(ion.id(), IonId(i));
        }
        assert_eq!(demo.ions().len(), 5);
        assert_eq!(demo.status(), STATUS_IDLE);
    }

    #[test]
    fn test_highlight_follows_selection() {
        let mut demo = IonTrapDemo::default();
        let plain = demo.ion(IonId(1)).unwrap().appearance;
        demo.toggle_selection(IonId(1));
        let picked = demo.ion(IonId(1)).unwrap().appearance;
        assert!(picked.scale > plain.scale);
        demo.toggle_selection(IonId(1));
        assert_eq!(demo.ion(IonId(1)).unwrap().appearance, plain);
    }

    #[test]
    fn test_out_of_range_id_rejected() {
        let mut demo = IonTrapDemo::default();
        assert_eq!(demo.toggle_selection(IonId(99)), Toggle::Rejected);
        assert!(demo.selection().is_empty());
    }

    #[test]
    fn test_pulse_without_selection_alerts() {
        let mut demo = IonTrapDemo::default();
        assert_eq!(demo.pulse_laser(PulseKind::Pi), Err(ActionError::EmptySelection));
        assert!(demo.take_alert().is_some());
        assert!(demo.take_alert().is_none());
        assert!(demo.effects().is_empty());
        assert!(demo.ions().iter().all(|ion| ion.level == QubitLevel::Ground));
    }

    #[test]
    fn test_unknown_pulse_name_alerts() {
        let mut demo = IonTrapDemo::default();
        select(&mut demo, &[0]);
        assert!(demo.pulse_laser_named("two-pi").is_err());
        assert!(demo.alert().is_some());
        assert!(demo.selection().contains(IonId(0)));
    }

    #[test]
    fn test_pulse_color_waits_for_popup() {
        let mut demo = IonTrapDemo::default();
        let ground_color = demo.ion(IonId(3)).unwrap().appearance.color;
        select(&mut demo, &[3]);
        demo.pulse_laser(PulseKind::Pi).unwrap();

        assert_eq!(demo.ion(IonId(3)).unwrap().level, QubitLevel::Excited);
        assert_eq!(demo.ion(IonId(3)).unwrap().appearance.color, ground_color);
        assert!(demo.selection().is_empty());
        assert_eq!(demo.effects().beams.len(), 1);
        assert_eq!(demo.effects().popups.len(), 1);

        let seconds = demo.config().popup_rise + 0.1;
        run(&mut demo, seconds);
        let excited = appearance(QubitLevel::Excited, false, Tint::Level, demo.config());
        assert_eq!(demo.ion(IonId(3)).unwrap().appearance, excited);
    }

    #[test]
    fn test_latex_label_covers_every_ion() {
        let mut demo = IonTrapDemo::default();
        select(&mut demo, &[1]);
        demo.pulse_laser(PulseKind::Pi).unwrap();
        select(&mut demo, &[4]);
        demo.pulse_laser(PulseKind::HalfPi).unwrap();
        assert_eq!(
            demo.state_latex(),
            r"|0\rangle \otimes |1\rangle \otimes |0\rangle \otimes |0\rangle \otimes |+\rangle"
        );
        assert_eq!(demo.state_text(), "|0⟩ ⊗ |1⟩ ⊗ |0⟩ ⊗ |0⟩ ⊗ |+⟩");
    }

    #[test]
    fn test_entangle_requires_pair() {
        let mut demo = IonTrapDemo::default();
        select(&mut demo, &[2]);
        assert_eq!(
            demo.entangle_ions(),
            Err(ActionError::WrongSelectionCount { got: 1 })
        );
        assert!(!demo.is_entangling());
        assert!(demo.ions().iter().all(|ion| ion.tint == Tint::Level));
        assert!(demo.effects().curves.is_empty());
    }

    #[test]
    fn test_entangled_ions_oscillate_around_rest() {
        let mut demo = IonTrapDemo::default();
        select(&mut demo, &[0, 1]);
        demo.entangle_ions().unwrap();
        demo.step(0.1);

        let a = demo.ion(IonId(0)).unwrap();
        let b = demo.ion(IonId(1)).unwrap();
        let c = demo.ion(IonId(2)).unwrap();
        assert_ne!(a.display_position, a.base_position());
        assert_eq!(
            a.display_position - a.base_position(),
            b.display_position - b.base_position()
        );
        assert_eq!(c.display_position, c.base_position());

        let seconds = demo.config().entangle_duration;
        run(&mut demo, seconds);
        let a = demo.ion(IonId(0)).unwrap();
        assert_eq!(a.display_position, a.base_position());
    }

    #[test]
    fn test_reentangling_cancels_previous_timer() {
        let mut demo = IonTrapDemo::default();
        select(&mut demo, &[0, 1]);
        demo.entangle_ions().unwrap();
        run(&mut demo, 2.0);

        // Pair is still selected; entangle again partway through
        demo.entangle_ions().unwrap();
        run(&mut demo, 1.5);
        assert!(demo.is_entangling(), "first timer must not end the second entanglement");
        assert_eq!(demo.selection().len(), 2);

        run(&mut demo, 1.6);
        assert!(!demo.is_entangling());
        assert!(demo.selection().is_empty());
    }

    #[test]
    fn test_pulse_repaints_entangled_ion() {
        let mut demo = IonTrapDemo::default();
        select(&mut demo, &[0, 1]);
        demo.entangle_ions().unwrap();
        let seconds = demo.config().entangle_duration + 0.1;
        run(&mut demo, seconds);
        assert_eq!(demo.ion(IonId(0)).unwrap().tint, Tint::Entangled);

        select(&mut demo, &[0]);
        demo.pulse_laser(PulseKind::HalfPi).unwrap();
        let seconds = demo.config().popup_duration;
        run(&mut demo, seconds);
        let ion = demo.ion(IonId(0)).unwrap();
        assert_eq!(ion.tint, Tint::Level);
        assert_eq!(
            ion.appearance,
            appearance(QubitLevel::Superposition, false, Tint::Level, demo.config())
        );
        assert_eq!(demo.ion(IonId(1)).unwrap().tint, Tint::Entangled);
    }

    #[test]
    fn test_cooling_resets_everything_but_selection() {
        let mut demo = IonTrapDemo::default();
        select(&mut demo, &[1, 3]);
        demo.pulse_laser(PulseKind::Pi).unwrap();
        select(&mut demo, &[2]);

        demo.cool_ions();
        assert_eq!(demo.status(), STATUS_COOLING);
        assert!(demo.is_cooling());
        assert_eq!(demo.effects().washes.len(), 1);

        let seconds = demo.config().cooling_delay + 0.05;
        run(&mut demo, seconds);
        assert_eq!(demo.status(), STATUS_GROUND);
        assert!(!demo.is_cooling());
        assert!(demo.ions().iter().all(|ion| ion.level == QubitLevel::Ground));
        assert_eq!(demo.selection().ids(), &[IonId(2)]);
        assert!(demo.ion(IonId(2)).unwrap().appearance.scale > 1.0);
        assert!(demo.state_latex().split(r" \otimes ").all(|k| k == r"|0\rangle"));
    }

    #[test]
    fn test_recooling_restarts_delay() {
        let mut demo = IonTrapDemo::default();
        demo.cool_ions();
        run(&mut demo, 0.6);
        demo.cool_ions();
        run(&mut demo, 0.6);
        assert_eq!(demo.status(), STATUS_COOLING);
        run(&mut demo, 0.5);
        assert_eq!(demo.status(), STATUS_GROUND);
    }
}
