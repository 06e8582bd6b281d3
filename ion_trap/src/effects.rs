//! Transient visual effects: pulse beams, energy popups, the entanglement curve, and the cooling wash
//!
//! Effects are plain data. The renderer and the egui overlay read them every
//! frame; [`EffectLayer::step`] ages them and reports completions back to the demo.

use crate::ion::{IonId, QubitLevel};
use crate::pulse::{rung_height, PulseKind};
use crate::tween::{Easing, Tween};
use glam::Vec3;

/// Age of an effect against its fixed lifetime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    pub age: f32,
    pub duration: f32,
}

impl Lifetime {
    pub fn new(duration: f32) -> Self {
        Self { age: 0.0, duration }
    }

    pub fn step(&mut self, dt: f32) {
        self.age += dt;
    }

    pub fn expired(&self) -> bool {
        self.age >= self.duration
    }

    /// Fraction of the lifetime used, in [0, 1]
    pub fn fraction(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.age / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Straight laser line from the overhead anchor to an ion
#[derive(Debug, Clone)]
pub struct LaserBeam {
    pub ion: IonId,
    pub from: Vec3,
    pub to: Vec3,
    pub color: [f32; 4],
    pub life: Lifetime,
}

/// Floating two-level diagram shown above a pulsed ion
#[derive(Debug, Clone)]
pub struct EnergyPopup {
    pub ion: IonId,
    /// World point the popup follows on screen
    pub anchor: Vec3,
    pub pulse: PulseKind,
    pub target: QubitLevel,
    /// Indicator height between the ground (0) and excited (1) rungs
    pub indicator: Tween,
    /// Indicator color at the start and end of its travel
    pub color_from: [f32; 4],
    pub color_to: [f32; 4],
    pub life: Lifetime,
    settled: bool,
}

impl EnergyPopup {
    /// Current indicator color, blended along with the indicator height
    pub fn indicator_color(&self) -> [f32; 4] {
        let t = self.indicator.easing.apply(self.indicator.progress());
        let mut out = [0.0; 4];
        for (i, c) in out.iter_mut().enumerate() {
            *c = self.color_from[i] + (self.color_to[i] - self.color_from[i]) * t;
        }
        out
    }

    /// Fully opaque while the indicator travels, then fades linearly
    pub fn opacity(&self) -> f32 {
        let rise = self.indicator.duration;
        let fade = (self.life.duration - rise).max(f32::EPSILON);
        (1.0 - (self.life.age - rise).max(0.0) / fade).clamp(0.0, 1.0)
    }
}

/// Arc linking two entangled ions
#[derive(Debug, Clone)]
pub struct EntanglementCurve {
    pub ions: (IonId, IonId),
    pub points: Vec<Vec3>,
    pub color: [f32; 4],
    pub life: Lifetime,
}

impl EntanglementCurve {
    /// Consecutive point pairs for line rendering
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Wide, faint cylinder of light along the trap axis
#[derive(Debug, Clone)]
pub struct CoolingWash {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
    pub color: [f32; 4],
    pub life: Lifetime,
}

impl CoolingWash {
    pub fn opacity(&self) -> f32 {
        self.color[3] * (1.0 - self.life.fraction())
    }
}

/// Completion signals raised while aging effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectEvent {
    /// The popup indicator for this ion reached its target rung
    PopupSettled(IonId),
}

/// Sample a quadratic Bézier from `a` to `b` bending through `control`
pub fn quadratic_bezier(a: Vec3, control: Vec3, b: Vec3, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let u = 1.0 - t;
            a * (u * u) + control * (2.0 * u * t) + b * (t * t)
        })
        .collect()
}

/// All active effects
#[derive(Debug, Clone, Default)]
pub struct EffectLayer {
    pub beams: Vec<LaserBeam>,
    pub popups: Vec<EnergyPopup>,
    pub curves: Vec<EntanglementCurve>,
    pub washes: Vec<CoolingWash>,
}

impl EffectLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_beam(&mut self, ion: IonId, from: Vec3, to: Vec3, color: [f32; 4], duration: f32) {
        self.beams.push(LaserBeam {
            ion,
            from,
            to,
            color,
            life: Lifetime::new(duration),
        });
    }

    /// Start a popup, replacing any popup still open for the same ion
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_popup(
        &mut self,
        ion: IonId,
        anchor: Vec3,
        pulse: PulseKind,
        previous: QubitLevel,
        target: QubitLevel,
        color_from: [f32; 4],
        color_to: [f32; 4],
        rise: f32,
        duration: f32,
    ) {
        self.popups.retain(|p| p.ion != ion);
        self.popups.push(EnergyPopup {
            ion,
            anchor,
            pulse,
            target,
            indicator: Tween::new(
                rung_height(previous),
                rung_height(target),
                rise,
                Easing::CubicInOut,
            ),
            color_from,
            color_to,
            life: Lifetime::new(duration.max(rise)),
            settled: false,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn spawn_curve(
        &mut self,
        ions: (IonId, IonId),
        a: Vec3,
        b: Vec3,
        lift: f32,
        segments: usize,
        color: [f32; 4],
        duration: f32,
    ) {
        let control = (a + b) * 0.5 + Vec3::Y * lift;
        self.curves.push(EntanglementCurve {
            ions,
            points: quadratic_bezier(a, control, b, segments),
            color,
            life: Lifetime::new(duration),
        });
    }

    pub fn spawn_wash(&mut self, start: Vec3, end: Vec3, radius: f32, color: [f32; 4], duration: f32) {
        self.washes.push(CoolingWash {
            start,
            end,
            radius,
            color,
            life: Lifetime::new(duration),
        });
    }

    /// Drop every popup, used when a cool resets the whole chain
    pub fn clear_popups(&mut self) {
        self.popups.clear();
    }

    /// Age all effects, remove expired ones, and report popups that just settled
    pub fn step(&mut self, dt: f32) -> Vec<EffectEvent> {
        let mut events = Vec::new();

        for popup in &mut self.popups {
            popup.indicator.step(dt);
            popup.life.step(dt);
            if !popup.settled && popup.indicator.is_finished() {
                popup.settled = true;
                events.push(EffectEvent::PopupSettled(popup.ion));
            }
        }
        self.popups.retain(|p| !p.life.expired());

        for beam in &mut self.beams {
            beam.life.step(dt);
        }
        self.beams.retain(|b| !b.life.expired());

        for curve in &mut self.curves {
            curve.life.step(dt);
        }
        self.curves.retain(|c| !c.life.expired());

        for wash in &mut self.washes {
            wash.life.step(dt);
        }
        self.washes.retain(|w| !w.life.expired());

        events
    }

    pub fn is_empty(&self) -> bool {
        self.beams.is_empty() && self.popups.is_empty() && self.curves.is_empty() && self.washes.is_empty()
    }
}
