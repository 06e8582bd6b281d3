//! egui overlay: control panel, energy-level popups, physics sidebar, and alerts

use crate::demo::IonTrapDemo;
use crate::effects::EnergyPopup;
use crate::pulse::PulseKind;
use common::Camera3D;
use egui::{Align2, Color32, Context, FontFamily, FontId, RichText, Stroke};

/// Button presses reported back to the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Cool,
    Pulse(PulseKind),
    Entangle,
}

const ACCENT: Color32 = Color32::from_rgb(100, 200, 255);
const HEADING: Color32 = Color32::from_rgb(255, 200, 100);

fn color32(rgba: [f32; 4], opacity: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(
        (rgba[0] * 255.0) as u8,
        (rgba[1] * 255.0) as u8,
        (rgba[2] * 255.0) as u8,
        (rgba[3] * opacity * 255.0) as u8,
    )
}

/// Left panel with the four action buttons and the status labels
pub fn draw_controls(ctx: &Context, demo: &IonTrapDemo) -> Option<UiAction> {
    let mut action = None;

    egui::SidePanel::left("controls_panel")
        .min_width(240.0)
        .resizable(false)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(RichText::new("Ion Trap").color(ACCENT));
            });
            ui.add_space(10.0);
            ui.separator();

            ui.label(RichText::new("Lasers").strong().color(HEADING));
            ui.add_space(5.0);
            if ui.button("Cool (reset to |0⟩)").clicked() {
                action = Some(UiAction::Cool);
            }
            if ui.button("π pulse").clicked() {
                action = Some(UiAction::Pulse(PulseKind::Pi));
            }
            if ui.button("π/2 pulse").clicked() {
                action = Some(UiAction::Pulse(PulseKind::HalfPi));
            }
            if ui.button("Entangle").clicked() {
                action = Some(UiAction::Entangle);
            }

            ui.add_space(10.0);
            ui.separator();

            ui.label(RichText::new("System").strong().color(HEADING));
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new("Selected:").color(Color32::GRAY));
                ui.label(RichText::new(demo.selection_label()).color(Color32::WHITE));
            });
            ui.horizontal(|ui| {
                ui.label(RichText::new("Status:").color(Color32::GRAY));
                ui.label(RichText::new(demo.status()).color(Color32::WHITE));
            });

            ui.add_space(5.0);
            ui.label(RichText::new("State:").color(Color32::GRAY));
            ui.label(
                RichText::new(demo.state_text())
                    .font(FontId::new(16.0, FontFamily::Monospace))
                    .color(Color32::from_rgb(200, 220, 255)),
            );
            ui.label(RichText::new(demo.state_latex()).small().color(Color32::DARK_GRAY));

            ui.add_space(10.0);
            ui.separator();
            ui.label(
                RichText::new("Click ions to select (max 2). C cool, P π, H π/2, E entangle.")
                    .small()
                    .color(Color32::GRAY),
            );
        });

    action
}

/// Paint every active energy popup above its ion
pub fn draw_energy_popups(ctx: &Context, demo: &IonTrapDemo, camera: &Camera3D, size: (f32, f32)) {
    let pixels_per_point = ctx.pixels_per_point();
    for popup in &demo.effects().popups {
        let Some(screen) = camera.project_to_screen(popup.anchor, size.0, size.1) else {
            continue;
        };
        let pos = egui::pos2(screen.x / pixels_per_point, screen.y / pixels_per_point);
        draw_energy_popup(ctx, popup, pos);
    }
}

fn draw_energy_popup(ctx: &Context, popup: &EnergyPopup, pos: egui::Pos2) {
    let opacity = popup.opacity();
    let width = 90.0;
    let height = 64.0;

    egui::Area::new(egui::Id::new(("energy_popup", popup.ion.0)))
        .order(egui::Order::Foreground)
        .interactable(false)
        .pivot(Align2::CENTER_BOTTOM)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
            let painter = ui.painter();

            painter.rect_filled(rect, 4.0, Color32::from_rgba_unmultiplied(10, 10, 30, (200.0 * opacity) as u8));

            let rung = color32([0.8, 0.8, 0.9, 1.0], opacity);
            let left = rect.left() + 28.0;
            let right = rect.right() - 10.0;
            let top = rect.top() + 14.0;
            let bottom = rect.bottom() - 14.0;
            for (y, ket) in [(top, "|1⟩"), (bottom, "|0⟩")] {
                painter.line_segment([egui::pos2(left, y), egui::pos2(right, y)], Stroke::new(2.0, rung));
                painter.text(
                    egui::pos2(rect.left() + 6.0, y),
                    Align2::LEFT_CENTER,
                    ket,
                    FontId::monospace(11.0),
                    rung,
                );
            }

            let y = bottom + (top - bottom) * popup.indicator.value();
            painter.circle_filled(
                egui::pos2((left + right) * 0.5, y),
                5.0,
                color32(popup.indicator_color(), opacity),
            );
            painter.text(
                egui::pos2(right, rect.top() + 2.0),
                Align2::RIGHT_TOP,
                popup.pulse.label(),
                FontId::proportional(9.0),
                color32([1.0, 1.0, 1.0, 0.8], opacity),
            );
        });
}

/// Modal notice for a refused action. Returns true once dismissed.
pub fn draw_alert(ctx: &Context, message: &str) -> bool {
    let mut dismissed = false;
    egui::Window::new("Notice")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(5.0);
            ui.vertical_centered(|ui| {
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        });
    dismissed
}

/// Equation entry with label and formula
pub struct Equation {
    pub name: &'static str,
    pub formula: &'static str,
    pub description: &'static str,
}

pub const ION_TRAP_EQUATIONS: &[Equation] = &[
    Equation {
        name: "Rabi Rotation",
        formula: "R(θ) = exp(-iθσₓ/2)",
        description: "Laser pulse of area θ on one qubit",
    },
    Equation {
        name: "π Pulse",
        formula: "|0⟩ ↔ |1⟩",
        description: "Full population inversion",
    },
    Equation {
        name: "π/2 Pulse",
        formula: "|0⟩ → (|0⟩ + |1⟩)/√2",
        description: "Equal superposition",
    },
    Equation {
        name: "Register State",
        formula: "|ψ⟩ = |q₀⟩ ⊗ |q₁⟩ ⊗ … ⊗ |qₙ₋₁⟩",
        description: "Product state of the chain",
    },
];

/// Right sidebar listing the pulse physics
pub fn draw_equations_sidebar(ctx: &Context, equations: &[Equation]) {
    egui::SidePanel::right("equations_panel")
        .min_width(240.0)
        .max_width(320.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.label(RichText::new("Equations").strong().color(HEADING));
            ui.add_space(5.0);
            for eq in equations {
                ui.group(|ui| {
                    ui.label(RichText::new(eq.name).strong().color(Color32::WHITE));
                    ui.label(
                        RichText::new(eq.formula)
                            .font(FontId::new(15.0, FontFamily::Monospace))
                            .color(Color32::from_rgb(200, 220, 255)),
                    );
                    ui.label(RichText::new(eq.description).small().color(Color32::GRAY));
                });
                ui.add_space(6.0);
            }
        });
}
