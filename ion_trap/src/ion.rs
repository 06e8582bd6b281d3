//! Trapped ions and their two-level qubit state

use crate::config::{rgba_from_hex, DemoConfig};
use glam::Vec3;
use std::fmt;

/// Stable index of an ion in the trap, assigned at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IonId(pub usize);

impl fmt::Display for IonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Qubit level of an ion: |0⟩, |1⟩, or an equal superposition marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QubitLevel {
    #[default]
    Ground,
    Excited,
    Superposition,
}

impl QubitLevel {
    /// Population of |1⟩, used to interpolate the display color
    pub fn value(self) -> f32 {
        match self {
            QubitLevel::Ground => 0.0,
            QubitLevel::Excited => 1.0,
            QubitLevel::Superposition => 0.5,
        }
    }

    /// Unicode ket for labels
    pub fn ket(self) -> &'static str {
        match self {
            QubitLevel::Ground => "|0⟩",
            QubitLevel::Excited => "|1⟩",
            QubitLevel::Superposition => "|+⟩",
        }
    }

    /// LaTeX ket for the typeset state expression
    pub fn latex_ket(self) -> &'static str {
        match self {
            QubitLevel::Ground => r"|0\rangle",
            QubitLevel::Excited => r"|1\rangle",
            QubitLevel::Superposition => r"|+\rangle",
        }
    }

    /// Bloch sphere direction: |0⟩ at +Z, |1⟩ at -Z, |+⟩ on the equator at +X
    pub fn bloch_vector(self) -> Vec3 {
        match self {
            QubitLevel::Ground => Vec3::Z,
            QubitLevel::Excited => Vec3::NEG_Z,
            QubitLevel::Superposition => Vec3::X,
        }
    }
}

/// Which rule currently drives an ion's color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tint {
    /// Interpolated from the qubit level
    #[default]
    Level,
    /// Shared entanglement color; stays until the next pulse or cool repaints the ion
    Entangled,
}

/// Derived look of an ion, never stored as authoritative state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    pub emissive_intensity: f32,
    pub scale: f32,
}

/// Compute how an ion should look from its level, selection, and tint
pub fn appearance(level: QubitLevel, selected: bool, tint: Tint, config: &DemoConfig) -> Appearance {
    let color = match tint {
        Tint::Entangled => rgba_from_hex(config.entangled_color, 1.0),
        Tint::Level => {
            let ground = rgba_from_hex(config.ground_color, 1.0);
            let excited = rgba_from_hex(config.excited_color, 1.0);
            let t = level.value();
            [
                ground[0] + (excited[0] - ground[0]) * t,
                ground[1] + (excited[1] - ground[1]) * t,
                ground[2] + (excited[2] - ground[2]) * t,
                1.0,
            ]
        }
    };

    let (emissive_intensity, scale) = if selected {
        (config.selected_emissive, config.selected_scale)
    } else {
        (config.base_emissive, 1.0)
    };

    Appearance {
        color,
        emissive: color,
        emissive_intensity,
        scale,
    }
}

/// A single trapped ion
#[derive(Debug, Clone)]
pub struct Ion {
    id: IonId,
    base_position: Vec3,
    pub level: QubitLevel,
    pub tint: Tint,
    /// Where the ion is drawn this frame
    pub display_position: Vec3,
    /// Cached look, refreshed by the demo after state or selection changes
    pub appearance: Appearance,
}

impl Ion {
    pub fn new(id: IonId, base_position: Vec3, config: &DemoConfig) -> Self {
        Self {
            id,
            base_position,
            level: QubitLevel::Ground,
            tint: Tint::Level,
            display_position: base_position,
            appearance: appearance(QubitLevel::Ground, false, Tint::Level, config),
        }
    }

    pub fn id(&self) -> IonId {
        self.id
    }

    /// Rest position in the trap
    pub fn base_position(&self) -> Vec3 {
        self.base_position
    }

    /// Recompute the cached appearance
    pub fn refresh(&mut self, selected: bool, config: &DemoConfig) {
        self.appearance = appearance(self.level, selected, self.tint, config);
    }
}

/// Ion rest positions evenly spaced along X and centered on the origin
pub fn chain_positions(count: usize, spacing: f32) -> Vec<Vec3> {
    let offset = (count.saturating_sub(1)) as f32 * spacing * 0.5;
    (0..count)
        .map(|i| Vec3::new(i as f32 * spacing - offset, 0.0, 0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_is_centered() {
        let positions = chain_positions(5, 1.5);
        assert_eq!(positions.len(), 5);
        assert_eq!(positions[2], Vec3::ZERO);
        assert_eq!(positions[0], Vec3::new(-3.0, 0.0, 0.0));
        assert_eq!(positions[4], Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_selected_ion_is_distinguishable() {
        let config = DemoConfig::default();
        let plain = appearance(QubitLevel::Ground, false, Tint::Level, &config);
        let picked = appearance(QubitLevel::Ground, true, Tint::Level, &config);
        assert_eq!(plain.color, picked.color);
        assert!(picked.scale > plain.scale);
        assert!(picked.emissive_intensity > plain.emissive_intensity);
    }

    #[test]
    fn test_superposition_color_is_midpoint() {
        let config = DemoConfig::default();
        let ground = appearance(QubitLevel::Ground, false, Tint::Level, &config).color;
        let excited = appearance(QubitLevel::Excited, false, Tint::Level, &config).color;
        let mid = appearance(QubitLevel::Superposition, false, Tint::Level, &config).color;
        for c in 0..3 {
            assert!((mid[c] - (ground[c] + excited[c]) / 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_entangled_tint_ignores_level() {
        let config = DemoConfig::default();
        let a = appearance(QubitLevel::Ground, false, Tint::Entangled, &config);
        let b = appearance(QubitLevel::Excited, true, Tint::Entangled, &config);
        assert_eq!(a.color, b.color);
        assert_eq!(a.emissive, rgba_from_hex(config.entangled_color, 1.0));
    }
}
