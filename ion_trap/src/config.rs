//! Tunable constants for the trap layout, effect timings, and palette

use glam::Vec3;

/// Demo configuration. Every field is cosmetic or a timing, none changes the state rules.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Number of ions loaded into the trap
    pub ion_count: usize,
    /// Distance between neighbouring ions along the trap (X) axis
    pub ion_spacing: f32,
    /// Unscaled ion sphere radius, also the pick radius
    pub ion_radius: f32,
    /// Scale applied to a selected ion
    pub selected_scale: f32,
    /// Glow of an unselected ion
    pub base_emissive: f32,
    /// Glow of a selected ion
    pub selected_emissive: f32,

    /// Overhead point every pulse beam starts from
    pub laser_anchor: Vec3,
    /// Height above an ion where its energy popup is anchored
    pub popup_height: f32,

    /// Seconds a pulse beam stays visible
    pub beam_duration: f32,
    /// Seconds for the popup indicator to reach its target rung
    pub popup_rise: f32,
    /// Seconds before a popup has fully faded out
    pub popup_duration: f32,
    /// Seconds the entanglement curve stays visible
    pub curve_duration: f32,
    /// Seconds until an entanglement clears the selection
    pub entangle_duration: f32,
    /// Seconds the cooling wash stays visible
    pub wash_duration: f32,
    /// Seconds from starting a cool until the ions are reset
    pub cooling_delay: f32,

    /// Peak displacement of the entangling oscillation
    pub oscillation_amplitude: f32,
    /// Angular frequency of the entangling oscillation in rad/s
    pub oscillation_frequency: f32,
    /// Height of the curve's midpoint control point above the ions
    pub curve_lift: f32,
    /// Line segments used to draw the entanglement curve
    pub curve_segments: usize,

    pub ground_color: u32,
    pub excited_color: u32,
    pub entangled_color: u32,
    pub pi_beam_color: u32,
    pub half_pi_beam_color: u32,
    pub wash_color: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ion_count: 5,
            ion_spacing: 1.5,
            ion_radius: 0.3,
            selected_scale: 1.4,
            base_emissive: 0.35,
            selected_emissive: 1.0,

            laser_anchor: Vec3::new(0.0, 5.0, 0.0),
            popup_height: 0.9,

            beam_duration: 0.5,
            popup_rise: 1.0,
            popup_duration: 2.0,
            curve_duration: 2.0,
            entangle_duration: 3.0,
            wash_duration: 1.0,
            cooling_delay: 1.0,

            oscillation_amplitude: 0.12,
            oscillation_frequency: 10.0,
            curve_lift: 1.5,
            curve_segments: 32,

            ground_color: 0x3388ff,
            excited_color: 0xff3322,
            entangled_color: 0xcc33ff,
            pi_beam_color: 0xff5500,
            half_pi_beam_color: 0x00ffcc,
            wash_color: 0x66ccff,
        }
    }
}

/// Convert a 0xRRGGBB value to linear-ish RGBA floats
pub fn rgba_from_hex(hex: u32, alpha: f32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_from_hex() {
        assert_eq!(rgba_from_hex(0xff0000, 1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgba_from_hex(0x0000ff, 0.5), [0.0, 0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_curve_clears_before_entanglement_ends() {
        let config = DemoConfig::default();
        assert!(config.curve_duration < config.entangle_duration);
        assert!(config.popup_rise <= config.popup_duration);
    }
}
