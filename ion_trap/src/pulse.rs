//! Laser pulse types and the per-ion transition rule

use crate::config::DemoConfig;
use crate::error::ActionError;
use crate::ion::QubitLevel;
use std::fmt;
use std::str::FromStr;

/// Laser pulse applied to the selected ions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseKind {
    /// Full population inversion (NOT gate)
    Pi,
    /// Drives the ion into an equal superposition
    HalfPi,
}

impl PulseKind {
    /// Next level after this pulse.
    ///
    /// A π pulse only excites from ground; any other level, superposition
    /// included, drops back to ground.
    pub fn apply(self, level: QubitLevel) -> QubitLevel {
        match self {
            PulseKind::Pi => {
                if level == QubitLevel::Ground {
                    QubitLevel::Excited
                } else {
                    QubitLevel::Ground
                }
            }
            PulseKind::HalfPi => QubitLevel::Superposition,
        }
    }

    pub fn beam_color(self, config: &DemoConfig) -> u32 {
        match self {
            PulseKind::Pi => config.pi_beam_color,
            PulseKind::HalfPi => config.half_pi_beam_color,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PulseKind::Pi => "π pulse",
            PulseKind::HalfPi => "π/2 pulse",
        }
    }
}

impl fmt::Display for PulseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PulseKind::Pi => write!(f, "pi"),
            PulseKind::HalfPi => write!(f, "half-pi"),
        }
    }
}

impl FromStr for PulseKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pi" => Ok(PulseKind::Pi),
            "half-pi" => Ok(PulseKind::HalfPi),
            other => Err(ActionError::UnknownPulse(other.to_string())),
        }
    }
}

/// Height of the popup indicator for a level: 0 on the ground rung, 1 on the excited rung
pub fn rung_height(level: QubitLevel) -> f32 {
    level.value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pi_pulse_inverts_population() {
        assert_eq!(PulseKind::Pi.apply(QubitLevel::Ground), QubitLevel::Excited);
        assert_eq!(PulseKind::Pi.apply(QubitLevel::Excited), QubitLevel::Ground);
    }

    #[test]
    fn test_pi_pulse_collapses_superposition_to_ground() {
        assert_eq!(PulseKind::Pi.apply(QubitLevel::Superposition), QubitLevel::Ground);
    }

    #[test]
    fn test_half_pi_always_superposes() {
        for level in [QubitLevel::Ground, QubitLevel::Excited, QubitLevel::Superposition] {
            assert_eq!(PulseKind::HalfPi.apply(level), QubitLevel::Superposition);
        }
    }

    #[test]
    fn test_parse_pulse_names() {
        assert_eq!("pi".parse::<PulseKind>(), Ok(PulseKind::Pi));
        assert_eq!("half-pi".parse::<PulseKind>(), Ok(PulseKind::HalfPi));
        assert_eq!(
            "two-pi".parse::<PulseKind>(),
            Err(ActionError::UnknownPulse("two-pi".to_string()))
        );
        assert_eq!(PulseKind::HalfPi.to_string(), "half-pi");
    }

    #[test]
    fn test_beam_colors_differ() {
        let config = DemoConfig::default();
        assert_ne!(PulseKind::Pi.beam_color(&config), PulseKind::HalfPi.beam_color(&config));
    }
}
