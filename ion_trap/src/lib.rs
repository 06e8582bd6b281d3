//! Trapped-Ion Qubit Visualization
//!
//! An interactive chain of trapped ions driven by simulated lasers:
//!
//! - **Selection**: click up to two ions to target them
//! - **Laser Pulses**: π pulses invert the population, π/2 pulses create a superposition
//! - **Entanglement**: link two selected ions with a shared color and an arc
//! - **Cooling**: reset the whole chain to the ground state
//!
//! The state model in [`demo`] is independent of the GPU; [`renderer`] and
//! [`ui`] read it every frame.

pub mod config;
pub mod error;
pub mod ion;
pub mod selection;
pub mod pulse;
pub mod scheduler;
pub mod tween;
pub mod effects;
pub mod demo;
pub mod renderer;
pub mod ui;

pub use config::DemoConfig;
pub use demo::IonTrapDemo;
pub use error::ActionError;
pub use ion::{IonId, QubitLevel};
pub use pulse::PulseKind;
pub use selection::{SelectionSet, Toggle};
