//! Goal-directed user simulator for training and evaluating music-domain dialogue policies.
//!
//! A [`Simulator`] holds a hidden [`Goal`], answers the policy's [`ActionFrame`]s with
//! template-based utterances, and scores the dialogue once the policy gives its final answer.

pub mod config;
pub mod data;
pub mod error;
pub mod parsers;
pub mod simulator;
#[cfg(feature = "python")]
mod python;

extern crate pest;
#[macro_use]
extern crate pest_derive;

pub use config::{DataPaths, SimulatorConfig};
pub use data::types::{Catalog, Template, TemplateIndex};
pub use error::{LoadError, SimError};
pub use simulator::frame::{ActionFrame, BeliefState, SlotClaims};
pub use simulator::goal::{blank_as_none, Goal, Intent, Slot, SlotValues};
pub use simulator::scorer::{EvaluationStats, Scorer};
pub use simulator::session::{DialogueOutcome, DialoguePhase, VoicedState};
pub use simulator::simulator::{Simulator, UserTurn};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn usersim(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<python::PyUserSimulator>()?;
    Ok(())
}
