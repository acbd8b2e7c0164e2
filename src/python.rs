use std::path::PathBuf;

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::config::{DataPaths, SimulatorConfig};
use crate::error::{LoadError, SimError};
use crate::simulator::goal::{blank_as_none, Goal, Intent};
use crate::simulator::simulator::Simulator;

fn load_err(err: LoadError) -> PyErr {
    PyIOError::new_err(err.to_string())
}

fn sim_err(err: SimError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Python handle on one simulated user. Frames and belief states cross as JSON strings.
#[pyclass(name = "UserSimulator")]
pub struct PyUserSimulator {
    inner: Simulator,
}

#[pymethods]
impl PyUserSimulator {
    #[new]
    #[args(seed = "None")]
    fn new(
        template_dir: &str,
        catalog: &str,
        genre_map: &str,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let config = SimulatorConfig {
            seed,
            data: DataPaths {
                template_dir: PathBuf::from(template_dir),
                catalog: PathBuf::from(catalog),
                genre_map: PathBuf::from(genre_map),
            },
            ..SimulatorConfig::default()
        };
        let inner = Simulator::from_config(config).map_err(load_err)?;
        Ok(PyUserSimulator { inner })
    }

    #[args(intent = "None", artist = "None", track = "None", genre = "None", random_init = "false")]
    fn set_goal(
        &mut self,
        intent: Option<&str>,
        artist: Option<String>,
        track: Option<String>,
        genre: Option<String>,
        random_init: bool,
    ) -> PyResult<()> {
        if random_init {
            self.inner.set_random_goal().map_err(sim_err)?;
            return Ok(());
        }
        let intent: Intent = intent
            .ok_or_else(|| PyValueError::new_err("intent is required unless random_init is set"))?
            .parse()
            .map_err(sim_err)?;
        self.inner.set_goal(Goal::new(
            intent,
            blank_as_none(artist),
            blank_as_none(track),
            blank_as_none(genre),
        ));
        Ok(())
    }

    #[args(frame = "None", start = "false")]
    fn respond(&mut self, frame: Option<&str>, start: bool) -> PyResult<String> {
        let turn = if start {
            self.inner.start()
        } else {
            let frame = frame.ok_or_else(|| {
                PyValueError::new_err("an action frame is required unless start is set")
            })?;
            self.inner.respond_json(frame)
        };
        Ok(turn.map_err(sim_err)?.utterance)
    }

    fn step_reward(&self) -> f64 {
        self.inner.step_reward()
    }

    fn check_belief(&self, state: &str) -> PyResult<bool> {
        self.inner.check_belief_json(state).map_err(sim_err)
    }

    #[getter]
    fn dialogue_ended(&self) -> bool {
        self.inner.dialogue_ended()
    }

    #[getter]
    fn reward(&self) -> f64 {
        self.inner.reward()
    }

    #[getter]
    fn success(&self) -> bool {
        self.inner.success()
    }

    #[getter]
    fn turns(&self) -> i32 {
        self.inner.turns()
    }

    #[getter]
    fn goal(&self) -> Option<String> {
        self.inner.goal().map(|goal| goal.to_string())
    }
}
