use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::modules::world::WorldState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    Initialized,
    Running,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeState {
    pub status: Status,
    pub last_tick: u64,
    #[serde(default)]
    pub sim_time: f64,
    #[serde(default)]
    pub population: usize,
    pub message: Option<String>,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            status: Status::Initialized,
            last_tick: 0,
            sim_time: 0.0,
            population: 0,
            message: None,
        }
    }
}

fn state_dir() -> PathBuf {
    PathBuf::from(".genesis")
}

fn state_path() -> PathBuf {
    state_dir().join("state.json")
}

pub fn state_file_path() -> PathBuf {
    state_path()
}

pub fn init_state(world: &WorldState) -> io::Result<RuntimeState> {
    let state = RuntimeState {
        population: world.agents.len(),
        ..RuntimeState::default()
    };
    save_state(&state)?;
    Ok(state)
}

pub fn load_state() -> io::Result<Option<RuntimeState>> {
    let path = state_path();
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Ok(None);
    }

    let state: RuntimeState = serde_json::from_slice(&bytes).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "failed to parse state file {}; delete it or run `genesis init` to reset: {}",
                state_path().display(),
                e
            ),
        )
    })?;
    Ok(Some(state))
}

pub fn save_state(state: &RuntimeState) -> io::Result<()> {
    fs::create_dir_all(state_dir())?;
    let json = serde_json::to_vec_pretty(state)?;
    fs::write(state_path(), json)?;
    Ok(())
}

/// Record `status` along with where `world` currently stands.
pub fn set_status(
    status: Status,
    world: &WorldState,
    message: Option<String>,
) -> io::Result<RuntimeState> {
    let mut state = load_state()?.unwrap_or_default();
    state.status = status;
    state.last_tick = world.tick;
    state.sim_time = world.time;
    state.population = world.agents.len();
    state.message = message;
    save_state(&state)?;
    Ok(state)
}

/// Flip the stored status without touching the recorded progress.
pub fn mark(status: Status, message: Option<String>) -> io::Result<RuntimeState> {
    let mut state = load_state()?.unwrap_or_default();
    state.status = status;
    state.message = message;
    save_state(&state)?;
    Ok(state)
}

/// Update the recorded progress but keep whatever status is stored, so a
/// concurrent `genesis stop` is not overwritten.
pub fn record_progress(world: &WorldState) -> io::Result<RuntimeState> {
    let mut state = load_state()?.unwrap_or_default();
    state.last_tick = world.tick;
    state.sim_time = world.time;
    state.population = world.agents.len();
    save_state(&state)?;
    Ok(state)
}
