use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::world::WorldState;

/// A committed world as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub saved_at: DateTime<Utc>,
    pub world: WorldState,
}

impl WorldSnapshot {
    pub fn capture(world: &WorldState) -> Self {
        Self {
            saved_at: Utc::now(),
            world: world.clone(),
        }
    }
}

fn snapshot_dir() -> PathBuf {
    PathBuf::from(".genesis")
}

pub fn snapshot_file_path() -> PathBuf {
    snapshot_dir().join("world.json")
}

pub fn snapshots_dir() -> PathBuf {
    snapshot_dir().join("world_snapshots")
}

fn write_json(path: &Path, snapshot: &WorldSnapshot) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(snapshot)?;
    fs::write(path, json)
}

fn read_json(path: &Path) -> io::Result<Option<WorldSnapshot>> {
    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    let snapshot = serde_json::from_slice(&bytes).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed to parse snapshot {}: {}", path.display(), e),
        )
    })?;
    Ok(Some(snapshot))
}

pub fn save_world_snapshot(snapshot: &WorldSnapshot) -> io::Result<PathBuf> {
    let path = snapshot_file_path();
    write_json(&path, snapshot)?;
    Ok(path)
}

/// History copy under `world_snapshots/tick_NNNNNN.json`.
pub fn save_world_snapshot_tick(snapshot: &WorldSnapshot) -> io::Result<PathBuf> {
    let path = snapshots_dir().join(format!("tick_{:06}.json", snapshot.world.tick));
    write_json(&path, snapshot)?;
    Ok(path)
}

/// Current snapshot, falling back to the newest history entry.
pub fn load_world_snapshot() -> io::Result<Option<WorldSnapshot>> {
    let path = snapshot_file_path();
    if path.exists() {
        if let Some(snapshot) = read_json(&path)? {
            return Ok(Some(snapshot));
        }
    }
    load_latest_snapshot_from_dir(&snapshots_dir())
}

pub fn load_latest_snapshot_from_dir(dir: &Path) -> io::Result<Option<WorldSnapshot>> {
    let mut latest: Option<PathBuf> = None;
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                match &latest {
                    Some(current) if path <= *current => {}
                    _ => latest = Some(path),
                }
            }
        }
    }

    match latest {
        Some(path) => read_json(&path),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::modules::config::SimConfig;
    use crate::modules::world;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("genesis-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample(ticks: usize) -> WorldSnapshot {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = world::initialize_world(&SimConfig::default(), &mut rng).unwrap();
        for _ in 0..ticks {
            state = world::tick(&state, 0.25, &mut rng).unwrap().world;
        }
        WorldSnapshot::capture(&state)
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let snapshot = sample(12);
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: WorldSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn latest_history_file_wins() {
        let dir = scratch_dir("history");
        let early = sample(1);
        let late = sample(3);
        write_json(&dir.join("tick_000001.json"), &early).unwrap();
        write_json(&dir.join("tick_000003.json"), &late).unwrap();
        let loaded = load_latest_snapshot_from_dir(&dir).unwrap().unwrap();
        assert_eq!(loaded.world.tick, 3);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn empty_directory_has_no_snapshot() {
        let dir = scratch_dir("empty");
        assert!(load_latest_snapshot_from_dir(&dir).unwrap().is_none());
        fs::remove_dir_all(&dir).unwrap();
    }
}
