//! Snapshot storage for games in progress
//!
//! One map from game id to a JSON snapshot, optionally backed by a file. A
//! file that is missing or unreadable starts an empty store. A snapshot that
//! fails to deserialize or validate is discarded and the caller starts a fresh
//! game.

use crate::error::Result;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A state that can be saved and checked on the way back in.
pub trait Restorable: Serialize + DeserializeOwned {
    /// Rejects snapshots that do not describe a reachable position.
    fn validate(&self) -> Result<()>;
}

#[derive(Debug, Default)]
struct Inner {
    states: HashMap<String, Value>,
    dirty: bool,
}

#[derive(Debug)]
pub struct GameStore {
    path: Option<PathBuf>,
    inner: Mutex<Inner>,
}

impl GameStore {
    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        GameStore {
            path: None,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Opens the store at `path`, starting empty if the file is missing or
    /// cannot be parsed.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let states = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<HashMap<String, Value>>(&text) {
                Ok(states) => states,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "store file is corrupt, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "store file unreadable, starting empty");
                HashMap::new()
            }
        };
        debug!(path = %path.display(), games = states.len(), "store opened");
        GameStore {
            path: Some(path),
            inner: Mutex::new(Inner {
                states,
                dirty: false,
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().states.contains_key(id)
    }

    /// Raw snapshot stored under `id`.
    pub fn snapshot(&self, id: &str) -> Option<Value> {
        self.inner.lock().states.get(id).cloned()
    }

    pub fn save<S: Serialize>(&self, id: &str, state: &S) -> Result<()> {
        let value = serde_json::to_value(state)?;
        self.put_raw(id, value);
        Ok(())
    }

    /// Stores a snapshot as-is, without going through a typed state.
    pub fn put_raw(&self, id: &str, value: Value) {
        let mut inner = self.inner.lock();
        inner.states.insert(id.to_string(), value);
        inner.dirty = true;
    }

    /// Restores the state saved under `id`. Missing, malformed or invalid
    /// snapshots all yield `None`.
    pub fn restore<S: Restorable>(&self, id: &str) -> Option<S> {
        let value = self.snapshot(id)?;
        let state: S = match serde_json::from_value(value) {
            Ok(state) => state,
            Err(e) => {
                warn!(game = id, error = %e, "discarding malformed snapshot");
                return None;
            }
        };
        if let Err(e) = state.validate() {
            warn!(game = id, error = %e, "discarding invalid snapshot");
            return None;
        }
        Some(state)
    }

    /// Restores `id`, or builds a fresh state with `fresh`.
    pub fn restore_or_else<S: Restorable>(&self, id: &str, fresh: impl FnOnce() -> S) -> S {
        self.restore(id).unwrap_or_else(fresh)
    }

    pub fn clear(&self, id: &str) {
        let mut inner = self.inner.lock();
        if inner.states.remove(id).is_some() {
            inner.dirty = true;
        }
    }

    /// Writes pending changes to the backing file, if there is one.
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.dirty {
            return Ok(());
        }
        if let Some(path) = &self.path {
            let text = serde_json::to_string_pretty(&inner.states)?;
            let tmp = path.with_extension("tmp");
            fs::write(&tmp, text)?;
            fs::rename(&tmp, path)?;
            debug!(path = %path.display(), games = inner.states.len(), "store flushed");
        }
        inner.dirty = false;
        Ok(())
    }
}

impl Drop for GameStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to flush store on shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::{TicTacToeMove, TicTacToeState};
    use crate::GameState;

    #[test]
    fn test_save_and_restore() {
        let store = GameStore::in_memory();
        let game = TicTacToeState::new().apply_move(&TicTacToeMove(4));
        store.save("tictactoe", &game).unwrap();
        assert_eq!(store.restore::<TicTacToeState>("tictactoe"), Some(game));
    }

    #[test]
    fn test_missing_falls_back() {
        let store = GameStore::in_memory();
        let fresh = store.restore_or_else("tictactoe", TicTacToeState::new);
        assert_eq!(fresh, TicTacToeState::new());
    }

    #[test]
    fn test_malformed_snapshot_is_discarded() {
        let store = GameStore::in_memory();
        store.put_raw("tictactoe", serde_json::json!({ "cells": "nope" }));
        assert!(store.restore::<TicTacToeState>("tictactoe").is_none());
    }

    #[test]
    fn test_clear_removes_entry() {
        let store = GameStore::in_memory();
        store.save("tictactoe", &TicTacToeState::new()).unwrap();
        store.clear("tictactoe");
        assert!(!store.contains("tictactoe"));
    }
}
