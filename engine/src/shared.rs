//! Thread-safe handle serializing access to one engine.

use std::sync::{Arc, Mutex, PoisonError};

use world_of_bits_core::{CellCoord, Direction, InteractionOutcome};

use crate::Engine;

/// Cloneable handle to an [`Engine`] shared between threads.
///
/// Every call holds the lock for one whole operation, so concurrent callers
/// observe the same serial order of transitions a single caller would.
#[derive(Clone, Debug)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    /// Wraps an engine for shared use.
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Runs `operation` with exclusive access to the engine.
    pub fn with<R>(&self, operation: impl FnOnce(&mut Engine) -> R) -> R {
        let mut engine = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        operation(&mut engine)
    }

    /// See [`Engine::interact`].
    pub fn interact(&self, target: CellCoord, player: CellCoord) -> InteractionOutcome {
        self.with(|engine| engine.interact(target, player))
    }

    /// See [`Engine::move_player`].
    pub fn move_player(&self, direction: Direction) -> CellCoord {
        self.with(|engine| engine.move_player(direction))
    }

    /// See [`Engine::reset`].
    pub fn reset(&self) {
        self.with(Engine::reset);
    }

    /// See [`Engine::is_won`].
    #[must_use]
    pub fn is_won(&self) -> bool {
        self.with(|engine| engine.is_won())
    }
}
