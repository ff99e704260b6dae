#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session engine wiring the authoritative world to its pure systems.
//!
//! An [`Engine`] owns one world together with the window manager and the win
//! monitor. Each public operation is one admitted event: the engine applies the
//! resulting command, feeds the emitted events to the systems and keeps
//! applying their commands until none remain, so callers never observe a
//! partially applied transition.

mod config;
mod shared;

pub use config::{ConfigError, EngineConfig, CLASSROOM, DEFAULT_TILE_DEGREES};
pub use shared::SharedEngine;

use std::collections::VecDeque;

use tracing::{debug, info, instrument};
use world_of_bits_core::{
    CellCoord, CellRect, CellView, Command, Direction, Event, EvictionPolicy, GeoBounds,
    GridProjection, InteractionOutcome, Token,
};
use world_of_bits_system_spawning::Config as SpawnConfig;
use world_of_bits_system_viewport::{Config as ViewportConfig, Viewport, Window};
use world_of_bits_system_win_condition::WinCondition;
use world_of_bits_world::{self as world, query, Cell, Config as WorldConfig, World};

/// Number of events kept for [`Engine::drain_events`] before the oldest are dropped.
pub const JOURNAL_CAPACITY: usize = 16_384;

/// Summary of the session used by status displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    /// Largest token crafted since the last reset.
    pub best_crafted: Option<Token>,
    /// Cells inside the current window.
    pub materialized: usize,
    /// Cell records kept outside the current window.
    pub retained: usize,
    /// Whether the session reached victory.
    pub won: bool,
}

/// One game session.
#[derive(Debug)]
pub struct Engine {
    world: World,
    viewport: Viewport,
    win_condition: WinCondition,
    projection: GridProjection,
    journal: VecDeque<Event>,
}

impl Engine {
    /// Validates the configuration and builds a fresh session.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let projection = config.projection();
        let start = projection.cell_at(config.start);
        let world = World::new(WorldConfig::new(
            SpawnConfig::new(config.seed, config.spawn_probability, config.value_tiers),
            config.neighborhood_size,
            config.eviction_policy,
            start,
        ));
        let viewport = Viewport::new(
            ViewportConfig::new(config.neighborhood_size, config.max_window_span),
            start,
        );

        info!(
            seed = config.seed,
            origin = ?projection.origin(),
            tile_degrees = projection.tile_degrees(),
            start = %start,
            policy = ?config.eviction_policy,
            "{}",
            query::welcome_banner(&world)
        );

        Ok(Self {
            world,
            viewport,
            win_condition: WinCondition::new(config.win_threshold),
            projection,
            journal: VecDeque::new(),
        })
    }

    /// Reports the viewport `min..=max` and returns views of every materialized cell in it.
    ///
    /// Viewports wider than `max_window_span` cells on either axis are not
    /// materialized in full: the range is clamped around its centre and the
    /// returned views only cover the clamped range, so fewer views come back
    /// than the viewport holds. Callers detect this by comparing the request
    /// with [`Engine::window`].
    #[instrument(level = "debug", skip(self))]
    pub fn materialize_range(&mut self, min: CellCoord, max: CellCoord) -> Vec<CellView> {
        let requested = CellRect::from_corners(min, max);
        let mut commands = Vec::new();
        self.viewport.handle(&[], Some(requested), &mut commands);
        let _ = self.dispatch(commands);

        let range = self
            .viewport
            .last_window()
            .map_or(requested, |window| window.materialize);
        query::cell_views(&self.world, range)
    }

    /// Geographic variant of [`Engine::materialize_range`].
    pub fn materialize_geo(&mut self, bounds: GeoBounds) -> Vec<CellView> {
        let range = self.projection.covering(bounds);
        self.materialize_range(range.min(), range.max())
    }

    /// Lets a player standing on `player` act on `target`.
    pub fn interact(&mut self, target: CellCoord, player: CellCoord) -> InteractionOutcome {
        let events = self.dispatch(vec![Command::Interact { target, player }]);
        let outcome = events
            .iter()
            .find_map(InteractionOutcome::from_event)
            .unwrap_or(InteractionOutcome::Noop);
        debug!(cell = %target, player = %player, ?outcome, "interaction");
        if events
            .iter()
            .any(|event| matches!(event, Event::SessionWon { .. }))
        {
            info!(cell = %target, "session won");
        }
        outcome
    }

    /// Moves the player a single cell and returns the resulting position.
    pub fn move_player(&mut self, direction: Direction) -> CellCoord {
        let _ = self.dispatch(vec![Command::MovePlayer { direction }]);
        let player = query::player(&self.world);
        debug!(?direction, player = %player, "player moved");
        player
    }

    /// Clears the world, the inventory and the victory flag, and returns the player to the start.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        let _ = self.dispatch(vec![Command::Reset]);
        info!(player = %query::player(&self.world), "session reset");
    }

    /// Overwrites a cell's token, materializing the cell first.
    pub fn set_token(&mut self, cell: CellCoord, token: Option<Token>) {
        let _ = self.dispatch(vec![Command::SetToken { cell, token }]);
    }

    /// Reports whether the session reached victory.
    #[must_use]
    pub fn is_won(&self) -> bool {
        query::is_won(&self.world)
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player(&self) -> CellCoord {
        query::player(&self.world)
    }

    /// Token carried by the player.
    #[must_use]
    pub fn held(&self) -> Option<Token> {
        query::held(&self.world)
    }

    /// Cells within interaction range of the player.
    #[must_use]
    pub fn neighborhood(&self) -> CellRect {
        query::neighborhood(&self.world)
    }

    /// Chebyshev radius within which the player may interact.
    #[must_use]
    pub fn neighborhood_size(&self) -> u32 {
        query::neighborhood_size(&self.world)
    }

    /// Policy applied to cells leaving the window.
    #[must_use]
    pub fn eviction_policy(&self) -> EvictionPolicy {
        query::eviction_policy(&self.world)
    }

    /// Token value whose crafting wins the session.
    #[must_use]
    pub fn win_threshold(&self) -> u64 {
        self.win_condition.threshold()
    }

    /// Most recent window produced by the window manager.
    #[must_use]
    pub fn window(&self) -> Option<Window> {
        self.viewport.last_window()
    }

    /// Looks up a cell without materializing it.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        query::cell(&self.world, coord)
    }

    /// Projection between geographic positions and cells.
    #[must_use]
    pub fn projection(&self) -> &GridProjection {
        &self.projection
    }

    /// Summary of the session.
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            best_crafted: self.win_condition.best(),
            materialized: query::materialized_count(&self.world),
            retained: query::retained_count(&self.world),
            won: query::is_won(&self.world),
        }
    }

    /// Removes and returns the events recorded since the previous drain.
    ///
    /// View layers release markers for `CellEvicted` cells and drop everything on
    /// `WorldReset`.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.journal.drain(..).collect()
    }

    /// Runs commands and every follow-up command the systems emit, returning all events.
    fn dispatch(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut emitted = Vec::new();
        let mut pending = commands;

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            self.win_condition.handle(&events, &mut pending);
            self.viewport.handle(&events, None, &mut pending);
            emitted.extend(events);
        }

        self.record(&emitted);
        emitted
    }

    fn record(&mut self, events: &[Event]) {
        self.journal.extend(events.iter().cloned());
        let overflow = self.journal.len().saturating_sub(JOURNAL_CAPACITY);
        if overflow > 0 {
            let _ = self.journal.drain(..overflow);
        }
    }
}
