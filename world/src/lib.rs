#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for World of Bits.
//!
//! The world owns the sparse cell store, the player's inventory and the
//! session flags. It is mutated exclusively through [`apply`] and observed
//! through the [`query`] module.

mod interaction;
mod inventory;
mod store;

pub use inventory::Inventory;
pub use store::Cell;

use tracing::debug;
use world_of_bits_core::{CellCoord, Command, Direction, Event, EvictionPolicy, WELCOME_BANNER};
use world_of_bits_system_spawning::{Config as SpawnConfig, Spawning};

use self::store::CellStore;

/// Default Chebyshev radius of the interaction neighborhood.
pub const DEFAULT_NEIGHBORHOOD_SIZE: u32 = 3;

/// Configuration parameters required to construct the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    spawning: SpawnConfig,
    neighborhood_size: u32,
    eviction_policy: EvictionPolicy,
    start: CellCoord,
}

impl Config {
    /// Creates a new world configuration.
    #[must_use]
    pub const fn new(
        spawning: SpawnConfig,
        neighborhood_size: u32,
        eviction_policy: EvictionPolicy,
        start: CellCoord,
    ) -> Self {
        Self {
            spawning,
            neighborhood_size,
            eviction_policy,
            start,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            SpawnConfig::default(),
            DEFAULT_NEIGHBORHOOD_SIZE,
            EvictionPolicy::default(),
            CellCoord::new(0, 0),
        )
    }
}

/// Represents the authoritative World of Bits state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    store: CellStore,
    inventory: Inventory,
    neighborhood_size: u32,
    start: CellCoord,
    player: CellCoord,
    won: bool,
}

impl World {
    /// Creates a new world with an empty store and the player at the start cell.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            banner: WELCOME_BANNER,
            store: CellStore::new(Spawning::new(config.spawning), config.eviction_policy),
            inventory: Inventory::default(),
            neighborhood_size: config.neighborhood_size,
            start: config.start,
            player: config.start,
            won: false,
        }
    }

    fn move_player(&mut self, direction: Direction, out: &mut Vec<Event>) {
        let from = self.player;
        let to = from.step(direction);
        if self.won || to == from {
            out.push(Event::PlayerMoveRejected { direction });
            return;
        }
        self.player = to;
        out.push(Event::PlayerMoved { from, to });
    }

    fn reset(&mut self, out: &mut Vec<Event>) {
        self.store.clear();
        self.inventory.clear();
        self.player = self.start;
        self.won = false;
        out.push(Event::WorldReset { player: self.player });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SyncWindow {
            materialize,
            neighborhood,
        } => {
            world.store.sync(materialize, out_events);
            debug!(
                cells = world.store.attached_count(),
                retained = world.store.retained_count(),
                "window synchronized"
            );
            out_events.push(Event::WindowSynchronized {
                materialize,
                neighborhood,
            });
        }
        Command::Interact { target, player } => {
            interaction::execute(world, target, player, out_events);
        }
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::SetToken { cell, token } => {
            world.store.set_token(cell, token, out_events);
            out_events.push(Event::TokenSet { cell, token });
        }
        Command::DeclareVictory { token } => {
            if !world.won {
                world.won = true;
                out_events.push(Event::SessionWon { token });
            }
        }
        Command::Reset => world.reset(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use world_of_bits_core::{CellCoord, CellRect, CellView, EvictionPolicy, Token};

    use super::{Cell, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player(world: &World) -> CellCoord {
        world.player
    }

    /// Cell the player returns to on reset.
    #[must_use]
    pub fn start(world: &World) -> CellCoord {
        world.start
    }

    /// Token carried by the player, if any.
    #[must_use]
    pub fn held(world: &World) -> Option<Token> {
        world.inventory.held()
    }

    /// Reports whether the session reached victory.
    #[must_use]
    pub fn is_won(world: &World) -> bool {
        world.won
    }

    /// Chebyshev radius within which the player may interact.
    #[must_use]
    pub fn neighborhood_size(world: &World) -> u32 {
        world.neighborhood_size
    }

    /// Cells within interaction range of the player.
    #[must_use]
    pub fn neighborhood(world: &World) -> CellRect {
        CellRect::around(world.player, world.neighborhood_size)
    }

    /// Materialization range of the last synchronized window.
    #[must_use]
    pub fn window(world: &World) -> Option<CellRect> {
        world.store.window()
    }

    /// Policy applied to cells leaving the window.
    #[must_use]
    pub fn eviction_policy(world: &World) -> EvictionPolicy {
        world.store.policy()
    }

    /// Looks up a cell without materializing it.
    #[must_use]
    pub fn cell(world: &World, coord: CellCoord) -> Option<Cell> {
        world.store.get(coord).copied()
    }

    /// Number of cells attached to the window.
    #[must_use]
    pub fn materialized_count(world: &World) -> usize {
        world.store.attached_count()
    }

    /// Number of records kept outside the current window, either retained by the
    /// eviction policy or touched by the player beyond the viewport.
    #[must_use]
    pub fn retained_count(world: &World) -> usize {
        world.store.retained_count()
    }

    /// Renderable views of the stored cells inside `range`, row by row.
    ///
    /// Token values are only disclosed for cells inside the neighborhood.
    #[must_use]
    pub fn cell_views(world: &World, range: CellRect) -> Vec<CellView> {
        let neighborhood = neighborhood(world);
        range
            .iter()
            .filter_map(|coord| world.store.get(coord))
            .map(|cell| {
                let in_neighborhood = neighborhood.contains(cell.coord());
                CellView {
                    coord: cell.coord(),
                    has_token: cell.token().is_some(),
                    value: cell
                        .token()
                        .filter(|_| in_neighborhood)
                        .map(|token| token.value()),
                    in_neighborhood,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_of_bits_core::{CellRect, RejectionReason, Token};

    fn world(policy: EvictionPolicy) -> World {
        World::new(Config::new(
            SpawnConfig::new(0x00c0_ffee, 0.3, 4),
            DEFAULT_NEIGHBORHOOD_SIZE,
            policy,
            CellCoord::new(0, 0),
        ))
    }

    fn token(value: u64) -> Token {
        Token::from_value(value).expect("power of two")
    }

    #[test]
    fn sync_window_materializes_range() {
        let mut world = world(EvictionPolicy::Farming);
        let mut events = Vec::new();
        let range = CellRect::around(CellCoord::new(0, 0), 2);
        let neighborhood = query::neighborhood(&world);

        apply(
            &mut world,
            Command::SyncWindow {
                materialize: range,
                neighborhood,
            },
            &mut events,
        );

        assert_eq!(query::materialized_count(&world), 25);
        assert_eq!(query::window(&world), Some(range));
        assert_eq!(query::cell_views(&world, range).len(), 25);
        assert!(matches!(
            events.last(),
            Some(Event::WindowSynchronized { .. })
        ));
    }

    #[test]
    fn values_hidden_outside_neighborhood() {
        let mut world = world(EvictionPolicy::Farming);
        let mut events = Vec::new();
        let far = CellCoord::new(10, 10);
        apply(
            &mut world,
            Command::SetToken {
                cell: far,
                token: Some(token(4)),
            },
            &mut events,
        );

        let views = query::cell_views(&world, CellRect::from_corners(far, far));
        assert_eq!(views.len(), 1);
        assert!(views[0].has_token);
        assert!(!views[0].in_neighborhood);
        assert_eq!(views[0].value, None);
    }

    #[test]
    fn move_updates_player() {
        let mut world = world(EvictionPolicy::Farming);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::North,
            },
            &mut events,
        );
        assert_eq!(query::player(&world), CellCoord::new(1, 0));
        assert_eq!(
            events,
            vec![Event::PlayerMoved {
                from: CellCoord::new(0, 0),
                to: CellCoord::new(1, 0),
            }]
        );
    }

    #[test]
    fn victory_freezes_interactions_and_moves() {
        let mut world = world(EvictionPolicy::Farming);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DeclareVictory { token: token(64) },
            &mut events,
        );
        assert!(query::is_won(&world));

        events.clear();
        apply(
            &mut world,
            Command::Interact {
                target: CellCoord::new(0, 0),
                player: CellCoord::new(0, 0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::InteractionRejected {
                    cell: CellCoord::new(0, 0),
                    reason: RejectionReason::SessionWon,
                },
                Event::PlayerMoveRejected {
                    direction: Direction::East,
                },
            ]
        );
        assert_eq!(query::player(&world), CellCoord::new(0, 0));
        assert!(query::cell(&world, CellCoord::new(0, 0)).is_none());
    }

    #[test]
    fn reset_clears_session() {
        let mut world = world(EvictionPolicy::Persistent);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetToken {
                cell: CellCoord::new(1, 1),
                token: Some(token(2)),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Interact {
                target: CellCoord::new(1, 1),
                player: CellCoord::new(0, 0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::South,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DeclareVictory { token: token(64) },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::Reset, &mut events);

        assert_eq!(
            events,
            vec![Event::WorldReset {
                player: CellCoord::new(0, 0),
            }]
        );
        assert!(!query::is_won(&world));
        assert_eq!(query::held(&world), None);
        assert_eq!(query::player(&world), query::start(&world));
        assert_eq!(query::materialized_count(&world), 0);
        assert_eq!(query::window(&world), None);
    }
}
