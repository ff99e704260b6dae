#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure window manager deriving which cells must be materialized and which are interactable.
//!
//! The system remembers the last viewport reported by the view layer and the
//! player's position as observed through world events. Whenever either changes
//! it emits a [`Command::SyncWindow`] carrying a fresh materialization range and
//! neighborhood; the world applies the eviction policy while executing it.

use world_of_bits_core::{CellCoord, CellRect, Command, Event};

/// Default cap on the materialization range, in cells per axis.
pub const DEFAULT_MAX_SPAN: u32 = 256;

/// Configuration parameters required to construct the window manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    neighborhood_size: u32,
    max_span: u32,
}

impl Config {
    /// Creates a new configuration. A zero `max_span` is treated as one cell.
    #[must_use]
    pub const fn new(neighborhood_size: u32, max_span: u32) -> Self {
        Self {
            neighborhood_size,
            max_span,
        }
    }
}

/// Pair of ranges produced for a viewport and player position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    /// Cells that must be materialized and rendered.
    pub materialize: CellRect,
    /// Cells whose values are shown and that accept interactions.
    pub neighborhood: CellRect,
}

impl Window {
    /// Cells of this window's materialization range that `next` no longer covers.
    pub fn released_by(&self, next: &Window) -> impl Iterator<Item = CellCoord> + '_ {
        let next = next.materialize;
        self.materialize
            .iter()
            .filter(move |cell| !next.contains(*cell))
    }
}

/// Window manager tracking the viewport and the player.
#[derive(Debug)]
pub struct Viewport {
    config: Config,
    viewport: Option<CellRect>,
    player: CellCoord,
    last: Option<Window>,
}

impl Viewport {
    /// Creates a window manager for a player standing on `player`.
    #[must_use]
    pub fn new(config: Config, player: CellCoord) -> Self {
        Self {
            config,
            viewport: None,
            player,
            last: None,
        }
    }

    /// Window emitted most recently, if any.
    #[must_use]
    pub fn last_window(&self) -> Option<Window> {
        self.last
    }

    /// Computes the window for a viewport and player without changing any state.
    #[must_use]
    pub fn window_for(&self, viewport: CellRect, player: CellCoord) -> Window {
        Window {
            materialize: clamp_span(viewport, self.config.max_span.max(1)),
            neighborhood: CellRect::around(player, self.config.neighborhood_size),
        }
    }

    /// Consumes world events and an optional new viewport to emit window commands.
    ///
    /// A command is emitted whenever a viewport is supplied or the player
    /// moved, provided a viewport has been reported at least once.
    pub fn handle(&mut self, events: &[Event], viewport: Option<CellRect>, out: &mut Vec<Command>) {
        let mut changed = false;
        for event in events {
            match event {
                Event::PlayerMoved { to, .. } => {
                    self.player = *to;
                    changed = true;
                }
                Event::WorldReset { player } => {
                    self.player = *player;
                    self.last = None;
                    changed = true;
                }
                _ => {}
            }
        }

        if let Some(viewport) = viewport {
            self.viewport = Some(viewport);
            changed = true;
        }

        if !changed {
            return;
        }

        if let Some(viewport) = self.viewport {
            let window = self.window_for(viewport, self.player);
            self.last = Some(window);
            out.push(Command::SyncWindow {
                materialize: window.materialize,
                neighborhood: window.neighborhood,
            });
        }
    }
}

/// Shrinks the rectangle to at most `span` cells per axis around its centre.
fn clamp_span(rect: CellRect, span: u32) -> CellRect {
    let (min_i, max_i) = clamp_axis(rect.min().i(), rect.max().i(), span);
    let (min_j, max_j) = clamp_axis(rect.min().j(), rect.max().j(), span);
    CellRect::from_corners(CellCoord::new(min_i, min_j), CellCoord::new(max_i, max_j))
}

fn clamp_axis(min: i32, max: i32, span: u32) -> (i32, i32) {
    let (low, high, span) = (i64::from(min), i64::from(max), i64::from(span));
    if high - low + 1 <= span {
        return (min, max);
    }
    let center = (low + high).div_euclid(2);
    let start = center - (span - 1) / 2;
    let end = start + span - 1;
    (
        i32::try_from(start).unwrap_or(min),
        i32::try_from(end).unwrap_or(max),
    )
}
