#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the World of Bits engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams and immutable
//! inputs, and respond exclusively with new command batches.

mod geo;

pub use geo::{GeoBounds, GridProjection, LatLng};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to World of Bits.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the active window: materializes every cell of `materialize`
    /// and evicts materialized cells that fall outside of it.
    SyncWindow {
        /// Cells that must be materialized for presentation.
        materialize: CellRect,
        /// Cells whose token values are visible and interactable.
        neighborhood: CellRect,
    },
    /// Requests that the player interact with the target cell.
    Interact {
        /// Cell the player is acting upon.
        target: CellCoord,
        /// Cell the player occupies while acting.
        player: CellCoord,
    },
    /// Requests that the player advance a single cell in the given direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Overwrites the token stored in a cell, materializing it first.
    SetToken {
        /// Cell whose token is replaced.
        cell: CellCoord,
        /// Token stored after the command, if any.
        token: Option<Token>,
    },
    /// Ends the session in victory.
    DeclareVictory {
        /// Token whose creation satisfied the win condition.
        token: Token,
    },
    /// Clears the world, empties the inventory and returns the player to the start.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that the window was replaced.
    WindowSynchronized {
        /// Cells materialized for presentation.
        materialize: CellRect,
        /// Cells whose token values are visible and interactable.
        neighborhood: CellRect,
    },
    /// Reports that a cell was created from the spawn source.
    CellMaterialized {
        /// Coordinate of the new cell.
        cell: CellCoord,
        /// Token produced by the spawn source, if any.
        token: Option<Token>,
    },
    /// Reports that a cell left the window.
    CellEvicted {
        /// Coordinate of the evicted cell.
        cell: CellCoord,
        /// Whether the logical cell record survived the eviction.
        retained: bool,
    },
    /// The player picked up the token stored in a cell.
    TokenCollected {
        /// Cell that was emptied.
        cell: CellCoord,
        /// Token moved into the inventory.
        token: Token,
    },
    /// The player put the held token into an empty cell.
    TokenPlaced {
        /// Cell that received the token.
        cell: CellCoord,
        /// Token moved out of the inventory.
        token: Token,
    },
    /// The player merged the held token with an equal token in a cell.
    TokenCrafted {
        /// Cell that holds the merged token.
        cell: CellCoord,
        /// Token produced by the merge.
        token: Token,
    },
    /// The player interacted with an empty cell while holding nothing.
    InteractionIgnored {
        /// Cell targeted by the interaction.
        cell: CellCoord,
    },
    /// Reports that an interaction was refused without mutation.
    InteractionRejected {
        /// Cell targeted by the interaction.
        cell: CellCoord,
        /// Specific reason the interaction failed.
        reason: RejectionReason,
    },
    /// A cell's token was overwritten directly.
    TokenSet {
        /// Cell whose token was replaced.
        cell: CellCoord,
        /// Token stored after the overwrite, if any.
        token: Option<Token>,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// Reports that a movement request was refused.
    PlayerMoveRejected {
        /// Direction of the refused step.
        direction: Direction,
    },
    /// Announces that the session reached its terminal victory state.
    SessionWon {
        /// Token whose creation satisfied the win condition.
        token: Token,
    },
    /// Confirms that the world was cleared and the player returned to the start.
    WorldReset {
        /// Cell the player occupies after the reset.
        player: CellCoord,
    },
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing latitude bands.
    North,
    /// Movement toward increasing longitude bands.
    East,
    /// Movement toward decreasing latitude bands.
    South,
    /// Movement toward decreasing longitude bands.
    West,
}

impl Direction {
    /// All directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Offset applied to `(i, j)` by a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (1, 0),
            Self::East => (0, 1),
            Self::South => (-1, 0),
            Self::West => (0, -1),
        }
    }
}

/// Location of a single grid cell.
///
/// `i` indexes latitude bands and `j` longitude bands, both measured in whole
/// tiles from the projection origin. The full `i32` range is addressable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    i: i32,
    j: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Latitude band index of the cell.
    #[must_use]
    pub const fn i(&self) -> i32 {
        self.i
    }

    /// Longitude band index of the cell.
    #[must_use]
    pub const fn j(&self) -> i32 {
        self.j
    }

    /// Computes the Chebyshev distance between two cell coordinates.
    #[must_use]
    pub const fn chebyshev_distance(self, other: CellCoord) -> u32 {
        let di = self.i.abs_diff(other.i);
        let dj = self.j.abs_diff(other.j);
        if di > dj {
            di
        } else {
            dj
        }
    }

    /// Returns the neighbouring cell in the given direction.
    ///
    /// Steps past the edge of the `i32` range saturate.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (di, dj) = direction.offset();
        Self {
            i: self.i.saturating_add(di),
            j: self.j.saturating_add(dj),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

/// Axis-aligned rectangle of cells with inclusive bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    min: CellCoord,
    max: CellCoord,
}

impl CellRect {
    /// Constructs a rectangle spanning both corners, in any order.
    #[must_use]
    pub fn from_corners(a: CellCoord, b: CellCoord) -> Self {
        Self {
            min: CellCoord::new(a.i().min(b.i()), a.j().min(b.j())),
            max: CellCoord::new(a.i().max(b.i()), a.j().max(b.j())),
        }
    }

    /// Chebyshev box of the given radius around `center`, saturating at the
    /// edges of the coordinate space.
    #[must_use]
    pub fn around(center: CellCoord, radius: u32) -> Self {
        let radius = i32::try_from(radius).unwrap_or(i32::MAX);
        Self {
            min: CellCoord::new(
                center.i().saturating_sub(radius),
                center.j().saturating_sub(radius),
            ),
            max: CellCoord::new(
                center.i().saturating_add(radius),
                center.j().saturating_add(radius),
            ),
        }
    }

    /// Lower corner of the rectangle.
    #[must_use]
    pub const fn min(&self) -> CellCoord {
        self.min
    }

    /// Upper corner of the rectangle.
    #[must_use]
    pub const fn max(&self) -> CellCoord {
        self.max
    }

    /// Number of latitude bands covered.
    #[must_use]
    pub const fn height(&self) -> u64 {
        self.max.i().abs_diff(self.min.i()) as u64 + 1
    }

    /// Number of longitude bands covered.
    #[must_use]
    pub const fn width(&self) -> u64 {
        self.max.j().abs_diff(self.min.j()) as u64 + 1
    }

    /// Total number of cells covered.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.height().saturating_mul(self.width())
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.i() >= self.min.i()
            && cell.i() <= self.max.i()
            && cell.j() >= self.min.j()
            && cell.j() <= self.max.j()
    }

    /// Iterates every cell row by row, ascending `i` then ascending `j`.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> {
        let (min, max) = (self.min, self.max);
        (min.i()..=max.i())
            .flat_map(move |i| (min.j()..=max.j()).map(move |j| CellCoord::new(i, j)))
    }
}

/// Power-of-two valued collectible a cell or the inventory may hold.
///
/// Tokens are stored by exponent so that only powers of two are representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Token {
    exponent: u8,
}

impl Token {
    /// Largest exponent whose value fits in a `u64`.
    pub const MAX_EXPONENT: u8 = 63;

    /// Token worth a single unit.
    pub const ONE: Token = Token { exponent: 0 };

    /// Creates the token worth `2^exponent`, if representable.
    #[must_use]
    pub const fn from_exponent(exponent: u8) -> Option<Self> {
        if exponent > Self::MAX_EXPONENT {
            None
        } else {
            Some(Self { exponent })
        }
    }

    /// Creates the token worth `value`, if it is a power of two.
    #[must_use]
    pub const fn from_value(value: u64) -> Option<Self> {
        if value.is_power_of_two() {
            Some(Self {
                exponent: value.trailing_zeros() as u8,
            })
        } else {
            None
        }
    }

    /// Exponent `k` of the token's value `2^k`.
    #[must_use]
    pub const fn exponent(&self) -> u8 {
        self.exponent
    }

    /// Numeric value of the token.
    #[must_use]
    pub const fn value(&self) -> u64 {
        1 << self.exponent
    }

    /// Token produced by merging two copies of this token.
    #[must_use]
    pub const fn doubled(self) -> Option<Self> {
        Self::from_exponent(self.exponent + 1)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Reasons an interaction may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The target lies outside the player's neighborhood.
    OutOfRange,
    /// The held token and the cell token differ, so they cannot be crafted.
    Mismatch,
    /// The session already reached victory.
    SessionWon,
    /// Crafting would exceed the largest representable token.
    Overflow,
}

/// Policy applied to the logical cell record when it leaves the window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Cells forget player mutations and regenerate from the seed on return.
    Farming,
    /// Mutated cells are retained and return unchanged.
    #[default]
    Persistent,
}

/// Discriminant of an [`InteractionOutcome`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// A token moved from the cell into the inventory.
    Collected,
    /// A token moved from the inventory into the cell.
    Placed,
    /// Two equal tokens merged into the cell.
    Crafted,
    /// The interaction was refused.
    Rejected,
    /// Nothing to do.
    Noop,
}

/// Result of a single interaction reported to the view layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionOutcome {
    /// The cell's token moved into the inventory.
    Collected(Token),
    /// The held token moved into the cell.
    Placed(Token),
    /// The held token merged into the cell, producing the contained token.
    Crafted(Token),
    /// The interaction was refused for the contained reason.
    Rejected(RejectionReason),
    /// Empty cell, empty inventory.
    Noop,
}

impl InteractionOutcome {
    /// Derives the outcome reported by an interaction event, if the event is one.
    #[must_use]
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::TokenCollected { token, .. } => Some(Self::Collected(*token)),
            Event::TokenPlaced { token, .. } => Some(Self::Placed(*token)),
            Event::TokenCrafted { token, .. } => Some(Self::Crafted(*token)),
            Event::InteractionRejected { reason, .. } => Some(Self::Rejected(*reason)),
            Event::InteractionIgnored { .. } => Some(Self::Noop),
            _ => None,
        }
    }

    /// Discriminant of the outcome.
    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Collected(_) => OutcomeKind::Collected,
            Self::Placed(_) => OutcomeKind::Placed,
            Self::Crafted(_) => OutcomeKind::Crafted,
            Self::Rejected(_) => OutcomeKind::Rejected,
            Self::Noop => OutcomeKind::Noop,
        }
    }

    /// Token value carried by the outcome, if any.
    #[must_use]
    pub const fn value(&self) -> Option<u64> {
        match self {
            Self::Collected(token) | Self::Placed(token) | Self::Crafted(token) => {
                Some(token.value())
            }
            Self::Rejected(_) | Self::Noop => None,
        }
    }
}

/// Renderable description of a single materialized cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellView {
    /// Coordinate of the cell.
    pub coord: CellCoord,
    /// Whether the cell currently stores a token.
    pub has_token: bool,
    /// Token value, only disclosed inside the neighborhood.
    pub value: Option<u64>,
    /// Whether the cell lies inside the player's neighborhood.
    pub in_neighborhood: bool,
}
