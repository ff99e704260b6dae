//! ASCII rendition of the viewport.

use std::{collections::BTreeMap, fmt::Write as _};

use world_of_bits_core::{
    CellCoord, CellRect, CellView, EvictionPolicy, InteractionOutcome, RejectionReason,
};
use world_of_bits_engine::Engine;

const CELL_WIDTH: usize = 5;

/// Draws `range` north-up, one text column block per cell.
///
/// Tokens inside the neighborhood show their value, tokens outside show `*`,
/// empty neighborhood cells show `.` and the player's cell is marked with `@`.
pub(crate) fn render(views: &[CellView], range: CellRect, player: CellCoord) -> String {
    let by_coord: BTreeMap<CellCoord, &CellView> =
        views.iter().map(|view| (view.coord, view)).collect();
    let mut text = String::new();

    for i in (range.min().i()..=range.max().i()).rev() {
        for j in range.min().j()..=range.max().j() {
            let coord = CellCoord::new(i, j);
            let glyph = match by_coord.get(&coord) {
                Some(view) => glyph(view),
                None => String::from("?"),
            };
            let marker = if coord == player { '@' } else { ' ' };
            let _ = write!(text, "{marker}{glyph:>width$}", width = CELL_WIDTH - 1);
        }
        text.push('\n');
    }
    text
}

fn glyph(view: &CellView) -> String {
    match (view.value, view.has_token, view.in_neighborhood) {
        (Some(value), _, _) => value.to_string(),
        (None, true, _) => String::from("*"),
        (None, false, true) => String::from("."),
        (None, false, false) => String::new(),
    }
}

/// One-line status summary.
pub(crate) fn status(engine: &Engine) -> String {
    let held = engine
        .held()
        .map_or_else(|| String::from("nothing"), |token| token.to_string());
    let policy = match engine.eviction_policy() {
        EvictionPolicy::Farming => "farming",
        EvictionPolicy::Persistent => "persistent",
    };
    let mut line = format!(
        "player {}, holding {held}, goal {}, reach {}, {policy} world",
        engine.player(),
        engine.win_threshold(),
        engine.neighborhood_size(),
    );
    if engine.is_won() {
        line.push_str(", you won! type `reset` to play again");
    }
    line
}

/// Human-readable description of an interaction result.
pub(crate) fn describe(outcome: InteractionOutcome) -> String {
    match outcome {
        InteractionOutcome::Collected(token) => format!("collected {token}"),
        InteractionOutcome::Placed(token) => format!("placed {token}"),
        InteractionOutcome::Crafted(token) => format!("crafted {token}"),
        InteractionOutcome::Rejected(RejectionReason::OutOfRange) => {
            String::from("that cell is too far away")
        }
        InteractionOutcome::Rejected(RejectionReason::Mismatch) => {
            String::from("only equal tokens can be crafted")
        }
        InteractionOutcome::Rejected(RejectionReason::SessionWon) => {
            String::from("the game is over")
        }
        InteractionOutcome::Rejected(RejectionReason::Overflow) => {
            String::from("that token is as large as tokens get")
        }
        InteractionOutcome::Noop => String::from("nothing here"),
    }
}
