//! Neighborhood-gated collect / place / craft state machine.

use world_of_bits_core::{CellCoord, Event, InteractionOutcome, RejectionReason, Token};

use crate::World;

/// Contents of the target cell and the inventory after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) cell: Option<Token>,
    pub(crate) held: Option<Token>,
    pub(crate) outcome: InteractionOutcome,
}

impl Transition {
    fn unchanged(cell: Option<Token>, held: Option<Token>, outcome: InteractionOutcome) -> Self {
        Self {
            cell,
            held,
            outcome,
        }
    }
}

/// Resolves the transition table for a cell token `cell` and held token `held`.
///
/// | cell     | held      | result        |
/// |----------|-----------|---------------|
/// | none     | none      | noop          |
/// | v        | none      | collected(v)  |
/// | none     | v         | placed(v)     |
/// | v        | v         | crafted(2v)   |
/// | v1       | v2 != v1  | rejected      |
pub(crate) fn transition(cell: Option<Token>, held: Option<Token>) -> Transition {
    match (cell, held) {
        (None, None) => Transition::unchanged(None, None, InteractionOutcome::Noop),
        (Some(token), None) => Transition {
            cell: None,
            held: Some(token),
            outcome: InteractionOutcome::Collected(token),
        },
        (None, Some(token)) => Transition {
            cell: Some(token),
            held: None,
            outcome: InteractionOutcome::Placed(token),
        },
        (Some(stored), Some(carried)) if stored == carried => match stored.doubled() {
            Some(merged) => Transition {
                cell: Some(merged),
                held: None,
                outcome: InteractionOutcome::Crafted(merged),
            },
            None => Transition::unchanged(
                cell,
                held,
                InteractionOutcome::Rejected(RejectionReason::Overflow),
            ),
        },
        (Some(_), Some(_)) => Transition::unchanged(
            cell,
            held,
            InteractionOutcome::Rejected(RejectionReason::Mismatch),
        ),
    }
}

/// Checks the preconditions that hold before the target cell is consulted.
pub(crate) fn admit(
    target: CellCoord,
    player: CellCoord,
    neighborhood_size: u32,
    won: bool,
) -> Result<(), RejectionReason> {
    if won {
        return Err(RejectionReason::SessionWon);
    }
    if target.chebyshev_distance(player) > neighborhood_size {
        return Err(RejectionReason::OutOfRange);
    }
    Ok(())
}

/// Executes an interaction against the world, touching only `target` and the inventory.
pub(crate) fn execute(
    world: &mut World,
    target: CellCoord,
    player: CellCoord,
    out: &mut Vec<Event>,
) {
    if let Err(reason) = admit(target, player, world.neighborhood_size, world.won) {
        out.push(Event::InteractionRejected {
            cell: target,
            reason,
        });
        return;
    }

    let cell = world.store.get_or_materialize(target, out);
    let step = transition(cell.token(), world.inventory.held());

    let event = match step.outcome {
        InteractionOutcome::Noop => Event::InteractionIgnored { cell: target },
        InteractionOutcome::Rejected(reason) => Event::InteractionRejected {
            cell: target,
            reason,
        },
        InteractionOutcome::Collected(token) => Event::TokenCollected {
            cell: target,
            token,
        },
        InteractionOutcome::Placed(token) => Event::TokenPlaced {
            cell: target,
            token,
        },
        InteractionOutcome::Crafted(token) => Event::TokenCrafted {
            cell: target,
            token,
        },
    };

    if step.cell != cell.token() {
        world.store.set_token(target, step.cell, out);
    }
    let _ = world.inventory.replace(step.held);
    out.push(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: u64) -> Token {
        Token::from_value(value).expect("power of two")
    }

    #[test]
    fn empty_cell_and_empty_hand_is_noop() {
        let step = transition(None, None);
        assert_eq!(step.outcome, InteractionOutcome::Noop);
        assert_eq!((step.cell, step.held), (None, None));
    }

    #[test]
    fn collect_moves_token_into_inventory() {
        let step = transition(Some(token(4)), None);
        assert_eq!(step.outcome, InteractionOutcome::Collected(token(4)));
        assert_eq!((step.cell, step.held), (None, Some(token(4))));
    }

    #[test]
    fn place_moves_token_into_cell() {
        let step = transition(None, Some(token(2)));
        assert_eq!(step.outcome, InteractionOutcome::Placed(token(2)));
        assert_eq!((step.cell, step.held), (Some(token(2)), None));
    }

    #[test]
    fn craft_doubles_every_representable_value() {
        for exponent in 0..Token::MAX_EXPONENT {
            let carried = Token::from_exponent(exponent).expect("token");
            let step = transition(Some(carried), Some(carried));
            let merged = Token::from_exponent(exponent + 1).expect("token");
            assert_eq!(step.outcome, InteractionOutcome::Crafted(merged));
            assert_eq!((step.cell, step.held), (Some(merged), None));
        }
    }

    #[test]
    fn craft_at_largest_value_is_rejected() {
        let largest = Token::from_exponent(Token::MAX_EXPONENT).expect("token");
        let step = transition(Some(largest), Some(largest));
        assert_eq!(
            step.outcome,
            InteractionOutcome::Rejected(RejectionReason::Overflow)
        );
        assert_eq!((step.cell, step.held), (Some(largest), Some(largest)));
    }

    #[test]
    fn mismatched_values_are_rejected_without_change() {
        let step = transition(Some(token(8)), Some(token(2)));
        assert_eq!(
            step.outcome,
            InteractionOutcome::Rejected(RejectionReason::Mismatch)
        );
        assert_eq!((step.cell, step.held), (Some(token(8)), Some(token(2))));
    }

    #[test]
    fn admission_gates_on_distance_and_victory() {
        let player = CellCoord::new(0, 0);
        assert_eq!(admit(CellCoord::new(3, -3), player, 3, false), Ok(()));
        assert_eq!(
            admit(CellCoord::new(4, 0), player, 3, false),
            Err(RejectionReason::OutOfRange)
        );
        assert_eq!(admit(player, player, 0, false), Ok(()));
        assert_eq!(
            admit(player, player, 3, true),
            Err(RejectionReason::SessionWon)
        );
    }
}
