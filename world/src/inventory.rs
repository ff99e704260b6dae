//! Single-slot inventory carried by the player.

use world_of_bits_core::Token;

/// Holds at most one token; the slot type makes a second token unrepresentable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    held: Option<Token>,
}

impl Inventory {
    /// Token currently carried, if any.
    #[must_use]
    pub const fn held(&self) -> Option<Token> {
        self.held
    }

    /// Reports whether the player carries nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.held.is_none()
    }

    pub(crate) fn replace(&mut self, held: Option<Token>) -> Option<Token> {
        std::mem::replace(&mut self.held, held)
    }

    pub(crate) fn clear(&mut self) {
        self.held = None;
    }
}
