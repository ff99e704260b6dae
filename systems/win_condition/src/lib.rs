#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Passive observer that ends the session once a crafted token reaches the threshold.

use world_of_bits_core::{Command, Event, Token};

/// Default token value that wins the session.
pub const DEFAULT_WIN_THRESHOLD: u64 = 64;

/// Win-condition monitor consuming craft events.
#[derive(Clone, Debug)]
pub struct WinCondition {
    threshold: u64,
    declared: bool,
    best: Option<Token>,
}

impl Default for WinCondition {
    fn default() -> Self {
        Self::new(DEFAULT_WIN_THRESHOLD)
    }
}

impl WinCondition {
    /// Creates a monitor that declares victory for crafts worth at least `threshold`.
    #[must_use]
    pub const fn new(threshold: u64) -> Self {
        Self {
            threshold,
            declared: false,
            best: None,
        }
    }

    /// Token value that wins the session.
    #[must_use]
    pub const fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Largest token crafted since the last reset.
    #[must_use]
    pub const fn best(&self) -> Option<Token> {
        self.best
    }

    /// Reports whether crafting `token` satisfies the win condition.
    #[must_use]
    pub const fn is_winning(&self, token: Token) -> bool {
        token.value() >= self.threshold
    }

    /// Consumes world events and emits a victory command for the first winning craft.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TokenCrafted { token, .. } => {
                    if self.best.map_or(true, |best| *token > best) {
                        self.best = Some(*token);
                    }
                    if !self.declared && self.is_winning(*token) {
                        self.declared = true;
                        out.push(Command::DeclareVictory { token: *token });
                    }
                }
                Event::SessionWon { .. } => self.declared = true,
                Event::WorldReset { .. } => {
                    self.declared = false;
                    self.best = None;
                }
                _ => {}
            }
        }
    }
}
