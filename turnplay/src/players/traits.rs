use crate::error::GameError;
use crate::observation::{ActionId, Observation};
use crate::players::Network;

/// A policy: given what it can see, pick one of the legal actions.
///
/// On a terminal observation a player must answer with
/// [`GAME_OVER`](crate::observation::GAME_OVER). Implementations may block
/// for as long as they need (a human at a keyboard); the engine imposes no
/// timeout.
pub trait Player {
    fn id(&self) -> &str;
    fn select_move(&mut self, observation: &Observation) -> Result<ActionId, GameError>;

    /// The network a learning player has built up, if it has one.
    fn learned(&self) -> Option<&Network> {
        None
    }
}
