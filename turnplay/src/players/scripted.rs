use super::traits::Player;
use crate::error::GameError;
use crate::observation::{ActionId, Observation, GAME_OVER};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// Picks uniformly among the legal actions.
pub struct RandomPlayer<R: Rng> {
    id: String,
    rng: R,
}

impl<R: Rng> RandomPlayer<R> {
    pub fn new(id: &str, rng: R) -> Self {
        Self { id: id.into(), rng }
    }
}

impl<R: Rng> Player for RandomPlayer<R> {
    fn id(&self) -> &str {
        &self.id
    }

    fn select_move(&mut self, observation: &Observation) -> Result<ActionId, GameError> {
        if observation.is_terminal() {
            return Ok(GAME_OVER.into());
        }
        let action = observation
            .legal_actions
            .choose(&mut self.rng)
            .cloned()
            .ok_or_else(|| GameError::UnsupportedObservation("no legal actions".into()))?;
        debug!("random player {} guessed {}", self.id, action);
        Ok(action)
    }
}

/// Always plays `action`, falling back to the first legal action when it
/// is not available.
pub struct FixedPlayer {
    id: String,
    action: ActionId,
}

impl FixedPlayer {
    pub fn new(id: &str, action: &str) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
        }
    }
}

impl Player for FixedPlayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn select_move(&mut self, observation: &Observation) -> Result<ActionId, GameError> {
        if observation.is_terminal() {
            return Ok(GAME_OVER.into());
        }
        if observation.is_legal(&self.action) {
            return Ok(self.action.clone());
        }
        observation
            .legal_actions
            .first()
            .cloned()
            .ok_or_else(|| GameError::UnsupportedObservation("no legal actions".into()))
    }
}
