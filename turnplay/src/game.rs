use crate::observation::Observation;
use rand::Rng;

/// The outcome of applying one action: the next state and the reward
/// credited to the player who moved.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S> {
    pub state: S,
    pub reward: f32,
}

/// Rules of a turn-based game.
///
/// A game never owns its state or its players; the [`Engine`](crate::engine::Engine)
/// does. Players are referred to by seat, their position in the turn order.
/// `step` is only ever called with an action taken from the `legal_actions`
/// of `observe` for the same seat and state.
pub trait Game {
    type State: Clone + std::fmt::Debug;

    const NAME: &'static str;

    fn initial_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::State;

    /// Legal actions and state variables visible from `seat`. Scores and the
    /// terminal flag are filled in by the engine.
    fn observe(&self, seat: usize, state: &Self::State) -> Observation;

    fn step<R: Rng + ?Sized>(
        &self,
        state: &Self::State,
        seat: usize,
        action: &str,
        rng: &mut R,
    ) -> Step<Self::State>;

    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Seat to move on turn `turn` (0-based). Round-robin unless a game says otherwise.
    fn next_player(&self, _state: &Self::State, turn: usize, num_players: usize) -> usize {
        turn % num_players
    }

    /// Human readable line logged once the game has ended.
    fn summary(&self, _state: &Self::State, _scores: &[(String, f32)]) -> Option<String> {
        None
    }
}
