use crate::game::{Game, Step};
use crate::observation::Observation;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Each turn the player to move calls heads (`h`) or tails (`t`), then a
/// coin that lands heads with probability `bias` is flipped. A correct call
/// scores a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinFlip {
    pub bias: f32,
    pub max_turns: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoinFlipState {
    pub turns: usize,
    pub last_flip: Option<char>,
}

impl Default for CoinFlip {
    fn default() -> Self {
        Self {
            bias: 0.5,
            max_turns: None,
        }
    }
}

impl CoinFlip {
    pub fn new(bias: f32) -> Self {
        Self {
            bias,
            ..Default::default()
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = Some(max_turns);
        self
    }
}

impl Game for CoinFlip {
    type State = CoinFlipState;

    const NAME: &'static str = "coin-flip";

    fn initial_state<R: Rng + ?Sized>(&self, _rng: &mut R) -> Self::State {
        CoinFlipState::default()
    }

    fn observe(&self, _seat: usize, _state: &Self::State) -> Observation {
        Observation::new(vec!["h".into(), "t".into()], vec![])
    }

    fn step<R: Rng + ?Sized>(
        &self,
        state: &Self::State,
        _seat: usize,
        action: &str,
        rng: &mut R,
    ) -> Step<Self::State> {
        let flip = if rng.gen::<f32>() < self.bias { 'h' } else { 't' };
        let won = action.len() == 1 && action.starts_with(flip);
        Step {
            state: CoinFlipState {
                turns: state.turns + 1,
                last_flip: Some(flip),
            },
            reward: if won { 1.0 } else { 0.0 },
        }
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        self.max_turns.map_or(false, |m| state.turns >= m)
    }
}
