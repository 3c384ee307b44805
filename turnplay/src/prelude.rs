pub use crate::config::{AdaptiveConfig, MissingValues};
pub use crate::engine::{Engine, Phase, TurnRecord};
pub use crate::error::GameError;
pub use crate::game::{Game, Step};
pub use crate::games::{CartPole, CartPoleState, CoinFlip, CoinFlipState, FALL_ANGLE};
pub use crate::observation::{
    ActionId, Observation, PlayerId, StateVariable, Value, VariableKind, GAME_OVER,
};
pub use crate::players::{AdaptivePlayer, FixedPlayer, Network, Player, RandomPlayer};
pub use crate::telemetry::{JsonLines, NetworkSnapshot, Telemetry};
