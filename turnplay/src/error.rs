use thiserror::Error;

/// Everything the engine, the games and the players can fail with.
#[derive(Debug, Error)]
pub enum GameError {
    /// The match cannot be set up: no players, duplicate ids, or a game
    /// producing observations that break the protocol.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Unknown player {player}")]
    UnknownPlayer { player: String },

    #[error("Illegal move {action} by player {player}")]
    IllegalMove { player: String, action: String },

    #[error("Player {player} moved out of turn, expected {expected}")]
    OutOfTurn { player: String, expected: String },

    #[error("Game is over")]
    GameOver,

    #[error("Game has not been initialized")]
    NotStarted,

    /// A player received an observation it cannot process.
    #[error("Unsupported observation: {0}")]
    UnsupportedObservation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
