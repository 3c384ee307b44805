mod adaptive;
mod network;
mod scripted;
mod traits;

pub use adaptive::{sample_legal, AdaptivePlayer};
pub use network::{Network, Pass};
pub use scripted::{FixedPlayer, RandomPlayer};
pub use traits::Player;
