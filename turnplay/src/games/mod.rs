mod cart_pole;
mod coin_flip;

pub use cart_pole::{CartPole, CartPoleState, FALL_ANGLE};
pub use coin_flip::{CoinFlip, CoinFlipState};
