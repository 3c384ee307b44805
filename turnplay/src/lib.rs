pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod games;
pub mod observation;
pub mod players;
pub mod prelude;
pub mod telemetry;
mod utils;
