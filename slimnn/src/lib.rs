mod activations;
mod linear;
mod sampling;

pub use activations::{softmax, Activation, ActivationKind, ReLU, Sigmoid, Tanh};
pub use linear::Linear;
pub use sampling::sample_cdf;
