use serde::{Deserialize, Serialize};

pub trait Activation {
    fn apply(&self, x: f32) -> f32;

    /// Derivative with respect to the pre-activation `x`.
    fn derivative(&self, x: f32) -> f32;

    fn apply_1d(&self, x: &[f32]) -> Vec<f32> {
        x.iter().map(|&v| self.apply(v)).collect()
    }

    fn derivative_1d(&self, x: &[f32]) -> Vec<f32> {
        x.iter().map(|&v| self.derivative(v)).collect()
    }
}

pub struct Sigmoid;
impl Activation for Sigmoid {
    fn apply(&self, x: f32) -> f32 {
        if x >= 0.0 {
            1.0 / (1.0 + (-x).exp())
        } else {
            let e = x.exp();
            e / (1.0 + e)
        }
    }

    fn derivative(&self, x: f32) -> f32 {
        let y = self.apply(x);
        y * (1.0 - y)
    }
}

pub struct ReLU;
impl Activation for ReLU {
    fn apply(&self, x: f32) -> f32 {
        x.max(0.0)
    }

    fn derivative(&self, x: f32) -> f32 {
        if x > 0.0 {
            1.0
        } else {
            0.0
        }
    }
}

pub struct Tanh;
impl Activation for Tanh {
    fn apply(&self, x: f32) -> f32 {
        x.tanh()
    }

    fn derivative(&self, x: f32) -> f32 {
        let y = x.tanh();
        1.0 - y * y
    }
}

/// Serializable choice of nonlinearity, so a saved network remembers
/// which function its weights were trained against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationKind {
    Sigmoid,
    Tanh,
    ReLU,
}

impl Default for ActivationKind {
    fn default() -> Self {
        ActivationKind::Sigmoid
    }
}

impl Activation for ActivationKind {
    fn apply(&self, x: f32) -> f32 {
        match self {
            ActivationKind::Sigmoid => Sigmoid.apply(x),
            ActivationKind::Tanh => Tanh.apply(x),
            ActivationKind::ReLU => ReLU.apply(x),
        }
    }

    fn derivative(&self, x: f32) -> f32 {
        match self {
            ActivationKind::Sigmoid => Sigmoid.derivative(x),
            ActivationKind::Tanh => Tanh.derivative(x),
            ActivationKind::ReLU => ReLU.derivative(x),
        }
    }
}

pub fn softmax(x: &[f32]) -> Vec<f32> {
    let max = x.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let mut y: Vec<f32> = x.iter().map(|&v| (v - max).exp()).collect();
    let total: f32 = y.iter().sum();
    for v in y.iter_mut() {
        *v /= total;
    }
    y
}
