use serde::{Deserialize, Serialize};
use slimnn::ActivationKind;

/// What the adaptive player feeds the network for a known variable that is
/// missing from the current observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValues {
    CarryForward, // keep the last value seen
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    pub hidden_size: usize,
    pub learning_rate: f32,
    pub discount: f32,
    pub init_scale: f32, // new weights are drawn from [-init_scale, init_scale)
    pub activation: ActivationKind,
    pub missing: MissingValues,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            hidden_size: 8,
            learning_rate: 0.1,
            discount: 0.9,
            init_scale: 0.1,
            activation: ActivationKind::Sigmoid,
            missing: MissingValues::CarryForward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: AdaptiveConfig =
            serde_json::from_str(r#"{"hidden_size": 4, "missing": "zero", "activation": "relu"}"#)
                .unwrap();
        assert_eq!(cfg.hidden_size, 4);
        assert_eq!(cfg.missing, MissingValues::Zero);
        assert_eq!(cfg.activation, ActivationKind::ReLU);
        assert_eq!(cfg.learning_rate, AdaptiveConfig::default().learning_rate);
    }
}
