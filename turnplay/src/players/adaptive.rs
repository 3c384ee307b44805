use super::network::{Network, Pass};
use super::traits::Player;
use crate::config::{AdaptiveConfig, MissingValues};
use crate::error::GameError;
use crate::observation::{ActionId, Observation, StateVariable, VariableKind, GAME_OVER};
use crate::telemetry::Telemetry;
use log::debug;
use rand::Rng;
use slimnn::{sample_cdf, softmax};
use std::path::Path;

/// What the player remembers between two decisions of the same game.
#[derive(Debug, Clone)]
struct Memory {
    action: usize,
    score: f32,
    pass: Pass,
}

/// Softmax over the activations of the `legal` output indices, then the
/// smallest of them whose cumulative probability reaches `u`.
pub fn sample_legal(activations: &[f32], legal: &[usize], u: f32) -> Option<usize> {
    let logits: Vec<f32> = legal.iter().map(|&i| activations[i]).collect();
    let probs = softmax(&logits);
    sample_cdf(&probs, u).map(|k| legal[k])
}

fn scalar(var: &StateVariable) -> Result<f32, GameError> {
    if var.kind == VariableKind::Unsupported {
        return Err(GameError::UnsupportedObservation(format!(
            "variable {} has an unknown kind",
            var.name
        )));
    }
    match var.value.as_scalar() {
        Some(x) if x.is_finite() => Ok(x),
        Some(x) => Err(GameError::UnsupportedObservation(format!(
            "variable {} is not finite: {}",
            var.name, x
        ))),
        None => {
            let what = match var.kind {
                VariableKind::Categorical => "a numeric category code",
                _ => "a single real number",
            };
            Err(GameError::UnsupportedObservation(format!(
                "variable {} ({}) must be {}, got {}",
                var.name, var.kind, what, var.value
            )))
        }
    }
}

/// A player that learns while it plays.
///
/// The network starts with no inputs and no outputs. Every variable name and
/// action name the player meets adds an input or an output. After each
/// transition the value of the action it took last is nudged toward
/// `reward + discount * max Q(next)`, where the reward is how much its own
/// score changed in between.
pub struct AdaptivePlayer<R: Rng> {
    id: String,
    cfg: AdaptiveConfig,
    network: Network,
    rng: R,
    memory: Option<Memory>,
    telemetry: Option<Box<dyn Telemetry>>,
}

impl<R: Rng> AdaptivePlayer<R> {
    pub fn new(id: &str, cfg: AdaptiveConfig, mut rng: R) -> Self {
        let network = Network::new(cfg.hidden_size, cfg.activation, cfg.init_scale, &mut rng);
        Self::with_network(id, cfg, network, rng)
    }

    /// Continues from an existing (for example loaded) network.
    pub fn with_network(id: &str, mut cfg: AdaptiveConfig, network: Network, rng: R) -> Self {
        cfg.hidden_size = network.hidden_size();
        cfg.activation = network.activation();
        Self {
            id: id.into(),
            cfg,
            network,
            rng,
            memory: None,
            telemetry: None,
        }
    }

    pub fn load<P: AsRef<Path>>(
        id: &str,
        cfg: AdaptiveConfig,
        path: P,
        rng: R,
    ) -> Result<Self, GameError> {
        Ok(Self::with_network(id, cfg, Network::load(path)?, rng))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GameError> {
        self.network.save(path)
    }

    pub fn with_telemetry(mut self, sink: Box<dyn Telemetry>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    pub fn config(&self) -> &AdaptiveConfig {
        &self.cfg
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn known_variables(&self) -> &[String] {
        self.network.variables()
    }

    pub fn known_actions(&self) -> &[String] {
        self.network.actions()
    }

    pub fn is_idle(&self) -> bool {
        self.memory.is_none()
    }

    fn ingest(&mut self, values: &[(&str, f32)]) {
        if self.cfg.missing == MissingValues::Zero {
            for i in 0..self.network.variables().len() {
                self.network.set_input(i, 0.0);
            }
        }
        for &(name, x) in values.iter() {
            if let Some(i) = self.network.variable_index(name) {
                self.network.set_input(i, x);
            }
        }
    }

    fn legal_indices(&self, observation: &Observation) -> Vec<usize> {
        self.network
            .actions()
            .iter()
            .enumerate()
            .filter(|(_, a)| observation.is_legal(a))
            .map(|(i, _)| i)
            .collect()
    }

    /// Best value among the known legal actions at the freshly ingested inputs.
    fn next_value(&self, observation: &Observation) -> f32 {
        if observation.is_terminal() {
            return 0.0;
        }
        let legal = self.legal_indices(observation);
        if legal.is_empty() {
            return 0.0;
        }
        let pass = self.network.evaluate(self.network.inputs());
        legal
            .iter()
            .map(|&i| pass.output[i])
            .fold(f32::NEG_INFINITY, f32::max)
    }

    fn learn(&mut self, memory: Memory, score: f32, observation: &Observation) {
        let reward = score - memory.score;
        let q = memory.pass.output[memory.action];
        let future = self.next_value(observation);
        let td = reward - (q - self.cfg.discount * future);
        self.network
            .td_update(&memory.pass, memory.action, td, self.cfg.learning_rate);
        debug!(
            "{} learned: action {} reward {} q {} future {} td {}",
            self.id,
            self.network.actions()[memory.action],
            reward,
            q,
            future,
            td
        );
    }

    fn grow(&mut self, values: &[(&str, f32)], observation: &Observation) {
        let scale = self.cfg.init_scale;
        for &(name, x) in values.iter() {
            if self.network.variable_index(name).is_none() {
                self.network.add_variable(name, x, scale, &mut self.rng);
                debug!("{} grew input {}", self.id, name);
            }
        }
        for action in observation.legal_actions.iter() {
            if self.network.action_index(action).is_none() {
                self.network.add_action(action, scale, &mut self.rng);
                debug!("{} grew output {}", self.id, action);
            }
        }
    }
}

impl<R: Rng> Player for AdaptivePlayer<R> {
    fn id(&self) -> &str {
        &self.id
    }

    fn learned(&self) -> Option<&Network> {
        Some(&self.network)
    }

    fn select_move(&mut self, observation: &Observation) -> Result<ActionId, GameError> {
        // everything that can fail is checked before the network is touched
        let score = observation.score(&self.id).ok_or_else(|| {
            GameError::UnsupportedObservation(format!("no score for player {}", self.id))
        })?;
        let values = observation
            .state_variables
            .iter()
            .map(|var| scalar(var).map(|x| (var.name.as_str(), x)))
            .collect::<Result<Vec<_>, _>>()?;

        self.ingest(&values);

        if let Some(memory) = self.memory.take() {
            self.learn(memory, score, observation);
        }

        if observation.is_terminal() {
            return Ok(GAME_OVER.into());
        }

        self.grow(&values, observation);
        let pass = self.network.forward().clone();

        let legal = self.legal_indices(observation);
        let u: f32 = self.rng.gen();
        let index = sample_legal(&pass.output, &legal, u)
            .ok_or_else(|| GameError::UnsupportedObservation("no legal actions".into()))?;

        if let Some(sink) = self.telemetry.as_mut() {
            sink.publish(&self.network.snapshot(&self.id));
        }

        self.memory = Some(Memory {
            action: index,
            score,
            pass,
        });
        Ok(self.network.actions()[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::{StateVariable, Value};
    use crate::telemetry::NetworkSnapshot;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    fn player() -> AdaptivePlayer<StdRng> {
        AdaptivePlayer::new("nn", AdaptiveConfig::default(), StdRng::seed_from_u64(3))
    }

    fn obs(actions: &[&str], vars: Vec<StateVariable>, score: f32) -> Observation {
        let mut scores = BTreeMap::new();
        scores.insert("nn".to_string(), score);
        Observation::new(actions.iter().map(|a| a.to_string()).collect(), vars).with_scores(scores)
    }

    fn x(value: f32) -> StateVariable {
        StateVariable::continuous("x", value)
    }

    #[test]
    fn test_sample_legal() {
        // softmax of [0, ln 3] is [0.25, 0.75]
        let activations = [0.0, 3f32.ln(), 5.0];
        assert_eq!(sample_legal(&activations, &[0, 1], 0.2), Some(0));
        assert_eq!(sample_legal(&activations, &[0, 1], 0.3), Some(1));
        assert_eq!(sample_legal(&activations, &[2], 0.99), Some(2));
        assert_eq!(sample_legal(&activations, &[], 0.5), None);
    }

    #[test]
    fn test_new_action_grows_by_one() {
        let mut p = player();
        assert_eq!(p.select_move(&obs(&["a"], vec![x(1.0)], 0.0)).unwrap(), "a");
        assert_eq!(p.known_actions().len(), 1);

        p.select_move(&obs(&["a", "b"], vec![x(1.0)], 0.0)).unwrap();
        assert_eq!(p.known_actions(), &["a".to_string(), "b".to_string()][..]);

        assert_eq!(p.select_move(&obs(&["b"], vec![x(1.0)], 0.0)).unwrap(), "b");
        let mut seen_b = false;
        for _ in 0..100 {
            seen_b |= p.select_move(&obs(&["a", "b"], vec![x(1.0)], 0.0)).unwrap() == "b";
        }
        assert!(seen_b);
        assert_eq!(p.known_actions().len(), 2);
    }

    #[test]
    fn test_new_variable_keeps_prior_weights() {
        let mut p = player();
        p.select_move(&obs(&["a", "b"], vec![x(1.0)], 0.0)).unwrap();
        p.select_move(&obs(&["a", "b"], vec![], 0.0).into_terminal()).unwrap();
        assert!(p.is_idle());

        let hidden = p.network().hidden().clone();
        let output = p.network().output().clone();

        let y = StateVariable::continuous("y", 2.0);
        p.select_move(&obs(&["a", "b"], vec![x(1.0), y], 0.0)).unwrap();
        assert_eq!(p.known_variables(), &["x".to_string(), "y".to_string()][..]);
        for (row, before) in p.network().hidden().weight.iter().zip(hidden.weight.iter()) {
            assert_eq!(row.len(), 2);
            assert_eq!(row[0], before[0]);
        }
        assert_eq!(p.network().hidden().bias, hidden.bias);
        assert_eq!(*p.network().output(), output);
    }

    #[test]
    fn test_growth_is_idempotent() {
        let mut p = player();
        let o = obs(&["a", "b"], vec![x(1.0), StateVariable::continuous("y", 0.0)], 0.0);
        p.select_move(&o).unwrap();
        p.select_move(&o).unwrap();
        assert_eq!(p.known_variables().len(), 2);
        assert_eq!(p.known_actions().len(), 2);
        assert_eq!(p.network().hidden().num_inputs(), 2);
        assert_eq!(p.network().output().num_outputs(), 2);
    }

    #[test]
    fn test_rejects_non_scalar_without_changes() {
        let mut p = player();
        p.select_move(&obs(&["a"], vec![x(1.0)], 0.0)).unwrap();
        let before = p.network().clone();

        let bad = vec![
            StateVariable::new("x", VariableKind::Continuous, "tall"),
            StateVariable::new("v", VariableKind::Ordinal, vec![1.0f32, 2.0]),
            StateVariable::new("c", VariableKind::Categorical, "red"),
            StateVariable::continuous("n", f32::NAN),
        ];
        for var in bad {
            let result = p.select_move(&obs(&["a", "b"], vec![x(3.0), var], 1.0));
            assert!(matches!(result, Err(GameError::UnsupportedObservation(_))));
        }
        assert_eq!(*p.network(), before);
        assert!(!p.is_idle());
    }

    #[test]
    fn test_unknown_kind_from_json_is_rejected() {
        let mut p = player();
        p.select_move(&obs(&["a"], vec![x(1.0)], 0.0)).unwrap();
        let before = p.network().clone();

        let o: Observation = serde_json::from_str(
            r#"{
                "legal_actions": ["a", "b"],
                "state_variables": [
                    {"name": "x", "kind": "continuous", "value": 2.0},
                    {"name": "z", "kind": "complex", "value": 1.0}
                ],
                "scores": {"nn": 1.0},
                "terminal": false
            }"#,
        )
        .unwrap();
        assert!(matches!(
            p.select_move(&o),
            Err(GameError::UnsupportedObservation(_))
        ));
        assert_eq!(*p.network(), before);
    }

    #[test]
    fn test_numeric_category_is_accepted() {
        let mut p = player();
        let code = StateVariable::new("suit", VariableKind::Categorical, Value::Number(2.0));
        p.select_move(&obs(&["a"], vec![code], 0.0)).unwrap();
        assert_eq!(p.network().inputs(), &[2.0]);
    }

    #[test]
    fn test_missing_score_is_rejected() {
        let mut p = player();
        let o = Observation::new(vec!["a".into()], vec![]);
        assert!(matches!(
            p.select_move(&o),
            Err(GameError::UnsupportedObservation(_))
        ));
        assert!(p.known_actions().is_empty());
    }

    #[test]
    fn test_terminal_resets_to_idle() {
        let mut p = player();
        assert!(p.is_idle());
        p.select_move(&obs(&["a"], vec![x(1.0)], 0.0)).unwrap();
        assert!(!p.is_idle());
        let over = obs(&["a"], vec![x(1.0)], 1.0).into_terminal();
        assert_eq!(p.select_move(&over).unwrap(), GAME_OVER);
        assert!(p.is_idle());
        assert_eq!(p.known_actions(), &["a".to_string()][..]);
    }

    #[test]
    fn test_rewards_raise_value() {
        let cfg = AdaptiveConfig {
            discount: 0.0,
            learning_rate: 0.5,
            ..AdaptiveConfig::default()
        };
        let mut p = AdaptivePlayer::new("nn", cfg, StdRng::seed_from_u64(0));
        p.select_move(&obs(&["a"], vec![x(1.0)], 0.0)).unwrap();
        let first = p.network().pass().output[0];
        for t in 1..50 {
            p.select_move(&obs(&["a"], vec![x(1.0)], t as f32)).unwrap();
        }
        assert!(p.network().pass().output[0] > first + 0.1);
    }

    #[test]
    fn test_penalties_lower_value() {
        let cfg = AdaptiveConfig {
            discount: 0.0,
            learning_rate: 0.5,
            ..AdaptiveConfig::default()
        };
        let mut p = AdaptivePlayer::new("nn", cfg, StdRng::seed_from_u64(0));
        p.select_move(&obs(&["a"], vec![x(1.0)], 0.0)).unwrap();
        let first = p.network().pass().output[0];
        for t in 1..50 {
            p.select_move(&obs(&["a"], vec![x(1.0)], -(t as f32))).unwrap();
        }
        assert!(p.network().pass().output[0] < first - 0.1);
    }

    #[test]
    fn test_missing_values_policy() {
        let mut carry = player();
        carry.select_move(&obs(&["a"], vec![x(4.0)], 0.0)).unwrap();
        carry.select_move(&obs(&["a"], vec![], 0.0)).unwrap();
        assert_eq!(carry.network().inputs(), &[4.0]);

        let cfg = AdaptiveConfig {
            missing: MissingValues::Zero,
            ..AdaptiveConfig::default()
        };
        let mut zero = AdaptivePlayer::new("nn", cfg, StdRng::seed_from_u64(3));
        zero.select_move(&obs(&["a"], vec![x(4.0)], 0.0)).unwrap();
        zero.select_move(&obs(&["a"], vec![], 0.0)).unwrap();
        assert_eq!(zero.network().inputs(), &[0.0]);
    }

    #[test]
    fn test_same_seed_same_choices() {
        let o = obs(&["a", "b", "c"], vec![x(0.5)], 0.0);
        let mut p1 = player();
        let mut p2 = player();
        for _ in 0..20 {
            assert_eq!(p1.select_move(&o).unwrap(), p2.select_move(&o).unwrap());
        }
    }

    #[test]
    fn test_publishes_one_snapshot_per_decision() {
        let sink = Rc::new(RefCell::new(Vec::<NetworkSnapshot>::new()));
        let mut p = player().with_telemetry(Box::new(sink.clone()));
        p.select_move(&obs(&["a", "b"], vec![x(1.0)], 0.0)).unwrap();
        p.select_move(&obs(&["a", "b"], vec![x(1.0)], 1.0)).unwrap();
        p.select_move(&obs(&["a", "b"], vec![], 1.0).into_terminal()).unwrap();

        let snapshots = sink.borrow();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[1].actions, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(snapshots[1].layers.len(), 3);
        assert_eq!(snapshots[1].layers[2].len(), 2);
        assert_eq!(snapshots[1].weights[0].len(), AdaptiveConfig::default().hidden_size);
    }

    #[test]
    fn test_save_load_keeps_behaviour() {
        let mut p = player();
        for t in 0..10 {
            p.select_move(&obs(&["l", "r"], vec![x(t as f32 / 10.0)], t as f32))
                .unwrap();
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nn.json");
        p.save(&path).unwrap();

        let q = AdaptivePlayer::load("nn", AdaptiveConfig::default(), &path, StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(q.known_variables(), p.known_variables());
        assert_eq!(q.known_actions(), p.known_actions());
        let inputs = [0.25];
        assert_eq!(q.network().evaluate(&inputs), p.network().evaluate(&inputs));
    }
}
