use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

pub type ActionId = String;
pub type PlayerId = String;

/// Reserved action a player returns once the game has ended.
pub const GAME_OVER: &str = "GAME_OVER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Continuous,
    Discrete,
    Ordinal,
    Categorical,
    /// Any kind name outside the four above. Players reject it.
    #[serde(other)]
    Unsupported,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Continuous => "continuous",
            Self::Discrete => "discrete",
            Self::Ordinal => "ordinal",
            Self::Categorical => "categorical",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f32),
    Vector(Vec<f32>),
    Text(String),
}

impl Value {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Number(x) => Some(*x),
            _ => None,
        }
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Number(x)
    }
}

impl From<Vec<f32>> for Value {
    fn from(x: Vec<f32>) -> Self {
        Value::Vector(x)
    }
}

impl From<&str> for Value {
    fn from(x: &str) -> Self {
        Value::Text(x.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(x) => write!(f, "{}", x),
            Value::Vector(xs) => write!(f, "{:?}", xs),
            Value::Text(s) => write!(f, "{:?}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVariable {
    pub name: String,
    pub kind: VariableKind,
    pub value: Value,
}

impl StateVariable {
    pub fn new<V: Into<Value>>(name: &str, kind: VariableKind, value: V) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }

    pub fn continuous(name: &str, value: f32) -> Self {
        Self::new(name, VariableKind::Continuous, value)
    }
}

/// What a player sees on its turn.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    pub legal_actions: Vec<ActionId>,
    pub state_variables: Vec<StateVariable>,
    pub scores: BTreeMap<PlayerId, f32>,
    pub terminal: bool,
    /// Text drawing of the state for people, when the game has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl Observation {
    pub fn new(legal_actions: Vec<ActionId>, state_variables: Vec<StateVariable>) -> Self {
        Self {
            legal_actions,
            state_variables,
            scores: BTreeMap::new(),
            terminal: false,
            picture: None,
        }
    }

    pub fn with_picture(mut self, picture: String) -> Self {
        self.picture = Some(picture);
        self
    }

    pub fn with_scores(mut self, scores: BTreeMap<PlayerId, f32>) -> Self {
        self.scores = scores;
        self
    }

    /// Turns this into the end-of-game signal: the only legal action left
    /// is [`GAME_OVER`].
    pub fn into_terminal(mut self) -> Self {
        self.legal_actions = vec![GAME_OVER.into()];
        self.terminal = true;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
            || self.legal_actions.is_empty()
            || (self.legal_actions.len() == 1 && self.legal_actions[0] == GAME_OVER)
    }

    pub fn is_legal(&self, action: &str) -> bool {
        self.legal_actions.iter().any(|a| a == action)
    }

    pub fn variable(&self, name: &str) -> Option<&StateVariable> {
        self.state_variables.iter().find(|v| v.name == name)
    }

    pub fn score(&self, player: &str) -> Option<f32> {
        self.scores.get(player).copied()
    }

    /// Checks the obligations a game has when producing an observation.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.legal_actions.is_empty() && !self.terminal {
            return Err(GameError::Configuration(
                "non-terminal observation without legal actions".into(),
            ));
        }
        let mut seen = HashSet::new();
        for action in self.legal_actions.iter() {
            if !seen.insert(action.as_str()) {
                return Err(GameError::Configuration(format!(
                    "duplicate legal action {}",
                    action
                )));
            }
        }
        let mut seen = HashSet::new();
        for var in self.state_variables.iter() {
            if !seen.insert(var.name.as_str()) {
                return Err(GameError::Configuration(format!(
                    "duplicate state variable {}",
                    var.name
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scores: Vec<String> = self
            .scores
            .iter()
            .map(|(player, score)| format!("{}: {}", player, score))
            .collect();
        writeln!(f, "scores | {}", scores.join(", "))?;
        if let Some(picture) = &self.picture {
            writeln!(f, "{}", picture)?;
        }
        for var in self.state_variables.iter() {
            writeln!(f, "{} ({}) = {}", var.name, var.kind, var.value)?;
        }
        if self.is_terminal() {
            write!(f, "game over")
        } else {
            write!(f, "moves | {}", self.legal_actions.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(names: &[&str]) -> Vec<ActionId> {
        names.iter().map(|&a| a.to_string()).collect()
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let var: StateVariable =
            serde_json::from_str(r#"{"name": "z", "kind": "complex", "value": 1.0}"#).unwrap();
        assert_eq!(var.kind, VariableKind::Unsupported);
        let var: StateVariable =
            serde_json::from_str(r#"{"name": "z", "kind": "ordinal", "value": 3.0}"#).unwrap();
        assert_eq!(var.kind, VariableKind::Ordinal);
    }

    #[test]
    fn test_parse_json_observation() {
        let obs: Observation = serde_json::from_str(
            r#"{
                "legal_actions": ["l", "r"],
                "state_variables": [
                    {"name": "angle", "kind": "continuous", "value": 0.5},
                    {"name": "trail", "kind": "continuous", "value": [1.0, 2.0]},
                    {"name": "colour", "kind": "categorical", "value": "red"}
                ],
                "scores": {"ann": 1.5},
                "terminal": false
            }"#,
        )
        .unwrap();
        assert_eq!(obs.variable("angle").unwrap().value, Value::Number(0.5));
        assert_eq!(obs.variable("trail").unwrap().value, Value::Vector(vec![1.0, 2.0]));
        assert_eq!(obs.variable("colour").unwrap().value, Value::Text("red".into()));
        assert_eq!(obs.score("ann"), Some(1.5));
        assert!(obs.is_legal("r"));
        assert!(!obs.is_legal("o"));
    }

    #[test]
    fn test_into_terminal() {
        let obs = Observation::new(actions(&["h", "t"]), vec![]).into_terminal();
        assert!(obs.terminal);
        assert!(obs.is_terminal());
        assert_eq!(obs.legal_actions, actions(&[GAME_OVER]));

        let mut sentinel_only = Observation::new(actions(&[GAME_OVER]), vec![]);
        sentinel_only.terminal = false;
        assert!(sentinel_only.is_terminal());
    }

    #[test]
    fn test_validate() {
        assert!(Observation::new(actions(&["h", "t"]), vec![]).validate().is_ok());
        assert!(Observation::new(vec![], vec![]).validate().is_err());
        assert!(Observation::new(actions(&["h", "h"]), vec![]).validate().is_err());

        let vars = vec![
            StateVariable::continuous("x", 1.0),
            StateVariable::continuous("x", 2.0),
        ];
        assert!(Observation::new(actions(&["h"]), vars).validate().is_err());

        let mut over = Observation::new(vec![], vec![]);
        over.terminal = true;
        assert!(over.validate().is_ok());
    }

    #[test]
    fn test_display() {
        let mut scores = BTreeMap::new();
        scores.insert("ann".to_string(), 2.0);
        let obs = Observation::new(actions(&["l", "r"]), vec![StateVariable::continuous("x", 0.5)])
            .with_scores(scores);
        assert_eq!(
            obs.to_string(),
            "scores | ann: 2\nx (continuous) = 0.5\nmoves | l, r"
        );
    }
}
