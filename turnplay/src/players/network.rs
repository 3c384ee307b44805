use crate::error::GameError;
use crate::telemetry::NetworkSnapshot;
use crate::utils;
use rand::Rng;
use serde::{Deserialize, Serialize};
use slimnn::{Activation, ActivationKind, Linear};
use std::path::Path;

/// Everything one forward pass computed, kept so a later update can take
/// its gradient at the point the decision was made.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pass {
    pub inputs: Vec<f32>,
    pub hidden_pre: Vec<f32>,
    pub hidden: Vec<f32>,
    pub output_pre: Vec<f32>,
    pub output: Vec<f32>,
}

/// Two dense layers whose input side grows with every new variable name and
/// whose output side grows with every new action name.
///
/// `variables[i]` owns input slot `i` and hidden weight column `i`;
/// `actions[o]` owns output row `o`. Indices are stable for the life of the
/// network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    activation: ActivationKind,
    variables: Vec<String>,
    actions: Vec<String>,
    inputs: Vec<f32>,
    hidden: Linear,
    output: Linear,
    #[serde(skip)]
    pass: Pass,
}

impl Network {
    pub fn new<R: Rng + ?Sized>(
        hidden_size: usize,
        activation: ActivationKind,
        init_scale: f32,
        rng: &mut R,
    ) -> Self {
        let mut network = Self {
            activation,
            variables: Vec::new(),
            actions: Vec::new(),
            inputs: Vec::new(),
            hidden: Linear::random(0, hidden_size, init_scale, rng),
            output: Linear::new(hidden_size, 0),
            pass: Pass::default(),
        };
        network.forward();
        network
    }

    pub fn activation(&self) -> ActivationKind {
        self.activation
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn inputs(&self) -> &[f32] {
        &self.inputs
    }

    pub fn hidden(&self) -> &Linear {
        &self.hidden
    }

    pub fn output(&self) -> &Linear {
        &self.output
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden.num_outputs()
    }

    pub fn pass(&self) -> &Pass {
        &self.pass
    }

    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == name)
    }

    pub fn action_index(&self, name: &str) -> Option<usize> {
        self.actions.iter().position(|a| a == name)
    }

    pub fn set_input(&mut self, index: usize, value: f32) {
        self.inputs[index] = value;
    }

    pub fn add_variable<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        value: f32,
        init_scale: f32,
        rng: &mut R,
    ) -> usize {
        self.variables.push(name.into());
        self.inputs.push(value);
        self.hidden.add_input(init_scale, rng);
        self.variables.len() - 1
    }

    pub fn add_action<R: Rng + ?Sized>(&mut self, name: &str, init_scale: f32, rng: &mut R) -> usize {
        self.actions.push(name.into());
        self.output.add_output(init_scale, rng);
        self.actions.len() - 1
    }

    /// Forward pass over arbitrary inputs without touching the cached pass.
    pub fn evaluate(&self, inputs: &[f32]) -> Pass {
        let hidden_pre = self.hidden.forward(inputs);
        let hidden = self.activation.apply_1d(&hidden_pre);
        let output_pre = self.output.forward(&hidden);
        let output = self.activation.apply_1d(&output_pre);
        Pass {
            inputs: inputs.to_vec(),
            hidden_pre,
            hidden,
            output_pre,
            output,
        }
    }

    /// Recomputes the cached pass from the current inputs.
    pub fn forward(&mut self) -> &Pass {
        self.pass = self.evaluate(&self.inputs);
        &self.pass
    }

    /// One step of semi-gradient descent on `td² / 2` where `td` is the error
    /// of output `action` in `pass`. Only the row of `action`, the hidden
    /// weights and both biases move; other output rows are left alone.
    ///
    /// `pass` must come from this network before any growth of its output
    /// side past `action`; input columns added after `pass` was taken see a
    /// zero input and so are not updated.
    pub fn td_update(&mut self, pass: &Pass, action: usize, td: f32, learning_rate: f32) {
        let f = self.activation;
        let g_out = td * f.derivative(pass.output_pre[action]);

        let g_hidden: Vec<f32> = (0..self.hidden_size())
            .map(|j| g_out * self.output.weight[action][j] * f.derivative(pass.hidden_pre[j]))
            .collect();

        for (w, h) in self.output.weight[action].iter_mut().zip(pass.hidden.iter()) {
            *w += learning_rate * g_out * h;
        }
        self.output.bias[action] -= learning_rate * g_out;

        for (j, row) in self.hidden.weight.iter_mut().enumerate() {
            for (w, x) in row.iter_mut().zip(pass.inputs.iter()) {
                *w += learning_rate * g_hidden[j] * x;
            }
            self.hidden.bias[j] -= learning_rate * g_hidden[j];
        }
    }

    pub fn snapshot(&self, player: &str) -> NetworkSnapshot {
        NetworkSnapshot {
            player: player.into(),
            variables: self.variables.clone(),
            actions: self.actions.clone(),
            layers: vec![
                self.pass.inputs.clone(),
                self.pass.hidden.clone(),
                self.pass.output.clone(),
            ],
            weights: vec![self.hidden.weight.clone(), self.output.weight.clone()],
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GameError> {
        utils::save(path, self)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        let mut network: Self = utils::load(path)?;
        if network.inputs.len() != network.variables.len()
            || network.hidden.num_inputs() != network.variables.len()
            || network.output.num_outputs() != network.actions.len()
            || network.output.num_inputs() != network.hidden.num_outputs()
            || !network.hidden.is_well_formed()
            || !network.output.is_well_formed()
        {
            return Err(GameError::Configuration(
                "saved network has inconsistent dimensions".into(),
            ));
        }
        network.forward();
        Ok(network)
    }
}
