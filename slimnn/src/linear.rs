use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

/// A dense layer that can gain inputs and outputs after construction.
///
/// `weight[o][i]` connects input `i` to output `o`. The bias acts as a
/// threshold and is subtracted: `forward(x) = W·x - b`.
///
/// Rows and columns are only ever appended, so the index of an existing
/// input or output never changes and its weights are never rewritten by
/// growth.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Linear {
    pub weight: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    inputs: usize,
}

fn init<R: Rng + ?Sized>(scale: f32, rng: &mut R) -> f32 {
    if scale > 0.0 {
        Uniform::new(-scale, scale).sample(rng)
    } else {
        0.0
    }
}

impl Linear {
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self {
            weight: vec![vec![0.0; inputs]; outputs],
            bias: vec![0.0; outputs],
            inputs,
        }
    }

    pub fn random<R: Rng + ?Sized>(inputs: usize, outputs: usize, scale: f32, rng: &mut R) -> Self {
        let mut layer = Self::new(inputs, 0);
        for _ in 0..outputs {
            layer.add_output(scale, rng);
        }
        layer
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.bias.len()
    }

    /// Every row has one weight per input and one bias per row.
    pub fn is_well_formed(&self) -> bool {
        self.weight.len() == self.bias.len() && self.weight.iter().all(|row| row.len() == self.inputs)
    }

    pub fn forward(&self, x: &[f32]) -> Vec<f32> {
        assert_eq!(x.len(), self.inputs);
        let mut output = Vec::with_capacity(self.num_outputs());
        for (row, b) in self.weight.iter().zip(self.bias.iter()) {
            let mut total = -b;
            for (w, v) in row.iter().zip(x.iter()) {
                total += w * v;
            }
            output.push(total);
        }
        output
    }

    /// Appends one input column, initialised uniformly in `[-scale, scale)`.
    pub fn add_input<R: Rng + ?Sized>(&mut self, scale: f32, rng: &mut R) {
        for row in self.weight.iter_mut() {
            row.push(init(scale, rng));
        }
        self.inputs += 1;
    }

    /// Appends one output row and its bias, initialised uniformly in `[-scale, scale)`.
    pub fn add_output<R: Rng + ?Sized>(&mut self, scale: f32, rng: &mut R) {
        let row = (0..self.inputs).map(|_| init(scale, rng)).collect();
        self.weight.push(row);
        self.bias.push(init(scale, rng));
    }
}
