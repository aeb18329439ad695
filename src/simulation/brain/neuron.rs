//! Single weighted-sum unit with tanh activation.

use ndarray::ArrayView1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::super::error::{Result, SimError};
use super::super::memo::Memo;

/// Tolerance used when comparing neurons for equality.
pub const EQ_TOLERANCE: f32 = 1e-6;

/// One neuron: `tanh(bias + Σ input_i · weight_i)`.
///
/// The output is memoized and only recomputed after an input, weight or bias
/// changes, so repeated reads between mutations are free and identical.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "NeuronRecord", try_from = "NeuronRecord")]
pub struct Neuron {
    inputs: Vec<f32>,
    weights: Vec<f32>,
    bias: f32,
    output: Memo<f32>,
}

/// Persisted form of a [`Neuron`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NeuronRecord {
    weights: Vec<f32>,
    bias: f32,
    inputs: Vec<f32>,
    value: f32,
}

fn activate(inputs: &[f32], weights: &[f32], bias: f32) -> f32 {
    let sum = ArrayView1::from(inputs).dot(&ArrayView1::from(weights));
    (bias + sum).tanh()
}

impl Neuron {
    /// Creates a neuron with `input_count` zeroed inputs and weights.
    pub fn new(input_count: usize) -> Self {
        Self {
            inputs: vec![0.0; input_count],
            weights: vec![0.0; input_count],
            bias: 0.0,
            output: Memo::new(),
        }
    }

    /// Creates a neuron from explicit weights and bias, with zeroed inputs.
    pub fn with_parameters(weights: Vec<f32>, bias: f32) -> Self {
        Self {
            inputs: vec![0.0; weights.len()],
            weights,
            bias,
            output: Memo::new(),
        }
    }

    /// Number of inputs (and weights).
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Resizes inputs and weights to `n`, zero-filling new slots.
    pub fn set_input_count(&mut self, n: usize) {
        self.inputs.resize(n, 0.0);
        self.weights.resize(n, 0.0);
        self.output.invalidate();
    }

    /// Current input values.
    pub fn inputs(&self) -> &[f32] {
        &self.inputs
    }

    /// Current weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Current bias.
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Input at `index`.
    pub fn input(&self, index: usize) -> Result<f32> {
        self.inputs.get(index).copied().ok_or(SimError::IndexOutOfRange {
            index,
            len: self.inputs.len(),
        })
    }

    /// Weight at `index`.
    pub fn weight(&self, index: usize) -> Result<f32> {
        self.weights.get(index).copied().ok_or(SimError::IndexOutOfRange {
            index,
            len: self.weights.len(),
        })
    }

    /// Sets the input at `index`.
    pub fn set_input(&mut self, index: usize, value: f32) -> Result<()> {
        let len = self.inputs.len();
        let slot = self
            .inputs
            .get_mut(index)
            .ok_or(SimError::IndexOutOfRange { index, len })?;
        if *slot != value {
            *slot = value;
            self.output.invalidate();
        }
        Ok(())
    }

    /// Sets the weight at `index`.
    pub fn set_weight(&mut self, index: usize, value: f32) -> Result<()> {
        let len = self.weights.len();
        let slot = self
            .weights
            .get_mut(index)
            .ok_or(SimError::IndexOutOfRange { index, len })?;
        *slot = value;
        self.output.invalidate();
        Ok(())
    }

    /// Sets the bias.
    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias;
        self.output.invalidate();
    }

    /// Replaces all inputs at once. The slice must match the input count.
    pub fn set_inputs(&mut self, values: &[f32]) -> Result<()> {
        if values.len() != self.inputs.len() {
            return Err(SimError::InputArity {
                expected: self.inputs.len(),
                found: values.len(),
            });
        }
        if self.inputs != values {
            self.inputs.copy_from_slice(values);
            self.output.invalidate();
        }
        Ok(())
    }

    /// Copies a layer signal into the inputs. The caller guarantees matching
    /// length.
    pub(crate) fn feed(&mut self, values: &[f32]) {
        if self.inputs != values {
            self.inputs.copy_from_slice(values);
            self.output.invalidate();
        }
    }

    /// Returns the activated output, computing it only if something changed.
    pub fn get_output(&mut self) -> f32 {
        let (inputs, weights, bias) = (&self.inputs, &self.weights, self.bias);
        *self.output.get_or_compute(|| activate(inputs, weights, bias))
    }

    /// Draws every weight and the bias uniformly from `[-1, 1]`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for w in &mut self.weights {
            *w = rng.random_range(-1.0..=1.0);
        }
        self.bias = rng.random_range(-1.0..=1.0);
        self.output.invalidate();
    }

    /// Visits every weight and then the bias.
    pub fn for_each_parameter(&mut self, mut f: impl FnMut(&mut f32)) {
        for w in &mut self.weights {
            f(w);
        }
        f(&mut self.bias);
        self.output.invalidate();
    }

    /// Visits every weight and the bias alongside the matching value of
    /// `other`. Both neurons must have the same input count.
    pub fn for_each_parameter_pair(&mut self, other: &Neuron, mut f: impl FnMut(&mut f32, f32)) {
        debug_assert_eq!(self.weights.len(), other.weights.len());
        for (w, &o) in self.weights.iter_mut().zip(&other.weights) {
            f(w, o);
        }
        f(&mut self.bias, other.bias);
        self.output.invalidate();
    }

    /// Copies every weight whose index exists in both neurons, and the bias.
    pub(crate) fn transplant_from(&mut self, other: &Neuron) {
        for (w, &o) in self.weights.iter_mut().zip(&other.weights) {
            *w = o;
        }
        self.bias = other.bias;
        self.output.invalidate();
    }
}

impl PartialEq for Neuron {
    fn eq(&self, other: &Self) -> bool {
        fn close(a: &[f32], b: &[f32]) -> bool {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= EQ_TOLERANCE)
        }
        close(&self.inputs, &other.inputs)
            && close(&self.weights, &other.weights)
            && (self.bias - other.bias).abs() <= EQ_TOLERANCE
    }
}

impl From<Neuron> for NeuronRecord {
    fn from(mut neuron: Neuron) -> Self {
        let value = neuron.get_output();
        Self {
            weights: neuron.weights,
            bias: neuron.bias,
            inputs: neuron.inputs,
            value,
        }
    }
}

impl TryFrom<NeuronRecord> for Neuron {
    type Error = SimError;

    fn try_from(record: NeuronRecord) -> Result<Self> {
        if record.inputs.len() != record.weights.len() {
            return Err(SimError::Malformed(format!(
                "neuron has {} inputs but {} weights",
                record.inputs.len(),
                record.weights.len()
            )));
        }
        let mut neuron = Self {
            inputs: record.inputs,
            weights: record.weights,
            bias: record.bias,
            output: Memo::new(),
        };
        // Outputs are always recomputed from the parameters.
        let expected = neuron.get_output();
        if (expected - record.value).abs() > 1e-4 {
            log::debug!(
                "recomputed neuron output {} differs from stored {}",
                expected,
                record.value
            );
        }
        Ok(neuron)
    }
}
