//! Layered feedforward network built from [`Neuron`]s.
//!
//! Topology is a plain value: changing the shape of a network builds a new
//! one from the new [`Topology`] and transplants whatever weights still fit.

use std::fmt;

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::super::error::{Result, SimError};
use super::super::memo::Memo;
use super::neuron::Neuron;

/// Layers with at least this many neurons are evaluated on the rayon pool.
pub const PARALLEL_LAYER_THRESHOLD: usize = 64;

/// Structural shape of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Topology {
    /// Length of the input vector.
    pub input_count: usize,
    /// Number of hidden layers.
    pub hidden_layer_count: usize,
    /// Neurons in every hidden layer.
    pub hidden_layer_neuron_count: usize,
    /// Neurons in the output layer.
    pub output_neuron_count: usize,
}

impl Topology {
    /// Creates a topology from its four dimensions.
    pub fn new(
        input_count: usize,
        hidden_layer_count: usize,
        hidden_layer_neuron_count: usize,
        output_neuron_count: usize,
    ) -> Self {
        Self {
            input_count,
            hidden_layer_count,
            hidden_layer_neuron_count,
            output_neuron_count,
        }
    }

    /// Same topology with a different input count.
    pub fn with_input_count(self, input_count: usize) -> Self {
        Self {
            input_count,
            ..self
        }
    }

    /// Same topology with a different number of hidden layers.
    pub fn with_hidden_layer_count(self, hidden_layer_count: usize) -> Self {
        Self {
            hidden_layer_count,
            ..self
        }
    }

    /// Same topology with a different hidden layer width.
    pub fn with_hidden_layer_neuron_count(self, hidden_layer_neuron_count: usize) -> Self {
        Self {
            hidden_layer_neuron_count,
            ..self
        }
    }

    /// Same topology with a different output count.
    pub fn with_output_neuron_count(self, output_neuron_count: usize) -> Self {
        Self {
            output_neuron_count,
            ..self
        }
    }

    /// Number of inputs each neuron of `layer` must have.
    pub fn fan_in(&self, layer: LayerId) -> usize {
        match layer {
            LayerId::Hidden(0) => self.input_count,
            LayerId::Hidden(_) => self.hidden_layer_neuron_count,
            LayerId::Output if self.hidden_layer_count > 0 => self.hidden_layer_neuron_count,
            LayerId::Output => self.input_count,
        }
    }

    /// Number of neurons in `layer`.
    pub fn layer_width(&self, layer: LayerId) -> usize {
        match layer {
            LayerId::Hidden(_) => self.hidden_layer_neuron_count,
            LayerId::Output => self.output_neuron_count,
        }
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        let hidden: usize = (0..self.hidden_layer_count)
            .map(|i| self.hidden_layer_neuron_count * (self.fan_in(LayerId::Hidden(i)) + 1))
            .sum();
        hidden + self.output_neuron_count * (self.fan_in(LayerId::Output) + 1)
    }
}

/// Addresses one layer of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    /// Hidden layer by index, starting at the input side.
    Hidden(usize),
    /// The output layer.
    Output,
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerId::Hidden(i) => write!(f, "hidden {i}"),
            LayerId::Output => write!(f, "output"),
        }
    }
}

/// Feedforward network with tanh neurons.
///
/// Outputs are cached until the inputs, a parameter or the topology change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "NetworkRecord", try_from = "NetworkRecord")]
pub struct NeuralNetwork {
    topology: Topology,
    inputs: Vec<f32>,
    hidden_layers: Vec<Vec<Neuron>>,
    output_layer: Vec<Neuron>,
    outputs: Memo<Vec<f32>>,
    validated: bool,
}

/// Persisted form of a [`NeuralNetwork`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NetworkRecord {
    input_count: usize,
    hidden_layer_count: usize,
    hidden_layer_neuron_count: usize,
    output_neuron_count: usize,
    input_values: Vec<f32>,
    output_values: Vec<f32>,
    hidden_layers: Vec<Vec<Neuron>>,
    output_layer: Vec<Neuron>,
}

impl NeuralNetwork {
    /// Builds a zero-weight network of the given shape.
    pub fn new(topology: Topology) -> Self {
        let hidden_layers = (0..topology.hidden_layer_count)
            .map(|i| {
                let fan_in = topology.fan_in(LayerId::Hidden(i));
                (0..topology.hidden_layer_neuron_count)
                    .map(|_| Neuron::new(fan_in))
                    .collect()
            })
            .collect();
        let output_fan_in = topology.fan_in(LayerId::Output);
        let output_layer = (0..topology.output_neuron_count)
            .map(|_| Neuron::new(output_fan_in))
            .collect();

        Self {
            topology,
            inputs: vec![0.0; topology.input_count],
            hidden_layers,
            output_layer,
            outputs: Memo::new(),
            validated: false,
        }
    }

    /// Builds a network of the given shape with uniformly random parameters.
    pub fn new_random<R: Rng + ?Sized>(topology: Topology, rng: &mut R) -> Self {
        let mut network = Self::new(topology);
        network.randomize(rng);
        network
    }

    /// Returns a network with shape `topology` that keeps every weight and
    /// bias of `self` whose layer, neuron and input index still exist.
    pub fn reshaped(&self, topology: Topology) -> Self {
        let mut network = Self::new(topology);
        for (new_layer, old_layer) in network.hidden_layers.iter_mut().zip(&self.hidden_layers) {
            for (new_neuron, old_neuron) in new_layer.iter_mut().zip(old_layer) {
                new_neuron.transplant_from(old_neuron);
            }
        }
        for (new_neuron, old_neuron) in network.output_layer.iter_mut().zip(&self.output_layer) {
            new_neuron.transplant_from(old_neuron);
        }
        for (new_input, &old_input) in network.inputs.iter_mut().zip(&self.inputs) {
            *new_input = old_input;
        }
        network
    }

    /// Replaces `self` with [`NeuralNetwork::reshaped`].
    pub fn reshape(&mut self, topology: Topology) {
        if topology != self.topology {
            *self = self.reshaped(topology);
        }
    }

    /// Changes the input count.
    pub fn set_input_count(&mut self, n: usize) {
        self.reshape(self.topology.with_input_count(n));
    }

    /// Changes the number of hidden layers.
    pub fn set_hidden_layer_count(&mut self, n: usize) {
        self.reshape(self.topology.with_hidden_layer_count(n));
    }

    /// Changes the width of every hidden layer.
    pub fn set_hidden_layer_neuron_count(&mut self, n: usize) {
        self.reshape(self.topology.with_hidden_layer_neuron_count(n));
    }

    /// Changes the output count.
    pub fn set_output_neuron_count(&mut self, n: usize) {
        self.reshape(self.topology.with_output_neuron_count(n));
    }

    /// Current shape.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Number of output neurons.
    pub fn output_count(&self) -> usize {
        self.output_layer.len()
    }

    /// Current input vector.
    pub fn inputs(&self) -> &[f32] {
        &self.inputs
    }

    /// Replaces the input vector; its length must equal the input count.
    pub fn set_inputs(&mut self, values: &[f32]) -> Result<()> {
        if values.len() != self.inputs.len() {
            return Err(SimError::InputArity {
                expected: self.inputs.len(),
                found: values.len(),
            });
        }
        if self.inputs != values {
            self.inputs.copy_from_slice(values);
            self.outputs.invalidate();
        }
        Ok(())
    }

    /// Last computed outputs, if still valid.
    pub fn outputs(&self) -> Option<&[f32]> {
        self.outputs.peek().map(Vec::as_slice)
    }

    /// Neurons of one layer.
    pub fn layer(&self, layer: LayerId) -> Result<&[Neuron]> {
        match layer {
            LayerId::Hidden(i) => self
                .hidden_layers
                .get(i)
                .map(Vec::as_slice)
                .ok_or(SimError::IndexOutOfRange {
                    index: i,
                    len: self.hidden_layers.len(),
                }),
            LayerId::Output => Ok(&self.output_layer),
        }
    }

    /// One neuron, by layer and position.
    pub fn neuron(&self, layer: LayerId, index: usize) -> Result<&Neuron> {
        let neurons = self.layer(layer)?;
        neurons.get(index).ok_or(SimError::IndexOutOfRange {
            index,
            len: neurons.len(),
        })
    }

    /// Mutable access to one neuron. Invalidates the cached outputs.
    pub fn neuron_mut(&mut self, layer: LayerId, index: usize) -> Result<&mut Neuron> {
        let neurons = match layer {
            LayerId::Hidden(i) => {
                let len = self.hidden_layers.len();
                self.hidden_layers
                    .get_mut(i)
                    .ok_or(SimError::IndexOutOfRange { index: i, len })?
            }
            LayerId::Output => &mut self.output_layer,
        };
        let len = neurons.len();
        let neuron = neurons
            .get_mut(index)
            .ok_or(SimError::IndexOutOfRange { index, len })?;
        self.outputs.invalidate();
        self.validated = false;
        Ok(neuron)
    }

    /// Checks that the layer counts and every neuron's fan-in match the
    /// topology.
    pub fn validate(&mut self) -> Result<()> {
        let topology = self.topology;
        if self.inputs.len() != topology.input_count {
            return Err(SimError::InputArity {
                expected: topology.input_count,
                found: self.inputs.len(),
            });
        }
        if self.hidden_layers.len() != topology.hidden_layer_count {
            return Err(SimError::Malformed(format!(
                "network has {} hidden layers, topology says {}",
                self.hidden_layers.len(),
                topology.hidden_layer_count
            )));
        }
        let layers = self
            .hidden_layers
            .iter()
            .enumerate()
            .map(|(i, layer)| (LayerId::Hidden(i), layer))
            .chain(std::iter::once((LayerId::Output, &self.output_layer)));
        for (id, neurons) in layers {
            if neurons.len() != topology.layer_width(id) {
                return Err(SimError::Malformed(format!(
                    "layer {id} has {} neurons, topology says {}",
                    neurons.len(),
                    topology.layer_width(id)
                )));
            }
            let expected = topology.fan_in(id);
            if let Some((neuron, found)) = neurons
                .iter()
                .map(Neuron::input_count)
                .enumerate()
                .find(|&(_, count)| count != expected)
            {
                return Err(SimError::FanInMismatch {
                    layer: id.to_string(),
                    neuron,
                    expected,
                    found,
                });
            }
        }
        self.validated = true;
        Ok(())
    }

    /// Forward-propagates the current inputs and returns the output values.
    ///
    /// Cached until the inputs or any parameter change.
    pub fn compute(&mut self) -> Result<&[f32]> {
        if !self.validated {
            self.validate()?;
        }
        let (inputs, hidden, output) = (
            &self.inputs,
            &mut self.hidden_layers,
            &mut self.output_layer,
        );
        let values = self
            .outputs
            .get_or_compute(|| forward(inputs, hidden, output));
        Ok(values.as_slice())
    }

    /// Redraws every weight and bias uniformly from `[-1, 1]`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for neuron in self.neurons_mut() {
            neuron.randomize(rng);
        }
        self.outputs.invalidate();
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.neurons().map(|n| n.input_count() + 1).sum()
    }

    /// Visits every weight and bias, layer by layer from the input side.
    pub fn for_each_parameter(&mut self, mut f: impl FnMut(&mut f32)) {
        for neuron in self.neurons_mut() {
            neuron.for_each_parameter(&mut f);
        }
        self.outputs.invalidate();
    }

    /// Visits every weight and bias together with the corresponding value in
    /// `other`. Fails if the topologies differ.
    pub fn for_each_parameter_pair(
        &mut self,
        other: &NeuralNetwork,
        mut f: impl FnMut(&mut f32, f32),
    ) -> Result<()> {
        if self.topology != other.topology {
            return Err(SimError::IncompatibleGenome {
                expected: self.topology,
                found: other.topology,
            });
        }
        for (mine, theirs) in self.neurons_mut().zip(other.neurons()) {
            mine.for_each_parameter_pair(theirs, &mut f);
        }
        self.outputs.invalidate();
        Ok(())
    }

    fn neurons(&self) -> impl Iterator<Item = &Neuron> {
        self.hidden_layers.iter().flatten().chain(&self.output_layer)
    }

    fn neurons_mut(&mut self) -> impl Iterator<Item = &mut Neuron> {
        self.hidden_layers
            .iter_mut()
            .flatten()
            .chain(self.output_layer.iter_mut())
    }
}

fn forward(inputs: &[f32], hidden: &mut [Vec<Neuron>], output: &mut [Neuron]) -> Vec<f32> {
    let mut signal = inputs.to_vec();
    for layer in hidden.iter_mut() {
        signal = evaluate_layer(layer, &signal);
    }
    evaluate_layer(output, &signal)
}

fn evaluate_layer(layer: &mut [Neuron], signal: &[f32]) -> Vec<f32> {
    let fire = |neuron: &mut Neuron| {
        neuron.feed(signal);
        neuron.get_output()
    };
    if layer.len() >= PARALLEL_LAYER_THRESHOLD {
        layer.par_iter_mut().map(fire).collect()
    } else {
        layer.iter_mut().map(fire).collect()
    }
}

impl PartialEq for NeuralNetwork {
    fn eq(&self, other: &Self) -> bool {
        self.topology == other.topology
            && self.hidden_layers == other.hidden_layers
            && self.output_layer == other.output_layer
    }
}

impl From<NeuralNetwork> for NetworkRecord {
    fn from(mut network: NeuralNetwork) -> Self {
        let output_values = match network.compute() {
            Ok(outputs) => outputs.to_vec(),
            Err(e) => {
                log::warn!("persisting network without output values: {e}");
                Vec::new()
            }
        };
        let topology = network.topology;
        Self {
            input_count: topology.input_count,
            hidden_layer_count: topology.hidden_layer_count,
            hidden_layer_neuron_count: topology.hidden_layer_neuron_count,
            output_neuron_count: topology.output_neuron_count,
            input_values: network.inputs,
            output_values,
            hidden_layers: network.hidden_layers,
            output_layer: network.output_layer,
        }
    }
}

impl TryFrom<NetworkRecord> for NeuralNetwork {
    type Error = SimError;

    fn try_from(record: NetworkRecord) -> Result<Self> {
        let mut network = Self {
            topology: Topology::new(
                record.input_count,
                record.hidden_layer_count,
                record.hidden_layer_neuron_count,
                record.output_neuron_count,
            ),
            inputs: record.input_values,
            hidden_layers: record.hidden_layers,
            output_layer: record.output_layer,
            outputs: Memo::new(),
            validated: false,
        };
        network.validate()?;
        Ok(network)
    }
}
