#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use antnet::simulation::brain::{LayerId, NeuralNetwork, Neuron, Topology};
use antnet::simulation::error::SimError;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

fn scenario_network() -> NeuralNetwork {
    let mut network = NeuralNetwork::new(Topology::new(2, 1, 2, 1));
    let hidden = [([0.5, -0.3], 0.2), ([-0.4, 0.6], -0.1)];
    for (i, (weights, bias)) in hidden.iter().enumerate() {
        let neuron = network.neuron_mut(LayerId::Hidden(0), i).unwrap();
        neuron.set_weight(0, weights[0]).unwrap();
        neuron.set_weight(1, weights[1]).unwrap();
        neuron.set_bias(*bias);
    }
    let output = network.neuron_mut(LayerId::Output, 0).unwrap();
    output.set_weight(0, 0.6).unwrap();
    output.set_weight(1, -0.5).unwrap();
    output.set_bias(0.2);
    network.set_inputs(&[0.5, 0.3]).unwrap();
    network
}

#[test]
fn test_neuron_output_is_tanh_of_weighted_sum() {
    let mut neuron = Neuron::with_parameters(vec![0.5, -0.25], 0.1);
    neuron.set_inputs(&[1.0, 2.0]).unwrap();
    let expected = (0.1_f32 + 0.5 - 0.5).tanh();
    assert!((neuron.get_output() - expected).abs() < 1e-6);
}

#[test]
fn test_neuron_output_is_deterministic() {
    let mut neuron = Neuron::with_parameters(vec![0.3, 0.7, -0.2], -0.4);
    neuron.set_inputs(&[0.9, -0.1, 0.5]).unwrap();
    let first = neuron.get_output();
    for _ in 0..10 {
        assert_eq!(neuron.get_output(), first);
    }
}

#[test]
fn test_neuron_index_out_of_range() {
    let mut neuron = Neuron::new(3);
    assert!(matches!(
        neuron.set_weight(3, 1.0),
        Err(SimError::IndexOutOfRange { index: 3, len: 3 })
    ));
    assert!(matches!(
        neuron.input(5),
        Err(SimError::IndexOutOfRange { index: 5, len: 3 })
    ));
    assert!(matches!(
        neuron.set_inputs(&[1.0]),
        Err(SimError::InputArity {
            expected: 3,
            found: 1
        })
    ));
}

#[test]
fn test_neuron_recomputes_after_weight_change() {
    let mut neuron = Neuron::with_parameters(vec![1.0], 0.0);
    neuron.set_input(0, 0.5).unwrap();
    let before = neuron.get_output();
    neuron.set_weight(0, -1.0).unwrap();
    let after = neuron.get_output();
    assert!((before + after).abs() < 1e-6);
}

#[test]
fn test_forward_propagation_scenario() {
    let mut network = scenario_network();
    let h0 = (0.5_f32 * 0.5 + 0.3 * -0.3 + 0.2).tanh();
    let h1 = (0.5_f32 * -0.4 + 0.3 * 0.6 - 0.1).tanh();
    let expected = (h0 * 0.6 + h1 * -0.5 + 0.2).tanh();

    let outputs = network.compute().unwrap();
    assert_eq!(outputs.len(), 1);
    assert!((outputs[0] - expected).abs() < 1e-4);
}

#[test]
fn test_compute_is_memoized_until_inputs_change() {
    let mut network = scenario_network();
    let first = network.compute().unwrap().to_vec();
    assert_eq!(network.outputs(), Some(first.as_slice()));
    assert_eq!(network.compute().unwrap(), first.as_slice());

    network.set_inputs(&[-0.5, 0.9]).unwrap();
    assert!(network.outputs().is_none());
    let second = network.compute().unwrap().to_vec();
    assert_ne!(first, second);
}

#[test]
fn test_input_arity_is_checked() {
    let mut network = NeuralNetwork::new(Topology::new(3, 1, 4, 2));
    let err = network.set_inputs(&[1.0, 2.0]).unwrap_err();
    assert!(matches!(
        err,
        SimError::InputArity {
            expected: 3,
            found: 2
        }
    ));
}

#[test]
fn test_topology_invariant_after_setters() {
    let mut rng = ChaCha12Rng::seed_from_u64(7);
    let mut network = NeuralNetwork::new_random(Topology::new(4, 2, 5, 2), &mut rng);

    network.set_input_count(9);
    network.set_hidden_layer_neuron_count(3);
    network.set_hidden_layer_count(3);
    network.set_output_neuron_count(4);

    let topology = network.topology();
    assert_eq!(topology, Topology::new(9, 3, 3, 4));
    let mut previous = topology.input_count;
    for i in 0..topology.hidden_layer_count {
        let layer = network.layer(LayerId::Hidden(i)).unwrap();
        assert_eq!(layer.len(), 3);
        assert!(layer.iter().all(|n| n.input_count() == previous));
        previous = layer.len();
    }
    let output = network.layer(LayerId::Output).unwrap();
    assert_eq!(output.len(), 4);
    assert!(output.iter().all(|n| n.input_count() == previous));
    network.validate().unwrap();
    assert_eq!(network.compute().unwrap().len(), 4);
}

#[test]
fn test_network_without_hidden_layers_connects_inputs_to_outputs() {
    let mut network = NeuralNetwork::new(Topology::new(3, 0, 0, 2));
    assert!(
        network
            .layer(LayerId::Output)
            .unwrap()
            .iter()
            .all(|n| n.input_count() == 3)
    );
    assert_eq!(network.compute().unwrap(), &[0.0, 0.0]);
}

#[test]
fn test_reshape_keeps_overlapping_weights() {
    let mut rng = ChaCha12Rng::seed_from_u64(11);
    let original = NeuralNetwork::new_random(Topology::new(3, 1, 4, 2), &mut rng);
    let grown = original.reshaped(Topology::new(5, 1, 4, 2));

    let old = original.neuron(LayerId::Hidden(0), 2).unwrap();
    let new = grown.neuron(LayerId::Hidden(0), 2).unwrap();
    assert_eq!(&new.weights()[..3], old.weights());
    assert_eq!(&new.weights()[3..], &[0.0, 0.0]);
    assert_eq!(new.bias(), old.bias());
    assert_eq!(
        grown.layer(LayerId::Output).unwrap(),
        original.layer(LayerId::Output).unwrap()
    );
}

#[test]
fn test_parameter_count_matches_topology() {
    let topology = Topology::new(50, 2, 12, 2);
    let network = NeuralNetwork::new(topology);
    assert_eq!(network.parameter_count(), topology.parameter_count());
    assert_eq!(topology.parameter_count(), 12 * 51 + 12 * 13 + 2 * 13);
}

#[test]
fn test_wide_layer_matches_sequential_result() {
    let mut rng = ChaCha12Rng::seed_from_u64(3);
    let mut network = NeuralNetwork::new_random(Topology::new(8, 1, 128, 2), &mut rng);
    network
        .set_inputs(&[0.1, -0.2, 0.3, -0.4, 0.5, -0.6, 0.7, -0.8])
        .unwrap();
    let parallel = network.compute().unwrap().to_vec();

    let hidden: Vec<f32> = network
        .layer(LayerId::Hidden(0))
        .unwrap()
        .iter()
        .map(|n| {
            let sum: f32 = n
                .weights()
                .iter()
                .zip(network.inputs())
                .map(|(w, x)| w * x)
                .sum();
            (sum + n.bias()).tanh()
        })
        .collect();
    for (i, value) in parallel.iter().enumerate() {
        let n = network.neuron(LayerId::Output, i).unwrap();
        let sum: f32 = n.weights().iter().zip(&hidden).map(|(w, x)| w * x).sum();
        assert!((value - (sum + n.bias()).tanh()).abs() < 1e-4);
    }
}

#[test]
fn test_fan_in_mismatch_is_rejected() {
    let mut network = NeuralNetwork::new(Topology::new(2, 1, 2, 1));
    network
        .neuron_mut(LayerId::Hidden(0), 1)
        .unwrap()
        .set_input_count(5);
    match network.compute() {
        Err(SimError::FanInMismatch {
            neuron,
            expected,
            found,
            ..
        }) => {
            assert_eq!(neuron, 1);
            assert_eq!(expected, 2);
            assert_eq!(found, 5);
        }
        other => panic!("expected fan-in mismatch, got {other:?}"),
    }
}

#[test]
fn test_network_json_shape_and_roundtrip() {
    let mut network = scenario_network();
    network.compute().unwrap();
    let value = serde_json::to_value(&network).unwrap();
    for key in [
        "input_count",
        "hidden_layer_count",
        "hidden_layer_neuron_count",
        "output_neuron_count",
        "input_values",
        "output_values",
        "hidden_layers",
        "output_layer",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    let neuron = &value["hidden_layers"][0][0];
    for key in ["weights", "bias", "inputs", "value"] {
        assert!(neuron.get(key).is_some(), "missing neuron {key}");
    }

    let mut restored: NeuralNetwork = serde_json::from_value(value).unwrap();
    assert_eq!(restored, network);
    let mut original = network;
    assert!((restored.compute().unwrap()[0] - original.compute().unwrap()[0]).abs() < 1e-6);
}

#[test]
fn test_malformed_network_json_is_rejected() {
    let network = NeuralNetwork::new(Topology::new(2, 1, 2, 1));
    let mut value = serde_json::to_value(&network).unwrap();
    value["hidden_layer_neuron_count"] = serde_json::json!(3);
    assert!(serde_json::from_value::<NeuralNetwork>(value).is_err());
}
