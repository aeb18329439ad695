#![allow(missing_docs)]

use antnet::simulation::error::SimError;
use antnet::simulation::params::{GridParams, ParentSelection, Params};
use std::fs;

#[test]
fn test_default_params_are_valid() {
    let params = Params::default();
    params.validate().unwrap();
    let topology = params.topology();
    assert_eq!(topology.input_count, 50);
    assert_eq!(topology.output_neuron_count, 2);
    assert_eq!(params.parent_selection, ParentSelection::TopCycle);
    let limits = params.pangenome_limits();
    assert_eq!(limits.max_size, 100);
    assert_eq!(limits.top_percent_size, 10);
    assert_eq!(limits.max_children_count, 5);
}

#[test]
fn test_invalid_params_are_rejected() {
    let cases = [
        Params {
            dt: 0.0,
            ..Params::default()
        },
        Params {
            grids: Vec::new(),
            ..Params::default()
        },
        Params {
            grids: vec![GridParams {
                width: 0,
                height: 3,
                tile_size: 1.0,
            }],
            ..Params::default()
        },
        Params {
            mutation_rate: 1.5,
            ..Params::default()
        },
        Params {
            max_pangenome_size: 0,
            ..Params::default()
        },
        Params {
            world_width: f32::NAN,
            ..Params::default()
        },
    ];
    for params in cases {
        assert!(matches!(params.validate(), Err(SimError::InvalidConfig(_))));
    }
}

#[test]
fn test_params_load_from_file() {
    let path = "test_params_load.json";
    let params = Params {
        seed: 7,
        population_size: 33,
        parent_selection: ParentSelection::Random,
        ..Params::default()
    };
    fs::write(path, serde_json::to_string_pretty(&params).unwrap()).unwrap();

    let loaded = Params::load_from_file(path).unwrap();
    assert_eq!(loaded.seed, 7);
    assert_eq!(loaded.population_size, 33);
    assert_eq!(loaded.parent_selection, ParentSelection::Random);
    assert_eq!(loaded.grids, params.grids);

    fs::remove_file(path).ok();
}

#[test]
fn test_params_load_rejects_invalid_values() {
    let path = "test_params_invalid.json";
    let params = Params {
        breeding_threshold: 0,
        ..Params::default()
    };
    fs::write(path, serde_json::to_string(&params).unwrap()).unwrap();
    assert!(matches!(
        Params::load_from_file(path),
        Err(SimError::InvalidConfig(_))
    ));
    fs::remove_file(path).ok();
}
