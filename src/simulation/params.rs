use serde::{Deserialize, Serialize};

use super::brain::network::Topology;
use super::brain::VELOCITY_OUTPUTS;
use super::error::{Result, SimError};
use super::pangenome::{MAX_CHILDREN_COUNT, MAX_PANGENOME_SIZE, PangenomeLimits, TOP_PERCENT_SIZE};

/// How `create_ant` draws breeding parents from the pangenome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParentSelection {
    /// Round-robin over the fittest entries.
    #[default]
    TopCycle,
    /// Uniformly random entries from the whole archive.
    Random,
}

/// Shape of one surroundings grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    /// Cells per row.
    pub width: usize,
    /// Cells per column.
    pub height: usize,
    /// Side length of one cell in world units.
    pub tile_size: f32,
}

impl GridParams {
    /// Number of cells, i.e. network inputs contributed by this grid.
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }
}

/// Simulation parameters that control colony behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Seed for the simulation random generator.
    pub seed: u64,
    /// Length of one tick in simulation seconds.
    pub dt: f32,
    /// World width.
    pub world_width: f32,
    /// World height.
    pub world_height: f32,
    /// Target number of food items kept in the world.
    pub food_count: usize,
    /// Energy granted by one food item.
    pub food_energy: f32,
    /// Target number of live ants.
    pub population_size: usize,
    /// Energy of a newborn ant.
    pub initial_energy: f32,
    /// Maximum energy an ant can hold.
    pub max_energy: f32,
    /// Energy consumed per second while idle.
    pub idle_energy_rate: f32,
    /// Energy cost per unit of speed per second.
    pub move_energy_rate: f32,
    /// Velocity scale applied to the network outputs.
    pub max_speed: f32,
    /// Side length of an ant's body square.
    pub ant_size: f32,
    /// Hidden layers in every ant network.
    pub hidden_layer_count: usize,
    /// Neurons per hidden layer.
    pub hidden_layer_neuron_count: usize,
    /// Surroundings grids, nearest first.
    pub grids: Vec<GridParams>,
    /// Seconds between surroundings rescans.
    pub scan_interval: f32,
    /// Per-parameter mutation probability for bred children.
    pub mutation_rate: f32,
    /// Maximum number of archived genomes.
    pub max_pangenome_size: usize,
    /// Number of top entries visited by the round-robin sampler.
    pub top_percent_size: usize,
    /// Breeding uses after which a genome leaves the archive.
    pub max_children_count: u32,
    /// Archive size above which new ants are bred instead of randomized.
    pub breeding_threshold: usize,
    /// Parent sampling policy.
    pub parent_selection: ParentSelection,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            seed: 42,
            dt: 0.05,
            world_width: 800.0,
            world_height: 600.0,
            food_count: 120,
            food_energy: 0.5,
            population_size: 60,
            initial_energy: 1.0,
            max_energy: 2.0,
            idle_energy_rate: 0.05,
            move_energy_rate: 0.001,
            max_speed: 80.0,
            ant_size: 6.0,
            hidden_layer_count: 1,
            hidden_layer_neuron_count: 12,
            grids: vec![
                GridParams {
                    width: 5,
                    height: 5,
                    tile_size: 12.0,
                },
                GridParams {
                    width: 5,
                    height: 5,
                    tile_size: 48.0,
                },
            ],
            scan_interval: 0.1,
            mutation_rate: 0.05,
            max_pangenome_size: MAX_PANGENOME_SIZE,
            top_percent_size: TOP_PERCENT_SIZE,
            max_children_count: MAX_CHILDREN_COUNT,
            breeding_threshold: 20,
            parent_selection: ParentSelection::TopCycle,
        }
    }
}

fn positive(value: f32) -> bool {
    value > 0.0
}

impl Params {
    /// Network shape implied by the grids and hidden layer settings.
    pub fn topology(&self) -> Topology {
        Topology::new(
            self.grids.iter().map(GridParams::cell_count).sum(),
            self.hidden_layer_count,
            self.hidden_layer_neuron_count,
            VELOCITY_OUTPUTS,
        )
    }

    /// Archive bounds.
    pub fn pangenome_limits(&self) -> PangenomeLimits {
        PangenomeLimits {
            max_size: self.max_pangenome_size,
            top_percent_size: self.top_percent_size,
            max_children_count: self.max_children_count,
        }
    }

    /// Rejects parameter combinations the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(SimError::InvalidConfig(msg.to_string()));

        if !positive(self.dt) {
            return invalid("dt must be positive");
        }
        if !positive(self.world_width) || !positive(self.world_height) {
            return invalid("world dimensions must be positive");
        }
        if self.ant_size <= 0.0 || self.ant_size >= self.world_width.min(self.world_height) {
            return invalid("ant_size must be positive and smaller than the world");
        }
        if self.grids.is_empty() || self.grids.iter().any(|g| g.cell_count() == 0) {
            return invalid("at least one non-empty surroundings grid is required");
        }
        if self.grids.iter().any(|g| !positive(g.tile_size)) {
            return invalid("grid tile_size must be positive");
        }
        if self.hidden_layer_count > 0 && self.hidden_layer_neuron_count == 0 {
            return invalid("hidden layers need at least one neuron");
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return invalid("mutation_rate must lie in [0, 1]");
        }
        if self.max_pangenome_size == 0 || self.top_percent_size == 0 {
            return invalid("pangenome sizes must be positive");
        }
        if self.max_children_count == 0 {
            return invalid("max_children_count must be positive");
        }
        if self.breeding_threshold == 0 {
            return invalid("breeding_threshold must be at least 1");
        }
        if self.initial_energy <= 0.0 || self.max_energy < self.initial_energy {
            return invalid("initial_energy must be positive and not exceed max_energy");
        }
        if self.scan_interval < 0.0 || self.max_speed < 0.0 {
            return invalid("scan_interval and max_speed must not be negative");
        }
        Ok(())
    }

    /// Reads parameters from a JSON file and validates them.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }
}
