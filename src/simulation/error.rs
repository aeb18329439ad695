//! Error type shared by every simulation module.

use super::brain::network::Topology;

/// Errors raised by the network, genetic and lifecycle layers.
///
/// Ordinary ant death is not an error; these variants only describe broken
/// configuration, out-of-range access or corrupt persisted data.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A neuron input or weight index outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Valid length.
        len: usize,
    },
    /// A surroundings cell outside the grid.
    #[error("cell ({x}, {y}) out of range for {width}x{height} grid")]
    GridIndexOutOfRange {
        /// Requested column.
        x: usize,
        /// Requested row.
        y: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
    /// Two genomes with different network shapes were asked to breed.
    #[error("cannot breed genomes with topology {expected:?} and {found:?}")]
    IncompatibleGenome {
        /// Topology of the receiving genome.
        expected: Topology,
        /// Topology of the partner genome.
        found: Topology,
    },
    /// The network does not expose the number of outputs the caller needs.
    #[error("network exposes {found} outputs, expected {expected}")]
    OutputArity {
        /// Required output count.
        expected: usize,
        /// Actual output count.
        found: usize,
    },
    /// An input vector whose length does not match the network input count.
    #[error("network takes {expected} inputs, got {found}")]
    InputArity {
        /// Network input count.
        expected: usize,
        /// Supplied length.
        found: usize,
    },
    /// A neuron whose input count disagrees with its layer's fan-in.
    #[error("neuron {neuron} of layer {layer} has {found} inputs, expected {expected}")]
    FanInMismatch {
        /// Layer description (`hidden 0`, `output`).
        layer: String,
        /// Neuron index inside the layer.
        neuron: usize,
        /// Expected fan-in.
        expected: usize,
        /// Actual input count.
        found: usize,
    },
    /// Sampling or trimming an archive that holds no genomes.
    #[error("pangenome is empty")]
    EmptyArchive,
    /// Fitness must be a finite, non-negative number.
    #[error("invalid fitness {0}")]
    InvalidFitness(f32),
    /// Rejected simulation parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Persisted data that parses but violates a structural invariant.
    #[error("malformed data: {0}")]
    Malformed(String),
    /// Filesystem failure while saving or loading.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON encoding or decoding failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SimError>;
