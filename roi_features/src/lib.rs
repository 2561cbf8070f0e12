//! ROI features - streaming feature extraction for labeled tiled images.
//!
//! Processing one image pair runs in two phases:
//! - Streaming: tiles are decoded in parallel and every foreground pixel is
//!   folded into its ROI's online accumulator.
//! - Reduction: a dependency-ordered plan of feature stages turns each
//!   finished accumulator into a feature row, gated by a [`FeatureGate`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use roi_features::{process_dataset, Config, Dataset};
//!
//! let config = Config::from_file("features.yaml")?;
//! let gate = config.feature_gate()?;
//! let dataset = Dataset::new(intensity_files, label_files)?;
//! let matrix = process_dataset(&dataset, &opener, &gate, &config)?;
//!
//! println!("{} ROIs x {} features", matrix.num_rows(), matrix.num_columns());
//! ```

pub mod accumulator;
pub mod config;
pub mod dataset;
pub mod error;
pub mod gate;
pub mod histogram;
pub mod loader;
pub mod modules;
pub mod neighbors;
pub mod nested;
pub mod reduction;
pub mod registry;
pub mod roi;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Streaming phase
// ============================================================================

pub use accumulator::{Moments, RoiAccumulator};
pub use histogram::{Histogram, HistogramStats, HISTOGRAM_CONTRACT_VERSION};
pub use loader::{InMemoryImage, Tile, TileLayout, TileLoader};
pub use registry::RoiRegistry;
pub use scan::scan_image;
pub use types::{Aabb, Label, PixIntens, Pixel, BACKGROUND};

// ============================================================================
// Reduction phase
// ============================================================================

pub use gate::{FeatureCode, FeatureGate, FeatureGroup};
pub use modules::standard_stages;
pub use neighbors::count_neighbors;
pub use reduction::{
    Artifact, FeatureModule, PerRoi, ReduceContext, ReductionPlan, ReductionReport, Stage,
    StageInfo,
};
pub use roi::{Derived, FeatureValues, Roi};

// ============================================================================
// Driver
// ============================================================================

pub use config::{Config, TextureConfig};
pub use dataset::{
    process_dataset, process_dataset_with_plan, process_file, Dataset, FeatureMatrix,
    FileFeatures, FilePair, ImageOpener, RowKey,
};
pub use error::{
    ConfigError, DatasetError, FeatureError, GateError, LoaderError, PlanError,
};
pub use nested::{aggregate, AggregationMethod, NestedRelations, NestedTable};
