//! Error types for feature extraction.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::gate::FeatureCode;
use crate::reduction::Artifact;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Unknown feature name '{0}'")]
    UnknownFeature(String),
}

/// Input file-set problems, surfaced before any file is scanned.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset contains no image files")]
    NoFiles,

    #[error("Mismatch of intensity and label file counts: {intensity} vs {label}")]
    CountMismatch { intensity: usize, label: usize },
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Tile {tile} is out of range (image has {count} tiles)")]
    TileOutOfRange { tile: usize, count: usize },

    #[error("Failed to fetch tile {tile}: {reason}")]
    TileFetch { tile: usize, reason: String },

    #[error("Failed to open '{path}': {reason}")]
    Open { path: PathBuf, reason: String },
}

/// Invalid stage registry passed to the reduction planner.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Feature {code} is produced by both '{first}' and '{second}'")]
    DuplicateCode {
        code: FeatureCode,
        first: &'static str,
        second: &'static str,
    },

    #[error("Stage '{stage}' requires {artifact:?} but no stage provides it")]
    MissingProvider {
        stage: &'static str,
        artifact: Artifact,
    },

    #[error("Stage dependencies form a cycle through {stages:?}")]
    Cycle { stages: Vec<&'static str> },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Format(#[from] common::FileExtensionError),

    #[error("Failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: common::SerdeFormatError,
    },

    #[error(transparent)]
    Gate(#[from] GateError),
}

/// Single tagged result carried to the output boundary.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Dataset structure error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Error loading '{file}': {source}")]
    Loader {
        file: PathBuf,
        #[source]
        source: LoaderError,
    },

    #[error("Invalid reduction plan: {0}")]
    Plan(#[from] PlanError),

    #[error("No unique labels were processed")]
    NoRois,

    #[error("No features were calculated")]
    NoFeatures,

    #[error(
        "Result shape [rows={rows} x cols={cols} = {expected}] mismatches the result buffer size {actual}"
    )]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to allocate a result buffer of {requested} values")]
    Allocation { requested: usize },
}

impl FeatureError {
    /// Integer status code of the output boundary.
    pub fn status_code(&self) -> i32 {
        match self {
            FeatureError::Dataset(_) => 1,
            FeatureError::Loader { .. } | FeatureError::Plan(_) => 2,
            FeatureError::NoRois => 3,
            FeatureError::NoFeatures => 4,
            FeatureError::ShapeMismatch { .. } => 5,
            FeatureError::Allocation { .. } => 6,
        }
    }

    pub fn details(&self) -> String {
        self.to_string()
    }
}
