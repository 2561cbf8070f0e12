//! Dataset driver: pairs intensity and label files, runs both phases per file
//! and assembles the output matrix.


use std::path::PathBuf;

use crate::config::Config;
use crate::error::{DatasetError, FeatureError, LoaderError};
use crate::gate::FeatureGate;
use crate::loader::TileLoader;
use crate::modules::standard_stages;
use crate::reduction::{ReduceContext, ReductionPlan, ReductionReport};
use crate::registry::RoiRegistry;
use crate::roi::{FeatureValues, Roi};
use crate::scan::scan_image;
use crate::types::{Aabb, Label};

/// One intensity image and its segmentation mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub intensity: PathBuf,
    pub label: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pairs: Vec<FilePair>,
}

impl Dataset {
    /// Sorts both lists and pairs them by position.
    pub fn new(
        mut intensity_files: Vec<PathBuf>,
        mut label_files: Vec<PathBuf>,
    ) -> Result<Self, DatasetError> {
        if intensity_files.is_empty() || label_files.is_empty() {
            return Err(DatasetError::NoFiles);
        }
        if intensity_files.len() != label_files.len() {
            return Err(DatasetError::CountMismatch {
                intensity: intensity_files.len(),
                label: label_files.len(),
            });
        }
        intensity_files.sort();
        label_files.sort();
        let pairs = intensity_files
            .into_iter()
            .zip(label_files)
            .map(|(intensity, label)| FilePair { intensity, label })
            .collect();
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[FilePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Turns a file pair into a tile source (the image decoder lives behind this).
pub trait ImageOpener {
    type Loader: TileLoader;

    fn open(&self, pair: &FilePair) -> Result<Self::Loader, LoaderError>;
}

/// Reduced ROIs of one file, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct FileFeatures {
    pub labels: Vec<Label>,
    pub aabbs: Vec<Aabb>,
    pub values: Vec<FeatureValues>,
    pub report: ReductionReport,
}

impl FileFeatures {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn from_rois(rois: Vec<Roi>, report: ReductionReport) -> Self {
        let mut out = Self {
            labels: Vec::with_capacity(rois.len()),
            aabbs: Vec::with_capacity(rois.len()),
            values: Vec::with_capacity(rois.len()),
            report,
        };
        for roi in rois {
            out.labels.push(roi.label());
            out.aabbs.push(roi.acc.aabb());
            out.values.push(roi.derived.values);
        }
        out
    }
}

/// State of one file's pass. Nothing in it outlives the file.
struct FileContext {
    registry: RoiRegistry,
}

impl FileContext {
    fn new() -> Self {
        Self {
            registry: RoiRegistry::new(),
        }
    }

    fn stream<L: TileLoader + ?Sized>(&self, loader: &L, config: &Config) -> Result<u64, LoaderError> {
        scan_image(loader, &self.registry, config.max_tiles_in_flight)
    }

    fn reduce(self, ctx: &ReduceContext<'_>, plan: &ReductionPlan) -> FileFeatures {
        let mut rois: Vec<Roi> = self.registry.into_rois().into_iter().map(Roi::new).collect();
        let report = plan.run(&mut rois, ctx);
        FileFeatures::from_rois(rois, report)
    }
}

/// Streams one image and reduces its ROIs.
pub fn process_file<L: TileLoader + ?Sized>(
    loader: &L,
    gate: &FeatureGate,
    config: &Config,
    plan: &ReductionPlan,
) -> Result<FileFeatures, LoaderError> {
    let context = FileContext::new();
    let observations = context.stream(loader, config)?;
    let rois = context.registry.len();
    tracing::info!(observations, rois, "Streaming phase finished");

    let ctx = ReduceContext { gate, config };
    let features = context.reduce(&ctx, plan);
    tracing::info!(
        rois = features.len(),
        stages = features.report.stages_run.len(),
        "Reduction phase finished"
    );
    Ok(features)
}

/// Row identity in the dataset matrix: file index within the dataset and ROI label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowKey {
    pub file: usize,
    pub label: Label,
}

/// Dense row-major `rows x columns` result.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub rows: Vec<RowKey>,
    pub columns: Vec<&'static str>,
    pub data: Vec<f64>,
}

impl FeatureMatrix {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn row(&self, index: usize) -> &[f64] {
        let cols = self.num_columns();
        &self.data[index * cols..(index + 1) * cols]
    }

    /// Value by column name.
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.columns.iter().position(|&c| c == column)?;
        self.row(row).get(col).copied()
    }
}

/// Processes every file with the built-in stages.
pub fn process_dataset<O: ImageOpener>(
    dataset: &Dataset,
    opener: &O,
    gate: &FeatureGate,
    config: &Config,
) -> Result<FeatureMatrix, FeatureError> {
    let plan = ReductionPlan::new(standard_stages())?;
    process_dataset_with_plan(dataset, opener, gate, config, &plan)
}

pub fn process_dataset_with_plan<O: ImageOpener>(
    dataset: &Dataset,
    opener: &O,
    gate: &FeatureGate,
    config: &Config,
    plan: &ReductionPlan,
) -> Result<FeatureMatrix, FeatureError> {
    config.validate();
    if dataset.is_empty() {
        return Err(DatasetError::NoFiles.into());
    }

    let mut files = Vec::with_capacity(dataset.len());
    for (index, pair) in dataset.pairs().iter().enumerate() {
        let _span = tracing::info_span!("file", index, label = %pair.label.display()).entered();
        let with_file = |source| FeatureError::Loader {
            file: pair.label.clone(),
            source,
        };
        let loader = opener.open(pair).map_err(with_file)?;
        files.push(process_file(&loader, gate, config, plan).map_err(with_file)?);
    }

    assemble(&files, gate)
}

/// Concatenates per-file rows restricted to the enabled columns.
pub(crate) fn assemble(files: &[FileFeatures], gate: &FeatureGate) -> Result<FeatureMatrix, FeatureError> {
    let rows: Vec<RowKey> = files
        .iter()
        .enumerate()
        .flat_map(|(file, f)| f.labels.iter().map(move |&label| RowKey { file, label }))
        .collect();
    if rows.is_empty() {
        return Err(FeatureError::NoRois);
    }
    let columns = gate.column_names();
    if columns.is_empty() {
        return Err(FeatureError::NoFeatures);
    }

    let expected = rows
        .len()
        .checked_mul(columns.len())
        .ok_or(FeatureError::Allocation {
            requested: usize::MAX,
        })?;
    let mut data = Vec::new();
    data.try_reserve_exact(expected)
        .map_err(|_| FeatureError::Allocation {
            requested: expected,
        })?;
    for values in files.iter().flat_map(|f| &f.values) {
        data.extend(values.select(gate));
    }

    if data.len() != expected {
        return Err(FeatureError::ShapeMismatch {
            rows: rows.len(),
            cols: columns.len(),
            expected,
            actual: data.len(),
        });
    }

    tracing::info!(rows = rows.len(), columns = columns.len(), "Feature matrix assembled");
    Ok(FeatureMatrix {
        rows,
        columns,
        data,
    })
}
