//! Example: extract features from a generated well plate
//!
//! Builds a label/intensity image pair in memory (a grid of cells, each with
//! one nucleus), runs the full pipeline over it and prints a few columns.
//! The nuclei are also processed as a second segmentation and aggregated
//! into their parent cells.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=roi_features=debug cargo run --example synthetic_plate
//! ```

use std::path::PathBuf;
use std::time::Instant;

use common::log_setup::LogSettings;
use common::Buffer2;
use roi_features::{
    aggregate, process_dataset, process_file, standard_stages, AggregationMethod, Config, Dataset,
    FeatureGate, FilePair, ImageOpener, InMemoryImage, LoaderError, NestedRelations,
    ReductionPlan,
};

const PLATE_SIZE: usize = 512;
const GRID: usize = 8;
const TILE_SIZE: usize = 128;

/// Cell or nucleus mask, chosen by the label file name.
struct SyntheticOpener;

impl ImageOpener for SyntheticOpener {
    type Loader = InMemoryImage;

    fn open(&self, pair: &FilePair) -> Result<InMemoryImage, LoaderError> {
        let nuclei = pair
            .label
            .to_str()
            .ok_or_else(|| LoaderError::Open {
                path: pair.label.clone(),
                reason: "path is not valid UTF-8".to_string(),
            })?
            .contains("nuclei");
        Ok(plate(nuclei))
    }
}

fn plate(nuclei: bool) -> InMemoryImage {
    let pitch = PLATE_SIZE / GRID;
    let mut labels = Buffer2::new_default(PLATE_SIZE, PLATE_SIZE);
    let mut intensities = Buffer2::new_default(PLATE_SIZE, PLATE_SIZE);
    for y in 0..PLATE_SIZE {
        for x in 0..PLATE_SIZE {
            let (cx, cy) = (x / pitch, y / pitch);
            let dx = (x % pitch) as i64 - pitch as i64 / 2;
            let dy = (y % pitch) as i64 - pitch as i64 / 2;
            let d2 = dx * dx + dy * dy;
            let radius = if nuclei { pitch as i64 / 6 } else { pitch as i64 / 2 - 2 };

            let speckle = (x as i64 * 7 + y as i64 * 13) % 97;
            let level = 1000 + 40 * (cx + cy) as i64 + speckle - d2 / 8;
            intensities[(x, y)] = level.max(0) as u32;
            if d2 <= radius * radius {
                labels[(x, y)] = (cy * GRID + cx + 1) as u32;
            }
        }
    }
    InMemoryImage::new(labels, intensities, TILE_SIZE, TILE_SIZE)
}

fn main() {
    common::log_setup::setup_logging(&LogSettings::new("info", "synthetic_plate"))
        .unwrap_or_else(|e| panic!("Logging setup failed: {e}"));

    let config = Config::default();
    let gate = config
        .feature_gate()
        .unwrap_or_else(|e| panic!("Invalid feature selection: {e}"));

    let dataset = Dataset::new(
        vec![PathBuf::from("plate_cells.tif")],
        vec![PathBuf::from("plate_cells_seg.tif")],
    )
    .unwrap_or_else(|e| panic!("{e}"));

    let start = Instant::now();
    let matrix = match process_dataset(&dataset, &SyntheticOpener, &gate, &config) {
        Ok(matrix) => matrix,
        Err(e) => {
            eprintln!("{}", e.details());
            std::process::exit(e.status_code());
        }
    };
    println!(
        "{} ROIs x {} features in {:.1?}",
        matrix.num_rows(),
        matrix.num_columns(),
        start.elapsed()
    );
    for row in 0..matrix.num_rows().min(3) {
        println!(
            "label {:>3}: area {:>6.0}  mean {:>8.2}  perimeter {:>5.0}  contrast {:>7.3}",
            matrix.rows[row].label,
            matrix.value(row, "AREA_PIXELS_COUNT").unwrap_or_default(),
            matrix.value(row, "MEAN").unwrap_or_default(),
            matrix.value(row, "PERIMETER").unwrap_or_default(),
            matrix.value(row, "TEXTURE_CONTRAST").unwrap_or_default(),
        );
    }

    // Nuclei inside cells, aggregated per cell
    let plan = ReductionPlan::new(standard_stages()).unwrap_or_else(|e| panic!("{e}"));
    let shape_gate = FeatureGate::from_names(&["AREA_PIXELS_COUNT", "MEAN"])
        .unwrap_or_else(|e| panic!("{e}"));
    let cells = process_file(&plate(false), &shape_gate, &config, &plan)
        .unwrap_or_else(|e| panic!("{e}"));
    let nuclei = process_file(&plate(true), &shape_gate, &config, &plan)
        .unwrap_or_else(|e| panic!("{e}"));
    let relations = NestedRelations::find(&cells, &nuclei);
    let table = aggregate(&cells, &nuclei, &relations, &shape_gate, AggregationMethod::Mean);
    println!(
        "{} cells with nuclei, {} orphan nuclei; columns: {}",
        table.rows.len(),
        relations.orphans,
        table.columns.join(", ")
    );
}
