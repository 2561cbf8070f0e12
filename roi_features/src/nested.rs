//! Parent/child relations between two segmentations of the same image,
//! e.g. nuclei inside cells.

use rayon::prelude::*;
use strum_macros::{Display, EnumString};

use crate::dataset::FileFeatures;
use crate::gate::FeatureGate;
use crate::types::Label;

/// How child rows are folded into their parent's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum AggregationMethod {
    Sum,
    Mean,
    Min,
    Max,
    /// Kept for compatibility with older outputs; computed as the plain mean.
    Wma,
    /// Children side by side, zero-padded to the largest family.
    None,
}

/// A parent ROI and the children it contains. Indices refer to the rows of
/// the corresponding [`FileFeatures`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    pub parent: usize,
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedRelations {
    /// Parents with at least one child, in parent discovery order.
    pub families: Vec<Family>,
    /// Children contained in no parent.
    pub orphans: usize,
}

impl NestedRelations {
    /// A child belongs to every parent whose box contains the child's box.
    pub fn find(parent: &FileFeatures, child: &FileFeatures) -> Self {
        let families: Vec<Family> = parent
            .aabbs
            .par_iter()
            .enumerate()
            .filter_map(|(p, parent_box)| {
                let children: Vec<usize> = child
                    .aabbs
                    .iter()
                    .enumerate()
                    .filter(|(_, child_box)| parent_box.contains_aabb(child_box))
                    .map(|(c, _)| c)
                    .collect();
                (!children.is_empty()).then_some(Family { parent: p, children })
            })
            .collect();

        let mut adopted = vec![false; child.len()];
        families
            .iter()
            .flat_map(|f| &f.children)
            .for_each(|&c| adopted[c] = true);
        let orphans = adopted.iter().filter(|&&a| !a).count();

        tracing::debug!(
            parents = families.len(),
            children = child.len(),
            orphans,
            "Nested relations found"
        );
        Self { families, orphans }
    }

    pub fn children_of(&self, parent_label: Label, parent: &FileFeatures, child: &FileFeatures) -> Vec<Label> {
        self.families
            .iter()
            .find(|f| parent.labels[f.parent] == parent_label)
            .map(|f| f.children.iter().map(|&c| child.labels[c]).collect())
            .unwrap_or_default()
    }
}

/// One row per parent family: parent features, then aggregated child features.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedTable {
    pub columns: Vec<String>,
    pub labels: Vec<Label>,
    pub rows: Vec<Vec<f64>>,
}

pub fn aggregate(
    parent: &FileFeatures,
    child: &FileFeatures,
    relations: &NestedRelations,
    gate: &FeatureGate,
    method: AggregationMethod,
) -> NestedTable {
    let names = gate.column_names();
    let widest = relations
        .families
        .iter()
        .map(|f| f.children.len())
        .max()
        .unwrap_or(0);

    let mut columns: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    match method {
        AggregationMethod::None => {
            for k in 1..=widest {
                columns.extend(names.iter().map(|n| format!("CHILD{k}_{n}")));
            }
        }
        _ => columns.extend(names.iter().map(|n| format!("{method}_{n}"))),
    }

    let mut labels = Vec::with_capacity(relations.families.len());
    let mut rows = Vec::with_capacity(relations.families.len());
    for family in &relations.families {
        let mut row: Vec<f64> = parent.values[family.parent].select(gate).collect();
        let kids: Vec<Vec<f64>> = family
            .children
            .iter()
            .map(|&c| child.values[c].select(gate).collect())
            .collect();

        match method {
            AggregationMethod::None => {
                for kid in &kids {
                    row.extend(kid);
                }
                row.resize(columns.len(), 0.0);
            }
            _ => row.extend((0..names.len()).map(|col| fold(method, kids.iter().map(|k| k[col])))),
        }

        labels.push(parent.labels[family.parent]);
        rows.push(row);
    }

    NestedTable {
        columns,
        labels,
        rows,
    }
}

fn fold(method: AggregationMethod, values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().sum();
    match method {
        AggregationMethod::Sum => sum,
        AggregationMethod::Mean | AggregationMethod::Wma => sum / values.len() as f64,
        AggregationMethod::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregationMethod::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregationMethod::None => unreachable!("concatenation is not a fold"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::FeatureCode;
    use crate::roi::FeatureValues;
    use crate::types::Aabb;

    fn file(rois: &[(Label, Aabb, f64)]) -> FileFeatures {
        let mut f = FileFeatures::default();
        for &(label, aabb, area) in rois {
            let mut values = FeatureValues::default();
            values.set(FeatureCode::AreaPixelsCount, area);
            f.labels.push(label);
            f.aabbs.push(aabb);
            f.values.push(values);
        }
        f
    }

    fn cells_and_nuclei() -> (FileFeatures, FileFeatures) {
        let cells = file(&[
            (1, Aabb::new(0, 10, 0, 10), 100.0),
            (2, Aabb::new(20, 30, 0, 10), 90.0),
            (3, Aabb::new(40, 50, 0, 10), 80.0),
        ]);
        let nuclei = file(&[
            (7, Aabb::new(2, 4, 2, 4), 9.0),
            (8, Aabb::new(21, 23, 1, 3), 4.0),
            (9, Aabb::new(25, 30, 5, 10), 6.0),
            // straddles cells 1 and 2
            (10, Aabb::new(8, 22, 0, 2), 5.0),
        ]);
        (cells, nuclei)
    }

    #[test]
    fn test_find_families_and_orphans() {
        let (cells, nuclei) = cells_and_nuclei();
        let relations = NestedRelations::find(&cells, &nuclei);

        assert_eq!(
            relations.families,
            vec![
                Family {
                    parent: 0,
                    children: vec![0]
                },
                Family {
                    parent: 1,
                    children: vec![1, 2]
                },
            ]
        );
        assert_eq!(relations.orphans, 1);
        assert_eq!(relations.children_of(2, &cells, &nuclei), vec![8, 9]);
        assert!(relations.children_of(3, &cells, &nuclei).is_empty());
    }

    #[test]
    fn test_aggregate_folds_children() {
        let (cells, nuclei) = cells_and_nuclei();
        let relations = NestedRelations::find(&cells, &nuclei);
        let gate = FeatureGate::only(&[FeatureCode::AreaPixelsCount]);

        let sum = aggregate(&cells, &nuclei, &relations, &gate, AggregationMethod::Sum);
        assert_eq!(sum.columns, vec!["AREA_PIXELS_COUNT", "SUM_AREA_PIXELS_COUNT"]);
        assert_eq!(sum.labels, vec![1, 2]);
        assert_eq!(sum.rows[1], vec![90.0, 10.0]);

        let mean = aggregate(&cells, &nuclei, &relations, &gate, AggregationMethod::Mean);
        assert_eq!(mean.rows[1], vec![90.0, 5.0]);
        let wma = aggregate(&cells, &nuclei, &relations, &gate, AggregationMethod::Wma);
        assert_eq!(wma.rows[1], mean.rows[1]);

        let max = aggregate(&cells, &nuclei, &relations, &gate, AggregationMethod::Max);
        assert_eq!(max.rows[1][1], 6.0);
        let min = aggregate(&cells, &nuclei, &relations, &gate, AggregationMethod::Min);
        assert_eq!(min.rows[1][1], 4.0);
    }

    #[test]
    fn test_aggregate_none_pads_to_widest_family() {
        let (cells, nuclei) = cells_and_nuclei();
        let relations = NestedRelations::find(&cells, &nuclei);
        let gate = FeatureGate::only(&[FeatureCode::AreaPixelsCount]);

        let table = aggregate(&cells, &nuclei, &relations, &gate, AggregationMethod::None);

        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.columns[2], "CHILD2_AREA_PIXELS_COUNT");
        assert_eq!(table.rows[0], vec![100.0, 9.0, 0.0]);
        assert_eq!(table.rows[1], vec![90.0, 4.0, 6.0]);
    }

    #[test]
    fn test_method_names_parse_case_insensitively() {
        assert_eq!("wma".parse::<AggregationMethod>().unwrap(), AggregationMethod::Wma);
        assert_eq!("Sum".parse::<AggregationMethod>().unwrap(), AggregationMethod::Sum);
        assert_eq!("NONE".parse::<AggregationMethod>().unwrap(), AggregationMethod::None);
        assert!("median".parse::<AggregationMethod>().is_err());
        assert_eq!(AggregationMethod::Max.to_string(), "MAX");
    }
}
