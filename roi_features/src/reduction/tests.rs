use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::gate::code::{GLCM, GLDM, GLRLM, GLSZM, NGTDM};
use crate::gate::FeatureGroup;
use crate::modules::standard_stages;
use crate::testing::{accumulate, disc_pixels, rect_pixels};

/// Counts how many ROIs it was invoked on.
struct Counting {
    info: StageInfo,
    calls: Arc<AtomicUsize>,
}

impl Counting {
    fn boxed(info: StageInfo) -> (Box<dyn Stage>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let module = Counting {
            info,
            calls: calls.clone(),
        };
        (Box::new(PerRoi(module)), calls)
    }
}

impl FeatureModule for Counting {
    fn info(&self) -> &StageInfo {
        &self.info
    }

    fn compute(&self, _acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        for &code in self.info.codes {
            derived.values.set(code, 1.0);
        }
    }
}

fn sample_rois() -> Vec<Roi> {
    vec![
        Roi::new(accumulate(1, &rect_pixels(2, 2, 5, 4, 100))),
        Roi::new(accumulate(2, &disc_pixels(20, 20, 4, 300))),
        Roi::new(accumulate(3, &rect_pixels(40, 3, 2, 9, 50))),
    ]
}

fn names(plan: &ReductionPlan, order: &[usize]) -> Vec<&'static str> {
    let all = plan.stage_names();
    order.iter().map(|&i| all[i]).collect()
}

// =============================================================================
// Plan validation
// =============================================================================

#[test]
fn test_standard_plan_is_valid() {
    let plan = ReductionPlan::new(standard_stages()).unwrap();
    assert_eq!(plan.stage_names().len(), 21);
}

#[test]
fn test_duplicate_code_is_rejected() {
    let (a, _) = Counting::boxed(StageInfo::new("a", &[FeatureCode::Mean, FeatureCode::Max]));
    let (b, _) = Counting::boxed(StageInfo::new("b", &[FeatureCode::Max]));

    let err = ReductionPlan::new(vec![a, b]).unwrap_err();
    assert!(matches!(
        err,
        PlanError::DuplicateCode {
            code: FeatureCode::Max,
            first: "a",
            second: "b"
        }
    ));
}

#[test]
fn test_missing_provider_is_rejected() {
    let (a, _) = Counting::boxed(StageInfo::new("a", &[FeatureCode::Mean]).requires(&[Artifact::Contour]));

    let err = ReductionPlan::new(vec![a]).unwrap_err();
    assert!(matches!(
        err,
        PlanError::MissingProvider {
            stage: "a",
            artifact: Artifact::Contour
        }
    ));
}

#[test]
fn test_dependency_cycle_is_rejected() {
    let (a, _) = Counting::boxed(
        StageInfo::new("a", &[FeatureCode::Mean])
            .requires(&[Artifact::Contour])
            .provides(&[Artifact::ConvexHull]),
    );
    let (b, _) = Counting::boxed(
        StageInfo::new("b", &[FeatureCode::Max])
            .requires(&[Artifact::ConvexHull])
            .provides(&[Artifact::Contour]),
    );
    let (c, _) = Counting::boxed(StageInfo::new("c", &[FeatureCode::Min]));

    match ReductionPlan::new(vec![a, b, c]).unwrap_err() {
        PlanError::Cycle { stages } => assert_eq!(stages, vec!["a", "b"]),
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Scheduling
// =============================================================================

#[test]
fn test_schedule_pulls_in_transitive_providers() {
    let plan = ReductionPlan::new(standard_stages()).unwrap();
    let gate = FeatureGate::only(&[FeatureCode::PolygonalityAve]);

    let order = plan.schedule(&gate);

    assert_eq!(
        names(&plan, &order),
        vec![
            "intensity",
            "morphology",
            "contour",
            "convex_hull",
            "extrema",
            "euler",
            "neighbors",
            "feret",
            "polygonality",
        ]
    );
}

#[test]
fn test_circles_schedule_waits_for_neighbors() {
    let plan = ReductionPlan::new(standard_stages()).unwrap();
    let gate = FeatureGate::only(&[FeatureCode::DiameterMinEnclosingCircle]);

    assert_eq!(
        names(&plan, &plan.schedule(&gate)),
        vec![
            "intensity",
            "morphology",
            "contour",
            "convex_hull",
            "extrema",
            "euler",
            "neighbors",
            "feret",
            "circles",
        ]
    );
}

#[test]
fn test_martin_schedule_pulls_in_hull() {
    let plan = ReductionPlan::new(standard_stages()).unwrap();
    let gate = FeatureGate::only(&[FeatureCode::StatMartinDiamMin]);

    assert_eq!(
        names(&plan, &plan.schedule(&gate)),
        vec!["intensity", "morphology", "convex_hull", "extrema", "euler", "martin"]
    );
}

#[test]
fn test_schedule_runs_providers_before_consumers() {
    // consumer registered first still runs after its provider
    let (consumer, _) = Counting::boxed(StageInfo::new("consumer", &[FeatureCode::Mean]).requires(&[Artifact::Neighbors]));
    let (provider, _) = Counting::boxed(StageInfo::new("provider", &[]).provides(&[Artifact::Neighbors]));
    let (other, _) = Counting::boxed(StageInfo::new("other", &[FeatureCode::Max]));
    let plan = ReductionPlan::new(vec![consumer, provider, other]).unwrap();

    let order = plan.schedule(&FeatureGate::all());
    assert_eq!(names(&plan, &order), vec!["provider", "consumer", "other"]);
}

#[test]
fn test_always_run_stage_runs_with_empty_gate() {
    let (always, always_calls) = Counting::boxed(StageInfo::new("always", &[FeatureCode::Mean]).always());
    let (gated, gated_calls) = Counting::boxed(StageInfo::new("gated", &[FeatureCode::Max]));
    let plan = ReductionPlan::new(vec![always, gated]).unwrap();

    let gate = FeatureGate::none();
    let config = Config::default();
    let mut rois = sample_rois();
    let report = plan.run(&mut rois, &ReduceContext { gate: &gate, config: &config });

    assert_eq!(report.stages_run, vec!["always"]);
    assert_eq!(always_calls.load(Ordering::Relaxed), 3);
    assert_eq!(gated_calls.load(Ordering::Relaxed), 0);
}

// =============================================================================
// Gate fidelity
// =============================================================================

#[test]
fn test_disabled_modules_never_execute() {
    let (mean, mean_calls) = Counting::boxed(StageInfo::new("mean", &[FeatureCode::Mean]));
    let (max, max_calls) = Counting::boxed(StageInfo::new("max", &[FeatureCode::Max]));
    let plan = ReductionPlan::new(vec![mean, max]).unwrap();

    let gate = FeatureGate::only(&[FeatureCode::Mean]);
    let config = Config::default();
    let mut rois = sample_rois();
    let report = plan.run(&mut rois, &ReduceContext { gate: &gate, config: &config });

    assert!(report.ran("mean"));
    assert!(!report.ran("max"));
    assert_eq!(mean_calls.load(Ordering::Relaxed), rois.len());
    assert_eq!(max_calls.load(Ordering::Relaxed), 0);
    assert!(rois.iter().all(|r| r.value(FeatureCode::Mean) == 1.0));
    assert!(rois.iter().all(|r| r.value(FeatureCode::Max) == 0.0));
}

#[test]
fn test_texture_disabled_skips_texture_stages() {
    let plan = ReductionPlan::new(standard_stages()).unwrap();
    let mut gate = FeatureGate::all();
    gate.disable_group(FeatureGroup::Texture);
    let config = Config::default();
    let mut rois = sample_rois();

    let report = plan.run(&mut rois, &ReduceContext { gate: &gate, config: &config });

    for stage in ["glcm", "zernike", "glrlm", "glszm", "gldm", "ngtdm"] {
        assert!(!report.ran(stage), "{stage} should not run");
    }
    assert!(report.ran("hu_moments"));
    for roi in &rois {
        assert_eq!(roi.derived.values.select(&gate).count(), gate.num_columns());
        for &code in GLCM.iter().chain(GLRLM).chain(GLSZM).chain(GLDM).chain(NGTDM) {
            assert_eq!(roi.value(code), 0.0);
        }
        let zernike = roi.derived.values.columns(FeatureCode::TextureZernike2D);
        assert!(zernike.iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_every_stage_runs_once_with_full_gate() {
    let plan = ReductionPlan::new(standard_stages()).unwrap();
    let gate = FeatureGate::all();
    let config = Config::default();
    let mut rois = sample_rois();

    let report = plan.run(&mut rois, &ReduceContext { gate: &gate, config: &config });

    assert_eq!(report.stages_run.len(), 21);
    let position = |name: &str| report.stages_run.iter().position(|&s| s == name).unwrap();
    assert!(position("convex_hull") < position("feret"));
    assert!(position("neighbors") < position("polygonality"));
    assert!(position("contour") < position("circles"));
    assert!(position("neighbors") < position("circles"));
    assert!(position("neighbors") < position("geodetic"));
    assert!(position("convex_hull") < position("martin"));
    assert!(position("convex_hull") < position("nassenstein"));
}
