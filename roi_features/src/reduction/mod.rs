//! Reduction phase: a registry of stages, each declaring the feature codes it
//! produces and the intermediate artifacts it needs or provides, sequenced
//! topologically.
//!
//! A stage is scheduled when it always runs, when any of its codes is enabled,
//! or when a scheduled stage needs an artifact it provides. Ties in the
//! dependency order are broken by registration order.

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::accumulator::RoiAccumulator;
use crate::config::Config;
use crate::error::PlanError;
use crate::gate::{FeatureCode, FeatureGate};
use crate::roi::{Derived, Roi};

/// Intermediate results passed between stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Centroid,
    Contour,
    ConvexHull,
    Neighbors,
    FeretDiameters,
}

/// Static description of a stage.
#[derive(Debug, Clone, Copy)]
pub struct StageInfo {
    pub name: &'static str,
    pub codes: &'static [FeatureCode],
    pub requires: &'static [Artifact],
    pub provides: &'static [Artifact],
    pub always_run: bool,
}

impl StageInfo {
    pub const fn new(name: &'static str, codes: &'static [FeatureCode]) -> Self {
        Self {
            name,
            codes,
            requires: &[],
            provides: &[],
            always_run: false,
        }
    }

    pub const fn requires(mut self, artifacts: &'static [Artifact]) -> Self {
        self.requires = artifacts;
        self
    }

    pub const fn provides(mut self, artifacts: &'static [Artifact]) -> Self {
        self.provides = artifacts;
        self
    }

    pub const fn always(mut self) -> Self {
        self.always_run = true;
        self
    }
}

/// Read-only inputs shared by all stages of one reduction.
#[derive(Debug, Clone, Copy)]
pub struct ReduceContext<'a> {
    pub gate: &'a FeatureGate,
    pub config: &'a Config,
}

/// A reduction step over all ROIs of one file.
pub trait Stage: Send + Sync {
    fn info(&self) -> &StageInfo;

    fn run(&self, rois: &mut [Roi], ctx: &ReduceContext<'_>);
}

/// Per-ROI feature computation. Implementations keep no state between ROIs.
pub trait FeatureModule: Send + Sync {
    fn info(&self) -> &StageInfo;

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, ctx: &ReduceContext<'_>);
}

/// Runs a [`FeatureModule`] over every ROI in parallel.
pub struct PerRoi<M>(pub M);

impl<M: FeatureModule> Stage for PerRoi<M> {
    fn info(&self) -> &StageInfo {
        self.0.info()
    }

    fn run(&self, rois: &mut [Roi], ctx: &ReduceContext<'_>) {
        rois.par_iter_mut()
            .for_each(|roi| self.0.compute(&roi.acc, &mut roi.derived, ctx));
    }
}

/// Names of the stages executed, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReductionReport {
    pub stages_run: Vec<&'static str>,
}

impl ReductionReport {
    pub fn ran(&self, stage: &str) -> bool {
        self.stages_run.iter().any(|&s| s == stage)
    }
}

pub struct ReductionPlan {
    stages: Vec<Box<dyn Stage>>,
    // deps[i] = indices of stages providing something stage i requires
    deps: Vec<Vec<usize>>,
}

impl std::fmt::Debug for ReductionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReductionPlan")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl ReductionPlan {
    /// Validates the registry: every code has one producer, every required
    /// artifact has a provider and the dependencies are acyclic.
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Result<Self, PlanError> {
        let mut producer: hashbrown::HashMap<FeatureCode, &'static str> = hashbrown::HashMap::new();
        for stage in &stages {
            let info = stage.info();
            for &code in info.codes {
                if let Some(first) = producer.insert(code, info.name) {
                    return Err(PlanError::DuplicateCode {
                        code,
                        first,
                        second: info.name,
                    });
                }
            }
        }

        let mut deps = Vec::with_capacity(stages.len());
        for stage in &stages {
            let info = stage.info();
            let mut providers = Vec::new();
            for &artifact in info.requires {
                let before = providers.len();
                providers.extend(
                    stages
                        .iter()
                        .enumerate()
                        .filter(|(_, s)| s.info().provides.contains(&artifact))
                        .map(|(i, _)| i),
                );
                if providers.len() == before {
                    return Err(PlanError::MissingProvider {
                        stage: info.name,
                        artifact,
                    });
                }
            }
            providers.sort_unstable();
            providers.dedup();
            deps.push(providers);
        }

        let plan = Self { stages, deps };
        let everything: Vec<bool> = vec![true; plan.stages.len()];
        plan.order(&everything)?;
        Ok(plan)
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.info().name).collect()
    }

    /// Indices of the stages to run for `gate`, in execution order.
    pub fn schedule(&self, gate: &FeatureGate) -> Vec<usize> {
        let mut selected: Vec<bool> = self
            .stages
            .iter()
            .map(|s| {
                let info = s.info();
                info.always_run || gate.any_enabled(info.codes)
            })
            .collect();

        let mut pending: Vec<usize> = (0..selected.len()).filter(|&i| selected[i]).collect();
        while let Some(i) = pending.pop() {
            for &dep in &self.deps[i] {
                if !selected[dep] {
                    selected[dep] = true;
                    pending.push(dep);
                }
            }
        }

        // Acyclicity was checked when the plan was built.
        self.order(&selected).unwrap_or_default()
    }

    /// Runs the scheduled stages over `rois`.
    pub fn run(&self, rois: &mut [Roi], ctx: &ReduceContext<'_>) -> ReductionReport {
        let mut report = ReductionReport::default();
        for idx in self.schedule(ctx.gate) {
            let stage = &self.stages[idx];
            let name = stage.info().name;
            let _span = tracing::debug_span!("reduce_stage", stage = name).entered();
            stage.run(rois, ctx);
            tracing::debug!(stage = name, rois = rois.len(), "Reduction stage finished");
            report.stages_run.push(name);
        }
        report
    }

    /// Kahn's algorithm over the selected stages, smallest index first.
    fn order(&self, selected: &[bool]) -> Result<Vec<usize>, PlanError> {
        let n = self.stages.len();
        let mut indegree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for i in (0..n).filter(|&i| selected[i]) {
            for &dep in self.deps[i].iter().filter(|&&d| selected[d]) {
                indegree[i] += 1;
                dependents[dep].push(i);
            }
        }

        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| selected[i] && indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = ready.pop_first() {
            order.push(i);
            for &next in &dependents[i] {
                indegree[next] -= 1;
                if indegree[next] == 0 {
                    ready.insert(next);
                }
            }
        }

        let expected = selected.iter().filter(|&&s| s).count();
        if order.len() != expected {
            let stages = (0..n)
                .filter(|&i| selected[i] && indegree[i] > 0)
                .map(|i| self.stages[i].info().name)
                .collect();
            return Err(PlanError::Cycle { stages });
        }
        Ok(order)
    }
}
