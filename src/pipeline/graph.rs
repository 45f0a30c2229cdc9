use std::collections::BTreeMap;

use crate::foundation::error::{DarkroomError, DarkroomResult};
use crate::foundation::frame::Frame;
use crate::param::model::{ParamSet, ParamValue};
use crate::pipeline::builder::PipelineBuilder;
use crate::transform::node::{ExtraInputs, Transform};
use crate::window::model::Window;

#[derive(Clone, Debug)]
pub(crate) enum ResolvedSource {
    Image(Frame),
    Node(usize),
}

#[derive(Clone, Debug)]
pub(crate) struct WindowSlot {
    pub(crate) id: String,
    pub(crate) source: ResolvedSource,
    pub(crate) nodes: Vec<usize>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Primary {
    /// First transform of a window: reads the window's source slot.
    Source(usize),
    /// Chained transform: reads the previous node's cached primary.
    Node(usize),
}

#[derive(Clone, Debug)]
pub(crate) struct ResolvedExtra {
    pub(crate) name: String,
    pub(crate) node: usize,
    pub(crate) output: Option<String>,
}

#[derive(Clone, Debug, Default, serde::Serialize)]
/// Outcome of one refresh pass.
///
/// Compute failures are reported here rather than raised out of
/// [`Pipeline::refresh`]: a bad parameter value in one window must not abort
/// computation of unrelated windows.
pub struct RefreshReport {
    /// Transforms recomputed this pass, in execution (topological) order.
    pub computed: Vec<String>,
    /// Transforms whose compute failed; they keep their last valid cache and
    /// stay dirty.
    pub failures: Vec<ComputeFailure>,
    /// Transforms skipped because an upstream transform failed or was
    /// blocked; they stay dirty and were not run on stale or partial data.
    pub blocked: Vec<String>,
}

impl RefreshReport {
    /// Whether the pass completed with no failures and nothing blocked.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.blocked.is_empty()
    }
}

#[derive(Clone, Debug, serde::Serialize)]
/// A per-transform compute failure recorded during a refresh pass.
pub struct ComputeFailure {
    /// Identifier of the failing transform.
    pub transform: String,
    /// Failure description.
    pub reason: String,
}

/// The full set of windows, their cross-window data links, and the global
/// recompute scheduler.
///
/// Built once from a static declaration via [`Pipeline::builder`]; topology
/// is immutable after build, only parameter values and window source images
/// mutate. Transforms live in an arena keyed by stable identifier; all
/// references were resolved to indices at build time.
///
/// Scheduling is single-threaded and cooperative: one edit-and-refresh cycle
/// at a time, with no internal locking. A refresh executes dirty transforms
/// in topological order, so a transform never observes a dirty extra input
/// as fresh mid-pass, and a window never recomputes ahead of a window it
/// depends on. Given an identical edit sequence and identical source frames,
/// refresh output is bit-identical across runs.
pub struct Pipeline {
    pub(crate) nodes: Vec<Transform>,
    pub(crate) node_ids: BTreeMap<String, usize>,
    pub(crate) windows: Vec<WindowSlot>,
    pub(crate) window_ids: BTreeMap<String, usize>,
    pub(crate) primary: Vec<Primary>,
    pub(crate) extras: Vec<Vec<ResolvedExtra>>,
    pub(crate) preds: Vec<Vec<usize>>,
    pub(crate) succs: Vec<Vec<usize>>,
    pub(crate) topo: Vec<usize>,
}

impl Pipeline {
    /// Start assembling a pipeline.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Build a pipeline around a single window.
    pub fn single(window: Window) -> DarkroomResult<Self> {
        PipelineBuilder::new().window(window).build()
    }

    /// Identifiers of all windows, in declaration order.
    pub fn window_ids(&self) -> impl Iterator<Item = &str> {
        self.windows.iter().map(|w| w.id.as_str())
    }

    /// Identifiers of all transforms, in declaration order.
    pub fn transform_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id())
    }

    /// A transform's parameters, for enumeration by driving layers.
    pub fn params(&self, transform: &str) -> DarkroomResult<&ParamSet> {
        Ok(self.nodes[self.node_index(transform)?].params())
    }

    /// Current value of a parameter.
    pub fn param(&self, transform: &str, name: &str) -> DarkroomResult<ParamValue> {
        let node = &self.nodes[self.node_index(transform)?];
        node.params()
            .get(name)
            .map(|p| p.value().clone())
            .ok_or_else(|| DarkroomError::invalid_param(name, "unknown parameter"))
    }

    /// Assign a parameter value.
    ///
    /// This is the single setter entry point: the value is validated at the
    /// parameter boundary (atomic; rejected values leave state unchanged),
    /// and a stored change marks the owning transform and its forward
    /// closure dirty. No recompute happens here.
    pub fn set_param(
        &mut self,
        transform: &str,
        name: &str,
        value: ParamValue,
    ) -> DarkroomResult<()> {
        let n = self.node_index(transform)?;
        if self.nodes[n].params_mut().set(name, value)? {
            self.mark_closure(n);
        }
        Ok(())
    }

    /// Restore a parameter to its default, with the same dirty-marking
    /// behavior as [`Pipeline::set_param`]. Resetting an already-default
    /// parameter is a no-op and triggers no recompute.
    pub fn reset_param(&mut self, transform: &str, name: &str) -> DarkroomResult<()> {
        let n = self.node_index(transform)?;
        if self.nodes[n].params_mut().reset(name)? {
            self.mark_closure(n);
        }
        Ok(())
    }

    /// Mark a transform and every transform reachable from it dirty.
    ///
    /// Dirtiness is monotonic: an idempotent union with the already-dirty
    /// set, undone only by a successful recompute.
    pub fn on_parameter_changed(&mut self, transform: &str) -> DarkroomResult<()> {
        let n = self.node_index(transform)?;
        self.mark_closure(n);
        Ok(())
    }

    /// Replace a window's literal source image and dirty its chain.
    ///
    /// Rejected for windows whose source is another window's output.
    pub fn set_source(&mut self, window: &str, frame: Frame) -> DarkroomResult<()> {
        let w = self.window_index(window)?;
        match &mut self.windows[w].source {
            ResolvedSource::Image(slot) => *slot = frame,
            ResolvedSource::Node(_) => {
                return Err(DarkroomError::validation(format!(
                    "window '{window}' sources another window, not an image"
                )));
            }
        }
        let first = self.windows[w].nodes[0];
        self.mark_closure(first);
        Ok(())
    }

    /// Whether a transform is currently dirty.
    pub fn is_dirty(&self, transform: &str) -> DarkroomResult<bool> {
        Ok(self.nodes[self.node_index(transform)?].is_dirty())
    }

    /// The failure recorded for a transform by the most recent refresh, if
    /// its last compute attempt failed. Display layers show the last good
    /// cached output with an error indicator instead of a garbage buffer.
    pub fn failure(&self, transform: &str) -> DarkroomResult<Option<String>> {
        Ok(self.nodes[self.node_index(transform)?]
            .failure()
            .map(str::to_owned))
    }

    /// A window's final cached output. Never triggers a recompute.
    pub fn output(&self, window: &str) -> DarkroomResult<Frame> {
        let w = self.window_index(window)?;
        let last = self.windows[w].nodes.len() - 1;
        self.output_node(w, last)
    }

    /// The cached output of the transform at `index` in a window's chain.
    /// Never triggers a recompute.
    pub fn output_at(&self, window: &str, index: usize) -> DarkroomResult<Frame> {
        let w = self.window_index(window)?;
        if index >= self.windows[w].nodes.len() {
            return Err(DarkroomError::IndexOutOfRange {
                index,
                len: self.windows[w].nodes.len(),
            });
        }
        self.output_node(w, index)
    }

    /// Recompute every dirty transform, in topological order.
    ///
    /// After the pass each reachable transform is either clean with an
    /// up-to-date cache, or carries a recorded failure that blocked its
    /// dependents. Independent subgraphs always complete.
    #[tracing::instrument(skip(self))]
    pub fn refresh(&mut self) -> RefreshReport {
        let order = self.topo.clone();
        self.refresh_pass(&order, false)
    }

    /// Recompute every transform regardless of dirt, in topological order.
    #[tracing::instrument(skip(self))]
    pub fn refresh_force(&mut self) -> RefreshReport {
        let order = self.topo.clone();
        self.refresh_pass(&order, true)
    }

    /// Recompute a single window's chain in sequence order.
    ///
    /// A transform runs when forced, dirty, or when one of its extra-input
    /// sources is dirty; it reads whatever those sources currently have
    /// cached. Only the whole-pipeline [`Pipeline::refresh`] guarantees
    /// fresh cross-window inputs.
    #[tracing::instrument(skip(self))]
    pub fn refresh_window(&mut self, window: &str, force: bool) -> DarkroomResult<RefreshReport> {
        let w = self.window_index(window)?;
        let order = self.windows[w].nodes.clone();
        Ok(self.refresh_pass(&order, force))
    }

    fn refresh_pass(&mut self, order: &[usize], force: bool) -> RefreshReport {
        let mut report = RefreshReport::default();
        let mut halted = vec![false; self.nodes.len()];

        for &n in order {
            let needs = force
                || self.nodes[n].is_dirty()
                || self.extras[n].iter().any(|e| self.nodes[e.node].is_dirty());
            if !needs {
                continue;
            }
            if self.preds[n].iter().any(|&p| halted[p]) {
                halted[n] = true;
                self.nodes[n].mark_dirty();
                report.blocked.push(self.nodes[n].id().to_string());
                continue;
            }

            let outcome = self.gather_inputs(n).and_then(|(input, extras)| {
                let node = &self.nodes[n];
                node.op().apply(&input, &extras, node.params())
            });
            match outcome {
                Ok(output) => {
                    tracing::debug!(transform = %self.nodes[n].id(), "recomputed");
                    self.nodes[n].store_output(output);
                    report.computed.push(self.nodes[n].id().to_string());
                    // The successors' primary/extra inputs just changed.
                    for &s in &self.succs[n] {
                        self.nodes[s].mark_dirty();
                    }
                }
                Err(err) => {
                    let reason = err.to_string();
                    tracing::debug!(transform = %self.nodes[n].id(), %reason, "compute failed");
                    halted[n] = true;
                    self.nodes[n].record_failure(reason.clone());
                    report.failures.push(ComputeFailure {
                        transform: self.nodes[n].id().to_string(),
                        reason,
                    });
                }
            }
        }

        report
    }

    // Input-gathering errors are attributed to the consuming transform; the
    // reason names the producer so the report never reads as the producer
    // itself having failed.
    fn gather_inputs(&self, n: usize) -> DarkroomResult<(Frame, ExtraInputs)> {
        let input = match self.primary[n] {
            Primary::Source(w) => match &self.windows[w].source {
                ResolvedSource::Image(frame) => frame.clone(),
                ResolvedSource::Node(p) => self.upstream_primary(n, *p)?,
            },
            Primary::Node(p) => self.upstream_primary(n, p)?,
        };

        let mut frames = BTreeMap::new();
        for extra in &self.extras[n] {
            let frame = match &extra.output {
                None => self.upstream_primary(n, extra.node)?,
                Some(name) => {
                    let source = &self.nodes[extra.node];
                    let cache = source
                        .cached()
                        .ok_or_else(|| self.missing_input(n, extra.node))?;
                    cache.extras.get(name).cloned().ok_or_else(|| {
                        DarkroomError::compute(
                            self.nodes[n].id(),
                            format!("'{}' did not produce extra output '{name}'", source.id()),
                        )
                    })?
                }
            };
            frames.insert(extra.name.clone(), frame);
        }

        Ok((input, ExtraInputs::new(frames)))
    }

    fn upstream_primary(&self, consumer: usize, producer: usize) -> DarkroomResult<Frame> {
        self.nodes[producer]
            .cached()
            .map(|o| o.primary.clone())
            .ok_or_else(|| self.missing_input(consumer, producer))
    }

    fn missing_input(&self, consumer: usize, producer: usize) -> DarkroomError {
        DarkroomError::compute(
            self.nodes[consumer].id(),
            format!("input from '{}' has no cached output", self.nodes[producer].id()),
        )
    }

    fn cached_primary(&self, n: usize) -> DarkroomResult<Frame> {
        self.nodes[n]
            .cached()
            .map(|o| o.primary.clone())
            .ok_or_else(|| DarkroomError::compute(self.nodes[n].id(), "no cached output"))
    }

    fn output_node(&self, w: usize, index: usize) -> DarkroomResult<Frame> {
        self.cached_primary(self.windows[w].nodes[index])
    }

    fn mark_closure(&mut self, start: usize) {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![start];
        while let Some(n) = stack.pop() {
            if seen[n] {
                continue;
            }
            seen[n] = true;
            self.nodes[n].mark_dirty();
            for &s in &self.succs[n] {
                if !seen[s] {
                    stack.push(s);
                }
            }
        }
    }

    fn node_index(&self, transform: &str) -> DarkroomResult<usize> {
        self.node_ids.get(transform).copied().ok_or_else(|| {
            DarkroomError::validation(format!("unknown transform '{transform}'"))
        })
    }

    fn window_index(&self, window: &str) -> DarkroomResult<usize> {
        self.window_ids
            .get(window)
            .copied()
            .ok_or_else(|| DarkroomError::validation(format!("unknown window '{window}'")))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("windows", &self.windows.len())
            .field("transforms", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/graph.rs"]
mod tests;
