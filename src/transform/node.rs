use std::collections::BTreeMap;

use crate::foundation::error::{DarkroomError, DarkroomResult};
use crate::foundation::frame::Frame;
use crate::param::model::{Param, ParamSet};

/// A pure image-processing step.
///
/// `apply` must be a pure mapping of (primary input, extra inputs, current
/// parameter values) to outputs: no cross-call state, no mutation of the
/// input (callers reuse input buffers; edit a copy via
/// [`Frame::to_rgb_image`]), and identical inputs must yield identical
/// output. Determinism is what makes output caching and bit-identical
/// refresh results hold.
pub trait TransformOp {
    /// Compute the output for the given inputs and parameter values.
    fn apply(
        &self,
        input: &Frame,
        extras: &ExtraInputs,
        params: &ParamSet,
    ) -> DarkroomResult<TransformOutput>;
}

#[derive(Clone, Debug, PartialEq)]
/// Result of one [`TransformOp::apply`] call.
pub struct TransformOutput {
    /// Primary output image, fed to the next transform in the chain.
    pub primary: Frame,
    /// Named side outputs available to extra-input consumers.
    pub extras: BTreeMap<String, Frame>,
}

impl TransformOutput {
    /// Output with only a primary image.
    pub fn primary(frame: Frame) -> Self {
        Self {
            primary: frame,
            extras: BTreeMap::new(),
        }
    }

    /// Attach a named extra output.
    pub fn with_extra(mut self, name: impl Into<String>, frame: Frame) -> Self {
        self.extras.insert(name.into(), frame);
        self
    }
}

#[derive(Clone, Debug, Default)]
/// Read-only view of the resolved extra-input frames for one compute call,
/// keyed by the names the transform declared.
pub struct ExtraInputs {
    frames: BTreeMap<String, Frame>,
}

impl ExtraInputs {
    pub(crate) fn new(frames: BTreeMap<String, Frame>) -> Self {
        Self { frames }
    }

    /// Fetch a declared extra input by name.
    pub fn get(&self, name: &str) -> DarkroomResult<&Frame> {
        self.frames
            .get(name)
            .ok_or_else(|| DarkroomError::validation(format!("undeclared extra input '{name}'")))
    }

    /// Whether any extra inputs were resolved.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Where an extra input comes from: a producing transform's primary output,
/// or one of its named extra outputs.
///
/// This is a weak reference by identifier; it is resolved to an arena index
/// when the pipeline is built.
pub struct ExtraSource {
    /// Identifier of the producing transform (any window).
    pub transform: String,
    /// Name of the producer's extra output, or `None` for its primary.
    pub output: Option<String>,
}

impl ExtraSource {
    /// Reference a transform's primary output.
    pub fn primary(transform: impl Into<String>) -> Self {
        Self {
            transform: transform.into(),
            output: None,
        }
    }

    /// Reference one of a transform's named extra outputs.
    pub fn extra(transform: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            transform: transform.into(),
            output: Some(output.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// A declared extra input: the local name the op reads it under, and the
/// source it is wired to.
pub struct ExtraInputSpec {
    /// Name the op passes to [`ExtraInputs::get`].
    pub name: String,
    /// Producing output reference.
    pub source: ExtraSource,
}

/// A transform node: identifier, parameters, compute function, dirty flag
/// and cached output.
///
/// Nodes are assembled into [`crate::Window`] chains and owned by the
/// [`crate::Pipeline`] arena after build. The dirty flag is monotonic within
/// an edit cycle: it is set by parameter changes (or upstream propagation)
/// and cleared only after a successful recompute.
pub struct Transform {
    id: String,
    params: ParamSet,
    op: Box<dyn TransformOp>,
    extra_inputs: Vec<ExtraInputSpec>,
    dirty: bool,
    cache: Option<TransformOutput>,
    failure: Option<String>,
}

impl Transform {
    /// Create a node from an id, a compute op and declared parameters.
    ///
    /// New nodes start dirty so the first refresh computes them.
    pub fn new(
        id: impl Into<String>,
        op: impl TransformOp + 'static,
        params: Vec<Param>,
    ) -> DarkroomResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DarkroomError::validation("transform id must be non-empty"));
        }
        Ok(Self {
            id,
            params: ParamSet::new(params)?,
            op: Box::new(op),
            extra_inputs: Vec::new(),
            dirty: true,
            cache: None,
            failure: None,
        })
    }

    /// Declare an extra input wired to another transform's output.
    pub fn with_extra_input(mut self, name: impl Into<String>, source: ExtraSource) -> Self {
        self.extra_inputs.push(ExtraInputSpec {
            name: name.into(),
            source,
        });
        self
    }

    /// Stable transform identifier, unique across the pipeline.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The node's parameters.
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    /// Declared extra inputs, in declaration order.
    pub fn extra_inputs(&self) -> &[ExtraInputSpec] {
        &self.extra_inputs
    }

    /// Whether the cached output is stale relative to current inputs.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the cached output stale. Idempotent.
    pub fn mark_dirty(&mut self) {
        if !self.dirty {
            tracing::debug!(transform = %self.id, "mark dirty");
            self.dirty = true;
        }
    }

    /// Last successfully computed output, if any.
    pub fn cached(&self) -> Option<&TransformOutput> {
        self.cache.as_ref()
    }

    /// Failure recorded by the most recent compute attempt, if it failed.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub(crate) fn op(&self) -> &dyn TransformOp {
        &*self.op
    }

    /// Store a fresh output: clears the dirty flag and any recorded failure.
    pub(crate) fn store_output(&mut self, output: TransformOutput) {
        self.cache = Some(output);
        self.dirty = false;
        self.failure = None;
    }

    /// Record a compute failure: the last valid cache is kept and the node
    /// stays dirty so the next pass retries it.
    pub(crate) fn record_failure(&mut self, reason: String) {
        self.failure = Some(reason);
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("id", &self.id)
            .field("dirty", &self.dirty)
            .field("cached", &self.cache.is_some())
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/node.rs"]
mod tests;
