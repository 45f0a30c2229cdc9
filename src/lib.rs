//! Darkroom is an interactive image-processing pipeline engine.
//!
//! A host application composes chains of parameterized transforms into
//! display windows, wires windows together with cross-window data links, and
//! re-renders results live as parameters change. Darkroom is the recompute
//! core under such a tool: it owns the dependency model, the dirty/caching
//! policy that keeps interactive edits cheap, and the typed parameter
//! abstraction that decouples transform state from any particular widget.
//!
//! # Edit cycle overview
//!
//! 1. **Assemble**: [`Transform`]s into [`Window`]s into a [`Pipeline`]
//!    (references resolved and the dependency graph checked at build)
//! 2. **Edit**: [`Pipeline::set_param`] validates the value and marks the
//!    owning transform plus its forward closure dirty
//! 3. **Refresh**: [`Pipeline::refresh`] recomputes dirty transforms in
//!    topological order and reports failures per transform
//! 4. **Display**: the host reads cached frames via [`Pipeline::output`];
//!    reads never trigger recomputes
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: compute ops are pure; an identical edit
//!   sequence over identical sources yields bit-identical cached output.
//! - **No IO in compute**: frame loading is front-loaded in
//!   [`decode_frame`] / [`load_frame`].
//! - **RGB8 end-to-end**: every [`Frame`] is interleaved 8-bit RGB.
//! - **Single-writer state machine**: refresh is synchronous and
//!   single-threaded; two refreshes never interleave on one pipeline.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod param;
mod pipeline;
mod source;
mod transform;
mod window;

pub use foundation::error::{DarkroomError, DarkroomResult};
pub use foundation::frame::Frame;
pub use param::model::{Param, ParamSet, ParamSpec, ParamValue};
pub use pipeline::builder::PipelineBuilder;
pub use pipeline::graph::{ComputeFailure, Pipeline, RefreshReport};
pub use source::decode::{decode_frame, load_frame};
pub use transform::node::{
    ExtraInputSpec, ExtraInputs, ExtraSource, Transform, TransformOp, TransformOutput,
};
pub use window::model::{Window, WindowSource};
