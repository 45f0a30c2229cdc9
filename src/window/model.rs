use crate::foundation::frame::Frame;
use crate::transform::node::Transform;

#[derive(Clone, Debug)]
/// Where a window's first transform reads its primary input from.
pub enum WindowSource {
    /// A literal loaded image (see [`crate::load_frame`]).
    Image(Frame),
    /// Another window's output: its final transform, or an intermediate
    /// transform tapped by position.
    Window {
        /// Identifier of the upstream window.
        window: String,
        /// Tapped transform position, or `None` for the final output.
        transform: Option<usize>,
    },
}

impl WindowSource {
    /// Source referencing another window's final output.
    pub fn window(id: impl Into<String>) -> Self {
        Self::Window {
            window: id.into(),
            transform: None,
        }
    }

    /// Source tapping an upstream window's intermediate output.
    pub fn tap(id: impl Into<String>, transform: usize) -> Self {
        Self::Window {
            window: id.into(),
            transform: Some(transform),
        }
    }
}

/// An ordered sequence of transforms forming one linear pipeline.
///
/// The sequence is a strict chain: transform *i*'s primary input is
/// transform *i-1*'s primary output, and transform 0 reads the window
/// source. Windows are authoring structures; once handed to a
/// [`crate::PipelineBuilder`] their transforms move into the pipeline arena
/// and are addressed by window id via [`crate::Pipeline::output_at`] and
/// friends.
pub struct Window {
    id: Option<String>,
    source: WindowSource,
    transforms: Vec<Transform>,
}

impl Window {
    /// Create a window over a source and an ordered transform chain.
    ///
    /// Without an explicit id the pipeline builder assigns `step-N` in
    /// declaration order.
    pub fn new(source: WindowSource, transforms: Vec<Transform>) -> Self {
        Self {
            id: None,
            source,
            transforms,
        }
    }

    /// Name the window so other windows and hosts can reference it.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Explicit id, if one was set.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The declared source.
    pub fn source(&self) -> &WindowSource {
        &self.source
    }

    /// The transform chain, in order.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub(crate) fn into_parts(self) -> (Option<String>, WindowSource, Vec<Transform>) {
        (self.id, self.source, self.transforms)
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("transforms", &self.transforms.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/window/model.rs"]
mod tests;
