use super::*;
use crate::foundation::error::DarkroomResult;
use crate::param::model::ParamSet;
use crate::transform::node::{ExtraInputs, TransformOp, TransformOutput};

struct Passthrough;

impl TransformOp for Passthrough {
    fn apply(
        &self,
        input: &Frame,
        _extras: &ExtraInputs,
        _params: &ParamSet,
    ) -> DarkroomResult<TransformOutput> {
        Ok(TransformOutput::primary(input.clone()))
    }
}

#[test]
fn window_keeps_transform_order() {
    let source = WindowSource::Image(Frame::solid(2, 2, [0, 0, 0]).unwrap());
    let w = Window::new(
        source,
        vec![
            Transform::new("a", Passthrough, vec![]).unwrap(),
            Transform::new("b", Passthrough, vec![]).unwrap(),
        ],
    );
    let ids: Vec<&str> = w.transforms().iter().map(Transform::id).collect();
    assert_eq!(ids, ["a", "b"]);
    assert!(w.id().is_none());
}

#[test]
fn with_id_names_the_window() {
    let source = WindowSource::window("upstream");
    let w = Window::new(source, vec![]).with_id("edges");
    assert_eq!(w.id(), Some("edges"));
}

#[test]
fn tap_source_records_position() {
    match WindowSource::tap("upstream", 1) {
        WindowSource::Window { window, transform } => {
            assert_eq!(window, "upstream");
            assert_eq!(transform, Some(1));
        }
        WindowSource::Image(_) => unreachable!(),
    }
}
