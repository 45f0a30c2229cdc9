use super::*;
use crate::foundation::frame::Frame;
use crate::param::model::ParamSpec;

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
fn new_node_starts_dirty_without_cache() {
    let t = Transform::new("id", Passthrough, vec![]).unwrap();
    assert!(t.is_dirty());
    assert!(t.cached().is_none());
    assert!(t.failure().is_none());
}

#[test]
fn empty_id_is_rejected() {
    assert!(Transform::new("  ", Passthrough, vec![]).is_err());
}

#[test]
fn duplicate_param_names_are_rejected() {
    let params = vec![
        Param::new("k", ParamSpec::Bool { default: false }).unwrap(),
        Param::new("k", ParamSpec::Bool { default: true }).unwrap(),
    ];
    assert!(Transform::new("id", Passthrough, params).is_err());
}

#[test]
fn mark_dirty_is_idempotent() {
    let mut t = Transform::new("id", Passthrough, vec![]).unwrap();
    t.store_output(TransformOutput::primary(Frame::solid(1, 1, [0, 0, 0]).unwrap()));
    assert!(!t.is_dirty());
    t.mark_dirty();
    t.mark_dirty();
    assert!(t.is_dirty());
}

#[test]
fn store_output_clears_dirty_and_failure() {
    let mut t = Transform::new("id", Passthrough, vec![]).unwrap();
    t.record_failure("boom".into());
    assert!(t.failure().is_some());

    t.store_output(TransformOutput::primary(Frame::solid(1, 1, [1, 1, 1]).unwrap()));
    assert!(!t.is_dirty());
    assert!(t.failure().is_none());
    assert!(t.cached().is_some());
}

#[test]
fn record_failure_keeps_last_valid_cache() {
    let mut t = Transform::new("id", Passthrough, vec![]).unwrap();
    let good = Frame::solid(2, 2, [3, 3, 3]).unwrap();
    t.store_output(TransformOutput::primary(good.clone()));

    t.mark_dirty();
    t.record_failure("kernel too large".into());
    assert_eq!(t.cached().unwrap().primary, good);
    assert!(t.is_dirty());
    assert_eq!(t.failure(), Some("kernel too large"));
}

#[test]
fn extra_input_declarations_are_ordered() {
    let t = Transform::new("id", Passthrough, vec![])
        .unwrap()
        .with_extra_input("mask", ExtraSource::primary("producer"))
        .with_extra_input("edges", ExtraSource::extra("producer", "edges"));
    let names: Vec<&str> = t.extra_inputs().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["mask", "edges"]);
    assert_eq!(t.extra_inputs()[1].source.output.as_deref(), Some("edges"));
}

#[test]
fn extra_inputs_lookup_errors_on_undeclared_name() {
    let extras = ExtraInputs::default();
    assert!(extras.is_empty());
    assert!(extras.get("mask").is_err());
}
