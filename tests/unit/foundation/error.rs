use super::*;

#[test]
fn display_messages_carry_identifiers() {
    let err = DarkroomError::invalid_param("ksize", "4 outside [1, 3]");
    assert!(err.to_string().contains("'ksize'"));

    let err = DarkroomError::compute("blur", "kernel too large");
    assert!(err.to_string().contains("'blur'"));

    let err = DarkroomError::unresolved("edges", "transform 'missing'");
    assert!(err.to_string().contains("'edges'"));
    assert!(err.to_string().contains("missing"));

    let err = DarkroomError::IndexOutOfRange { index: 3, len: 2 };
    assert!(err.to_string().contains('3'));
    assert!(err.to_string().contains('2'));
}

#[test]
fn validation_prefix_is_stable() {
    assert!(
        DarkroomError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DarkroomError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
