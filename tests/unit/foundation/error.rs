use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PreviewError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PreviewError::invalid_state("x")
            .to_string()
            .contains("invalid state:")
    );
    assert!(
        PreviewError::out_of_range("x")
            .to_string()
            .contains("out of range:")
    );
    assert!(
        PreviewError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert_eq!(PreviewError::Busy.to_string(), "render gate busy");
}

#[test]
fn kinds_match_variants() {
    assert_eq!(PreviewError::validation("x").kind(), ErrorKind::Validation);
    assert_eq!(
        PreviewError::invalid_state("x").kind(),
        ErrorKind::InvalidState
    );
    assert_eq!(PreviewError::out_of_range("x").kind(), ErrorKind::OutOfRange);
    assert_eq!(PreviewError::decode("x").kind(), ErrorKind::DecodeError);
    assert_eq!(PreviewError::Busy.kind(), ErrorKind::Busy);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PreviewError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}
