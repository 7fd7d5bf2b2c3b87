use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AftermovieError::invalid_input("x")
            .to_string()
            .contains("invalid input:")
    );
    assert!(
        AftermovieError::media_load("a.jpg", "x")
            .to_string()
            .contains("media load failed for 'a.jpg'")
    );
    assert!(
        AftermovieError::encoder_unavailable("x")
            .to_string()
            .contains("encoder unavailable:")
    );
    assert!(
        AftermovieError::encoding("x")
            .to_string()
            .contains("encoding failed:")
    );
    assert_eq!(AftermovieError::Cancelled.to_string(), "render cancelled");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AftermovieError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_cancelled());
    assert!(AftermovieError::Cancelled.is_cancelled());
}
