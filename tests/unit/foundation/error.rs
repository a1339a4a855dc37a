use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        OverplotError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(OverplotError::media("x").to_string().contains("media error:"));
    assert!(OverplotError::render("x").to_string().contains("render error:"));
    assert!(
        OverplotError::composition("x")
            .to_string()
            .contains("composition error:")
    );
    assert!(
        OverplotError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = OverplotError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
