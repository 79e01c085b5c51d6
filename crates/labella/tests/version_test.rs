#[test]
fn version_matches_cargo_pkg_version() {
    assert_eq!(labella::VERSION, env!("CARGO_PKG_VERSION"));
    assert!(!labella::VERSION.is_empty());
}
