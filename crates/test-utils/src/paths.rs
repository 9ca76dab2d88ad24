//! Locating optional sample files.
//!
//! Real IMD downloads are not committed. Tests that want one look it up here
//! and skip themselves when it is absent.

use std::path::PathBuf;

/// Workspace root, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Finds a sample file, checking in order:
/// 1. `$TEST_DATA_DIR`
/// 2. `crates/grd-parser/testdata/`
/// 3. `testdata/` at the workspace root
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let root = workspace_root();
    let env_dir = std::env::var("TEST_DATA_DIR").ok().map(PathBuf::from);

    env_dir
        .into_iter()
        .chain([root.join("crates/grd-parser/testdata"), root.join("testdata")])
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        let root = workspace_root();
        assert!(
            root.join("Cargo.toml").exists(),
            "Workspace root should contain Cargo.toml: {:?}",
            root
        );
        assert!(root.join("crates/grd-parser").is_dir());
    }

    #[test]
    fn test_missing_sample_is_none() {
        assert!(find_test_file("rain_19000101.grd").is_none());
    }
}
