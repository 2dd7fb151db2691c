//! Common test utilities

use cmdparser::Output;
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

/// Create a temporary directory with a tool.yml manifest
pub fn create_test_manifest(content: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let manifest_path = temp_dir.path().join("tool.yml");
    fs::write(&manifest_path, content).unwrap();
    (temp_dir, manifest_path)
}

/// Output sink that hands fatal errors back instead of exiting
pub fn test_output() -> Rc<Output> {
    Rc::new(Output::for_tests())
}

/// Shared slot a run callback can record into
pub fn slot<T>() -> Rc<RefCell<Option<T>>> {
    Rc::new(RefCell::new(None))
}
