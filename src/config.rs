use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::registry::Registry;
use crate::scan::DEFAULT_CLASSES_DIR;

pub fn resolve_classpath_elements(classpath: &[PathBuf]) -> Vec<PathBuf> {
    if classpath.is_empty() {
        return vec![PathBuf::from(DEFAULT_CLASSES_DIR)];
    }
    classpath.to_vec()
}

/// The output root is the explicit `--output`, else the first classpath
/// element (the compile output directory).
pub fn resolve_output_root(output: Option<&Path>, classpath: &[PathBuf]) -> PathBuf {
    if let Some(p) = output {
        return p.to_path_buf();
    }
    classpath
        .first()
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CLASSES_DIR))
}

pub fn resolve_registry(types: Option<&Path>) -> Result<Registry> {
    match types {
        Some(path) => Registry::from_json_file(path),
        None => Ok(Registry::default()),
    }
}
