use serde::Serialize;

use crate::error::ScanError;
use crate::writer::WrittenDescriptor;

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: &'static str,
    pub path: String,
    pub message: String,
}

impl From<&ScanError> for Diagnostic {
    fn from(err: &ScanError) -> Self {
        Self {
            kind: err.kind(),
            path: err.path().to_string_lossy().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResult {
    pub file_name: String,
    pub classes: Vec<String>,
}

/// Everything a scan did, including what went wrong. The caller decides
/// whether diagnostics make the run a failure.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub output_dir: String,
    pub classes_scanned: usize,
    pub classes_matched: usize,
    pub duration_ms: u64,
    pub categories: Vec<CategoryResult>,
    pub descriptors: Vec<WrittenDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ScanReport {
    pub fn failure_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn failed_paths(&self) -> impl Iterator<Item = &str> {
        self.diagnostics.iter().map(|d| d.path.as_str())
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("output_dir: {}\n", self.output_dir));
        out.push_str(&format!("classes_scanned: {}\n", self.classes_scanned));
        out.push_str(&format!("classes_matched: {}\n", self.classes_matched));
        out.push_str(&format!("duration_ms: {}\n", self.duration_ms));
        for d in &self.descriptors {
            out.push_str(&format!("- {}: {}\n", d.file_name, d.classes.join(", ")));
        }
        for d in &self.diagnostics {
            out.push_str(&format!("! [{}] {}\n", d.kind, d.message));
        }
        out
    }
}
