use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::classify::classify_files;
use crate::error::ScanError;
use crate::registry::Registry;
use crate::report::{CategoryResult, Diagnostic, ScanReport};
use crate::scan::resolve_classpath;
use crate::writer::{PF_INF, ensure_output_dir, write_descriptors};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub classpath: Vec<PathBuf>,
    pub output_root: PathBuf,
    pub registry: Registry,
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Resolves the classpath, classifies every class and writes the PF-INF
/// descriptors. Never fails: every problem ends up in the report.
pub fn run(options: &ScanOptions) -> ScanReport {
    let start = Instant::now();
    let mut errors: Vec<ScanError> = Vec::new();

    let classpath = resolve_classpath(&options.classpath);
    errors.extend(classpath.errors);
    tracing::debug!(files = classpath.files.len(), "resolved classpath");

    let classification = classify_files(&options.registry, &classpath.files);
    errors.extend(classification.errors);

    let output_dir = match ensure_output_dir(&options.output_root) {
        Ok(dir) => dir,
        Err(err) => {
            tracing::error!("{err}");
            let dir = options.output_root.join(PF_INF);
            errors.push(err);
            dir
        }
    };

    let outcome = write_descriptors(&output_dir, &options.registry, &classification.sets);
    errors.extend(outcome.errors);

    let categories = classification
        .sets
        .iter(&options.registry)
        .filter(|(_, classes)| !classes.is_empty())
        .map(|(t, classes)| CategoryResult {
            file_name: t.file_name.clone(),
            classes: classes.iter().cloned().collect(),
        })
        .collect();

    let diagnostics: Vec<Diagnostic> = errors.iter().map(Diagnostic::from).collect();

    tracing::info!(
        scanned = classification.classes_scanned,
        matched = classification.classes_matched,
        descriptors = outcome.written.len(),
        failures = diagnostics.len(),
        "scan finished"
    );

    ScanReport {
        output_dir: output_dir.to_string_lossy().to_string(),
        classes_scanned: classification.classes_scanned,
        classes_matched: classification.classes_matched,
        duration_ms: elapsed_ms(start.elapsed()),
        categories,
        descriptors: outcome.written,
        diagnostics,
    }
}
