use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::error::ScanError;

pub const DEFAULT_CLASSES_DIR: &str = "target/classes";

fn is_class_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "class")
}

#[derive(Debug, Default)]
pub struct Classpath {
    pub files: Vec<PathBuf>,
    pub errors: Vec<ScanError>,
}

fn walk_error_path(err: &ignore::Error, base_path: &Path) -> PathBuf {
    match err {
        ignore::Error::WithPath { path, .. } => path.clone(),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err, base_path)
        }
        ignore::Error::Loop { child, .. } => child.clone(),
        _ => base_path.to_path_buf(),
    }
}

/// Collects every `.class` file under a directory, recursively, following
/// symlinks. Entries the walker cannot read are returned as errors.
pub fn scan_class_files(base_path: &Path) -> Classpath {
    let (tx, rx) = mpsc::channel::<Result<PathBuf, ignore::Error>>();

    let walker = WalkBuilder::new(base_path)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .follow_links(true)
        .build_parallel();

    walker.run(|| {
        let tx = tx.clone();
        Box::new(move |entry| {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_some_and(|t| t.is_file()) && is_class_file(path) {
                        let _ = tx.send(Ok(path.to_path_buf()));
                    }
                }
                Err(err) => {
                    let _ = tx.send(Err(err));
                }
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut found = Classpath::default();
    for entry in rx {
        match entry {
            Ok(path) => found.files.push(path),
            Err(err) => found.errors.push(ScanError::ClasspathResolution {
                path: walk_error_path(&err, base_path),
                reason: err.to_string(),
            }),
        }
    }
    found
}

/// Resolves classpath elements into the class files they contain.
/// Directories are walked, `.class` files are taken as-is, anything else is
/// recorded as a resolution error and contributes nothing.
pub fn resolve_classpath(elements: &[PathBuf]) -> Classpath {
    let mut classpath = Classpath::default();

    for element in elements {
        if element.is_dir() {
            let found = scan_class_files(element);
            tracing::debug!(element = %element.display(), classes = found.files.len(), "scanned classpath element");
            for err in &found.errors {
                tracing::warn!("{err}");
            }
            classpath.files.extend(found.files);
            classpath.errors.extend(found.errors);
        } else if element.is_file() && is_class_file(element) {
            classpath.files.push(element.clone());
        } else {
            let reason = if element.exists() {
                "not a directory or .class file"
            } else {
                "no such file or directory"
            };
            let err = ScanError::ClasspathResolution {
                path: element.clone(),
                reason: reason.to_string(),
            };
            tracing::warn!("{err}");
            classpath.errors.push(err);
        }
    }

    classpath.files.sort();
    classpath.files.dedup();
    classpath
}
