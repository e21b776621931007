use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::classify::PluginSets;
use crate::error::ScanError;
use crate::registry::Registry;

pub const PF_INF: &str = "PF-INF";

#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

#[derive(Debug, Clone, Serialize)]
pub struct WrittenDescriptor {
    pub file_name: String,
    pub path: String,
    pub classes: Vec<String>,
    pub content_hash: String,
}

#[derive(Debug, Default)]
pub struct WriteOutcome {
    pub written: Vec<WrittenDescriptor>,
    pub errors: Vec<ScanError>,
}

/// Creates `<root>/PF-INF` (and any missing parents) if it is absent.
pub fn ensure_output_dir(root: &Path) -> Result<PathBuf, ScanError> {
    let dir = root.join(PF_INF);
    std::fs::create_dir_all(&dir).map_err(|source| ScanError::OutputDirectory {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// One class name per line, sorted, each line terminated.
pub fn render_descriptor(classes: &BTreeSet<String>) -> String {
    let mut out = String::new();
    for class in classes {
        out.push_str(class);
        out.push_str(LINE_SEPARATOR);
    }
    out
}

pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Writes one descriptor per non-empty category, replacing any previous
/// file. A failure is recorded against that category only.
pub fn write_descriptors(dir: &Path, registry: &Registry, sets: &PluginSets) -> WriteOutcome {
    let mut outcome = WriteOutcome::default();

    for (plugin_type, classes) in sets.iter(registry) {
        if classes.is_empty() {
            continue;
        }

        let path = dir.join(&plugin_type.file_name);
        let content = render_descriptor(classes);
        match std::fs::write(&path, &content) {
            Ok(()) => {
                tracing::info!("{} -> {:?}", plugin_type.file_name, classes);
                outcome.written.push(WrittenDescriptor {
                    file_name: plugin_type.file_name.clone(),
                    path: path.to_string_lossy().to_string(),
                    classes: classes.iter().cloned().collect(),
                    content_hash: hash_content(&content),
                });
            }
            Err(source) => {
                let err = ScanError::DescriptorWrite { path, source };
                tracing::error!("{err}");
                outcome.errors.push(err);
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::CompiledClass;
    use crate::registry::PluginType;

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "pf_jar_test_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn sets_with(registry: &Registry, classes: &[(&str, &str)]) -> PluginSets {
        let mut sets = PluginSets::new(registry);
        for (name, iface) in classes {
            sets.add_class(
                registry,
                &CompiledClass {
                    name: name.to_string(),
                    interfaces: vec![iface.to_string()],
                },
            );
        }
        sets
    }

    #[test]
    fn render_descriptor_sorts_lines() {
        let set: BTreeSet<String> = ["b.B", "a.A"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            render_descriptor(&set),
            format!("a.A{LINE_SEPARATOR}b.B{LINE_SEPARATOR}")
        );
    }

    #[test]
    fn write_descriptors_skips_empty_and_overwrites() -> anyhow::Result<()> {
        let base = temp_dir("writer");
        let root = base.join("nested").join("classes");
        let registry = Registry::new(vec![
            PluginType::new("token-generators", &["m.Gen"]),
            PluginType::new("token-processors", &["m.Proc"]),
        ])?;

        let dir = ensure_output_dir(&root)?;
        assert_eq!(dir, root.join(PF_INF));
        std::fs::write(dir.join("token-generators"), "stale.Class\nother.Class\n")?;

        let sets = sets_with(&registry, &[("x.Z", "m.Gen"), ("x.A", "m.Gen")]);
        let outcome = write_descriptors(&dir, &registry, &sets);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.written.len(), 1);
        assert_eq!(outcome.written[0].classes, vec!["x.A", "x.Z"]);

        let content = std::fs::read_to_string(dir.join("token-generators"))?;
        assert_eq!(content, format!("x.A{LINE_SEPARATOR}x.Z{LINE_SEPARATOR}"));
        assert_eq!(outcome.written[0].content_hash, hash_content(&content));
        assert!(!dir.join("token-processors").exists());

        let again = write_descriptors(&dir, &registry, &sets);
        assert_eq!(again.written[0].content_hash, outcome.written[0].content_hash);

        let _ = std::fs::remove_dir_all(base);
        Ok(())
    }

    #[test]
    fn write_failure_is_isolated_per_category() -> anyhow::Result<()> {
        let root = temp_dir("writer_fail");
        let registry = Registry::new(vec![
            PluginType::new("blocked", &["m.A"]),
            PluginType::new("fine", &["m.A"]),
        ])?;
        let dir = ensure_output_dir(&root)?;
        // a directory in the way of the descriptor file
        std::fs::create_dir_all(dir.join("blocked"))?;

        let sets = sets_with(&registry, &[("x.A", "m.A")]);
        let outcome = write_descriptors(&dir, &registry, &sets);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].kind(), "descriptor_write");
        assert_eq!(outcome.written.len(), 1);
        assert_eq!(outcome.written[0].file_name, "fine");

        let _ = std::fs::remove_dir_all(root);
        Ok(())
    }
}
