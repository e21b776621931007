use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::classfile::{CompiledClass, parse_class};
use crate::error::ScanError;
use crate::registry::{PluginType, Registry};

/// True iff the class directly declares at least one of the type's markers.
/// Superclasses and superinterfaces are not consulted.
pub fn matches(class: &CompiledClass, plugin_type: &PluginType) -> bool {
    plugin_type.markers.iter().any(|m| class.implements(m))
}

/// Matched class names, one set per registry entry, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSets {
    sets: Vec<BTreeSet<String>>,
}

impl PluginSets {
    pub fn new(registry: &Registry) -> Self {
        Self {
            sets: vec![BTreeSet::new(); registry.len()],
        }
    }

    /// Files the class under every matching category. Returns how many
    /// categories it matched.
    pub fn add_class(&mut self, registry: &Registry, class: &CompiledClass) -> usize {
        let mut matched = 0;
        for (plugin_type, set) in registry.types().iter().zip(self.sets.iter_mut()) {
            if matches(class, plugin_type) {
                set.insert(class.name.clone());
                matched += 1;
            }
        }
        matched
    }

    pub fn merge(mut self, other: PluginSets) -> Self {
        for (mine, theirs) in self.sets.iter_mut().zip(other.sets) {
            mine.extend(theirs);
        }
        self
    }

    pub fn get(&self, index: usize) -> Option<&BTreeSet<String>> {
        self.sets.get(index)
    }

    pub fn iter<'a>(
        &'a self,
        registry: &'a Registry,
    ) -> impl Iterator<Item = (&'a PluginType, &'a BTreeSet<String>)> + 'a {
        registry.types().iter().zip(self.sets.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(BTreeSet::is_empty)
    }
}

#[derive(Debug)]
pub struct Classification {
    pub sets: PluginSets,
    pub classes_scanned: usize,
    pub classes_matched: usize,
    pub errors: Vec<ScanError>,
}

#[derive(Debug)]
struct Partial {
    sets: PluginSets,
    scanned: usize,
    matched: usize,
    errors: Vec<ScanError>,
}

impl Partial {
    fn new(registry: &Registry) -> Self {
        Self {
            sets: PluginSets::new(registry),
            scanned: 0,
            matched: 0,
            errors: Vec::new(),
        }
    }

    fn merge(mut self, other: Partial) -> Self {
        self.sets = self.sets.merge(other.sets);
        self.scanned += other.scanned;
        self.matched += other.matched;
        self.errors.extend(other.errors);
        self
    }
}

fn load_class(path: &Path) -> Result<CompiledClass, ScanError> {
    let data = std::fs::read(path).map_err(|source| ScanError::ClassRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_class(&data).map_err(|source| ScanError::ClassParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes and classifies every file in parallel. Each worker fills its own
/// partial sets; they are unioned at the end. A file that cannot be read or
/// parsed is recorded and skipped.
pub fn classify_files(registry: &Registry, files: &[PathBuf]) -> Classification {
    let total = files
        .par_iter()
        .fold(
            || Partial::new(registry),
            |mut acc, path| {
                match load_class(path) {
                    Ok(class) => {
                        acc.scanned += 1;
                        let hits = acc.sets.add_class(registry, &class);
                        if hits > 0 {
                            acc.matched += 1;
                            tracing::debug!(class = %class.name, categories = hits, "matched");
                        }
                    }
                    Err(err) => {
                        tracing::warn!("{err}");
                        acc.errors.push(err);
                    }
                }
                acc
            },
        )
        .reduce(|| Partial::new(registry), Partial::merge);

    let mut errors = total.errors;
    errors.sort_by(|a, b| a.path().cmp(b.path()));

    Classification {
        sets: total.sets,
        classes_scanned: total.scanned,
        classes_matched: total.matched,
        errors,
    }
}
