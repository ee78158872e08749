use std::collections::HashMap;
use std::path::Path;

use anyhow::{Result, bail};

use crate::io::{NOT_AVAILABLE, read_to_string_maybe_gz};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub gene: String,
    pub symbol: String,
    pub description: String,
}

impl Annotation {
    pub fn new(gene: &str, symbol: &str, description: &str) -> Self {
        Self {
            gene: gene.to_string(),
            symbol: symbol.to_string(),
            description: description.to_string(),
        }
    }

    pub fn not_available() -> Self {
        Self::new(NOT_AVAILABLE, NOT_AVAILABLE, NOT_AVAILABLE)
    }

    pub fn fields(&self) -> [&str; 3] {
        [&self.gene, &self.symbol, &self.description]
    }
}

/// Read-only event -> gene annotation lookup.
pub trait AnnotationLookup {
    fn lookup(&self, event: &str) -> Option<&Annotation>;

    fn resolve(&self, event: &str) -> Annotation {
        self.lookup(event)
            .cloned()
            .unwrap_or_else(Annotation::not_available)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    map: HashMap<String, Annotation>,
}

impl AnnotationTable {
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_to_string_maybe_gz(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parses `event<TAB>gene<TAB>symbol<TAB>description` lines; `#` lines are comments.
    /// A repeated event replaces the earlier entry.
    pub fn parse(content: &str, source: &str) -> Result<Self> {
        let mut map = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() != 4 {
                bail!(
                    "{}:{} malformed annotation line (expected 4 columns, got {})",
                    source,
                    idx + 1,
                    parts.len()
                );
            }
            map.insert(
                parts[0].trim().to_string(),
                Annotation::new(parts[1].trim(), parts[2].trim(), parts[3].trim()),
            );
        }
        Ok(Self { map })
    }

    pub fn insert(&mut self, event: &str, annotation: Annotation) {
        self.map.insert(event.to_string(), annotation);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl AnnotationLookup for AnnotationTable {
    fn lookup(&self, event: &str) -> Option<&Annotation> {
        self.map.get(event)
    }
}
