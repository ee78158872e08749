use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::io::read_to_string_maybe_gz;

/// Tab-delimited text table with a `#`-prefixed header line.
///
/// Rows keep the order in which they were read or pushed; the first field
/// of every row is the event key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = read_to_string_maybe_gz(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    pub fn parse(content: &str, source: &str) -> Result<Self> {
        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
            if line.starts_with('#') {
                if header.is_some() {
                    bail!("{}:{} duplicate header line", source, idx + 1);
                }
                header = Some(fields);
                continue;
            }
            if header.is_none() {
                bail!("{}:{} data row before '#' header", source, idx + 1);
            }
            rows.push(fields);
        }
        let header = header.with_context(|| format!("{} has no '#' header line", source))?;
        Ok(Self { header, rows })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        writeln!(w, "{}", self.header.join("\t"))?;
        for row in &self.rows {
            writeln!(w, "{}", row.join("\t"))?;
        }
        w.flush()?;
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}
