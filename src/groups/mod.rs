use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Result, bail};

use crate::io::read_to_string_maybe_gz;

/// Which groups serve as control and experimental reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceConvention {
    /// First group is control, last group is experimental.
    FirstVsLast,
    /// Second group is control, first group is experimental.
    SecondVsFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceGroups {
    pub control: usize,
    pub experimental: usize,
}

/// Sample -> group assignment with the group order taken from first occurrence.
#[derive(Debug, Clone)]
pub struct GroupAssignment {
    samples: Vec<String>,
    groups: Vec<String>,
    members: Vec<Vec<String>>,
}

impl GroupAssignment {
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_to_string_maybe_gz(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Two whitespace-separated columns per line: sample, group.
    pub fn parse(content: &str, source: &str) -> Result<Self> {
        let mut pairs = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() != 2 {
                bail!(
                    "{}:{} malformed group line (expected 2 columns, got {})",
                    source,
                    idx + 1,
                    parts.len()
                );
            }
            pairs.push((parts[0].to_string(), parts[1].to_string()));
        }
        if pairs.is_empty() {
            bail!("group assignment {} is empty", source);
        }
        Self::from_pairs(pairs)
    }

    pub fn from_pairs<I, S, G>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, G)>,
        S: Into<String>,
        G: Into<String>,
    {
        let mut out = Self {
            samples: Vec::new(),
            groups: Vec::new(),
            members: Vec::new(),
        };
        let mut seen: HashSet<String> = HashSet::new();
        let mut group_index: HashMap<String, usize> = HashMap::new();
        for (sample, group) in pairs {
            let sample = sample.into();
            let group = group.into();
            if !seen.insert(sample.clone()) {
                bail!("sample '{}' is assigned more than once", sample);
            }
            let gi = match group_index.get(&group) {
                Some(&gi) => gi,
                None => {
                    let gi = out.groups.len();
                    group_index.insert(group.clone(), gi);
                    out.groups.push(group);
                    out.members.push(Vec::new());
                    gi
                }
            };
            out.members[gi].push(sample.clone());
            out.samples.push(sample);
        }
        if out.samples.is_empty() {
            bail!("group assignment is empty");
        }
        Ok(out)
    }

    /// Samples in input order.
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn members(&self, group: usize) -> &[String] {
        &self.members[group]
    }

    pub fn group_index(&self, label: &str) -> Option<usize> {
        self.groups.iter().position(|g| g == label)
    }

    /// Samples laid out as contiguous blocks in group order, input order
    /// kept within each block.
    pub fn block_order(&self) -> Vec<String> {
        self.members.iter().flatten().cloned().collect()
    }

    pub fn block_sizes(&self) -> Vec<usize> {
        self.members.iter().map(Vec::len).collect()
    }

    /// True when the input already lists every group as one contiguous run.
    pub fn is_block_contiguous(&self) -> bool {
        self.samples == self.block_order()
    }

    /// Explicit labels take precedence over the convention.
    pub fn reference_groups(
        &self,
        convention: ReferenceConvention,
        control: Option<&str>,
        experimental: Option<&str>,
    ) -> Result<ReferenceGroups> {
        let by_label = |label: &str| -> Result<usize> {
            match self.group_index(label) {
                Some(i) => Ok(i),
                None => bail!(
                    "group '{}' not found (groups: {})",
                    label,
                    self.groups.join(", ")
                ),
            }
        };
        let n = self.groups.len();
        let (default_ctl, default_exp) = match convention {
            ReferenceConvention::FirstVsLast => (Some(0), n.saturating_sub(1)),
            ReferenceConvention::SecondVsFirst => ((n > 1).then_some(1), 0),
        };
        let control = match control {
            Some(label) => by_label(label)?,
            None => match default_ctl {
                Some(i) => i,
                None => bail!(
                    "reference convention {:?} needs at least 2 groups, found {}",
                    convention,
                    n
                ),
            },
        };
        let experimental = match experimental {
            Some(label) => by_label(label)?,
            None => default_exp,
        };
        Ok(ReferenceGroups {
            control,
            experimental,
        })
    }
}
