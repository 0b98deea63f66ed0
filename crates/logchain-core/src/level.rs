use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from level name to severity rank
///
/// Lower ranks are more severe. A threshold level accepts every level whose
/// rank is less than or equal to its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelTable {
    ranks: BTreeMap<String, u32>,
}

impl LevelTable {
    /// Create a table from `(name, rank)` pairs
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self {
            ranks: levels.into_iter().map(|(name, rank)| (name.into(), rank)).collect(),
        }
    }

    /// The npm level set: error, warn, info, http, verbose, debug, silly
    pub fn npm() -> Self {
        Self::new([
            ("error", 0),
            ("warn", 1),
            ("info", 2),
            ("http", 3),
            ("verbose", 4),
            ("debug", 5),
            ("silly", 6),
        ])
    }

    /// The syslog level set (RFC 5424 severities)
    pub fn syslog() -> Self {
        Self::new([
            ("emerg", 0),
            ("alert", 1),
            ("crit", 2),
            ("error", 3),
            ("warning", 4),
            ("notice", 5),
            ("info", 6),
            ("debug", 7),
        ])
    }

    /// Severity rank of a level, if it is part of this table
    pub fn rank(&self, level: &str) -> Option<u32> {
        self.ranks.get(level).copied()
    }

    pub fn contains(&self, level: &str) -> bool {
        self.ranks.contains_key(level)
    }

    /// Check whether a record at `level` passes a `threshold`
    ///
    /// Unknown levels on either side never pass.
    pub fn accepts(&self, threshold: &str, level: &str) -> bool {
        match (self.rank(threshold), self.rank(level)) {
            (Some(max), Some(rank)) => rank <= max,
            _ => false,
        }
    }

    /// Level names ordered from most to least severe
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<(&str, u32)> = self
            .ranks
            .iter()
            .map(|(name, rank)| (name.as_str(), *rank))
            .collect();
        names.sort_by_key(|(name, rank)| (*rank, *name));
        names.into_iter().map(|(name, _)| name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.ranks.iter().map(|(name, rank)| (name.as_str(), *rank))
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::npm()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for LevelTable {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self::new(iter)
    }
}
