// filter.rs — Optional name-matching predicate over targets and configurations
//
// An absent filter matches everything. A present filter is a regex matched
// anywhere in the candidate (unanchored), which is what callers expect from
// patterns like ".*WatchKit App.*".

use regex::Regex;

use crate::error::Result;

#[derive(Debug, Clone)]
pub enum NameFilter {
    Absent,
    Pattern(Regex),
}

impl NameFilter {
    /// Build a filter from an optional pattern string. `None` (or an empty
    /// string) means match-all.
    pub fn parse(pattern: Option<&str>) -> Result<Self> {
        match pattern {
            None => Ok(NameFilter::Absent),
            Some(p) if p.is_empty() => Ok(NameFilter::Absent),
            Some(p) => Ok(NameFilter::Pattern(Regex::new(p)?)),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, NameFilter::Absent)
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            NameFilter::Absent => true,
            NameFilter::Pattern(re) => re.is_match(candidate),
        }
    }
}
