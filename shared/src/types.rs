//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};

/// Recipient address in canonical form (trimmed, lower-case)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Normalize raw input into an address; blank input is rejected
    pub fn parse(raw: &str) -> SharedResult<Self> {
        let canonical = raw.trim().to_lowercase();
        if canonical.is_empty() {
            return Err(SharedError::InvalidAddress { input: raw.to_string() });
        }
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Parse newline-delimited text into addresses, keeping first occurrences
/// in input order. Blank lines are skipped.
pub fn parse_address_lines(text: &str) -> Vec<Address> {
    dedupe(text.lines().filter_map(|line| Address::parse(line).ok()))
}

/// Collapse duplicates while preserving the order of first appearance
pub fn dedupe<I>(addresses: I) -> Vec<Address>
where
    I: IntoIterator<Item = Address>,
{
    let mut seen = BTreeSet::new();
    addresses
        .into_iter()
        .filter(|address| seen.insert(address.clone()))
        .collect()
}

/// Deduplicating set of addresses with deterministic iteration order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSet(BTreeSet<Address>);

impl AddressSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Returns true if the address was not already present
    pub fn insert(&mut self, address: Address) -> bool {
        self.0.insert(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.0.contains(address)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.0.iter()
    }

    /// Members of `self` that are not in `other`
    pub fn difference(&self, other: &AddressSet) -> AddressSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn is_superset(&self, other: &AddressSet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// One address per line, sorted, with a trailing newline when non-empty
    pub fn to_lines(&self) -> String {
        let mut out = String::new();
        for address in &self.0 {
            out.push_str(address.as_str());
            out.push('\n');
        }
        out
    }

    pub fn from_lines(text: &str) -> Self {
        parse_address_lines(text).into_iter().collect()
    }
}

impl FromIterator<Address> for AddressSet {
    fn from_iter<T: IntoIterator<Item = Address>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for AddressSet {
    type Item = Address;
    type IntoIter = std::collections::btree_set::IntoIter<Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a AddressSet {
    type Item = &'a Address;
    type IntoIter = std::collections::btree_set::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Closed integer interval `[min, max]`, validated on construction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusiveRange {
    min: u64,
    max: u64,
}

impl InclusiveRange {
    pub fn new(field: &str, min: u64, max: u64) -> SharedResult<Self> {
        if min > max {
            return Err(SharedError::InvalidRange { field: field.to_string(), min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }
}

/// Unique identifier for one disbursement run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Component tag attached to every log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    Scheduler,
    Engine,
    StateStore,
    Eligibility,
    Chain,
    Notifier,
    Config,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Scheduler => "scheduler",
            Component::Engine => "engine",
            Component::StateStore => "state_store",
            Component::Eligibility => "eligibility",
            Component::Chain => "chain",
            Component::Notifier => "notifier",
            Component::Config => "config",
        };
        f.write_str(name)
    }
}
