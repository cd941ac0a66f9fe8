//! DNS data types shared by the locator, query engine and comparator.

use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

use super::name::normalize_fqdn;

/// A set of name-server hostnames in canonical FQDN form.
///
/// Hostnames are normalized on insertion, so `NS1.example.com` and
/// `ns1.example.com.` are the same member. Iteration is sorted, which keeps
/// rendered reports stable no matter what order a server returned its records in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameServerSet(BTreeSet<String>);

impl NameServerSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a hostname, returning `true` if it was not already present.
    pub fn insert(&mut self, host: &str) -> bool {
        self.0.insert(normalize_fqdn(host))
    }

    /// Returns `true` if the set contains the hostname (in any spelling).
    pub fn contains(&self, host: &str) -> bool {
        self.0.contains(&normalize_fqdn(host))
    }

    /// Number of hostnames in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates hostnames in sorted order.
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &NameServerSet) -> NameServerSet {
        NameServerSet(self.0.difference(&other.0).cloned().collect())
    }
}

impl<S: AsRef<str>> FromIterator<S> for NameServerSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = NameServerSet::new();
        for host in iter {
            set.insert(host.as_ref());
        }
        set
    }
}

impl<'a> IntoIterator for &'a NameServerSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for NameServerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hosts: Vec<&str> = self.0.iter().map(String::as_str).collect();
        write!(f, "[{}]", hosts.join(", "))
    }
}

/// Which section of a DNS response holds the NS records we want.
///
/// A parent server answers a question about a delegated child with a referral,
/// so the delegation lives in the authority section. The child's own server
/// answers directly, so its NS records are in the answer section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Authority section: delegation records from the parent (registrar view).
    Authority,
    /// Answer section: the zone's own NS records (zone view).
    Answer,
}

/// Where to ask about a domain: its parent zone's server and its own server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLocation {
    /// The audited domain in canonical form.
    pub domain: String,
    /// The parent zone (domain minus its leftmost label).
    pub parent_zone: String,
    /// First name server of the parent zone.
    pub parent_ns: String,
    /// First name server the system resolver reports for the domain itself.
    pub zone_ns: String,
}
