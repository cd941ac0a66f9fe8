//! Domain name normalization.
//!
//! Every hostname that takes part in a set comparison goes through
//! [`normalize_fqdn`], so names read from DNS responses (always dot-terminated)
//! and names typed by an operator (usually not) end up in one canonical form.

/// Maximum length of a single DNS label.
const MAX_LABEL_LEN: usize = 63;

/// Maximum length of a full domain name in presentation form (without the root dot).
const MAX_NAME_LEN: usize = 253;

/// Converts a name to its canonical fully-qualified form.
///
/// Surrounding whitespace is trimmed, ASCII letters are lowercased and exactly
/// one trailing dot is kept. An empty input becomes the root name `"."`.
///
/// # Examples
///
/// ```
/// use ns_audit::dns::normalize_fqdn;
///
/// assert_eq!(normalize_fqdn("NS1.Example.com"), "ns1.example.com.");
/// assert_eq!(normalize_fqdn("ns1.example.com."), "ns1.example.com.");
/// ```
pub fn normalize_fqdn(name: &str) -> String {
    let mut fqdn = name.trim().trim_end_matches('.').to_ascii_lowercase();
    fqdn.push('.');
    fqdn
}

/// Returns the parent zone of a fully-qualified name by stripping its leftmost label.
///
/// A top-level domain's parent is the root zone `"."`. The root itself has no
/// parent and yields `None`.
pub fn parent_zone(fqdn: &str) -> Option<String> {
    if fqdn == "." || fqdn.is_empty() {
        return None;
    }
    match fqdn.split_once('.') {
        Some((_, "")) | None => Some(".".to_string()),
        Some((_, rest)) => Some(rest.to_string()),
    }
}

/// Checks that a canonical name is something worth sending to a name server.
///
/// Rejects the root name, empty labels (`a..b.`), labels longer than 63
/// octets and names longer than 253 octets.
pub fn is_valid_domain(fqdn: &str) -> bool {
    let Some(name) = fqdn.strip_suffix('.') else {
        return false;
    };
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }
    name.split('.')
        .all(|label| !label.is_empty() && label.len() <= MAX_LABEL_LEN)
}
