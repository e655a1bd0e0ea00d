//! Construct ids, construct paths and logical ID allocation
//!
//! Every node in the tree has a path made of construct ids
//! (`Stack/ProductsApi/Default/products/GET/Resource`). Resources are
//! addressed in the template by a logical ID derived from that path:
//! a readable alphanumeric prefix plus a short hash of the full path, so
//! that two paths that read the same after sanitizing still get distinct IDs.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Path separator between construct ids
pub const PATH_SEP: &str = "/";

/// Construct id hidden from both the logical ID and the readable path
pub const HIDDEN_ID: &str = "Default";

/// Construct id hidden from the readable part of the logical ID only
pub const HIDDEN_FROM_HUMAN_ID: &str = "Resource";

const MAX_LOGICAL_ID_LEN: usize = 255;
const HASH_LEN: usize = 8;
const FINGERPRINT_LEN: usize = 32;

static STACK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").expect("static regex"));

static OUTPUT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("static regex"));

/// Validate a construct id (a single path component)
pub fn validate_construct_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::invalid_id("construct id", id, "must not be empty"));
    }
    if id.contains(PATH_SEP) {
        return Err(Error::invalid_id(
            "construct id",
            id,
            format!("must not contain '{PATH_SEP}'"),
        ));
    }
    Ok(())
}

/// Validate a CloudFormation stack name
pub fn validate_stack_name(name: &str) -> Result<()> {
    if name.len() > 128 {
        return Err(Error::invalid_id(
            "stack name",
            name,
            "must be at most 128 characters",
        ));
    }
    if !STACK_NAME.is_match(name) {
        return Err(Error::invalid_id(
            "stack name",
            name,
            "must start with a letter and contain only letters, digits and '-'",
        ));
    }
    Ok(())
}

/// Validate an output name; outputs are keyed like logical IDs
pub fn validate_output_id(id: &str) -> Result<()> {
    if id.len() > MAX_LOGICAL_ID_LEN {
        return Err(Error::invalid_id(
            "output id",
            id,
            format!("must be at most {MAX_LOGICAL_ID_LEN} characters"),
        ));
    }
    if !OUTPUT_ID.is_match(id) {
        return Err(Error::invalid_id(
            "output id",
            id,
            "must be non-empty and contain only letters and digits",
        ));
    }
    Ok(())
}

/// Logical ID of a resource inside a template
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// Wrap an existing logical ID (e.g. one read back from a template)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Allocate the logical ID for a path relative to its stack
    ///
    /// Single-component paths keep their sanitized id as-is. Longer paths get
    /// the readable components (minus `Default`, `Resource` and consecutive
    /// duplicates) followed by eight hex digits of the path hash.
    pub fn from_path(components: &[String]) -> Self {
        if let [only] = components {
            let candidate = alphanumeric(only);
            if !candidate.is_empty() && candidate.len() <= MAX_LOGICAL_ID_LEN {
                return Self(candidate);
            }
        }

        let hash = path_hash(components);

        let mut human: Vec<&str> = Vec::with_capacity(components.len());
        for component in components {
            if component == HIDDEN_ID || component == HIDDEN_FROM_HUMAN_ID {
                continue;
            }
            if human.last() == Some(&component.as_str()) {
                continue;
            }
            human.push(component);
        }

        let mut readable = alphanumeric(&human.concat());
        readable.truncate(MAX_LOGICAL_ID_LEN - HASH_LEN);
        Self(format!("{readable}{hash}"))
    }

    /// The path's logical ID with a content fingerprint appended
    ///
    /// Used for resources CloudFormation must replace whenever `fingerprint`
    /// changes; a new logical ID forces a new physical resource.
    pub fn with_fingerprint(components: &[String], fingerprint: &str) -> Self {
        let base = Self::from_path(components);
        let suffix: String = fingerprint
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(FINGERPRINT_LEN)
            .collect();
        let mut id = base.0;
        id.truncate(MAX_LOGICAL_ID_LEN - suffix.len());
        Self(format!("{id}{suffix}"))
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogicalId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

fn alphanumeric(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).collect()
}

fn path_hash(components: &[String]) -> String {
    let joined = components
        .iter()
        .filter(|c| *c != HIDDEN_ID)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(PATH_SEP);
    let hex = blake3::hash(joined.as_bytes()).to_hex();
    hex[..HASH_LEN].to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_single_component_keeps_id() {
        assert_eq!(LogicalId::from_path(&path(&["Products"])).as_str(), "Products");
        assert_eq!(LogicalId::from_path(&path(&["Api-URL"])).as_str(), "ApiURL");
    }

    #[test]
    fn test_resource_and_default_hidden_from_readable_part() {
        let id = LogicalId::from_path(&path(&["Products", "Resource"]));
        assert!(id.as_str().starts_with("Products"));
        assert_eq!(id.as_str().len(), "Products".len() + HASH_LEN);

        let id = LogicalId::from_path(&path(&["ProductsApi", "Default", "products", "GET", "Resource"]));
        assert!(id.as_str().starts_with("ProductsApiproductsGET"));
    }

    #[test]
    fn test_hash_distinguishes_sanitized_collisions() {
        let a = LogicalId::from_path(&path(&["Api", "{id}", "Resource"]));
        let b = LogicalId::from_path(&path(&["Api", "id", "Resource"]));
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("Apiid"));
        assert!(b.as_str().starts_with("Apiid"));
    }

    #[test]
    fn test_default_is_left_out_of_the_hash() {
        let with_default = LogicalId::from_path(&path(&["Api", "Default", "items", "Resource"]));
        let without = LogicalId::from_path(&path(&["Api", "items", "Resource"]));
        assert_eq!(with_default, without);
    }

    #[test]
    fn test_with_fingerprint_appends_suffix() {
        let p = path(&["Api", "Deployment", "Resource"]);
        let base = LogicalId::from_path(&p);
        let a = LogicalId::with_fingerprint(&p, "0123456789abcdef0123456789abcdef0123");
        let b = LogicalId::with_fingerprint(&p, "ffff456789abcdef0123456789abcdef0123");

        assert!(a.as_str().starts_with(base.as_str()));
        assert_eq!(a.as_str().len(), base.as_str().len() + FINGERPRINT_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_output_id() {
        assert!(validate_output_id("ApiURL").is_ok());
        assert!(validate_output_id("Api-URL").is_err());
        assert!(validate_output_id("").is_err());
        assert!(validate_output_id(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_allocation_is_deterministic() {
        let p = path(&["GetProductsFunction", "ServiceRole", "Resource"]);
        assert_eq!(LogicalId::from_path(&p), LogicalId::from_path(&p));
    }

    #[test]
    fn test_validate_construct_id() {
        assert!(validate_construct_id("{id}").is_ok());
        assert!(validate_construct_id("").is_err());
        assert!(validate_construct_id("a/b").is_err());
    }

    #[test]
    fn test_validate_stack_name() {
        assert!(validate_stack_name("ServerlessDemoStack").is_ok());
        assert!(validate_stack_name("my-stack-2").is_ok());
        assert!(validate_stack_name("2stack").is_err());
        assert!(validate_stack_name("my_stack").is_err());
        assert!(validate_stack_name(&"a".repeat(129)).is_err());
    }
}
