//! Resource declarations and the trait typed handles implement
//!
//! A [`CfnResource`] is the raw template entry: a type name, a property
//! tree and ordering hints. Higher-level builders create one or more of
//! these and hand back a typed handle implementing [`Resource`], which is the
//! only way other builders can refer to the node.

use crate::error::{Error, Result};
use crate::id::LogicalId;
use crate::token::Token;
use crate::types::RemovalPolicy;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Metadata key carrying the construct path of a resource
pub const PATH_METADATA_KEY: &str = "aws:cdk:path";

/// A single resource entry of a template
#[derive(Debug, Clone, PartialEq)]
pub struct CfnResource {
    pub resource_type: String,
    pub properties: BTreeMap<String, Token>,
    pub depends_on: BTreeSet<LogicalId>,
    pub removal_policy: Option<RemovalPolicy>,
    pub(crate) path: String,
}

impl CfnResource {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties: BTreeMap::new(),
            depends_on: BTreeSet::new(),
            removal_policy: None,
            path: String::new(),
        }
    }

    /// Set a property, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Token>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set a property only when a value is present
    pub fn with_opt<T: Into<Token>>(self, key: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = Some(policy);
        self
    }

    pub fn depending_on(mut self, id: &LogicalId) -> Self {
        self.depends_on.insert(id.clone());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Token> {
        self.properties.get(key)
    }

    /// Construct path this resource was declared at
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn add_dependency(&mut self, id: &LogicalId) {
        self.depends_on.insert(id.clone());
    }

    /// Append an item to a list nested under object keys
    ///
    /// Missing objects and the list itself are created on the way down.
    pub fn push_to_list(&mut self, logical_id: &LogicalId, keys: &[&str], item: Token) -> Result<()> {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(());
        };

        let shape_error = |key: &str, expected: &'static str| Error::PropertyShape {
            logical_id: logical_id.to_string(),
            property: key.to_string(),
            expected,
        };

        let mut slot = self
            .properties
            .entry((*first).to_string())
            .or_insert_with(|| empty_container(rest.is_empty()));

        for (i, key) in rest.iter().enumerate() {
            let Token::Object(map) = slot else {
                return Err(shape_error(*key, "an object"));
            };
            let is_leaf = i + 1 == rest.len();
            slot = map
                .entry((*key).to_string())
                .or_insert_with(|| empty_container(is_leaf));
        }

        match slot {
            Token::List(items) => {
                items.push(item);
                Ok(())
            }
            _ => Err(shape_error(keys[keys.len() - 1], "a list")),
        }
    }

    /// Point every reference and dependency on `from` at `to`
    pub fn rename_reference(&mut self, from: &LogicalId, to: &LogicalId) {
        if self.depends_on.remove(from) {
            self.depends_on.insert(to.clone());
        }
        for value in self.properties.values_mut() {
            value.rename_reference(from, to);
        }
    }

    /// Every resource this one must be created after
    pub fn references(&self) -> BTreeSet<LogicalId> {
        let mut out = self.depends_on.clone();
        for value in self.properties.values() {
            out.extend(value.references());
        }
        out
    }

    /// Render the template entry
    pub fn render(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("Type".into(), Value::String(self.resource_type.clone()));

        if !self.properties.is_empty() {
            let mut props = Map::new();
            for (k, v) in &self.properties {
                props.insert(k.clone(), v.to_json());
            }
            entry.insert("Properties".into(), Value::Object(props));
        }

        if !self.depends_on.is_empty() {
            let deps: Vec<Value> = self
                .depends_on
                .iter()
                .map(|id| Value::String(id.to_string()))
                .collect();
            entry.insert("DependsOn".into(), Value::Array(deps));
        }

        if let Some(policy) = self.removal_policy {
            entry.insert("UpdateReplacePolicy".into(), policy.cfn_value().into());
            entry.insert("DeletionPolicy".into(), policy.cfn_value().into());
        }

        if !self.path.is_empty() {
            entry.insert("Metadata".into(), json!({ PATH_METADATA_KEY: self.path }));
        }

        Value::Object(entry)
    }
}

fn empty_container(leaf: bool) -> Token {
    if leaf {
        Token::List(Vec::new())
    } else {
        Token::Object(BTreeMap::new())
    }
}

/// Typed handle to a declared resource
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct Queue { id: LogicalId }
///
/// impl Resource for Queue {
///     fn logical_id(&self) -> &LogicalId { &self.id }
///     fn resource_type(&self) -> &'static str { "AWS::SQS::Queue" }
/// }
/// ```
pub trait Resource: fmt::Debug {
    /// Logical ID of the primary template entry
    fn logical_id(&self) -> &LogicalId;

    /// CloudFormation type of the primary template entry
    fn resource_type(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> String {
        format!("{} ({})", self.logical_id(), self.resource_type())
    }
}

/// Token helpers available on every handle
pub trait ResourceExt {
    /// `{"Ref": ...}` to the primary entry
    fn ref_token(&self) -> Token;

    /// `{"Fn::GetAtt": [..., attribute]}` on the primary entry
    fn att(&self, attribute: &str) -> Token;
}

impl<R: Resource + ?Sized> ResourceExt for R {
    fn ref_token(&self) -> Token {
        Token::Ref(self.logical_id().clone())
    }

    fn att(&self, attribute: &str) -> Token {
        Token::get_att(self.logical_id(), attribute)
    }
}
