//! Core types shared by resources, stacks and templates

use crate::id::LogicalId;
use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What happens to a resource when it leaves the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Delete the physical resource
    Destroy,
    /// Keep the physical resource, orphaned
    Retain,
    /// Take a snapshot, then delete
    Snapshot,
}

impl RemovalPolicy {
    /// Value used for `DeletionPolicy` / `UpdateReplacePolicy`
    pub fn cfn_value(&self) -> &'static str {
        match self {
            RemovalPolicy::Destroy => "Delete",
            RemovalPolicy::Retain => "Retain",
            RemovalPolicy::Snapshot => "Snapshot",
        }
    }
}

/// Access mode of a permission grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Read,
    Write,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => write!(f, "read"),
            AccessMode::Write => write!(f, "write"),
        }
    }
}

/// Relationship between two resources that is not a plain reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EdgeKind {
    /// `from` may access `to` with the given mode
    Grant { mode: AccessMode },
    /// Requests for `method path` on `from` are served by `to`
    Route { method: String, path: String },
}

/// A directed, typed edge of the resource graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: LogicalId,
    pub to: LogicalId,
    #[serde(flatten)]
    pub kind: EdgeKind,
}

impl Edge {
    pub fn grant(grantee: &LogicalId, target: &LogicalId, mode: AccessMode) -> Self {
        Self {
            from: grantee.clone(),
            to: target.clone(),
            kind: EdgeKind::Grant { mode },
        }
    }

    pub fn route(
        api: &LogicalId,
        handler: &LogicalId,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            from: api.clone(),
            to: handler.clone(),
            kind: EdgeKind::Route {
                method: method.into(),
                path: path.into(),
            },
        }
    }

    /// Access mode, if this is a grant
    pub fn grant_mode(&self) -> Option<AccessMode> {
        match &self.kind {
            EdgeKind::Grant { mode } => Some(*mode),
            EdgeKind::Route { .. } => None,
        }
    }
}

/// A stack output exposed to external tooling after deployment
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub value: Token,
    pub description: Option<String>,
    pub export_name: Option<String>,
}

impl Output {
    pub fn new(value: impl Into<Token>) -> Self {
        Self {
            value: value.into(),
            description: None,
            export_name: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_export_name(mut self, name: impl Into<String>) -> Self {
        self.export_name = Some(name.into());
        self
    }
}

/// Stack-level properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackProps {
    /// Target account; the `AWS::AccountId` pseudo parameter when unset
    #[serde(default)]
    pub account: Option<String>,
    /// Target region; the `AWS::Region` pseudo parameter when unset
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl StackProps {
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Environment a stack deploys into, as written to the cloud assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub account: String,
    pub region: String,
}

impl Environment {
    const UNKNOWN_ACCOUNT: &'static str = "unknown-account";
    const UNKNOWN_REGION: &'static str = "unknown-region";

    pub fn from_props(props: &StackProps) -> Self {
        Self {
            account: props
                .account
                .clone()
                .unwrap_or_else(|| Self::UNKNOWN_ACCOUNT.to_string()),
            region: props
                .region
                .clone()
                .unwrap_or_else(|| Self::UNKNOWN_REGION.to_string()),
        }
    }

    /// `aws://account/region`
    pub fn uri(&self) -> String {
        format!("aws://{}/{}", self.account, self.region)
    }
}
