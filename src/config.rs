//! `stack.toml` configuration
//!
//! ```toml
//! stack_name = "ServerlessTypescriptDemoStack"
//! account = "123456789012"
//! region = "eu-west-1"
//! description = "Products API"
//! entry_root = "~/src/products"
//! table_removal_policy = "destroy"
//!
//! [tags]
//! project = "products"
//! ```

use crate::paths;
use crate::stack::ProductsOptions;
use anyhow::{Context, Result};
use construct::{RemovalPolicy, StackProps};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_STACK_NAME: &str = "ServerlessTypescriptDemoStack";

/// Account used when the file leaves `account` unset
pub const ENV_DEFAULT_ACCOUNT: &str = "CDK_DEFAULT_ACCOUNT";

/// Region used when the file leaves `region` unset
pub const ENV_DEFAULT_REGION: &str = "CDK_DEFAULT_REGION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackConfig {
    pub stack_name: String,
    pub account: Option<String>,
    pub region: Option<String>,
    pub description: Option<String>,
    /// Directory handler entries are resolved against
    pub entry_root: String,
    pub tags: BTreeMap<String, String>,
    pub table_removal_policy: Option<RemovalPolicy>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            stack_name: DEFAULT_STACK_NAME.to_string(),
            account: None,
            region: None,
            description: None,
            entry_root: ".".to_string(),
            tags: BTreeMap::new(),
            table_removal_policy: Some(RemovalPolicy::Destroy),
        }
    }
}

impl StackConfig {
    /// Load from the resolved config file, falling back to defaults, then
    /// fill account and region from the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match paths::config_file(explicit)? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        Ok(config.with_env_defaults(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse stack config")
    }

    fn with_env_defaults(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.account.is_none() {
            self.account = lookup(ENV_DEFAULT_ACCOUNT).filter(|v| !v.is_empty());
        }
        if self.region.is_none() {
            self.region = lookup(ENV_DEFAULT_REGION).filter(|v| !v.is_empty());
        }
        self
    }

    pub fn stack_props(&self) -> StackProps {
        StackProps {
            account: self.account.clone(),
            region: self.region.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
        }
    }

    pub fn products_options(&self) -> ProductsOptions {
        ProductsOptions {
            entry_root: paths::expand_path(&self.entry_root),
            table_removal_policy: self.table_removal_policy,
        }
    }
}
