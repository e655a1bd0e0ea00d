//! Node.js functions bundled from a TypeScript or JavaScript entry file.
//!
//! Bundling itself is left to an external build step. Declaring a
//! [`NodejsFunction`] fingerprints the entry and records the bundler
//! command line in the stack's asset manifest; the function's code then
//! points at the object that build step will upload.

use crate::error::{Error, Result};
use crate::lambda::{Code, Function, FunctionProps, Runtime, Tracing};
use crate::logs::RetentionDays;
use construct::asset::{self, FileAsset, Packaging};
use construct::{Stack, Token};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Variable the AWS SDK for JavaScript v2 reads to keep connections alive.
pub const CONNECTION_REUSE_ENV: &str = "AWS_NODEJS_CONNECTION_REUSE_ENABLED";

/// Module format of the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CommonJS, written to `index.js`
    #[default]
    Cjs,
    /// ECMAScript modules, written to `index.mjs`
    Esm,
}

impl OutputFormat {
    fn outfile(&self) -> &'static str {
        match self {
            OutputFormat::Cjs => "index.js",
            OutputFormat::Esm => "index.mjs",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Cjs => "cjs",
            OutputFormat::Esm => "esm",
        }
    }
}

/// Bundler options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BundlingOptions {
    /// Output module format
    pub format: OutputFormat,
    /// Code prepended to the bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    /// `package.json` fields consulted when resolving imports, in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub main_fields: Vec<String>,
    /// Minify the output
    pub minify: bool,
    /// Emit a source map next to the bundle
    pub source_map: bool,
    /// Modules left out of the bundle
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external_modules: Vec<String>,
}

/// Settings shared by every function of a stack.
///
/// Build one value and reuse it for each entry with
/// [`NodejsFunctionProps::new`].
#[derive(Debug, Clone)]
pub struct FunctionSettings {
    /// Execution runtime; must be a Node.js runtime
    pub runtime: Runtime,
    /// Memory in MB
    pub memory_size: u32,
    /// Environment variables
    pub environment: BTreeMap<String, Token>,
    /// X-Ray tracing
    pub tracing: Tracing,
    /// Log group retention
    pub log_retention: Option<RetentionDays>,
    /// Set [`CONNECTION_REUSE_ENV`] so the SDK reuses TCP connections
    pub aws_sdk_connection_reuse: bool,
    /// Bundler options
    pub bundling: BundlingOptions,
    /// Timeout in seconds
    pub timeout_seconds: Option<u32>,
}

impl Default for FunctionSettings {
    fn default() -> Self {
        Self {
            runtime: Runtime::Nodejs20x,
            memory_size: 128,
            environment: BTreeMap::new(),
            tracing: Tracing::Disabled,
            log_retention: None,
            aws_sdk_connection_reuse: true,
            bundling: BundlingOptions::default(),
            timeout_seconds: None,
        }
    }
}

/// Properties of one Node.js function.
#[derive(Debug, Clone)]
pub struct NodejsFunctionProps {
    /// Entry file
    pub entry: PathBuf,
    /// Exported handler name inside the entry
    pub handler: String,
    /// Directory the entry is fingerprinted relative to, so asset keys do
    /// not depend on where the project is checked out
    pub project_root: Option<PathBuf>,
    /// Shared settings
    pub settings: FunctionSettings,
}

impl NodejsFunctionProps {
    /// Props for `entry` exporting `handler`.
    pub fn new(entry: impl Into<PathBuf>, handler: impl Into<String>, settings: FunctionSettings) -> Self {
        Self {
            entry: entry.into(),
            handler: handler.into(),
            project_root: None,
            settings,
        }
    }

    /// Fingerprint the entry relative to `root`.
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }
}

/// Builder for bundled Node.js functions.
pub struct NodejsFunction;

impl NodejsFunction {
    /// Declare a function whose code is the bundled `entry`.
    pub fn new(stack: &mut Stack, id: &str, props: NodejsFunctionProps) -> Result<Function> {
        let settings = props.settings;
        let Some(target) = settings.runtime.node_target() else {
            return Err(Error::invalid(
                id,
                "runtime",
                format!("{} is not a Node.js runtime", settings.runtime.name()),
            ));
        };

        let file = bundle_asset(
            &props.entry,
            props.project_root.as_deref(),
            target,
            settings.runtime,
            &settings.bundling,
        )?;

        let mut environment = settings.environment;
        if settings.aws_sdk_connection_reuse {
            environment.insert(CONNECTION_REUSE_ENV.to_string(), Token::from("1"));
        }

        let function_props = FunctionProps {
            memory_size: settings.memory_size,
            environment,
            tracing: settings.tracing,
            log_retention: settings.log_retention,
            timeout_seconds: settings.timeout_seconds,
            ..FunctionProps::new(
                Code::Asset(file),
                format!("index.{}", props.handler),
                settings.runtime,
            )
        };
        Function::new(stack, id, function_props)
    }
}

/// Fingerprint the entry and describe how to bundle it.
fn bundle_asset(
    entry: &Path,
    project_root: Option<&Path>,
    target: &str,
    runtime: Runtime,
    bundling: &BundlingOptions,
) -> Result<FileAsset> {
    let source_path = entry.to_string_lossy().into_owned();
    let relative = project_root
        .and_then(|root| entry.strip_prefix(root).ok())
        .unwrap_or(entry);
    let fingerprint_path: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let contents = match std::fs::read(entry) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!("Entry {source_path} not found; fingerprinting its path only");
            Vec::new()
        }
        Err(source) => {
            return Err(Error::EntryUnreadable {
                path: entry.to_path_buf(),
                source,
            });
        }
    };

    let options = serde_json::to_vec(bundling)?;
    let fingerprint_path = fingerprint_path.join("/");
    let id = asset::fingerprint([
        fingerprint_path.as_bytes(),
        contents.as_slice(),
        options.as_slice(),
        runtime.name().as_bytes(),
    ]);

    Ok(FileAsset {
        id,
        build_command: build_command(&source_path, target, bundling),
        source_path,
        packaging: Packaging::ZipDirectory,
    })
}

fn build_command(entry: &str, target: &str, bundling: &BundlingOptions) -> Vec<String> {
    let mut cmd = vec![
        "esbuild".to_string(),
        "--bundle".to_string(),
        entry.to_string(),
        format!("--target={target}"),
        "--platform=node".to_string(),
        format!("--format={}", bundling.format.as_str()),
        format!("--outfile={}", bundling.format.outfile()),
    ];
    if bundling.minify {
        cmd.push("--minify".to_string());
    }
    if bundling.source_map {
        cmd.push("--sourcemap".to_string());
    }
    if !bundling.main_fields.is_empty() {
        cmd.push(format!("--main-fields={}", bundling.main_fields.join(",")));
    }
    if let Some(banner) = &bundling.banner {
        cmd.push(format!("--banner:js={banner}"));
    }
    for module in &bundling.external_modules {
        cmd.push(format!("--external:{module}"));
    }
    cmd
}
