//! # Construct
//!
//! A typed construct tree for declarative infrastructure, synthesized to
//! CloudFormation templates.
//!
//! ## Core Concepts
//!
//! - **App**: the root scope; owns stacks and synthesizes the cloud assembly
//! - **Stack**: a deployable unit; resources are declared at construct paths
//!   inside it and receive stable logical IDs
//! - **Token**: a property value that may embed late-bound intrinsics
//!   (`Ref`, `Fn::GetAtt`, `Fn::Join`, pseudo parameters)
//! - **Edge**: a grant or route between two resources, kept alongside the
//!   plain references for inspection
//! - **DependencyGraph**: creation order derived from references
//!
//! ## Example
//!
//! ```no_run
//! use construct::{App, CfnResource, Output, Stack, StackProps, Token};
//!
//! let mut stack = Stack::new("Demo", StackProps::default())?;
//! let table = stack.add_resource(
//!     &["Table"],
//!     CfnResource::new("AWS::DynamoDB::Table").with("BillingMode", "PAY_PER_REQUEST"),
//! )?;
//! stack.add_output("TableName", Output::new(Token::Ref(table)))?;
//!
//! let mut app = App::new();
//! app.add_stack(stack)?;
//! let assembly = app.synth()?;
//! for (name, contents) in assembly.files()? {
//!     println!("{name}: {} bytes", contents.len());
//! }
//! # Ok::<(), construct::Error>(())
//! ```

pub mod app;
pub mod asset;
pub mod diff;
pub mod error;
pub mod graph;
pub mod id;
pub mod resource;
pub mod stack;
pub mod template;
pub mod token;
pub mod types;

// Re-export main types at crate root
pub use app::{App, CloudAssembly, StackArtifact};
pub use asset::{FileAsset, Packaging};
pub use diff::{Change, DiffSummary, ResourceDiff, compute_diffs, compute_output_diffs, group_by_type};
pub use error::{Error, Result};
pub use graph::DependencyGraph;
pub use id::LogicalId;
pub use resource::{CfnResource, Resource, ResourceExt};
pub use stack::Stack;
pub use template::Template;
pub use token::{Pseudo, Token};
pub use types::{AccessMode, Edge, EdgeKind, Environment, Output, RemovalPolicy, StackProps};
