//! # awskit
//!
//! Typed AWS resource builders on top of the [`construct`] graph.
//!
//! This crate provides:
//! - DynamoDB tables with read/write grants
//! - IAM roles, default policies and the [`Grantable`](iam::Grantable) seam
//! - Lambda functions, including Node.js functions bundled from an entry file
//! - CloudWatch log groups with retention
//! - API Gateway REST APIs with Lambda proxy integrations
//!
//! Every builder takes the [`Stack`](construct::Stack) it declares into and
//! returns a typed handle. Handles are the only way to reference a resource,
//! so a reference always points at something already declared.
//!
//! ## Example
//!
//! ```no_run
//! use awskit::apigateway::{HttpMethod, RestApi, RestApiProps};
//! use awskit::dynamodb::{Attribute, Table, TableProps};
//! use awskit::nodejs::{FunctionSettings, NodejsFunction, NodejsFunctionProps};
//! use construct::{Stack, StackProps};
//!
//! let mut stack = Stack::new("Demo", StackProps::default())?;
//! let table = Table::new(&mut stack, "Items", TableProps::new(Attribute::string("id")))?;
//!
//! let list = NodejsFunction::new(
//!     &mut stack,
//!     "ListItems",
//!     NodejsFunctionProps::new("src/list.ts", "handler", FunctionSettings::default()),
//! )?;
//! table.grant_read_data(&mut stack, &list)?;
//!
//! let mut api = RestApi::new(&mut stack, "ItemsApi", RestApiProps::default())?;
//! let items = api.add_resource(&mut stack, &api.root(), "items")?;
//! api.add_method(&mut stack, &items, HttpMethod::Get, &list)?;
//! # Ok::<(), awskit::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod apigateway;
pub mod dynamodb;
pub mod error;
pub mod iam;
pub mod lambda;
pub mod logs;
pub mod nodejs;

pub use error::{Error, Result};
