//! # stackgen
//!
//! The products API stack, declared with [`awskit`] builders and
//! synthesized to CloudFormation through [`construct`].
//!
//! ```no_run
//! use construct::App;
//!
//! let mut app = App::new();
//! stackgen::stack::products_stack(&mut app, "ServerlessTypescriptDemoStack", None)?;
//! for (name, contents) in app.synth()?.files()? {
//!     println!("{name}: {} bytes", contents.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod paths;
pub mod stack;
