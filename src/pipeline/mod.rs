//! Publishing engine: processes, their lifecycle and the manager that runs them
//!
//! A publish is a sequence of [`Process`]es grouped into four categories
//! (Collect → Check → Extract → Push). Each process reads from and writes to
//! a shared [`Context`], reports problems as [`ErrorRecord`]s and ends in a
//! terminal [`ProcessStatus`](crate::state_machine::ProcessStatus). The
//! [`Manager`] runs them in order and stops at the first mandatory failure.
//!
//! # Example
//! ```
//! use publisher_lib::error::PublisherResult;
//! use publisher_lib::pipeline::{Category, ErrorItem, Manager, Process, ProcessScope};
//! use publisher_lib::pipeline::stages::StaticCollector;
//! use publisher_lib::pipeline::ValueKind;
//! use serde_json::json;
//!
//! // Define a custom check
//! struct CheckFileExtension;
//!
//! impl Process for CheckFileExtension {
//!     fn name(&self) -> &str {
//!         "Check file extension"
//!     }
//!
//!     fn category(&self) -> Category {
//!         Category::Check
//!     }
//!
//!     fn process(&mut self, scope: &mut ProcessScope<'_>) -> PublisherResult<()> {
//!         let file = scope.context().get_string("file")?;
//!         if !file.ends_with(".ma") {
//!             scope.add_error("Wrong format", "expected a .ma file", vec![ErrorItem::new("file", file)]);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut manager = Manager::new();
//! manager.register(StaticCollector::new("file", ValueKind::String, Some(json!("sh010.mb"))))?;
//! manager.register(CheckFileExtension)?;
//!
//! let err = manager.publish().unwrap_err();
//! assert_eq!(err.to_string(), "Check file extension failed:\n Wrong format:expected a .ma file");
//! # Ok::<(), publisher_lib::error::PublisherError>(())
//! ```

pub mod callbacks;
pub mod collector;
pub mod context;
pub mod core;
pub mod error_record;
pub mod executor;
pub mod process;
pub mod stages;

// Re-export main types
pub use self::core::{Category, Process, ProcessOutcome, PublishReport};
pub use callbacks::{Callback, CallbackId, CallbackKind};
pub use collector::{is_empty_value, CollectedValue, ValueKind};
pub use context::Context;
pub use error_record::{ErrorItem, ErrorRecord};
pub use executor::Manager;
pub use process::{ProcessHandle, ProcessScope, ProcessState};
