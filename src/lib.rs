pub mod config;
pub mod error;
pub mod events;
pub mod logger;
pub mod pipeline;
pub mod state_machine;

pub use config::PublisherConfig;
pub use error::{PublisherError, PublisherResult};
pub use pipeline::{Category, Context, Manager, Process, ProcessScope};
pub use state_machine::ProcessStatus;
