pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod generate;
pub mod graph;
pub mod hcl;
pub mod model;
pub mod parser;
pub mod registry;
pub mod resolve;
pub mod validation;

// Convenience re-exports (optional, but nice)
pub use config::Config;
pub use error::Error;
pub use generate::{CancelFlag, Generator};
pub use model::{Reference, ResourceKind, ResourceRecord};
pub use registry::Registry;
pub use resolve::Resolver;
