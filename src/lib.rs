//! reporting-bdd - acceptance suite for the payment reporting platform
//!
//! Binds Gherkin phrases to actions against GPD, API config, Node and the
//! reporting batch/analysis services, and runs them through cucumber.

pub mod actions;
pub mod clients;
pub mod config;
pub mod context;
pub mod error;
pub mod hooks;
pub mod model;
pub mod registry;
pub mod steps;
pub mod utils;
pub mod world;

pub use config::Config;
pub use context::ScenarioContext;
pub use error::{ConfigError, RegistryError, StepError, StepResult};
pub use registry::{Keyword, StepRegistry};
pub use world::{Harness, ReportingWorld};
