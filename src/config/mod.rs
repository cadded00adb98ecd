//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! --config / CONFIG_PATH / candidate files
//!     → loader.rs (read & deserialize YAML, JSON or TOML)
//!     → loader.rs (defaults, normalization, env overrides)
//!     → validation.rs (semantic checks)
//!     → WebhookConfig (validated, immutable)
//!     → one EndpointPolicy per endpoint
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - A missing config file is not an error; defaults apply
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{Environment, ProcessEnv};
pub use loader::{ConfigError, ConfigFormat, ConfigLoader, LoadedConfig};
pub use schema::{ConfigFile, EndpointConfig, WebhookConfig};
pub use validation::{validate_config, ValidationError};
