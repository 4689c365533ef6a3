pub mod config;
pub mod error;
pub mod types;

pub use config::{PacingConfig, PoolshiftConfig, SimulationConfig, SimulationSection};
pub use error::{ConfigError, ConfigResult};
pub use types::*;
