//! poolshift.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Load;

pub const DEFAULT_MAX_LOAD_THRESHOLD: i64 = 3;
pub const DEFAULT_INITIAL_SERVER_COUNT: i64 = 4;
pub const DEFAULT_TOTAL_CLIENTS: i64 = 20;

pub const DEFAULT_ASSIGN_DELAY_MS: u64 = 300;
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 50;
pub const DEFAULT_MESSAGE_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolshiftConfig {
    pub simulation: Option<SimulationSection>,
    pub pacing: Option<PacingConfig>,
}

/// Raw `[simulation]` table. Values are signed so that negative input
/// survives parsing and is rejected by [`SimulationSection::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationSection {
    pub max_load_threshold: Option<i64>,
    pub initial_server_count: Option<i64>,
    pub total_clients: Option<i64>,
}

/// Presentation pacing. Has no effect on simulation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_assign_delay_ms")]
    pub assign_delay_ms: u64,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_message_delay_ms")]
    pub message_delay_ms: u64,
}

fn default_assign_delay_ms() -> u64 {
    DEFAULT_ASSIGN_DELAY_MS
}

fn default_reconnect_delay_ms() -> u64 {
    DEFAULT_RECONNECT_DELAY_MS
}

fn default_message_delay_ms() -> u64 {
    DEFAULT_MESSAGE_DELAY_MS
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            assign_delay_ms: DEFAULT_ASSIGN_DELAY_MS,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            message_delay_ms: DEFAULT_MESSAGE_DELAY_MS,
        }
    }
}

impl PacingConfig {
    /// No pauses at all.
    pub fn none() -> Self {
        Self {
            assign_delay_ms: 0,
            reconnect_delay_ms: 0,
            message_delay_ms: 0,
        }
    }

    pub fn assign_delay(&self) -> Duration {
        Duration::from_millis(self.assign_delay_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn message_delay(&self) -> Duration {
        Duration::from_millis(self.message_delay_ms)
    }
}

/// Validated simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// A server is overloaded when its load strictly exceeds this value.
    pub max_load_threshold: Load,
    /// Servers present before the first client arrives.
    pub initial_server_count: NonZeroUsize,
    /// Size of the fixed client population.
    pub total_clients: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_load_threshold: DEFAULT_MAX_LOAD_THRESHOLD as Load,
            initial_server_count: NonZeroUsize::new(DEFAULT_INITIAL_SERVER_COUNT as usize)
                .unwrap_or(NonZeroUsize::MIN),
            total_clients: DEFAULT_TOTAL_CLIENTS as usize,
        }
    }
}

impl SimulationConfig {
    /// Validate raw parameters in the order servers, clients, threshold.
    pub fn new(
        initial_server_count: i64,
        total_clients: i64,
        max_load_threshold: i64,
    ) -> ConfigResult<Self> {
        if initial_server_count < 1 {
            return Err(ConfigError::NoServers(initial_server_count));
        }
        if total_clients < 0 {
            return Err(ConfigError::NegativeClients(total_clients));
        }
        if max_load_threshold < 0 {
            return Err(ConfigError::NegativeThreshold(max_load_threshold));
        }

        let initial_server_count = usize::try_from(initial_server_count)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(ConfigError::OutOfRange {
                field: "initial_server_count",
                value: initial_server_count,
            })?;
        // Loads are u32, so the population must fit in one.
        let total_clients = u32::try_from(total_clients)
            .map(|n| n as usize)
            .map_err(|_| ConfigError::OutOfRange {
                field: "total_clients",
                value: total_clients,
            })?;
        let max_load_threshold =
            Load::try_from(max_load_threshold).map_err(|_| ConfigError::OutOfRange {
                field: "max_load_threshold",
                value: max_load_threshold,
            })?;

        Ok(Self {
            max_load_threshold,
            initial_server_count,
            total_clients,
        })
    }
}

impl SimulationSection {
    /// Fill missing keys with defaults and validate.
    pub fn validate(&self) -> ConfigResult<SimulationConfig> {
        SimulationConfig::new(
            self.initial_server_count
                .unwrap_or(DEFAULT_INITIAL_SERVER_COUNT),
            self.total_clients.unwrap_or(DEFAULT_TOTAL_CLIENTS),
            self.max_load_threshold
                .unwrap_or(DEFAULT_MAX_LOAD_THRESHOLD),
        )
    }

    /// Overlay `other` on top of `self`; keys set in `other` win.
    pub fn merge(&self, other: &SimulationSection) -> SimulationSection {
        SimulationSection {
            max_load_threshold: other.max_load_threshold.or(self.max_load_threshold),
            initial_server_count: other.initial_server_count.or(self.initial_server_count),
            total_clients: other.total_clients.or(self.total_clients),
        }
    }
}

impl PoolshiftConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: PoolshiftConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The `[simulation]` table, or an empty one.
    pub fn simulation_section(&self) -> SimulationSection {
        self.simulation.clone().unwrap_or_default()
    }

    pub fn pacing(&self) -> PacingConfig {
        self.pacing.unwrap_or_default()
    }

    /// Scaffold a poolshift.toml carrying every default explicitly.
    pub fn scaffold() -> Self {
        PoolshiftConfig {
            simulation: Some(SimulationSection {
                max_load_threshold: Some(DEFAULT_MAX_LOAD_THRESHOLD),
                initial_server_count: Some(DEFAULT_INITIAL_SERVER_COUNT),
                total_clients: Some(DEFAULT_TOTAL_CLIENTS),
            }),
            pacing: Some(PacingConfig::default()),
        }
    }
}
