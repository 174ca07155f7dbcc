//! CLI configuration file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wsn_core::{
    Address, AnomalyPolicy, ControllerConfig, EstimateBounds, RoleBindings, ADDRESS_LEN,
};

/// Environment variable overriding the operator address
pub const OPERATOR_ENV: &str = "WSN_OPERATOR";
/// Environment variable overriding the supervisor address
pub const SUPERVISOR_ENV: &str = "WSN_SUPERVISOR";

const DEFAULT_OPERATOR: [u8; ADDRESS_LEN] = [
    0x3d, 0xee, 0xa4, 0xdc, 0x72, 0xf6, 0x73, 0x53, 0x74, 0xc2, 0x6a, 0xae, 0x49, 0x93, 0x9f, 0x37,
    0x5e, 0x79, 0x0f, 0x07,
];
const DEFAULT_SUPERVISOR: [u8; ADDRESS_LEN] = [
    0xfb, 0x8e, 0x7e, 0xf8, 0x45, 0x3f, 0xf0, 0x78, 0x15, 0xf5, 0x3d, 0x36, 0x97, 0x61, 0x4b, 0xac,
    0xf7, 0x7d, 0xc7, 0x6a,
];

/// Role addresses as written in the file; bound and checked on use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolesSection {
    pub operator: Address,
    pub supervisor: Address,
}

impl Default for RolesSection {
    fn default() -> Self {
        Self {
            operator: Address::from_bytes(DEFAULT_OPERATOR),
            supervisor: Address::from_bytes(DEFAULT_SUPERVISOR),
        }
    }
}

impl RolesSection {
    pub fn bind(&self) -> wsn_core::Result<RoleBindings> {
        RoleBindings::new(self.operator, self.supervisor)
    }
}

/// Journal persistence settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSection {
    /// Where `run` writes its journal when no `--journal` is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<PathBuf>,
}

/// Contents of `wsn.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WsnConfig {
    #[serde(default)]
    pub roles: RolesSection,
    #[serde(default)]
    pub estimation: EstimateBounds,
    #[serde(default)]
    pub anomaly: AnomalyPolicy,
    #[serde(default)]
    pub ledger: LedgerSection,
}

impl WsnConfig {
    /// Load from `path`, falling back to defaults when the file is absent,
    /// then apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };

        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory {}", parent.display())
                })?;
            }
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Apply `WSN_OPERATOR` / `WSN_SUPERVISOR` from the process environment.
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(|key| std::env::var(key).ok())
    }

    /// Apply role overrides looked up through `var`.
    pub fn merge_with_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = var(OPERATOR_ENV) {
            self.roles.operator = value
                .parse()
                .with_context(|| format!("Invalid {OPERATOR_ENV}: {value}"))?;
        }
        if let Some(value) = var(SUPERVISOR_ENV) {
            self.roles.supervisor = value
                .parse()
                .with_context(|| format!("Invalid {SUPERVISOR_ENV}: {value}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> wsn_core::Result<()> {
        self.controller_config().map(|_| ())
    }

    /// The controller configuration to deploy with.
    pub fn controller_config(&self) -> wsn_core::Result<ControllerConfig> {
        let config = ControllerConfig::new(self.roles.bind()?)
            .with_bounds(self.estimation)
            .with_anomaly_policy(self.anomaly);
        config.validate()?;
        Ok(config)
    }
}
