//! `wsn init`: write a default configuration file.

use crate::config::WsnConfig;
use anyhow::{bail, Result};
use std::path::Path;

/// Write the default configuration to `output`. Refuses to overwrite.
pub fn run(output: &Path) -> Result<WsnConfig> {
    if output.exists() {
        bail!("Config file {} already exists", output.display());
    }

    let config = WsnConfig::default();
    config.save(output)?;

    tracing::info!(
        path = %output.display(),
        operator = %config.roles.operator,
        supervisor = %config.roles.supervisor,
        "Configuration written"
    );
    Ok(config)
}
