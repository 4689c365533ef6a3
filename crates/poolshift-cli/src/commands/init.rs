use std::path::Path;

use anyhow::{Context, bail};
use poolshift_core::PoolshiftConfig;

pub const CONFIG_FILE: &str = "poolshift.toml";

pub fn init(path: &str, force: bool) -> anyhow::Result<()> {
    let output = Path::new(path).join(CONFIG_FILE);
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }

    let config = PoolshiftConfig::scaffold();
    std::fs::write(&output, config.to_toml_string()?)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("✓ Generated {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_loadable_scaffold() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path().to_str().unwrap(), false).unwrap();

        let config = PoolshiftConfig::from_file(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.simulation, PoolshiftConfig::scaffold().simulation);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        init(path, false).unwrap();

        assert!(init(path, false).is_err());
        assert!(init(path, true).is_ok());
    }
}
