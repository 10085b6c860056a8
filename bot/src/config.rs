use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use common::{GuildId, Prefix};
use serde::Deserialize;

/// Configuration loaded from `config.yml` in the root directory.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Prefix used by guilds which haven't configured one.
    pub prefix: Prefix,
    /// Path to the database. Relative paths are relative to the root
    /// directory.
    pub database: Option<PathBuf>,
    /// Guilds whose prefixes are loaded on startup.
    pub warm: Vec<GuildId>,
}

impl Config {
    /// Load the configuration at the given path.
    ///
    /// A missing or empty file results in the default configuration.
    pub fn load(path: &Path) -> Result<Config> {
        if !path.is_file() {
            tracing::info!("No configuration at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| anyhow!("failed to read configuration: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| anyhow!("bad configuration: {}", path.display()))
    }

    fn parse(content: &str) -> Result<Config> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_yaml::from_str(content)?)
    }

    /// The database path to use, relative to `root`.
    pub fn database_path(&self, root: &Path, default: &str) -> PathBuf {
        match &self.database {
            Some(path) => root.join(path),
            None => root.join(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use common::GuildId;

    use super::Config;

    #[test]
    fn test_parse() {
        let config = Config::parse(
            "prefix: \"!!\"\ndatabase: /var/lib/ratbot.sql\nwarm: [1, 18446744073709551615]\n",
        )
        .unwrap();
        assert_eq!("!!", config.prefix.as_str());
        assert_eq!(vec![GuildId::new(1), GuildId::new(u64::MAX)], config.warm);
        assert_eq!(
            PathBuf::from("/var/lib/ratbot.sql"),
            config.database_path(Path::new("/root"), "ratbot.sql")
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!("?", config.prefix.as_str());
        assert!(config.warm.is_empty());
        assert_eq!(
            Path::new("/root").join("ratbot.sql"),
            config.database_path(Path::new("/root"), "ratbot.sql")
        );

        let config = Config::parse("database: data/bot.sql").unwrap();
        assert_eq!("?", config.prefix.as_str());
        assert_eq!(
            Path::new("/root").join("data/bot.sql"),
            config.database_path(Path::new("/root"), "ratbot.sql")
        );
    }

    #[test]
    fn test_bad_prefix() {
        assert!(Config::parse("prefix: \"!!!\"").is_err());
        assert!(Config::parse("prefix: \"\"").is_err());
        assert!(Config::parse("prefixes: \"!\"").is_err());
    }
}
