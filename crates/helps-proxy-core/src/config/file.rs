//! File-based configuration source (YAML)
//!
//! Supports user-level (~/.config/helps-proxy/config.yaml) and workspace-level
//! (.config/helps-proxy/config.yaml) config.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::error::ConfigResult;
use super::settings::ProxyConfig;

/// Config level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/helps-proxy/config.yaml)
    User,
    /// Workspace-level config (.config/helps-proxy/config.yaml in workspace root)
    Workspace,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
        }
    }
}

/// Reads and writes [`ProxyConfig`] as YAML.
///
/// A missing file yields the default configuration. Every load is validated.
///
/// # Example
///
/// ```no_run
/// use helps_proxy_core::config::FileConfigSource;
///
/// let source = FileConfigSource::workspace("/path/to/workspace");
/// let config = source.load().unwrap();
/// ```
pub struct FileConfigSource {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<ProxyConfig>>,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// User-level source (`<config_dir>/helps-proxy/config.yaml`)
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("helps-proxy").join("config.yaml"), ConfigLevel::User)
    }

    /// Workspace-level source (`<root>/.config/helps-proxy/config.yaml`)
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root
            .as_ref()
            .join(".config")
            .join("helps-proxy")
            .join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Cached config, reading the file on first use
    pub fn load(&self) -> ConfigResult<ProxyConfig> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }
        self.reload()
    }

    /// Re-read the file, bypassing the cache
    pub fn reload(&self) -> ConfigResult<ProxyConfig> {
        let config = self.read_file()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    fn read_file(&self) -> ConfigResult<ProxyConfig> {
        if !self.path.exists() {
            return Ok(ProxyConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let config = parse_yaml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and write `config`, creating parent directories as needed
    pub fn save(&self, config: &ProxyConfig) -> ConfigResult<()> {
        config.validate()?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml::to_string(config)?)?;

        *self.cache.write() = Some(config.clone());
        Ok(())
    }

    /// Copy the current file next to itself with a `.backup` suffix
    pub fn backup(&self) -> ConfigResult<Option<PathBuf>> {
        if !self.exists() {
            return Ok(None);
        }

        let backup_path = self.path.with_extension("yaml.backup");
        fs::copy(&self.path, &backup_path)?;
        Ok(Some(backup_path))
    }

    pub fn export_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(&self.load()?)?)
    }
}

/// Parse a YAML document; an empty document is the default config
pub fn parse_yaml(content: &str) -> ConfigResult<ProxyConfig> {
    if content.trim().is_empty() {
        return Ok(ProxyConfig::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

impl std::fmt::Debug for FileConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigSource")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, FilterConfig, LlmConfig, ProviderKind};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let source = FileConfigSource::new(dir.path().join("config.yaml"), ConfigLevel::User);

        assert!(!source.exists());
        assert_eq!(source.load().unwrap(), ProxyConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let source = FileConfigSource::workspace(dir.path());
        assert_eq!(source.level(), ConfigLevel::Workspace);

        let config = ProxyConfig::default()
            .with_filters(
                FilterConfig::new()
                    .with_enabled_tools(["fetch_scripture", "fetch_translation_notes"])
                    .with_book_chapter_notes_filtered(true),
            )
            .with_llm(LlmConfig::new(ProviderKind::OpenAi, "gpt-4o-mini"))
            .with_max_iterations(3);
        source.save(&config).unwrap();
        assert!(source.exists());

        let content = fs::read_to_string(source.path()).unwrap();
        assert!(content.contains("enabledTools"));
        assert!(content.contains("fetch_scripture"));

        let reloaded = FileConfigSource::workspace(dir.path()).load().unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "maxIterations: 0\n").unwrap();

        let source = FileConfigSource::new(&path, ConfigLevel::User);
        assert!(matches!(source.load(), Err(ConfigError::InvalidValue { .. })));

        fs::write(&path, "upstream: 42\n").unwrap();
        assert!(matches!(source.reload(), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let source = FileConfigSource::new(&path, ConfigLevel::User);

        assert!(source.backup().unwrap().is_none());

        fs::write(&path, "cacheTtlSecs: 60\n").unwrap();
        let backup_path = source.backup().unwrap().unwrap();
        assert!(backup_path.exists());
        assert!(backup_path.to_string_lossy().contains("backup"));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(parse_yaml("   \n").unwrap(), ProxyConfig::default());
    }
}
