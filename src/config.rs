use std::path::Path;

use anyhow::{bail, Context as _, Result};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "basalt.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub modules: ModulesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            modules: ModulesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub environment: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "bedrock-project".to_string(),
            environment: "dev".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Terraform module registry the wrapped modules are sourced from.
    pub registry: String,
    /// Optional git ref appended as ?ref=<version>.
    pub version: Option<String>,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            registry: "git::https://github.com/example-org/bedrock-terraform-modules".to_string(),
            version: None,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&text)
            .with_context(|| format!("invalid config: {}", path.as_ref().display()))?;
        Ok(cfg)
    }

    /// Config precedence:
    /// 1) explicit --config (must exist)
    /// 2) basalt.toml in the scan root, when present
    /// 3) built-in defaults
    pub fn discover(scan_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("--config was provided but file does not exist: {}", path.display());
            }
            return Self::load_from_path(path);
        }

        let candidate = scan_root.join(CONFIG_FILE);
        if candidate.exists() {
            return Self::load_from_path(candidate);
        }

        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let cfg = Config::default();
        assert_eq!(cfg.project.name, "bedrock-project");
        assert_eq!(cfg.project.environment, "dev");
        assert!(cfg.modules.registry.starts_with("git::"));
        assert!(cfg.modules.version.is_none());
    }

    #[test]
    fn partial_config_keeps_defaults_for_the_rest() {
        let cfg: Config = toml::from_str(
            r#"
[project]
name = "order-tracking"

[modules]
version = "v1.4.0"
"#,
        )
        .unwrap();
        assert_eq!(cfg.project.name, "order-tracking");
        assert_eq!(cfg.project.environment, "dev");
        assert_eq!(cfg.modules.version.as_deref(), Some("v1.4.0"));
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::discover(dir.path(), None).unwrap();
        assert_eq!(cfg.project.name, "bedrock-project");
    }

    #[test]
    fn discover_reads_project_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[project]\nname = \"from-file\"\n",
        )
        .unwrap();
        let cfg = Config::discover(dir.path(), None).unwrap();
        assert_eq!(cfg.project.name, "from-file");
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::discover(dir.path(), Some(&missing)).is_err());
    }
}
