use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::schema::SkillcueConfig;

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "skillcue.toml",
    "skillcue.yaml",
    "skillcue.yml",
    "skillcue.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<SkillcueConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./skillcue.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/skillcue/skillcue.{toml,yaml,yml,json}` (user-global)
///
/// Returns `SkillcueConfig::default()` if no config file is found or the
/// one found is broken. A hook must keep working with a bad config.
pub fn discover_and_load() -> SkillcueConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    SkillcueConfig::default()
}

/// Apply `SKILLCUE_*` environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: SkillcueConfig) -> SkillcueConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: SkillcueConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SkillcueConfig {
    if let Some(flag) = lookup("SKILLCUE_DEBUG") {
        match flag.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => config.debug.enabled = true,
            "0" | "false" | "no" | "off" | "" => config.debug.enabled = false,
            other => warn!(value = other, "ignoring unrecognised SKILLCUE_DEBUG"),
        }
    }
    if let Some(dir) = lookup("SKILLCUE_LOG_DIR").filter(|d| !d.trim().is_empty()) {
        config.debug.log_dir = Some(dir);
    }
    if let Some(cap) = parse_usize_var(&lookup, "SKILLCUE_INJECTION_CAP") {
        config.activation.injection_cap = cap;
    }
    if let Some(budget) = parse_usize_var(&lookup, "SKILLCUE_CONTENT_BUDGET") {
        config.activation.content_budget = budget;
    }
    config
}

fn parse_usize_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<usize> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(var = name, value = %raw, error = %e, "ignoring invalid numeric override");
            None
        },
    }
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/skillcue/
    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/skillcue/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "skillcue").map(|d| d.config_dir().to_path_buf())
}

/// Returns the data directory (`~/.local/share/skillcue/` on Linux), or
/// `./.skillcue` when no home directory can be determined.
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "skillcue")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".skillcue"))
}

/// Returns the current user's home directory.
pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<SkillcueConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_each_supported_format() {
        let tmp = tempfile::tempdir().unwrap();

        let toml_path = tmp.path().join("skillcue.toml");
        std::fs::write(&toml_path, "[activation]\ninjection_cap = 1\n").unwrap();
        assert_eq!(load_config(&toml_path).unwrap().activation.injection_cap, 1);

        let yaml_path = tmp.path().join("skillcue.yaml");
        std::fs::write(&yaml_path, "debug:\n  enabled: true\n").unwrap();
        assert!(load_config(&yaml_path).unwrap().debug.enabled);

        let json_path = tmp.path().join("skillcue.json");
        std::fs::write(&json_path, r#"{"content":{"enabled":false}}"#).unwrap();
        assert!(!load_config(&json_path).unwrap().content.enabled);
    }

    #[test]
    fn rejects_unknown_extension_and_bad_syntax() {
        let tmp = tempfile::tempdir().unwrap();
        let ini = tmp.path().join("skillcue.ini");
        std::fs::write(&ini, "x=1").unwrap();
        assert!(load_config(&ini).is_err());

        let broken = tmp.path().join("skillcue.toml");
        std::fs::write(&broken, "[activation\n").unwrap();
        assert!(load_config(&broken).is_err());

        assert!(load_config(&tmp.path().join("missing.toml")).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let lookup = |name: &str| match name {
            "SKILLCUE_DEBUG" => Some("true".to_string()),
            "SKILLCUE_LOG_DIR" => Some("/tmp/skillcue-logs".to_string()),
            "SKILLCUE_INJECTION_CAP" => Some("5".to_string()),
            "SKILLCUE_CONTENT_BUDGET" => Some("not-a-number".to_string()),
            _ => None,
        };
        let cfg = apply_env_overrides_with(SkillcueConfig::default(), lookup);
        assert!(cfg.debug.enabled);
        assert_eq!(cfg.debug.log_dir.as_deref(), Some("/tmp/skillcue-logs"));
        assert_eq!(cfg.activation.injection_cap, 5);
        assert_eq!(cfg.activation.content_budget, 8000);
    }

    #[test]
    fn debug_flag_can_be_switched_off() {
        let mut cfg = SkillcueConfig::default();
        cfg.debug.enabled = true;
        let cfg = apply_env_overrides_with(cfg, |name| {
            (name == "SKILLCUE_DEBUG").then(|| "0".to_string())
        });
        assert!(!cfg.debug.enabled);
    }
}
