/// Config schema types (activation limits, rule files, content roots, debug log).
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{env_subst::expand_path, loader::data_dir};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillcueConfig {
    pub activation: ActivationConfig,
    pub rules: RulesConfig,
    pub content: ContentConfig,
    pub debug: DebugConfig,
}

/// Limits applied when building the activation digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// How many critical/high skills get their full content injected.
    pub injection_cap: usize,
    /// Character budget per injected skill document.
    pub content_budget: usize,
    /// Display cap for skill names in section headers.
    pub header_width: usize,
    /// How long to wait for the hook payload on stdin.
    pub stdin_timeout_ms: u64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            injection_cap: 3,
            content_budget: 8000,
            header_width: 40,
            stdin_timeout_ms: 2000,
        }
    }
}

/// Where the rule document is looked up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Candidate rule files, most specific first. Replaces the built-in
    /// search order when non-empty.
    pub paths: Vec<String>,
}

/// Skill content discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Inject skill content at all. When false only skill names are listed.
    pub enabled: bool,
    /// Directories scanned for skill documents. Replaces the built-in roots
    /// when non-empty.
    pub roots: Vec<String>,
    /// Path segment(s) marking the active install of a skill.
    pub active_marker: String,
    /// File name (matched case-insensitively) holding a skill's content.
    pub marker_file: String,
    /// Deepest directory level scanned below each root.
    pub max_depth: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            roots: Vec::new(),
            active_marker: "cache/active".into(),
            marker_file: "SKILL.md".into(),
            max_depth: 12,
        }
    }
}

/// Append-only debug log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    /// Directory for `skill-activation.log`. Defaults to `<data_dir>/logs`.
    pub log_dir: Option<String>,
}

impl SkillcueConfig {
    /// Configured rule file candidates with `~` and `${VAR}` expanded.
    pub fn rule_paths(&self, home: Option<&Path>) -> Vec<PathBuf> {
        self.rules
            .paths
            .iter()
            .map(|p| expand_path(p, home))
            .collect()
    }

    /// Configured content roots with `~` and `${VAR}` expanded.
    pub fn content_roots(&self, home: Option<&Path>) -> Vec<PathBuf> {
        self.content
            .roots
            .iter()
            .map(|p| expand_path(p, home))
            .collect()
    }

    /// Directory the debug log is written to.
    pub fn log_dir(&self, home: Option<&Path>) -> PathBuf {
        match self.debug.log_dir.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(dir) => expand_path(dir, home),
            None => data_dir().join("logs"),
        }
    }
}
