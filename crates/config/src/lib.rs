//! Configuration loading, env overrides, and path expansion.
//!
//! Config files: `skillcue.toml`, `skillcue.yaml`, or `skillcue.json`
//! Searched in `./` then `~/.config/skillcue/`.
//!
//! Path values support `~/` and `${ENV_VAR}` expansion.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    env_subst::{expand_path, substitute_env},
    loader::{
        apply_env_overrides, config_dir, data_dir, discover_and_load, home_dir, load_config,
    },
    schema::{ActivationConfig, ContentConfig, DebugConfig, RulesConfig, SkillcueConfig},
};
