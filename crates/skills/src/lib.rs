//! Prompt-driven skill activation.
//!
//! A rule document maps skill names to prompt triggers (keywords and intent
//! patterns) and a priority. For each submitted prompt the matching skills
//! are ranked, the top critical/high ones have their `SKILL.md` content
//! injected, and the rest are listed by name.

pub mod content;
pub mod discover;
pub mod error;
pub mod log;
pub mod matcher;
pub mod pipeline;
pub mod render;
pub mod rules;
pub mod select;
pub mod types;
pub mod validate;

pub use {
    content::{ContentLoader, LoadedContent},
    discover::{ContentLocator, ContentSource, ContentSources, FsContentLocator},
    error::{Error, Result},
    log::{ActivationLog, JsonlActivationLog, NoopActivationLog, activation_log},
    matcher::Matcher,
    pipeline::ActivationPipeline,
    render::Renderer,
    rules::{LoadedRules, RuleStore},
    select::{Selection, Selector},
    types::{MatchKind, MatchRecord, Priority, RuleDocument, RuleKind, SkillRule},
    validate::{Diagnostic, Severity, ValidationReport, validate_rules},
};
