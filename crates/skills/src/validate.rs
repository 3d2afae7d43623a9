//! Rule document linting for `skillcue check`.
//!
//! Reports the problems the matcher silently works around: rules it will
//! skip, patterns it will drop, and triggers that can never fire.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    matcher::compile_pattern,
    rules::parse_document,
    types::{RuleKind, SkillRule},
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Skill the diagnostic is about; `None` for document-level problems.
    pub skill: Option<String>,
    pub message: String,
}

/// Result of validating a rule document.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub path: PathBuf,
    pub skills: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Validate the raw contents of a rule file.
pub fn validate_rules(raw: &str, path: &Path) -> ValidationReport {
    let mut report = ValidationReport {
        path: path.to_path_buf(),
        skills: 0,
        diagnostics: Vec::new(),
    };

    let document = match parse_document(raw, path) {
        Ok(document) => document,
        Err(e) => {
            push(&mut report, Severity::Error, None, e.to_string());
            return report;
        },
    };
    report.skills = document.len();

    if document.version.trim().is_empty() {
        push(&mut report, Severity::Info, None, "document has no version tag".into());
    }
    if document.is_empty() {
        push(&mut report, Severity::Warning, None, "document defines no skills".into());
    }

    for (name, rule) in &document.skills {
        check_rule(&mut report, name, rule);
    }

    report
        .diagnostics
        .sort_by(|a, b| a.severity.cmp(&b.severity));
    report
}

fn check_rule(report: &mut ValidationReport, name: &str, rule: &SkillRule) {
    let skill = Some(name.to_string());

    if rule.priority().is_none() {
        push(
            report,
            Severity::Error,
            skill.clone(),
            format!(
                "invalid priority '{}': expected critical, high, medium or low; rule is skipped",
                rule.priority
            ),
        );
    }
    if rule.kind == RuleKind::Unknown {
        push(
            report,
            Severity::Warning,
            skill.clone(),
            "unknown type: expected guardrail or domain".into(),
        );
    }

    let Some(triggers) = rule.triggers.as_ref() else {
        push(
            report,
            Severity::Warning,
            skill,
            "no promptTriggers: rule never matches".into(),
        );
        return;
    };
    if triggers.is_empty() {
        push(
            report,
            Severity::Warning,
            skill.clone(),
            "promptTriggers has no keywords or intentPatterns".into(),
        );
    }

    for (index, keyword) in triggers.keywords.iter().enumerate() {
        if keyword.trim().is_empty() {
            push(
                report,
                Severity::Warning,
                skill.clone(),
                format!("keywords[{index}] is blank and is ignored"),
            );
        }
    }
    for (index, pattern) in triggers.intent_patterns.iter().enumerate() {
        if let Err(e) = compile_pattern(pattern) {
            push(
                report,
                Severity::Error,
                skill.clone(),
                format!("intentPatterns[{index}] is not a valid regex: {e}"),
            );
        }
    }
}

fn push(report: &mut ValidationReport, severity: Severity, skill: Option<String>, message: String) {
    report.diagnostics.push(Diagnostic {
        severity,
        skill,
        message,
    });
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn validate(raw: &str) -> ValidationReport {
        validate_rules(raw, Path::new("skill-rules.json"))
    }

    #[test]
    fn clean_document_has_no_diagnostics() {
        let report = validate(
            r#"{"version":"1.0","skills":{"a":{"type":"guardrail","priority":"critical",
                "promptTriggers":{"keywords":["x"],"intentPatterns":["y+"]}}}}"#,
        );
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        assert_eq!(report.skills, 1);
    }

    #[test]
    fn unparsable_document_is_one_error() {
        let report = validate("{");
        assert!(report.has_errors());
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].skill.is_none());
    }

    #[test]
    fn reports_rule_level_problems() {
        let report = validate(
            r#"{"version":"1.0","skills":{
                "bad":{"type":"workflow","priority":"urgent",
                    "promptTriggers":{"keywords":[" "],"intentPatterns":["(open"]}},
                "silent":{"type":"domain","priority":"low"}}}"#,
        );
        assert_eq!(report.count(Severity::Error), 2);
        assert_eq!(report.count(Severity::Warning), 3);
        assert_eq!(report.diagnostics[0].severity, Severity::Error);
        assert!(
            report
                .diagnostics
                .iter()
                .any(|d| d.skill.as_deref() == Some("silent") && d.message.contains("never matches"))
        );
    }

    #[test]
    fn missing_version_is_info_only() {
        let report = validate(r#"{"skills":{}}"#);
        assert!(!report.has_errors());
        assert_eq!(report.count(Severity::Info), 1);
        assert_eq!(report.count(Severity::Warning), 1);
    }
}
