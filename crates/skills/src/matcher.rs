//! Prompt matching against the rule document.

use {
    regex::{Regex, RegexBuilder},
    serde_json::json,
    tracing::{debug, warn},
};

use crate::{
    log::ActivationLog,
    types::{MatchKind, MatchRecord, Priority, RuleDocument, SkillRule},
};

/// Upper bound on a compiled intent pattern, in bytes.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Compile one intent pattern, case-insensitively.
pub fn compile_pattern(source: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
}

struct CompiledRule {
    name: String,
    rule: SkillRule,
    priority: Priority,
    /// (original, lower-cased) pairs; blank keywords are dropped.
    keywords: Vec<(String, String)>,
    patterns: Vec<(String, Regex)>,
}

impl CompiledRule {
    fn evaluate(&self, prompt: &str) -> Option<MatchRecord> {
        let (kind, trigger) = if let Some((keyword, _)) =
            self.keywords.iter().find(|(_, lower)| prompt.contains(lower.as_str()))
        {
            (MatchKind::Keyword, keyword.clone())
        } else {
            let (source, _) = self.patterns.iter().find(|(_, re)| re.is_match(prompt))?;
            (MatchKind::Intent, source.clone())
        };

        Some(MatchRecord {
            name: self.name.clone(),
            kind,
            trigger,
            priority: self.priority,
            rule: self.rule.clone(),
            source: None,
            content: None,
        })
    }
}

/// Rules ready for matching: validated and with patterns compiled.
pub struct Matcher {
    rules: Vec<CompiledRule>,
}

impl Matcher {
    /// Compile every usable rule in document order.
    ///
    /// Rules without `promptTriggers` or with an unrecognised priority are
    /// dropped. A pattern that fails to compile is dropped on its own; the
    /// rest of its rule still applies.
    pub fn compile(document: &RuleDocument, log: &dyn ActivationLog) -> Self {
        let mut rules = Vec::with_capacity(document.len());

        for (name, rule) in &document.skills {
            let Some(triggers) = rule.triggers.as_ref() else {
                debug!(skill = %name, "rule has no prompt triggers");
                log.record("rule_ignored", json!({ "skill": name, "reason": "no promptTriggers" }));
                continue;
            };
            let Some(priority) = rule.priority() else {
                warn!(skill = %name, priority = %rule.priority, "skipping rule with invalid priority");
                log.record(
                    "rule_skipped",
                    json!({ "skill": name, "reason": "invalid priority", "priority": rule.priority }),
                );
                continue;
            };

            let keywords = triggers
                .keywords
                .iter()
                .filter(|k| !k.trim().is_empty())
                .map(|k| (k.clone(), k.to_lowercase()))
                .collect();

            let patterns = triggers
                .intent_patterns
                .iter()
                .filter_map(|source| match compile_pattern(source) {
                    Ok(re) => Some((source.clone(), re)),
                    Err(e) => {
                        warn!(skill = %name, pattern = %source, error = %e, "skipping invalid intent pattern");
                        log.record(
                            "pattern_invalid",
                            json!({ "skill": name, "pattern": source, "error": e.to_string() }),
                        );
                        None
                    },
                })
                .collect();

            rules.push(CompiledRule {
                name: name.clone(),
                rule: rule.clone(),
                priority,
                keywords,
                patterns,
            });
        }

        Self { rules }
    }

    /// Number of rules that survived compilation.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// One record per matching rule, in document order. Keywords are checked
    /// before intent patterns and the first hit wins.
    pub fn match_prompt(&self, prompt: &str) -> Vec<MatchRecord> {
        let prompt = prompt.trim().to_lowercase();
        if prompt.is_empty() {
            return Vec::new();
        }
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(&prompt))
            .collect()
    }
}
