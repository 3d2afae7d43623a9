use std::{fmt, path::PathBuf};

use {
    serde::{
        Deserialize, Deserializer, Serialize,
        de::{MapAccess, Visitor},
    },
    serde_json::Value,
};

use crate::content::LoadedContent;

// ── Rule document ────────────────────────────────────────────────────────────

/// Precedence tier of a skill. Lower sorts first: `Critical < High < Medium < Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Parse a priority string, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Critical and high skills are eligible for content injection.
    pub fn is_injectable(&self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a skill is for. Informational only, never used for ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Guardrail,
    #[default]
    Domain,
    #[serde(other)]
    Unknown,
}

impl RuleKind {
    /// Any value other than the two known type strings is `Unknown`.
    fn from_value(value: &Value) -> Self {
        match value.as_str() {
            Some("guardrail") => Self::Guardrail,
            Some("domain") => Self::Domain,
            _ => Self::Unknown,
        }
    }
}

/// Conditions under which a prompt activates a skill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTriggers {
    /// Case-insensitive literal substrings.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Case-insensitive regular expressions.
    #[serde(default, rename = "intentPatterns")]
    pub intent_patterns: Vec<String>,
}

impl PromptTriggers {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.intent_patterns.is_empty()
    }
}

/// One entry of the rule document's `skills` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRule {
    #[serde(default, rename = "type", deserialize_with = "lenient_kind")]
    pub kind: RuleKind,
    /// Kept raw so one bad value invalidates only its own rule. Non-string
    /// values are kept in their JSON spelling and never parse.
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "promptTriggers", skip_serializing_if = "Option::is_none")]
    pub triggers: Option<PromptTriggers>,
}

impl SkillRule {
    /// The validated priority, or `None` when the value is not recognised.
    pub fn priority(&self) -> Option<Priority> {
        Priority::parse(&self.priority)
    }
}

/// The parsed rule file: a version tag plus skills in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RuleDocument {
    #[serde(default)]
    pub version: String,
    /// Document order is the tie-break order for ranking. A repeated name
    /// replaces the earlier rule in place.
    #[serde(default, deserialize_with = "ordered_skills")]
    pub skills: Vec<(String, SkillRule)>,
}

impl RuleDocument {
    pub fn get(&self, name: &str) -> Option<&SkillRule> {
        self.skills
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, rule)| rule)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<RuleKind, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| RuleKind::from_value(&value))
}

fn lenient_priority<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => raw,
        other => other.to_string(),
    })
}

fn ordered_skills<'de, D>(deserializer: D) -> Result<Vec<(String, SkillRule)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SkillsVisitor;

    impl<'de> Visitor<'de> for SkillsVisitor {
        type Value = Vec<(String, SkillRule)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of skill name to rule")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut skills: Vec<(String, SkillRule)> =
                Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, rule)) = map.next_entry::<String, SkillRule>()? {
                match skills.iter_mut().find(|(existing, _)| *existing == name) {
                    Some(slot) => slot.1 = rule,
                    None => skills.push((name, rule)),
                }
            }
            Ok(skills)
        }
    }

    deserializer.deserialize_map(SkillsVisitor)
}

// ── Match records ────────────────────────────────────────────────────────────

/// Which trigger family produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Keyword,
    Intent,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword => f.write_str("keyword"),
            Self::Intent => f.write_str("intent"),
        }
    }
}

/// A rule that matched the prompt. Created by the matcher, enriched with a
/// source path and content by the selector, consumed by the renderer.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub name: String,
    pub kind: MatchKind,
    /// The keyword or pattern source that matched.
    pub trigger: String,
    pub priority: Priority,
    pub rule: SkillRule,
    pub source: Option<PathBuf>,
    pub content: Option<LoadedContent>,
}
