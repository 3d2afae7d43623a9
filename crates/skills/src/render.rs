//! Plain-text digest written to stdout for the host assistant.

use std::fmt::Write;

use crate::{select::Selection, types::MatchRecord};

/// Default display cap for skill names in section headers.
pub const DEFAULT_HEADER_WIDTH: usize = 40;

const BANNER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const SEPARATOR: &str = "──────────────────────────────────────────────────";

/// Formats a [`Selection`].
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    header_width: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_WIDTH)
    }
}

impl Renderer {
    pub fn new(header_width: usize) -> Self {
        Self { header_width }
    }

    /// Render the digest, or `None` for an empty selection.
    pub fn render(&self, selection: &Selection) -> Option<String> {
        if selection.is_empty() {
            return None;
        }

        let mut out = String::new();
        let _ = writeln!(out, "{BANNER}");
        let _ = writeln!(out, "SKILL ACTIVATION");
        let _ = writeln!(out, "{BANNER}");

        for record in &selection.injected {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "▶ {} [{} · {}: {}]",
                self.header_name(&record.name),
                record.priority,
                record.kind,
                record.trigger
            );
            match record.content.as_ref().filter(|c| !c.is_empty()) {
                Some(content) => {
                    let _ = writeln!(out, "{}", content.text.trim_end());
                },
                None => {
                    let _ = writeln!(out, "(content unavailable)");
                },
            }
            let _ = writeln!(out, "{SEPARATOR}");
        }

        if !selection.overflow.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "ADDITIONAL HIGH-PRIORITY SKILLS (not injected):");
            for record in &selection.overflow {
                write_entry(&mut out, record);
                if let Some(path) = &record.source {
                    let _ = write!(out, " {}", path.display());
                }
                let _ = writeln!(out);
            }
        }

        if !selection.reference.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "OPTIONAL REFERENCE SKILLS:");
            for record in &selection.reference {
                write_entry(&mut out, record);
                if let Some(description) = record
                    .rule
                    .description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                {
                    let _ = write!(out, " - {description}");
                }
                let _ = writeln!(out);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{BANNER}");
        Some(out)
    }

    /// Upper-cased name, cut to the header width with a trailing ellipsis.
    fn header_name(&self, name: &str) -> String {
        let upper = name.to_uppercase();
        if upper.chars().count() <= self.header_width {
            return upper;
        }
        let mut cut: String = upper
            .chars()
            .take(self.header_width.saturating_sub(1))
            .collect();
        cut.push('…');
        cut
    }
}

fn write_entry(out: &mut String, record: &MatchRecord) {
    let _ = write!(out, "  → {} [{}]", record.name, record.priority);
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            content::LoadedContent,
            types::{MatchKind, Priority, SkillRule},
        },
        std::path::PathBuf,
    };

    fn record(name: &str, priority: Priority) -> MatchRecord {
        MatchRecord {
            name: name.into(),
            kind: MatchKind::Intent,
            trigger: "deploy.*prod".into(),
            priority,
            rule: SkillRule::default(),
            source: Some(PathBuf::from(format!("/skills/{name}/SKILL.md"))),
            content: None,
        }
    }

    #[test]
    fn empty_selection_renders_nothing() {
        assert!(Renderer::default().render(&Selection::default()).is_none());
    }

    #[test]
    fn renders_sections_in_order() {
        let mut injected = record("release-safety", Priority::Critical);
        injected.content = Some(LoadedContent {
            text: "# Release\nCheck the changelog.\n".into(),
            truncated: false,
            total_chars: 31,
        });
        let mut reference = record("style", Priority::Low);
        reference.rule.description = Some("House style notes".into());
        let selection = Selection {
            injected: vec![injected],
            overflow: vec![record("infra", Priority::High)],
            reference: vec![reference],
        };

        let out = Renderer::default().render(&selection).unwrap();
        let header = out.find("▶ RELEASE-SAFETY [critical · intent: deploy.*prod]").unwrap();
        let body = out.find("Check the changelog.").unwrap();
        let overflow = out.find("ADDITIONAL HIGH-PRIORITY SKILLS").unwrap();
        let reference = out.find("OPTIONAL REFERENCE SKILLS").unwrap();
        assert!(header < body && body < overflow && overflow < reference);
        assert!(out.contains("  → infra [high] /skills/infra/SKILL.md"));
        assert!(out.contains("  → style [low] - House style notes"));
        assert!(!out.contains("/skills/style/SKILL.md"));
    }

    #[test]
    fn omits_empty_sections() {
        let selection = Selection {
            reference: vec![record("style", Priority::Medium)],
            ..Selection::default()
        };
        let out = Renderer::default().render(&selection).unwrap();
        assert!(!out.contains("▶"));
        assert!(!out.contains("ADDITIONAL HIGH-PRIORITY"));
        assert!(out.contains("OPTIONAL REFERENCE SKILLS"));
    }

    #[test]
    fn missing_content_is_called_out() {
        let selection = Selection {
            injected: vec![record("gone", Priority::High)],
            ..Selection::default()
        };
        let out = Renderer::default().render(&selection).unwrap();
        assert!(out.contains("(content unavailable)"));
    }

    #[test]
    fn long_names_are_capped_in_headers() {
        let renderer = Renderer::new(8);
        assert_eq!(renderer.header_name("short"), "SHORT");
        assert_eq!(renderer.header_name("very-long-skill-name"), "VERY-LO…");
        assert_eq!(renderer.header_name("exactly8"), "EXACTLY8");
    }
}
