//! Ranking matched skills and deciding which get their content injected.

use {serde_json::json, tracing::debug};

use crate::{
    content::ContentLoader,
    discover::ContentSources,
    log::ActivationLog,
    types::MatchRecord,
};

/// Default number of skills whose full content is injected.
pub const DEFAULT_INJECTION_CAP: usize = 3;

/// The ranked outcome of one activation.
#[derive(Debug, Default)]
pub struct Selection {
    /// Critical/high skills with content attached, critical first.
    pub injected: Vec<MatchRecord>,
    /// Critical/high skills left out of injection, named by path.
    pub overflow: Vec<MatchRecord>,
    /// Medium/low skills, named only.
    pub reference: Vec<MatchRecord>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.injected.is_empty() && self.overflow.is_empty() && self.reference.is_empty()
    }

    pub fn len(&self) -> usize {
        self.injected.len() + self.overflow.len() + self.reference.len()
    }
}

/// Partitions matches by priority under a fixed injection cap.
#[derive(Debug, Clone, Copy)]
pub struct Selector {
    cap: usize,
    loader: ContentLoader,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(DEFAULT_INJECTION_CAP, ContentLoader::default())
    }
}

impl Selector {
    pub fn new(cap: usize, loader: ContentLoader) -> Self {
        Self { cap, loader }
    }

    /// Rank `matches` and load content for the injected tier.
    ///
    /// With `sources`, matches whose skill has no content file are dropped
    /// (and logged). Without `sources` nothing is injected and every match is
    /// listed by name. Returns `None` when nothing is left to show.
    pub fn select(
        &self,
        matches: Vec<MatchRecord>,
        sources: Option<&ContentSources>,
        log: &dyn ActivationLog,
    ) -> Option<Selection> {
        let mut resolved = Vec::with_capacity(matches.len());
        for mut record in matches {
            match sources {
                None => resolved.push(record),
                Some(sources) => match sources.get(&record.name) {
                    Some(path) => {
                        record.source = Some(path.to_path_buf());
                        resolved.push(record);
                    },
                    None => {
                        debug!(skill = %record.name, "matched skill has no content file");
                        log.record("skill_unresolved", json!({ "skill": record.name }));
                    },
                },
            }
        }
        if resolved.is_empty() {
            return None;
        }

        let (mut urgent, mut reference): (Vec<_>, Vec<_>) =
            resolved.into_iter().partition(|r| r.priority.is_injectable());
        // Stable: ties keep match order.
        urgent.sort_by_key(|r| r.priority);
        reference.sort_by_key(|r| r.priority);

        let (mut injected, overflow) = if sources.is_some() {
            let overflow = urgent.split_off(self.cap.min(urgent.len()));
            (urgent, overflow)
        } else {
            (Vec::new(), urgent)
        };

        for record in &mut injected {
            if let Some(path) = record.source.as_deref() {
                record.content = Some(self.loader.load(path));
            }
        }

        log.record(
            "selected",
            json!({
                "injected": injected.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
                "overflow": overflow.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
                "reference": reference.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            }),
        );

        Some(Selection {
            injected,
            overflow,
            reference,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            discover::ContentSource,
            log::{MemoryActivationLog, NoopActivationLog},
            types::{MatchKind, Priority, SkillRule},
        },
        std::path::Path,
    };

    fn record(name: &str, priority: Priority) -> MatchRecord {
        MatchRecord {
            name: name.into(),
            kind: MatchKind::Keyword,
            trigger: "kw".into(),
            priority,
            rule: SkillRule::default(),
            source: None,
            content: None,
        }
    }

    fn sources_in(dir: &Path, names: &[&str]) -> ContentSources {
        let mut sources = ContentSources::new();
        for name in names {
            let path = dir.join(name).join("SKILL.md");
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, format!("# {name}\ncontent of {name}\n")).unwrap();
            sources.offer(ContentSource {
                name: (*name).into(),
                path,
                active: false,
            });
        }
        sources
    }

    fn names(records: &[MatchRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn caps_injection_and_orders_critical_first() {
        let tmp = tempfile::tempdir().unwrap();
        let sources = sources_in(tmp.path(), &["h1", "c1", "h2", "c2", "h3"]);
        let matches = vec![
            record("h1", Priority::High),
            record("c1", Priority::Critical),
            record("h2", Priority::High),
            record("c2", Priority::Critical),
            record("h3", Priority::High),
        ];

        let selection = Selector::default()
            .select(matches, Some(&sources), &NoopActivationLog)
            .unwrap();
        assert_eq!(names(&selection.injected), vec!["c1", "c2", "h1"]);
        assert_eq!(names(&selection.overflow), vec!["h2", "h3"]);
        assert!(selection.reference.is_empty());
        for injected in &selection.injected {
            let content = injected.content.as_ref().unwrap();
            assert!(content.text.contains(&format!("content of {}", injected.name)));
        }
        assert!(selection.overflow.iter().all(|r| r.content.is_none()));
        assert!(selection.overflow.iter().all(|r| r.source.is_some()));
    }

    #[test]
    fn medium_and_low_are_never_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        let sources = sources_in(tmp.path(), &["m", "l"]);
        let matches = vec![record("l", Priority::Low), record("m", Priority::Medium)];

        let selection = Selector::default()
            .select(matches, Some(&sources), &NoopActivationLog)
            .unwrap();
        assert!(selection.injected.is_empty());
        assert_eq!(names(&selection.reference), vec!["m", "l"]);
        assert!(selection.reference.iter().all(|r| r.content.is_none()));
    }

    #[test]
    fn unresolved_matches_are_dropped_and_logged() {
        let tmp = tempfile::tempdir().unwrap();
        let sources = sources_in(tmp.path(), &["known"]);
        let log = MemoryActivationLog::default();
        let matches = vec![record("ghost", Priority::Critical), record("known", Priority::Low)];

        let selection = Selector::default().select(matches, Some(&sources), &log).unwrap();
        assert_eq!(selection.len(), 1);
        assert_eq!(names(&selection.reference), vec!["known"]);
        assert!(log.events().contains(&"skill_unresolved".to_string()));
    }

    #[test]
    fn nothing_resolvable_means_nothing_to_render() {
        let sources = ContentSources::new();
        let matches = vec![record("ghost", Priority::High)];
        assert!(
            Selector::default()
                .select(matches, Some(&sources), &NoopActivationLog)
                .is_none()
        );
        assert!(
            Selector::default()
                .select(Vec::new(), None, &NoopActivationLog)
                .is_none()
        );
    }

    #[test]
    fn name_only_mode_lists_everything_without_content() {
        let matches = vec![
            record("m", Priority::Medium),
            record("h", Priority::High),
            record("c", Priority::Critical),
        ];
        let selection = Selector::default()
            .select(matches, None, &NoopActivationLog)
            .unwrap();
        assert!(selection.injected.is_empty());
        assert_eq!(names(&selection.overflow), vec!["c", "h"]);
        assert_eq!(names(&selection.reference), vec!["m"]);
        assert!(selection.overflow.iter().all(|r| r.source.is_none()));
    }

    #[test]
    fn zero_cap_injects_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let sources = sources_in(tmp.path(), &["c"]);
        let selection = Selector::new(0, ContentLoader::default())
            .select(vec![record("c", Priority::Critical)], Some(&sources), &NoopActivationLog)
            .unwrap();
        assert!(selection.injected.is_empty());
        assert_eq!(
            selection.overflow[0].source.as_deref(),
            Some(tmp.path().join("c/SKILL.md").as_path())
        );
    }
}
