//! One activation, end to end: prompt → rules → matches → selection → text.

use std::{path::Path, sync::Arc};

use {
    serde_json::json,
    skillcue_common::hooks::HookInput,
    skillcue_config::SkillcueConfig,
    tracing::debug,
};

use crate::{
    content::ContentLoader,
    discover::{ContentLocator, FsContentLocator},
    error::Result,
    log::ActivationLog,
    matcher::Matcher,
    render::Renderer,
    rules::RuleStore,
    select::Selector,
};

/// The skill activation pipeline.
///
/// Without a locator the pipeline runs in name-only mode: matched skills are
/// listed but no content is injected.
pub struct ActivationPipeline {
    rules: RuleStore,
    locator: Option<Box<dyn ContentLocator>>,
    selector: Selector,
    renderer: Renderer,
    log: Arc<dyn ActivationLog>,
}

impl ActivationPipeline {
    pub fn new(rules: RuleStore, log: Arc<dyn ActivationLog>) -> Self {
        Self {
            rules,
            locator: None,
            selector: Selector::default(),
            renderer: Renderer::default(),
            log,
        }
    }

    pub fn with_locator(mut self, locator: Box<dyn ContentLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Build from configuration.
    ///
    /// Content roots that do not exist are dropped; if none remain, or
    /// content is disabled, the pipeline runs in name-only mode.
    pub fn from_config(
        config: &SkillcueConfig,
        project: &Path,
        home: Option<&Path>,
        log: Arc<dyn ActivationLog>,
    ) -> Self {
        let candidates = match config.rule_paths(home) {
            paths if paths.is_empty() => RuleStore::default_candidates(project, home),
            paths => paths,
        };

        let activation = &config.activation;
        let mut pipeline = Self::new(RuleStore::new(candidates), log)
            .with_selector(Selector::new(
                activation.injection_cap,
                ContentLoader::new(activation.content_budget),
            ))
            .with_renderer(Renderer::new(activation.header_width));

        if config.content.enabled {
            let roots: Vec<_> = match config.content_roots(home) {
                roots if roots.is_empty() => FsContentLocator::default_roots(project, home),
                roots => roots,
            }
            .into_iter()
            .filter(|root| root.is_dir())
            .collect();

            if roots.is_empty() {
                debug!("no content roots available, listing skill names only");
            } else {
                pipeline = pipeline.with_locator(Box::new(
                    FsContentLocator::new(roots)
                        .with_marker_file(config.content.marker_file.clone())
                        .with_active_marker(&config.content.active_marker)
                        .with_max_depth(config.content.max_depth),
                ));
            }
        }

        pipeline
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Whether matched skills get content injected.
    pub fn injects_content(&self) -> bool {
        self.locator.is_some()
    }

    /// Run against a hook payload. `Ok(None)` means there is nothing to say.
    pub async fn run(&self, input: &HookInput) -> Result<Option<String>> {
        match input.prompt() {
            Some(prompt) => self.run_prompt(prompt).await,
            None => {
                self.log.record("prompt_empty", json!({}));
                Ok(None)
            },
        }
    }

    /// Run against a raw prompt.
    ///
    /// The only error is a rule file that exists but cannot be read or
    /// parsed; every other problem degrades to less output.
    pub async fn run_prompt(&self, prompt: &str) -> Result<Option<String>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            self.log.record("prompt_empty", json!({}));
            return Ok(None);
        }

        let loaded = match self.rules.load() {
            Ok(Some(loaded)) => loaded,
            Ok(None) => {
                self.log.record(
                    "rules_absent",
                    json!({ "candidates": self.rules.candidates() }),
                );
                return Ok(None);
            },
            Err(e) => {
                self.log
                    .record("rules_invalid", json!({ "error": e.to_string() }));
                return Err(e);
            },
        };

        let matcher = Matcher::compile(&loaded.document, self.log.as_ref());
        let matches = matcher.match_prompt(prompt);
        self.log.record(
            "matched",
            json!({
                "rules": loaded.path,
                "active_rules": matcher.len(),
                "matches": matches
                    .iter()
                    .map(|m| json!({ "skill": m.name, "kind": m.kind, "trigger": m.trigger }))
                    .collect::<Vec<_>>(),
            }),
        );
        if matches.is_empty() {
            return Ok(None);
        }

        let sources = match &self.locator {
            Some(locator) => Some(locator.locate().await),
            None => None,
        };
        let Some(selection) = self
            .selector
            .select(matches, sources.as_ref(), self.log.as_ref())
        else {
            return Ok(None);
        };

        debug!(
            injected = selection.injected.len(),
            overflow = selection.overflow.len(),
            reference = selection.reference.len(),
            "rendering skill digest"
        );
        Ok(self.renderer.render(&selection))
    }
}
