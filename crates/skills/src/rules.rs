//! Rule document lookup and parsing.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    error::{Error, Result},
    types::RuleDocument,
};

/// File name of the rule document.
pub const RULES_FILE: &str = "skill-rules.json";

/// Directory the host assistant keeps per-project and per-user state in.
pub const ASSISTANT_DIR: &str = ".claude";

/// A rule document together with the file it was read from.
#[derive(Debug, Clone)]
pub struct LoadedRules {
    pub path: PathBuf,
    pub document: RuleDocument,
}

/// Loads the rule document from the first candidate file that exists.
#[derive(Debug, Clone)]
pub struct RuleStore {
    /// Candidate files, most specific first.
    candidates: Vec<PathBuf>,
}

impl RuleStore {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// Built-in search order:
    ///
    /// 1. `<project>/.claude/skills/skill-rules.json`
    /// 2. `<project>/.claude/skill-rules.json`
    /// 3. `~/.claude/skill-rules.json`
    /// 4. `~/.claude/skills/skill-rules.json`
    pub fn default_candidates(project: &Path, home: Option<&Path>) -> Vec<PathBuf> {
        let project_dir = project.join(ASSISTANT_DIR);
        let mut candidates = vec![
            project_dir.join("skills").join(RULES_FILE),
            project_dir.join(RULES_FILE),
        ];
        if let Some(home) = home {
            let user_dir = home.join(ASSISTANT_DIR);
            candidates.push(user_dir.join(RULES_FILE));
            candidates.push(user_dir.join("skills").join(RULES_FILE));
        }
        candidates
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// The first candidate that exists as a regular file.
    pub fn find(&self) -> Option<&Path> {
        self.candidates
            .iter()
            .map(PathBuf::as_path)
            .find(|p| p.is_file())
    }

    /// Load the rule document.
    ///
    /// `Ok(None)` means no candidate exists. Once a candidate exists, a read
    /// or parse failure is returned as an error; later candidates are not
    /// tried.
    pub fn load(&self) -> Result<Option<LoadedRules>> {
        let Some(path) = self.find() else {
            debug!(candidates = self.candidates.len(), "no rule file found");
            return Ok(None);
        };

        let raw = std::fs::read_to_string(path).map_err(|source| Error::RuleRead {
            path: path.to_path_buf(),
            source,
        })?;
        let document = parse_document(&raw, path)?;
        debug!(path = %path.display(), skills = document.len(), "loaded rule file");
        Ok(Some(LoadedRules {
            path: path.to_path_buf(),
            document,
        }))
    }
}

/// Parse a rule document. `.yaml`/`.yml` files are YAML, anything else JSON.
pub fn parse_document(raw: &str, path: &Path) -> Result<RuleDocument> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let parsed = match ext {
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| e.to_string()),
        _ => serde_json::from_str(raw).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| Error::RuleParse {
        path: path.to_path_buf(),
        message,
    })
}
