use std::{
    collections::HashMap,
    ffi::{OsStr, OsString},
    path::{Component, Path, PathBuf},
};

use {async_trait::async_trait, tracing::debug, walkdir::WalkDir};

use crate::rules::ASSISTANT_DIR;

/// Default file name holding a skill's content.
pub const SKILL_FILE: &str = "SKILL.md";

/// Default path marker for the active install of a skill.
pub const ACTIVE_MARKER: &str = "cache/active";

const DEFAULT_MAX_DEPTH: usize = 12;

/// A skill document found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSource {
    pub name: String,
    pub path: PathBuf,
    /// Whether the path sits under the active-install marker.
    pub active: bool,
}

/// Skill name → content file. At most one source per name.
#[derive(Debug, Clone, Default)]
pub struct ContentSources {
    entries: HashMap<String, ContentSource>,
}

impl ContentSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a discovered file. The first source for a name is kept unless a
    /// later one is active and the kept one is not.
    pub fn offer(&mut self, source: ContentSource) {
        match self.entries.get(&source.name) {
            Some(existing) if existing.active || !source.active => {},
            _ => {
                self.entries.insert(source.name.clone(), source);
            },
        }
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(|s| s.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All sources ordered by skill name.
    pub fn sorted(&self) -> Vec<&ContentSource> {
        let mut sources: Vec<_> = self.entries.values().collect();
        sources.sort_by(|a, b| a.name.cmp(&b.name));
        sources
    }
}

/// Resolves skill names to content files.
#[async_trait]
pub trait ContentLocator: Send + Sync {
    /// Scan the configured roots. Never fails: unreadable parts are skipped.
    async fn locate(&self) -> ContentSources;
}

/// Filesystem locator: walks each root for files named like [`SKILL_FILE`]
/// and names each after its parent directory.
pub struct FsContentLocator {
    /// Roots to scan, in priority order.
    roots: Vec<PathBuf>,
    marker_file: String,
    active_marker: Vec<OsString>,
    max_depth: usize,
}

impl FsContentLocator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            marker_file: SKILL_FILE.into(),
            active_marker: split_marker(ACTIVE_MARKER),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_marker_file(mut self, name: impl Into<String>) -> Self {
        self.marker_file = name.into();
        self
    }

    pub fn with_active_marker(mut self, marker: &str) -> Self {
        self.active_marker = split_marker(marker);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Built-in content roots: project skills, then user skills, then
    /// installed plugins.
    pub fn default_roots(project: &Path, home: Option<&Path>) -> Vec<PathBuf> {
        let mut roots = vec![project.join(ASSISTANT_DIR).join("skills")];
        if let Some(home) = home {
            let user_dir = home.join(ASSISTANT_DIR);
            roots.push(user_dir.join("skills"));
            roots.push(user_dir.join("plugins"));
        }
        roots
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Whether `path` contains the active marker as consecutive components.
    pub fn is_active(&self, path: &Path) -> bool {
        if self.active_marker.is_empty() {
            return false;
        }
        let parts: Vec<&OsStr> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect();
        parts
            .windows(self.active_marker.len())
            .any(|w| w.iter().zip(&self.active_marker).all(|(a, b)| *a == b.as_os_str()))
    }

    /// Walk one root in file-name order so repeated scans of the same tree
    /// agree. Directory links are never followed; unreadable entries are
    /// skipped.
    fn scan_root(&self, root: &Path, sources: &mut ContentSources) {
        let entries = WalkDir::new(root)
            .follow_links(false)
            .max_depth(self.max_depth.saturating_add(1))
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(root = %root.display(), error = %e, "skipping unreadable entry");
                    None
                },
            });

        for entry in entries {
            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            let path = entry.path();
            // Symlinks count only when they resolve to a file.
            if file_type.is_symlink() && !path.is_file() {
                continue;
            }
            if !entry
                .file_name()
                .to_string_lossy()
                .eq_ignore_ascii_case(&self.marker_file)
            {
                continue;
            }
            let Some(name) = skill_name(path) else {
                continue;
            };
            let active = self.is_active(path);
            sources.offer(ContentSource {
                name,
                path: path.to_path_buf(),
                active,
            });
        }
    }
}

#[async_trait]
impl ContentLocator for FsContentLocator {
    async fn locate(&self) -> ContentSources {
        let mut sources = ContentSources::new();
        for root in &self.roots {
            if !root.is_dir() {
                continue;
            }
            self.scan_root(root, &mut sources);
        }
        debug!(roots = self.roots.len(), found = sources.len(), "located skill content");
        sources
    }
}

fn split_marker(marker: &str) -> Vec<OsString> {
    marker
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .map(OsString::from)
        .collect()
}

/// A skill is named after the directory holding its content file.
fn skill_name(path: &Path) -> Option<String> {
    path.parent()?
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}
