//! Area context
//!
//! Short per-area documentation kept under `.uncommit/areas/<area>.md` and
//! handed to the suggester as background. Each doc starts with a header line
//! recording the fingerprint of the area's file list when it was written:
//!
//! ```text
//! <!-- hash:3f2a9c01b7de -->
//! # Area: src_core
//! ...
//! ```
//!
//! A doc is stale when it is missing, has no header, or the area's current
//! file list hashes differently. Generating docs needs a model and lives in
//! the agent layer; this module only maps, walks, caches and compares.

use crate::store::STATE_DIR;
use ignore::WalkBuilder;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory names never walked
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    ".venv",
    "venv",
    "__pycache__",
    "node_modules",
    ".tox",
    ".pytest_cache",
    ".mypy_cache",
    "dist",
    "build",
    "target",
    ".uncommit",
];

/// Extensions counted as area files
pub const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "go", "rs", "java", "c", "cpp", "h", "hpp", "cs", "rb", "php",
    "swift", "kt", "scala", "sh", "bash", "zsh", "yaml", "yml", "json", "toml", "md", "rst", "txt",
];

const SPECIAL_FILES: &[&str] = &["Makefile", "Dockerfile"];

/// Length of the stored fingerprint, in hex chars
pub const FINGERPRINT_LEN: usize = 12;

const HEADER_PREFIX: &str = "<!-- hash:";
const HEADER_SUFFIX: &str = " -->";

/// Separator between area docs in a combined context
pub const DOC_SEPARATOR: &str = "\n\n---\n\n";

/// Maximum walk depth below an area directory
const MAX_DEPTH: usize = 10;

// ============================================================================
// Area
// ============================================================================

/// A slice of the repository that gets its own doc
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Area {
    /// Doc name, e.g. `root`, `src_core`, `tests`
    pub name: String,

    /// Directory relative to the repository root (empty for `root`)
    pub dir: PathBuf,
}

impl Area {
    pub fn root() -> Self {
        Self {
            name: "root".to_string(),
            dir: PathBuf::new(),
        }
    }

    /// Area a repository-relative path belongs to
    pub fn for_path(path: &str) -> Self {
        let parts: Vec<&str> = path
            .trim_start_matches("./")
            .split('/')
            .filter(|p| !p.is_empty())
            .collect();

        match parts.as_slice() {
            [] | [_] => Self::root(),
            ["src", package, _, ..] => Self {
                name: format!("src_{}", sanitize(package)),
                dir: Path::new("src").join(package),
            },
            [first, ..] => Self {
                name: sanitize(first),
                dir: PathBuf::from(first),
            },
        }
    }

    pub fn is_root(&self) -> bool {
        self.dir.as_os_str().is_empty()
    }
}

fn sanitize(name: &str) -> String {
    name.replace(['-', '.'], "_")
}

/// Freshness of one area's cached doc
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaStatus {
    pub area: Area,
    pub files: usize,
    pub fresh: bool,
}

// ============================================================================
// Area Index
// ============================================================================

/// Walks areas and manages their cached docs
#[derive(Debug, Clone)]
pub struct AreaIndex {
    repo_root: PathBuf,
    docs_dir: PathBuf,
}

impl AreaIndex {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        let repo_root = repo_root.into();
        let docs_dir = repo_root.join(STATE_DIR).join("areas");
        Self {
            repo_root,
            docs_dir,
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    /// Distinct areas touched by `paths`, sorted by name
    pub fn areas_for<'a>(&self, paths: impl IntoIterator<Item = &'a str>) -> Vec<Area> {
        let areas: BTreeMap<String, Area> = paths
            .into_iter()
            .map(Area::for_path)
            .map(|a| (a.name.clone(), a))
            .collect();
        areas.into_values().collect()
    }

    /// Code files of an area, repository-relative and sorted
    pub fn area_files(&self, area: &Area) -> Vec<String> {
        let search_dir = self.repo_root.join(&area.dir);
        if !search_dir.is_dir() {
            return Vec::new();
        }
        let depth = if area.is_root() { 1 } else { MAX_DEPTH + 1 };

        let walker = WalkBuilder::new(&search_dir)
            .max_depth(Some(depth))
            .hidden(true)
            .require_git(false)
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                !SKIP_DIRS.contains(&name.as_ref()) && !name.ends_with(".egg-info")
            })
            .build();

        let mut files: Vec<String> = walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .filter(|entry| is_code_file(entry.path()))
            .filter_map(|entry| relative_slash_path(&self.repo_root, entry.path()))
            .collect();
        files.sort();
        files
    }

    /// Fingerprint of an area's current file list
    pub fn fingerprint(&self, area: &Area) -> String {
        fingerprint_of(&self.area_files(area))
    }

    pub fn doc_path(&self, area: &Area) -> PathBuf {
        self.docs_dir.join(format!("{}.md", area.name))
    }

    /// Raw cached doc including its header line
    pub fn load_doc(&self, area: &Area) -> Option<String> {
        std::fs::read_to_string(self.doc_path(area)).ok()
    }

    /// Write a doc body with a header for `fingerprint`
    pub fn save_doc(&self, area: &Area, body: &str, fingerprint: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.docs_dir)?;
        let content = format!("{HEADER_PREFIX}{fingerprint}{HEADER_SUFFIX}\n{body}");
        std::fs::write(self.doc_path(area), content)?;
        debug!("Saved area doc {}", area.name);
        Ok(())
    }

    pub fn is_stale(&self, area: &Area) -> bool {
        match self.load_doc(area).as_deref().and_then(stored_fingerprint) {
            Some(stored) => stored != self.fingerprint(area),
            None => true,
        }
    }

    /// Cached doc without its header, even when stale
    pub fn cached_body(&self, area: &Area) -> Option<String> {
        self.load_doc(area).map(|doc| strip_header(&doc).to_string())
    }

    /// Freshness report for each area
    pub fn status(&self, areas: &[Area]) -> Vec<AreaStatus> {
        areas
            .iter()
            .map(|area| AreaStatus {
                area: area.clone(),
                files: self.area_files(area).len(),
                fresh: !self.is_stale(area),
            })
            .collect()
    }

    /// Combined cached docs of the fresh areas among `areas`
    pub fn fresh_context(&self, areas: &[Area]) -> Option<String> {
        let docs: Vec<String> = areas
            .iter()
            .filter(|area| !self.is_stale(area))
            .filter_map(|area| self.cached_body(area))
            .filter(|body| !body.trim().is_empty())
            .collect();

        if docs.is_empty() {
            None
        } else {
            Some(docs.join(DOC_SEPARATOR))
        }
    }
}

fn is_code_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if SPECIAL_FILES.contains(&name) {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CODE_EXTENSIONS.contains(&ext))
}

fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// First `FINGERPRINT_LEN` hex chars of SHA-256 over the newline-joined list
pub fn fingerprint_of(files: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(files.join("\n").as_bytes());
    let hex = format!("{:064x}", hasher.finalize());
    hex[..FINGERPRINT_LEN].to_string()
}

fn stored_fingerprint(doc: &str) -> Option<&str> {
    let first = doc.lines().next()?;
    first
        .strip_prefix(HEADER_PREFIX)?
        .strip_suffix(HEADER_SUFFIX)
        .filter(|hash| hash.len() == FINGERPRINT_LEN)
}

/// Doc without its fingerprint header line
pub fn strip_header(doc: &str) -> &str {
    if doc.starts_with(HEADER_PREFIX) {
        doc.split_once('\n').map(|(_, rest)| rest).unwrap_or_default()
    } else {
        doc
    }
}
