//! Staging of reconstructed item files into the per-branch comparison tree.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::document::CONFIG_FILE;

/// Directory tree mirroring the repository's document layout, holding the
/// annotated item files of one comparison run.
///
/// The tree is named after the project branch with slashes flattened to
/// underscores and wiped at the start of every run.
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
    source_root: PathBuf,
    staged: HashSet<String>,
}

impl StagingArea {
    /// Wipes and recreates the staging directory for `project_branch`.
    pub fn create(source_root: &Path, project_branch: &str) -> Result<Self> {
        let root = source_root.join(project_branch.replace('/', "_"));
        if root.is_dir() {
            fs::remove_dir_all(&root)
                .with_context(|| format!("remove staging directory {}", root.display()))?;
        }
        fs::create_dir_all(&root)
            .with_context(|| format!("create staging directory {}", root.display()))?;
        Ok(StagingArea {
            root,
            source_root: source_root.to_path_buf(),
            staged: HashSet::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensures the document directory and each of its ancestors exists in
    /// the staging area, copying every directory's config from the working
    /// tree the first time it is seen.
    ///
    /// Ancestors without changed files of their own still need their config
    /// staged, otherwise the document tree cannot be reassembled later.
    pub fn ensure_document_chain(&mut self, doc_path: &str) -> Result<()> {
        for dir in ancestor_chain(doc_path) {
            if self.staged.contains(&dir) {
                continue;
            }
            let staged_dir = self.root.join(&dir);
            fs::create_dir_all(&staged_dir)
                .with_context(|| format!("create staged document {}", staged_dir.display()))?;
            let staged_config = staged_dir.join(CONFIG_FILE);
            if !staged_config.is_file() {
                let source_config = self.source_root.join(&dir).join(CONFIG_FILE);
                fs::copy(&source_config, &staged_config).with_context(|| {
                    format!("copy document config {}", source_config.display())
                })?;
            }
            self.staged.insert(dir);
        }
        Ok(())
    }

    /// Writes one reconstructed item file, terminating every line with CRLF.
    pub fn write_item(&self, doc_path: &str, file_name: &str, lines: &[String]) -> Result<()> {
        let mut contents = String::new();
        for line in lines {
            contents.push_str(line);
            contents.push_str("\r\n");
        }
        let path = self.root.join(doc_path).join(file_name);
        fs::write(&path, contents)
            .with_context(|| format!("write staged item {}", path.display()))
    }

    /// Wipes and recreates the published output directory.
    pub fn create_public_dir(&self) -> Result<PathBuf> {
        let public = self.root.join("public");
        if public.is_dir() {
            fs::remove_dir_all(&public)
                .with_context(|| format!("remove publish directory {}", public.display()))?;
        }
        fs::create_dir_all(&public)
            .with_context(|| format!("create publish directory {}", public.display()))?;
        Ok(public)
    }
}

/// Root-down chain of document paths: `a/b/c` yields `a`, `a/b`, `a/b/c`.
/// The empty path names the document at the repository root.
pub fn ancestor_chain(doc_path: &str) -> Vec<String> {
    if doc_path.is_empty() {
        return vec![String::new()];
    }
    let mut chain = Vec::new();
    let mut prefix = String::new();
    for part in doc_path.split('/').filter(|part| !part.is_empty()) {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(part);
        chain.push(prefix.clone());
    }
    chain
}

/// Document directories that received at least one staged file, in the
/// order the patch set produced them.
#[derive(Debug, Default)]
pub struct DocumentSet {
    paths: Vec<String>,
    seen: HashSet<String>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document directory once, keeping first-seen order.
    pub fn register(&mut self, doc_path: &str) {
        if self.seen.insert(doc_path.to_string()) {
            self.paths.push(doc_path.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Registered directories with every missing ancestor inserted ahead of
    /// its descendants, each listed exactly once.
    pub fn with_ancestors(&self) -> Vec<String> {
        let mut ordered = Vec::new();
        let mut seen = HashSet::new();
        for path in &self.paths {
            for ancestor in ancestor_chain(path) {
                if seen.insert(ancestor.clone()) {
                    ordered.push(ancestor);
                }
            }
        }
        ordered
    }
}
