//! Top-level branch comparison pipeline.
//!
//! Reads the diff between the main and project branches, reconstructs every
//! changed requirement file with change decorations, stages the files whose
//! changes are normative, and publishes the staged tree as a static page.

use std::env;

use anyhow::{Context, Result};
use log::info;
use unidiff::PatchSet;

use crate::application::annotate::FileAnnotator;
use crate::application::config::ProjectConfig;
use crate::application::publish;
use crate::domain::document::Tree;
use crate::domain::item::{Item, ItemFormat};
use crate::infra::staging::{DocumentSet, StagingArea};
use crate::infra::vcs;

/// Runs a full comparison of `project_branch` against `main_branch` from the
/// current working directory.
pub fn run_project(
    config: &ProjectConfig,
    main_branch: &str,
    project_branch: &str,
) -> Result<()> {
    let repo = env::current_dir().context("failed to resolve working directory")?;
    info!("running in {}", repo.display());

    vcs::check_active_branch(&repo, project_branch)?;
    vcs::check_branch_fastforward(&repo, main_branch, project_branch)?;
    let patch_set = vcs::read_branch_diff(&repo, main_branch, project_branch)?;

    let mut staging = StagingArea::create(&repo, project_branch)?;
    let documents = process_patch_set(config, &patch_set, &mut staging)?;
    if documents.is_empty() {
        info!("no modified requirement items found");
        return Ok(());
    }

    let tree = Tree::load(staging.root(), &documents.with_ancestors())?;
    let public_dir = staging.create_public_dir()?;
    publish::publish_project(config, &tree, project_branch, &public_dir)?;
    info!("published comparison to {}", public_dir.display());
    Ok(())
}

/// Annotates every patched file and stages the ones with normative changes.
///
/// The document chain is staged for every patched file, normative or not, so
/// intermediate documents keep their configs even when all their own changes
/// turn out to be non-normative.
fn process_patch_set(
    config: &ProjectConfig,
    patch_set: &PatchSet,
    staging: &mut StagingArea,
) -> Result<DocumentSet> {
    let mut documents = DocumentSet::new();
    for file in patch_set.files() {
        let rel_path = vcs::patched_path(file);
        info!("processing {rel_path}");
        let format = ItemFormat::from_path(&rel_path)?;
        let (doc_path, file_name) = split_item_path(&rel_path);
        staging.ensure_document_chain(doc_path)?;

        // Overview prose is published without per-line decorations.
        let decorate = !doc_name(doc_path).eq_ignore_ascii_case(&config.overview_document);
        let annotated =
            FileAnnotator::new(config, format, decorate, file.is_removed_file()).annotate(file);
        if !annotated.normative_change {
            continue;
        }
        validate_reconstruction(format, file_name, &annotated.lines)
            .with_context(|| format!("reconstructed {rel_path} failed to parse"))?;
        staging.write_item(doc_path, file_name, &annotated.lines)?;
        documents.register(doc_path);
    }
    Ok(documents)
}

/// Parses the annotated text back into an item, proving the reconstruction
/// is still structurally valid before it reaches the published tree.
fn validate_reconstruction(format: ItemFormat, file_name: &str, lines: &[String]) -> Result<Item> {
    let uid = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    let item = Item::load(uid, format, &lines.join("\n"))?;
    Ok(item)
}

/// Splits an item path into its document directory and file name.
fn split_item_path(rel_path: &str) -> (&str, &str) {
    match rel_path.rsplit_once('/') {
        Some((doc_path, file_name)) => (doc_path, file_name),
        None => ("", rel_path),
    }
}

/// Last path component of a document directory.
fn doc_name(doc_path: &str) -> &str {
    doc_path.rsplit_once('/').map_or(doc_path, |(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    use crate::domain::document::CONFIG_FILE;

    fn seed_document(root: &Path, doc_path: &str, prefix: &str) {
        let dir = root.join(doc_path);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(CONFIG_FILE),
            format!("settings:\n  prefix: {prefix}\n"),
        )
        .unwrap();
    }

    fn parse(diff: &str) -> PatchSet {
        let mut patch_set = PatchSet::new();
        patch_set.parse(diff).unwrap();
        patch_set
    }

    #[test]
    fn test_split_item_path() {
        assert_eq!(split_item_path("reqs/req/REQ001.yml"), ("reqs/req", "REQ001.yml"));
        assert_eq!(split_item_path("REQ001.yml"), ("", "REQ001.yml"));
    }

    #[test]
    fn test_doc_name_is_last_component() {
        assert_eq!(doc_name("reqs/ovr"), "ovr");
        assert_eq!(doc_name("reqs"), "reqs");
        assert_eq!(doc_name(""), "");
    }

    #[test]
    fn test_normative_change_is_staged_with_decorations() {
        let dir = tempdir().unwrap();
        seed_document(dir.path(), "reqs", "OVR");
        seed_document(dir.path(), "reqs/req", "REQ");
        let mut staging = StagingArea::create(dir.path(), "project/widget").unwrap();
        let patch_set = parse(
            "\
--- reqs/req/REQ001.yml
+++ reqs/req/REQ001.yml
@@ -1,5 +1,5 @@
 active: true
 level: 1.1
 normative: true
 text: |
-  The widget shall spin.
+  The widget shall rotate.
",
        );

        let config = ProjectConfig::default();
        let documents = process_patch_set(&config, &patch_set, &mut staging).unwrap();
        assert_eq!(documents.with_ancestors(), vec!["reqs", "reqs/req"]);
        assert!(staging.root().join("reqs").join(CONFIG_FILE).is_file());

        let staged = fs::read_to_string(staging.root().join("reqs/req/REQ001.yml")).unwrap();
        assert_eq!(
            staged,
            "active: true\r\n\
             level: 1.1\r\n\
             normative: true\r\n\
             text: |\r\n\
             \x20 <span style=\"color:red\"><del>The widget shall spin.</del></span>\r\n\
             \x20 <span style=\"color:blue\">The widget shall rotate.</span>\r\n"
        );
    }

    #[test]
    fn test_non_normative_change_is_skipped() {
        let dir = tempdir().unwrap();
        seed_document(dir.path(), "reqs", "OVR");
        seed_document(dir.path(), "reqs/req", "REQ");
        let mut staging = StagingArea::create(dir.path(), "project/widget").unwrap();
        let patch_set = parse(
            "\
--- reqs/req/REQ002.yml
+++ reqs/req/REQ002.yml
@@ -1,3 +1,3 @@
 level: 1.1
-reviewed: uUkxBTH
+reviewed: Fz2blQs
 text: |
",
        );

        let config = ProjectConfig::default();
        let documents = process_patch_set(&config, &patch_set, &mut staging).unwrap();
        assert!(documents.is_empty());
        assert!(!staging.root().join("reqs/req/REQ002.yml").exists());
        // The document chain is still staged for later patched files.
        assert!(staging.root().join("reqs/req").join(CONFIG_FILE).is_file());
    }

    #[test]
    fn test_overview_document_is_staged_without_decorations() {
        let dir = tempdir().unwrap();
        seed_document(dir.path(), "reqs", "ROOT");
        seed_document(dir.path(), "reqs/ovr", "OVR");
        let mut staging = StagingArea::create(dir.path(), "project/widget").unwrap();
        let patch_set = parse(
            "\
--- reqs/ovr/OVR001.yml
+++ reqs/ovr/OVR001.yml
@@ -1,3 +1,3 @@
 level: 1.0
 text: |
-  Old overview prose.
+  New overview prose.
",
        );

        let config = ProjectConfig::default();
        let documents = process_patch_set(&config, &patch_set, &mut staging).unwrap();
        assert_eq!(documents.with_ancestors(), vec!["reqs", "reqs/ovr"]);

        let staged = fs::read_to_string(staging.root().join("reqs/ovr/OVR001.yml")).unwrap();
        assert_eq!(staged, "level: 1.0\r\ntext: |\r\n  New overview prose.\r\n");
    }

    #[test]
    fn test_unknown_extension_is_fatal() {
        let dir = tempdir().unwrap();
        seed_document(dir.path(), "reqs", "REQ");
        let mut staging = StagingArea::create(dir.path(), "project/widget").unwrap();
        let patch_set = parse(
            "--- reqs/notes.txt\n+++ reqs/notes.txt\n@@ -1,1 +1,1 @@\n-a\n+b\n",
        );

        let config = ProjectConfig::default();
        let err = process_patch_set(&config, &patch_set, &mut staging).unwrap_err();
        assert!(err.to_string().contains("not valid"));
    }
}
