//! Git plumbing for branch comparison.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use log::warn;
use unidiff::{PatchSet, PatchedFile};

/// Returns the checked-out branch name, empty when HEAD is detached.
fn active_branch(repo: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(["-C", &repo.to_string_lossy(), "symbolic-ref", "--short", "-q", "HEAD"])
        .output()
        .context("failed to run git symbolic-ref")?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.contains("fatal") {
        bail!("error getting active branch: {}", stderr.trim());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Fails unless the project branch is checked out.
///
/// Document configs are staged from the working tree, so comparing while
/// another branch is active would mix the branches' content.
pub fn check_active_branch(repo: &Path, project_branch: &str) -> Result<()> {
    let active = active_branch(repo)?;
    if !active.contains(project_branch) {
        bail!(
            "must check out the branch to compare {project_branch} (active branch is '{active}')"
        );
    }
    Ok(())
}

/// Warns when the main branch can no longer fast-forward onto the project
/// branch. The comparison still runs, it may just be stale until a rebase.
pub fn check_branch_fastforward(
    repo: &Path,
    main_branch: &str,
    project_branch: &str,
) -> Result<bool> {
    let status = Command::new("git")
        .args([
            "-C",
            &repo.to_string_lossy(),
            "merge-base",
            "--is-ancestor",
            main_branch,
            project_branch,
        ])
        .status()
        .context("failed to run git merge-base --is-ancestor")?;
    if !status.success() {
        warn!(
            "branch {main_branch} can not be fast-forwarded to {project_branch}, \
             comparison may not be accurate until rebased"
        );
        return Ok(false);
    }
    Ok(true)
}

/// Newest common ancestor of the two branches.
///
/// Basing the diff on the merge base keeps the comparison valid even after
/// the project branch was merged back, as long as the merge left the branch
/// as a spur in the history graph.
fn merge_base(repo: &Path, project_branch: &str, main_branch: &str) -> Result<String> {
    let output = Command::new("git")
        .args([
            "-C",
            &repo.to_string_lossy(),
            "merge-base",
            project_branch,
            main_branch,
        ])
        .output()
        .context("failed to run git merge-base")?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.contains("fatal") {
        bail!("error resolving merge base: {}", stderr.trim());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Reads the full branch diff as a parsed patch set.
///
/// The context window is oversized so each patched file arrives as a single
/// hunk and the annotator sees every unchanged line of the file.
pub fn read_branch_diff(
    repo: &Path,
    main_branch: &str,
    project_branch: &str,
) -> Result<PatchSet> {
    let base_commit = merge_base(repo, project_branch, main_branch)?;
    let output = Command::new("git")
        .args([
            "-C",
            &repo.to_string_lossy(),
            "diff",
            "--no-prefix",
            "-U10000",
            &base_commit,
            project_branch,
        ])
        .output()
        .context("failed to run git diff")?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.contains("fatal") {
        bail!("error reading branch diff: {}", stderr.trim());
    }
    let diff_text = String::from_utf8_lossy(&output.stdout).to_string();
    let mut patch_set = PatchSet::new();
    patch_set
        .parse(&diff_text)
        .context("failed to parse branch diff")?;
    Ok(patch_set)
}

/// Path of a patched file relative to the repository root.
///
/// Deleted files only carry a real source path and added files only a real
/// target path. Prefixes are stripped for diffs produced without
/// `--no-prefix`.
pub fn patched_path(file: &PatchedFile) -> String {
    let raw = if file.source_file == "/dev/null" {
        &file.target_file
    } else {
        &file.source_file
    };
    raw.strip_prefix("a/")
        .or_else(|| raw.strip_prefix("b/"))
        .unwrap_or(raw)
        .to_string()
}
