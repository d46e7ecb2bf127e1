//! Git history access: commit enumeration and diff sizing.
//!
//! Walks a repository's history in chronological order and turns each
//! commit into a [`CommitInput`] for the core pipeline, with a diff size
//! computed against the first parent.

use std::path::Path;

use chrono::{DateTime, Utc};
use git2::{Diff, ErrorCode, Repository, Sort};
use punch_core::CommitInput;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("'{0}' is not a git repository")]
    NotARepository(String),
    #[error("invalid filename pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Git(#[from] git2::Error),
}

/// Filename filters applied when sizing a commit's diff. Paths must
/// match `include` (when set) and must not match `ignore`.
#[derive(Debug, Clone, Default)]
pub struct DiffFilter {
    include: Option<Regex>,
    ignore: Option<Regex>,
}

impl DiffFilter {
    pub fn new(include: Option<&str>, ignore: Option<&str>) -> Result<Self, GitError> {
        Ok(Self {
            include: include.map(Regex::new).transpose()?,
            ignore: ignore.map(Regex::new).transpose()?,
        })
    }

    fn accepts(&self, path: &str) -> bool {
        self.include.as_ref().is_none_or(|re| re.is_match(path))
            && !self.ignore.as_ref().is_some_and(|re| re.is_match(path))
    }
}

/// Reads the repository at `path` and returns its commits oldest-first,
/// each with a diff size. An empty (unborn) repository yields an empty
/// list.
pub fn scan_commits(path: &Path, filter: &DiffFilter) -> Result<Vec<CommitInput>, GitError> {
    let repo = Repository::open(path).map_err(|e| {
        if e.code() == ErrorCode::NotFound {
            GitError::NotARepository(path.display().to_string())
        } else {
            GitError::Git(e)
        }
    })?;

    let mut walk = repo.revwalk()?;
    if let Err(e) = walk.push_head() {
        if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound {
            tracing::debug!(path = %path.display(), "repository has no commits yet");
            return Ok(Vec::new());
        }
        return Err(e.into());
    }
    walk.set_sorting(Sort::TIME | Sort::REVERSE)?;

    let mut commits = Vec::new();
    for oid in walk {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;

        // Size against the first parent; the root commit diffs against
        // the empty tree.
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };
        let tree = commit.tree()?;
        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        let diff_size = weigh_diff(&diff, filter)?;

        let timestamp = DateTime::from_timestamp(commit.time().seconds(), 0)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let author = commit.author().email().map(str::to_owned);
        let message = commit
            .message()
            .unwrap_or_default()
            .replace('\n', " ")
            .trim()
            .to_owned();

        commits.push(CommitInput {
            id: oid.to_string(),
            timestamp,
            author,
            message,
            diff_size,
        });
    }

    tracing::debug!(count = commits.len(), "scanned commit history");
    Ok(commits)
}

/// Counts changed lines across the diff, honoring the filename filter.
/// Deletions weigh half as much as additions: they are quicker to make
/// and pair 1:1 with additions when a line changes.
fn weigh_diff(diff: &Diff<'_>, filter: &DiffFilter) -> Result<u64, GitError> {
    let mut additions: u64 = 0;
    let mut deletions: u64 = 0;

    diff.foreach(
        &mut |_, _| true,
        None,
        None,
        Some(&mut |delta, _hunk, line| {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .and_then(Path::to_str);
            let Some(path) = path else { return true };
            if !filter.accepts(path) {
                return true;
            }
            match line.origin() {
                '+' => additions += 1,
                '-' => deletions += 1,
                _ => {}
            }
            true
        }),
    )?;

    Ok(additions + deletions / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Signature, Time};
    use std::fs;
    use tempfile::TempDir;

    const EPOCH: i64 = 1_756_000_000;

    fn commit_file(
        repo: &Repository,
        name: &str,
        content: &str,
        minute: i64,
        message: &str,
    ) -> git2::Oid {
        fs::write(repo.workdir().unwrap().join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let time = Time::new(EPOCH + minute * 60, 0);
        let sig = Signature::new("Dev", "dev@example.com", &time).unwrap();
        let head = repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .map(|oid| repo.find_commit(oid).unwrap());
        let parents: Vec<&git2::Commit> = head.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn scan_returns_commits_oldest_first() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let first = commit_file(&repo, "a.rs", "one\n", 0, "first");
        let second = commit_file(&repo, "b.rs", "two\n", 60, "second");

        let commits = scan_commits(dir.path(), &DiffFilter::default()).unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].id, first.to_string());
        assert_eq!(commits[1].id, second.to_string());
        assert!(commits[0].timestamp < commits[1].timestamp);
        assert_eq!(commits[0].author.as_deref(), Some("dev@example.com"));
    }

    #[test]
    fn diff_size_counts_additions_and_halves_deletions() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.rs", "a\nb\nc\n", 0, "add three lines");
        commit_file(&repo, "a.rs", "a\nx\n", 10, "rewrite");

        let commits = scan_commits(dir.path(), &DiffFilter::default()).unwrap();

        // Root commit adds three lines.
        assert_eq!(commits[0].diff_size, 3);
        // Rewrite: one addition, two deletions -> 1 + 2/2.
        assert_eq!(commits[1].diff_size, 2);
    }

    #[test]
    fn include_filter_limits_which_files_count() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "notes.txt", "a\nb\n", 0, "notes");

        let filter = DiffFilter::new(Some(r"\.rs$"), None).unwrap();
        let commits = scan_commits(dir.path(), &filter).unwrap();

        assert_eq!(commits[0].diff_size, 0);
    }

    #[test]
    fn ignore_filter_excludes_matching_files() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "generated.rs", "a\nb\nc\nd\n", 0, "generated");

        let filter = DiffFilter::new(Some(r"\.rs$"), Some("generated")).unwrap();
        let commits = scan_commits(dir.path(), &filter).unwrap();

        assert_eq!(commits[0].diff_size, 0);
    }

    #[test]
    fn message_newlines_flatten_to_spaces() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.rs", "one\n", 0, "subject\n\nbody text\n");

        let commits = scan_commits(dir.path(), &DiffFilter::default()).unwrap();

        assert_eq!(commits[0].message, "subject  body text");
    }

    #[test]
    fn empty_repository_yields_no_commits() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();

        let commits = scan_commits(dir.path(), &DiffFilter::default()).unwrap();
        assert!(commits.is_empty());
    }

    #[test]
    fn plain_directory_is_not_a_repository() {
        let dir = TempDir::new().unwrap();
        let err = scan_commits(dir.path(), &DiffFilter::default()).unwrap_err();
        assert!(matches!(err, GitError::NotARepository(_)));
    }

    #[test]
    fn bad_pattern_is_rejected() {
        assert!(matches!(
            DiffFilter::new(Some("["), None),
            Err(GitError::Pattern(_))
        ));
    }
}
