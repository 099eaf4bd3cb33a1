use std::{path::Path, process::Command};

use anyhow::{Context, bail};

/// What we record about the latest commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub files: Vec<String>,
}

impl CommitInfo {
    /// First line of the commit message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// Read `HEAD` of the repository at `repo`.
pub fn head_commit(repo: &Path) -> anyhow::Result<CommitInfo> {
    let sha = git(repo, &["log", "-1", "--pretty=%H"])?;
    let message = git(repo, &["log", "-1", "--pretty=%B"])?;
    let author = git(repo, &["log", "-1", "--pretty=%an"])?;
    let files = git(
        repo,
        &["diff-tree", "--root", "--no-commit-id", "--name-only", "-r", "HEAD"],
    )?;
    Ok(CommitInfo {
        sha,
        message,
        author,
        files: files
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

fn git(repo: &Path, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .context("failed to execute git. Is git installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn run(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .status()
            .expect("spawn git");
        assert!(status.success(), "git {args:?} failed");
    }

    fn repo_with_commit() -> TempDir {
        let dir = TempDir::new().expect("tmp dir");
        let p = dir.path();
        run(p, &["init", "-q"]);
        run(p, &["config", "user.name", "Ada Lovelace"]);
        run(p, &["config", "user.email", "ada@example.com"]);
        run(p, &["config", "commit.gpgsign", "false"]);
        std::fs::write(p.join("a.txt"), "a").unwrap();
        std::fs::create_dir(p.join("src")).unwrap();
        std::fs::write(p.join("src/b.rs"), "fn main() {}").unwrap();
        run(p, &["add", "."]);
        run(p, &["commit", "-q", "-m", "Add engine\n\nWith a longer body."]);
        dir
    }

    #[test]
    fn reads_head_commit() {
        if !git_available() {
            eprintln!("skipping reads_head_commit: git unavailable");
            return;
        }
        let dir = repo_with_commit();
        let info = head_commit(dir.path()).expect("commit info");
        assert_eq!(info.author, "Ada Lovelace");
        assert_eq!(info.subject(), "Add engine");
        assert!(info.message.contains("longer body"));
        assert_eq!(info.sha.len(), 40);
        assert_eq!(info.files, vec!["a.txt", "src/b.rs"]);
    }

    #[test]
    fn reports_failing_command() {
        if !git_available() {
            eprintln!("skipping reports_failing_command: git unavailable");
            return;
        }
        let dir = TempDir::new().expect("tmp dir");
        run(dir.path(), &["init", "-q"]);
        let err = head_commit(dir.path()).unwrap_err();
        assert!(err.to_string().contains("git log -1 --pretty=%H failed"));
    }
}
