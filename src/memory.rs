//! In-memory repository implementation for tests and dry runs
//!
//! [`MemoryRepository`] implements [`RepositoryAccess`] without any network
//! access. Branches hold a file map and a commit history, pull requests are
//! tracked per (head, base) pair, and updates and deletes check the content
//! hash of the file they replace, just like the hosted API does.
//!
//! Clones share their state, so a test can keep one handle for assertions
//! while the code under test works through another one.

use crate::error::{Error, Result};
use crate::path;
use crate::repository::{PullRequest, RepositoryAccess, RepositoryConnector, RepositoryFile};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};

const BASE_URL: &str = "https://github.com/memory/repository";

/// Content hash in the shape of a git object id.
fn content_sha(content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[derive(Debug, Clone, Default)]
struct Branch {
    /// path -> (content, sha)
    files: BTreeMap<String, (String, String)>,
    /// Commit ids, oldest first.
    commits: Vec<u64>,
}

/// A pull request together with the fields only the repository sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    pub pull_request: PullRequest,
    pub head: String,
    pub base: String,
    pub body: String,
    pub open: bool,
}

#[derive(Debug, Default)]
struct State {
    branches: BTreeMap<String, Branch>,
    pull_requests: Vec<PullRequestRecord>,
    next_commit: u64,
    failing_operation: Option<String>,
    operations: Vec<String>,
    connections: Vec<(String, String)>,
}

impl State {
    fn commit(&mut self, branch: &str) -> Result<()> {
        self.next_commit += 1;
        let id = self.next_commit;
        self.branch_mut(branch)?.commits.push(id);
        Ok(())
    }

    fn branch(&self, name: &str) -> Result<&Branch> {
        self.branches
            .get(name)
            .ok_or_else(|| Error::repository("get branch", format!("branch {} not found", name)))
    }

    fn branch_mut(&mut self, name: &str) -> Result<&mut Branch> {
        self.branches
            .get_mut(name)
            .ok_or_else(|| Error::repository("get branch", format!("branch {} not found", name)))
    }

    fn check_sha(&self, branch: &str, current: &RepositoryFile, operation: &str) -> Result<()> {
        match self.branch(branch)?.files.get(path::normalize(&current.path)) {
            None => Err(Error::repository(
                operation,
                format!("file {} not found", current.path),
            )),
            Some((_, sha)) if *sha != current.sha => Err(Error::repository(
                operation,
                format!("{} does not match {}", current.sha, sha),
            )),
            Some(_) => Ok(()),
        }
    }
}

/// Shared, thread-safe in-memory repository.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<State>>,
}

impl MemoryRepository {
    /// Create an empty repository without any branch
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| Error::LockPoisoned {
            context: "memory repository state".to_string(),
        })
    }

    /// Locks the state, failing if `operation` is the injected failure.
    fn begin(&self, operation: &str) -> Result<MutexGuard<'_, State>> {
        let state = self.state()?;
        if state.failing_operation.as_deref() == Some(operation) {
            return Err(Error::repository(operation, "injected failure"));
        }
        Ok(state)
    }

    /// Make every subsequent call of `operation` fail.
    ///
    /// Operation names are the [`RepositoryAccess`] method names, e.g.
    /// `"create_pull_request"`.
    pub fn fail_on(&self, operation: &str) -> Result<()> {
        self.state()?.failing_operation = Some(operation.to_string());
        Ok(())
    }

    /// Create an empty branch with a single commit
    pub fn add_branch(&self, name: &str) -> Result<()> {
        let mut state = self.state()?;
        state.branches.entry(name.to_string()).or_default();
        state.commit(name)
    }

    /// Write a file in its own commit, creating the branch if needed
    pub fn add_file(&self, branch: &str, file_path: &str, content: &str) -> Result<()> {
        let mut state = self.state()?;
        state
            .branches
            .entry(branch.to_string())
            .or_default()
            .files
            .insert(
                path::normalize(file_path).to_string(),
                (content.to_string(), content_sha(content)),
            );
        state.commit(branch)
    }

    pub fn has_branch(&self, name: &str) -> Result<bool> {
        Ok(self.state()?.branches.contains_key(name))
    }

    /// Content of a file, if present
    pub fn file(&self, branch: &str, file_path: &str) -> Result<Option<String>> {
        let state = self.state()?;
        Ok(state
            .branches
            .get(branch)
            .and_then(|b| b.files.get(path::normalize(file_path)))
            .map(|(content, _)| content.clone()))
    }

    /// All files of a branch, in path order
    pub fn files(&self, branch: &str) -> Result<Vec<RepositoryFile>> {
        let state = self.state()?;
        Ok(state
            .branch(branch)?
            .files
            .iter()
            .map(|(p, (content, sha))| RepositoryFile::new(p.as_str(), content.as_str(), sha.as_str()))
            .collect())
    }

    /// Every pull request ever created, open or not
    pub fn pull_requests(&self) -> Result<Vec<PullRequestRecord>> {
        Ok(self.state()?.pull_requests.clone())
    }

    /// Mutating operations performed through [`RepositoryAccess`], in order
    pub fn operations(&self) -> Result<Vec<String>> {
        Ok(self.state()?.operations.clone())
    }

    /// (repo url, token) pairs this repository was connected with
    pub fn connections(&self) -> Result<Vec<(String, String)>> {
        Ok(self.state()?.connections.clone())
    }
}

impl RepositoryAccess for MemoryRepository {
    fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.begin("branch_exists")?.branches.contains_key(name))
    }

    fn create_branch(&self, from_name: &str, new_name: &str) -> Result<()> {
        let mut state = self.begin("create_branch")?;
        if state.branches.contains_key(new_name) {
            return Err(Error::repository(
                "create_branch",
                format!("reference {} already exists", new_name),
            ));
        }
        let copy = state.branch(from_name)?.clone();
        state.branches.insert(new_name.to_string(), copy);
        state
            .operations
            .push(format!("create branch {} from {}", new_name, from_name));
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let mut state = self.begin("delete_branch")?;
        if state.branches.remove(name).is_none() {
            return Err(Error::repository(
                "delete_branch",
                format!("branch {} not found", name),
            ));
        }
        state.operations.push(format!("delete branch {}", name));
        Ok(())
    }

    fn compare_commits(&self, base: &str, head: &str) -> Result<usize> {
        let state = self.begin("compare_commits")?;
        let base_commits: HashSet<u64> = state.branch(base)?.commits.iter().copied().collect();
        Ok(state
            .branch(head)?
            .commits
            .iter()
            .filter(|id| !base_commits.contains(id))
            .count())
    }

    fn open_pull_request(&self, head: &str, base: &str) -> Result<Option<PullRequest>> {
        let state = self.begin("open_pull_request")?;
        Ok(state
            .pull_requests
            .iter()
            .find(|r| r.open && r.head == head && r.base == base)
            .map(|r| r.pull_request.clone()))
    }

    fn create_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        let mut state = self.begin("create_pull_request")?;
        state.branch(head)?;
        state.branch(base)?;
        if state
            .pull_requests
            .iter()
            .any(|r| r.open && r.head == head && r.base == base)
        {
            return Err(Error::repository(
                "create_pull_request",
                format!("a pull request for {} into {} already exists", head, base),
            ));
        }
        let number = state.pull_requests.len() as u64 + 1;
        let pull_request = PullRequest {
            number,
            title: title.to_string(),
            url: format!("{}/pull/{}", BASE_URL, number),
        };
        state.pull_requests.push(PullRequestRecord {
            pull_request: pull_request.clone(),
            head: head.to_string(),
            base: base.to_string(),
            body: body.to_string(),
            open: true,
        });
        state
            .operations
            .push(format!("create pull request {} into {}", head, base));
        Ok(pull_request)
    }

    fn edit_pull_request(&self, pr: &PullRequest, title: &str, body: &str) -> Result<()> {
        let mut state = self.begin("edit_pull_request")?;
        let record = state
            .pull_requests
            .iter_mut()
            .find(|r| r.pull_request.number == pr.number)
            .ok_or_else(|| {
                Error::repository(
                    "edit_pull_request",
                    format!("pull request #{} not found", pr.number),
                )
            })?;
        record.pull_request.title = title.to_string();
        record.body = body.to_string();
        state
            .operations
            .push(format!("edit pull request #{}", pr.number));
        Ok(())
    }

    fn list_files(&self, branch: &str, location: &str) -> Result<Vec<RepositoryFile>> {
        let state = self.begin("list_files")?;
        Ok(state
            .branch(branch)?
            .files
            .iter()
            .filter(|(p, _)| path::is_within(p, location))
            .map(|(p, (content, sha))| RepositoryFile::new(p.as_str(), content.as_str(), sha.as_str()))
            .collect())
    }

    fn create_file(&self, branch: &str, file_path: &str, content: &str) -> Result<()> {
        let mut state = self.begin("create_file")?;
        let key = path::normalize(file_path).to_string();
        let target = state.branch_mut(branch)?;
        if target.files.contains_key(&key) {
            return Err(Error::repository(
                "create_file",
                format!("file {} already exists", key),
            ));
        }
        target
            .files
            .insert(key.clone(), (content.to_string(), content_sha(content)));
        state.commit(branch)?;
        state
            .operations
            .push(format!("create file {}@{}", key, branch));
        Ok(())
    }

    fn update_file(&self, branch: &str, current: &RepositoryFile, content: &str) -> Result<()> {
        let mut state = self.begin("update_file")?;
        state.check_sha(branch, current, "update_file")?;
        let key = path::normalize(&current.path).to_string();
        state
            .branch_mut(branch)?
            .files
            .insert(key.clone(), (content.to_string(), content_sha(content)));
        state.commit(branch)?;
        state
            .operations
            .push(format!("update file {}@{}", key, branch));
        Ok(())
    }

    fn delete_file(&self, branch: &str, current: &RepositoryFile) -> Result<()> {
        let mut state = self.begin("delete_file")?;
        state.check_sha(branch, current, "delete_file")?;
        let key = path::normalize(&current.path).to_string();
        state.branch_mut(branch)?.files.remove(&key);
        state.commit(branch)?;
        state
            .operations
            .push(format!("delete file {}@{}", key, branch));
        Ok(())
    }
}

/// Hands out handles to the same in-memory repository for every URL.
impl RepositoryConnector for MemoryRepository {
    fn connect(&self, repo_url: &str, token: &str) -> Result<Box<dyn RepositoryAccess>> {
        self.begin("connect")?
            .connections
            .push((repo_url.to_string(), token.to_string()));
        Ok(Box::new(self.clone()))
    }
}
