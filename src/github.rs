//! GitHub REST binding of the repository access port.
//!
//! [`GithubRepository`] talks to the GitHub REST API with a blocking
//! `reqwest` client. Every call waits for the response; requests time out
//! after [`REQUEST_TIMEOUT`].
//!
//! Status handling:
//!
//! - 404 on a branch lookup means the branch does not exist.
//! - 404 on a contents lookup means there are no files at that location.
//! - Any other non-2xx status becomes [`Error::Repository`] carrying the
//!   status and the response body.
//! - Failures to reach the API at all become [`Error::Network`].

use crate::error::{Error, Result};
use crate::repository::{PullRequest, RepositoryAccess, RepositoryFile};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

/// Timeout applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("git-promotion/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct GitReference {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct Comparison {
    ahead_by: usize,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    title: String,
    html_url: String,
}

impl From<PullRequestPayload> for PullRequest {
    fn from(payload: PullRequestPayload) -> Self {
        PullRequest {
            number: payload.number,
            title: payload.title,
            url: payload.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    path: String,
    sha: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<String>,
}

/// The contents endpoint answers with an object for a file and an array for
/// a directory.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Contents {
    File(ContentEntry),
    Directory(Vec<ContentEntry>),
}

/// Splits `https://github.com/<owner>/<repo>` into owner and repository.
fn parse_repository(repo_url: &str) -> Result<(String, String)> {
    let url = Url::parse(repo_url)?;
    let segments: Vec<&str> = url
        .path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    match segments.as_slice() {
        [owner, repo] => Ok((
            owner.to_string(),
            repo.trim_end_matches(".git").to_string(),
        )),
        _ => Err(Error::repository(
            "connect",
            format!("{} does not point to a repository", repo_url),
        )),
    }
}

/// Decodes the base64 payload of the contents API. GitHub wraps it at 60
/// characters.
fn decode_content(path: &str, encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| Error::repository("decode file", format!("{}: {}", path, e)))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::repository("decode file", format!("{}: {}", path, e)))
}

/// A repository on GitHub.
pub struct GithubRepository {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GithubRepository {
    /// Creates a client for the repository behind `repo_url`.
    ///
    /// No request is sent until the first operation.
    pub fn new(api_url: &str, repo_url: &str, token: &str) -> Result<Self> {
        let (owner, repo) = parse_repository(repo_url)?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network {
                url: api_url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner,
            repo,
            token: token.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.owner, self.repo, endpoint
        )
    }

    fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        debug!("sending request to {}", url);
        request
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .send()
            .map_err(|e| Error::Network {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    fn check(response: Response, operation: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(Error::repository(operation, format!("{} {}", status, body)))
    }

    fn parse<T: DeserializeOwned>(response: Response, operation: &str) -> Result<T> {
        response
            .json()
            .map_err(|e| Error::repository(operation, e.to_string()))
    }

    fn contents(&self, branch: &str, location: &str) -> Result<Option<Contents>> {
        let url = self.url(&format!("contents/{}", location));
        let response = self.send(self.client.get(&url).query(&[("ref", branch)]), &url)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response, "list files")?;
        Self::parse(response, "list files").map(Some)
    }

    fn collect_files(
        &self,
        branch: &str,
        location: &str,
        files: &mut Vec<RepositoryFile>,
    ) -> Result<()> {
        match self.contents(branch, location)? {
            None => {}
            Some(Contents::File(entry)) => {
                let content = decode_content(&entry.path, entry.content.as_deref().unwrap_or(""))?;
                files.push(RepositoryFile::new(entry.path, content, entry.sha));
            }
            Some(Contents::Directory(entries)) => {
                for entry in entries {
                    match entry.kind.as_str() {
                        "file" | "dir" => self.collect_files(branch, &entry.path, files)?,
                        other => debug!("skipping {} entry {}", other, entry.path),
                    }
                }
            }
        }
        Ok(())
    }

    fn write_file(&self, body: serde_json::Value, path: &str, operation: &str) -> Result<()> {
        let url = self.url(&format!("contents/{}", path));
        let response = self.send(self.client.put(&url).json(&body), &url)?;
        Self::check(response, operation)?;
        Ok(())
    }
}

impl RepositoryAccess for GithubRepository {
    fn branch_exists(&self, name: &str) -> Result<bool> {
        let url = self.url(&format!("branches/{}", name));
        let response = self.send(self.client.get(&url), &url)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response, "get branch")?;
        Ok(true)
    }

    fn create_branch(&self, from_name: &str, new_name: &str) -> Result<()> {
        let url = self.url(&format!("git/ref/heads/{}", from_name));
        let response = Self::check(self.send(self.client.get(&url), &url)?, "get reference")?;
        let reference: GitReference = Self::parse(response, "get reference")?;

        let url = self.url("git/refs");
        let body = json!({
            "ref": format!("refs/heads/{}", new_name),
            "sha": reference.object.sha,
        });
        let response = self.send(self.client.post(&url).json(&body), &url)?;
        Self::check(response, "create branch")?;
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let url = self.url(&format!("git/refs/heads/{}", name));
        let response = self.send(self.client.delete(&url), &url)?;
        Self::check(response, "delete branch")?;
        Ok(())
    }

    fn compare_commits(&self, base: &str, head: &str) -> Result<usize> {
        let url = self.url(&format!("compare/{}...{}", base, head));
        let response = Self::check(self.send(self.client.get(&url), &url)?, "compare commits")?;
        let comparison: Comparison = Self::parse(response, "compare commits")?;
        debug!(
            "found {} commits in {}/{} from {} to {}",
            comparison.ahead_by, self.owner, self.repo, head, base
        );
        Ok(comparison.ahead_by)
    }

    fn open_pull_request(&self, head: &str, base: &str) -> Result<Option<PullRequest>> {
        let url = self.url("pulls");
        let head_filter = format!("{}:{}", self.owner, head);
        let request = self.client.get(&url).query(&[
            ("state", "open"),
            ("head", head_filter.as_str()),
            ("base", base),
        ]);
        let response = Self::check(self.send(request, &url)?, "list pull requests")?;
        let mut pulls: Vec<PullRequestPayload> = Self::parse(response, "list pull requests")?;
        Ok(if pulls.is_empty() {
            None
        } else {
            Some(pulls.remove(0).into())
        })
    }

    fn create_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        let url = self.url("pulls");
        let payload = json!({
            "title": title,
            "body": body,
            "head": head,
            "base": base,
        });
        let response = self.send(self.client.post(&url).json(&payload), &url)?;
        let response = Self::check(response, "create pull request")?;
        let created: PullRequestPayload = Self::parse(response, "create pull request")?;
        Ok(created.into())
    }

    fn edit_pull_request(&self, pr: &PullRequest, title: &str, body: &str) -> Result<()> {
        let url = self.url(&format!("pulls/{}", pr.number));
        let payload = json!({ "title": title, "body": body });
        let response = self.send(self.client.patch(&url).json(&payload), &url)?;
        Self::check(response, "edit pull request")?;
        Ok(())
    }

    fn list_files(&self, branch: &str, location: &str) -> Result<Vec<RepositoryFile>> {
        let mut files = Vec::new();
        self.collect_files(branch, crate::path::normalize(location), &mut files)?;
        Ok(files)
    }

    fn create_file(&self, branch: &str, path: &str, content: &str) -> Result<()> {
        let body = json!({
            "message": "(build) create file",
            "content": STANDARD.encode(content),
            "branch": branch,
        });
        self.write_file(body, path, "create file")
    }

    fn update_file(&self, branch: &str, current: &RepositoryFile, content: &str) -> Result<()> {
        let body = json!({
            "message": "(build) update file",
            "content": STANDARD.encode(content),
            "branch": branch,
            "sha": current.sha,
        });
        self.write_file(body, &current.path, "update file")
    }

    fn delete_file(&self, branch: &str, current: &RepositoryFile) -> Result<()> {
        let url = self.url(&format!("contents/{}", current.path));
        let body = json!({
            "message": "(build) delete file",
            "branch": branch,
            "sha": current.sha,
        });
        let response = self.send(self.client.delete(&url).json(&body), &url)?;
        Self::check(response, "delete file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repository() {
        assert_eq!(
            parse_repository("https://github.com/acme/deploy-config").unwrap(),
            ("acme".to_string(), "deploy-config".to_string())
        );
        assert_eq!(
            parse_repository("https://github.com/acme/deploy-config.git/").unwrap(),
            ("acme".to_string(), "deploy-config".to_string())
        );
    }

    #[test]
    fn test_parse_repository_rejects_other_shapes() {
        assert!(parse_repository("https://github.com/acme").is_err());
        assert!(parse_repository("https://github.com/acme/repo/tree/main").is_err());
        assert!(matches!(
            parse_repository("not a url"),
            Err(Error::UrlParse(_))
        ));
    }

    #[test]
    fn test_decode_wrapped_content() {
        let encoded = "aW1hZ2U6CiAgdGFnOiAy\nLjUuNQo=\n";
        assert_eq!(
            decode_content("values.yaml", encoded).unwrap(),
            "image:\n  tag: 2.5.5\n"
        );
    }

    #[test]
    fn test_decode_invalid_content() {
        let result = decode_content("values.yaml", "***");
        assert!(matches!(result, Err(Error::Repository { .. })));
    }

    #[test]
    fn test_endpoint_urls() {
        let repo =
            GithubRepository::new("https://api.github.com/", "https://github.com/acme/config", "t")
                .unwrap();
        assert_eq!(repo.owner(), "acme");
        assert_eq!(repo.repo(), "config");
        assert_eq!(
            repo.url("pulls"),
            "https://api.github.com/repos/acme/config/pulls"
        );
    }

    #[test]
    fn test_contents_payload_shapes() {
        let file: Contents = serde_json::from_str(
            r#"{"type":"file","path":"dev/a.yaml","sha":"abc","content":"YQ==\n"}"#,
        )
        .unwrap();
        assert!(matches!(file, Contents::File(ref e) if e.path == "dev/a.yaml"));

        let dir: Contents = serde_json::from_str(
            r#"[{"type":"file","path":"dev/a.yaml","sha":"abc"},{"type":"dir","path":"dev/sub","sha":"def"}]"#,
        )
        .unwrap();
        assert!(matches!(dir, Contents::Directory(ref entries) if entries.len() == 2));
    }
}
