//! GitHub REST client
//!
//! Covers the read paths the repair loop needs: a workflow run, its jobs and
//! job logs, and the repository's pull requests (the repair history).

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{ApiErrorBody, ApiJob, JobsPage, RepairRecord, WorkflowRun};
use super::{CiPlatform, ClientError, RepairHistory};
use crate::config::{Credentials, GitHubConfig};

const API_VERSION: &str = "2022-11-28";

/// Longest error body echoed back in an error message
const MAX_ERROR_BODY_LEN: usize = 200;

#[derive(Debug)]
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
    per_page: u32,
}

impl GitHubClient {
    /// `repository` is `owner/name`.
    pub fn new(config: &GitHubConfig, repository: &str, token: String) -> Result<Self, ClientError> {
        let (owner, repo) = parse_repository(repository)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner,
            repo,
            token,
            per_page: config.per_page,
        })
    }

    /// Build a client with the token taken from `GITHUB_TOKEN`.
    pub fn from_env(config: &GitHubConfig, repository: &str) -> Result<Self, ClientError> {
        let token = Credentials::github_token()?;
        Self::new(config, repository, token)
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url,
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("Bearer {}", self.token))
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| truncate_body(&body));
        Err(ClientError::HttpError {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        debug!("GET {}", url);
        let response = self.send(self.get(url).query(query)).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl CiPlatform for GitHubClient {
    async fn get_run(&self, run_id: u64) -> Result<WorkflowRun, ClientError> {
        let url = self.repo_url(&format!("actions/runs/{}", run_id));
        self.get_json(&url, &[]).await
    }

    async fn get_jobs(&self, run_id: u64) -> Result<Vec<ApiJob>, ClientError> {
        let url = self.repo_url(&format!("actions/runs/{}/jobs", run_id));
        let mut jobs = Vec::new();
        let mut page = 1u32;

        loop {
            let batch: JobsPage = self
                .get_json(
                    &url,
                    &[
                        ("per_page", self.per_page.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;

            let received = batch.jobs.len();
            jobs.extend(batch.jobs);

            if received == 0 || jobs.len() as u64 >= batch.total_count {
                break;
            }
            page += 1;
        }

        Ok(jobs)
    }

    async fn get_job_logs(&self, job_id: u64) -> Result<String, ClientError> {
        // Answers with a redirect to short-lived blob storage; reqwest follows
        // it and drops the Authorization header on the cross-origin hop.
        let url = self.repo_url(&format!("actions/jobs/{}/logs", job_id));
        debug!("GET {}", url);
        let response = self.send(self.get(&url)).await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl RepairHistory for GitHubClient {
    async fn list_records(&self, page: u32) -> Result<Vec<RepairRecord>, ClientError> {
        let url = self.repo_url("pulls");
        self.get_json(
            &url,
            &[
                ("state", "all".to_string()),
                ("sort", "created".to_string()),
                ("direction", "desc".to_string()),
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }
}

fn parse_repository(repository: &str) -> Result<(String, String), ClientError> {
    let mut parts = repository.trim().splitn(2, '/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo))
            if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
        {
            Ok((owner.to_string(), repo.trim_end_matches(".git").to_string()))
        }
        _ => Err(ClientError::InvalidRepository(repository.to_string())),
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LEN {
        let cut: String = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        format!("{}... (truncated)", cut)
    } else {
        body.to_string()
    }
}
