//! Blocking HTTP implementation of the experience client.

use super::{ExperienceClient, ExperienceError, ExperienceRequest, ExperienceResponse, RetryPolicy};
use log::{error, info};
use reqwest::blocking::Client;
use std::time::Duration;
use uuid::Uuid;

/// Posts `{todoId, userId}` to a fixed URL and reads `{experience}` back.
///
/// Must be built and dropped outside an async runtime context; the server
/// only calls it from blocking worker threads.
pub struct HttpExperienceClient {
    client: Client,
    url: String,
    retry: RetryPolicy,
}

impl HttpExperienceClient {
    /// Builds a client with an explicit per-attempt `timeout`.
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, ExperienceError> {
        let url = url.into();
        reqwest::Url::parse(&url)
            .map_err(|err| ExperienceError::Misconfigured(format!("invalid url `{url}`: {err}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ExperienceError::Misconfigured(err.to_string()))?;
        Ok(Self { client, url, retry })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn attempt(&self, request: &ExperienceRequest) -> Result<u32, ExperienceError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExperienceError::Status(status.as_u16()));
        }

        let body: ExperienceResponse = response.json().map_err(|err| {
            if err.is_timeout() {
                ExperienceError::Timeout
            } else {
                ExperienceError::InvalidResponse(err.to_string())
            }
        })?;
        body.into_award()
    }
}

impl ExperienceClient for HttpExperienceClient {
    fn award(&self, todo_id: Uuid) -> Result<u32, ExperienceError> {
        let request = ExperienceRequest::for_todo(todo_id);
        let result = self.retry.run(|_| self.attempt(&request));
        match &result {
            Ok(experience) => info!(
                "event=experience_award module=experience status=ok todo_id={todo_id} experience={experience}"
            ),
            Err(err) => error!(
                "event=experience_award module=experience status=error todo_id={todo_id} kind={} error={err}",
                err.kind()
            ),
        }
        result
    }
}

fn map_send_error(err: reqwest::Error) -> ExperienceError {
    if err.is_timeout() {
        ExperienceError::Timeout
    } else {
        ExperienceError::Transport(err.to_string())
    }
}
