//! HTTP interview requirements validator

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::client::ApiClient;
use crate::application::ports::{
    BackendError, Requirement, RequirementsReport, RequirementsValidator, ValidationFailure,
};
use crate::domain::session::UserSession;

#[derive(Debug, Deserialize)]
struct TestsResponse {
    #[serde(default)]
    tests: Vec<Value>,
}

/// Checks résumé and DISC test remotely, onboarding and LinkedIn locally
pub struct HttpRequirementsValidator {
    api: ApiClient,
}

impl HttpRequirementsValidator {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            api: ApiClient::new(base_url, token),
        }
    }

    async fn has_resume(&self, user_id: &str) -> Result<bool, BackendError> {
        let path = format!("/api/users/{}/curriculo", user_id);
        let response = ApiClient::send(self.api.request(Method::HEAD, &path)).await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_server_error() => Err(BackendError::Server {
                status: s.as_u16(),
                message: "résumé check failed".to_string(),
            }),
            _ => Ok(false),
        }
    }

    async fn has_completed_disc(&self, user_id: &str) -> Result<bool, BackendError> {
        let path = format!(
            "/api/tests/psychological/user/{}?status=completed&limit=1",
            user_id
        );
        let response = ApiClient::send(self.api.request(Method::GET, &path)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let response = ApiClient::check(response).await?;
        let body: TestsResponse = ApiClient::json(response).await?;
        Ok(!body.tests.is_empty())
    }
}

#[async_trait]
impl RequirementsValidator for HttpRequirementsValidator {
    async fn validate(&self, session: &UserSession) -> Result<RequirementsReport, ValidationFailure> {
        let (resume, disc) = tokio::join!(
            self.has_resume(&session.user_id),
            self.has_completed_disc(&session.user_id)
        );
        let resume = resume.map_err(|e| ValidationFailure(e.to_string()))?;
        let disc = disc.map_err(|e| ValidationFailure(e.to_string()))?;

        let mut missing = Vec::new();
        for requirement in Requirement::ALL {
            let met = match requirement {
                Requirement::Resume => resume,
                Requirement::DiscTest => disc,
                Requirement::Onboarding => session.has_completed_onboarding(),
                Requirement::LinkedIn => session.has_linkedin(),
            };
            if !met {
                missing.push(requirement);
            }
        }
        debug!(user = %session.user_id, missing = missing.len(), "requirements checked");

        Ok(RequirementsReport { missing })
    }
}
