//! Builder API client.

use crate::config::ApiConfig;
use crate::error::StudioError;
use appcanvas_core::Result;
use appcanvas_preview::AppDefinition;
use tracing::{debug, instrument};

/// Authenticated client for the builder API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, StudioError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("appcanvas-studio/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StudioError::Api {
                details: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn definition_url(&self, app_id: &str) -> String {
        format!("{}/apps/{app_id}/definition", self.base_url)
    }

    /// Fetches an app's definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with an
    /// error status, or the body is not an app definition.
    #[instrument(skip(self))]
    pub async fn fetch_app_definition(&self, app_id: &str) -> Result<AppDefinition, StudioError> {
        let url = self.definition_url(app_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| StudioError::Api {
                details: format!("GET {url}: {e}"),
            })?
            .error_for_status()
            .map_err(|e| StudioError::Api {
                details: e.to_string(),
            })?;

        let app = response
            .json::<AppDefinition>()
            .await
            .map_err(|e| StudioError::Parse {
                what: "app definition",
                details: e.to_string(),
            })?;
        debug!(screens = app.screens.len(), "fetched app definition");
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_url_trims_trailing_slash() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "https://builder.example.com/api/".to_string(),
            token: "t".to_string(),
            app_id: "app_1".to_string(),
        })
        .unwrap();
        assert_eq!(
            client.definition_url("app_1"),
            "https://builder.example.com/api/apps/app_1/definition"
        );
    }
}
