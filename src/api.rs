use std::time::Duration;

use reqwest::blocking::Client;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// The two capabilities of the social network the collector relies on.
pub trait SocialApi {
    /// Raw friend records of `user`, or of the authenticated account when `None`.
    fn get_neighbors(&self, user: Option<u64>, fields: &[&str]) -> Result<Vec<Value>, ApiError>;

    /// Ids of the friends `source` and `target` have in common.
    fn get_mutual_neighbors(&self, source: u64, target: u64) -> Result<Vec<u64>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct VkErrorBody {
    error_code: i64,
    error_msg: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<T>,
    error: Option<VkErrorBody>,
}

#[derive(Debug, Deserialize)]
struct FriendsPage {
    #[serde(default)]
    items: Vec<Value>,
}

fn unwrap_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    match (envelope.response, envelope.error) {
        (_, Some(err)) => Err(ApiError::Vk {
            code: err.error_code,
            message: err.error_msg,
        }),
        (Some(response), None) => Ok(response),
        (None, None) => Err(ApiError::Vk {
            code: 0,
            message: "empty response".to_string(),
        }),
    }
}

/// Blocking VK API client. The access token travels in the form body so it
/// never appears in a request URL.
pub struct VkClient {
    config: ApiConfig,
    client: Client,
}

impl VkClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), method);
        params.push(("access_token", self.config.access_token.expose_secret().to_string()));
        params.push(("v", self.config.version.clone()));

        debug!("calling {}", method);
        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .map_err(|e| ApiError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| ApiError::Transport(e.without_url()))?;
        unwrap_envelope(&body)
    }

    /// Checks that the token is accepted. Any failure here is fatal for the run.
    pub fn authenticate(&self) -> Result<(), ApiError> {
        self.call::<FriendsPage>("friends.get", vec![("count", "1".to_string())])
            .map(|_| ())
    }
}

impl SocialApi for VkClient {
    fn get_neighbors(&self, user: Option<u64>, fields: &[&str]) -> Result<Vec<Value>, ApiError> {
        let mut params = vec![("fields", fields.join(","))];
        if let Some(id) = user {
            params.push(("user_id", id.to_string()));
        }
        let page: FriendsPage = self.call("friends.get", params)?;
        Ok(page.items)
    }

    fn get_mutual_neighbors(&self, source: u64, target: u64) -> Result<Vec<u64>, ApiError> {
        self.call(
            "friends.getMutual",
            vec![
                ("source_uid", source.to_string()),
                ("target_uid", target.to_string()),
            ],
        )
    }
}
