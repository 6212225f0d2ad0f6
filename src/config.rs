use secrecy::SecretString;

pub const DEFAULT_API_URL: &str = "https://api.vk.com/method";
pub const DEFAULT_API_VERSION: &str = "5.131";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the VK API. The token is injected from the
/// environment or the command line and never printed.
#[derive(Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub version: String,
    pub access_token: SecretString,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            version: DEFAULT_API_VERSION.to_string(),
            access_token: SecretString::from(access_token.into()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// The account whose friend list seeds the graph.
#[derive(Debug, Clone)]
pub struct CenterUser {
    pub first_name: String,
    pub last_name: String,
}

impl CenterUser {
    /// Excluded endpoint name, in the same "First Last" form as `Friend::name`.
    pub fn excluded_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_token_is_redacted_in_debug() {
        let config = ApiConfig::new("vk1.a.super-secret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert_eq!(config.access_token.expose_secret(), "vk1.a.super-secret");
        assert_eq!(config.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_excluded_name_matches_friend_name_format() {
        let center = CenterUser {
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
        };
        assert_eq!(center.excluded_name(), "Ivan Petrov");
    }
}
