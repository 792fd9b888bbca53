use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub data_api_url: String,
    pub data_api_key: String,
    pub server_host: String,
    pub server_port: u16,
    pub admin_api_token: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let data_api_url = env::var("DATA_API_URL").map_err(|_| ConfigError::MissingDataApiUrl)?;

        let data_api_key = env::var("DATA_API_KEY").map_err(|_| ConfigError::MissingDataApiKey)?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let admin_api_token =
            env::var("ADMIN_API_TOKEN").map_err(|_| ConfigError::MissingAdminToken)?;

        Ok(Config {
            data_api_url,
            data_api_key,
            server_host,
            server_port,
            admin_api_token,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATA_API_URL environment variable not set")]
    MissingDataApiUrl,

    #[error("DATA_API_KEY environment variable not set")]
    MissingDataApiKey,

    #[error("ADMIN_API_TOKEN environment variable not set")]
    MissingAdminToken,

    #[error("Invalid port number")]
    InvalidPort,
}
