//! API configuration.

use std::path::PathBuf;

use tracing::warn;

/// Default directory scoring artifacts are read from.
const DEFAULT_MODELS_DIR: &str = "models";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size (bounds thumbnail uploads)
    pub max_body_size: usize,
    /// Directory the model artifacts are loaded from
    pub models_dir: PathBuf,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8002,
            cors_origins: vec!["*".to_string()],
            max_body_size: 10 * 1024 * 1024, // 10MB
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8002),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            models_dir: models_dir_from_env(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

/// Resolve the artifact directory, falling back to the default when the
/// override does not point at an existing directory.
fn models_dir_from_env() -> PathBuf {
    match std::env::var("MODELS_DIR") {
        Ok(dir) => {
            let path = PathBuf::from(&dir);
            if path.is_dir() {
                path
            } else {
                warn!(
                    "MODELS_DIR '{}' is not an existing directory, using '{}'",
                    dir, DEFAULT_MODELS_DIR
                );
                PathBuf::from(DEFAULT_MODELS_DIR)
            }
        }
        Err(_) => PathBuf::from(DEFAULT_MODELS_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8002);
        assert_eq!(config.models_dir, PathBuf::from("models"));
        assert!(!config.is_production());
    }
}
