use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("life expectancy must be between 1 and {max} years, got {0}", max = crate::model::MAX_LIFE_EXPECTANCY_YEARS)]
    InvalidLifeExpectancy(u32),
    #[error("invalid profile json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be {requirement}")]
    Invalid {
        field: &'static str,
        requirement: &'static str,
    },
}
