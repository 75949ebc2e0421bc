#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid registry table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("entry {index}: invalid address pattern `{pattern}`")]
    Pattern {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("entry {index}: exactly one of `matchKey` and `matchAddress` is required")]
    Matcher { index: usize },

    #[error("entry {index}: a dropdown needs `options` or a `source` address")]
    Dropdown { index: usize },
}
