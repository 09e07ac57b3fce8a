use thiserror::Error;

#[derive(Error, Debug)]
pub enum PsaError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    MissingPrecondition(String),

    #[error("invalid sort column '{0}'")]
    InvalidSortColumn(String),

    #[error("invalid ticket type '{0}', expected 'error' or 'consulta'")]
    InvalidTicketType(String),

    #[error("invalid date '{0}': {1}")]
    InvalidDate(String, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{service} service returned {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("load for '{0}' was superseded")]
    Cancelled(String),

    #[error("{0}")]
    Other(String),
}

impl PsaError {
    pub fn invalid_sort_column(column: String) -> Self {
        PsaError::InvalidSortColumn(column)
    }

    pub fn invalid_ticket_type(kind: String) -> Self {
        PsaError::InvalidTicketType(kind)
    }

    /// True for transport failures and non-success responses.
    pub fn is_remote(&self) -> bool {
        matches!(self, PsaError::Http(_) | PsaError::Api { .. })
    }
}

pub type Result<T> = std::result::Result<T, PsaError>;
