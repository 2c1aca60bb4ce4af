use crate::resource::Method;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid text: {0}")]
    Text(#[from] hms_types::TextError),
    #[error("failed to build request url: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP transport failure: {0}")]
    Http(#[from] reqwest::Error),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server responded {status} to {method} {path}")]
    Server {
        status: u16,
        method: Method,
        path: String,
        error_key: Option<String>,
    },
    #[error("empty response body for {method} {path}")]
    EmptyResponse { method: Method, path: String },
    #[error("failed to serialize request body: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize response body: {0}")]
    Deserialization(serde_json::Error),
    #[error("invalid date value: {0}")]
    InvalidDate(String),
    #[error("invalid Link header: {0}")]
    InvalidLinkHeader(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("unknown state: {0}")]
    UnknownState(String),
    #[error("state {0} is already registered")]
    DuplicateState(String),
    #[error("state {0} is abstract and cannot be entered")]
    AbstractState(String),
    #[error("no state matches url: {0}")]
    NoMatchingUrl(String),
    #[error("missing parameter '{0}'")]
    MissingParam(String),
    #[error("invalid value for parameter '{name}': {value}")]
    InvalidParam { name: String, value: String },
    #[error("authentication required to enter {0}")]
    Unauthenticated(String),
    #[error("access denied to {state}: requires one of {required:?}")]
    AccessDenied { state: String, required: Vec<String> },
    #[error("state {0} does not open a modal")]
    NotModal(String),
    #[error("state {state} belongs to {found}, not {expected}")]
    EntityMismatch {
        state: String,
        expected: &'static str,
        found: String,
    },

    #[error("dialog is already closed")]
    DialogClosed,
}

impl AdminError {
    /// True for failures that abort a navigation before any data is fetched.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            AdminError::Unauthenticated(_) | AdminError::AccessDenied { .. }
        )
    }
}

pub type AdminResult<T> = std::result::Result<T, AdminError>;
