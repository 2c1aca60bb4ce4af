//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the resource
//! client, the notification channel and the state registry. Nothing below this module
//! reads environment variables.

use crate::constants::DEFAULT_PAGE_SIZE;
use crate::{AdminError, AdminResult};
use hms_types::NonEmptyText;
use url::Url;

/// Client configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    api_base_url: Url,
    app_name: NonEmptyText,
    page_size: u32,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The base URL must be an absolute `http`/`https` URL. A trailing slash is added when
    /// missing so that resource paths join underneath it rather than replacing its last
    /// segment.
    pub fn new(api_base_url: &str, app_name: NonEmptyText, page_size: u32) -> AdminResult<Self> {
        let mut api_base_url = Url::parse(api_base_url.trim())?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(AdminError::InvalidConfig(format!(
                "api base url must use http or https, got {}",
                api_base_url.scheme()
            )));
        }
        if !api_base_url.path().ends_with('/') {
            let path = format!("{}/", api_base_url.path());
            api_base_url.set_path(&path);
        }

        if page_size == 0 {
            return Err(AdminError::InvalidConfig(
                "page size must be greater than zero".into(),
            ));
        }

        Ok(Self {
            api_base_url,
            app_name,
            page_size,
        })
    }

    pub fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }

    pub fn app_name(&self) -> &str {
        self.app_name.as_str()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Header carrying a success alert key, e.g. `X-hospitalManagementApp-alert`.
    pub fn alert_header(&self) -> String {
        alert_header(self.app_name())
    }

    pub fn error_header(&self) -> String {
        error_header(self.app_name())
    }

    pub fn params_header(&self) -> String {
        params_header(self.app_name())
    }
}

/// Alert header name for `app_name`. The REST backend writes it, the client reads it.
pub fn alert_header(app_name: &str) -> String {
    format!("X-{}-alert", app_name)
}

pub fn error_header(app_name: &str) -> String {
    format!("X-{}-error", app_name)
}

pub fn params_header(app_name: &str) -> String {
    format!("X-{}-params", app_name)
}

/// Parse the page size from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default page size.
pub fn page_size_from_env_value(value: Option<String>) -> AdminResult<u32> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_PAGE_SIZE),
        Some(v) => v
            .parse::<u32>()
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| AdminError::InvalidConfig(format!("invalid page size: {v}"))),
    }
}
