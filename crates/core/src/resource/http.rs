use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::config::CoreConfig;
use crate::AdminResult;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use url::Url;

/// [`Transport`] over HTTP using `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(cfg: &CoreConfig) -> AdminResult<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: cfg.api_base_url().clone(),
        })
    }
}

impl From<Method> for reqwest::Method {
    fn from(value: Method) -> Self {
        match value {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> AdminResult<ApiResponse> {
        let url = self.base_url.join(&request.path)?;

        let mut builder = self
            .http
            .request(request.method.into(), url)
            .header(ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
