use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, error};
use crate::domain::{
    error::ScrapeError,
    models::{HttpResponse, ProxyConfig},
    ports::HttpTransport,
};

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Direct connections, no proxy.
    pub fn direct() -> Result<Self, ScrapeError> {
        Self::new(None)
    }

    /// Routes both HTTP and HTTPS traffic through `proxy` when given.
    pub fn new(proxy: Option<&ProxyConfig>) -> Result<Self, ScrapeError> {
        let mut builder = Client::builder();

        if let Some(proxy) = proxy {
            debug!("Routing requests through proxy {}", proxy);
            let route = reqwest::Proxy::all(proxy.endpoint())
                .map_err(|e| {
                    error!("Invalid proxy address {}: {}", proxy, e);
                    ScrapeError::Config(e.to_string())
                })?
                .basic_auth(&proxy.username, &proxy.password);
            builder = builder.proxy(route);
        } else {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| ScrapeError::Config(format!("cannot build http client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, user_agent: &str) -> Result<HttpResponse, ScrapeError> {
        debug!("GET {}", url);
        let response = self.client
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| {
                debug!("Request to {} failed: {}", url, e);
                ScrapeError::Transport(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                debug!("Reading body from {} failed: {}", url, e);
                ScrapeError::Transport(e.to_string())
            })?;

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body: body.to_vec() })
    }
}
