use std::fmt;
use std::io::Read;

use flate2::read::GzDecoder;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Proxy, StatusCode};

use crate::settings::{ClaimConfig, ProxyConfig};
use crate::token::Token;

const ALREADY_CLAIMED: u16 = 420;

/// What the server said about today's spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    AlreadyClaimed,
    Unauthorized,
    Unknown,
}

impl Outcome {
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() {
            return Outcome::Success;
        }
        match status.as_u16() {
            ALREADY_CLAIMED => Outcome::AlreadyClaimed,
            401 => Outcome::Unauthorized,
            _ => Outcome::Unknown,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Outcome::Success => "Done.",
            Outcome::AlreadyClaimed => {
                "An error occurred while fetching results: Coin already clicked. Terminating..."
            }
            Outcome::Unauthorized => {
                "An error occurred while fetching results (expired/invalid cookie). Terminating..."
            }
            Outcome::Unknown => "An error occurred while fetching results. Terminating...",
        };
        f.write_str(message)
    }
}

pub struct Claimer {
    client: Client,
    url: String,
}

impl Claimer {
    pub fn new(config: &ClaimConfig) -> reqwest::Result<Self> {
        let mut builder = Client::builder()
            .default_headers(default_headers(config))
            .timeout(config.timeout);
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(build_proxy(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            url: config.url.clone(),
        })
    }

    /// Sends the spin request once and classifies the reply. Transport
    /// failures are folded into [`Outcome::Unknown`].
    pub async fn claim(&self, token: &Token) -> Outcome {
        let mut authorization = match HeaderValue::from_str(token.as_str()) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("token cannot be sent as a header: {e}");
                return Outcome::Unknown;
            }
        };
        authorization.set_sensitive(true);

        tracing::info!("Fetching {}", self.url);
        let response = match self
            .client
            .post(&self.url)
            .header(header::AUTHORIZATION, authorization)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("request to {} failed: {e}", self.url);
                return Outcome::Unknown;
            }
        };

        let status = response.status();
        let gzipped = is_gzip(response.headers());
        match response.bytes().await {
            Ok(raw) => match decode_body(&raw, gzipped) {
                Ok(body) => {
                    tracing::debug!(%status, body = %String::from_utf8_lossy(&body), "response body")
                }
                Err(e) => tracing::warn!(%status, "failed to decompress response body: {e}"),
            },
            Err(e) => tracing::warn!(%status, "failed to read response body: {e}"),
        }

        let outcome = Outcome::from_status(status);
        if outcome != Outcome::Success {
            tracing::warn!("server answered {status}");
        }
        outcome
    }
}

fn default_headers(config: &ClaimConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let fixed = [
        (header::PRAGMA, "no-cache"),
        (header::CACHE_CONTROL, "no-cache"),
        (header::ACCEPT, "application/json"),
        (header::ACCEPT_ENCODING, "gzip, deflate, br"),
        (header::CONNECTION, "keep-alive"),
    ];
    for (name, value) in fixed {
        headers.insert(name, HeaderValue::from_static(value));
    }

    let dynamic = [
        (header::USER_AGENT, &config.user_agent),
        (header::ORIGIN, &config.origin),
        (header::REFERER, &config.origin),
    ];
    for (name, value) in dynamic {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(e) => tracing::warn!("skipping {name} header: {e}"),
        }
    }
    headers
}

fn build_proxy(config: &ProxyConfig) -> reqwest::Result<Proxy> {
    let proxy = Proxy::all(format!("http://{}", config.host))?;
    Ok(match &config.user {
        Some(user) => proxy.basic_auth(user, config.password.as_deref().unwrap_or_default()),
        None => proxy,
    })
}

fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("gzip"))
}

fn decode_body(raw: &[u8], gzipped: bool) -> std::io::Result<Vec<u8>> {
    if !gzipped {
        return Ok(raw.to_vec());
    }
    let mut body = Vec::new();
    GzDecoder::new(raw).read_to_end(&mut body)?;
    Ok(body)
}
