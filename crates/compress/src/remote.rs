use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::types::{CompressError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.tinify.com";

/// Remote compression service. Writes the compressed image to `output` and
/// returns the number of bytes written.
pub trait Compressor {
    fn compress(&self, credential: &str, input: &Path, output: &Path) -> Result<u64>;
}

/// Client for the TinyPNG-style `/shrink` API.
pub struct TinifyClient {
    base_url: String,
    agent: ureq::Agent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiErrorBody {
    error: String,
    message: String,
}

impl TinifyClient {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(30))
            .timeout_read(Duration::from_secs(300))
            .timeout_write(Duration::from_secs(300))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn authorization(credential: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("api:{credential}")))
    }
}

impl Compressor for TinifyClient {
    fn compress(&self, credential: &str, input: &Path, output: &Path) -> Result<u64> {
        let data = fs::read(input)?;
        let auth = Self::authorization(credential);

        let shrink_url = format!("{}/shrink", self.base_url);
        let resp = self
            .agent
            .post(&shrink_url)
            .set("Authorization", &auth)
            .send_bytes(&data)
            .map_err(classify)?;
        let location = resp
            .header("Location")
            .map(str::to_string)
            .ok_or_else(|| CompressError::Server("response had no Location header".to_string()))?;

        let resp = self
            .agent
            .get(&location)
            .set("Authorization", &auth)
            .call()
            .map_err(classify)?;
        let mut body = Vec::new();
        resp.into_reader()
            .read_to_end(&mut body)
            .map_err(|err| CompressError::Connection(format!("download result: {err}")))?;

        tinybatch_ledger::atomic_write(output, &body)?;
        Ok(body.len() as u64)
    }
}

/// 401 and 429 are account problems, other 4xx are bad requests, the rest are
/// service failures. Transport errors never reached the service.
fn classify(err: ureq::Error) -> CompressError {
    match err {
        ureq::Error::Status(status, resp) => {
            let message = error_message(status, resp);
            match status {
                401 | 429 => CompressError::Account(message),
                400..=499 => CompressError::Request(message),
                _ => CompressError::Server(message),
            }
        }
        ureq::Error::Transport(transport) => CompressError::Connection(transport.to_string()),
    }
}

fn error_message(status: u16, resp: ureq::Response) -> String {
    let text = resp.into_string().unwrap_or_default();
    match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) if !body.message.is_empty() => {
            format!("{} (HTTP {}/{})", body.message, status, body.error)
        }
        _ => format!("HTTP {status}"),
    }
}
