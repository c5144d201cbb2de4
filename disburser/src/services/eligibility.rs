//! HTTP allow-list source

use std::time::Duration;
use async_trait::async_trait;
use url::Url;

use shared::{component_debug, parse_address_lines, Address, Component};
use crate::error::{DisburserError, DisburserResult};
use crate::traits::EligibilitySource;

/// Fetches a plain-text, newline-delimited allow-list over HTTP
pub struct HttpEligibilitySource {
    url: Url,
    client: reqwest::Client,
}

impl HttpEligibilitySource {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(url: Url) -> DisburserResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(DisburserError::eligibility)?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl EligibilitySource for HttpEligibilitySource {
    async fn fetch(&self) -> DisburserResult<Vec<Address>> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(DisburserError::eligibility)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DisburserError::eligibility(format!("HTTP {status} from {}", self.url)));
        }

        let body = response.text().await.map_err(DisburserError::eligibility)?;
        let addresses = parse_address_lines(&body);

        component_debug!(Component::Eligibility, "📥 Fetched {} eligible addresses from {}", addresses.len(), self.url);
        Ok(addresses)
    }
}
