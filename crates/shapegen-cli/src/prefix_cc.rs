//! Remote prefix directory client (prefix.cc JSON dump format).

use anyhow::{anyhow, Result};
use shapegen_core::prefixes::PrefixDirectory;
use std::collections::BTreeMap;
use std::time::Duration;

pub struct PrefixCcDirectory {
    url: String,
    timeout: Duration,
}

impl PrefixCcDirectory {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl PrefixDirectory for PrefixCcDirectory {
    fn fetch(&self) -> Result<BTreeMap<String, String>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("shapegen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow!("failed to build http client: {e}"))?;
        let resp = client
            .get(&self.url)
            .send()
            .map_err(|e| anyhow!("failed to reach prefix directory at {} ({e})", self.url))?;
        if !resp.status().is_success() {
            return Err(anyhow!("prefix directory http error {}", resp.status()));
        }
        let table: BTreeMap<String, String> = resp
            .json()
            .map_err(|e| anyhow!("prefix directory returned invalid JSON: {e}"))?;
        tracing::debug!(url = %self.url, entries = table.len(), "fetched prefix directory");
        Ok(table)
    }
}
