use crate::config::ApiConfig;
use crate::powerdns::ZoneApi;
use crate::powerdns::types::*;
use crate::zone::{MetadataKey, MetadataValue, ZoneKind};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

#[derive(Clone)]
pub struct PowerDnsClient {
    http: Client,
    base_url: String, // e.g. "http://127.0.0.1:8081/api/v1"
    api_key: String,
    server_id: String, // usually "localhost"
}

impl PowerDnsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            server_id: server_id.into(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.api_base(), &config.api_key, &config.server_id)
    }

    fn auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-API-Key", &self.api_key)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/servers/{}/{}",
            self.base_url,
            self.server_id,
            path.trim_start_matches('/')
        )
    }

    fn zone_url(&self, name: &str, suffix: &str) -> String {
        self.url(&format!("zones/{}{}", zone_id(name), suffix))
    }

    async fn put_zone(&self, name: &str, body: &PdnsZoneUpdate) -> anyhow::Result<()> {
        let url = self.zone_url(name, "");
        debug!(%url, ?body, "PUT zone");
        let res = self.auth_header(self.http.put(url)).json(body).send().await?;
        ensure_success(res, "put_zone").await?;
        Ok(())
    }

    async fn lookup_zone(&self, name: &str) -> anyhow::Result<Option<PdnsZoneSummary>> {
        let url = self.url("zones");
        debug!(%url, zone = name, "GET zones");
        let res = self
            .auth_header(self.http.get(url))
            .query(&[("zone", name)])
            .send()
            .await?;
        let res = ensure_success(res, "list_zones").await?;
        let zones = res
            .json::<Vec<PdnsZoneSummary>>()
            .await
            .context("malformed zone list from PowerDNS")?;
        Ok(zones
            .into_iter()
            .find(|z| z.name.eq_ignore_ascii_case(name)))
    }
}

#[async_trait]
impl ZoneApi for PowerDnsClient {
    async fn get_zone(&self, name: &str) -> anyhow::Result<Option<ZoneRecord>> {
        let Some(summary) = self.lookup_zone(name).await? else {
            return Ok(None);
        };

        let url = self.url(&format!("zones/{}", summary.id));
        debug!(%url, "GET zone");
        let res = self.auth_header(self.http.get(url)).send().await?;
        let zone = ensure_success(res, "get_zone")
            .await?
            .json::<PdnsZone>()
            .await
            .context("malformed zone from PowerDNS")?;

        let url = self.url(&format!("zones/{}/metadata", summary.id));
        debug!(%url, "GET metadata");
        let res = self.auth_header(self.http.get(url)).send().await?;
        let metadata = ensure_success(res, "list_metadata")
            .await?
            .json::<Vec<PdnsMetadata>>()
            .await
            .context("malformed metadata from PowerDNS")?;

        Ok(Some(ZoneRecord { zone, metadata }))
    }

    async fn create_zone(&self, z: &PdnsZoneCreate) -> anyhow::Result<PdnsZone> {
        let url = self.url("zones");
        debug!(%url, body = ?z, "POST zone");
        let res = self
            .auth_header(self.http.post(url))
            .query(&[("rrsets", "false")])
            .json(z)
            .send()
            .await?;
        let zone = ensure_success(res, "create_zone")
            .await?
            .json::<PdnsZone>()
            .await
            .context("malformed zone from PowerDNS")?;
        Ok(zone)
    }

    async fn set_zone_kind(&self, name: &str, kind: ZoneKind) -> anyhow::Result<()> {
        let body = PdnsZoneUpdate {
            kind: Some(kind.as_str().to_string()),
            ..Default::default()
        };
        self.put_zone(name, &body).await
    }

    async fn set_zone_masters(&self, name: &str, masters: &[String]) -> anyhow::Result<()> {
        let body = PdnsZoneUpdate {
            masters: Some(masters.to_vec()),
            ..Default::default()
        };
        self.put_zone(name, &body).await
    }

    async fn set_zone_account(&self, name: &str, account: &str) -> anyhow::Result<()> {
        let body = PdnsZoneUpdate {
            account: Some(account.to_string()),
            ..Default::default()
        };
        self.put_zone(name, &body).await
    }

    async fn delete_zone(&self, name: &str) -> anyhow::Result<()> {
        let url = self.zone_url(name, "");
        debug!(%url, "DELETE zone");
        let res = self.auth_header(self.http.delete(url)).send().await?;
        ensure_success(res, "delete_zone").await?;
        Ok(())
    }

    async fn set_metadata(
        &self,
        name: &str,
        key: MetadataKey,
        value: &MetadataValue,
    ) -> anyhow::Result<()> {
        let url = self.zone_url(name, &format!("/metadata/{}", key.pdns_kind()));
        match key.encode(value)? {
            Some(items) => {
                let body = PdnsMetadata {
                    kind: key.pdns_kind().to_string(),
                    metadata: items,
                };
                debug!(%url, ?body, "PUT metadata");
                let res = self.auth_header(self.http.put(url)).json(&body).send().await?;
                ensure_success(res, "put_metadata").await?;
            }
            None => {
                debug!(%url, "DELETE metadata");
                let res = self.auth_header(self.http.delete(url)).send().await?;
                // Deleting an item that is already gone is fine.
                if res.status() != StatusCode::NOT_FOUND {
                    ensure_success(res, "delete_metadata").await?;
                }
            }
        }
        Ok(())
    }

    async fn notify_zone(&self, name: &str) -> anyhow::Result<()> {
        let url = self.zone_url(name, "/notify");
        debug!(%url, "PUT notify");
        let res = self.auth_header(self.http.put(url)).send().await?;
        ensure_success(res, "notify_zone").await?;
        Ok(())
    }

    async fn retrieve_zone(&self, name: &str) -> anyhow::Result<()> {
        let url = self.zone_url(name, "/axfr-retrieve");
        debug!(%url, "PUT axfr-retrieve");
        let res = self.auth_header(self.http.put(url)).send().await?;
        ensure_success(res, "retrieve_zone").await?;
        Ok(())
    }
}

async fn ensure_success(res: Response, op: &str) -> anyhow::Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        anyhow::bail!("PowerDNS {op} rejected the API key ({status})");
    }
    let body = res.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(body);
    if detail.is_empty() {
        anyhow::bail!("PowerDNS {op} failed with {status}");
    }
    anyhow::bail!("PowerDNS {op} failed with {status}: {detail}")
}

/// Zone id PowerDNS uses in URLs: the dot-terminated name with every byte
/// outside `[A-Za-z0-9.-]` written as `=XX`.
pub fn zone_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len() + 1);
    for b in name.bytes() {
        if b.is_ascii_alphanumeric() || b == b'.' || b == b'-' {
            id.push(b as char);
        } else {
            id.push_str(&format!("={b:02X}"));
        }
    }
    if !id.ends_with('.') {
        id.push('.');
    }
    if id == "." {
        return "=2E".to_string();
    }
    id
}
