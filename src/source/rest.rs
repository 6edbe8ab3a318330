use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info};

use super::RecordSource;
use crate::config::RestConfig;
use crate::fetch::{ApiKey, BasicClient, HttpClient, get_json};
use crate::record::RefuelRecord;

/// Reads the `fuel_logs` table through a PostgREST-style HTTP endpoint.
pub struct RestSource<C> {
    base_url: String,
    client: C,
}

/// Client stack used against the hosted datastore: `apikey` + bearer headers.
pub type AuthedClient = ApiKey<ApiKey<BasicClient>>;

impl RestSource<AuthedClient> {
    /// Builds a source authenticated with the anon key from `config`.
    pub fn connect(config: &RestConfig) -> Result<Self> {
        let basic = BasicClient::new()?;
        let with_apikey = ApiKey::header(basic, "apikey", &config.api_key)?;
        let client = ApiKey::bearer(with_apikey, &config.api_key)?;
        Ok(Self::with_client(&config.base_url, client))
    }
}

impl<C: HttpClient> RestSource<C> {
    pub fn with_client(base_url: &str, client: C) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Query URL for the table, optionally narrowed to one vehicle.
    pub fn fuel_logs_url(&self, vehicle_id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/rest/v1/fuel_logs", self.base_url))
            .with_context(|| format!("invalid datastore URL '{}'", self.base_url))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            if let Some(id) = vehicle_id {
                query.append_pair("vehicle_id", &format!("eq.{id}"));
            }
            query.append_pair("order", "refuel_date.asc");
        }
        Ok(url)
    }

    async fn query(&self, vehicle_id: Option<&str>) -> Result<Vec<RefuelRecord>> {
        let url = self.fuel_logs_url(vehicle_id)?;
        debug!(url = %url, "Querying fuel_logs");

        let rows: Vec<RefuelRecord> = get_json(&self.client, url.as_str())
            .await
            .context("failed to load fuel logs")?;
        let rows = validated(rows)?;

        info!(
            rows = rows.len(),
            vehicle_id = vehicle_id.unwrap_or("*"),
            "Fuel logs fetched"
        );
        Ok(rows)
    }
}

fn validated(rows: Vec<RefuelRecord>) -> Result<Vec<RefuelRecord>> {
    for (i, row) in rows.iter().enumerate() {
        row.validate()
            .with_context(|| format!("fuel_logs row {i} rejected"))?;
    }
    Ok(rows)
}

#[async_trait]
impl<C: HttpClient> RecordSource for RestSource<C> {
    #[tracing::instrument(skip(self))]
    async fn fetch_vehicle(&self, vehicle_id: &str) -> Result<Vec<RefuelRecord>> {
        self.query(Some(vehicle_id)).await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<RefuelRecord>> {
        self.query(None).await
    }
}
