use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{StoreClient, StoreError};

use crate::models::Office;

/// Read-only access to the office registry.
///
/// Registry order - the order `list_offices` returns - is the tie-break
/// order the availability resolver uses when two offices expose the same
/// earliest slot, so it must be stable across calls: name, then id.
pub struct OfficeDirectory {
    store: StoreClient,
}

impl OfficeDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    pub async fn list_offices(&self) -> Result<Vec<Office>, StoreError> {
        debug!("Fetching office registry");

        let path = "/rest/v1/offices?select=*,hours:office_hours(*)&order=name.asc,id.asc";
        let result: Vec<Value> = self.store.request(Method::GET, path, None).await?;

        result
            .into_iter()
            .map(|office| serde_json::from_value(office).map_err(|e| StoreError::Decode(e.to_string())))
            .collect()
    }

    pub async fn get_office(&self, office_id: Uuid) -> Result<Office, StoreError> {
        debug!("Fetching office: {}", office_id);

        let path = format!("/rest/v1/offices?select=*,hours:office_hours(*)&id=eq.{}", office_id);
        let result: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        let first = result
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("office {}", office_id)))?;

        serde_json::from_value(first).map_err(|e| StoreError::Decode(e.to_string()))
    }
}
