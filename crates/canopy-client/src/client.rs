//! HTTP client for the catalog backend.
//!
//! Endpoints follow the backend's service layout: data models under
//! `/services/datamodels`, federations under `/services/federations`.

use crate::error::{ClientError, Result};
use canopy_core::{DataModel, Federation};
use reqwest::Response;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one catalog backend, with an in-memory model cache.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    /// All data models, filled on first listing and kept until a mutation
    /// refetches it.
    cache: Mutex<Option<Vec<DataModel>>>,
}

impl CatalogClient {
    /// Creates a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: Mutex::new(None),
        })
    }

    fn models_url(&self) -> String {
        format!("{}/services/datamodels", self.base_url)
    }

    fn federations_url(&self) -> String {
        format!("{}/services/federations", self.base_url)
    }

    /// All data models, cached after the first fetch.
    pub async fn list_data_models(&self) -> Result<Vec<DataModel>> {
        let mut cache = self.cache.lock().await;
        if let Some(models) = cache.as_ref() {
            tracing::debug!(count = models.len(), "serving data models from cache");
            return Ok(models.clone());
        }
        let models = self.fetch_models().await?;
        *cache = Some(models.clone());
        Ok(models)
    }

    /// Drops the cache and refetches all data models.
    pub async fn reload_data_models(&self) -> Result<Vec<DataModel>> {
        let models = self.fetch_models().await?;
        *self.cache.lock().await = Some(models.clone());
        Ok(models)
    }

    /// Only models that have been released.
    pub async fn released_data_models(&self) -> Result<Vec<DataModel>> {
        Ok(self
            .list_data_models()
            .await?
            .into_iter()
            .filter(|m| m.released)
            .collect())
    }

    /// Models belonging to a federation, by its id list.
    pub async fn data_models_by_ids(&self, ids: &[Uuid]) -> Result<Vec<DataModel>> {
        Ok(self
            .list_data_models()
            .await?
            .into_iter()
            .filter(|m| ids.contains(&m.uuid))
            .collect())
    }

    /// One model by id, straight from the backend.
    pub async fn get_data_model(&self, uuid: Uuid) -> Result<DataModel> {
        let url = format!("{}/{}", self.models_url(), uuid);
        let response = self.http.get(&url).send().await?;
        Ok(checked(response).await?.json().await?)
    }

    /// All federations, without their models resolved.
    pub async fn federations(&self) -> Result<Vec<Federation>> {
        let response = self.http.get(self.federations_url()).send().await?;
        Ok(checked(response).await?.json().await?)
    }

    /// Federations joined with their data models. A federation whose
    /// models cannot be resolved is kept with an empty list rather than
    /// failing the whole listing.
    pub async fn federations_with_models(&self) -> Result<Vec<(Federation, Vec<DataModel>)>> {
        let federations = self.federations().await?;
        let mut joined = Vec::with_capacity(federations.len());
        for federation in federations {
            let models = match self.data_models_by_ids(&federation.data_model_ids).await {
                Ok(models) => models,
                Err(err) => {
                    tracing::warn!(
                        federation = %federation.code,
                        error = %err,
                        "failed to resolve federation models"
                    );
                    Vec::new()
                }
            };
            joined.push((federation, models));
        }
        Ok(joined)
    }

    /// Releases a model. Released models are frozen on the backend.
    pub async fn release_data_model(&self, uuid: Uuid) -> Result<Vec<DataModel>> {
        let url = format!("{}/{}/release", self.models_url(), uuid);
        let response = self.http.post(&url).send().await?;
        checked(response).await?;
        tracing::info!(%uuid, "released data model");
        self.reload_data_models().await
    }

    /// Deletes an unreleased model.
    pub async fn delete_data_model(&self, uuid: Uuid) -> Result<Vec<DataModel>> {
        let url = format!("{}/{}", self.models_url(), uuid);
        let response = self.http.delete(&url).send().await?;
        checked(response).await?;
        tracing::info!(%uuid, "deleted data model");
        self.reload_data_models().await
    }

    /// Creates a model from a document.
    pub async fn import_data_model(&self, model: &DataModel) -> Result<Vec<DataModel>> {
        let response = self.http.post(self.models_url()).json(model).send().await?;
        checked(response).await?;
        tracing::info!(model = %model.label, "imported data model");
        self.reload_data_models().await
    }

    /// Full model document as pretty-printed JSON bytes, ready to write
    /// to a file.
    pub async fn export_json(&self, uuid: Uuid) -> Result<Vec<u8>> {
        let model = self.get_data_model(uuid).await?;
        Ok(serde_json::to_vec_pretty(&model)?)
    }

    async fn fetch_models(&self) -> Result<Vec<DataModel>> {
        let response = self.http.get(self.models_url()).send().await?;
        let models: Vec<DataModel> = checked(response).await?.json().await?;
        tracing::debug!(count = models.len(), "fetched data models");
        Ok(models)
    }
}

/// Maps non-success statuses to [`ClientError::Status`].
async fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::status(status.as_u16(), body))
}
