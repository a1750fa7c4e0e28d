//! Forgery analysis service client.

use async_trait::async_trait;
use auditvault_core::models::{AnalysisResponse, UploadedFile};
use auditvault_core::{AnalysisGateway, ApiError};

use crate::{file_form, ApiClient};

const ANALYZE_PATH: &str = "/analyze";

#[derive(Clone, Debug)]
pub struct AnalysisClient {
    api: ApiClient,
}

impl AnalysisClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl AnalysisGateway for AnalysisClient {
    async fn analyze(&self, file: &UploadedFile) -> Result<AnalysisResponse, ApiError> {
        tracing::debug!(file = %file.name(), bytes = file.len(), "Submitting file for analysis");
        self.api.post_multipart(ANALYZE_PATH, file_form(file)).await
    }
}
