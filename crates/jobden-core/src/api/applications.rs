use tracing::debug;

use crate::models::{
    Application, ApplicationDocument, ApplicationStatus, CreateApplication, DocumentType, UpdateApplication,
};

use super::client::ApiRequest;
use super::{ApiClient, ApiError, Upload};

impl ApiClient {
    /// The current user's applications, optionally filtered by status.
    pub async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Application>, ApiError> {
        let mut query = Vec::new();
        if let Some(status) = status {
            query.push(("status", status.as_str().to_string()));
        }
        query.push(("skip", skip.to_string()));
        query.push(("limit", limit.to_string()));
        self.get_with("applications", query).await
    }

    pub async fn get_application(&self, id: i64) -> Result<Application, ApiError> {
        self.get(&format!("applications/{}", id)).await
    }

    pub async fn create_application(&self, application: &CreateApplication) -> Result<Application, ApiError> {
        self.post("applications", application).await
    }

    pub async fn update_application(&self, id: i64, changes: &UpdateApplication) -> Result<Application, ApiError> {
        self.put(&format!("applications/{}", id), changes).await
    }

    pub async fn withdraw_application(&self, id: i64) -> Result<Application, ApiError> {
        self.send_json(ApiRequest::post(format!("applications/{}/withdraw", id)))
            .await
    }

    pub async fn delete_application(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("applications/{}", id)).await
    }

    /// Attach a document to an application.
    pub async fn upload_document(
        &self,
        application_id: i64,
        document_type: DocumentType,
        file: Upload,
    ) -> Result<ApplicationDocument, ApiError> {
        debug!(
            application_id,
            document_type = document_type.as_str(),
            bytes = file.bytes.len(),
            "Uploading application document"
        );
        let request = ApiRequest::post(format!("applications/{}/documents", application_id))
            .query(vec![("document_type", document_type.as_str().to_string())])
            .multipart(&[("document_type", document_type.as_str())], file);
        self.send_json(request).await
    }

    pub async fn list_documents(&self, application_id: i64) -> Result<Vec<ApplicationDocument>, ApiError> {
        self.get(&format!("applications/{}/documents", application_id))
            .await
    }

    pub async fn delete_document(&self, application_id: i64, document_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("applications/{}/documents/{}", application_id, document_id))
            .await
    }
}
