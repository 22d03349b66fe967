// src/gateway/http.rs
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::Config;
use crate::errors::{GatePassError, GatePassResult};
use crate::gateway::envelope::ApiEnvelope;
use crate::gateway::{ApprovalAction, BucketKind, GatePassGateway, Page, ReturnReceipt};
use crate::models::{
    Category, Location, MovementRequest, NewMovementRequest, Stage, StatusListing, StatusRecord,
    UserProfile,
};
use crate::notify::MailMessage;

/// ✅ **Production gateway speaking to the gate-pass REST backend**
pub struct HttpGateway {
    client: Client,
    base_url: String,
    auth_token: String,
}

impl HttpGateway {
    pub fn new(config: &Config, auth_token: impl Into<String>) -> GatePassResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a prepared request and unwrap the backend envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> GatePassResult<ApiEnvelope<T>> {
        let response = request.bearer_auth(&self.auth_token).send().await?;
        let status = response.status();
        match response.json::<ApiEnvelope<T>>().await {
            Ok(envelope) => Ok(envelope),
            // A non-2xx body that isn't a valid envelope still has to surface
            // the HTTP status rather than a decode error.
            Err(_) if !status.is_success() => Err(GatePassError::backend(
                status.as_u16(),
                format!("Request failed with HTTP {status}"),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> GatePassResult<T> {
        let envelope: ApiEnvelope<T> = self.execute(self.client.get(self.url(path))).await?;
        envelope.into_data()
    }
}

#[async_trait]
impl GatePassGateway for HttpGateway {
    async fn list_statuses(
        &self,
        stage: Stage,
        bucket: BucketKind,
        limit: usize,
        skip: usize,
    ) -> GatePassResult<Page<StatusListing>> {
        let path = format!("/statuses/{}/{}", stage.as_str(), bucket.as_str());
        let request = self
            .client
            .get(self.url(&path))
            .query(&[("limit", limit), ("skip", skip)]);
        let envelope: ApiEnvelope<Page<StatusListing>> = self.execute(request).await?;
        envelope.into_data()
    }

    async fn fetch_request(&self, reference_no: &str) -> GatePassResult<MovementRequest> {
        self.get_data(&format!("/requests/{reference_no}")).await
    }

    async fn fetch_status(&self, reference_no: &str) -> GatePassResult<StatusListing> {
        self.get_data(&format!("/statuses/{reference_no}")).await
    }

    async fn approve(
        &self,
        reference_no: &str,
        stage: Stage,
        action: ApprovalAction,
    ) -> GatePassResult<StatusRecord> {
        let request = self
            .client
            .post(self.url(&format!("/statuses/{reference_no}/approve")))
            .json(&json!({
                "stage": stage,
                "comment": action.comment,
                "loading_details": action.loading_details,
            }));
        let envelope: ApiEnvelope<StatusRecord> = self.execute(request).await?;
        envelope.into_data()
    }

    async fn reject(
        &self,
        reference_no: &str,
        stage: Stage,
        comment: &str,
    ) -> GatePassResult<StatusRecord> {
        let request = self
            .client
            .post(self.url(&format!("/statuses/{reference_no}/reject")))
            .json(&json!({ "stage": stage, "comment": comment }));
        let envelope: ApiEnvelope<StatusRecord> = self.execute(request).await?;
        envelope.into_data()
    }

    async fn mark_returned(
        &self,
        reference_no: &str,
        serial_numbers: &[String],
    ) -> GatePassResult<ReturnReceipt> {
        let request = self
            .client
            .patch(self.url(&format!("/requests/{reference_no}/items/returned")))
            .json(&json!({ "serial_numbers": serial_numbers }));
        let envelope: ApiEnvelope<ReturnReceipt> = self.execute(request).await?;
        envelope.into_data()
    }

    async fn find_employee(&self, service_no: &str) -> GatePassResult<UserProfile> {
        self.get_data(&format!("/employees/{service_no}")).await
    }

    async fn erp_employee(&self, service_no: &str) -> GatePassResult<UserProfile> {
        self.get_data(&format!("/erp/employees/{service_no}")).await
    }

    async fn erp_locations(&self) -> GatePassResult<Vec<Location>> {
        self.get_data("/erp/locations").await
    }

    async fn categories(&self) -> GatePassResult<Vec<Category>> {
        self.get_data("/categories").await
    }

    async fn create_request(
        &self,
        request: &NewMovementRequest,
    ) -> GatePassResult<MovementRequest> {
        let mut form = Form::new().part(
            "request",
            Part::text(serde_json::to_string(request)?)
                .mime_str("application/json")
                .map_err(GatePassError::Transport)?,
        );

        // Photos travel as separate parts, keyed by item serial. Part names
        // carry a uuid so two photos of the same item never collide.
        for item in &request.items {
            for photo in &item.photos {
                let part = Part::bytes(photo.content.to_vec()).file_name(photo.file_name.clone());
                form = form.part(
                    format!("photo-{}-{}", item.serial_no, uuid::Uuid::new_v4()),
                    part,
                );
            }
        }

        let builder = self.client.post(self.url("/requests")).multipart(form);
        let envelope: ApiEnvelope<MovementRequest> = self.execute(builder).await?;
        envelope.into_data()
    }

    async fn reassign_officer(&self, reference_no: &str, service_no: &str) -> GatePassResult<()> {
        let request = self
            .client
            .patch(self.url(&format!("/requests/{reference_no}/officer")))
            .json(&json!({ "service_no": service_no }));
        let envelope: ApiEnvelope<serde_json::Value> = self.execute(request).await?;
        envelope.ack()
    }

    async fn send_mail(&self, mail: &MailMessage) -> GatePassResult<()> {
        let request = self.client.post(self.url("/mail")).json(mail);
        let envelope: ApiEnvelope<serde_json::Value> = self.execute(request).await?;
        envelope.ack()
    }
}
