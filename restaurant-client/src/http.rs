//! HTTP client for network-based API calls
//!
//! Every endpoint wrapper takes a [`CancellationToken`]. Cancelling drops the
//! in-flight request and the wrapper returns its fallback: an empty list for
//! listings, `None` for single records. A `204 No Content` reply is also `None`.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{DataEnvelope, ErrorCode};
use tokio_util::sync::CancellationToken;

use crate::{
    ApiResponse, ClientConfig, ClientError, ClientResult, DiningTable, DiningTableCreate,
    DiningTableUpdate, Reservation, ReservationCreate, ReservationQuery, ReservationStatus,
};

/// HTTP client for making network requests to the reservation server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send the request unless `cancel` fires first
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> ClientResult<Option<T>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = Self::execute(request) => result,
        }
    }

    async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<Option<T>> {
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<Option<T>> {
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(Self::api_error(status, &bytes));
        }
        if bytes.is_empty() {
            return Ok(None);
        }

        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;
        if let Some(message) = envelope.error {
            return Err(ClientError::Api {
                status: status.as_u16(),
                code: envelope.code.unwrap_or(ErrorCode::Unknown.code()),
                message,
            });
        }
        Ok(envelope.data)
    }

    /// Non-2xx reply: prefer the server's envelope, else the raw text
    fn api_error(status: StatusCode, bytes: &[u8]) -> ClientError {
        let envelope = serde_json::from_slice::<ApiResponse<Value>>(bytes).ok();
        let code = envelope
            .as_ref()
            .and_then(|e| e.code)
            .unwrap_or(ErrorCode::Unknown.code());
        let message = envelope
            .and_then(|e| e.error)
            .or_else(|| {
                let text = String::from_utf8_lossy(bytes).trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        tracing::debug!(status = status.as_u16(), code, %message, "API request failed");
        ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        }
    }

    /// Cancelled listings resolve to an empty list
    async fn fetch_list<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<T>> {
        match self.fetch::<Vec<T>>(request, cancel).await {
            Ok(rows) => Ok(rows.unwrap_or_default()),
            Err(ClientError::Cancelled) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Cancelled single-record calls resolve to `None`
    async fn fetch_one<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> ClientResult<Option<T>> {
        match self.fetch::<T>(request, cancel).await {
            Err(ClientError::Cancelled) => Ok(None),
            other => other,
        }
    }

    fn with_data<B: Serialize>(request: RequestBuilder, data: B) -> RequestBuilder {
        request.json(&DataEnvelope::new(data))
    }

    // ========== Reservations API ==========

    /// Reservations for a date, or matching a phone number
    pub async fn list_reservations(
        &self,
        query: &ReservationQuery,
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<Reservation>> {
        let request = self.client.get(self.url("reservations")).query(query);
        self.fetch_list(request, cancel).await
    }

    pub async fn create_reservation(
        &self,
        reservation: &ReservationCreate,
        cancel: &CancellationToken,
    ) -> ClientResult<Option<Reservation>> {
        let request = Self::with_data(self.client.post(self.url("reservations")), reservation);
        self.fetch_one(request, cancel).await
    }

    pub async fn read_reservation(
        &self,
        reservation_id: i64,
        cancel: &CancellationToken,
    ) -> ClientResult<Option<Reservation>> {
        let request = self
            .client
            .get(self.url(&format!("reservations/{reservation_id}")));
        self.fetch_one(request, cancel).await
    }

    /// Replace the business fields of a reservation
    pub async fn update_reservation(
        &self,
        reservation_id: i64,
        reservation: &ReservationCreate,
        cancel: &CancellationToken,
    ) -> ClientResult<Option<Reservation>> {
        let request = Self::with_data(
            self.client
                .put(self.url(&format!("reservations/{reservation_id}"))),
            reservation,
        );
        self.fetch_one(request, cancel).await
    }

    pub async fn update_reservation_status(
        &self,
        reservation_id: i64,
        status: ReservationStatus,
        cancel: &CancellationToken,
    ) -> ClientResult<Option<Reservation>> {
        let request = Self::with_data(
            self.client
                .put(self.url(&format!("reservations/{reservation_id}/status"))),
            serde_json::json!({ "status": status }),
        );
        self.fetch_one(request, cancel).await
    }

    // ========== Tables API ==========

    pub async fn list_tables(&self, cancel: &CancellationToken) -> ClientResult<Vec<DiningTable>> {
        let request = self.client.get(self.url("tables"));
        self.fetch_list(request, cancel).await
    }

    pub async fn create_table(
        &self,
        table: &DiningTableCreate,
        cancel: &CancellationToken,
    ) -> ClientResult<Option<DiningTable>> {
        let request = Self::with_data(self.client.post(self.url("tables")), table);
        self.fetch_one(request, cancel).await
    }

    pub async fn read_table(
        &self,
        table_id: i64,
        cancel: &CancellationToken,
    ) -> ClientResult<Option<DiningTable>> {
        let request = self.client.get(self.url(&format!("tables/{table_id}")));
        self.fetch_one(request, cancel).await
    }

    pub async fn update_table(
        &self,
        table_id: i64,
        update: &DiningTableUpdate,
        cancel: &CancellationToken,
    ) -> ClientResult<Option<DiningTable>> {
        let request = Self::with_data(
            self.client.put(self.url(&format!("tables/{table_id}"))),
            update,
        );
        self.fetch_one(request, cancel).await
    }

    /// Seat a reservation at a table
    pub async fn seat_reservation(
        &self,
        table_id: i64,
        reservation_id: i64,
        cancel: &CancellationToken,
    ) -> ClientResult<Option<DiningTable>> {
        let request = Self::with_data(
            self.client.put(self.url(&format!("tables/{table_id}/seat"))),
            serde_json::json!({ "reservation_id": reservation_id }),
        );
        self.fetch_one(request, cancel).await
    }

    /// Finish the seated reservation and free the table
    pub async fn finish_table(
        &self,
        table_id: i64,
        cancel: &CancellationToken,
    ) -> ClientResult<Option<DiningTable>> {
        let request = self
            .client
            .delete(self.url(&format!("tables/{table_id}/seat")));
        self.fetch_one(request, cancel).await
    }

    /// Delete a free table
    pub async fn delete_table(
        &self,
        table_id: i64,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        let request = self.client.delete(self.url(&format!("tables/{table_id}")));
        self.fetch::<Value>(request, cancel).await.map(|_| ())
    }
}
