//! Best-effort HTTP client for the data, prediction, notify and optimize
//! endpoints.
//!
//! RULE: every call is attempted exactly once. No retry, no timeout.
//! Callers treat any error from here as degraded, not fatal.

use crate::{
    employee::EmployeeRecord,
    error::{MindError, MindResult},
    notification::{SwapConfirmation, SwapDispatcher, SwapNotification},
    types::{EmployeeId, RawRow},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Mutex;
use tokio::task::JoinHandle;

pub const PREDICT_PATH: &str = "/predict";
pub const NOTIFY_PATH: &str = "/notify";
pub const OPTIMIZE_PATH: &str = "/optimize";

/// One entry of the prediction endpoint's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub employee_id:  EmployeeId,
    pub stress_score: f64,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    predictions: Option<Vec<Prediction>>,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    employees: &'a [EmployeeRecord],
}

#[derive(Debug, Clone)]
pub struct RemoteClient {
    client:   reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &crate::config::RemoteConfig) -> Self {
        Self::new(config.api_endpoint.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// GET a full data endpoint (not relative to the base URL) and return
    /// its `employees` rows.
    pub async fn fetch_employees(&self, url: &str, api_key: Option<&str>) -> MindResult<Vec<RawRow>> {
        let mut req = self.client.get(url).header("Content-Type", "application/json");
        if let Some(key) = api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MindError::RemoteStatus {
                endpoint: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body: Value = resp.json().await?;
        let employees = body
            .get("employees")
            .and_then(Value::as_array)
            .ok_or_else(|| MindError::InvalidResponse {
                endpoint: url.to_string(),
                reason: "missing 'employees' array".into(),
            })?;

        // A non-object entry still counts as an employee; every field defaults.
        let rows: Vec<RawRow> = employees
            .iter()
            .map(|v| match v.as_object() {
                Some(obj) => obj.clone(),
                None => {
                    log::warn!("{url}: non-object entry in 'employees' ingested with defaults: {v}");
                    RawRow::new()
                }
            })
            .collect();
        log::info!("Fetched {} employee rows from {url}", rows.len());
        Ok(rows)
    }

    /// POST the record set to /predict and return its predictions.
    pub async fn predict(&self, records: &[EmployeeRecord]) -> MindResult<Vec<Prediction>> {
        let body = self.post_json(PREDICT_PATH, &PredictRequest { employees: records }).await?;
        let parsed: PredictResponse =
            serde_json::from_value(body).map_err(|e| MindError::InvalidResponse {
                endpoint: self.url(PREDICT_PATH),
                reason: e.to_string(),
            })?;
        parsed.predictions.ok_or_else(|| MindError::InvalidResponse {
            endpoint: self.url(PREDICT_PATH),
            reason: "missing 'predictions' array".into(),
        })
    }

    /// POST JSON to `base_url + endpoint`; non-success status is an error.
    pub async fn post_json<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> MindResult<Value> {
        let url = self.url(endpoint);
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MindError::RemoteStatus { endpoint: url, status: status.as_u16() });
        }
        Ok(resp.json().await?)
    }

    /// Fire-and-forget POST of a notification. Must be called inside a
    /// tokio runtime. The handle may be awaited, logged or dropped.
    pub fn spawn_notify(&self, notification: SwapNotification) -> JoinHandle<MindResult<Value>> {
        let this = self.clone();
        tokio::spawn(async move { this.post_json(NOTIFY_PATH, &notification).await })
    }

    /// Fire-and-forget POST of a swap confirmation.
    pub fn spawn_swap_confirmation(
        &self,
        confirmation: SwapConfirmation,
    ) -> JoinHandle<MindResult<Value>> {
        let this = self.clone();
        tokio::spawn(async move { this.post_json(OPTIMIZE_PATH, &confirmation).await })
    }
}

/// Sends swap payloads to the backend on a runtime handle and logs the
/// outcome. Nothing flows back to the session.
pub struct RemoteDispatcher {
    client:  RemoteClient,
    handle:  tokio::runtime::Handle,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl RemoteDispatcher {
    pub fn new(client: RemoteClient, handle: tokio::runtime::Handle) -> Self {
        Self { client, handle, pending: Mutex::new(Vec::new()) }
    }

    /// Wait for every dispatch issued so far to finish logging. A process
    /// about to exit calls this so its runtime does not abort the posts.
    pub async fn flush(&self) {
        let pending: Vec<JoinHandle<()>> = match self.pending.lock() {
            Ok(mut p) => p.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        for task in pending {
            if let Err(e) = task.await {
                log::warn!("Swap dispatch task aborted: {e}");
            }
        }
    }
}

impl SwapDispatcher for RemoteDispatcher {
    fn dispatch(&self, notification: &SwapNotification, confirmation: &SwapConfirmation) {
        let _guard = self.handle.enter();
        let to = notification.to.clone();
        let notify = self.client.spawn_notify(notification.clone());
        let confirm = self.client.spawn_swap_confirmation(confirmation.clone());

        let task = self.handle.spawn(async move {
            match notify.await {
                Ok(Ok(_)) => log::info!("Swap notification delivered to {to}"),
                Ok(Err(e)) => log::warn!("Swap notification for {to} failed: {e}"),
                Err(e) => log::warn!("Swap notification task aborted: {e}"),
            }
            match confirm.await {
                Ok(Ok(body)) => log::info!("Swap confirmed by backend: {body}"),
                Ok(Err(e)) => log::warn!("Swap confirmation failed: {e}"),
                Err(e) => log::warn!("Swap confirmation task aborted: {e}"),
            }
        });
        match self.pending.lock() {
            Ok(mut p) => p.push(task),
            Err(poisoned) => poisoned.into_inner().push(task),
        }
    }
}
