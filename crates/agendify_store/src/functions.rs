// --- File: crates/agendify_store/src/functions.rs ---
//! Booking side effects delivered through hosted edge functions
//! (`POST /functions/v1/<name>`).

use agendify_common::models::Appointment;
use agendify_common::services::{BookingSideEffect, BoxFuture, StoreError};
use agendify_config::{NotificationConfig, StoreConfig};
use reqwest::{header, Client};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct FunctionPayload<'a> {
    appointments: &'a [Appointment],
}

/// Invokes one named edge function with the inserted appointments.
pub struct EdgeFunctionNotifier {
    client: Client,
    base_url: String,
    api_key: String,
    function_name: String,
}

impl EdgeFunctionNotifier {
    pub fn new(store: &StoreConfig, function_name: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(store.timeout_secs.unwrap_or(10)))
            .build()?;
        Ok(Self {
            client,
            base_url: store.url.trim_end_matches('/').to_string(),
            api_key: store.api_key.clone(),
            function_name: function_name.to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/functions/v1/{}", self.base_url, self.function_name)
    }
}

impl BookingSideEffect for EdgeFunctionNotifier {
    fn name(&self) -> &str {
        &self.function_name
    }

    fn run<'a>(&'a self, appointments: &'a [Appointment]) -> BoxFuture<'a, (), StoreError> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.url())
                .header("apikey", &self.api_key)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
                .json(&FunctionPayload { appointments })
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                warn!(
                    "Edge function '{}' failed: status={}, body={}",
                    self.function_name, status, message
                );
                return Err(StoreError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
            info!(
                "Edge function '{}' ran for {} appointment(s)",
                self.function_name,
                appointments.len()
            );
            Ok(())
        })
    }
}

/// Builds one notifier per configured function name, in the order
/// confirmation email, WhatsApp, calendar sync.
pub fn notifiers_from_config(
    store: &StoreConfig,
    notifications: Option<&NotificationConfig>,
) -> Result<Vec<Arc<dyn BookingSideEffect>>, StoreError> {
    let Some(notifications) = notifications else {
        return Ok(Vec::new());
    };
    [
        notifications.confirmation_email_function.as_deref(),
        notifications.whatsapp_function.as_deref(),
        notifications.calendar_sync_function.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|name| !name.is_empty())
    .map(|name| {
        EdgeFunctionNotifier::new(store, name)
            .map(|notifier| Arc::new(notifier) as Arc<dyn BookingSideEffect>)
    })
    .collect()
}
