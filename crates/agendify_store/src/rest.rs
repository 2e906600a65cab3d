// --- File: crates/agendify_store/src/rest.rs ---
//! Client for the hosted backend's generated REST interface.
//!
//! Tables are read and written through `/rest/v1/<table>` with PostgREST
//! filter syntax; free slots come from the `get_available_slots` procedure
//! under `/rest/v1/rpc`.

use agendify_common::models::{
    Appointment, AppointmentDraft, AppointmentStatus, Slot, Specialty, WorkingDay,
};
use agendify_common::services::{AppointmentQuery, BoxFuture, SchedulingStore, StoreError};
use agendify_config::StoreConfig;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const APPOINTMENT_SELECT: &str = "*,clients(name)";
const SPECIALTY_SELECT: &str = "id,name,duration_minutes:duration,price";

#[derive(Debug, Deserialize)]
struct ClientEmbed {
    name: Option<String>,
}

/// Appointment row as returned with the embedded client name.
#[derive(Debug, Deserialize)]
struct AppointmentRow {
    id: Uuid,
    professional_id: Uuid,
    specialty_id: Uuid,
    client_id: Uuid,
    calendar_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: AppointmentStatus,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    series_id: Option<Uuid>,
    #[serde(default)]
    clients: Option<ClientEmbed>,
}

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        Appointment {
            id: row.id,
            professional_id: row.professional_id,
            specialty_id: row.specialty_id,
            client_id: row.client_id,
            calendar_id: row.calendar_id,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status,
            client_name: row.clients.and_then(|c| c.name),
            notes: row.notes,
            series_id: row.series_id,
        }
    }
}

#[derive(Debug, Serialize)]
struct AvailableSlotsArgs {
    p_professional_id: Uuid,
    p_specialty_id: Uuid,
    p_date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct StatusPatch {
    status: AppointmentStatus,
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Builds the PostgREST filters for an appointment conflict lookup.
pub fn appointment_filters(query: &AppointmentQuery) -> Vec<(String, String)> {
    let mut filters = vec![
        ("select".to_string(), APPOINTMENT_SELECT.to_string()),
        (
            "professional_id".to_string(),
            format!("eq.{}", query.professional_id),
        ),
        ("status".to_string(), "neq.canceled".to_string()),
        (
            "start_time".to_string(),
            format!("lt.{}", timestamp(query.window_end)),
        ),
        (
            "end_time".to_string(),
            format!("gt.{}", timestamp(query.window_start)),
        ),
    ];
    if let Some(exclude) = query.exclude_appointment_id {
        filters.push(("id".to_string(), format!("neq.{exclude}")));
    }
    filters
}

/// Store backed by the hosted database's REST and RPC endpoints.
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = Client::builder().timeout(timeout).build()?;
        info!("REST store configured for {}", config.url);
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let response = self.authorized(request).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                StoreError::Unavailable(e.to_string())
            } else {
                StoreError::Request(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Store API error: status={}, body={}", status, body);
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl SchedulingStore for RestStore {
    fn working_days(&self, professional_id: Uuid) -> BoxFuture<'_, Vec<WorkingDay>, StoreError> {
        Box::pin(async move {
            let request = self.client.get(self.table_url("working_days")).query(&[
                ("select", "*".to_string()),
                ("professional_id", format!("eq.{professional_id}")),
                ("is_working_day", "eq.true".to_string()),
            ]);
            self.send(request).await
        })
    }

    fn replace_working_days(
        &self,
        professional_id: Uuid,
        records: Vec<WorkingDay>,
    ) -> BoxFuture<'_, Vec<WorkingDay>, StoreError> {
        Box::pin(async move {
            debug!(
                "Upserting {} working-day records for {}",
                records.len(),
                professional_id
            );
            let request = self
                .client
                .post(self.table_url("working_days"))
                .query(&[("on_conflict", "professional_id,day_of_week")])
                .header("Prefer", "resolution=merge-duplicates,return=representation")
                .json(&records);
            self.send(request).await
        })
    }

    fn available_slots(
        &self,
        professional_id: Uuid,
        specialty_id: Uuid,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Slot>, StoreError> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.table_url("rpc/get_available_slots"))
                .json(&AvailableSlotsArgs {
                    p_professional_id: professional_id,
                    p_specialty_id: specialty_id,
                    p_date: date,
                });
            self.send(request).await
        })
    }

    fn query_appointments(
        &self,
        query: AppointmentQuery,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError> {
        Box::pin(async move {
            let request = self
                .client
                .get(self.table_url("appointments"))
                .query(&appointment_filters(&query));
            let rows: Vec<AppointmentRow> = self.send(request).await?;
            Ok(rows.into_iter().map(Appointment::from).collect())
        })
    }

    fn insert_appointments(
        &self,
        drafts: Vec<AppointmentDraft>,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.table_url("appointments"))
                .query(&[("select", APPOINTMENT_SELECT)])
                .header("Prefer", "return=representation")
                .json(&drafts);
            let rows: Vec<AppointmentRow> = self.send(request).await?;
            info!("Inserted {} appointment(s)", rows.len());
            Ok(rows.into_iter().map(Appointment::from).collect())
        })
    }

    fn get_appointment(&self, id: Uuid) -> BoxFuture<'_, Option<Appointment>, StoreError> {
        Box::pin(async move {
            let request = self.client.get(self.table_url("appointments")).query(&[
                ("select", APPOINTMENT_SELECT.to_string()),
                ("id", format!("eq.{id}")),
            ]);
            let rows: Vec<AppointmentRow> = self.send(request).await?;
            Ok(rows.into_iter().next().map(Appointment::from))
        })
    }

    fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> BoxFuture<'_, Appointment, StoreError> {
        Box::pin(async move {
            let request = self
                .client
                .patch(self.table_url("appointments"))
                .query(&[
                    ("select", APPOINTMENT_SELECT.to_string()),
                    ("id", format!("eq.{id}")),
                ])
                .header("Prefer", "return=representation")
                .json(&StatusPatch { status });
            let rows: Vec<AppointmentRow> = self.send(request).await?;
            rows.into_iter()
                .next()
                .map(Appointment::from)
                .ok_or_else(|| StoreError::NotFound(format!("appointment {id}")))
        })
    }

    fn get_specialty(&self, id: Uuid) -> BoxFuture<'_, Option<Specialty>, StoreError> {
        Box::pin(async move {
            let request = self.client.get(self.table_url("specialties")).query(&[
                ("select", SPECIALTY_SELECT.to_string()),
                ("id", format!("eq.{id}")),
            ]);
            let rows: Vec<Specialty> = self.send(request).await?;
            Ok(rows.into_iter().next())
        })
    }
}
