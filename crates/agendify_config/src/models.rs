// --- File: crates/agendify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Remote Store Config ---
// The api key is usually "secret_from_env" in the config file and injected from STORE_API_KEY.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    pub url: String, // e.g. https://<project>.supabase.co
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

/// What to do when the conflict query itself fails.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Block the booking and surface an error.
    #[default]
    FailClosed,
    /// Log and treat the interval as free.
    FailOpen,
}

// --- Booking Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct BookingConfig {
    /// IANA name of the calendar time zone, e.g. "America/Sao_Paulo".
    pub time_zone: Option<String>,
    /// Number of days, starting today, offered as candidate dates (1..=366).
    pub horizon_days: Option<i64>,
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
    /// Upper bound for the occurrences of one recurring booking.
    pub max_occurrences: Option<u32>,
}

pub const DEFAULT_TIME_ZONE: &str = "America/Sao_Paulo";
pub const DEFAULT_HORIZON_DAYS: i64 = 60;
/// Largest accepted `horizon_days`.
pub const MAX_HORIZON_DAYS: i64 = 366;
pub const DEFAULT_MAX_OCCURRENCES: u32 = 200;

impl BookingConfig {
    pub fn time_zone_name(&self) -> &str {
        self.time_zone.as_deref().unwrap_or(DEFAULT_TIME_ZONE)
    }

    pub fn horizon_days(&self) -> i64 {
        self.horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS)
    }

    pub fn max_occurrences(&self) -> u32 {
        self.max_occurrences.unwrap_or(DEFAULT_MAX_OCCURRENCES)
    }
}

// --- Notification Config ---
// Names of the edge functions invoked after a booking. Unset entries are skipped.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct NotificationConfig {
    pub confirmation_email_function: Option<String>,
    pub whatsapp_function: Option<String>,
    pub calendar_sync_function: Option<String>,
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    /// Minimum level, e.g. "info" or "debug".
    pub level: Option<String>,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // Without a store the backend runs on the in-memory store
    #[serde(default)]
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub notifications: Option<NotificationConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}
