// --- File: crates/services/agendify_backend/src/service_factory.rs ---
//! Picks the scheduling store and the post-booking side effects from the configuration.
use agendify_common::services::{BookingSideEffect, SchedulingStore};
use agendify_common::{config_error, AgendifyError};
use agendify_config::AppConfig;
use agendify_store::{notifiers_from_config, InMemoryStore, RestStore};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

/// Marker left in place when the secret was not found in the environment.
const UNRESOLVED_SECRET: &str = "secret_from_env";

pub struct AgendifyServices {
    pub store: Arc<dyn SchedulingStore>,
    pub side_effects: Vec<Arc<dyn BookingSideEffect>>,
}

impl AgendifyServices {
    /// With a `[store]` section the hosted REST store and its edge functions are used;
    /// without one everything runs on the in-memory store.
    pub fn from_config(config: &AppConfig, time_zone: Tz) -> Result<Self, AgendifyError> {
        let Some(store_config) = &config.store else {
            if config.notifications.is_some() {
                warn!("[notifications] requires a [store] section and is ignored");
            }
            info!("No [store] configured, using the in-memory store");
            return Ok(Self {
                store: Arc::new(InMemoryStore::new(time_zone)),
                side_effects: Vec::new(),
            });
        };

        if store_config.api_key.is_empty() || store_config.api_key == UNRESOLVED_SECRET {
            return Err(config_error(
                "store.api_key is not set; export STORE_API_KEY or put the key in the config",
            ));
        }

        let store = RestStore::new(store_config)?;
        let side_effects = notifiers_from_config(store_config, config.notifications.as_ref())?;
        info!(
            "Using REST store at {} with {} side effect(s): [{}]",
            store_config.url,
            side_effects.len(),
            side_effects
                .iter()
                .map(|effect| effect.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            store: Arc::new(store),
            side_effects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agendify_config::{BookingConfig, NotificationConfig, ServerConfig, StoreConfig};

    fn config(store: Option<StoreConfig>, notifications: Option<NotificationConfig>) -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8086,
            },
            store,
            booking: BookingConfig::default(),
            notifications,
            logging: None,
        }
    }

    fn store_config(api_key: &str) -> StoreConfig {
        StoreConfig {
            url: "https://project.example.co".to_string(),
            api_key: api_key.to_string(),
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn test_without_store_runs_in_memory() {
        let notifications = NotificationConfig {
            confirmation_email_function: Some("send-confirmation-email".to_string()),
            ..Default::default()
        };
        let services = AgendifyServices::from_config(
            &config(None, Some(notifications)),
            chrono_tz::America::Sao_Paulo,
        )
        .unwrap();
        assert!(services.side_effects.is_empty());
    }

    #[test]
    fn test_rest_store_with_configured_functions() {
        let notifications = NotificationConfig {
            confirmation_email_function: Some("send-confirmation-email".to_string()),
            whatsapp_function: None,
            calendar_sync_function: Some("sync-google-calendar".to_string()),
        };
        let services = AgendifyServices::from_config(
            &config(Some(store_config("anon-key")), Some(notifications)),
            chrono_tz::UTC,
        )
        .unwrap();
        let names: Vec<&str> = services.side_effects.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["send-confirmation-email", "sync-google-calendar"]);
    }

    #[test]
    fn test_unresolved_api_key_is_config_error() {
        let result = AgendifyServices::from_config(
            &config(Some(store_config(UNRESOLVED_SECRET)), None),
            chrono_tz::UTC,
        );
        assert!(matches!(result, Err(AgendifyError::ConfigError(_))));
    }
}
