// --- File: crates/agendify_store/src/lib.rs ---

pub mod functions; // Edge-function side effects
pub mod memory; // In-process store
pub mod rest; // Hosted REST/RPC store

pub use functions::{notifiers_from_config, EdgeFunctionNotifier};
pub use memory::InMemoryStore;
pub use rest::RestStore;
