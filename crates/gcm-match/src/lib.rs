//! Matching engine (spec §2 C8-C11): Quick Filter, eight scoring
//! components, the Match Orchestrator that fans them out and combines
//! them, and the Weight/Config Store governing their weights.

pub mod config_store;
pub mod orchestrator;
pub mod quick_filter;
pub mod scoring;

pub use config_store::{tenant_config_key, ConfigStoreError, WeightConfigPatch, WeightConfigStore, GLOBAL_CONFIG_KEY};
pub use orchestrator::{CacheEntry, MatchOrchestrator, ScoringInputs};
pub use quick_filter::{quick_filter, QuickFilterDetails, QuickFilterResult};

pub const CRATE_NAME: &str = "gcm-match";
