// Campus Content Backend - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod aggregate;
pub mod config;
pub mod db;
pub mod entities;
pub mod language;
pub mod localized;
pub mod record;
pub mod tree;

// Re-export commonly used types
pub use aggregate::{compose, AggregateResponse, ChildCollection, ComposeError};
pub use config::AppConfig;
pub use db::{
    count_by_kind, get_active_children, get_active_records, get_primary_record, get_record_by_id,
    insert_records, load_seed_csv, setup_database,
};
pub use entities::{find_aggregate, AggregateDef, ChildSpec, ContentKind, AGGREGATES};
pub use language::{Language, LanguageResolver};
pub use localized::{Localize, LocalizedField};
pub use record::{sort_siblings, ContentRecord, FeatureFlags};
pub use tree::{assemble, assemble_under, localized_tree_json, TreeNode, MAX_TREE_DEPTH};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
