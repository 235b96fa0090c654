// 📄 Content Record - The one generic localizable entity
//
// Partners, founders, documents, faculty, org units... every catalog kind
// is the same record shape: an identity, an ordering key, an active flag,
// a map of localized attributes, and (for aggregate primaries) a set of
// feature flags gating child collections. Per-kind structs would just
// duplicate this sixteen times.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::ContentKind;
use crate::localized::{Localize, LocalizedField};

// ============================================================================
// FEATURE FLAGS
// ============================================================================

/// Typed flag set on an aggregate's primary record.
///
/// Child collections are gated by explicit named flags ("show_partners",
/// "show_history", ...). An absent flag gates closed - same as an explicit
/// `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags(pub BTreeMap<String, bool>);

impl FeatureFlags {
    pub fn new() -> Self {
        FeatureFlags(BTreeMap::new())
    }

    pub fn enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        self.0.insert(name.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// CONTENT RECORD
// ============================================================================

/// A localizable content record.
///
/// Identity: UUID string, never changes. `parent_id` is only meaningful for
/// hierarchical kinds (org units, management) and marks a root when `None`.
/// Inactive records are excluded from every read path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Stable identity (UUID)
    pub id: String,

    /// Which catalog kind this record instantiates
    pub kind: ContentKind,

    /// Self-referential link for hierarchical kinds; None marks a root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Sibling ordering key; ties broken by canonical display name
    #[serde(default)]
    pub order: i64,

    /// Inactive records never reach a response
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Displayable attributes, keyed by attribute name
    #[serde(default)]
    pub fields: BTreeMap<String, LocalizedField>,

    /// Child-collection gates, only consulted on aggregate primaries
    #[serde(default, skip_serializing_if = "FeatureFlags::is_empty")]
    pub flags: FeatureFlags,

    /// Relative media path for downloadable kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl ContentRecord {
    /// Create a new active record with a fresh UUID and no attributes.
    pub fn new(kind: ContentKind) -> Self {
        let now = Utc::now();

        ContentRecord {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            parent_id: None,
            order: 0,
            is_active: true,
            fields: BTreeMap::new(),
            flags: FeatureFlags::new(),
            file_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set one displayable attribute
    pub fn with_field(mut self, attr: impl Into<String>, field: LocalizedField) -> Self {
        self.fields.insert(attr.into(), field);
        self
    }

    /// Builder: set the ordering key
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Builder: set the parent link
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Builder: set one feature flag
    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.set(name, value);
        self
    }

    /// Builder: mark the record inactive
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Check if this is a root node (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Canonical display name, used as the ordering tie-break.
    ///
    /// Records name themselves through a "name" attribute, falling back to
    /// "title" for document-like kinds; a record with neither sorts last
    /// among equal `order` values only by insertion stability.
    pub fn canonical_name(&self) -> &str {
        self.fields
            .get("name")
            .or_else(|| self.fields.get("title"))
            .map(|f| f.ru.as_str())
            .unwrap_or("")
    }
}

impl Localize for ContentRecord {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn field(&self, attr: &str) -> Option<&LocalizedField> {
        self.fields.get(attr)
    }

    fn fields(&self) -> &BTreeMap<String, LocalizedField> {
        &self.fields
    }
}

/// Sort a sibling list in place: `order` ascending, canonical name as the
/// tie-break. Every collection in every response goes through this.
pub fn sort_siblings(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then_with(|| a.canonical_name().cmp(b.canonical_name()))
    });
}
