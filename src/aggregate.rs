// 🧱 Aggregate Composition - One primary record + gated child collections
//
// Aggregate endpoints ("about" + partners, "mission" + history/values/
// priorities/achievements) flatten one singleton primary record and attach
// each configured child collection under its name. A disabled collection
// is an empty array - the key is always present, never null, never omitted.

use serde::Serialize;
use serde_json::{Map as JsonMap, Value};
use thiserror::Error;

use crate::language::Language;
use crate::localized::Localize;
use crate::record::{sort_siblings, ContentRecord};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// No active primary record exists: the whole composition fails,
    /// never a partial response.
    #[error("no active primary record for aggregate '{aggregate}'")]
    PrimaryNotFound { aggregate: String },
}

// ============================================================================
// INPUT / OUTPUT SHAPES
// ============================================================================

/// One named child collection, with its gate already derived from the
/// primary record's feature flags.
#[derive(Debug, Clone)]
pub struct ChildCollection {
    pub name: String,
    pub enabled: bool,
    pub records: Vec<ContentRecord>,
}

impl ChildCollection {
    pub fn new(name: impl Into<String>, enabled: bool, records: Vec<ContentRecord>) -> Self {
        ChildCollection {
            name: name.into(),
            enabled,
            records,
        }
    }
}

/// The composed aggregate: primary fields flattened at the top level,
/// one array per child collection. Serializes as a single flat JSON
/// object with `success: true` in front.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResponse {
    pub success: bool,

    #[serde(flatten)]
    pub body: JsonMap<String, Value>,
}

// ============================================================================
// COMPOSER
// ============================================================================

/// Compose an aggregate response.
///
/// A missing primary fails the whole composition. Child collections are
/// active-filtered, sorted by `order` then canonical name, and localized
/// through the same accessor as everything else; a disabled collection
/// contributes an empty array under its name.
pub fn compose(
    aggregate: &str,
    primary: Option<&ContentRecord>,
    children: Vec<ChildCollection>,
    lang: Language,
) -> Result<AggregateResponse, ComposeError> {
    let primary = primary.ok_or_else(|| ComposeError::PrimaryNotFound {
        aggregate: aggregate.to_string(),
    })?;

    let mut body = primary.localized_json(lang);

    for child in children {
        let items = if child.enabled {
            let mut records: Vec<ContentRecord> =
                child.records.into_iter().filter(|r| r.is_active).collect();
            sort_siblings(&mut records);
            records
                .iter()
                .map(|r| Value::Object(r.localized_json(lang)))
                .collect()
        } else {
            Vec::new()
        };
        body.insert(child.name, Value::Array(items));
    }

    Ok(AggregateResponse {
        success: true,
        body,
    })
}
