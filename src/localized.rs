// 🏷️ Localized Fields - Canonical value + optional translations
//
// Every displayable attribute of every content entity carries a Russian
// canonical value plus optional English/Kyrgyz translations. The fallback
// rule is identical for all of them:
//
//   ru      -> canonical, unconditionally
//   en / ky -> translation if non-blank, else canonical
//
// One accessor, applied uniformly. Entities never reimplement this.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

use crate::language::Language;

// ============================================================================
// LOCALIZED FIELD
// ============================================================================

/// A single displayable attribute with its translations.
///
/// The canonical (`ru`) value is always considered present - it may be an
/// empty string, but resolution never fails because of it. Blank
/// translations are never selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedField {
    /// Canonical value (Russian)
    #[serde(default)]
    pub ru: String,

    /// English translation, blank allowed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub en: String,

    /// Kyrgyz translation, blank allowed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ky: String,
}

impl LocalizedField {
    pub fn canonical(ru: impl Into<String>) -> Self {
        LocalizedField {
            ru: ru.into(),
            en: String::new(),
            ky: String::new(),
        }
    }

    pub fn new(
        ru: impl Into<String>,
        en: impl Into<String>,
        ky: impl Into<String>,
    ) -> Self {
        LocalizedField {
            ru: ru.into(),
            en: en.into(),
            ky: ky.into(),
        }
    }

    /// Raw translation for a language. `None` for the canonical language -
    /// callers wanting a display value go through [`resolve`](Self::resolve).
    pub fn translation(&self, lang: Language) -> Option<&str> {
        match lang {
            Language::Ru => None,
            Language::En => Some(self.en.as_str()),
            Language::Ky => Some(self.ky.as_str()),
        }
    }

    /// Resolve the display value for a language.
    ///
    /// For the canonical language translations are never consulted. For any
    /// other language a blank translation falls back to the canonical value.
    pub fn resolve(&self, lang: Language) -> &str {
        match self.translation(lang) {
            Some(value) if !value.is_empty() => value,
            _ => self.ru.as_str(),
        }
    }
}

// ============================================================================
// LOCALIZE TRAIT
// ============================================================================

/// Uniform access to an entity's displayable attributes.
///
/// Implementors expose "attribute name -> canonical + translations"; the
/// trait supplies the display resolution and the JSON projection every list
/// and aggregate endpoint emits. There is exactly one fallback
/// implementation in the whole crate.
pub trait Localize {
    /// The record's opaque identifier, included in every projection.
    fn record_id(&self) -> &str;

    /// Look up one displayable attribute by name.
    fn field(&self, attr: &str) -> Option<&LocalizedField>;

    /// All displayable attributes, in stable order.
    fn fields(&self) -> &BTreeMap<String, LocalizedField>;

    /// Resolved display value for one attribute. Unknown attributes
    /// resolve to an empty string - missing data is a fallback case,
    /// never an error.
    fn display(&self, attr: &str, lang: Language) -> &str {
        self.field(attr).map(|f| f.resolve(lang)).unwrap_or("")
    }

    /// Project the record as a flat JSON object:
    /// `{ "id": ..., "<attr>": "<resolved value>", ... }`.
    fn localized_json(&self, lang: Language) -> JsonMap<String, Value> {
        let mut out = JsonMap::new();
        out.insert("id".to_string(), Value::String(self.record_id().to_string()));
        for (attr, field) in self.fields() {
            out.insert(attr.clone(), Value::String(field.resolve(lang).to_string()));
        }
        out
    }
}
