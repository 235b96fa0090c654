// 🌐 Language Resolution - One effective language per request
//
// The site serves Russian (canonical), English and Kyrgyz content.
// Every read endpoint resolves exactly one display language up front,
// then threads it through field resolution - no per-handler guessing.

use serde::{Deserialize, Serialize};

// ============================================================================
// LANGUAGE CODE
// ============================================================================

/// Display language for a single request.
///
/// `Ru` is the canonical language: every displayable attribute always has a
/// Russian value, so resolution can never fail once a language is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ru,
    En,
    Ky,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::En => "en",
            Language::Ky => "ky",
        }
    }

    /// Parse a language code from a query parameter.
    ///
    /// Accepts the legacy "kg" alias some older content still uses for
    /// Kyrgyz. Unrecognized codes resolve to the canonical language:
    /// canonical resolution never consults translations, which is exactly
    /// the fallback an unknown code is supposed to get.
    pub fn parse(code: &str) -> Language {
        match code.trim().to_lowercase().as_str() {
            "en" => Language::En,
            "ky" | "kg" => Language::Ky,
            _ => Language::Ru,
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, Language::Ru)
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Ru
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Derives the effective language for one request.
///
/// Priority is fixed and order-sensitive:
/// 1. Explicit `lang` query parameter, if present and non-empty - wins
///    unconditionally.
/// 2. `Accept-Language` header substring match: "en" before "ky"/"kg".
/// 3. The configured default (canonical Russian out of the box).
///
/// The default comes from [`AppConfig`](crate::config::AppConfig) and is
/// carried per request - there is no process-wide language state.
#[derive(Debug, Clone, Copy)]
pub struct LanguageResolver {
    default: Language,
}

impl LanguageResolver {
    pub fn new(default: Language) -> Self {
        LanguageResolver { default }
    }

    pub fn resolve(&self, query_lang: Option<&str>, accept_language: Option<&str>) -> Language {
        if let Some(code) = query_lang {
            if !code.trim().is_empty() {
                return Language::parse(code);
            }
        }

        if let Some(header) = accept_language {
            // Substring match, "en" checked first. "kg" covers clients
            // still sending the legacy Kyrgyz tag.
            if header.contains("en") {
                return Language::En;
            }
            if header.contains("ky") || header.contains("kg") {
                return Language::Ky;
            }
        }

        self.default
    }
}

impl Default for LanguageResolver {
    fn default() -> Self {
        LanguageResolver::new(Language::Ru)
    }
}
