// 🗂️ Content Kind Catalog
//
// The site's entity catalog: each kind is an interchangeable instance of
// the generic ContentRecord shape. Kinds carry only the three traits the
// core logic branches on - hierarchical, singleton primary, downloadable.

use serde::{Deserialize, Serialize};

// ============================================================================
// CONTENT KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    Partner,
    Founder,
    Document,
    Faculty,
    Accreditation,
    Infrastructure,
    Journal,
    Guide,
    OrgUnit,
    Management,
    AboutSection,
    Mission,
    History,
    ValueItem,
    Priority,
    Achievement,
}

impl ContentKind {
    /// All catalog kinds, in catalog order.
    pub const ALL: [ContentKind; 16] = [
        ContentKind::Partner,
        ContentKind::Founder,
        ContentKind::Document,
        ContentKind::Faculty,
        ContentKind::Accreditation,
        ContentKind::Infrastructure,
        ContentKind::Journal,
        ContentKind::Guide,
        ContentKind::OrgUnit,
        ContentKind::Management,
        ContentKind::AboutSection,
        ContentKind::Mission,
        ContentKind::History,
        ContentKind::ValueItem,
        ContentKind::Priority,
        ContentKind::Achievement,
    ];

    /// URL / storage token for this kind (kebab-case).
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Partner => "partner",
            ContentKind::Founder => "founder",
            ContentKind::Document => "document",
            ContentKind::Faculty => "faculty",
            ContentKind::Accreditation => "accreditation",
            ContentKind::Infrastructure => "infrastructure",
            ContentKind::Journal => "journal",
            ContentKind::Guide => "guide",
            ContentKind::OrgUnit => "org-unit",
            ContentKind::Management => "management",
            ContentKind::AboutSection => "about-section",
            ContentKind::Mission => "mission",
            ContentKind::History => "history",
            ContentKind::ValueItem => "value-item",
            ContentKind::Priority => "priority",
            ContentKind::Achievement => "achievement",
        }
    }

    /// Parse a URL / storage token. Unknown tokens are a not-found case
    /// for the caller, not a panic.
    pub fn parse(token: &str) -> Option<ContentKind> {
        ContentKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == token)
    }

    /// Kinds forming self-referential parent/children hierarchies.
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, ContentKind::OrgUnit | ContentKind::Management)
    }

    /// Kinds acting as the single primary record of an aggregate.
    pub fn is_singleton(&self) -> bool {
        matches!(self, ContentKind::AboutSection | ContentKind::Mission)
    }

    /// Kinds whose records carry a downloadable media file.
    pub fn is_downloadable(&self) -> bool {
        matches!(
            self,
            ContentKind::Document | ContentKind::Journal | ContentKind::Guide
        )
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
