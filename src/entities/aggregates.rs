// 🧩 Aggregate Catalog - Aggregates as data
//
// Which child collections an aggregate carries, and which flag on the
// primary record gates each of them, is configuration - a static table,
// not per-endpoint branching. Adding an aggregate means adding a row here.

use super::kind::ContentKind;

// ============================================================================
// AGGREGATE DEFINITIONS
// ============================================================================

/// One gated child collection of an aggregate.
#[derive(Debug, Clone, Copy)]
pub struct ChildSpec {
    /// Key the collection is emitted under in the response
    pub name: &'static str,

    /// Flag on the primary record gating the collection
    pub flag: &'static str,

    /// Catalog kind the collection's records come from
    pub kind: ContentKind,
}

/// A named aggregate: one singleton primary plus gated child collections.
#[derive(Debug, Clone, Copy)]
pub struct AggregateDef {
    /// Endpoint name ("about", "mission")
    pub name: &'static str,

    /// Kind of the single active primary record
    pub primary: ContentKind,

    /// Child collections, in response order
    pub children: &'static [ChildSpec],
}

/// All aggregates the site serves.
pub const AGGREGATES: &[AggregateDef] = &[
    AggregateDef {
        name: "about",
        primary: ContentKind::AboutSection,
        children: &[ChildSpec {
            name: "partners",
            flag: "show_partners",
            kind: ContentKind::Partner,
        }],
    },
    AggregateDef {
        name: "mission",
        primary: ContentKind::Mission,
        children: &[
            ChildSpec {
                name: "history",
                flag: "show_history",
                kind: ContentKind::History,
            },
            ChildSpec {
                name: "values",
                flag: "show_values",
                kind: ContentKind::ValueItem,
            },
            ChildSpec {
                name: "priorities",
                flag: "show_priorities",
                kind: ContentKind::Priority,
            },
            ChildSpec {
                name: "achievements",
                flag: "show_achievements",
                kind: ContentKind::Achievement,
            },
        ],
    },
];

/// Look up an aggregate by endpoint name.
pub fn find_aggregate(name: &str) -> Option<&'static AggregateDef> {
    AGGREGATES.iter().find(|def| def.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_aggregate() {
        let about = find_aggregate("about").unwrap();
        assert_eq!(about.primary, ContentKind::AboutSection);
        assert_eq!(about.children.len(), 1);
        assert_eq!(about.children[0].name, "partners");
        assert_eq!(about.children[0].flag, "show_partners");

        let mission = find_aggregate("mission").unwrap();
        assert_eq!(mission.primary, ContentKind::Mission);
        assert_eq!(mission.children.len(), 4);

        assert!(find_aggregate("nonexistent").is_none());
    }

    #[test]
    fn test_aggregate_primaries_are_singletons() {
        for def in AGGREGATES {
            assert!(def.primary.is_singleton(), "{} primary", def.name);
        }
    }

    #[test]
    fn test_child_names_unique_within_aggregate() {
        for def in AGGREGATES {
            for (i, a) in def.children.iter().enumerate() {
                for b in &def.children[i + 1..] {
                    assert_ne!(a.name, b.name, "{} children", def.name);
                }
            }
        }
    }
}
