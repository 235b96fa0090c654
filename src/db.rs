// 🗄️ Content Storage - SQLite backing for the read API
//
// The core logic needs exactly two query shapes from storage: "all active
// records of a kind, optionally under a parent" and "the single active
// primary record of a kind". Everything else here is setup, seeding and
// stats. Collections are always fetched in one batch and shaped in memory;
// nothing queries per node or per child.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Deserialize;

use crate::entities::ContentKind;
use crate::localized::LocalizedField;
use crate::record::{sort_siblings, ContentRecord, FeatureFlags};

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Content Records Table
    // One table for every catalog kind; localized attributes and feature
    // flags ride in JSON columns.
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS content_records (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            parent_id TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            fields TEXT NOT NULL,
            flags TEXT NOT NULL DEFAULT '{}',
            file_path TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_content_kind_active ON content_records(kind, is_active)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_content_parent ON content_records(parent_id)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// WRITES
// ============================================================================

/// Insert a batch of records inside one transaction.
pub fn insert_records(conn: &Connection, records: &[ContentRecord]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;

    let mut inserted = 0;
    for record in records {
        let fields_json = serde_json::to_string(&record.fields)?;
        let flags_json = serde_json::to_string(&record.flags)?;

        tx.execute(
            "INSERT OR REPLACE INTO content_records (
                id, kind, parent_id, sort_order, is_active,
                fields, flags, file_path, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id,
                record.kind.as_str(),
                record.parent_id,
                record.order,
                record.is_active,
                fields_json,
                flags_json,
                record.file_path,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        inserted += 1;
    }

    tx.commit()?;
    Ok(inserted)
}

// ============================================================================
// READS
// ============================================================================

const RECORD_COLUMNS: &str =
    "id, kind, parent_id, sort_order, is_active, fields, flags, file_path, created_at, updated_at";

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ContentRecord> {
    let kind_token: String = row.get(1)?;
    let fields_json: String = row.get(5)?;
    let flags_json: String = row.get(6)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(ContentRecord {
        id: row.get(0)?,
        kind: ContentKind::parse(&kind_token).ok_or(rusqlite::Error::InvalidQuery)?,
        parent_id: row.get(2)?,
        order: row.get(3)?,
        is_active: row.get(4)?,
        fields: serde_json::from_str(&fields_json).map_err(|_| rusqlite::Error::InvalidQuery)?,
        flags: serde_json::from_str(&flags_json).map_err(|_| rusqlite::Error::InvalidQuery)?,
        file_path: row.get(7)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn parse_timestamp(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| rusqlite::Error::InvalidQuery)
}

/// All active records of a kind, sorted by `order` then canonical name.
pub fn get_active_records(conn: &Connection, kind: ContentKind) -> Result<Vec<ContentRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM content_records
         WHERE kind = ?1 AND is_active = 1"
    ))?;

    let mut records = stmt
        .query_map(params![kind.as_str()], row_to_record)?
        .collect::<Result<Vec<_>, _>>()?;

    // Name tie-breaks live inside the fields JSON, so ordering is applied
    // here rather than in SQL
    sort_siblings(&mut records);
    Ok(records)
}

/// Active records of a kind under one parent, sorted like siblings.
pub fn get_active_children(
    conn: &Connection,
    kind: ContentKind,
    parent_id: &str,
) -> Result<Vec<ContentRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM content_records
         WHERE kind = ?1 AND parent_id = ?2 AND is_active = 1"
    ))?;

    let mut records = stmt
        .query_map(params![kind.as_str(), parent_id], row_to_record)?
        .collect::<Result<Vec<_>, _>>()?;

    sort_siblings(&mut records);
    Ok(records)
}

/// The single active primary record for an aggregate kind, if any.
/// When several actives exist the lowest `(order, name)` wins.
pub fn get_primary_record(conn: &Connection, kind: ContentKind) -> Result<Option<ContentRecord>> {
    let mut records = get_active_records(conn, kind)?;
    if records.is_empty() {
        Ok(None)
    } else {
        Ok(Some(records.swap_remove(0)))
    }
}

/// One active record by id.
pub fn get_record_by_id(conn: &Connection, id: &str) -> Result<Option<ContentRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM content_records
         WHERE id = ?1 AND is_active = 1"
    ))?;

    let mut records = stmt
        .query_map(params![id], row_to_record)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records.pop())
}

/// Active record counts per kind, in catalog order.
pub fn count_by_kind(conn: &Connection) -> Result<Vec<(ContentKind, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT kind, COUNT(*) FROM content_records
         WHERE is_active = 1 GROUP BY kind",
    )?;

    let counted: BTreeMap<String, i64> = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(ContentKind::ALL
        .iter()
        .map(|kind| (*kind, counted.get(kind.as_str()).copied().unwrap_or(0)))
        .collect())
}

// ============================================================================
// SEED IMPORT
// ============================================================================

/// One row of the seed CSV. Localized attributes come as wide column
/// triplets: `name`, `name_en`, `name_kg` and so on - the `_kg` suffix is
/// the legacy Kyrgyz column naming the site's content files still use.
#[derive(Debug, Deserialize)]
struct SeedRow {
    kind: String,

    /// Symbolic row reference other rows can name as their parent
    #[serde(default, rename = "ref")]
    row_ref: Option<String>,

    #[serde(default)]
    parent_ref: Option<String>,

    #[serde(default)]
    order: Option<i64>,

    #[serde(default)]
    active: Option<bool>,

    #[serde(default)]
    file_path: Option<String>,

    /// Comma-separated flag names to enable (e.g. "show_partners,show_history")
    #[serde(default)]
    flags: Option<String>,

    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    name_en: Option<String>,
    #[serde(default)]
    name_kg: Option<String>,

    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    title_en: Option<String>,
    #[serde(default)]
    title_kg: Option<String>,

    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    description_en: Option<String>,
    #[serde(default)]
    description_kg: Option<String>,

    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    body_en: Option<String>,
    #[serde(default)]
    body_kg: Option<String>,

    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    position_en: Option<String>,
    #[serde(default)]
    position_kg: Option<String>,
}

impl SeedRow {
    fn attr_fields(&self) -> BTreeMap<String, LocalizedField> {
        let triplets: [(&str, &Option<String>, &Option<String>, &Option<String>); 5] = [
            ("name", &self.name, &self.name_en, &self.name_kg),
            ("title", &self.title, &self.title_en, &self.title_kg),
            (
                "description",
                &self.description,
                &self.description_en,
                &self.description_kg,
            ),
            ("body", &self.body, &self.body_en, &self.body_kg),
            ("position", &self.position, &self.position_en, &self.position_kg),
        ];

        let mut fields = BTreeMap::new();
        for (attr, ru, en, kg) in triplets {
            let ru = ru.as_deref().unwrap_or("");
            let en = en.as_deref().unwrap_or("");
            let kg = kg.as_deref().unwrap_or("");
            // An attribute exists if any of its three columns carries text
            if !ru.is_empty() || !en.is_empty() || !kg.is_empty() {
                fields.insert(attr.to_string(), LocalizedField::new(ru, en, kg));
            }
        }
        fields
    }

    fn flag_set(&self) -> FeatureFlags {
        let mut flags = FeatureFlags::new();
        if let Some(raw) = &self.flags {
            for name in raw.split(',') {
                let name = name.trim();
                if !name.is_empty() {
                    flags.set(name, true);
                }
            }
        }
        flags
    }
}

/// Load content records from a seed CSV.
///
/// Symbolic `parent_ref` links are resolved to the generated UUIDs within
/// the same file; a reference to an unknown row is an authoring error and
/// fails the import.
pub fn load_seed_csv(csv_path: &Path) -> Result<Vec<ContentRecord>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open seed CSV")?;

    let mut rows: Vec<SeedRow> = Vec::new();
    for result in rdr.deserialize() {
        let row: SeedRow = result.context("Failed to deserialize seed row")?;
        rows.push(row);
    }

    // First pass: create records and remember symbolic refs
    let mut records: Vec<ContentRecord> = Vec::new();
    let mut ref_ids: BTreeMap<String, String> = BTreeMap::new();

    for (line, row) in rows.iter().enumerate() {
        let Some(kind) = ContentKind::parse(&row.kind) else {
            bail!("Unknown content kind '{}' in seed row {}", row.kind, line + 2);
        };

        let mut record = ContentRecord::new(kind);
        record.order = row.order.unwrap_or(0);
        record.is_active = row.active.unwrap_or(true);
        record.fields = row.attr_fields();
        record.flags = row.flag_set();
        record.file_path = row.file_path.clone();

        if let Some(row_ref) = &row.row_ref {
            if ref_ids.insert(row_ref.clone(), record.id.clone()).is_some() {
                bail!("Duplicate seed ref '{}' in row {}", row_ref, line + 2);
            }
        }

        records.push(record);
    }

    // Second pass: resolve parents
    for (line, (record, row)) in records.iter_mut().zip(rows.iter()).enumerate() {
        if let Some(parent_ref) = &row.parent_ref {
            match ref_ids.get(parent_ref) {
                Some(parent_id) => record.parent_id = Some(parent_id.clone()),
                None => bail!(
                    "Unknown parent_ref '{}' in seed row {}",
                    parent_ref,
                    line + 2
                ),
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn partner(name: &str, order: i64) -> ContentRecord {
        ContentRecord::new(ContentKind::Partner)
            .with_field("name", LocalizedField::canonical(name))
            .with_order(order)
    }

    #[test]
    fn test_insert_and_fetch_round_trip() {
        let conn = test_conn();
        let original = ContentRecord::new(ContentKind::Partner)
            .with_field("name", LocalizedField::new("Больница", "Hospital", ""))
            .with_flag("show_partners", true)
            .with_order(3);

        insert_records(&conn, &[original.clone()]).unwrap();

        let fetched = get_record_by_id(&conn, &original.id).unwrap().unwrap();
        assert_eq!(fetched.id, original.id);
        assert_eq!(fetched.kind, ContentKind::Partner);
        assert_eq!(fetched.order, 3);
        assert_eq!(fetched.fields, original.fields);
        assert_eq!(fetched.flags, original.flags);
    }

    #[test]
    fn test_active_records_sorted_and_filtered() {
        let conn = test_conn();
        insert_records(
            &conn,
            &[
                partner("B", 2),
                partner("A", 1),
                partner("Hidden", 0).inactive(),
            ],
        )
        .unwrap();

        let records = get_active_records(&conn, ContentKind::Partner).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.canonical_name()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_inactive_record_invisible_by_id() {
        let conn = test_conn();
        let hidden = partner("Hidden", 0).inactive();
        insert_records(&conn, &[hidden.clone()]).unwrap();

        assert!(get_record_by_id(&conn, &hidden.id).unwrap().is_none());
    }

    #[test]
    fn test_primary_record_selection() {
        let conn = test_conn();
        assert!(get_primary_record(&conn, ContentKind::AboutSection)
            .unwrap()
            .is_none());

        let second = ContentRecord::new(ContentKind::AboutSection)
            .with_field("title", LocalizedField::canonical("Вторая"))
            .with_order(2);
        let first = ContentRecord::new(ContentKind::AboutSection)
            .with_field("title", LocalizedField::canonical("Первая"))
            .with_order(1);
        insert_records(&conn, &[second, first.clone()]).unwrap();

        let primary = get_primary_record(&conn, ContentKind::AboutSection)
            .unwrap()
            .unwrap();
        assert_eq!(primary.id, first.id);
    }

    #[test]
    fn test_children_fetch() {
        let conn = test_conn();
        let root = ContentRecord::new(ContentKind::OrgUnit)
            .with_field("name", LocalizedField::canonical("Ректорат"));
        let child = ContentRecord::new(ContentKind::OrgUnit)
            .with_field("name", LocalizedField::canonical("Отдел"))
            .with_parent(root.id.clone());
        insert_records(&conn, &[root.clone(), child.clone()]).unwrap();

        let children = get_active_children(&conn, ContentKind::OrgUnit, &root.id).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, child.id);
    }

    #[test]
    fn test_count_by_kind() {
        let conn = test_conn();
        insert_records(&conn, &[partner("A", 1), partner("B", 2)]).unwrap();

        let counts = count_by_kind(&conn).unwrap();
        let partners = counts
            .iter()
            .find(|(kind, _)| *kind == ContentKind::Partner)
            .unwrap();
        assert_eq!(partners.1, 2);

        let faculties = counts
            .iter()
            .find(|(kind, _)| *kind == ContentKind::Faculty)
            .unwrap();
        assert_eq!(faculties.1, 0);
    }

    fn write_seed(content: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("campus-seed-{}.csv", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_seed_csv() {
        let path = write_seed(
            "kind,ref,parent_ref,order,active,flags,name,name_en,name_kg\n\
             org-unit,rectorate,,1,,,Ректорат,Rectorate,\n\
             org-unit,,rectorate,1,,,Отдел кадров,,\n\
             about-section,,,1,,show_partners,О нас,About,\n",
        );

        let records = load_seed_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kind, ContentKind::OrgUnit);
        assert!(records[0].is_root());
        assert_eq!(records[1].parent_id, Some(records[0].id.clone()));
        assert_eq!(records[1].fields["name"].ru, "Отдел кадров");
        assert!(records[2].flags.enabled("show_partners"));
    }

    #[test]
    fn test_load_seed_csv_unknown_parent_ref_fails() {
        let path = write_seed(
            "kind,ref,parent_ref,order,active,flags,name,name_en,name_kg\n\
             org-unit,,missing,1,,,Отдел,,\n",
        );

        let result = load_seed_csv(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_load_seed_csv_unknown_kind_fails() {
        let path = write_seed(
            "kind,ref,parent_ref,order,active,flags,name,name_en,name_kg\n\
             mystery,,,1,,,X,,\n",
        );

        let result = load_seed_csv(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
