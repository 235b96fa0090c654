// Campus Content Backend - CLI
// Seeds the content database from CSV and reports per-kind stats

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use rusqlite::Connection;

use campus_content::{
    count_by_kind, insert_records, load_seed_csv, setup_database, AppConfig,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("seed") => {
            let Some(csv_path) = args.get(2) else {
                bail!("Usage: campus-content seed <csv> [db]");
            };
            run_seed(Path::new(csv_path), args.get(3).map(PathBuf::from))
        }
        Some("stats") => run_stats(args.get(2).map(PathBuf::from)),
        _ => {
            println!("Campus Content Backend v{}", campus_content::VERSION);
            println!();
            println!("Usage:");
            println!("  campus-content seed <csv> [db]   Import content records from a seed CSV");
            println!("  campus-content stats [db]        Show active record counts per kind");
            Ok(())
        }
    }
}

fn db_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| AppConfig::default().database_path)
}

fn run_seed(csv_path: &Path, db: Option<PathBuf>) -> Result<()> {
    let db_path = db_path(db);

    println!("🗄️  Content Seed Import - CSV → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load seed CSV
    println!("\n📂 Loading seed CSV...");
    let records = load_seed_csv(csv_path)?;
    println!("✓ Loaded {} content records from {:?}", records.len(), csv_path);

    // 2. Setup database
    println!("\n🔧 Setting up database...");
    let conn = Connection::open(&db_path)?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode");

    // 3. Insert records
    println!("\n💾 Inserting records...");
    let inserted = insert_records(&conn, &records)?;
    println!("✓ Inserted {} records", inserted);

    // 4. Per-kind summary
    println!("\n🔍 Verifying database...");
    print_counts(&conn)?;

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🎉 Seed import complete: {:?}", db_path);

    Ok(())
}

fn run_stats(db: Option<PathBuf>) -> Result<()> {
    let db_path = db_path(db);

    if !db_path.exists() {
        bail!(
            "Database not found at {:?}. Run: campus-content seed <csv> first.",
            db_path
        );
    }

    let conn = Connection::open(&db_path)?;

    println!("📊 Active content records by kind");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    print_counts(&conn)?;

    Ok(())
}

fn print_counts(conn: &Connection) -> Result<()> {
    let mut total = 0;
    for (kind, count) in count_by_kind(conn)? {
        if count > 0 {
            println!("  {:<16} {}", kind.as_str(), count);
            total += count;
        }
    }
    println!("  {:<16} {}", "total", total);
    Ok(())
}
