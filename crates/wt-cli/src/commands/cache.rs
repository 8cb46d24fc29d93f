//! Cache inspection and maintenance.

use std::io::Write;

use anyhow::Result;

use wt_db::Database;

/// Lists persisted category assignments, sorted by name.
pub fn show<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let mut entries = db.load_cache()?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    if entries.is_empty() {
        writeln!(writer, "Category cache is empty.")?;
        return Ok(());
    }

    writeln!(writer, "Category cache ({} entries):", entries.len())?;
    for (name, assignment) in entries {
        writeln!(
            writer,
            "  {name}: {} ({})",
            assignment.category, assignment.source
        )?;
    }
    Ok(())
}

/// Drops every persisted assignment.
pub fn clear<W: Write>(writer: &mut W, db: &mut Database) -> Result<()> {
    let removed = db.clear_cache()?;
    writeln!(writer, "Cleared {removed} cached assignments.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use wt_core::{Assignment, Category, ResolutionSource};

    fn seed(db: &mut Database) {
        db.save_cache(&[
            (
                "vscode".to_string(),
                Assignment {
                    category: Category::Work,
                    source: ResolutionSource::Override,
                },
            ),
            (
                "mystery app".to_string(),
                Assignment {
                    category: Category::SystemTools,
                    source: ResolutionSource::KeywordFallback,
                },
            ),
        ])
        .unwrap();
    }

    #[test]
    fn show_lists_entries_sorted() {
        let mut db = Database::open_in_memory().unwrap();
        seed(&mut db);

        let mut output = Vec::new();
        show(&mut output, &db).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Category cache (2 entries):
          mystery app: SystemTools (keyword-fallback)
          vscode: Work (override)
        ");
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut db = Database::open_in_memory().unwrap();
        seed(&mut db);

        let mut output = Vec::new();
        clear(&mut output, &mut db).unwrap();
        assert_snapshot!(
            String::from_utf8(output).unwrap(),
            @"Cleared 2 cached assignments."
        );
        assert_eq!(db.cache_len().unwrap(), 0);
    }

    #[test]
    fn empty_cache_reports_as_such() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        show(&mut output, &db).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @"Category cache is empty.");
    }
}
