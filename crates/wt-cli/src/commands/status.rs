//! Status command for a quick look at database contents.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use wt_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    writeln!(writer, "Activity dashboard status")?;
    writeln!(writer, "Database: {}", database_path.display())?;
    writeln!(writer, "Usage events: {}", db.usage_count()?)?;
    writeln!(writer, "Attendance records: {}", db.attendance_count()?)?;
    writeln!(writer, "Cached categories: {}", db.cache_len()?)?;
    Ok(())
}
