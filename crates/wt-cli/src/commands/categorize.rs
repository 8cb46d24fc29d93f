//! Categorize command for resolving one name interactively.

use std::io::Write;

use anyhow::Result;

use wt_core::{Classify, Resolver};

/// Resolves a single name and reports the category and which step answered.
pub fn run<W: Write, C: Classify>(
    writer: &mut W,
    resolver: &Resolver<C>,
    name: &str,
    url: Option<&str>,
) -> Result<()> {
    let assignment = resolver.resolve_with_source(name, url);
    writeln!(
        writer,
        "{name}: {} ({})",
        assignment.category, assignment.source
    )?;
    Ok(())
}
