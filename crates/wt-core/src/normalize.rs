//! App name normalization.
//!
//! The normalized form is the cache and override key: lower-cased, hyphens
//! and underscores turned into spaces, all other punctuation stripped,
//! whitespace collapsed.

/// Normalizes an application name into its lookup-key form.
///
/// Idempotent: normalizing an already-normalized name is a no-op.
#[must_use]
pub fn normalize_app_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_space = true; // leading whitespace is trimmed

    for c in name.chars() {
        let c = match c {
            '-' | '_' => ' ',
            other => other,
        };
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_was_space = false;
        }
        // remaining punctuation is dropped
    }

    if out.ends_with(' ') {
        out.pop();
    }
    out
}
