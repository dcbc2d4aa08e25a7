//! String helpers for names and identifiers

/// Sanitize a marketplace name into its on-disk identity: lowercase with
/// every character outside `[a-z0-9-_]` replaced by `-`.
pub fn sanitize_marketplace_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Derive a deterministic slug id from an agent name: lowercase,
/// non-alphanumeric runs collapsed to a single `-`, trimmed at both ends.
pub fn agent_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
