/// Canonical forms for scientific names and rank labels

/// Lower-case a name and collapse all whitespace runs to single spaces.
///
/// Returns `None` for absent, empty, or whitespace-only input so that such
/// names never compare equal to anything. Applying it to its own output is
/// a no-op.
pub fn normalize_name(name: Option<&str>) -> Option<String> {
    let name = name?;
    let mut normalized = String::with_capacity(name.len());

    for word in name.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.extend(word.chars().flat_map(char::to_lowercase));
    }

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Same canonical form, applied to rank labels ("Species", " species ").
pub fn normalize_rank(rank: Option<&str>) -> Option<String> {
    normalize_name(rank)
}

/// Normalize a name that is known to be present.
pub fn normalize(name: &str) -> Option<String> {
    normalize_name(Some(name))
}
