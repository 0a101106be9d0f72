//! Parsing and matching for the free-text tag and extension lists.
//!
//! Both lists are comma separated and forgiving: entries are trimmed and
//! lower-cased, and empty entries are dropped, so a blank or malformed value
//! simply disables its rule.

/// Normalizes a single tag: trims, drops one leading `#`, lower-cases.
pub fn normalize_tag(tag: &str) -> String {
    let trimmed = tag.trim();
    trimmed
        .strip_prefix('#')
        .unwrap_or(trimmed)
        .trim()
        .to_lowercase()
}

pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_tag)
        .filter(|tag| !tag.is_empty())
        .collect()
}

pub fn parse_extension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|entry| entry.trim().trim_start_matches('.').trim().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// True when `file_tag` equals `configured` or sits below it in the `/`
/// hierarchy. Both sides are normalized first.
pub fn tag_matches(configured: &str, file_tag: &str) -> bool {
    let configured = normalize_tag(configured);
    let file_tag = normalize_tag(file_tag);
    if configured.is_empty() {
        return false;
    }
    match file_tag.strip_prefix(configured.as_str()) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

pub fn any_tag_matches<'a, I>(configured: &[String], file_tags: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    let file_tags: Vec<&String> = file_tags.into_iter().collect();
    configured.iter().any(|wanted| {
        file_tags
            .iter()
            .any(|file_tag| tag_matches(wanted, file_tag))
    })
}

pub fn extension_listed(configured: &[String], extension: &str) -> bool {
    let extension = extension.trim().to_lowercase();
    !extension.is_empty() && configured.iter().any(|entry| *entry == extension)
}
