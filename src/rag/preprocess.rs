//! Normalization of extracted document text before chunking.

/// Collapse whitespace runs to one space, drop control characters and
/// trim both ends. Letters of every script are kept untouched.
pub fn clean_text(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.chars() {
        if c.is_whitespace() {
            pending_space = true;
        } else if c.is_control() {
            continue;
        } else {
            if pending_space && !cleaned.is_empty() {
                cleaned.push(' ');
            }
            pending_space = false;
            cleaned.push(c);
        }
    }

    cleaned
}

/// Clean each page and join the non-empty ones with newlines.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .map(|page| clean_text(page.as_ref()))
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
