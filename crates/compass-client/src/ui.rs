/// Strip one leading storage prefix from a source identifier for display.
///
/// The identifier itself is never rewritten in conversation state; this only
/// shapes what the user sees.
pub fn display_source<'a>(source: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return source;
    }
    source.strip_prefix(prefix).unwrap_or(source)
}

/// Render a citation list as a single line, e.g. `Sources: a.pdf, b.pdf`.
pub fn format_citations(citations: &[String], prefix: &str) -> Option<String> {
    if citations.is_empty() {
        return None;
    }

    let names = citations
        .iter()
        .map(|c| display_source(c, prefix))
        .collect::<Vec<_>>()
        .join(", ");

    Some(format!("Sources: {names}"))
}
