/// MAL rejects search queries longer than this.
pub const MAX_QUERY_LENGTH: usize = 64;

/// Normalize a free-text search query for the remote API: strip every
/// whitespace character, then truncate to [`MAX_QUERY_LENGTH`] characters.
///
/// Truncation counts characters, not bytes. Idempotent.
pub fn sanitize_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(MAX_QUERY_LENGTH)
        .collect()
}
