//! Compact previews of unparseable response bodies for error messages.

use reqwest::StatusCode;

/// Character budget for a body preview before it is truncated.
pub(crate) const PREVIEW_CHAR_LIMIT: usize = 160;

/// Collapse whitespace in `body` and truncate it to [`PREVIEW_CHAR_LIMIT`].
pub(crate) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// `status N: <preview>`, or `status N` when the body is blank.
pub(crate) fn status_with_preview(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn long_previews_are_truncated() {
        let body = "x".repeat(PREVIEW_CHAR_LIMIT + 20);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), PREVIEW_CHAR_LIMIT + 3);
        assert!(preview.ends_with("..."));
    }

    #[rstest]
    #[case::markup(b"<h1>Bad\n   gateway</h1>".as_slice(), "status 502: <h1>Bad gateway</h1>")]
    #[case::blank(b"  \n ".as_slice(), "status 502")]
    fn status_messages_embed_the_preview(#[case] body: &[u8], #[case] expected: &str) {
        assert_eq!(status_with_preview(StatusCode::BAD_GATEWAY, body), expected);
    }
}
