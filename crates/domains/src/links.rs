//! Canonical channel-post link construction.
//!
//! The post link doubles as the deduplication key for issue links, so the
//! format must stay stable across releases.

/// Builds the canonical URL of a channel post.
///
/// Public channels use the handle form. Handle-less channels fall back to
/// the private `/c/` form, where the channel id loses its `-100` marker.
pub fn channel_post_url(handle: Option<&str>, channel_id: i64, message_id: i64) -> String {
    match handle {
        Some(handle) => format!("https://t.me/{}/{}", handle, message_id),
        None => format!(
            "https://t.me/c/{}/{}",
            internal_channel_id(channel_id),
            message_id
        ),
    }
}

/// URL of a discussion reply, expressed as a comment on the channel post.
pub fn comment_url(post_url: &str, comment_message_id: i64) -> String {
    format!("{}?comment={}", post_url, comment_message_id)
}

fn internal_channel_id(channel_id: i64) -> i64 {
    channel_id
        .to_string()
        .strip_prefix("-100")
        .and_then(|rest| rest.parse().ok())
        .unwrap_or_else(|| channel_id.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_channel_uses_handle() {
        assert_eq!(
            channel_post_url(Some("acme"), -1001234567890, 42),
            "https://t.me/acme/42"
        );
    }

    #[test]
    fn private_channel_strips_marker() {
        assert_eq!(
            channel_post_url(None, -1001234567890, 42),
            "https://t.me/c/1234567890/42"
        );
    }

    #[test]
    fn unmarked_id_falls_back_to_absolute_value() {
        assert_eq!(channel_post_url(None, -42, 7), "https://t.me/c/42/7");
    }

    #[test]
    fn comment_link_appends_query() {
        let post = channel_post_url(Some("acme"), -100123, 42);
        assert_eq!(comment_url(&post, 99), "https://t.me/acme/42?comment=99");
    }
}
