//! Utility functions

/// Short, log-safe prefix of a secret identifier.
pub fn fingerprint(secret: &str) -> String {
    let end = secret
        .char_indices()
        .nth(8)
        .map(|(i, _)| i)
        .unwrap_or(secret.len());
    format!("{}…", &secret[..end])
}

/// True for same-origin relative paths that are safe to redirect to.
/// Only visible ASCII is accepted, so the path is always a valid
/// `Location` header value.
pub fn is_local_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && target.bytes().all(|b| b.is_ascii_graphic())
}
