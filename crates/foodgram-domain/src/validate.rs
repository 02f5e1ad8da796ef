//! Field validators for user-supplied text.

pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_PERSON_NAME_LEN: usize = 150;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_TITLE_LEN: usize = 200;

/// Username: word characters plus `.@+-`, 1-150 chars. Reserved: "me".
pub fn validate_username(username: &str) -> bool {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return false;
    }
    if username == "me" {
        return false;
    }
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
}

/// Loose shape check: one `@` with text on both sides, no whitespace.
pub fn validate_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Slug: ASCII letters, digits, `-` and `_`, 1-200 chars.
pub fn validate_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_TITLE_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Colour: `#RRGGBB`.
pub fn validate_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Non-blank text of at most `max` characters.
pub fn validate_text(value: &str, max: usize) -> bool {
    !value.trim().is_empty() && value.chars().count() <= max
}
