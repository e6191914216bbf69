use thiserror::Error;

/// Errors that can occur with subject validation
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubjectError {
    /// Subject is empty
    #[error("subject cannot be empty")]
    Empty,

    /// Subject contains invalid characters
    #[error("subject '{0}' contains invalid characters")]
    InvalidCharacters(String),

    /// Subject contains wildcards where they're not allowed
    #[error("subject '{0}' cannot contain wildcards")]
    ContainsWildcards(String),

    /// Empty token between dots
    #[error("subject '{0}' has an empty token")]
    EmptyToken(String),

    /// Invalid wildcard usage
    #[error("subject '{0}' uses '>' anywhere but the last token")]
    InvalidWildcard(String),
}

/// Validates a literal subject (no wildcards allowed), as used for publishing.
///
/// # Errors
/// Returns an error if the subject is empty, has an empty token, contains a wildcard or a
/// character outside `[A-Za-z0-9_-]` in any token.
pub fn validate_subject(subject: &str) -> Result<(), SubjectError> {
    if subject.is_empty() {
        return Err(SubjectError::Empty);
    }

    if subject.contains(['*', '>']) {
        return Err(SubjectError::ContainsWildcards(subject.to_string()));
    }

    for token in subject.split('.') {
        validate_literal_token(subject, token)?;
    }

    Ok(())
}

/// Validates a subject pattern, as used for subscribing.
///
/// `*` may replace any single token and `>` may only appear as the last token.
///
/// # Errors
/// Returns an error describing the first problem found.
pub fn validate_subject_pattern(pattern: &str) -> Result<(), SubjectError> {
    if pattern.is_empty() {
        return Err(SubjectError::Empty);
    }

    let tokens: Vec<&str> = pattern.split('.').collect();
    let last = tokens.len() - 1;

    for (i, token) in tokens.iter().enumerate() {
        match *token {
            ">" if i != last => return Err(SubjectError::InvalidWildcard(pattern.to_string())),
            ">" | "*" => {}
            _ => validate_literal_token(pattern, token)?,
        }
    }

    Ok(())
}

fn validate_literal_token(subject: &str, token: &str) -> Result<(), SubjectError> {
    if token.is_empty() {
        return Err(SubjectError::EmptyToken(subject.to_string()));
    }

    if !token
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(SubjectError::InvalidCharacters(subject.to_string()));
    }

    Ok(())
}

/// Check if a subject matches a pattern with wildcard support
///
/// Wildcards:
/// - `*` matches exactly one token
/// - `>` matches one or more trailing tokens
#[must_use]
pub fn subject_matches_pattern(subject: &str, pattern: &str) -> bool {
    let mut subject_tokens = subject.split('.');
    let mut pattern_tokens = pattern.split('.');

    loop {
        match (pattern_tokens.next(), subject_tokens.next()) {
            (Some(">"), Some(_)) => return true,
            (Some("*"), Some(_)) => {}
            (Some(literal), Some(token)) if literal == token => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    #[test]
    fn test_subject_validation() {
        assert!(validate_subject("orders.created").is_ok());
        assert!(validate_subject("events.user.login").is_ok());
        assert!(validate_subject("test_subject").is_ok());
        assert!(validate_subject("test-subject").is_ok());

        assert_matches!(validate_subject(""), Err(SubjectError::Empty));
        assert_matches!(
            validate_subject("orders.*"),
            Err(SubjectError::ContainsWildcards(_))
        );
        assert_matches!(
            validate_subject("bad..subject"),
            Err(SubjectError::EmptyToken(s)) if s == "bad..subject"
        );
        assert_matches!(
            validate_subject("orders.created$"),
            Err(SubjectError::InvalidCharacters(_))
        );
        assert_matches!(
            validate_subject("orders created"),
            Err(SubjectError::InvalidCharacters(_))
        );
    }

    #[test]
    fn test_pattern_validation() {
        assert!(validate_subject_pattern("orders.*").is_ok());
        assert!(validate_subject_pattern("orders.>").is_ok());
        assert!(validate_subject_pattern("*.user.*").is_ok());
        assert!(validate_subject_pattern(">").is_ok());

        assert_matches!(validate_subject_pattern(""), Err(SubjectError::Empty));
        assert_matches!(
            validate_subject_pattern("bad..subject"),
            Err(SubjectError::EmptyToken(_))
        );
        assert_matches!(
            validate_subject_pattern("orders.>.created"),
            Err(SubjectError::InvalidWildcard(_))
        );
        assert_matches!(
            validate_subject_pattern("orders.created."),
            Err(SubjectError::EmptyToken(_))
        );
    }

    #[test]
    fn test_pattern_matching() {
        assert!(subject_matches_pattern("orders.created", "orders.created"));
        assert!(!subject_matches_pattern("orders.created", "orders.updated"));

        assert!(subject_matches_pattern("orders.created", "orders.*"));
        assert!(subject_matches_pattern("orders.created", "*.created"));
        assert!(!subject_matches_pattern("orders.created.eu", "orders.*"));
        assert!(!subject_matches_pattern("orders", "orders.*"));

        assert!(subject_matches_pattern("orders.created", "orders.>"));
        assert!(subject_matches_pattern("orders.created.eu.west", "orders.>"));
        assert!(subject_matches_pattern("orders", ">"));
        assert!(!subject_matches_pattern("orders", "orders.>"));
        assert!(!subject_matches_pattern("orders.created", "orders.created.>"));
    }
}
