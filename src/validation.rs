use validator::ValidationError;

/// Validates a theme identifier: lowercase ascii letters, digits and single dashes
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let well_formed = !slug.is_empty()
        && slug.len() <= 64
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !well_formed {
        let mut error = ValidationError::new("invalid_slug");
        error.message = Some(format!("'{}' is not a valid theme id", slug).into());
        return Err(error);
    }
    Ok(())
}
