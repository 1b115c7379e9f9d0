use tracing::debug;

/// Longest resource name accepted by [`validate_resource_names`], in bytes.
pub const MAX_RESOURCE_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid value: '{value}' contains non-ASCII characters.")]
    NonAscii { value: String },

    #[error("Invalid value: '{value}' exceeds the allowed limit of {limit} characters.")]
    LengthExceeded { value: String, limit: usize },
}

impl ValidationError {
    /// Stable machine-readable code, used as `code` in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NonAscii { .. } => "non_ascii",
            Self::LengthExceeded { .. } => "length_exceeded",
        }
    }

    /// The rejected input, verbatim.
    pub fn value(&self) -> &str {
        match self {
            Self::NonAscii { value } | Self::LengthExceeded { value, .. } => value,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::NonAscii { .. } => None,
            Self::LengthExceeded { limit, .. } => Some(*limit),
        }
    }
}

/// Validate resource names in order, stopping at the first one that fails.
///
/// Each name must be ASCII only and at most [`MAX_RESOURCE_NAME_LEN`] bytes.
/// Names after the first failure are never pulled from `names`.
pub fn validate_resource_names<I, S>(names: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for name in names {
        validate_resource_name(name.as_ref())?;
    }
    Ok(())
}

pub fn validate_resource_name(name: &str) -> Result<(), ValidationError> {
    check_non_ascii(name)
        .and_then(|()| check_length(name, MAX_RESOURCE_NAME_LEN))
        .inspect_err(|e| debug!(code = e.code(), value = %e.value(), "resource name rejected"))
}

/// `&str` is always valid UTF-8, so ASCII-only is the same as every char
/// taking exactly one byte.
pub fn check_non_ascii(name: &str) -> Result<(), ValidationError> {
    if name.is_ascii() {
        Ok(())
    } else {
        Err(ValidationError::NonAscii {
            value: name.to_string(),
        })
    }
}

/// Fails when `name` is longer than `limit` bytes.
pub fn check_length(name: &str, limit: usize) -> Result<(), ValidationError> {
    if name.len() > limit {
        return Err(ValidationError::LengthExceeded {
            value: name.to_string(),
            limit,
        });
    }
    Ok(())
}
