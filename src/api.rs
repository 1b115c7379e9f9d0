//! axum glue: validation errors as `400 Bad Request`, and path extractors
//! that reject bad resource names before a handler runs.

use std::borrow::Cow;

use axum::{
    extract::{
        path::ErrorKind, rejection::PathRejection, FromRequestParts, MatchedPath, OriginalUri,
        Path,
    },
    response::{IntoResponse, Response},
    Json,
};
use http::{request::Parts, StatusCode};
use percent_encoding::percent_decode_str;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use crate::{name::ResourceName, validation::ValidationError};

/// JSON body of a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// `"non_ascii"` or `"length_exceeded"`.
    pub code: String,
    pub message: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl From<&ValidationError> for ErrorBody {
    fn from(e: &ValidationError) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.to_string(),
            value: e.value().to_string(),
            limit: e.limit(),
        }
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        info!(code = self.code(), value = %self.value(), "invalid resource name");
        (StatusCode::BAD_REQUEST, Json(ErrorBody::from(&self))).into_response()
    }
}

/// Extractor for a route with a single capture, e.g. `/workspaces/{name}`.
#[derive(Debug, Clone)]
pub struct ValidName(pub ResourceName);

impl<S> FromRequestParts<S> for ValidName
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw: String = captures(parts, state).await?;

        ResourceName::parse(raw)
            .map(Self)
            .map_err(IntoResponse::into_response)
    }
}

/// Extractor for routes with any number of captures, e.g.
/// `/namespaces/{namespace}/workspaces/{name}`.
///
/// Captures are checked in route order and the first bad one is reported.
#[derive(Debug, Clone)]
pub struct ValidNames(pub Vec<(String, ResourceName)>);

impl ValidNames {
    pub fn get(&self, key: &str) -> Option<&ResourceName> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, name)| name)
    }
}

impl<S> FromRequestParts<S> for ValidNames
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw: Vec<(String, String)> = captures(parts, state).await?;

        let mut names = Vec::with_capacity(raw.len());
        for (key, raw) in raw {
            let name = ResourceName::parse(raw).map_err(IntoResponse::into_response)?;
            names.push((key, name));
        }

        Ok(Self(names))
    }
}

/// Path captures as `T`. A capture that is not valid UTF-8 after
/// percent-decoding is a non-ASCII name; other rejections pass through.
async fn captures<T, S>(parts: &mut Parts, state: &S) -> Result<T, Response>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    match Path::<T>::from_request_parts(parts, state).await {
        Ok(Path(value)) => Ok(value),
        Err(rejection) => Err(match undecodable_capture(parts, &rejection) {
            Some(e) => e.into_response(),
            None => rejection.into_response(),
        }),
    }
}

fn undecodable_capture(parts: &Parts, rejection: &PathRejection) -> Option<ValidationError> {
    let PathRejection::FailedToDeserializePathParams(e) = rejection else {
        return None;
    };
    let ErrorKind::InvalidUtf8InPathParam { key, .. } = e.kind() else {
        return None;
    };

    // axum keeps only the key of the bad capture, so recover its raw
    // segment from the route template and the request path.
    let template = parts.extensions.get::<MatchedPath>()?.as_str();
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(parts.uri.path(), |uri| uri.0.path());
    let raw = raw_capture(template, path, key)?;

    let bytes: Cow<'_, [u8]> = percent_decode_str(raw).into();
    Some(ValidationError::NonAscii {
        value: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Still-encoded text of capture `key`, for whole-segment captures
/// (`{key}`) and trailing wildcards (`{*key}`).
fn raw_capture<'a>(template: &str, path: &'a str, key: &str) -> Option<&'a str> {
    for (i, segment) in template.split('/').enumerate() {
        let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
            continue;
        };
        if name == key {
            return path.split('/').nth(i);
        }
        if name.strip_prefix('*') == Some(key) {
            return path.splitn(i + 1, '/').nth(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_from_length_error() {
        let err = ValidationError::LengthExceeded {
            value: "abc".to_string(),
            limit: 2,
        };
        let body = ErrorBody::from(&err);

        assert_eq!(body.code, "length_exceeded");
        assert_eq!(body.value, "abc");
        assert_eq!(body.limit, Some(2));
        assert_eq!(
            body.message,
            "Invalid value: 'abc' exceeds the allowed limit of 2 characters."
        );
    }

    #[test]
    fn non_ascii_body_omits_limit() {
        let err = ValidationError::NonAscii {
            value: "nö".to_string(),
        };
        let json = serde_json::to_value(ErrorBody::from(&err)).unwrap();

        assert_eq!(json["code"], "non_ascii");
        assert!(json.get("limit").is_none());
    }

    #[test]
    fn raw_capture_finds_segments() {
        let template = "/namespaces/{namespace}/workspaces/{name}";
        let path = "/namespaces/team-a/workspaces/my-p%FFd";

        assert_eq!(raw_capture(template, path, "namespace"), Some("team-a"));
        assert_eq!(raw_capture(template, path, "name"), Some("my-p%FFd"));
        assert_eq!(raw_capture(template, path, "missing"), None);
    }

    #[test]
    fn raw_capture_takes_rest_for_wildcards() {
        assert_eq!(
            raw_capture("/files/{*tail}", "/files/a/b%FF/c", "tail"),
            Some("a/b%FF/c")
        );
    }

    #[test]
    fn validation_error_is_bad_request() {
        let err = ValidationError::NonAscii {
            value: "nö".to_string(),
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
