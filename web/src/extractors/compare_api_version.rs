use crate::extractors::RejectionType;
use crate::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::StatusCode};
use semver::Version;
use service::config::ApiVersion;

/// Rejects any request whose `x-version` header is missing or names an API
/// version this deployment does not serve.
pub(crate) struct CompareApiVersion(pub Version);

#[async_trait]
impl FromRequestParts<AppState> for CompareApiVersion {
    type Rejection = RejectionType;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(ApiVersion::field_name())
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Missing {} header", ApiVersion::field_name()),
                )
            })?
            .to_str()
            .map_err(|_| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid {} header value", ApiVersion::field_name()),
                )
            })?;

        if !ApiVersion::versions().contains(&header_value) {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unsupported API version: {header_value}"),
            ));
        }

        let version = Version::parse(header_value).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("Unparseable API version: {header_value}"),
            )
        })?;

        Ok(CompareApiVersion(version))
    }
}
