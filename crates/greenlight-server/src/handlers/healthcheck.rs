use bytes::Bytes;
use http::{Response, StatusCode};
use serde::Serialize;

use greenlight_extract::{write_json, Envelope};

use crate::{ApiError, Application, VERSION};

#[derive(Debug, Serialize)]
struct SystemInfo<'a> {
    environment: &'a str,
    version: &'a str,
}

/// `GET /v1/healthcheck`: reports availability, environment and version.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] if the response cannot be encoded.
pub fn healthcheck(app: &Application) -> Result<Response<Bytes>, ApiError> {
    let info = SystemInfo {
        environment: &app.config().server.env,
        version: VERSION,
    };
    let mut env = Envelope::new().with("status", "available".into());
    env.insert("system_info", &info)?;

    Ok(write_json(StatusCode::OK, &env, None)?)
}
