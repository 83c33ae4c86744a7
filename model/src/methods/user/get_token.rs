use crate::ApiRequest;
use std::{
    convert::{TryFrom, TryInto},
    error::Error,
    fmt::Display,
};

/// Credentials exchanged for a bearer token.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ParamsBuilder")]
#[non_exhaustive]
pub struct Params {
    /// Trimmed, never empty.
    pub username: String,
    pub password: String,
}

impl Params {
    /// ## Error
    /// * If `username` is empty or whitespace.
    pub fn new(username: String, password: String) -> Result<Self, InvalidParams> {
        let username =
            crate::non_blank(username).ok_or(InvalidParams::UsernameEmptyOrWhitespace)?;

        Ok(Self { username, password })
    }
}

impl TryFrom<ApiRequest> for Params {
    type Error = InvalidParams;

    fn try_from(request: ApiRequest) -> Result<Self, Self::Error> {
        let builder: ParamsBuilder =
            serde_json::from_value(request.params).map_err(InvalidParams::InvalidFormat)?;
        builder.try_into()
    }
}

impl TryFrom<ParamsBuilder> for Params {
    type Error = InvalidParams;

    fn try_from(builder: ParamsBuilder) -> Result<Self, Self::Error> {
        Params::new(builder.username, builder.password)
    }
}

#[derive(serde::Deserialize)]
struct ParamsBuilder {
    username: String,
    password: String,
}

#[derive(Debug)]
pub enum InvalidParams {
    InvalidFormat(serde_json::Error),
    UsernameEmptyOrWhitespace,
}

impl Error for InvalidParams {}

impl Display for InvalidParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            InvalidParams::InvalidFormat(serde_error) => {
                crate::invalid_params_serde_message(&serde_error)
            }
            InvalidParams::UsernameEmptyOrWhitespace => crate::empty_value_message("username"),
        };
        write!(f, "{}", output)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[non_exhaustive]
pub struct MethodResult {
    pub token: String,
}

impl MethodResult {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operation;
    use serde_json::json;

    #[test]
    fn username_is_trimmed_test() {
        let request = ApiRequest::new(
            Operation::GetToken,
            json!({ "username": "  alice ", "password": "correct horse" }),
        );
        let params = Params::try_from(request).unwrap();
        assert_eq!(params.username, "alice");
        assert_eq!(params.password, "correct horse");
    }

    #[test]
    fn blank_username_test() {
        let request = ApiRequest::new(
            Operation::GetToken,
            json!({ "username": " \t", "password": "correct horse" }),
        );
        let err = Params::try_from(request).unwrap_err();
        assert!(matches!(err, InvalidParams::UsernameEmptyOrWhitespace));
        assert_eq!(err.to_string(), crate::empty_value_message("username"));
    }

    #[test]
    fn missing_password_test() {
        let request = ApiRequest::new(Operation::GetToken, json!({ "username": "alice" }));
        let err = Params::try_from(request).unwrap_err();
        assert!(matches!(err, InvalidParams::InvalidFormat(_)));
    }
}
