use super::ListId;
use crate::{user::UserId, ApiRequest};
use std::{
    convert::{TryFrom, TryInto},
    error::Error,
    fmt::Display,
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ParamsBuilder")]
#[non_exhaustive]
pub struct Params {
    pub id: ListId,
    pub user_id: UserId,
}

impl Params {
    /// ## Error
    /// * If `user_id` is empty or whitespace.
    pub fn new(id: ListId, user_id: UserId) -> Result<Self, InvalidParams> {
        if user_id.is_empty() {
            return Err(InvalidParams::UserIdEmptyOrWhitespace);
        }

        Ok(Self { id, user_id })
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
        Self::new(builder.id, builder.user_id)
    }
}

#[derive(serde::Deserialize)]
struct ParamsBuilder {
    id: ListId,
    user_id: UserId,
}

#[derive(Debug)]
pub enum InvalidParams {
    InvalidFormat(serde_json::Error),
    UserIdEmptyOrWhitespace,
}

impl Error for InvalidParams {}

impl Display for InvalidParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            InvalidParams::InvalidFormat(serde_error) => {
                crate::invalid_params_serde_message(&serde_error)
            }
            InvalidParams::UserIdEmptyOrWhitespace => crate::empty_value_message("user_id"),
        };

        write!(f, "{}", output)
    }
}

/// `matched` is `false` if `user_id` was not a contributor.
/// Removing an absent contributor is not an error.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[non_exhaustive]
pub struct MethodResult {
    pub list_id: ListId,
    pub user_id: UserId,
    pub matched: bool,
}

impl MethodResult {
    pub fn new(list_id: ListId, user_id: UserId, matched: bool) -> Self {
        Self {
            list_id,
            user_id,
            matched,
        }
    }
}
