use super::{ItemId, ListId};
use crate::ApiRequest;
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
    pub item_id: ItemId,
}

impl Params {
    pub fn new(id: ListId, item_id: ItemId) -> Self {
        Self { id, item_id }
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
        Ok(Self::new(builder.id, builder.item_id))
    }
}

#[derive(serde::Deserialize)]
struct ParamsBuilder {
    id: ListId,
    item_id: ItemId,
}

#[derive(Debug)]
pub enum InvalidParams {
    InvalidFormat(serde_json::Error),
}

impl Error for InvalidParams {}

impl Display for InvalidParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            InvalidParams::InvalidFormat(serde_error) => {
                crate::invalid_params_serde_message(&serde_error)
            }
        };

        write!(f, "{}", output)
    }
}

/// `matched` is `false` if the list held no item with `item_id`.
/// Removing an absent item is not an error.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[non_exhaustive]
pub struct MethodResult {
    pub list_id: ListId,
    pub item_id: ItemId,
    pub matched: bool,
}

impl MethodResult {
    pub fn new(list_id: ListId, item_id: ItemId, matched: bool) -> Self {
        Self {
            list_id,
            item_id,
            matched,
        }
    }
}
