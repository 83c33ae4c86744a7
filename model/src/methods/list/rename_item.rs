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
    pub name: String,
}

impl Params {
    /// ## Error
    /// * If `name` is missing, empty or whitespace.
    pub fn new(id: ListId, item_id: ItemId, name: Option<String>) -> Result<Self, InvalidParams> {
        let name = name
            .and_then(crate::non_blank)
            .ok_or(InvalidParams::NameEmptyOrWhitespace)?;

        Ok(Self { id, item_id, name })
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
        Self::new(builder.id, builder.item_id, builder.name)
    }
}

#[derive(serde::Deserialize)]
struct ParamsBuilder {
    id: ListId,
    item_id: ItemId,
    name: Option<String>,
}

#[derive(Debug)]
pub enum InvalidParams {
    InvalidFormat(serde_json::Error),
    NameEmptyOrWhitespace,
}

impl Error for InvalidParams {}

impl Display for InvalidParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            InvalidParams::InvalidFormat(serde_error) => {
                crate::invalid_params_serde_message(&serde_error)
            }
            InvalidParams::NameEmptyOrWhitespace => crate::empty_value_message("name"),
        };

        write!(f, "{}", output)
    }
}

/// `matched` is `false` if the list holds no item with `item_id`, in which case nothing changed.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[non_exhaustive]
pub struct MethodResult {
    pub list_id: ListId,
    pub item_id: ItemId,
    pub name: String,
    pub matched: bool,
}

impl MethodResult {
    pub fn new(list_id: ListId, item_id: ItemId, name: String, matched: bool) -> Self {
        Self {
            list_id,
            item_id,
            name,
            matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operation;

    #[test]
    fn invalid_item_id_test() {
        let request = ApiRequest::new(
            Operation::RenameItem,
            serde_json::json!({ "id": ListId::new_v4(), "item_id": "0", "name": "Oat milk" }),
        );
        match Params::try_from(request) {
            Err(InvalidParams::InvalidFormat(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
