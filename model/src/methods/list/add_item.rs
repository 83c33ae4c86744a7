use super::{Item, ListId, NewItem};
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
    pub item: NewItem,
}

impl Params {
    /// ## Error
    /// * If the item name is empty or whitespace.
    pub fn new(id: ListId, mut item: NewItem) -> Result<Self, InvalidParams> {
        item.name = crate::non_blank(item.name).ok_or(InvalidParams::NameEmptyOrWhitespace)?;

        Ok(Self { id, item })
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
        let item = NewItem {
            id: builder.item_id,
            name: builder.name,
            checked: builder.checked,
        };
        Self::new(builder.id, item)
    }
}

#[derive(serde::Deserialize)]
struct ParamsBuilder {
    id: ListId,
    item_id: Option<super::ItemId>,
    name: String,
    checked: Option<bool>,
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

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[non_exhaustive]
pub struct MethodResult {
    pub list_id: ListId,
    pub item: Item,
}

impl MethodResult {
    pub fn new(list_id: ListId, item: Item) -> Self {
        Self { list_id, item }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operation;

    #[test]
    fn deser() {
        let id = ListId::new_v4();
        let request = ApiRequest::new(Operation::AddItem, serde_json::json!({ "name": " Milk" }))
            .with_param("id", id.to_string());

        let params = Params::try_from(request).unwrap();
        assert_eq!(params.id, id);
        assert_eq!(params.item.name, "Milk");

        let item = params.item.into_item();
        assert!(!item.checked);
    }

    #[test]
    fn empty_name_test() {
        let request = ApiRequest::new(
            Operation::AddItem,
            serde_json::json!({ "id": ListId::new_v4(), "name": "" }),
        );
        assert!(Params::try_from(request).is_err());
    }
}
