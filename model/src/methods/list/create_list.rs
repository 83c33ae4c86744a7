use super::{NewItem, ShoppingList};
use crate::{user::UserId, ApiRequest};
use std::{
    collections::BTreeSet,
    convert::{TryFrom, TryInto},
    error::Error,
    fmt::Display,
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ParamsBuilder")]
#[non_exhaustive]
pub struct Params {
    pub name: String,
    pub items: Vec<NewItem>,
    pub contributors: BTreeSet<UserId>,
}

impl Params {
    /// ## Error
    /// * If `name` is empty or whitespace.
    /// * If any of `items` has an empty name.
    /// * If any of `contributors` is empty.
    pub fn new(
        name: String,
        items: Vec<NewItem>,
        contributors: BTreeSet<UserId>,
    ) -> Result<Self, InvalidParams> {
        let name = crate::non_blank(name).ok_or(InvalidParams::NameEmptyOrWhitespace)?;

        let items = items
            .into_iter()
            .map(|mut item| {
                item.name =
                    crate::non_blank(item.name).ok_or(InvalidParams::ItemNameEmptyOrWhitespace)?;
                Ok(item)
            })
            .collect::<Result<Vec<_>, _>>()?;

        if contributors.iter().any(UserId::is_empty) {
            return Err(InvalidParams::EmptyContributor);
        }

        Ok(Self {
            name,
            items,
            contributors,
        })
    }

    /// Build the list owned by `owner`, assigning ids where the caller left them out.
    pub fn into_list(self, owner: UserId) -> ShoppingList {
        ShoppingList::new(
            super::ListId::new_v4(),
            self.name,
            owner,
            self.contributors,
            self.items.into_iter().map(NewItem::into_item).collect(),
        )
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
        Self::new(
            builder.name,
            builder.items.unwrap_or_default(),
            builder.contributors.unwrap_or_default(),
        )
    }
}

#[derive(serde::Deserialize)]
struct ParamsBuilder {
    name: String,
    items: Option<Vec<NewItem>>,
    contributors: Option<BTreeSet<UserId>>,
}

#[derive(Debug)]
pub enum InvalidParams {
    InvalidFormat(serde_json::Error),
    NameEmptyOrWhitespace,
    ItemNameEmptyOrWhitespace,
    EmptyContributor,
}

impl Error for InvalidParams {}

impl Display for InvalidParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            InvalidParams::InvalidFormat(serde_error) => {
                crate::invalid_params_serde_message(&serde_error)
            }
            InvalidParams::NameEmptyOrWhitespace => crate::empty_value_message("name"),
            InvalidParams::ItemNameEmptyOrWhitespace => crate::empty_value_message("items.name"),
            InvalidParams::EmptyContributor => crate::empty_value_message("contributors"),
        };

        write!(f, "{}", output)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[non_exhaustive]
pub struct MethodResult {
    pub list: ShoppingList,
}

impl MethodResult {
    pub fn new(list: ShoppingList) -> Self {
        Self { list }
    }
}
