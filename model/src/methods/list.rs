use crate::user::UserId;
use std::{collections::BTreeSet, fmt::Display, str::FromStr};
use uuid::Uuid;

pub mod add_contributor;
pub mod add_item;
pub mod create_list;
pub mod delete_list;
pub mod get_list;
pub mod get_lists;
pub mod mark_item;
pub mod remove_contributor;
pub mod remove_item;
pub mod rename_item;
pub mod rename_list;

#[derive(
    serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct ListId(Uuid);

impl ListId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ListId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for ListId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Display for ListId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies an item within its list. Stable across renames and checks.
#[derive(
    serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ItemId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub checked: bool,
}

impl Item {
    pub fn new(id: ItemId, name: String, checked: bool) -> Self {
        Self { id, name, checked }
    }
}

/// An item as supplied by a caller, before the server has assigned it an id.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct NewItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl NewItem {
    /// Assign an id (unless one was supplied) and default `checked` to `false`.
    pub fn into_item(self) -> Item {
        Item::new(
            self.id.unwrap_or_else(ItemId::new_v4),
            self.name,
            self.checked.unwrap_or(false),
        )
    }
}

/// A shopping list together with its items and contributors.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ShoppingList {
    pub id: ListId,
    pub name: String,
    pub owner: UserId,
    pub contributors: BTreeSet<UserId>,
    pub items: Vec<Item>,
}

impl ShoppingList {
    /// The owner is never kept as a contributor of their own list, and only
    /// the first of several items sharing an id is kept.
    pub fn new(
        id: ListId,
        name: String,
        owner: UserId,
        contributors: BTreeSet<UserId>,
        items: Vec<Item>,
    ) -> Self {
        let mut contributors = contributors;
        contributors.remove(&owner);
        let mut seen = BTreeSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.id))
            .collect();
        Self {
            id,
            name,
            owner,
            contributors,
            items,
        }
    }

    pub fn item(&self, item_id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == item_id)
    }
}
