//! Targeted changes to a single shopping list.
//!
//! Every change addresses at most one element of `items` or `contributors`
//! (or the `name` scalar). A store applies a [`ListUpdate`] as one atomic
//! update-by-id, so concurrent changes to different elements of the same list
//! never overwrite each other.

use crate::{
    list::{Item, ItemId, ShoppingList},
    user::UserId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListUpdate {
    /// Replace the list name.
    Rename { name: String },
    /// Append an item to the end of `items`.
    PushItem(Item),
    /// Replace the name of the item with `item_id`.
    SetItemName { item_id: ItemId, name: String },
    /// Set `checked` on the item with `item_id`.
    CheckItem { item_id: ItemId },
    /// Remove the item with `item_id`, keeping the order of the rest.
    PullItem { item_id: ItemId },
    /// Insert into `contributors`.
    AddContributor(UserId),
    /// Remove from `contributors`.
    PullContributor(UserId),
}

/// What applying a `ListUpdate` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateEffect {
    /// No list with the given id exists.
    ListNotFound,
    /// The list exists, `matched` elements were changed.
    Applied { matched: u64 },
}

impl UpdateEffect {
    /// `None` if the list was not found, otherwise whether any element was changed.
    pub fn matched(self) -> Option<bool> {
        match self {
            UpdateEffect::ListNotFound => None,
            UpdateEffect::Applied { matched } => Some(matched > 0),
        }
    }
}

impl ShoppingList {
    /// Apply `update` in place, returning the number of changed elements.
    ///
    /// Applying the same update twice leaves the list as applying it once did
    /// (with the exception of `PushItem`, whose item is a new element each time).
    pub fn apply(&mut self, update: &ListUpdate) -> u64 {
        match update {
            ListUpdate::Rename { name } => {
                self.name = name.clone();
                1
            }
            ListUpdate::PushItem(item) => {
                if self.item(&item.id).is_some() {
                    return 0;
                }
                self.items.push(item.clone());
                1
            }
            ListUpdate::SetItemName { item_id, name } => match self.item_mut(item_id) {
                Some(item) => {
                    item.name = name.clone();
                    1
                }
                None => 0,
            },
            ListUpdate::CheckItem { item_id } => match self.item_mut(item_id) {
                Some(item) => {
                    item.checked = true;
                    1
                }
                None => 0,
            },
            ListUpdate::PullItem { item_id } => {
                let before = self.items.len();
                self.items.retain(|item| &item.id != item_id);
                (before - self.items.len()) as u64
            }
            ListUpdate::AddContributor(user_id) => {
                if user_id == &self.owner {
                    return 0;
                }
                self.contributors.insert(user_id.clone()) as u64
            }
            ListUpdate::PullContributor(user_id) => self.contributors.remove(user_id) as u64,
        }
    }

    fn item_mut(&mut self, item_id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| &item.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ListId;

    fn groceries() -> ShoppingList {
        ShoppingList::new(
            ListId::new_v4(),
            "Groceries".to_owned(),
            UserId::new("alice"),
            vec![UserId::new("bob")].into_iter().collect(),
            vec![
                Item::new(ItemId::new_v4(), "Milk".to_owned(), false),
                Item::new(ItemId::new_v4(), "Eggs".to_owned(), true),
                Item::new(ItemId::new_v4(), "Bread".to_owned(), false),
            ],
        )
    }

    #[test]
    fn rename_item_only_touches_target_test() {
        let mut list = groceries();
        let before = list.clone();
        let target = list.items[1].id;

        let matched = list.apply(&ListUpdate::SetItemName {
            item_id: target,
            name: "Free range eggs".to_owned(),
        });

        assert_eq!(matched, 1);
        assert_eq!(list.items.len(), before.items.len());
        assert_eq!(list.items[1].id, target);
        assert_eq!(list.items[1].name, "Free range eggs");
        assert!(list.items[1].checked);
        assert_eq!(list.items[0], before.items[0]);
        assert_eq!(list.items[2], before.items[2]);
        assert_eq!(list.name, before.name);
        assert_eq!(list.contributors, before.contributors);
    }

    #[test]
    fn check_item_only_touches_target_test() {
        let mut list = groceries();
        let before = list.clone();
        let target = list.items[2].id;

        assert_eq!(list.apply(&ListUpdate::CheckItem { item_id: target }), 1);

        assert!(list.items[2].checked);
        assert_eq!(list.items[2].name, "Bread");
        assert_eq!(list.items[..2], before.items[..2]);
    }

    #[test]
    fn unknown_item_is_a_no_op_test() {
        let mut list = groceries();
        let before = list.clone();
        let unknown = ItemId::new_v4();

        for update in &[
            ListUpdate::SetItemName {
                item_id: unknown,
                name: "Butter".to_owned(),
            },
            ListUpdate::CheckItem { item_id: unknown },
            ListUpdate::PullItem { item_id: unknown },
        ] {
            assert_eq!(list.apply(update), 0, "{:?}", update);
        }
        assert_eq!(list, before);
    }

    #[test]
    fn pull_item_keeps_order_test() {
        let mut list = groceries();
        let target = list.items[1].id;

        assert_eq!(list.apply(&ListUpdate::PullItem { item_id: target }), 1);
        let names: Vec<_> = list.items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Bread"]);

        // applying it again changes nothing
        assert_eq!(list.apply(&ListUpdate::PullItem { item_id: target }), 0);
        assert_eq!(list.items.len(), 2);
    }

    #[test]
    fn push_item_appends_test() {
        let mut list = groceries();
        let item = Item::new(ItemId::new_v4(), "Butter".to_owned(), false);

        assert_eq!(list.apply(&ListUpdate::PushItem(item.clone())), 1);
        assert_eq!(list.items.last(), Some(&item));
        assert_eq!(list.items.len(), 4);
    }

    #[test]
    fn contributors_have_set_semantics_test() {
        let mut list = groceries();
        let bob = UserId::new("bob");

        assert_eq!(list.apply(&ListUpdate::AddContributor(bob.clone())), 0);
        assert_eq!(list.apply(&ListUpdate::AddContributor(UserId::new("alice"))), 0);
        assert_eq!(list.contributors.len(), 1);

        let items = list.items.clone();
        assert_eq!(list.apply(&ListUpdate::PullContributor(bob.clone())), 1);
        assert!(list.contributors.is_empty());
        assert_eq!(list.owner, UserId::new("alice"));
        assert_eq!(list.items, items);

        assert_eq!(list.apply(&ListUpdate::PullContributor(bob)), 0);
    }

    #[test]
    fn matched_test() {
        assert_eq!(UpdateEffect::ListNotFound.matched(), None);
        assert_eq!(UpdateEffect::Applied { matched: 0 }.matched(), Some(false));
        assert_eq!(UpdateEffect::Applied { matched: 1 }.matched(), Some(true));
    }
}
