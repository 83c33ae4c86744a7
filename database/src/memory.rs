use crate::{DatabaseResult, InsertionResult, ListStore};
use async_trait::async_trait;
use model::{
    list::{ListId, ShoppingList},
    update::{ListUpdate, UpdateEffect},
    user::UserId,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keeps lists in process memory. Used by tests and when no database is configured.
///
/// Each update is applied under a single write guard, which makes it atomic
/// with respect to every other store call.
#[derive(Default)]
pub struct MemoryStore {
    lists: RwLock<HashMap<ListId, ShoppingList>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn find_list(&self, id: &ListId) -> DatabaseResult<Option<ShoppingList>> {
        Ok(self.lists.read().await.get(id).cloned())
    }

    async fn find_lists_by_owner(&self, owner: &UserId) -> DatabaseResult<Vec<ShoppingList>> {
        let lists = self.lists.read().await;
        let mut owned: Vec<_> = lists
            .values()
            .filter(|list| &list.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn create_list(&self, list: &ShoppingList) -> DatabaseResult<InsertionResult> {
        let mut lists = self.lists.write().await;
        if lists.contains_key(&list.id) {
            warn!("list with id '{}' already exists", list.id);
            return Ok(InsertionResult::AlreadyExists);
        }
        lists.insert(list.id, list.clone());
        Ok(InsertionResult::Inserted)
    }

    async fn update_list(&self, id: &ListId, update: &ListUpdate) -> DatabaseResult<UpdateEffect> {
        let mut lists = self.lists.write().await;
        trace!("applying {:?} to list '{}'", update, id);
        Ok(match lists.get_mut(id) {
            Some(list) => UpdateEffect::Applied {
                matched: list.apply(update),
            },
            None => UpdateEffect::ListNotFound,
        })
    }

    async fn delete_list(&self, id: &ListId) -> DatabaseResult<bool> {
        Ok(self.lists.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::list::{Item, ItemId};

    fn trip(owner: &str) -> ShoppingList {
        ShoppingList::new(
            ListId::new_v4(),
            "Trip".to_owned(),
            UserId::new(owner),
            Default::default(),
            vec![],
        )
    }

    #[tokio::test]
    async fn create_and_find_test() {
        let store = MemoryStore::new();
        let list = trip("alice");

        assert_eq!(
            store.create_list(&list).await.unwrap(),
            InsertionResult::Inserted
        );
        assert_eq!(
            store.create_list(&list).await.unwrap(),
            InsertionResult::AlreadyExists
        );
        assert_eq!(store.find_list(&list.id).await.unwrap(), Some(list.clone()));

        store.create_list(&trip("bob")).await.unwrap();
        let owned = store
            .find_lists_by_owner(&UserId::new("alice"))
            .await
            .unwrap();
        assert_eq!(owned, vec![list]);
    }

    #[tokio::test]
    async fn update_missing_list_test() {
        let store = MemoryStore::new();
        let effect = store
            .update_list(
                &ListId::new_v4(),
                &ListUpdate::CheckItem {
                    item_id: ItemId::new_v4(),
                },
            )
            .await
            .unwrap();
        assert_eq!(effect, UpdateEffect::ListNotFound);
    }

    #[tokio::test]
    async fn interleaved_item_updates_do_not_clobber_test() {
        let store = MemoryStore::new();
        let list = trip("alice");
        store.create_list(&list).await.unwrap();

        let milk = Item::new(ItemId::new_v4(), "Milk".to_owned(), false);
        let eggs = Item::new(ItemId::new_v4(), "Eggs".to_owned(), false);
        store
            .update_list(&list.id, &ListUpdate::PushItem(milk.clone()))
            .await
            .unwrap();
        store
            .update_list(&list.id, &ListUpdate::PushItem(eggs.clone()))
            .await
            .unwrap();

        let rename_update = ListUpdate::SetItemName {
            item_id: milk.id,
            name: "Oat milk".to_owned(),
        };
        let check_update = ListUpdate::CheckItem { item_id: eggs.id };
        let (rename, check) = tokio::join!(
            store.update_list(&list.id, &rename_update),
            store.update_list(&list.id, &check_update),
        );
        assert_eq!(rename.unwrap(), UpdateEffect::Applied { matched: 1 });
        assert_eq!(check.unwrap(), UpdateEffect::Applied { matched: 1 });

        let stored = store.find_list(&list.id).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.items[0].name, "Oat milk");
        assert!(!stored.items[0].checked);
        assert_eq!(stored.items[1].name, "Eggs");
        assert!(stored.items[1].checked);
    }

    #[tokio::test]
    async fn lists_by_owner_are_ordered_by_name_test() {
        let store = MemoryStore::new();
        let owner = UserId::new("alice");
        for name in &["Trip", "Groceries", "Party"] {
            let list = ShoppingList::new(
                ListId::new_v4(),
                (*name).to_owned(),
                owner.clone(),
                Default::default(),
                vec![],
            );
            store.create_list(&list).await.unwrap();
        }

        let names: Vec<_> = store
            .find_lists_by_owner(&owner)
            .await
            .unwrap()
            .into_iter()
            .map(|list| list.name)
            .collect();
        assert_eq!(names, vec!["Groceries", "Party", "Trip"]);
    }

    #[tokio::test]
    async fn delete_test() {
        let store = MemoryStore::new();
        let list = trip("alice");
        store.create_list(&list).await.unwrap();

        assert!(store.delete_list(&list.id).await.unwrap());
        assert!(!store.delete_list(&list.id).await.unwrap());
        assert_eq!(store.find_list(&list.id).await.unwrap(), None);
    }
}
