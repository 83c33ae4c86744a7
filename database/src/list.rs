use crate::{Database, DatabaseResult, InsertionResult, ListStore};
use async_trait::async_trait;
use model::{
    list::{Item, ListId, ShoppingList},
    update::{ListUpdate, UpdateEffect},
    user::UserId,
};
use sqlx::{pool::PoolConnection, postgres::PgArguments, query::QueryAs, Postgres};
use uuid::Uuid;

pub type ListDatabase = Database<ShoppingList>;

/// `(lists matched, elements changed)` as reported by the targeted update statements below.
type Counts<'q> = QueryAs<'q, Postgres, (i64, i64), PgArguments>;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
struct ListRow {
    id: Uuid,
    name: String,
    owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    checked: bool,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item::new(row.id.into(), row.name, row.checked)
    }
}

impl ListDatabase {
    async fn hydrate(
        db: &mut PoolConnection<Postgres>,
        row: ListRow,
    ) -> DatabaseResult<ShoppingList> {
        let items = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, checked FROM shopping_list_item WHERE list_id = $1 ORDER BY position",
        )
        .bind(row.id)
        .fetch_all(&mut *db)
        .await?;

        let contributors = sqlx::query_as::<_, (String,)>(
            "SELECT user_id FROM shopping_list_contributor WHERE list_id = $1",
        )
        .bind(row.id)
        .fetch_all(&mut *db)
        .await?;

        Ok(ShoppingList::new(
            row.id.into(),
            row.name,
            UserId::from(row.owner),
            contributors
                .into_iter()
                .map(|(user_id,)| UserId::from(user_id))
                .collect(),
            items.into_iter().map(Item::from).collect(),
        ))
    }

    async fn apply_targeted(&self, query: Counts<'_>) -> DatabaseResult<UpdateEffect> {
        let mut db = self.get_connection().await?;

        let (lists, matched) = query.fetch_one(&mut db).await?;

        Ok(effect_from_counts(lists, matched))
    }
}

#[async_trait]
impl ListStore for ListDatabase {
    async fn find_list(&self, id: &ListId) -> DatabaseResult<Option<ShoppingList>> {
        let mut db = self.get_connection().await?;

        let row = sqlx::query_as::<_, ListRow>(
            "SELECT id, name, owner FROM shopping_list WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut db)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::hydrate(&mut db, row).await?)),
            None => Ok(None),
        }
    }

    async fn find_lists_by_owner(&self, owner: &UserId) -> DatabaseResult<Vec<ShoppingList>> {
        let mut db = self.get_connection().await?;

        let rows = sqlx::query_as::<_, ListRow>(
            "SELECT id, name, owner FROM shopping_list WHERE owner = $1 ORDER BY name, id",
        )
        .bind(owner.as_str().to_owned())
        .fetch_all(&mut db)
        .await?;

        let mut lists = Vec::with_capacity(rows.len());
        for row in rows {
            lists.push(Self::hydrate(&mut db, row).await?);
        }

        Ok(lists)
    }

    async fn create_list(&self, list: &ShoppingList) -> DatabaseResult<InsertionResult> {
        let mut tx = self.pool.begin().await?;

        let query_result = sqlx::query(
            "INSERT INTO shopping_list (id, name, owner) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING",
        )
        .bind(*list.id.as_uuid())
        .bind(list.name.clone())
        .bind(list.owner.as_str().to_owned())
        .execute(&mut tx)
        .await?;

        let result = InsertionResult::from_changed_rows(query_result.rows_affected())?;
        if result == InsertionResult::AlreadyExists {
            warn!("list with id '{}' already exists", list.id);
            return Ok(result);
        }

        for item in &list.items {
            sqlx::query(
                "INSERT INTO shopping_list_item (list_id, id, name, checked) VALUES ($1, $2, $3, $4)",
            )
            .bind(*list.id.as_uuid())
            .bind(*item.id.as_uuid())
            .bind(item.name.clone())
            .bind(item.checked)
            .execute(&mut tx)
            .await?;
        }

        for contributor in &list.contributors {
            sqlx::query(
                "INSERT INTO shopping_list_contributor (list_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(*list.id.as_uuid())
            .bind(contributor.as_str().to_owned())
            .execute(&mut tx)
            .await?;
        }

        tx.commit().await?;

        Ok(result)
    }

    async fn update_list(&self, id: &ListId, update: &ListUpdate) -> DatabaseResult<UpdateEffect> {
        let list_id = *id.as_uuid();

        let query = match update {
            ListUpdate::Rename { name } => sqlx::query_as::<Postgres, (i64, i64)>(
                r#"
                WITH updated AS (
                    UPDATE shopping_list SET name = $2 WHERE id = $1 RETURNING id
                )
                SELECT (SELECT COUNT(*) FROM updated), (SELECT COUNT(*) FROM updated)"#,
            )
            .bind(list_id)
            .bind(name.clone()),
            ListUpdate::PushItem(item) => sqlx::query_as::<Postgres, (i64, i64)>(
                r#"
                WITH list AS (SELECT id FROM shopping_list WHERE id = $1),
                inserted AS (
                    INSERT INTO shopping_list_item (list_id, id, name, checked)
                    SELECT id, $2, $3, $4 FROM list
                    ON CONFLICT (list_id, id) DO NOTHING
                    RETURNING id
                )
                SELECT (SELECT COUNT(*) FROM list), (SELECT COUNT(*) FROM inserted)"#,
            )
            .bind(list_id)
            .bind(*item.id.as_uuid())
            .bind(item.name.clone())
            .bind(item.checked),
            ListUpdate::SetItemName { item_id, name } => sqlx::query_as::<Postgres, (i64, i64)>(
                r#"
                WITH list AS (SELECT id FROM shopping_list WHERE id = $1),
                updated AS (
                    UPDATE shopping_list_item SET name = $3
                    WHERE list_id IN (SELECT id FROM list) AND id = $2
                    RETURNING id
                )
                SELECT (SELECT COUNT(*) FROM list), (SELECT COUNT(*) FROM updated)"#,
            )
            .bind(list_id)
            .bind(*item_id.as_uuid())
            .bind(name.clone()),
            ListUpdate::CheckItem { item_id } => sqlx::query_as::<Postgres, (i64, i64)>(
                r#"
                WITH list AS (SELECT id FROM shopping_list WHERE id = $1),
                updated AS (
                    UPDATE shopping_list_item SET checked = TRUE
                    WHERE list_id IN (SELECT id FROM list) AND id = $2
                    RETURNING id
                )
                SELECT (SELECT COUNT(*) FROM list), (SELECT COUNT(*) FROM updated)"#,
            )
            .bind(list_id)
            .bind(*item_id.as_uuid()),
            ListUpdate::PullItem { item_id } => sqlx::query_as::<Postgres, (i64, i64)>(
                r#"
                WITH list AS (SELECT id FROM shopping_list WHERE id = $1),
                deleted AS (
                    DELETE FROM shopping_list_item
                    WHERE list_id IN (SELECT id FROM list) AND id = $2
                    RETURNING id
                )
                SELECT (SELECT COUNT(*) FROM list), (SELECT COUNT(*) FROM deleted)"#,
            )
            .bind(list_id)
            .bind(*item_id.as_uuid()),
            ListUpdate::AddContributor(user_id) => sqlx::query_as::<Postgres, (i64, i64)>(
                r#"
                WITH list AS (SELECT id, owner FROM shopping_list WHERE id = $1),
                inserted AS (
                    INSERT INTO shopping_list_contributor (list_id, user_id)
                    SELECT id, $2 FROM list WHERE owner <> $2
                    ON CONFLICT (list_id, user_id) DO NOTHING
                    RETURNING user_id
                )
                SELECT (SELECT COUNT(*) FROM list), (SELECT COUNT(*) FROM inserted)"#,
            )
            .bind(list_id)
            .bind(user_id.as_str().to_owned()),
            ListUpdate::PullContributor(user_id) => sqlx::query_as::<Postgres, (i64, i64)>(
                r#"
                WITH list AS (SELECT id FROM shopping_list WHERE id = $1),
                deleted AS (
                    DELETE FROM shopping_list_contributor
                    WHERE list_id IN (SELECT id FROM list) AND user_id = $2
                    RETURNING user_id
                )
                SELECT (SELECT COUNT(*) FROM list), (SELECT COUNT(*) FROM deleted)"#,
            )
            .bind(list_id)
            .bind(user_id.as_str().to_owned()),
        };

        trace!("applying {:?} to list '{}'", update, id);

        self.apply_targeted(query).await
    }

    async fn delete_list(&self, id: &ListId) -> DatabaseResult<bool> {
        let mut db = self.get_connection().await?;

        let query_result = sqlx::query("DELETE FROM shopping_list WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut db)
            .await?;

        Ok(query_result.rows_affected() == 1)
    }
}

fn effect_from_counts(lists: i64, matched: i64) -> UpdateEffect {
    if lists == 0 {
        UpdateEffect::ListNotFound
    } else {
        UpdateEffect::Applied {
            matched: matched.max(0) as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::list::ItemId;
    use sqlx::Executor;

    #[test]
    fn effect_from_counts_test() {
        assert_eq!(effect_from_counts(0, 0), UpdateEffect::ListNotFound);
        assert_eq!(
            effect_from_counts(1, 0),
            UpdateEffect::Applied { matched: 0 }
        );
        assert_eq!(
            effect_from_counts(1, 1),
            UpdateEffect::Applied { matched: 1 }
        );
    }

    // The tests below need a Postgres instance, run them with
    // `WEBSERVER_DATABASE_ADDR=postgres://... cargo test -p database -- --ignored`

    async fn connect() -> Option<ListDatabase> {
        let addr = match std::env::var("WEBSERVER_DATABASE_ADDR") {
            Ok(addr) => addr,
            Err(_) => {
                eprintln!("WEBSERVER_DATABASE_ADDR not set, skipping");
                return None;
            }
        };
        let db = ListDatabase::new(&addr).await.unwrap();

        // serialize schema creation between tests running in parallel
        let schema = format!(
            "SELECT pg_advisory_xact_lock(4711);\n{}",
            include_str!("../sql/schema.sql")
        );
        (&db.pool).execute(schema.as_str()).await.unwrap();

        Some(db)
    }

    fn groceries(items: &[&str]) -> ShoppingList {
        ShoppingList::new(
            ListId::new_v4(),
            "Groceries".to_owned(),
            UserId::new("alice"),
            vec![UserId::new("bob")].into_iter().collect(),
            items
                .iter()
                .map(|name| Item::new(ItemId::new_v4(), (*name).to_owned(), false))
                .collect(),
        )
    }

    async fn stored(db: &ListDatabase, id: &ListId) -> ShoppingList {
        db.find_list(id).await.unwrap().unwrap()
    }

    #[tokio::test]
    #[ignore]
    async fn item_round_trip_test() {
        let db = match connect().await {
            Some(db) => db,
            None => return,
        };
        let list = groceries(&[]);
        assert_eq!(
            db.create_list(&list).await.unwrap(),
            InsertionResult::Inserted
        );
        assert_eq!(stored(&db, &list.id).await, list);

        let milk = Item::new(ItemId::new_v4(), "Milk".to_owned(), false);
        let effect = db
            .update_list(&list.id, &ListUpdate::PushItem(milk.clone()))
            .await
            .unwrap();
        assert_eq!(effect, UpdateEffect::Applied { matched: 1 });
        assert_eq!(stored(&db, &list.id).await.items, vec![milk.clone()]);

        let effect = db
            .update_list(&list.id, &ListUpdate::CheckItem { item_id: milk.id })
            .await
            .unwrap();
        assert_eq!(effect, UpdateEffect::Applied { matched: 1 });
        let checked = stored(&db, &list.id).await;
        assert_eq!(checked.items[0].id, milk.id);
        assert!(checked.items[0].checked);

        let effect = db
            .update_list(&list.id, &ListUpdate::PullItem { item_id: milk.id })
            .await
            .unwrap();
        assert_eq!(effect, UpdateEffect::Applied { matched: 1 });
        let emptied = stored(&db, &list.id).await;
        assert!(emptied.items.is_empty());
        assert_eq!(emptied.name, list.name);
        assert_eq!(emptied.contributors, list.contributors);

        assert!(db.delete_list(&list.id).await.unwrap());
    }

    #[tokio::test]
    #[ignore]
    async fn unknown_item_is_a_no_op_test() {
        let db = match connect().await {
            Some(db) => db,
            None => return,
        };
        let list = groceries(&["Milk"]);
        db.create_list(&list).await.unwrap();

        let effect = db
            .update_list(
                &list.id,
                &ListUpdate::SetItemName {
                    item_id: ItemId::new_v4(),
                    name: "Butter".to_owned(),
                },
            )
            .await
            .unwrap();
        assert_eq!(effect, UpdateEffect::Applied { matched: 0 });
        assert_eq!(stored(&db, &list.id).await, list);

        db.delete_list(&list.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn owner_is_never_a_contributor_test() {
        let db = match connect().await {
            Some(db) => db,
            None => return,
        };
        let list = groceries(&[]);
        db.create_list(&list).await.unwrap();

        let effect = db
            .update_list(&list.id, &ListUpdate::AddContributor(list.owner.clone()))
            .await
            .unwrap();
        assert_eq!(effect, UpdateEffect::Applied { matched: 0 });

        let effect = db
            .update_list(&list.id, &ListUpdate::AddContributor(UserId::new("bob")))
            .await
            .unwrap();
        assert_eq!(effect, UpdateEffect::Applied { matched: 0 });

        let effect = db
            .update_list(&list.id, &ListUpdate::AddContributor(UserId::new("carol")))
            .await
            .unwrap();
        assert_eq!(effect, UpdateEffect::Applied { matched: 1 });

        let contributors: Vec<_> = stored(&db, &list.id)
            .await
            .contributors
            .into_iter()
            .collect();
        assert_eq!(contributors, vec![UserId::new("bob"), UserId::new("carol")]);

        db.delete_list(&list.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn unknown_list_test() {
        let db = match connect().await {
            Some(db) => db,
            None => return,
        };

        let effect = db
            .update_list(
                &ListId::new_v4(),
                &ListUpdate::Rename {
                    name: "Trip".to_owned(),
                },
            )
            .await
            .unwrap();
        assert_eq!(effect, UpdateEffect::ListNotFound);

        let effect = db
            .update_list(
                &ListId::new_v4(),
                &ListUpdate::PullContributor(UserId::new("bob")),
            )
            .await
            .unwrap();
        assert_eq!(effect, UpdateEffect::ListNotFound);

        assert!(!db.delete_list(&ListId::new_v4()).await.unwrap());
    }

    #[tokio::test]
    #[ignore]
    async fn pull_item_keeps_order_test() {
        let db = match connect().await {
            Some(db) => db,
            None => return,
        };
        let list = groceries(&["Milk", "Eggs", "Bread"]);
        db.create_list(&list).await.unwrap();

        let butter = Item::new(ItemId::new_v4(), "Butter".to_owned(), false);
        db.update_list(&list.id, &ListUpdate::PushItem(butter))
            .await
            .unwrap();
        let effect = db
            .update_list(
                &list.id,
                &ListUpdate::PullItem {
                    item_id: list.items[1].id,
                },
            )
            .await
            .unwrap();
        assert_eq!(effect, UpdateEffect::Applied { matched: 1 });

        let names: Vec<_> = stored(&db, &list.id)
            .await
            .items
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["Milk", "Bread", "Butter"]);

        db.delete_list(&list.id).await.unwrap();
    }
}
