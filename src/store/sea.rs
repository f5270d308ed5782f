//! `SeaORM` implementation of the repository traits.
//!
//! [`SeaStore`] is generic over the connection so the same query code runs on a
//! plain [`DatabaseConnection`] and, inside a unit of work, on a
//! [`DatabaseTransaction`].

use super::{
    EventRepository, NewEvent, NewOrder, NewProduct, NewUser, OrderRepository, ProductChanges,
    ProductRepository, SearchQuery, SortKey, SortOrder, Store, UnitOfWork, UserChanges,
    UserRepository,
};
use crate::{
    entities::{BehaviorEvent, Order, Product, User, behavior_event, order, product, user},
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, QueryOrder, QuerySelect, Set,
    TransactionTrait, prelude::*, sea_query::{Expr, LikeExpr},
};
use tracing::trace;

/// Repository implementation backed by a `SeaORM` connection or transaction.
#[derive(Debug, Clone)]
pub struct SeaStore<C = DatabaseConnection> {
    conn: C,
}

impl<C> SeaStore<C> {
    /// Wraps an open connection or transaction.
    pub const fn new(conn: C) -> Self {
        Self { conn }
    }

    /// The underlying connection, for queries outside the repository traits.
    pub const fn connection(&self) -> &C {
        &self.conn
    }
}

fn now() -> DateTime {
    chrono::Utc::now().naive_utc()
}

const LIKE_ESCAPE: char = '!';

/// `LIKE` pattern matching names that contain `text` literally.
fn name_contains(text: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

#[async_trait]
impl<C> ProductRepository for SeaStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn find_product(&self, id: i64) -> Result<Option<product::Model>> {
        Product::find_by_id(id)
            .filter(product::Column::IsDeleted.eq(false))
            .one(&self.conn)
            .await
            .map_err(Into::into)
    }

    async fn find_products(&self, ids: &[i64]) -> Result<Vec<product::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Product::find()
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .filter(product::Column::IsDeleted.eq(false))
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    async fn list_products(&self) -> Result<Vec<product::Model>> {
        Product::find()
            .filter(product::Column::IsDeleted.eq(false))
            .order_by_asc(product::Column::Id)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    async fn search_products(&self, query: &SearchQuery) -> Result<Vec<product::Model>> {
        let column = match query.sort_key {
            SortKey::AddedDate => product::Column::CreatedAt,
            SortKey::Price => product::Column::Price,
        };
        let direction = match query.sort_order {
            SortOrder::Asc => sea_orm::Order::Asc,
            SortOrder::Desc => sea_orm::Order::Desc,
        };

        Product::find()
            .filter(product::Column::IsDeleted.eq(false))
            .filter(Expr::col((Product, product::Column::Name)).like(name_contains(&query.text)))
            .order_by(column, direction.clone())
            .order_by(product::Column::Id, direction)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    async fn insert_product(&self, new: NewProduct) -> Result<product::Model> {
        let now = now();
        let product = product::ActiveModel {
            category: Set(new.category),
            name: Set(new.name),
            description: Set(new.description),
            price: Set(new.price),
            attributes: Set(new.attributes),
            inventory: Set(new.inventory),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        product.insert(&self.conn).await.map_err(Into::into)
    }

    async fn update_product(
        &self,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Option<product::Model>> {
        let Some(existing) = self.find_product(id).await? else {
            return Ok(None);
        };

        let mut product: product::ActiveModel = existing.into();
        if let Some(category) = changes.category {
            product.category = Set(category);
        }
        if let Some(name) = changes.name {
            product.name = Set(name);
        }
        if let Some(description) = changes.description {
            product.description = Set(description);
        }
        if let Some(price) = changes.price {
            product.price = Set(price);
        }
        if let Some(attributes) = changes.attributes {
            product.attributes = Set(attributes);
        }
        if let Some(inventory) = changes.inventory {
            product.inventory = Set(inventory);
        }
        product.updated_at = Set(now());

        product.update(&self.conn).await.map(Some).map_err(Into::into)
    }

    async fn soft_delete_product(&self, id: i64) -> Result<Option<product::Model>> {
        let Some(existing) = self.find_product(id).await? else {
            return Ok(None);
        };

        let mut product: product::ActiveModel = existing.into();
        product.is_deleted = Set(true);
        product.updated_at = Set(now());

        product.update(&self.conn).await.map(Some).map_err(Into::into)
    }

    async fn adjust_inventory(&self, id: i64, delta: i32) -> Result<Option<product::Model>> {
        // Single UPDATE so concurrent purchases cannot lose a decrement
        let result = Product::update_many()
            .col_expr(
                product::Column::Inventory,
                Expr::col(product::Column::Inventory).add(delta),
            )
            .col_expr(product::Column::UpdatedAt, Expr::value(now()))
            .filter(product::Column::Id.eq(id))
            .filter(product::Column::IsDeleted.eq(false))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        trace!(product_id = id, delta, "Inventory adjusted");

        self.find_product(id).await
    }
}

#[async_trait]
impl<C> OrderRepository for SeaStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn insert_order(&self, new: NewOrder) -> Result<order::Model> {
        let now = now();
        let order = order::ActiveModel {
            product_id: Set(new.product_id),
            quantity: Set(new.quantity),
            total_price: Set(new.total_price),
            user_id: Set(new.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        order.insert(&self.conn).await.map_err(Into::into)
    }

    async fn list_orders(&self) -> Result<Vec<order::Model>> {
        Order::find()
            .order_by_asc(order::Column::Id)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    async fn orders_for_product(&self, product_id: i64) -> Result<Vec<order::Model>> {
        Order::find()
            .filter(order::Column::ProductId.eq(product_id))
            .order_by_asc(order::Column::Id)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl<C> EventRepository for SeaStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn insert_event(&self, new: NewEvent) -> Result<behavior_event::Model> {
        let event = behavior_event::ActiveModel {
            product_id: Set(new.product_id),
            category: Set(new.category),
            product_name: Set(new.product_name),
            attributes: Set(new.attributes),
            created_at: Set(now()),
            ..Default::default()
        };
        event.insert(&self.conn).await.map_err(Into::into)
    }

    async fn events_in_category(&self, category: &str) -> Result<Vec<behavior_event::Model>> {
        BehaviorEvent::find()
            .filter(behavior_event::Column::Category.eq(category))
            .order_by_asc(behavior_event::Column::Id)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    async fn count_events_by_product(&self) -> Result<Vec<(i64, i64)>> {
        BehaviorEvent::find()
            .select_only()
            .column(behavior_event::Column::ProductId)
            .column_as(Expr::col(behavior_event::Column::Id).count(), "count")
            .group_by(behavior_event::Column::ProductId)
            .order_by_asc(behavior_event::Column::ProductId)
            .into_tuple::<(i64, i64)>()
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    async fn count_events(&self) -> Result<u64> {
        BehaviorEvent::find()
            .count(&self.conn)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl<C> UserRepository for SeaStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn find_user(&self, id: i64) -> Result<Option<user::Model>> {
        User::find_by_id(id)
            .filter(user::Column::IsDeleted.eq(false))
            .one(&self.conn)
            .await
            .map_err(Into::into)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .map_err(Into::into)
    }

    async fn list_users(&self) -> Result<Vec<user::Model>> {
        User::find()
            .filter(user::Column::IsDeleted.eq(false))
            .order_by_asc(user::Column::Id)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    async fn insert_user(&self, new: NewUser) -> Result<user::Model> {
        let now = now();
        let user = user::ActiveModel {
            full_name: Set(new.full_name),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            role: Set(new.role),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        user.insert(&self.conn).await.map_err(Into::into)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<user::Model>> {
        let Some(existing) = self.find_user(id).await? else {
            return Ok(None);
        };

        let mut user: user::ActiveModel = existing.into();
        if let Some(full_name) = changes.full_name {
            user.full_name = Set(full_name);
        }
        if let Some(email) = changes.email {
            user.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = Set(password_hash);
        }
        if let Some(role) = changes.role {
            user.role = Set(role);
        }
        user.updated_at = Set(now());

        user.update(&self.conn).await.map(Some).map_err(Into::into)
    }

    async fn soft_delete_user(&self, id: i64) -> Result<Option<user::Model>> {
        let Some(existing) = self.find_user(id).await? else {
            return Ok(None);
        };

        let mut user: user::ActiveModel = existing.into();
        user.is_deleted = Set(true);
        user.updated_at = Set(now());

        user.update(&self.conn).await.map(Some).map_err(Into::into)
    }
}

#[async_trait]
impl UnitOfWork for SeaStore<DatabaseTransaction> {
    async fn commit(self) -> Result<()> {
        self.conn.commit().await.map_err(Into::into)
    }

    async fn rollback(self) -> Result<()> {
        self.conn.rollback().await.map_err(Into::into)
    }
}

#[async_trait]
impl Store for SeaStore<DatabaseConnection> {
    type Work = SeaStore<DatabaseTransaction>;

    async fn begin(&self) -> Result<Self::Work> {
        Ok(SeaStore::new(self.conn.begin().await?))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_adjust_inventory_is_relative() -> Result<()> {
        let store = setup_test_store().await?;
        let product = create_test_product(&store, "Dune", "Books").await?;

        let updated = store.adjust_inventory(product.id, -3).await?.unwrap();
        assert_eq!(updated.inventory, product.inventory - 3);

        let updated = store.adjust_inventory(product.id, 1).await?.unwrap();
        assert_eq!(updated.inventory, product.inventory - 2);

        assert!(store.adjust_inventory(9999, -1).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_soft_deleted_products_are_hidden() -> Result<()> {
        let store = setup_test_store().await?;
        let kept = create_test_product(&store, "Kept", "Books").await?;
        let gone = create_test_product(&store, "Gone", "Books").await?;

        let deleted = store.soft_delete_product(gone.id).await?.unwrap();
        assert!(deleted.is_deleted);

        assert!(store.find_product(gone.id).await?.is_none());
        assert!(store.soft_delete_product(gone.id).await?.is_none());
        assert!(store.adjust_inventory(gone.id, -1).await?.is_none());

        let listed = store.list_products().await?;
        assert_eq!(listed, vec![kept.clone()]);

        let found = store.find_products(&[kept.id, gone.id]).await?;
        assert_eq!(found, vec![kept]);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_filters_and_orders() -> Result<()> {
        let store = setup_test_store().await?;
        let cheap = create_custom_product(&store, "Rust Book", "Books", 20.0, 5).await?;
        let dear = create_custom_product(&store, "Rust Mug", "Kitchen", 35.0, 5).await?;
        create_custom_product(&store, "Go Book", "Books", 10.0, 5).await?;

        let query = SearchQuery {
            text: "Rust".to_string(),
            sort_key: SortKey::Price,
            sort_order: SortOrder::Desc,
        };
        let ids: Vec<i64> = store
            .search_products(&query)
            .await?
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![dear.id, cheap.id]);

        let all = store.search_products(&SearchQuery::default()).await?;
        assert_eq!(all.len(), 3);
        Ok(())
    }

    async fn search_ids(
        store: &SeaStore,
        text: &str,
        key: SortKey,
        order: SortOrder,
    ) -> Result<Vec<i64>> {
        let query = SearchQuery {
            text: text.to_string(),
            sort_key: key,
            sort_order: order,
        };
        Ok(store.search_products(&query).await?.iter().map(|p| p.id).collect())
    }

    async fn set_created_at(store: &SeaStore, id: i64, hours: i64) -> Result<()> {
        let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Product::update_many()
            .col_expr(
                product::Column::CreatedAt,
                Expr::value(base + chrono::Duration::hours(hours)),
            )
            .filter(product::Column::Id.eq(id))
            .exec(store.connection())
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() -> Result<()> {
        let store = setup_test_store().await?;
        let percent = create_test_product(&store, "100% Cotton", "Clothing").await?;
        create_test_product(&store, "1000 Cotton", "Clothing").await?;
        let underscore = create_test_product(&store, "a_c", "Misc").await?;
        create_test_product(&store, "abc", "Misc").await?;
        let bang = create_test_product(&store, "Wow!", "Misc").await?;

        let (key, order) = (SortKey::AddedDate, SortOrder::Asc);
        assert_eq!(search_ids(&store, "100%", key, order).await?, vec![percent.id]);
        assert_eq!(search_ids(&store, "%", key, order).await?, vec![percent.id]);
        assert_eq!(search_ids(&store, "a_c", key, order).await?, vec![underscore.id]);
        assert_eq!(search_ids(&store, "!", key, order).await?, vec![bang.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_by_added_date_follows_direction() -> Result<()> {
        let store = setup_test_store().await?;
        let newest = create_test_product(&store, "Lamp newest", "Home").await?;
        let oldest = create_test_product(&store, "Lamp oldest", "Home").await?;
        let tie_low = create_test_product(&store, "Lamp tie low", "Home").await?;
        let tie_high = create_test_product(&store, "Lamp tie high", "Home").await?;
        set_created_at(&store, newest.id, 2).await?;
        set_created_at(&store, oldest.id, 0).await?;
        set_created_at(&store, tie_low.id, 1).await?;
        set_created_at(&store, tie_high.id, 1).await?;

        let ascending = search_ids(&store, "Lamp", SortKey::AddedDate, SortOrder::Asc).await?;
        assert_eq!(ascending, vec![oldest.id, tie_low.id, tie_high.id, newest.id]);

        // Equal timestamps fall back to id in the same direction
        let descending = search_ids(&store, "Lamp", SortKey::AddedDate, SortOrder::Desc).await?;
        assert_eq!(descending, vec![newest.id, tie_high.id, tie_low.id, oldest.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_count_events_by_product() -> Result<()> {
        let store = setup_test_store().await?;
        let first = create_test_product(&store, "First", "Books").await?;
        let second = create_test_product(&store, "Second", "Games").await?;

        record_views(&store, &first, 3).await?;
        record_views(&store, &second, 1).await?;

        let counts = store.count_events_by_product().await?;
        assert_eq!(counts, vec![(first.id, 3), (second.id, 1)]);
        assert_eq!(store.count_events().await?, 4);
        assert_eq!(store.events_in_category("Books").await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_unit_of_work_rollback_discards_writes() -> Result<()> {
        let store = setup_test_store().await?;
        let product = create_test_product(&store, "Dune", "Books").await?;

        let work = store.begin().await?;
        work.adjust_inventory(product.id, -1).await?;
        work.insert_order(NewOrder {
            product_id: product.id,
            quantity: 1,
            total_price: product.price,
            user_id: 1,
        })
        .await?;
        work.rollback().await?;

        let reloaded = store.find_product(product.id).await?.unwrap();
        assert_eq!(reloaded.inventory, product.inventory);
        assert!(store.list_orders().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unit_of_work_commit_persists_writes() -> Result<()> {
        let store = setup_test_store().await?;
        let product = create_test_product(&store, "Dune", "Books").await?;

        let work = store.begin().await?;
        work.adjust_inventory(product.id, -1).await?;
        work.commit().await?;

        let reloaded = store.find_product(product.id).await?.unwrap();
        assert_eq!(reloaded.inventory, product.inventory - 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_user_email_lookup_includes_deleted() -> Result<()> {
        let store = setup_test_store().await?;
        let user = create_test_user(&store, "gone@example.com").await?;
        store.soft_delete_user(user.id).await?;

        assert!(store.find_user(user.id).await?.is_none());
        assert!(store.find_user_by_email("gone@example.com").await?.is_some());
        assert!(store.list_users().await?.is_empty());
        Ok(())
    }
}
