//! `PostgreSQL` store: the generic CRUD half.
//!
//! Entity-specific lookups live next to each row type (`categories.rs`,
//! `collections.rs`, `products.rs`). Queries are built at runtime with
//! [`QueryBuilder`] so partial updates only touch supplied columns.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use inventory_core::{Entity, Page};

use super::RepositoryError;
use super::store::{CrudStore, StoreHealth};

/// Catalog store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the oldest record whose text `column` equals `value`.
    pub(super) async fn find_by_text<E: PgEntity>(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<E>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {column} = $1 ORDER BY created_at, id LIMIT 1",
            E::COLUMNS,
            E::TABLE
        );
        let row = sqlx::query_as::<_, E::Row>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Append ordering and the page window to `query`, then fetch.
    ///
    /// `order_prefix` qualifies the ordering columns when `query` joins.
    pub(super) async fn fetch_page<E: PgEntity>(
        &self,
        mut query: QueryBuilder<'_, Postgres>,
        order_prefix: &str,
        page: Page,
    ) -> Result<Vec<E>, RepositoryError> {
        query
            .push(format_args!(
                " ORDER BY {order_prefix}created_at, {order_prefix}id LIMIT "
            ))
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<E::Row> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

/// Table mapping for an entity stored in `PostgreSQL`.
pub trait PgEntity: Entity {
    /// Schema-qualified table name.
    const TABLE: &'static str;
    /// Column list in `Row` field order.
    const COLUMNS: &'static str;

    /// Raw row, validated into `Self` on the way out.
    type Row: for<'r> FromRow<'r, PgRow> + TryInto<Self, Error = RepositoryError> + Send + Unpin;

    /// Push `(columns) VALUES (binds)` for an insert.
    fn push_insert(query: &mut QueryBuilder<'_, Postgres>, new: &Self::New);

    /// Push one `column = bind` assignment per supplied field.
    fn push_assignments(
        set: &mut Separated<'_, '_, Postgres, &'static str>,
        changes: &Self::Update,
    );
}

#[async_trait]
impl<E: PgEntity> CrudStore<E> for PgStore {
    async fn get(&self, id: E::Id) -> Result<Option<E>, RepositoryError> {
        let id: Uuid = id.into();
        let sql = format!("SELECT {} FROM {} WHERE id = $1", E::COLUMNS, E::TABLE);
        let row = sqlx::query_as::<_, E::Row>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn get_multi(&self, page: Page) -> Result<Vec<E>, RepositoryError> {
        let query = QueryBuilder::new(format!("SELECT {} FROM {}", E::COLUMNS, E::TABLE));
        self.fetch_page(query, "", page).await
    }

    async fn create(&self, new: &E::New) -> Result<E, RepositoryError> {
        let mut query = QueryBuilder::new(format!("INSERT INTO {} ", E::TABLE));
        E::push_insert(&mut query, new);
        query.push(" RETURNING ").push(E::COLUMNS);

        let row: E::Row = query
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from_write)?;

        row.try_into()
    }

    async fn update(&self, current: &E, changes: &E::Update) -> Result<E, RepositoryError> {
        let id: Uuid = current.id().into();
        let mut query = QueryBuilder::new(format!("UPDATE {} SET ", E::TABLE));
        {
            let mut set = query.separated(", ");
            E::push_assignments(&mut set, changes);
            set.push("updated_at = GREATEST(now(), created_at)");
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(E::COLUMNS);

        let row: Option<E::Row> = query
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_write)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete(&self, id: E::Id) -> Result<Option<E>, RepositoryError> {
        let id: Uuid = id.into();
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 RETURNING {}",
            E::TABLE,
            E::COLUMNS
        );
        let row = sqlx::query_as::<_, E::Row>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_write)?;

        row.map(TryInto::try_into).transpose()
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
