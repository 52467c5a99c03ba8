use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, migrate::MigrateError, postgres::PgRow};

use super::RepoResult;
use crate::models::{PageRequest, Paginated};

mod content;
mod directory;
mod market;
mod menus;
mod settings;
mod users;

/// PostgresRepository
///
/// Store backed by a shared `PgPool`. Queries are assembled at runtime with
/// `QueryBuilder` so the crate builds without a reachable database.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Runs a filtered, paginated `SELECT * FROM <table>` described by `query`.
    pub(super) async fn fetch_page<T>(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> RepoResult<Paginated<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
        count.push(query.table).push(" WHERE TRUE");
        query.push_filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        select.push(query.table).push(" WHERE TRUE");
        query.push_filters(&mut select);
        select.push(" ORDER BY ").push(query.order_by);
        push_window(&mut select, page);

        let rows = select.build_query_as::<T>().fetch_all(&self.pool).await?;
        Ok(Paginated::new(rows, page, total))
    }

    pub(super) async fn delete_row(&self, table: &str, id: i64) -> RepoResult<bool> {
        let mut query = QueryBuilder::<Postgres>::new("DELETE FROM ");
        query.push(table).push(" WHERE id = ").push_bind(id);
        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    pub(super) async fn fetch_row<T>(&self, table: &str, id: i64) -> RepoResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        query.push(table).push(" WHERE id = ").push_bind(id);
        Ok(query.build_query_as::<T>().fetch_optional(&self.pool).await?)
    }
}

/// ListQuery
///
/// Declarative description of a directory-style listing.
pub(super) struct ListQuery {
    pub table: &'static str,
    pub search_columns: &'static [&'static str],
    pub search: Option<String>,
    /// `column = value` equality filters; `None` values are skipped.
    pub exact: Vec<(&'static str, Option<String>)>,
    /// Extra fixed predicate, e.g. `is_active = TRUE`.
    pub predicate: Option<&'static str>,
    pub order_by: &'static str,
}

impl ListQuery {
    fn push_filters(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for (column, value) in &self.exact {
            if let Some(value) = value {
                builder
                    .push(" AND ")
                    .push(*column)
                    .push(" = ")
                    .push_bind(value.clone());
            }
        }
        if let Some(predicate) = self.predicate {
            builder.push(" AND ").push(predicate);
        }
        if let Some(term) = &self.search {
            push_search(builder, self.search_columns, term);
        }
    }
}

/// Appends `AND (col1 ILIKE $n OR col2 ILIKE $n ...)` for a substring search.
pub(super) fn push_search(
    builder: &mut QueryBuilder<'_, Postgres>,
    columns: &[&str],
    term: &str,
) {
    let pattern = format!("%{}%", escape_like(term.trim()));
    builder.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder.push(*column).push(" ILIKE ").push_bind(pattern.clone());
    }
    builder.push(")");
}

pub(super) fn push_window(builder: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
    builder
        .push(" LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(page.offset());
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
