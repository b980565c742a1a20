//! Transfer (양도양수) listing repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{collect_page, contains_pattern, ownership_miss};
use crate::db::DbError;
use crate::models::{Paginated, Pagination, TransferDraft, TransferFilter, TransferStatus};

const TRANSFER_COLUMNS: &str = "t.id, t.owner_id, t.title, t.category, t.region, t.price, t.area, \
     t.description, t.status, t.is_hidden, t.view_count, t.created_at, t.updated_at";

/// Transfer listing record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub category: String,
    pub region: String,
    pub price: Option<i64>,
    pub area: Option<f64>,
    pub description: String,
    pub status: String,
    pub is_hidden: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transfer listing repository
pub struct TransferRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TransferRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        filter: &TransferFilter,
        page: Pagination,
    ) -> Result<Paginated<Transfer>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {TRANSFER_COLUMNS}, COUNT(*) OVER() AS total FROM transfers t WHERE NOT t.is_hidden"
        ));

        push_filters(&mut qb, filter);

        qb.push(" ORDER BY ")
            .push(filter.sort.order_by())
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = qb.build().fetch_all(self.pool).await?;
        collect_page(rows, page, || self.count(filter)).await
    }

    async fn count(&self, filter: &TransferFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM transfers t WHERE NOT t.is_hidden",
        );
        push_filters(&mut qb, filter);
        qb.build_query_scalar::<i64>().fetch_one(self.pool).await
    }

    /// Visible listing by id. Counts as a view.
    pub async fn view(&self, id: Uuid) -> Result<Transfer, DbError> {
        sqlx::query_as::<_, Transfer>(&format!(
            "UPDATE transfers t SET view_count = t.view_count + 1
             WHERE t.id = $1 AND NOT t.is_hidden
             RETURNING {TRANSFER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("transfer", id))
    }

    pub async fn create(&self, owner_id: Uuid, draft: &TransferDraft) -> Result<Transfer, DbError> {
        let transfer = sqlx::query_as::<_, Transfer>(&format!(
            "INSERT INTO transfers AS t (owner_id, title, category, region, price, area, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {TRANSFER_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(draft.title.as_str())
        .bind(draft.category.as_str())
        .bind(&draft.region)
        .bind(draft.price)
        .bind(draft.area)
        .bind(draft.description.as_str())
        .fetch_one(self.pool)
        .await?;

        tracing::info!(transfer_id = %transfer.id, %owner_id, category = draft.category.as_str(), "transfer listed");
        Ok(transfer)
    }

    pub async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        draft: &TransferDraft,
    ) -> Result<Transfer, DbError> {
        let updated = sqlx::query_as::<_, Transfer>(&format!(
            "UPDATE transfers t SET title = $3, category = $4, region = $5, price = $6, area = $7,
                    description = $8, updated_at = NOW()
             WHERE t.id = $1 AND t.owner_id = $2
             RETURNING {TRANSFER_COLUMNS}"
        ))
        .bind(id)
        .bind(owner_id)
        .bind(draft.title.as_str())
        .bind(draft.category.as_str())
        .bind(&draft.region)
        .bind(draft.price)
        .bind(draft.area)
        .bind(draft.description.as_str())
        .fetch_optional(self.pool)
        .await?;

        match updated {
            Some(t) => Ok(t),
            None => Err(ownership_miss(self.pool, "transfers", "owner_id", "transfer", id).await),
        }
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        owner_id: Uuid,
        status: TransferStatus,
    ) -> Result<Transfer, DbError> {
        let updated = sqlx::query_as::<_, Transfer>(&format!(
            "UPDATE transfers t SET status = $3, updated_at = NOW()
             WHERE t.id = $1 AND t.owner_id = $2
             RETURNING {TRANSFER_COLUMNS}"
        ))
        .bind(id)
        .bind(owner_id)
        .bind(status.as_str())
        .fetch_optional(self.pool)
        .await?;

        match updated {
            Some(t) => {
                tracing::info!(transfer_id = %id, status = status.as_str(), "transfer status changed");
                Ok(t)
            }
            None => Err(ownership_miss(self.pool, "transfers", "owner_id", "transfer", id).await),
        }
    }

    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM transfers WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ownership_miss(self.pool, "transfers", "owner_id", "transfer", id).await);
        }
        Ok(())
    }
}

/// WHERE conditions shared by the transfers page and its count.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &TransferFilter) {
    if let Some(category) = filter.category {
        qb.push(" AND t.category = ").push_bind(category.as_str());
    }
    if let Some(region) = &filter.region {
        qb.push(" AND t.region = ").push_bind(region.clone());
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND t.price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND t.price <= ").push_bind(max);
    }
    if let Some(keyword) = &filter.keyword {
        let pattern = contains_pattern(keyword);
        qb.push(" AND (t.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
