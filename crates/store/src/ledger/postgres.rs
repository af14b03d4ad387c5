//! Postgres-backed number ledger.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE order_numbers (
//!     series       TEXT        NOT NULL,
//!     number       TEXT        NOT NULL,
//!     year         INT         NOT NULL,
//!     month        INT         NOT NULL,
//!     sequence     INT         NOT NULL,
//!     status       TEXT        NOT NULL,
//!     reserved_by  TEXT,
//!     reserved_at  TIMESTAMPTZ,
//!     confirmed_at TIMESTAMPTZ,
//!     customer_ref TEXT,
//!     supplier_ref TEXT,
//!     description  TEXT,
//!     PRIMARY KEY (series, number)
//! );
//!
//! CREATE UNIQUE INDEX uq_service_order_sequence
//!     ON order_numbers (year, sequence) WHERE series = 'SERVICE_ORDER';
//! CREATE UNIQUE INDEX uq_purchase_order_sequence
//!     ON order_numbers (year, month, sequence) WHERE series = 'PURCHASE_ORDER';
//! ```
//!
//! A reservation runs inside a transaction that first takes a per-scope
//! advisory lock (`pg_advisory_xact_lock`), so the lowest-FREE / max+1 read
//! and the write are serialized per scope across all connections. The
//! partial unique indexes are the backstop that turns a racing insert into
//! a `Conflict` instead of a duplicate number.
//!
//! SQLx errors map to [`DomainError`]: unique violations (`23505`) become
//! `Conflict`, everything else becomes `Storage`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use werkorder_core::{DomainError, DomainResult};
use werkorder_numbering::{ConfirmFields, OrderNumber, ScopeKey, Series};

use super::r#trait::NumberFilter;

/// Postgres number ledger with the reservation protocol built in.
///
/// Unlike the in-memory ledger this type exposes whole operations
/// (reserve, confirm, cancel) rather than the [`super::NumberLedger`]
/// primitives: the scope serialization lives in the database transaction,
/// not in an in-process lock.
#[derive(Debug, Clone)]
pub struct PostgresNumberLedger {
    pool: Arc<PgPool>,
}

const SELECT_COLUMNS: &str = "series, number, year, month, sequence, status, \
     reserved_by, reserved_at, confirmed_at, customer_ref, supplier_ref, description";

impl PostgresNumberLedger {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Reserve the next number in the series' current scope: the lowest
    /// FREE record when one exists, otherwise a freshly minted max+1.
    #[instrument(skip(self), fields(series = %series, reserved_by), err)]
    pub async fn reserve_next(
        &self,
        series: Series,
        reserved_by: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<OrderNumber> {
        let scope = series.scope(now.year(), now.month());
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        lock_scope(&mut tx, scope).await?;
        let record = reserve_in_tx(&mut tx, series, scope, reserved_by, now).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(record)
    }

    /// Reserve `count` numbers under a single scope lock.
    #[instrument(skip(self), fields(series = %series, count, reserved_by), err)]
    pub async fn reserve_batch(
        &self,
        series: Series,
        count: usize,
        reserved_by: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<OrderNumber>> {
        if count == 0 {
            return Err(DomainError::validation("count must be positive"));
        }

        let scope = series.scope(now.year(), now.month());
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        lock_scope(&mut tx, scope).await?;
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(reserve_in_tx(&mut tx, series, scope, reserved_by, now).await?);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(records)
    }

    /// Finalize a reservation, attaching the descriptive fields.
    #[instrument(skip(self, fields), fields(series = %series, number), err)]
    pub async fn confirm(
        &self,
        series: Series,
        number: &str,
        fields: ConfirmFields,
        now: DateTime<Utc>,
    ) -> DomainResult<OrderNumber> {
        self.mutate(series, number, |record| record.confirm(fields, now))
            .await
    }

    /// Return a reservation to the pool.
    #[instrument(skip(self), fields(series = %series, number), err)]
    pub async fn cancel(&self, series: Series, number: &str) -> DomainResult<OrderNumber> {
        self.mutate(series, number, |record| record.cancel()).await
    }

    async fn mutate(
        &self,
        series: Series,
        number: &str,
        apply: impl FnOnce(&mut OrderNumber) -> DomainResult<()>,
    ) -> DomainResult<OrderNumber> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM order_numbers \
             WHERE series = $1 AND number = $2 FOR UPDATE"
        ))
        .bind(series.as_str())
        .bind(number)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("select", e))?;

        let row = row.ok_or_else(DomainError::not_found)?;
        let mut record = NumberRow::from_row(&row)
            .map_err(|e| map_sqlx_error("decode", e))?
            .into_record()?;
        apply(&mut record)?;
        update_record(&mut tx, &record).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(record)
    }

    pub async fn find(&self, series: Series, number: &str) -> DomainResult<Option<OrderNumber>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM order_numbers WHERE series = $1 AND number = $2"
        ))
        .bind(series.as_str())
        .bind(number)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find", e))?;

        row.map(|row| {
            NumberRow::from_row(&row)
                .map_err(|e| map_sqlx_error("decode", e))?
                .into_record()
        })
        .transpose()
    }

    /// Records of a series matching the filter, newest first. The quarter
    /// window overrules the month filter, matching the in-memory ledger.
    #[instrument(skip(self), fields(series = %series), err)]
    pub async fn list(
        &self,
        series: Series,
        filter: &NumberFilter,
    ) -> DomainResult<Vec<OrderNumber>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM order_numbers \
             WHERE series = $1 \
               AND ($2::int IS NULL OR year = $2) \
               AND ($3::int IS NULL OR $4::int IS NOT NULL OR month = $3) \
               AND ($4::int IS NULL OR month BETWEEN ($4 - 1) * 3 + 1 AND $4 * 3) \
               AND ($5::text IS NULL OR status = $5) \
             ORDER BY year DESC, month DESC, sequence DESC"
        ))
        .bind(series.as_str())
        .bind(filter.year)
        .bind(filter.month.map(|m| m as i32))
        .bind(filter.quarter.map(|q| q as i32))
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(
                NumberRow::from_row(&row)
                    .map_err(|e| map_sqlx_error("decode", e))?
                    .into_record()?,
            );
        }
        Ok(records)
    }
}

async fn reserve_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    series: Series,
    scope: ScopeKey,
    reserved_by: &str,
    now: DateTime<Utc>,
) -> DomainResult<OrderNumber> {
    let free = sqlx::query(&format!(
        "SELECT {SELECT_COLUMNS} FROM order_numbers \
         WHERE series = $1 AND year = $2 AND ($3::int IS NULL OR month = $3) \
           AND status = 'FREE' \
         ORDER BY sequence ASC LIMIT 1 FOR UPDATE"
    ))
    .bind(series.as_str())
    .bind(scope.year)
    .bind(scope.month.map(|m| m as i32))
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lowest_free", e))?;

    if let Some(row) = free {
        let mut record = NumberRow::from_row(&row)
            .map_err(|e| map_sqlx_error("decode", e))?
            .into_record()?;
        record.reserve(reserved_by, now)?;
        update_record(tx, &record).await?;
        return Ok(record);
    }

    let max: i32 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(sequence), 0) FROM order_numbers \
         WHERE series = $1 AND year = $2 AND ($3::int IS NULL OR month = $3)",
    )
    .bind(series.as_str())
    .bind(scope.year)
    .bind(scope.month.map(|m| m as i32))
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("max_sequence", e))?;

    let record = OrderNumber::reserved(
        series,
        scope.year,
        now.month(),
        max as u32 + 1,
        reserved_by,
        now,
    );
    insert_record(tx, &record).await?;
    Ok(record)
}

async fn lock_scope(tx: &mut Transaction<'_, Postgres>, scope: ScopeKey) -> DomainResult<()> {
    let mut hasher = DefaultHasher::new();
    scope.hash(&mut hasher);
    let key = hasher.finish() as i64;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(key)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_scope", e))?;
    Ok(())
}

async fn insert_record(
    tx: &mut Transaction<'_, Postgres>,
    record: &OrderNumber,
) -> DomainResult<()> {
    sqlx::query(
        "INSERT INTO order_numbers \
         (series, number, year, month, sequence, status, reserved_by, reserved_at, \
          confirmed_at, customer_ref, supplier_ref, description) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(record.series.as_str())
    .bind(&record.number)
    .bind(record.year)
    .bind(record.month as i32)
    .bind(record.sequence as i32)
    .bind(record.status.as_str())
    .bind(record.reserved_by.as_deref())
    .bind(record.reserved_at)
    .bind(record.confirmed_at)
    .bind(record.customer_ref.as_deref())
    .bind(record.supplier_ref.as_deref())
    .bind(record.description.as_deref())
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert", e))?;
    Ok(())
}

async fn update_record(
    tx: &mut Transaction<'_, Postgres>,
    record: &OrderNumber,
) -> DomainResult<()> {
    let result = sqlx::query(
        "UPDATE order_numbers SET \
           status = $3, reserved_by = $4, reserved_at = $5, confirmed_at = $6, \
           customer_ref = $7, supplier_ref = $8, description = $9 \
         WHERE series = $1 AND number = $2",
    )
    .bind(record.series.as_str())
    .bind(&record.number)
    .bind(record.status.as_str())
    .bind(record.reserved_by.as_deref())
    .bind(record.reserved_at)
    .bind(record.confirmed_at)
    .bind(record.customer_ref.as_deref())
    .bind(record.supplier_ref.as_deref())
    .bind(record.description.as_deref())
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("update", e))?;

    if result.rows_affected() == 0 {
        return Err(DomainError::not_found());
    }
    Ok(())
}

struct NumberRow {
    series: String,
    number: String,
    year: i32,
    month: i32,
    sequence: i32,
    status: String,
    reserved_by: Option<String>,
    reserved_at: Option<DateTime<Utc>>,
    confirmed_at: Option<DateTime<Utc>>,
    customer_ref: Option<String>,
    supplier_ref: Option<String>,
    description: Option<String>,
}

impl<'r> FromRow<'r, PgRow> for NumberRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            series: row.try_get("series")?,
            number: row.try_get("number")?,
            year: row.try_get("year")?,
            month: row.try_get("month")?,
            sequence: row.try_get("sequence")?,
            status: row.try_get("status")?,
            reserved_by: row.try_get("reserved_by")?,
            reserved_at: row.try_get("reserved_at")?,
            confirmed_at: row.try_get("confirmed_at")?,
            customer_ref: row.try_get("customer_ref")?,
            supplier_ref: row.try_get("supplier_ref")?,
            description: row.try_get("description")?,
        })
    }
}

impl NumberRow {
    fn into_record(self) -> DomainResult<OrderNumber> {
        Ok(OrderNumber {
            number: self.number,
            series: self.series.parse()?,
            year: self.year,
            month: self.month as u32,
            sequence: self.sequence as u32,
            status: self.status.parse()?,
            reserved_by: self.reserved_by,
            reserved_at: self.reserved_at,
            confirmed_at: self.confirmed_at,
            customer_ref: self.customer_ref,
            supplier_ref: self.supplier_ref,
            description: self.description,
        })
    }
}

fn map_sqlx_error(operation: &str, error: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(ref db) = error {
        if db.code().as_deref() == Some("23505") {
            return DomainError::conflict(format!("{operation}: duplicate key: {}", db.message()));
        }
    }
    DomainError::storage(format!("{operation}: {error}"))
}
