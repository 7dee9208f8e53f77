//! Bulk insert into PostgreSQL.
//!
//! The destination table is expected to exist already, e.g.
//!
//! ```sql
//! CREATE TABLE raw.spotify_events (
//!     end_time                timestamptz,
//!     artist_name             text,
//!     track_name              text,
//!     ms_played               bigint,
//!     album_name              text,
//!     context                 text,
//!     platform                text,
//!     conn_country            text,
//!     ip_addr                 text,
//!     spotify_track_uri       text,
//!     episode_name            text,
//!     episode_show_name       text,
//!     spotify_episode_uri     text,
//!     audiobook_title         text,
//!     audiobook_uri           text,
//!     audiobook_chapter_uri   text,
//!     audiobook_chapter_title text,
//!     reason_start            text,
//!     reason_end              text,
//!     shuffle                 boolean,
//!     skipped                 boolean,
//!     offline                 boolean,
//!     offline_timestamp       bigint,
//!     incognito_mode          boolean
//! );
//! ```

use crate::config::database::DatabaseConfig;
use crate::domain::ports::RowSink;
use crate::domain::target_row::{SqlValue, TargetRow};
use crate::utils::error::Result;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Postgres, QueryBuilder};

/// PostgreSQL accepts at most this many bind parameters per statement.
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Most rows a single INSERT can carry.
pub const MAX_BATCH_ROWS: usize = MAX_BIND_PARAMS / TargetRow::COLUMN_COUNT;

/// Rows per INSERT statement unless configured otherwise.
pub const DEFAULT_BATCH_ROWS: usize = 100;

pub const DEFAULT_TABLE: &str = "raw.spotify_events";

/// Builds one multi-row INSERT for `rows`.
pub fn build_insert(table: &str, rows: &[TargetRow]) -> QueryBuilder<'static, Postgres> {
    let columns = TargetRow::column_names().join(", ");
    let mut builder = QueryBuilder::new(format!("INSERT INTO {} ({}) ", table, columns));

    builder.push_values(rows, |mut tuple, row| {
        for (_, value) in row.bindings() {
            match value {
                SqlValue::Text(v) => tuple.push_bind(v),
                SqlValue::BigInt(v) => tuple.push_bind(v),
                SqlValue::Bool(v) => tuple.push_bind(v),
                SqlValue::Timestamp(v) => tuple.push_bind(v),
            };
        }
    });

    builder
}

pub struct PostgresSink {
    options: PgConnectOptions,
    table: String,
    batch_rows: usize,
}

impl PostgresSink {
    pub fn new(database: &DatabaseConfig, table: impl Into<String>, batch_rows: usize) -> Self {
        Self {
            options: database.connect_options(),
            table: table.into(),
            batch_rows: batch_rows.clamp(1, MAX_BATCH_ROWS),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// All statements share one transaction, so the batch lands in full or not
    /// at all.
    async fn insert_all(&self, conn: &mut PgConnection, rows: &[TargetRow]) -> Result<u64> {
        let mut tx = conn.begin().await?;
        let mut inserted = 0;

        for (page, chunk) in rows.chunks(self.batch_rows).enumerate() {
            let mut builder = build_insert(&self.table, chunk);
            let result = builder.build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
            tracing::debug!(
                "Inserted page {} ({} rows, {} total)",
                page + 1,
                chunk.len(),
                inserted
            );
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

impl RowSink for PostgresSink {
    async fn insert_rows(&self, rows: &[TargetRow]) -> Result<u64> {
        if rows.is_empty() {
            tracing::info!("No rows to insert into {}", self.table);
            return Ok(0);
        }

        tracing::debug!(
            "Connecting to PostgreSQL at {}:{}",
            self.options.get_host(),
            self.options.get_port()
        );
        let mut conn = PgConnection::connect_with(&self.options).await?;

        let outcome = self.insert_all(&mut conn, rows).await;

        // An uncommitted transaction was already rolled back when it dropped.
        if let Err(e) = conn.close().await {
            tracing::warn!("Failed to close database connection cleanly: {}", e);
        }

        outcome
    }
}
