//! Round trip through a real PostgreSQL server.
//!
//! Run with `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER` and `DB_PASSWORD` set:
//! `cargo test --test postgres_sink_test -- --ignored`

use spotify_history_etl::config::database::{DatabaseConfig, DatabaseSettings};
use spotify_history_etl::domain::ports::RowSink;
use spotify_history_etl::{PostgresSink, TargetRow};
use sqlx::postgres::PgConnection;
use sqlx::Connection;

fn database_from_env() -> DatabaseConfig {
    DatabaseSettings {
        host: std::env::var("DB_HOST").ok(),
        port: std::env::var("DB_PORT").ok(),
        database: std::env::var("DB_NAME").ok(),
        user: std::env::var("DB_USER").ok(),
        password: std::env::var("DB_PASSWORD").ok(),
    }
    .resolve()
    .expect("DB_* variables must be set")
}

async fn create_table(conn: &mut PgConnection, table: &str) {
    sqlx::query(&format!(
        "CREATE TABLE {} (
            end_time timestamptz, artist_name text, track_name text, ms_played bigint,
            album_name text, context text, platform text, conn_country text, ip_addr text,
            spotify_track_uri text, episode_name text, episode_show_name text,
            spotify_episode_uri text, audiobook_title text, audiobook_uri text,
            audiobook_chapter_uri text, audiobook_chapter_title text, reason_start text,
            reason_end text, shuffle boolean, skipped boolean, offline boolean,
            offline_timestamp bigint, incognito_mode boolean
        )",
        table
    ))
    .execute(&mut *conn)
    .await
    .unwrap();
}

async fn drop_table(conn: &mut PgConnection, table: &str) {
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
        .execute(&mut *conn)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "needs a running PostgreSQL server"]
async fn test_rows_round_trip_across_pages() {
    let database = database_from_env();
    let table = format!("spotify_events_test_{}", std::process::id());
    let mut conn = PgConnection::connect_with(&database.connect_options())
        .await
        .unwrap();
    create_table(&mut conn, &table).await;

    let rows: Vec<TargetRow> = (0..250)
        .map(|i| TargetRow {
            ms_played: Some(i),
            track_name: (i % 2 == 0).then(|| format!("Track {}", i)),
            skipped: Some(i % 3 == 0),
            ..Default::default()
        })
        .collect();

    // Three pages of at most 100 rows.
    let sink = PostgresSink::new(&database, table.clone(), 100);
    let inserted = sink.insert_rows(&rows).await.unwrap();

    let (count, named): (i64, i64) = sqlx::query_as(&format!(
        "SELECT COUNT(*), COUNT(track_name) FROM {}",
        table
    ))
    .fetch_one(&mut conn)
    .await
    .unwrap();

    drop_table(&mut conn, &table).await;
    conn.close().await.unwrap();

    assert_eq!(inserted, 250);
    assert_eq!(count, 250);
    assert_eq!(named, 125);
}

#[tokio::test]
#[ignore = "needs a running PostgreSQL server"]
async fn test_failed_page_rolls_back_the_whole_batch() {
    let database = database_from_env();
    let table = format!("spotify_events_rollback_{}", std::process::id());
    let mut conn = PgConnection::connect_with(&database.connect_options())
        .await
        .unwrap();
    create_table(&mut conn, &table).await;
    sqlx::query(&format!(
        "ALTER TABLE {} ADD CONSTRAINT ms_played_small CHECK (ms_played < 150)",
        table
    ))
    .execute(&mut conn)
    .await
    .unwrap();

    let rows: Vec<TargetRow> = (0..200)
        .map(|i| TargetRow {
            ms_played: Some(i),
            ..Default::default()
        })
        .collect();

    let sink = PostgresSink::new(&database, table.clone(), 100);
    let result = sink.insert_rows(&rows).await;

    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(&mut conn)
        .await
        .unwrap();

    drop_table(&mut conn, &table).await;
    conn.close().await.unwrap();

    assert!(result.is_err());
    assert_eq!(count, 0, "the first page must not survive the failed second page");
}
