//! The fixed row shape written to the destination table.
//!
//! Column names and bound values both come out of [`TargetRow::bindings`], so
//! the INSERT column list can never drift out of step with the values.

use crate::domain::model::Record;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Keys of a streaming-history record, as written by the export.
pub mod keys {
    pub const TS: &str = "ts";
    pub const ARTIST_NAME: &str = "master_metadata_album_artist_name";
    pub const TRACK_NAME: &str = "master_metadata_track_name";
    pub const MS_PLAYED: &str = "ms_played";
    pub const ALBUM_NAME: &str = "master_metadata_album_album_name";
    pub const PLATFORM: &str = "platform";
    pub const CONN_COUNTRY: &str = "conn_country";
    pub const IP_ADDR: &str = "ip_addr";
    pub const SPOTIFY_TRACK_URI: &str = "spotify_track_uri";
    pub const EPISODE_NAME: &str = "episode_name";
    pub const EPISODE_SHOW_NAME: &str = "episode_show_name";
    pub const SPOTIFY_EPISODE_URI: &str = "spotify_episode_uri";
    pub const AUDIOBOOK_TITLE: &str = "audiobook_title";
    pub const AUDIOBOOK_URI: &str = "audiobook_uri";
    pub const AUDIOBOOK_CHAPTER_URI: &str = "audiobook_chapter_uri";
    pub const AUDIOBOOK_CHAPTER_TITLE: &str = "audiobook_chapter_title";
    pub const REASON_START: &str = "reason_start";
    pub const REASON_END: &str = "reason_end";
    pub const SHUFFLE: &str = "shuffle";
    pub const SKIPPED: &str = "skipped";
    pub const OFFLINE: &str = "offline";
    pub const OFFLINE_TIMESTAMP: &str = "offline_timestamp";
    pub const INCOGNITO_MODE: &str = "incognito_mode";
}

/// A single bind parameter, tagged with the SQL type it is sent as.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    BigInt(Option<i64>),
    Bool(Option<bool>),
    Timestamp(Option<DateTime<Utc>>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Text(v) => v.is_none(),
            SqlValue::BigInt(v) => v.is_none(),
            SqlValue::Bool(v) => v.is_none(),
            SqlValue::Timestamp(v) => v.is_none(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetRow {
    pub end_time: Option<DateTime<Utc>>,
    pub artist_name: Option<String>,
    pub track_name: Option<String>,
    pub ms_played: Option<i64>,
    pub album_name: Option<String>,
    /// Not present in the export; always written as NULL.
    pub context: Option<String>,
    pub platform: Option<String>,
    pub conn_country: Option<String>,
    pub ip_addr: Option<String>,
    pub spotify_track_uri: Option<String>,
    pub episode_name: Option<String>,
    pub episode_show_name: Option<String>,
    pub spotify_episode_uri: Option<String>,
    pub audiobook_title: Option<String>,
    pub audiobook_uri: Option<String>,
    pub audiobook_chapter_uri: Option<String>,
    pub audiobook_chapter_title: Option<String>,
    pub reason_start: Option<String>,
    pub reason_end: Option<String>,
    pub shuffle: Option<bool>,
    pub skipped: Option<bool>,
    pub offline: Option<bool>,
    pub offline_timestamp: Option<i64>,
    pub incognito_mode: Option<bool>,
}

impl TargetRow {
    pub const COLUMN_COUNT: usize = 24;

    /// Absent keys, and values of the wrong JSON type, become `None`.
    pub fn from_record(record: &Record) -> Self {
        Self {
            end_time: timestamp(record.get(keys::TS)),
            artist_name: text(record.get(keys::ARTIST_NAME)),
            track_name: text(record.get(keys::TRACK_NAME)),
            ms_played: big_int(record.get(keys::MS_PLAYED)),
            album_name: text(record.get(keys::ALBUM_NAME)),
            context: None,
            platform: text(record.get(keys::PLATFORM)),
            conn_country: text(record.get(keys::CONN_COUNTRY)),
            ip_addr: text(record.get(keys::IP_ADDR)),
            spotify_track_uri: text(record.get(keys::SPOTIFY_TRACK_URI)),
            episode_name: text(record.get(keys::EPISODE_NAME)),
            episode_show_name: text(record.get(keys::EPISODE_SHOW_NAME)),
            spotify_episode_uri: text(record.get(keys::SPOTIFY_EPISODE_URI)),
            audiobook_title: text(record.get(keys::AUDIOBOOK_TITLE)),
            audiobook_uri: text(record.get(keys::AUDIOBOOK_URI)),
            audiobook_chapter_uri: text(record.get(keys::AUDIOBOOK_CHAPTER_URI)),
            audiobook_chapter_title: text(record.get(keys::AUDIOBOOK_CHAPTER_TITLE)),
            reason_start: text(record.get(keys::REASON_START)),
            reason_end: text(record.get(keys::REASON_END)),
            shuffle: boolean(record.get(keys::SHUFFLE)),
            skipped: boolean(record.get(keys::SKIPPED)),
            offline: boolean(record.get(keys::OFFLINE)),
            offline_timestamp: big_int(record.get(keys::OFFLINE_TIMESTAMP)),
            incognito_mode: boolean(record.get(keys::INCOGNITO_MODE)),
        }
    }

    /// Destination column names paired with their values, in table order.
    pub fn bindings(&self) -> [(&'static str, SqlValue); Self::COLUMN_COUNT] {
        [
            ("end_time", SqlValue::Timestamp(self.end_time)),
            ("artist_name", SqlValue::Text(self.artist_name.clone())),
            ("track_name", SqlValue::Text(self.track_name.clone())),
            ("ms_played", SqlValue::BigInt(self.ms_played)),
            ("album_name", SqlValue::Text(self.album_name.clone())),
            ("context", SqlValue::Text(self.context.clone())),
            ("platform", SqlValue::Text(self.platform.clone())),
            ("conn_country", SqlValue::Text(self.conn_country.clone())),
            ("ip_addr", SqlValue::Text(self.ip_addr.clone())),
            ("spotify_track_uri", SqlValue::Text(self.spotify_track_uri.clone())),
            ("episode_name", SqlValue::Text(self.episode_name.clone())),
            ("episode_show_name", SqlValue::Text(self.episode_show_name.clone())),
            ("spotify_episode_uri", SqlValue::Text(self.spotify_episode_uri.clone())),
            ("audiobook_title", SqlValue::Text(self.audiobook_title.clone())),
            ("audiobook_uri", SqlValue::Text(self.audiobook_uri.clone())),
            ("audiobook_chapter_uri", SqlValue::Text(self.audiobook_chapter_uri.clone())),
            ("audiobook_chapter_title", SqlValue::Text(self.audiobook_chapter_title.clone())),
            ("reason_start", SqlValue::Text(self.reason_start.clone())),
            ("reason_end", SqlValue::Text(self.reason_end.clone())),
            ("shuffle", SqlValue::Bool(self.shuffle)),
            ("skipped", SqlValue::Bool(self.skipped)),
            ("offline", SqlValue::Bool(self.offline)),
            ("offline_timestamp", SqlValue::BigInt(self.offline_timestamp)),
            ("incognito_mode", SqlValue::Bool(self.incognito_mode)),
        ]
    }

    pub fn column_names() -> [&'static str; Self::COLUMN_COUNT] {
        Self::default().bindings().map(|(name, _)| name)
    }

    pub fn value(&self, column: &str) -> Option<SqlValue> {
        self.bindings()
            .into_iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn big_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn boolean(value: &Value) -> Option<bool> {
    value.as_bool()
}

fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!("Unparseable timestamp '{}': {}", raw, e);
            None
        }
    }
}
