//! Parameterised SET and WHERE clause composition.
//!
//! Clause text is assembled only from `&'static str` column names owned by the
//! `UpdateField` and `FilterColumn` enums plus `$n` placeholders. Every
//! caller-supplied value travels as a bound `SqlValue`.

use serde_json::{Map, Value as JsonValue};
use sqlx::postgres::PgArguments;
use sqlx::query::{Query, QueryAs};
use sqlx::Postgres;
use uuid::Uuid;

use crate::error::StoreError;

/// Columns that may be changed after insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateField {
    Visibility,
    DownloadAllowed,
    Status,
    TranscodingStatus,
}

/// Allow-list, in the order clauses are emitted.
pub const ALLOWED_UPDATE_FIELDS: [UpdateField; 4] = [
    UpdateField::Visibility,
    UpdateField::DownloadAllowed,
    UpdateField::Status,
    UpdateField::TranscodingStatus,
];

impl UpdateField {
    pub fn column(self) -> &'static str {
        match self {
            UpdateField::Visibility => "visibility",
            UpdateField::DownloadAllowed => "download_allowed",
            UpdateField::Status => "status",
            UpdateField::TranscodingStatus => "transcoding_status",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        ALLOWED_UPDATE_FIELDS
            .into_iter()
            .find(|field| field.column() == key)
    }
}

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    NullableText(Option<String>),
    Bool(bool),
    Uuid(Uuid),
    BigInt(i64),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<Uuid> for SqlValue {
    fn from(value: Uuid) -> Self {
        SqlValue::Uuid(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::BigInt(value)
    }
}

/// Anything a `SqlValue` can be bound onto.
pub trait BindParams: Sized {
    fn bind_value(self, value: SqlValue) -> Self;
}

impl<'q> BindParams for Query<'q, Postgres, PgArguments> {
    fn bind_value(self, value: SqlValue) -> Self {
        match value {
            SqlValue::Text(v) => self.bind(v),
            SqlValue::NullableText(v) => self.bind(v),
            SqlValue::Bool(v) => self.bind(v),
            SqlValue::Uuid(v) => self.bind(v),
            SqlValue::BigInt(v) => self.bind(v),
        }
    }
}

impl<'q, O> BindParams for QueryAs<'q, Postgres, O, PgArguments> {
    fn bind_value(self, value: SqlValue) -> Self {
        match value {
            SqlValue::Text(v) => self.bind(v),
            SqlValue::NullableText(v) => self.bind(v),
            SqlValue::Bool(v) => self.bind(v),
            SqlValue::Uuid(v) => self.bind(v),
            SqlValue::BigInt(v) => self.bind(v),
        }
    }
}

/// Clause text plus its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedClause {
    sql: String,
    params: Vec<SqlValue>,
    next_placeholder: usize,
}

impl ComposedClause {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Index of the first placeholder not used by this clause.
    pub fn next_placeholder(&self) -> usize {
        self.next_placeholder
    }

    pub fn bind_to<Q: BindParams>(self, query: Q) -> Q {
        self.params
            .into_iter()
            .fold(query, |query, value| query.bind_value(value))
    }
}

/// Typed update request. `None` means "leave the column alone".
///
/// `transcoding_status` is the only nullable column, so it alone can be
/// explicitly cleared with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoMetadataUpdate {
    pub visibility: Option<String>,
    pub download_allowed: Option<bool>,
    pub status: Option<String>,
    pub transcoding_status: Option<Option<String>>,
}

impl VideoMetadataUpdate {
    /// The visibility/download pair applied right after an upload is recorded.
    pub fn policy(visibility: impl Into<String>, download_allowed: bool) -> Self {
        Self {
            visibility: Some(visibility.into()),
            download_allowed: Some(download_allowed),
            ..Default::default()
        }
    }

    /// Build from a JSON object. Unknown keys are dropped; an allow-listed key
    /// with the wrong JSON type is rejected.
    pub fn from_json_map(map: &Map<String, JsonValue>) -> Result<Self, StoreError> {
        let mut update = Self::default();

        for (key, value) in map {
            let Some(field) = UpdateField::from_key(key) else {
                tracing::debug!(field = %key, "Ignoring field outside the update allow-list");
                continue;
            };

            match field {
                UpdateField::Visibility => update.visibility = Some(expect_string(key, value)?),
                UpdateField::Status => update.status = Some(expect_string(key, value)?),
                UpdateField::DownloadAllowed => match value {
                    JsonValue::Bool(b) => update.download_allowed = Some(*b),
                    _ => return Err(wrong_type(key, "a boolean")),
                },
                UpdateField::TranscodingStatus => match value {
                    JsonValue::Null => update.transcoding_status = Some(None),
                    JsonValue::String(s) => update.transcoding_status = Some(Some(s.clone())),
                    _ => return Err(wrong_type(key, "a string or null")),
                },
            }
        }

        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        ALLOWED_UPDATE_FIELDS
            .into_iter()
            .all(|field| self.value_for(field).is_none())
    }

    fn value_for(&self, field: UpdateField) -> Option<SqlValue> {
        match field {
            UpdateField::Visibility => self.visibility.clone().map(SqlValue::Text),
            UpdateField::DownloadAllowed => self.download_allowed.map(SqlValue::Bool),
            UpdateField::Status => self.status.clone().map(SqlValue::Text),
            UpdateField::TranscodingStatus => self
                .transcoding_status
                .clone()
                .map(SqlValue::NullableText),
        }
    }
}

fn expect_string(key: &str, value: &JsonValue) -> Result<String, StoreError> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        _ => Err(wrong_type(key, "a string")),
    }
}

fn wrong_type(key: &str, expected: &str) -> StoreError {
    StoreError::InvalidInput(format!("Field '{}' must be {}", key, expected))
}

/// `col = $n, ...` for every set member of `update`, in allow-list order.
/// `None` when nothing is set.
pub fn compose_set(update: &VideoMetadataUpdate, first_placeholder: usize) -> Option<ComposedClause> {
    let mut assignments = Vec::new();
    let mut params = Vec::new();
    let mut param_count = first_placeholder;

    for field in ALLOWED_UPDATE_FIELDS {
        if let Some(value) = update.value_for(field) {
            assignments.push(format!("{} = ${}", field.column(), param_count));
            params.push(value);
            param_count += 1;
        }
    }

    if assignments.is_empty() {
        return None;
    }

    Some(ComposedClause {
        sql: assignments.join(", "),
        params,
        next_placeholder: param_count,
    })
}

/// Columns usable in a WHERE clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    VideoId,
    OwnerUserId,
    Visibility,
    Status,
    OriginalFilename,
    UserId,
}

impl FilterColumn {
    pub fn column(self) -> &'static str {
        match self {
            FilterColumn::VideoId => "video_id",
            FilterColumn::OwnerUserId => "owner_user_id",
            FilterColumn::Visibility => "visibility",
            FilterColumn::Status => "status",
            FilterColumn::OriginalFilename => "original_filename",
            FilterColumn::UserId => "user_id",
        }
    }
}

/// Escape `LIKE` metacharacters so the value matches as a literal substring.
pub fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Conjunctive WHERE clause builder.
#[derive(Debug)]
pub struct FilterBuilder {
    conditions: Vec<String>,
    params: Vec<SqlValue>,
    param_count: usize,
}

impl FilterBuilder {
    pub fn new(first_placeholder: usize) -> Self {
        Self {
            conditions: Vec::new(),
            params: Vec::new(),
            param_count: first_placeholder,
        }
    }

    pub fn eq(mut self, column: FilterColumn, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(format!("{} = ${}", column.column(), self.param_count));
        self.params.push(value.into());
        self.param_count += 1;
        self
    }

    pub fn eq_opt<V: Into<SqlValue>>(self, column: FilterColumn, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    /// Case-insensitive literal substring match.
    pub fn contains_ci(mut self, column: FilterColumn, needle: &str) -> Self {
        self.conditions.push(format!(
            "{} ILIKE ${} ESCAPE '\\'",
            column.column(),
            self.param_count
        ));
        self.params
            .push(SqlValue::Text(format!("%{}%", escape_like(needle))));
        self.param_count += 1;
        self
    }

    pub fn contains_ci_opt(self, column: FilterColumn, needle: Option<&str>) -> Self {
        match needle {
            Some(n) => self.contains_ci(column, n),
            None => self,
        }
    }

    /// `WHERE a = $1 AND ...`, or an empty clause when no condition was added.
    pub fn build(self) -> ComposedClause {
        let sql = if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        };
        ComposedClause {
            sql,
            params: self.params,
            next_placeholder: self.param_count,
        }
    }
}
