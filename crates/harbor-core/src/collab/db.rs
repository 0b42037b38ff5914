//! Database collaborator: a fluent statement chain over an opaque driver

use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// A positional statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Text value
    Text(String),
    /// Numeric value
    Number(f64),
    /// UTC timestamp
    Date(DateTime<Utc>),
    /// Boolean value
    Bool(bool),
}

/// One result row, column name to value
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Outcome of a non-query statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbResult {
    /// Rows changed by the statement
    pub rows_affected: u64,
    /// Driver-reported id of the last inserted row, if any
    pub last_insert_id: Option<String>,
}

/// Opaque database driver.
///
/// The chain below is the only consumer; SQL dialect handling is out of
/// scope and lives behind this trait.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run a statement that does not return rows
    async fn execute(&self, conn: &str, sql: &str, params: &[SqlParam]) -> Result<DbResult>;

    /// Run a statement that returns rows
    async fn query(&self, conn: &str, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>>;
}

/// A handle on one connection string
#[derive(Clone)]
pub struct Connection {
    driver: Arc<dyn Database>,
    conn: String,
}

impl Connection {
    /// Create a connection handle over a driver
    pub fn new(driver: Arc<dyn Database>, conn: impl Into<String>) -> Self {
        Self {
            driver,
            conn: conn.into(),
        }
    }

    /// Start a statement with SQL text
    pub fn statement(&self, sql: impl Into<String>) -> Statement {
        Statement {
            driver: Arc::clone(&self.driver),
            conn: self.conn.clone(),
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Start an empty statement; set SQL later with [`Statement::set_sql`]
    pub fn empty_statement(&self) -> Statement {
        self.statement("")
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").field("conn", &self.conn).finish()
    }
}

/// Fluent statement builder.
///
/// Setters consume and return the builder; a terminal call (`execute`,
/// `query`, `query_one`, `query_scalar`) hands the accumulated SQL and
/// parameters to the driver.
pub struct Statement {
    driver: Arc<dyn Database>,
    conn: String,
    sql: String,
    params: Vec<SqlParam>,
}

impl Statement {
    /// Replace the SQL text
    pub fn set_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = sql.into();
        self
    }

    /// Append a text parameter
    pub fn set_string(mut self, value: impl Into<String>) -> Self {
        self.params.push(SqlParam::Text(value.into()));
        self
    }

    /// Append a numeric parameter
    pub fn set_number(mut self, value: f64) -> Self {
        self.params.push(SqlParam::Number(value));
        self
    }

    /// Append a timestamp parameter
    pub fn set_date(mut self, value: DateTime<Utc>) -> Self {
        self.params.push(SqlParam::Date(value));
        self
    }

    /// Append a boolean parameter
    pub fn set_boolean(mut self, value: bool) -> Self {
        self.params.push(SqlParam::Bool(value));
        self
    }

    /// Terminal: run the statement, returning affected-row info
    pub async fn execute(self) -> Result<DbResult> {
        self.driver.execute(&self.conn, &self.sql, &self.params).await
    }

    /// Terminal: run the statement, returning all rows
    pub async fn query(self) -> Result<Vec<Row>> {
        self.driver.query(&self.conn, &self.sql, &self.params).await
    }

    /// Terminal: run the statement, returning exactly one row
    pub async fn query_one(self) -> Result<Row> {
        let mut rows = self.query().await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(Error::collaborator(
                "database",
                format!("expected one row, got {n}"),
            )),
        }
    }

    /// Terminal: run the statement, returning the first column of the first row
    pub async fn query_scalar(self) -> Result<serde_json::Value> {
        let row = self.query_one().await?;
        row.into_iter()
            .next()
            .map(|(_, v)| v)
            .ok_or_else(|| Error::collaborator("database", "scalar query returned no columns"))
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("conn", &self.conn)
            .field("sql", &self.sql)
            .field("params", &self.params.len())
            .finish()
    }
}
