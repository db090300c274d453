//! Filter parser: request parameters to typed predicates and pagination.
//!
//! # Responsibility
//! - Resolve `<field>` / `<field>_<op>` keys against a table schema.
//! - Coerce string values into typed SQL values per column kind.
//! - Derive pagination bounds from the reserved `page` / `page_size` keys.
//!
//! # Invariants
//! - Predicate order follows key order of [`QueryParams`], so identical input
//!   always renders identical SQL.
//! - One predicate per non-pagination key.
//! - Parsing never touches storage; every failure is a local rejection.

use crate::config::ConfigError;
use crate::query::schema::{Column, ColumnKind, TableSchema};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const PAGE_KEY: &str = "page";
pub const PAGE_SIZE_KEY: &str = "page_size";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

static FILTER_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z][a-z0-9_]*?)(?:_(eq|ne|gt|gte|lt|lte|like))?$")
        .expect("valid filter key regex")
});

/// Raw request parameters: key to every value supplied for it.
///
/// Ordered map so predicate order is stable across calls.
pub type QueryParams = BTreeMap<String, Vec<String>>;

pub type FilterResult<T> = Result<T, FilterError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Key does not resolve to a filterable field/operator pair.
    InvalidFilter { key: String, reason: &'static str },
    /// Value cannot be coerced to the column's kind.
    InvalidValue { key: String, value: String },
    /// `page` / `page_size` out of range or not an integer.
    InvalidPagination { key: String, value: String },
}

impl Display for FilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFilter { key, reason } => write!(f, "invalid filter `{key}`: {reason}"),
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for filter `{key}`")
            }
            Self::InvalidPagination { key, value } => {
                write!(f, "invalid pagination `{key}={value}`")
            }
        }
    }
}

impl Error for FilterError {}

/// Comparison operator carried by a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

impl FilterOp {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "like" => Some(Self::Like),
            _ => None,
        }
    }

    /// Whether repeated values widen into an `IN` / `NOT IN` set.
    pub fn accepts_many(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }

    fn supports(self, kind: ColumnKind) -> bool {
        match self {
            Self::Eq | Self::Ne => true,
            Self::Gt | Self::Gte | Self::Lt | Self::Lte => {
                matches!(kind, ColumnKind::Integer | ColumnKind::Timestamp)
            }
            Self::Like => matches!(kind, ColumnKind::Text),
        }
    }
}

/// One comparison against a table-qualified column.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub table: &'static str,
    pub column: &'static str,
    pub op: FilterOp,
    /// Never empty. Only `Eq`/`Ne` carry more than one value.
    pub values: Vec<Value>,
}

impl Predicate {
    pub fn equals(table: &'static str, column: &'static str, value: Value) -> Self {
        Self {
            table,
            column,
            op: FilterOp::Eq,
            values: vec![value],
        }
    }
}

/// Page size policy applied when parsing `page_size`.
///
/// Always satisfies `1 <= default_page_size <= max_page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    default_page_size: u32,
    max_page_size: u32,
}

impl PageLimits {
    /// # Errors
    /// - `InvalidPageLimits` when the default is zero or above the maximum.
    pub fn new(default_page_size: u32, max_page_size: u32) -> Result<Self, ConfigError> {
        if default_page_size == 0 || default_page_size > max_page_size {
            return Err(ConfigError::InvalidPageLimits {
                default_page_size,
                max_page_size,
            });
        }
        Ok(Self {
            default_page_size,
            max_page_size,
        })
    }

    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    pub fn max_page_size(&self) -> u32 {
        self.max_page_size
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFilter {
    pub predicates: Vec<Predicate>,
    pub pagination: Pagination,
}

/// Parses request parameters against `schema`.
///
/// # Errors
/// - `InvalidFilter` for unknown fields or operators the column cannot take.
/// - `InvalidValue` for values that do not fit the column kind.
/// - `InvalidPagination` for malformed or out-of-range `page` / `page_size`.
pub fn parse_filter(
    schema: &TableSchema,
    params: &QueryParams,
    limits: PageLimits,
) -> FilterResult<ParsedFilter> {
    let pagination = parse_pagination(params, limits)?;

    let mut predicates = Vec::new();
    for (key, values) in params {
        if key == PAGE_KEY || key == PAGE_SIZE_KEY {
            continue;
        }
        predicates.push(parse_predicate(schema, key, values)?);
    }

    Ok(ParsedFilter {
        predicates,
        pagination,
    })
}

fn parse_predicate(schema: &TableSchema, key: &str, values: &[String]) -> FilterResult<Predicate> {
    let (column, op) = resolve_key(schema, key)?;
    if !op.supports(column.kind) {
        return Err(FilterError::InvalidFilter {
            key: key.to_string(),
            reason: "operator not supported for this field",
        });
    }

    let Some(first) = values.first() else {
        return Err(FilterError::InvalidValue {
            key: key.to_string(),
            value: String::new(),
        });
    };
    let raw_values = if op.accepts_many() {
        values
    } else {
        std::slice::from_ref(first)
    };

    let values = raw_values
        .iter()
        .map(|raw| coerce_value(key, column.kind, op, raw))
        .collect::<FilterResult<Vec<_>>>()?;

    Ok(Predicate {
        table: schema.name,
        column: column.name,
        op,
        values,
    })
}

fn resolve_key<'s>(schema: &'s TableSchema, key: &str) -> FilterResult<(&'s Column, FilterOp)> {
    if let Some(column) = schema.column(key) {
        return Ok((column, FilterOp::Eq));
    }

    let unknown = || FilterError::InvalidFilter {
        key: key.to_string(),
        reason: "unknown field",
    };
    let captures = FILTER_KEY_RE.captures(key).ok_or_else(unknown)?;
    let field = captures.get(1).ok_or_else(unknown)?.as_str();
    let op = captures
        .get(2)
        .and_then(|suffix| FilterOp::from_suffix(suffix.as_str()))
        .unwrap_or(FilterOp::Eq);
    let column = schema.column(field).ok_or_else(unknown)?;
    Ok((column, op))
}

fn coerce_value(key: &str, kind: ColumnKind, op: FilterOp, raw: &str) -> FilterResult<Value> {
    let invalid = || FilterError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    };

    match kind {
        ColumnKind::Integer | ColumnKind::Timestamp => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| invalid()),
        ColumnKind::Text if op == FilterOp::Like => {
            Ok(Value::Text(format!("%{}%", escape_like(raw))))
        }
        ColumnKind::Text => Ok(Value::Text(raw.to_string())),
        ColumnKind::Choice(allowed) => {
            if allowed.contains(&raw) {
                Ok(Value::Text(raw.to_string()))
            } else {
                Err(invalid())
            }
        }
    }
}

/// Escapes `LIKE` wildcards so user text matches literally (`ESCAPE '\'`).
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_pagination(params: &QueryParams, limits: PageLimits) -> FilterResult<Pagination> {
    let page = match first_value(params, PAGE_KEY)? {
        Some(raw) => parse_bound(PAGE_KEY, raw, u32::MAX)?,
        None => 1,
    };
    let page_size = match first_value(params, PAGE_SIZE_KEY)? {
        Some(raw) => parse_bound(PAGE_SIZE_KEY, raw, limits.max_page_size)?,
        None => limits.default_page_size,
    };

    Ok(Pagination { page, page_size })
}

/// A reserved key supplied without any value is rejected, not defaulted.
fn first_value<'p>(params: &'p QueryParams, key: &str) -> FilterResult<Option<&'p str>> {
    let Some(values) = params.get(key) else {
        return Ok(None);
    };
    values
        .first()
        .map(|value| Some(value.as_str()))
        .ok_or_else(|| FilterError::InvalidPagination {
            key: key.to_string(),
            value: String::new(),
        })
}

fn parse_bound(key: &str, raw: &str, max: u32) -> FilterResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(value) if (1..=max).contains(&value) => Ok(value),
        _ => Err(FilterError::InvalidPagination {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
