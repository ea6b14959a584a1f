//! Schema normalization — reconciles per-source column naming into the
//! canonical marketing and business schemas and tags every marketing row
//! with the channel of the source it came from.
//!
//! Renames are declared data ([`RenameTable`]), consulted once per source
//! table. Supporting another naming variant means adding an entry, either to
//! the built-in tables below or through `schema.*_aliases` in the config.

use adspend_core::config::{ColumnAlias, SchemaConfig};
use adspend_core::types::{BusinessRecord, MarketingRecord, MediaVolume};
use adspend_core::{Channel, SchemaError};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tracing::debug;

use crate::table::SourceTable;

// ─── Canonical Schema ───────────────────────────────────────────────────────

pub const DATE: &str = "date";
pub const IMPRESSIONS: &str = "impressions";
pub const CLICKS: &str = "clicks";
pub const SPEND: &str = "spend";
pub const ATTRIBUTED_REVENUE: &str = "attributed_revenue";
pub const CAMPAIGN: &str = "campaign";
pub const TACTIC: &str = "tactic";
pub const STATE: &str = "state";

pub const TOTAL_REVENUE: &str = "total_revenue";
pub const GROSS_PROFIT: &str = "gross_profit";
pub const ORDER_COUNT: &str = "order_count";
pub const NEW_CUSTOMERS: &str = "new_customers";

/// Source naming → canonical naming for marketing exports.
const MARKETING_RENAMES: &[(&str, &str)] = &[
    ("impression", IMPRESSIONS),
    ("attributed revenue", ATTRIBUTED_REVENUE),
];

/// Source naming → canonical naming for the business export.
const BUSINESS_RENAMES: &[(&str, &str)] = &[
    ("total revenue", TOTAL_REVENUE),
    ("gross profit", GROSS_PROFIT),
    ("# of orders", ORDER_COUNT),
    ("new customers", NEW_CUSTOMERS),
];

/// Accepted date layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ─── Rename Table ───────────────────────────────────────────────────────────

/// Fixed old-name → canonical-name mapping. Columns without an entry keep
/// their (trimmed) name.
#[derive(Debug, Clone, Default)]
pub struct RenameTable {
    entries: HashMap<String, String>,
}

impl RenameTable {
    pub fn marketing() -> Self {
        Self::from_pairs(MARKETING_RENAMES)
    }

    pub fn business() -> Self {
        Self::from_pairs(BUSINESS_RENAMES)
    }

    fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let entries = pairs
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        Self { entries }
    }

    pub fn with_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.entries.insert(from.into(), to.into());
        self
    }

    pub fn with_aliases(self, aliases: &[ColumnAlias]) -> Self {
        aliases
            .iter()
            .fold(self, |table, alias| table.with_alias(&alias.from, &alias.to))
    }

    pub fn canonical<'a>(&'a self, column: &'a str) -> &'a str {
        let column = column.trim();
        self.entries.get(column).map(String::as_str).unwrap_or(column)
    }
}

// ─── Column Resolution ──────────────────────────────────────────────────────

/// Canonical column name → position within one source table.
struct ColumnIndex<'t> {
    table: &'t str,
    positions: HashMap<&'t str, usize>,
}

impl<'t> ColumnIndex<'t> {
    fn build(table: &'t SourceTable, renames: &'t RenameTable) -> Result<Self, SchemaError> {
        let mut positions = HashMap::with_capacity(table.columns.len());
        for (pos, column) in table.columns.iter().enumerate() {
            let canonical = renames.canonical(column);
            if positions.insert(canonical, pos).is_some() {
                return Err(SchemaError::DuplicateColumn {
                    table: table.name.clone(),
                    column: canonical.to_string(),
                });
            }
        }
        Ok(Self {
            table: &table.name,
            positions,
        })
    }

    fn require(&self, column: &str) -> Result<usize, SchemaError> {
        self.positions
            .get(column)
            .copied()
            .ok_or_else(|| SchemaError::missing(self.table, column))
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }
}

/// Typed access to the cells of one row.
struct RowReader<'r> {
    table: &'r str,
    row: usize,
    cells: &'r [String],
}

impl<'r> RowReader<'r> {
    fn invalid(&self, column: &str, value: &str) -> SchemaError {
        SchemaError::InvalidValue {
            table: self.table.to_string(),
            row: self.row,
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    fn date(&self, pos: usize, column: &str) -> Result<NaiveDate, SchemaError> {
        let raw = self.cells[pos].trim();
        parse_date(raw).ok_or_else(|| self.invalid(column, raw))
    }

    /// A finite, non-negative number.
    fn amount(&self, pos: usize, column: &str) -> Result<f64, SchemaError> {
        let raw = self.cells[pos].trim();
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(self.invalid(column, raw)),
        }
    }

    fn text(&self, pos: Option<usize>) -> String {
        pos.map(|p| self.cells[p].clone()).unwrap_or_default()
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

// ─── Normalizer ─────────────────────────────────────────────────────────────

/// A marketing export together with the channel it belongs to.
#[derive(Debug, Clone)]
pub struct MarketingSource {
    pub channel: Channel,
    pub table: SourceTable,
}

impl MarketingSource {
    pub fn new(channel: Channel, table: SourceTable) -> Self {
        Self { channel, table }
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    marketing: RenameTable,
    business: RenameTable,
}

impl Normalizer {
    pub fn new(marketing: RenameTable, business: RenameTable) -> Self {
        Self {
            marketing,
            business,
        }
    }

    pub fn from_config(schema: &SchemaConfig) -> Self {
        Self::new(
            RenameTable::marketing().with_aliases(&schema.marketing_aliases),
            RenameTable::business().with_aliases(&schema.business_aliases),
        )
    }

    /// Rename, tag and concatenate every source. All rows are kept, in source
    /// order then row order.
    pub fn normalize_marketing(
        &self,
        sources: &[MarketingSource],
    ) -> Result<Vec<MarketingRecord>, SchemaError> {
        let capacity = sources.iter().map(|s| s.table.len()).sum();
        let mut records = Vec::with_capacity(capacity);

        for source in sources {
            let table = &source.table;
            table.check_shape()?;
            let index = ColumnIndex::build(table, &self.marketing)?;

            let date = index.require(DATE)?;
            let impressions = index.require(IMPRESSIONS)?;
            let clicks = index.require(CLICKS)?;
            let spend = index.require(SPEND)?;
            let revenue = index.require(ATTRIBUTED_REVENUE)?;
            let campaign = index.optional(CAMPAIGN);
            let tactic = index.optional(TACTIC);
            let state = index.optional(STATE);

            for (row, cells) in table.rows.iter().enumerate() {
                let reader = RowReader {
                    table: &table.name,
                    row,
                    cells,
                };
                records.push(MarketingRecord {
                    date: reader.date(date, DATE)?,
                    channel: source.channel,
                    volume: MediaVolume {
                        impressions: reader.amount(impressions, IMPRESSIONS)?,
                        clicks: reader.amount(clicks, CLICKS)?,
                        spend: reader.amount(spend, SPEND)?,
                        attributed_revenue: reader.amount(revenue, ATTRIBUTED_REVENUE)?,
                    },
                    campaign: reader.text(campaign),
                    tactic: reader.text(tactic),
                    state: reader.text(state),
                });
            }

            debug!(
                source = %table.name,
                channel = %source.channel,
                rows = table.len(),
                "Marketing source normalized"
            );
        }

        Ok(records)
    }

    pub fn normalize_business(&self, table: &SourceTable) -> Result<Vec<BusinessRecord>, SchemaError> {
        table.check_shape()?;
        let index = ColumnIndex::build(table, &self.business)?;

        let date = index.require(DATE)?;
        let revenue = index.require(TOTAL_REVENUE)?;
        let profit = index.require(GROSS_PROFIT)?;
        let orders = index.require(ORDER_COUNT)?;
        let customers = index.require(NEW_CUSTOMERS)?;

        table
            .rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let reader = RowReader {
                    table: &table.name,
                    row,
                    cells,
                };
                Ok(BusinessRecord {
                    date: reader.date(date, DATE)?,
                    total_revenue: reader.amount(revenue, TOTAL_REVENUE)?,
                    gross_profit: reader.amount(profit, GROSS_PROFIT)?,
                    order_count: reader.amount(orders, ORDER_COUNT)?,
                    new_customers: reader.amount(customers, NEW_CUSTOMERS)?,
                })
            })
            .collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(RenameTable::marketing(), RenameTable::business())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
