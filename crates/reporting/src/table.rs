//! In-memory tabular interchange shapes: raw source tables coming in from a
//! loader, and column/cell views of the pipeline's output records going out.

use adspend_core::types::{
    AnnotatedBusinessRecord, AnnotatedMarketingRecord, CombinedRecord, DailyChannelSummary,
};
use adspend_core::{Channel, SchemaError};

/// A named table of untyped string cells as supplied by a loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Builder-style helper, mostly for tests and fixtures.
    pub fn with_row<S: ToString>(mut self, cells: &[S]) -> Self {
        self.rows.push(cells.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows must be rectangular against the header.
    pub fn check_shape(&self) -> Result<(), SchemaError> {
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(SchemaError::RaggedRow {
                    table: self.name.clone(),
                    row: i,
                    expected: self.columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(())
    }
}

/// A record type that can be laid out as a flat table row.
pub trait Tabular {
    fn headers() -> Vec<String>;
    fn cells(&self) -> Vec<String>;
}

const VOLUME_METRICS: [&str; 4] = ["impressions", "clicks", "spend", "attributed_revenue"];
const RATIO_METRICS: [&str; 4] = ["ctr", "cpc", "cpm", "roas"];

fn num(value: f64) -> String {
    value.to_string()
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Tabular for AnnotatedBusinessRecord {
    fn headers() -> Vec<String> {
        strings(&[
            "date",
            "total_revenue",
            "gross_profit",
            "order_count",
            "new_customers",
            "gross_margin",
            "aov",
        ])
    }

    fn cells(&self) -> Vec<String> {
        let r = &self.record;
        vec![
            r.date.to_string(),
            num(r.total_revenue),
            num(r.gross_profit),
            num(r.order_count),
            num(r.new_customers),
            num(self.gross_margin),
            num(self.aov),
        ]
    }
}

impl Tabular for AnnotatedMarketingRecord {
    fn headers() -> Vec<String> {
        let mut headers = strings(&["date", "channel", "campaign", "tactic", "state"]);
        headers.extend(strings(&VOLUME_METRICS));
        headers.extend(strings(&RATIO_METRICS));
        headers
    }

    fn cells(&self) -> Vec<String> {
        let r = &self.record;
        vec![
            r.date.to_string(),
            r.channel.to_string(),
            r.campaign.clone(),
            r.tactic.clone(),
            r.state.clone(),
            num(r.volume.impressions),
            num(r.volume.clicks),
            num(r.volume.spend),
            num(r.volume.attributed_revenue),
            num(self.ratios.ctr),
            num(self.ratios.cpc),
            num(self.ratios.cpm),
            num(self.ratios.roas),
        ]
    }
}

impl Tabular for DailyChannelSummary {
    fn headers() -> Vec<String> {
        let mut headers = strings(&["date", "channel"]);
        headers.extend(strings(&VOLUME_METRICS));
        headers.extend(strings(&RATIO_METRICS));
        headers
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            self.channel.to_string(),
            num(self.volume.impressions),
            num(self.volume.clicks),
            num(self.volume.spend),
            num(self.volume.attributed_revenue),
            num(self.ratios.ctr),
            num(self.ratios.cpc),
            num(self.ratios.cpm),
            num(self.ratios.roas),
        ]
    }
}

impl Tabular for CombinedRecord {
    fn headers() -> Vec<String> {
        let mut headers = <AnnotatedBusinessRecord as Tabular>::headers();
        for channel in Channel::ALL {
            for metric in VOLUME_METRICS.iter().chain(RATIO_METRICS.iter()) {
                headers.push(channel.column(metric));
            }
        }
        for channel in Channel::ALL {
            headers.push(channel.column("cac"));
        }
        headers.extend(strings(&[
            "total_spend",
            "total_attributed_revenue",
            "total_roas",
            "total_cac",
        ]));
        headers
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.date.to_string(),
            num(self.total_revenue),
            num(self.gross_profit),
            num(self.order_count),
            num(self.new_customers),
            num(self.gross_margin),
            num(self.aov),
        ];
        for perf in &self.channels {
            cells.extend([
                num(perf.volume.impressions),
                num(perf.volume.clicks),
                num(perf.volume.spend),
                num(perf.volume.attributed_revenue),
                num(perf.ratios.ctr),
                num(perf.ratios.cpc),
                num(perf.ratios.cpm),
                num(perf.ratios.roas),
            ]);
        }
        for perf in &self.channels {
            cells.push(num(perf.cac));
        }
        cells.extend([
            num(self.total_spend),
            num(self.total_attributed_revenue),
            num(self.total_roas),
            num(self.total_cac),
        ]);
        cells
    }
}
