//! End-to-end batch transform: normalize → derive metrics → aggregate →
//! pivot → combine.

use adspend_core::types::{
    AnnotatedBusinessRecord, AnnotatedMarketingRecord, CombinedRecord, DailyChannelSummary,
};
use adspend_core::{Channel, PipelineResult};
use tracing::{info, warn};

use crate::aggregate::aggregate_daily;
use crate::combine::combine;
use crate::efficiency::{derive_business_metrics, derive_marketing_metrics};
use crate::normalize::{MarketingSource, Normalizer};
use crate::pivot::MarketingPivot;
use crate::table::{SourceTable, Tabular};

/// The two raw inputs of a run.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub business: SourceTable,
    pub marketing: Vec<MarketingSource>,
}

/// Every artifact of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub business: Vec<AnnotatedBusinessRecord>,
    pub marketing: Vec<AnnotatedMarketingRecord>,
    pub combined: Vec<CombinedRecord>,
    pub daily: Vec<DailyChannelSummary>,
}

impl PipelineOutput {
    /// (rows, columns) of the combined table.
    pub fn combined_shape(&self) -> (usize, usize) {
        (self.combined.len(), CombinedRecord::headers().len())
    }

    /// (rows, columns) of the daily channel table.
    pub fn daily_shape(&self) -> (usize, usize) {
        (self.daily.len(), DailyChannelSummary::headers().len())
    }
}

/// Stateless pipeline; the same input always yields the same output.
#[derive(Debug, Clone, Default)]
pub struct MarketingPipeline {
    normalizer: Normalizer,
}

impl MarketingPipeline {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    /// Run every stage. Fails fast; on error nothing is returned.
    pub fn run(&self, input: &PipelineInput) -> PipelineResult<PipelineOutput> {
        ::metrics::counter!("pipeline.runs").increment(1);
        let result = self.run_stages(input);
        if let Err(e) = &result {
            ::metrics::counter!("pipeline.failures").increment(1);
            warn!(error = %e, "Pipeline run failed");
        }
        result
    }

    fn run_stages(&self, input: &PipelineInput) -> PipelineResult<PipelineOutput> {
        let business = self.normalizer.normalize_business(&input.business)?;
        let marketing = self.normalizer.normalize_marketing(&input.marketing)?;
        info!(
            business_records = business.len(),
            marketing_records = marketing.len(),
            "Loaded source tables"
        );
        ::metrics::counter!("pipeline.business_rows").increment(business.len() as u64);
        for channel in Channel::ALL {
            let rows = marketing.iter().filter(|r| r.channel == channel).count();
            ::metrics::counter!("pipeline.marketing_rows", "channel" => channel.as_str())
                .increment(rows as u64);
        }

        let marketing = derive_marketing_metrics(marketing);
        let business = derive_business_metrics(business);

        let daily = aggregate_daily(&marketing);
        let pivot = MarketingPivot::build(&daily)?;
        for channel in Channel::ALL {
            if !pivot.has_channel(channel) {
                info!(channel = %channel, "No activity for channel, columns zero-filled");
            }
        }

        let combined = combine(&business, &pivot)?;
        ::metrics::counter!("pipeline.combined_rows").increment(combined.len() as u64);

        let output = PipelineOutput {
            business,
            marketing,
            combined,
            daily,
        };
        let (rows, columns) = output.combined_shape();
        info!(
            combined_rows = rows,
            combined_columns = columns,
            daily_rows = output.daily.len(),
            "Pipeline run completed"
        );
        Ok(output)
    }
}
