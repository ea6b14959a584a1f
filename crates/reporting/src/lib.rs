//! Marketing performance pipeline — schema normalization, efficiency
//! metrics, daily channel rollups, wide pivoting, and the business/marketing
//! join, plus reporting summaries over the results.

pub mod aggregate;
pub mod combine;
pub mod efficiency;
pub mod normalize;
pub mod pipeline;
pub mod pivot;
pub mod summary;
pub mod table;

pub use normalize::{MarketingSource, Normalizer, RenameTable};
pub use pipeline::{MarketingPipeline, PipelineInput, PipelineOutput};
pub use pivot::MarketingPivot;
pub use summary::{DateRange, RunSummary};
pub use table::{SourceTable, Tabular};
