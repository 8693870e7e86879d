pub mod dividend;
pub mod score;

pub use dividend::{project_dividends, DividendProjection, YieldSource};
pub use score::FundamentalAnalysisEngine;
