//! Client-side reports: resolving periods, bucketing transactions and comparing against the
//! previous period.

mod aggregate;
mod category;
pub mod period;

pub use aggregate::{
    aggregate, build_report, summarize, total, KindFilter, Report, ReportBucket, Summary, Trend,
};
pub use category::{category_breakdown, CategoryReport, CategoryShare};
pub use period::{resolve, BucketSpec, DateRange, IsoWeekId, Period, Resolved};
