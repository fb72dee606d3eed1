mod builder;
mod data;

pub use builder::{build_report, status_label, write_report_json};
pub use data::{ReportData, ReportPeriodRow, ReportPlan};
