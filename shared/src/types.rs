//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Grouping granularity for time-series reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    Day,
    Week,
    Month,
}

impl ReportPeriod {
    /// `to_char` format string for grouping timestamps in PostgreSQL
    pub fn date_format(&self) -> &'static str {
        match self {
            ReportPeriod::Day => "YYYY-MM-DD",
            ReportPeriod::Week => "IYYY-\"W\"IW",
            ReportPeriod::Month => "YYYY-MM",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_formats() {
        assert_eq!(ReportPeriod::Day.date_format(), "YYYY-MM-DD");
        assert_eq!(ReportPeriod::Month.date_format(), "YYYY-MM");
        assert_eq!(ReportPeriod::default(), ReportPeriod::Day);
    }
}
