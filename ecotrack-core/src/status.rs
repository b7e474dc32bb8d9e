//! Fill-level tiers and the counters derived from them.

use std::fmt;

use crate::model::{Bin, BinType};

/// Lowest fill level classified as [`BinStatus::Warning`].
pub const WARNING_THRESHOLD: u8 = 50;
/// Lowest fill level classified as [`BinStatus::Critical`].
pub const CRITICAL_THRESHOLD: u8 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Discrete status tier of a bin.
pub enum BinStatus {
    /// Below half full.
    Normal,
    /// Filling up, collect soon.
    Warning,
    /// About to overflow.
    Critical,
}

impl fmt::Display for BinStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BinStatus::Normal => "Normal",
            BinStatus::Warning => "Warning",
            BinStatus::Critical => "Critical",
        };
        formatter.write_str(label)
    }
}

/// Map a fill level to its status tier.
#[must_use]
pub const fn classify(fill_level: u8) -> BinStatus {
    if fill_level >= CRITICAL_THRESHOLD {
        BinStatus::Critical
    } else if fill_level >= WARNING_THRESHOLD {
        BinStatus::Warning
    } else {
        BinStatus::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Headline counters for the dashboard.
pub struct DashboardStats {
    /// Number of tracked bins.
    pub total_bins: usize,
    /// Bins classified as critical.
    pub critical_bins: usize,
    /// Bins classified as warning.
    pub warning_bins: usize,
    /// Mean fill level rounded to the nearest percent, 0 without bins.
    pub average_fill: u8,
}

impl DashboardStats {
    /// Compute counters for the given bins.
    #[must_use]
    pub fn from_bins(bins: &[Bin]) -> Self {
        let count_tier = |tier: BinStatus| {
            bins.iter()
                .filter(|bin| classify(bin.fill_level) == tier)
                .count()
        };

        let total: u32 = bins.iter().map(|bin| u32::from(bin.fill_level)).sum();
        let average_fill = u32::try_from(bins.len())
            .ok()
            .filter(|len| *len > 0)
            .map_or(0, |len| (total + len / 2) / len);

        Self {
            total_bins: bins.len(),
            critical_bins: count_tier(BinStatus::Critical),
            warning_bins: count_tier(BinStatus::Warning),
            average_fill: u8::try_from(average_fill).unwrap_or(u8::MAX),
        }
    }
}

/// Number of bins per type, in [`BinType::ALL`] order.
#[must_use]
pub fn type_distribution(bins: &[Bin]) -> Vec<(BinType, usize)> {
    BinType::ALL
        .into_iter()
        .map(|kind| (kind, bins.iter().filter(|bin| bin.kind == kind).count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::fixture::initial_bins;

    #[rstest]
    #[case(0, BinStatus::Normal)]
    #[case(49, BinStatus::Normal)]
    #[case(50, BinStatus::Warning)]
    #[case(79, BinStatus::Warning)]
    #[case(80, BinStatus::Critical)]
    #[case(100, BinStatus::Critical)]
    fn classify_boundaries(#[case] level: u8, #[case] expected: BinStatus) {
        assert_eq!(classify(level), expected);
    }

    #[test]
    fn fixture_stats() {
        let stats = DashboardStats::from_bins(&initial_bins());
        assert_eq!(stats.total_bins, 8);
        // 85, 92, 95
        assert_eq!(stats.critical_bins, 3);
        // 60, 78
        assert_eq!(stats.warning_bins, 2);
        // 497 / 8 = 62.125
        assert_eq!(stats.average_fill, 62);
    }

    #[test]
    fn stats_without_bins() {
        assert_eq!(DashboardStats::from_bins(&[]), DashboardStats::default());
    }

    #[test]
    fn fixture_type_distribution() {
        assert_eq!(
            type_distribution(&initial_bins()),
            vec![
                (BinType::General, 4),
                (BinType::Recycle, 2),
                (BinType::Organic, 2),
            ]
        );
    }
}
