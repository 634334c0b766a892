//! Deal-size margin bands.
//!
//! A band is a contiguous `[min_total, max_total)` range of total base cost
//! with an associated margin policy (min/target/max). A validated table
//! partitions the non-negative cost axis: it starts at $0, has no gaps or
//! overlaps, and its last band is unbounded. Resolution prefers the band
//! with the largest `min_total <= cost` whose upper bound is either open or
//! strictly above the cost.

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};
use crate::thresholds::MAX_MARGIN;

/// One deal-size range and its margin policy. Admin-edited reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginBand {
    /// Stable identifier, e.g. "small", "mid", "utility".
    pub id: String,
    /// Inclusive lower bound on total base cost.
    pub min_total: f64,
    /// Exclusive upper bound; `None` means unbounded.
    pub max_total: Option<f64>,
    /// Lowest margin the band permits.
    pub margin_min: f64,
    /// Highest margin the band permits.
    pub margin_max: f64,
    /// Margin the adjustment chain starts from.
    pub margin_target: f64,
    #[serde(default)]
    pub description: String,
}

impl MarginBand {
    /// Does this band's `[min_total, max_total)` interval contain `cost`?
    pub fn contains(&self, cost: f64) -> bool {
        cost >= self.min_total && self.max_total.map_or(true, |max| cost < max)
    }

    fn validate(&self) -> PolicyResult<()> {
        if !self.min_total.is_finite() || self.min_total < 0.0 {
            return Err(PolicyError::InvalidBandBounds {
                id: self.id.clone(),
                min: self.min_total,
                max: self.max_total,
            });
        }
        if let Some(max) = self.max_total {
            if !max.is_finite() || max <= self.min_total {
                return Err(PolicyError::InvalidBandBounds {
                    id: self.id.clone(),
                    min: self.min_total,
                    max: self.max_total,
                });
            }
        }
        for (label, value) in [
            ("margin_min", self.margin_min),
            ("margin_max", self.margin_max),
            ("margin_target", self.margin_target),
        ] {
            if !value.is_finite() || value < 0.0 || value >= MAX_MARGIN {
                return Err(PolicyError::InvalidMargin {
                    context: format!("band '{}' {}", self.id, label),
                    value,
                });
            }
        }
        if !(self.margin_min <= self.margin_target && self.margin_target <= self.margin_max) {
            return Err(PolicyError::MarginOutOfOrder {
                id: self.id.clone(),
                min: self.margin_min,
                target: self.margin_target,
                max: self.margin_max,
            });
        }
        Ok(())
    }
}

/// The full set of configured bands, kept sorted by `min_total`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BandTable {
    pub bands: Vec<MarginBand>,
}

impl BandTable {
    /// Build a table from unordered bands, sorting and validating the
    /// partition invariant.
    pub fn from_bands(mut bands: Vec<MarginBand>) -> PolicyResult<Self> {
        bands.sort_by(|a, b| {
            a.min_total
                .partial_cmp(&b.min_total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let table = Self { bands };
        table.validate()?;
        Ok(table)
    }

    /// Check the partition invariant: coverage of `[0, inf)` with no gaps
    /// or overlaps, per-band margin ordering, final band unbounded.
    pub fn validate(&self) -> PolicyResult<()> {
        if self.bands.is_empty() {
            return Err(PolicyError::EmptyBandTable);
        }
        for band in &self.bands {
            band.validate()?;
        }

        let first = &self.bands[0];
        if first.min_total != 0.0 {
            return Err(PolicyError::BandTableStartsAbove {
                id: first.id.clone(),
                start: first.min_total,
            });
        }

        for pair in self.bands.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            match prev.max_total {
                None => {
                    // An unbounded band followed by anything overlaps it.
                    return Err(PolicyError::BandOverlap {
                        prev: prev.id.clone(),
                        next: next.id.clone(),
                        at: next.min_total,
                    });
                }
                Some(end) if end < next.min_total => {
                    return Err(PolicyError::BandGap {
                        prev: prev.id.clone(),
                        end,
                        next: next.id.clone(),
                        start: next.min_total,
                    });
                }
                Some(end) if end > next.min_total => {
                    return Err(PolicyError::BandOverlap {
                        prev: prev.id.clone(),
                        next: next.id.clone(),
                        at: next.min_total,
                    });
                }
                Some(_) => {}
            }
        }

        if let Some(last) = self.bands.last() {
            if let Some(end) = last.max_total {
                return Err(PolicyError::NoUnboundedTopBand {
                    id: last.id.clone(),
                    end,
                });
            }
        }
        Ok(())
    }

    /// Resolve the band containing `total_base_cost`.
    ///
    /// Negative or non-finite costs are rejected as validation errors
    /// before any lookup. A gap (only reachable on an unvalidated table)
    /// is a configuration error and aborts the computation, never a
    /// silent default.
    pub fn resolve(&self, total_base_cost: f64) -> PolicyResult<&MarginBand> {
        if !total_base_cost.is_finite() || total_base_cost < 0.0 {
            return Err(PolicyError::InvalidCost(total_base_cost));
        }
        if self.bands.is_empty() {
            return Err(PolicyError::EmptyBandTable);
        }
        self.bands
            .iter()
            .filter(|b| b.contains(total_base_cost))
            .max_by(|a, b| {
                a.min_total
                    .partial_cmp(&b.min_total)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or(PolicyError::NoMatchingBand(total_base_cost))
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MarginBand> {
        self.bands.iter().find(|b| b.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(id: &str, min: f64, max: Option<f64>, lo: f64, target: f64, hi: f64) -> MarginBand {
        MarginBand {
            id: id.into(),
            min_total: min,
            max_total: max,
            margin_min: lo,
            margin_max: hi,
            margin_target: target,
            description: String::new(),
        }
    }

    fn standard_table() -> BandTable {
        BandTable::from_bands(vec![
            band("small", 0.0, Some(1_000_000.0), 0.15, 0.18, 0.20),
            band("mid", 1_000_000.0, Some(5_000_000.0), 0.12, 0.14, 0.17),
            band("utility", 5_000_000.0, None, 0.08, 0.10, 0.14),
        ])
        .unwrap()
    }

    #[test]
    fn resolves_spec_example_cost() {
        let table = standard_table();
        let b = table.resolve(750_000.0).unwrap();
        assert_eq!(b.id, "small");
        assert!((b.margin_target - 0.18).abs() < 1e-12);
    }

    #[test]
    fn boundary_cost_belongs_to_upper_band() {
        let table = standard_table();
        assert_eq!(table.resolve(1_000_000.0).unwrap().id, "mid");
        assert_eq!(table.resolve(999_999.99).unwrap().id, "small");
    }

    #[test]
    fn zero_cost_matches_first_band() {
        let table = standard_table();
        assert_eq!(table.resolve(0.0).unwrap().id, "small");
    }

    #[test]
    fn huge_cost_matches_unbounded_band() {
        let table = standard_table();
        assert_eq!(table.resolve(2.5e9).unwrap().id, "utility");
    }

    #[test]
    fn negative_cost_rejected_as_validation() {
        let table = standard_table();
        let err = table.resolve(-5.0).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn nan_cost_rejected() {
        let table = standard_table();
        assert!(table.resolve(f64::NAN).is_err());
    }

    #[test]
    fn gap_detected_at_build_time() {
        let err = BandTable::from_bands(vec![
            band("small", 0.0, Some(1_000_000.0), 0.15, 0.18, 0.20),
            band("large", 1_500_000.0, None, 0.08, 0.10, 0.14),
        ])
        .unwrap_err();
        assert!(matches!(err, PolicyError::BandGap { .. }));
    }

    #[test]
    fn overlap_detected_at_build_time() {
        let err = BandTable::from_bands(vec![
            band("small", 0.0, Some(1_000_000.0), 0.15, 0.18, 0.20),
            band("large", 900_000.0, None, 0.08, 0.10, 0.14),
        ])
        .unwrap_err();
        assert!(matches!(err, PolicyError::BandOverlap { .. }));
    }

    #[test]
    fn table_must_start_at_zero() {
        let err = BandTable::from_bands(vec![band("small", 100.0, None, 0.15, 0.18, 0.20)])
            .unwrap_err();
        assert!(matches!(err, PolicyError::BandTableStartsAbove { .. }));
    }

    #[test]
    fn top_band_must_be_unbounded() {
        let err = BandTable::from_bands(vec![band(
            "only",
            0.0,
            Some(1_000_000.0),
            0.15,
            0.18,
            0.20,
        )])
        .unwrap_err();
        assert!(matches!(err, PolicyError::NoUnboundedTopBand { .. }));
    }

    #[test]
    fn target_outside_min_max_rejected() {
        let err = BandTable::from_bands(vec![band("bad", 0.0, None, 0.15, 0.25, 0.20)])
            .unwrap_err();
        assert!(matches!(err, PolicyError::MarginOutOfOrder { .. }));
    }

    #[test]
    fn margin_above_cap_rejected() {
        let err =
            BandTable::from_bands(vec![band("bad", 0.0, None, 0.15, 0.18, 0.97)]).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidMargin { .. }));
    }

    #[test]
    fn empty_table_rejected() {
        assert!(matches!(
            BandTable::from_bands(vec![]).unwrap_err(),
            PolicyError::EmptyBandTable
        ));
    }
}
