//! CSV policy-table loader.
//!
//! Policy tables are admin-edited CSV files in one directory:
//!   bands.csv           id, min_total, max_total, margin_min, margin_max,
//!                       margin_target, description
//!   product_classes.csv product_class, margin_multiplier, is_additive,
//!                       fixed_adder
//!   risk_levels.csv     risk_level, margin_add_percent
//!   segments.csv        segment, margin_multiplier
//!   price_guards.csv    product_class, unit, region, floor_price,
//!                       ceiling_price, last_market_price
//!   unit_prices.csv     product_class, unit, min_size, max_size, unit_price
//!   VERSION             plain-text policy version tag
//!
//! Empty `max_total`/`max_size` fields mean unbounded; an empty `region`
//! means the guard applies everywhere. The loaded snapshot is validated as
//! a unit before it is returned; a broken table never reaches pricing.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use merlin_policy::adjust::{ProductClassPolicy, RiskAdjuster, SegmentAdjuster};
use merlin_policy::bands::{BandTable, MarginBand};
use merlin_policy::guards::{GuardTable, PriceGuard};
use merlin_policy::pricing::{PriceTierTable, UnitPriceTier};
use merlin_policy::snapshot::PolicySnapshot;
use merlin_policy::PolicyError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{file} parse error at line {line}: {detail}")]
    Csv {
        file: String,
        line: usize,
        detail: String,
    },

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// A product class row with a flexible `is_additive` column.
#[derive(Debug, Deserialize)]
struct ProductClassRecord {
    product_class: String,
    margin_multiplier: f64,
    #[serde(deserialize_with = "deserialize_bool")]
    is_additive: bool,
    #[serde(default)]
    fixed_adder: f64,
}

fn read_records<R: Read, T: for<'de> Deserialize<'de>>(
    reader: R,
    file: &str,
) -> Result<Vec<T>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let record: T = result.map_err(|e| LoadError::Csv {
            file: file.to_string(),
            line: line_num + 2,
            detail: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Load and validate the band table.
pub fn load_bands<R: Read>(reader: R) -> Result<BandTable, LoadError> {
    let bands: Vec<MarginBand> = read_records(reader, "bands.csv")?;
    Ok(BandTable::from_bands(bands)?)
}

pub fn load_product_classes<R: Read>(reader: R) -> Result<Vec<ProductClassPolicy>, LoadError> {
    let records: Vec<ProductClassRecord> = read_records(reader, "product_classes.csv")?;
    Ok(records
        .into_iter()
        .map(|r| ProductClassPolicy {
            product_class: r.product_class,
            margin_multiplier: r.margin_multiplier,
            is_additive: r.is_additive,
            fixed_adder: r.fixed_adder,
        })
        .collect())
}

pub fn load_risk_levels<R: Read>(reader: R) -> Result<Vec<RiskAdjuster>, LoadError> {
    read_records(reader, "risk_levels.csv")
}

pub fn load_segments<R: Read>(reader: R) -> Result<Vec<SegmentAdjuster>, LoadError> {
    read_records(reader, "segments.csv")
}

pub fn load_price_guards<R: Read>(reader: R) -> Result<GuardTable, LoadError> {
    let guards: Vec<PriceGuard> = read_records(reader, "price_guards.csv")?;
    Ok(GuardTable { guards })
}

pub fn load_unit_prices<R: Read>(reader: R) -> Result<PriceTierTable, LoadError> {
    let tiers: Vec<UnitPriceTier> = read_records(reader, "unit_prices.csv")?;
    Ok(PriceTierTable { tiers })
}

fn open(dir: &Path, name: &str) -> Result<std::fs::File, LoadError> {
    let path = dir.join(name);
    std::fs::File::open(&path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load a full policy snapshot from a directory of CSV tables.
///
/// `price_guards.csv` and `unit_prices.csv` may be absent (their tables
/// load empty, with a logged note); the other tables are required. The
/// returned snapshot has passed whole-snapshot validation.
pub fn load_policy_dir(dir: &Path) -> Result<PolicySnapshot, LoadError> {
    let version = match std::fs::read_to_string(dir.join("VERSION")) {
        Ok(v) => v.trim().to_string(),
        Err(_) => {
            log::warn!("no VERSION file in {}; using 'unversioned'", dir.display());
            "unversioned".to_string()
        }
    };

    let bands = load_bands(open(dir, "bands.csv")?)?;
    let product_policies = load_product_classes(open(dir, "product_classes.csv")?)?;
    let risk_adjusters = load_risk_levels(open(dir, "risk_levels.csv")?)?;
    let segment_adjusters = load_segments(open(dir, "segments.csv")?)?;

    let guards = match open(dir, "price_guards.csv") {
        Ok(file) => load_price_guards(file)?,
        Err(_) => {
            log::warn!("no price_guards.csv in {}; clamping disabled", dir.display());
            GuardTable::default()
        }
    };
    let price_tiers = match open(dir, "unit_prices.csv") {
        Ok(file) => load_unit_prices(file)?,
        Err(_) => {
            log::warn!(
                "no unit_prices.csv in {}; base costs must be explicit",
                dir.display()
            );
            PriceTierTable::default()
        }
    };

    let snapshot = PolicySnapshot {
        version,
        bands,
        product_policies,
        risk_adjusters,
        segment_adjusters,
        guards,
        price_tiers,
    };
    snapshot.validate()?;
    Ok(snapshot)
}

/// Flexible bool deserializer: handles "true"/"false", "1"/"0", "yes"/"no".
fn deserialize_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.to_lowercase().trim() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected bool value, got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANDS_CSV: &str = "\
id,min_total,max_total,margin_min,margin_max,margin_target,description
small,0,1000000,0.15,0.20,0.18,Deals under $1M
mid,1000000,5000000,0.12,0.17,0.14,Mid-market deals
utility,5000000,,0.08,0.14,0.10,Utility-scale deals
";

    const PRODUCT_CSV: &str = "\
product_class,margin_multiplier,is_additive,fixed_adder
bess,1.0,false,0
solar,0.75,no,0
custom_integration,1.0,yes,0.05
";

    const GUARDS_CSV: &str = "\
product_class,unit,region,floor_price,ceiling_price,last_market_price
bess,kwh,,100,400,210
bess,kwh,caiso,120,400,
";

    const TIERS_CSV: &str = "\
product_class,unit,min_size,max_size,unit_price
bess,kwh,0,1000,320
bess,kwh,1000,,260
";

    #[test]
    fn loads_band_table_with_unbounded_top() {
        let table = load_bands(BANDS_CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.resolve(750_000.0).unwrap().id, "small");
        assert!(table.bands[2].max_total.is_none());
        assert_eq!(table.bands[0].description, "Deals under $1M");
    }

    #[test]
    fn bool_parsing_handles_variants() {
        let policies = load_product_classes(PRODUCT_CSV.as_bytes()).unwrap();
        assert!(!policies[0].is_additive);
        assert!(!policies[1].is_additive);
        assert!(policies[2].is_additive);
        assert_eq!(policies[2].fixed_adder, 0.05);
    }

    #[test]
    fn empty_region_means_everywhere() {
        let guards = load_price_guards(GUARDS_CSV.as_bytes()).unwrap();
        assert_eq!(guards.guards.len(), 2);
        assert!(guards.guards[0].region.is_none());
        assert_eq!(guards.guards[1].region.as_deref(), Some("caiso"));
        assert!(guards.guards[1].last_market_price.is_none());
    }

    #[test]
    fn empty_max_size_means_unbounded_tier() {
        let tiers = load_unit_prices(TIERS_CSV.as_bytes()).unwrap();
        assert_eq!(tiers.unit_price_for("bess", "kwh", 50_000.0).unwrap(), 260.0);
    }

    #[test]
    fn malformed_row_reports_file_and_line() {
        let bad = "\
id,min_total,max_total,margin_min,margin_max,margin_target,description
small,not-a-number,,0.15,0.20,0.18,oops
";
        let err = load_bands(bad.as_bytes()).unwrap_err();
        match err {
            LoadError::Csv { file, line, .. } => {
                assert_eq!(file, "bands.csv");
                assert_eq!(line, 2);
            }
            other => panic!("expected Csv error, got {other:?}"),
        }
    }

    #[test]
    fn band_gap_surfaces_as_policy_error() {
        let gapped = "\
id,min_total,max_total,margin_min,margin_max,margin_target,description
small,0,1000000,0.15,0.20,0.18,
large,2000000,,0.08,0.14,0.10,
";
        let err = load_bands(gapped.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Policy(PolicyError::BandGap { .. })
        ));
    }
}
