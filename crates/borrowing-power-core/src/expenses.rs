//! Household benchmark-expense resolver.
//!
//! Resolves a minimum living-expense floor indexed by region, household
//! composition and income band, then takes the higher of the declared figure
//! and the benchmark. Unknown keys fall back through a documented chain
//! rather than erroring.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

pub const WEEKS_PER_YEAR: Decimal = dec!(52);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaritalStatus {
    Single,
    Couple,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseParams {
    pub postcode: u32,
    pub gross_annual_income: Money,
    pub marital_status: MaritalStatus,
    pub dependents: u32,
}

/// The resolved benchmark plus the lookup keys that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkExpenses {
    pub weekly: Money,
    pub annual: Money,
    pub region: u8,
    pub income_band: u8,
}

/// Outcome of `higher_of_declared_or_benchmark`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseDecision {
    /// The annual figure serviceability will use.
    pub annual: Money,
    pub benchmark_annual: Money,
    /// True when the benchmark overrode the declared figure. Equality
    /// favours the declared figure (flag stays false); that is policy.
    pub benchmark_used: bool,
}

// ---------------------------------------------------------------------------
// Region and income-band mapping
// ---------------------------------------------------------------------------

pub const REGION_METRO: u8 = 1;
pub const REGION_REGIONAL: u8 = 2;
pub const REGION_REMOTE: u8 = 3;

/// Postcode ranges → region id. Anything unlisted resolves to metropolitan.
const POSTCODE_REGIONS: &[(u32, u32, u8)] = &[
    (2000, 2249, REGION_METRO),
    (2250, 2549, REGION_REGIONAL),
    (2550, 2599, REGION_METRO),
    (2600, 2739, REGION_REGIONAL),
    (2740, 2786, REGION_METRO),
    (2787, 2898, REGION_REMOTE),
    (3000, 3211, REGION_METRO),
    (3212, 3699, REGION_REGIONAL),
    (3700, 3999, REGION_REMOTE),
    (4000, 4207, REGION_METRO),
    (4208, 4699, REGION_REGIONAL),
    (4700, 4999, REGION_REMOTE),
];

pub fn region_for_postcode(postcode: u32) -> u8 {
    POSTCODE_REGIONS
        .iter()
        .find(|(lo, hi, _)| postcode >= *lo && postcode <= *hi)
        .map(|(_, _, region)| *region)
        .unwrap_or(REGION_METRO)
}

/// Upper bounds of income bands 1..=13; band 14 is unbounded above. Band 1
/// absorbs zero and negative incomes.
const INCOME_BAND_UPPER: &[Decimal] = &[
    dec!(15_600),
    dec!(20_800),
    dec!(26_000),
    dec!(31_200),
    dec!(41_600),
    dec!(52_000),
    dec!(62_400),
    dec!(72_800),
    dec!(83_200),
    dec!(103_900),
    dec!(129_800),
    dec!(155_800),
    dec!(181_700),
];

pub fn income_band(gross_annual_income: Rate) -> u8 {
    for (i, upper) in INCOME_BAND_UPPER.iter().enumerate() {
        if gross_annual_income <= *upper {
            return (i + 1) as u8;
        }
    }
    14
}

// ---------------------------------------------------------------------------
// Benchmark table (versioned lookup data)
// ---------------------------------------------------------------------------

struct HemEntry {
    region: u8,
    marital: MaritalStatus,
    dependents: u32,
    /// (income band, weekly benchmark) pairs, sorted by band, possibly sparse.
    weekly_by_band: &'static [(u8, Decimal)],
}

#[rustfmt::skip]
const HEM_TABLE: &[HemEntry] = &[
    HemEntry { region: REGION_METRO, marital: MaritalStatus::Single, dependents: 0, weekly_by_band: &[
        (1, dec!(287)), (2, dec!(306)), (3, dec!(326)), (4, dec!(347)), (5, dec!(369)), (6, dec!(393)), (7, dec!(419)),
        (8, dec!(446)), (9, dec!(475)), (10, dec!(506)), (11, dec!(539)), (12, dec!(574)), (13, dec!(611)), (14, dec!(651)),
    ]},
    HemEntry { region: REGION_METRO, marital: MaritalStatus::Single, dependents: 1, weekly_by_band: &[
        (1, dec!(440)), (2, dec!(469)), (3, dec!(499)), (4, dec!(531)), (5, dec!(566)), (6, dec!(603)), (7, dec!(642)),
        (8, dec!(684)), (9, dec!(728)), (10, dec!(776)), (11, dec!(826)), (12, dec!(880)), (13, dec!(937)), (14, dec!(998)),
    ]},
    HemEntry { region: REGION_METRO, marital: MaritalStatus::Single, dependents: 2, weekly_by_band: &[
        (1, dec!(593)), (2, dec!(632)), (3, dec!(673)), (4, dec!(716)), (5, dec!(763)), (6, dec!(812)), (7, dec!(865)),
        (8, dec!(922)), (9, dec!(981)), (10, dec!(1045)), (11, dec!(1113)), (12, dec!(1185)), (13, dec!(1263)), (14, dec!(1345)),
    ]},
    HemEntry { region: REGION_METRO, marital: MaritalStatus::Single, dependents: 3, weekly_by_band: &[
        (1, dec!(746)), (2, dec!(794)), (3, dec!(846)), (4, dec!(901)), (5, dec!(960)), (6, dec!(1022)), (7, dec!(1089)),
        (8, dec!(1159)), (9, dec!(1235)), (10, dec!(1315)), (11, dec!(1400)), (12, dec!(1491)), (13, dec!(1588)), (14, dec!(1692)),
    ]},
    HemEntry { region: REGION_METRO, marital: MaritalStatus::Couple, dependents: 0, weekly_by_band: &[
        (1, dec!(521)), (2, dec!(555)), (3, dec!(591)), (4, dec!(629)), (5, dec!(670)), (6, dec!(714)), (7, dec!(760)),
        (8, dec!(810)), (9, dec!(862)), (10, dec!(918)), (11, dec!(978)), (12, dec!(1042)), (13, dec!(1109)), (14, dec!(1181)),
    ]},
    HemEntry { region: REGION_METRO, marital: MaritalStatus::Couple, dependents: 1, weekly_by_band: &[
        (1, dec!(660)), (2, dec!(703)), (3, dec!(749)), (4, dec!(797)), (5, dec!(849)), (6, dec!(904)), (7, dec!(963)),
        (8, dec!(1026)), (9, dec!(1092)), (10, dec!(1163)), (11, dec!(1239)), (12, dec!(1319)), (13, dec!(1405)), (14, dec!(1497)),
    ]},
    HemEntry { region: REGION_METRO, marital: MaritalStatus::Couple, dependents: 2, weekly_by_band: &[
        (1, dec!(799)), (2, dec!(851)), (3, dec!(906)), (4, dec!(965)), (5, dec!(1028)), (6, dec!(1095)), (7, dec!(1166)),
        (8, dec!(1242)), (9, dec!(1322)), (10, dec!(1408)), (11, dec!(1500)), (12, dec!(1597)), (13, dec!(1701)), (14, dec!(1812)),
    ]},
    HemEntry { region: REGION_METRO, marital: MaritalStatus::Couple, dependents: 3, weekly_by_band: &[
        (1, dec!(938)), (2, dec!(999)), (3, dec!(1064)), (4, dec!(1133)), (5, dec!(1207)), (6, dec!(1285)), (7, dec!(1369)),
        (8, dec!(1458)), (9, dec!(1552)), (10, dec!(1653)), (11, dec!(1761)), (12, dec!(1875)), (13, dec!(1997)), (14, dec!(2127)),
    ]},
    // Regional survey data only covers alternating bands.
    HemEntry { region: REGION_REGIONAL, marital: MaritalStatus::Single, dependents: 0, weekly_by_band: &[
        (2, dec!(281)), (4, dec!(319)), (6, dec!(362)), (8, dec!(410)), (10, dec!(465)), (12, dec!(528)), (14, dec!(599)),
    ]},
    HemEntry { region: REGION_REGIONAL, marital: MaritalStatus::Single, dependents: 1, weekly_by_band: &[
        (2, dec!(431)), (4, dec!(489)), (6, dec!(555)), (8, dec!(629)), (10, dec!(714)), (12, dec!(810)), (14, dec!(918)),
    ]},
    HemEntry { region: REGION_REGIONAL, marital: MaritalStatus::Single, dependents: 2, weekly_by_band: &[
        (2, dec!(581)), (4, dec!(660)), (6, dec!(748)), (8, dec!(848)), (10, dec!(962)), (12, dec!(1092)), (14, dec!(1238)),
    ]},
    HemEntry { region: REGION_REGIONAL, marital: MaritalStatus::Single, dependents: 3, weekly_by_band: &[
        (2, dec!(732)), (4, dec!(830)), (6, dec!(941)), (8, dec!(1068)), (10, dec!(1211)), (12, dec!(1373)), (14, dec!(1558)),
    ]},
    HemEntry { region: REGION_REGIONAL, marital: MaritalStatus::Couple, dependents: 0, weekly_by_band: &[
        (2, dec!(510)), (4, dec!(579)), (6, dec!(656)), (8, dec!(744)), (10, dec!(844)), (12, dec!(958)), (14, dec!(1086)),
    ]},
    HemEntry { region: REGION_REGIONAL, marital: MaritalStatus::Couple, dependents: 1, weekly_by_band: &[
        (2, dec!(646)), (4, dec!(733)), (6, dec!(832)), (8, dec!(943)), (10, dec!(1070)), (12, dec!(1213)), (14, dec!(1376)),
    ]},
    HemEntry { region: REGION_REGIONAL, marital: MaritalStatus::Couple, dependents: 2, weekly_by_band: &[
        (2, dec!(783)), (4, dec!(888)), (6, dec!(1007)), (8, dec!(1142)), (10, dec!(1295)), (12, dec!(1469)), (14, dec!(1667)),
    ]},
    HemEntry { region: REGION_REGIONAL, marital: MaritalStatus::Couple, dependents: 3, weekly_by_band: &[
        (2, dec!(919)), (4, dec!(1042)), (6, dec!(1182)), (8, dec!(1341)), (10, dec!(1521)), (12, dec!(1725)), (14, dec!(1957)),
    ]},
    // Remote survey data only covers dependent-free households.
    HemEntry { region: REGION_REMOTE, marital: MaritalStatus::Single, dependents: 0, weekly_by_band: &[
        (1, dec!(253)), (2, dec!(269)), (3, dec!(287)), (4, dec!(306)), (5, dec!(325)), (6, dec!(347)), (7, dec!(369)),
        (8, dec!(393)), (9, dec!(419)), (10, dec!(446)), (11, dec!(475)), (12, dec!(506)), (13, dec!(539)), (14, dec!(574)),
    ]},
    HemEntry { region: REGION_REMOTE, marital: MaritalStatus::Couple, dependents: 0, weekly_by_band: &[
        (1, dec!(458)), (2, dec!(488)), (3, dec!(519)), (4, dec!(553)), (5, dec!(589)), (6, dec!(627)), (7, dec!(668)),
        (8, dec!(712)), (9, dec!(758)), (10, dec!(807)), (11, dec!(860)), (12, dec!(916)), (13, dec!(975)), (14, dec!(1039)),
    ]},
];

/// Last-resort weekly baselines when even the metropolitan table misses.
const DEFAULT_SINGLE_WEEKLY: Decimal = dec!(437);
const DEFAULT_COUPLE_WEEKLY: Decimal = dec!(795);

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

fn find_entry(region: u8, marital: MaritalStatus, dependents: u32) -> Option<&'static HemEntry> {
    HEM_TABLE
        .iter()
        .find(|e| e.region == region && e.marital == marital && e.dependents == dependents)
}

/// Exact band if present, else the nearest covered band at or below the
/// requested one, else the lowest band the entry covers.
fn weekly_from_entry(entry: &HemEntry, band: u8) -> Money {
    if let Some((_, weekly)) = entry.weekly_by_band.iter().find(|(b, _)| *b == band) {
        return *weekly;
    }
    entry
        .weekly_by_band
        .iter()
        .filter(|(b, _)| *b <= band)
        .last()
        .or_else(|| entry.weekly_by_band.first())
        .map(|(_, weekly)| *weekly)
        .unwrap_or(match entry.marital {
            MaritalStatus::Single => DEFAULT_SINGLE_WEEKLY,
            MaritalStatus::Couple => DEFAULT_COUPLE_WEEKLY,
        })
}

/// Resolve the weekly/annual benchmark for a household. Fallback chain on a
/// missing `(region, marital, dependents)` entry: metropolitan with the same
/// keys, then the hard-coded default pair.
pub fn benchmark_expenses(params: &ExpenseParams) -> BenchmarkExpenses {
    let region = region_for_postcode(params.postcode);
    let band = income_band(params.gross_annual_income);
    let dependents = params.dependents.min(3);

    let weekly = match find_entry(region, params.marital_status, dependents)
        .or_else(|| find_entry(REGION_METRO, params.marital_status, dependents))
    {
        Some(entry) => weekly_from_entry(entry, band),
        None => match params.marital_status {
            MaritalStatus::Single => DEFAULT_SINGLE_WEEKLY,
            MaritalStatus::Couple => DEFAULT_COUPLE_WEEKLY,
        },
    };

    BenchmarkExpenses {
        weekly,
        annual: weekly * WEEKS_PER_YEAR,
        region,
        income_band: band,
    }
}

/// The expense floor serviceability uses: the larger of declared annual
/// expenses and the benchmark annual value.
pub fn higher_of_declared_or_benchmark(
    declared_annual: Money,
    params: &ExpenseParams,
) -> ExpenseDecision {
    let benchmark = benchmark_expenses(params);
    let benchmark_used = benchmark.annual > declared_annual;
    ExpenseDecision {
        annual: if benchmark_used {
            benchmark.annual
        } else {
            declared_annual
        },
        benchmark_annual: benchmark.annual,
        benchmark_used,
    }
}
