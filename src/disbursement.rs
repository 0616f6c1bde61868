// 🏦 SME Disbursement Data - Branch, monthly and status breakdowns
//
// Three views of the same loan book:
// - per branch (millions, display order = descending amount)
// - per calendar month (Jan 2025 onwards)
// - per employment status × marital status (4×4 matrix)

use chrono::{Datelike, Months, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lower bound (inclusive) of a mock status-matrix cell
pub const STATUS_AMOUNT_MIN: i64 = 150_000_000;

/// Upper bound (exclusive) of a mock status-matrix cell
pub const STATUS_AMOUNT_MAX: i64 = 250_000_000;

// ============================================================================
// BRANCH DISBURSEMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchDisbursement {
    pub branch_name: String,
    pub amount_millions: f64,
}

impl BranchDisbursement {
    pub fn new(branch_name: &str, amount_millions: f64) -> Self {
        BranchDisbursement {
            branch_name: branch_name.to_string(),
            amount_millions,
        }
    }

    /// Reference branch totals, already sorted descending ("Other (2)" aggregates two branches)
    pub fn reference() -> Vec<BranchDisbursement> {
        vec![
            BranchDisbursement::new("Matthewton", 456.5),
            BranchDisbursement::new("Meyerchester", 446.3),
            BranchDisbursement::new("Alexanderhaven", 445.4),
            BranchDisbursement::new("South", 415.4),
            BranchDisbursement::new("Hughesmouth", 404.9),
            BranchDisbursement::new("Lake", 284.3),
            BranchDisbursement::new("North", 252.9),
            BranchDisbursement::new("Jessicaville", 232.0),
            BranchDisbursement::new("Other (2)", 202.9),
        ]
    }
}

/// Sum of all branch amounts (millions), rounded to one decimal like the source figures
pub fn branch_total(branches: &[BranchDisbursement]) -> f64 {
    let total: f64 = branches.iter().map(|b| b.amount_millions).sum();
    (total * 10.0).round() / 10.0
}

/// Sort branches descending by amount (stable for equal amounts)
pub fn sort_descending(branches: &mut [BranchDisbursement]) {
    branches.sort_by(|a, b| {
        b.amount_millions
            .partial_cmp(&a.amount_millions)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

// ============================================================================
// MONTHLY SERIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDisbursement {
    /// First day of the calendar month
    pub month: NaiveDate,

    /// Display label, "Month YYYY"
    pub month_label: String,

    pub disbursed_amount: i64,
}

impl MonthlyDisbursement {
    pub fn new(month: NaiveDate, disbursed_amount: i64) -> Self {
        MonthlyDisbursement {
            month,
            month_label: month_label(month),
            disbursed_amount,
        }
    }
}

/// "January 2025" style label
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

const REFERENCE_MONTHLY_AMOUNTS: [i64; 11] = [
    90_000_000, 65_000_000, 55_000_000, 45_000_000, 52_000_000, 60_000_000,
    67_000_000, 72_000_000, 45_000_000, 35_000_000, 10_000_000,
];

/// Consecutive calendar months of disbursed amounts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlySeries {
    pub entries: Vec<MonthlyDisbursement>,
}

impl MonthlySeries {
    /// Build a series of consecutive months starting at `start` (normalized to the 1st)
    pub fn consecutive(start: NaiveDate, amounts: &[i64]) -> Self {
        let start = start.with_day(1).unwrap_or(start);
        let entries = amounts
            .iter()
            .enumerate()
            .filter_map(|(i, amount)| {
                start
                    .checked_add_months(Months::new(i as u32))
                    .map(|month| MonthlyDisbursement::new(month, *amount))
            })
            .collect();

        MonthlySeries { entries }
    }

    /// January 2025 through November 2025
    pub fn reference() -> Self {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .map(|start| MonthlySeries::consecutive(start, &REFERENCE_MONTHLY_AMOUNTS))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> i64 {
        self.entries.iter().map(|e| e.disbursed_amount).sum()
    }

    /// True when every entry is exactly one calendar month after the previous one
    pub fn is_consecutive(&self) -> bool {
        self.entries.windows(2).all(|pair| {
            pair[0].month.checked_add_months(Months::new(1)) == Some(pair[1].month)
        })
    }
}

// ============================================================================
// STATUS MATRIX
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentStatus {
    Employed,
    #[serde(rename = "Self-Employed")]
    SelfEmployed,
    Student,
    Unemployed,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 4] = [
        EmploymentStatus::Employed,
        EmploymentStatus::SelfEmployed,
        EmploymentStatus::Student,
        EmploymentStatus::Unemployed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::Employed => "Employed",
            EmploymentStatus::SelfEmployed => "Self-Employed",
            EmploymentStatus::Student => "Student",
            EmploymentStatus::Unemployed => "Unemployed",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaritalStatus {
    Divorced,
    Married,
    Single,
    Widowed,
}

impl MaritalStatus {
    pub const ALL: [MaritalStatus; 4] = [
        MaritalStatus::Divorced,
        MaritalStatus::Married,
        MaritalStatus::Single,
        MaritalStatus::Widowed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Divorced => "Divorced",
            MaritalStatus::Married => "Married",
            MaritalStatus::Single => "Single",
            MaritalStatus::Widowed => "Widowed",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCell {
    pub employment: EmploymentStatus,
    pub marital: MaritalStatus,
    pub amount: i64,
}

/// Disbursed amount per (employment, marital) pair
///
/// Rows follow `EmploymentStatus::ALL`, columns follow `MaritalStatus::ALL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMatrix {
    values: [[i64; 4]; 4],
}

impl StatusMatrix {
    pub fn from_rows(values: [[i64; 4]; 4]) -> Self {
        StatusMatrix { values }
    }

    /// Reference mock table
    pub fn reference() -> Self {
        StatusMatrix::from_rows([
            // Divorced     Married      Single       Widowed
            [201_092_476, 235_795_226, 160_860_028, 220_685_060], // Employed
            [169_769_799, 174_221_570, 237_527_129, 212_932_385], // Self-Employed
            [158_612_451, 190_043_913, 246_557_082, 182_901_632], // Student
            [228_409_144, 166_413_905, 205_334_960, 153_728_219], // Unemployed
        ])
    }

    /// Mock matrix drawn uniformly from [STATUS_AMOUNT_MIN, STATUS_AMOUNT_MAX)
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let mut values = [[0i64; 4]; 4];
        for row in values.iter_mut() {
            for cell in row.iter_mut() {
                *cell = rng.gen_range(STATUS_AMOUNT_MIN..STATUS_AMOUNT_MAX);
            }
        }
        StatusMatrix { values }
    }

    pub fn get(&self, employment: EmploymentStatus, marital: MaritalStatus) -> i64 {
        self.values[employment.index()][marital.index()]
    }

    pub fn row(&self, employment: EmploymentStatus) -> [i64; 4] {
        self.values[employment.index()]
    }

    /// All cells in row-major order
    pub fn cells(&self) -> Vec<StatusCell> {
        EmploymentStatus::ALL
            .iter()
            .flat_map(|employment| {
                MaritalStatus::ALL.iter().map(move |marital| StatusCell {
                    employment: *employment,
                    marital: *marital,
                    amount: self.get(*employment, *marital),
                })
            })
            .collect()
    }

    pub fn row_total(&self, employment: EmploymentStatus) -> i64 {
        self.row(employment).iter().sum()
    }

    pub fn total(&self) -> i64 {
        self.values.iter().flatten().sum()
    }
}
