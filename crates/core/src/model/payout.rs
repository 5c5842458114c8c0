use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;

use crate::model::ids::CourseId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PayoutError {
    #[error("payout total overflows")]
    TotalOverflow,
}

//
// ─── PAYOUTS ───────────────────────────────────────────────────────────────────
//

/// One earnings record for a teacher account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutEntry {
    pub course_id: CourseId,
    pub amount_cents: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Earnings in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyPayout {
    pub year: i32,
    pub month: u32,
    pub amount_cents: u64,
}

/// Aggregate of a teacher's payout entries for dashboard display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutSummary {
    total_cents: u64,
    months: Vec<MonthlyPayout>,
}

impl PayoutSummary {
    /// Builds a summary from raw entries, grouped per calendar month with the
    /// newest month first.
    ///
    /// # Errors
    ///
    /// Returns `PayoutError::TotalOverflow` if the amounts do not fit in u64.
    pub fn from_entries(entries: &[PayoutEntry]) -> Result<Self, PayoutError> {
        let mut total_cents = 0_u64;
        let mut months: Vec<MonthlyPayout> = Vec::new();

        for entry in entries {
            total_cents = total_cents
                .checked_add(entry.amount_cents)
                .ok_or(PayoutError::TotalOverflow)?;

            let year = entry.occurred_at.year();
            let month = entry.occurred_at.month();
            match months.iter_mut().find(|m| m.year == year && m.month == month) {
                Some(bucket) => {
                    bucket.amount_cents = bucket
                        .amount_cents
                        .checked_add(entry.amount_cents)
                        .ok_or(PayoutError::TotalOverflow)?;
                }
                None => months.push(MonthlyPayout {
                    year,
                    month,
                    amount_cents: entry.amount_cents,
                }),
            }
        }

        months.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));

        Ok(Self {
            total_cents,
            months,
        })
    }

    #[must_use]
    pub fn total_cents(&self) -> u64 {
        self.total_cents
    }

    #[must_use]
    pub fn months(&self) -> &[MonthlyPayout] {
        &self.months
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
