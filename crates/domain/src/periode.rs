// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HR reporting periods and academic-year windows.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::{Date, Month};

/// An HR reporting period with a submission deadline.
///
/// `debut` and `fin` are both inclusive calendar days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodeRh {
    /// Identifier, `None` until persisted.
    pub id: Option<i64>,
    /// First day.
    pub debut: Date,
    /// Last day.
    pub fin: Date,
    /// Last day on which events may still be entered.
    pub butoir: Date,
    /// Whether the period has been sent to HR.
    #[serde(default)]
    pub envoyee: bool,
}

impl PeriodeRh {
    /// Returns true if the day belongs to the period.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.debut <= date && date <= self.fin
    }

    /// Returns true once the deadline is past, comparing days only.
    #[must_use]
    pub fn is_locked(&self, today: Date) -> bool {
        self.butoir < today
    }

    /// Returns true if the two periods share at least one day.
    ///
    /// Both bounds are inclusive, as in `contains`: a period starting on the
    /// last day of another overlaps it.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.debut <= other.fin && other.debut <= self.fin
    }

    /// Checks that the window is ordered.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPeriode` if the period ends before it
    /// starts or its deadline precedes its start.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.fin < self.debut {
            return Err(DomainError::InvalidPeriode {
                reason: format!("ends on {} before it starts on {}", self.fin, self.debut),
            });
        }
        if self.butoir < self.debut {
            return Err(DomainError::InvalidPeriode {
                reason: format!("deadline {} precedes start {}", self.butoir, self.debut),
            });
        }
        Ok(())
    }
}

/// An academic year, named after the calendar year it starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnneeUniversitaire {
    /// Calendar year of the first day.
    pub annee: i32,
    /// Month the year starts in.
    pub mois_debut: Month,
}

impl AnneeUniversitaire {
    /// Creates an academic year starting in the given month.
    #[must_use]
    pub const fn new(annee: i32, mois_debut: Month) -> Self {
        Self { annee, mois_debut }
    }

    /// Returns the academic year containing the date.
    #[must_use]
    pub fn containing(date: Date, mois_debut: Month) -> Self {
        let annee = if u8::from(date.month()) >= u8::from(mois_debut) {
            date.year()
        } else {
            date.year() - 1
        };
        Self::new(annee, mois_debut)
    }

    /// Returns the half-open window `[first day, first day of next year)`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPeriode` if the year is out of the
    /// representable calendar range.
    pub fn window(&self) -> Result<(Date, Date), DomainError> {
        let first_day = |annee: i32| -> Result<Date, DomainError> {
            Date::from_calendar_date(annee, self.mois_debut, 1).map_err(|err| {
                DomainError::InvalidPeriode {
                    reason: format!("academic year {annee}: {err}"),
                }
            })
        };
        Ok((first_day(self.annee)?, first_day(self.annee + 1)?))
    }
}
