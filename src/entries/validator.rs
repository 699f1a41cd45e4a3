//! Turns raw user input into a validated [`Entry`].

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Entry;

use super::clock::{Clock, IdGenerator, SystemClock, UuidIds};

pub const DEFAULT_TOLERANCE_HOURS: f64 = 0.01;
pub const DEFAULT_EFFICIENCY_DECIMALS: u32 = 2;

/// Added to the tolerance before comparing, so a difference typed as exactly
/// the tolerance still passes after binary rounding. The relative part scales
/// with the magnitude of the inputs, where representation error grows.
const COMPARISON_SLACK: f64 = 1e-9;
const RELATIVE_SLACK: f64 = 8.0 * f64::EPSILON;

fn comparison_slack(total: f64, good: f64, bad: f64) -> f64 {
    let magnitude = total.abs().max(good.abs() + bad.abs());
    COMPARISON_SLACK.max(RELATIVE_SLACK * magnitude)
}

/// Numeric rules applied to every new entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationPolicy {
    /// Largest accepted gap between total hours and good + bad hours.
    pub tolerance_hours: f64,
    /// Decimal places kept in the derived efficiency.
    pub efficiency_decimals: u32,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            tolerance_hours: DEFAULT_TOLERANCE_HOURS,
            efficiency_decimals: DEFAULT_EFFICIENCY_DECIMALS,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NotANumber,
    Inconsistent,
    NonPositiveTotal,
    NegativeHours,
}

/// Why a new entry was rejected. All variants are user input problems; the
/// caller keeps the user's input so it can be corrected.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Please enter valid numbers for total, good and bad hours")]
    NotANumber,
    #[error("Good hours + bad hours ({sum:.2}) must equal total hours ({total:.2})")]
    Inconsistent { total: f64, sum: f64 },
    #[error("Total hours must be greater than 0 (got {total})")]
    NonPositiveTotal { total: f64 },
    #[error("Good and bad hours cannot be negative")]
    NegativeHours,
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::NotANumber => ErrorKind::NotANumber,
            ValidationError::Inconsistent { .. } => ErrorKind::Inconsistent,
            ValidationError::NonPositiveTotal { .. } => ErrorKind::NonPositiveTotal,
            ValidationError::NegativeHours => ErrorKind::NegativeHours,
        }
    }

    pub fn report(&self) -> ValidationReport {
        ValidationReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Serializable form of a [`ValidationError`] for front ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub kind: ErrorKind,
    pub message: String,
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn efficiency_of(good_hours: f64, total_hours: f64, decimals: u32) -> f64 {
    round_to(good_hours / total_hours * 100.0, decimals).clamp(0.0, 100.0)
}

fn parse_hours(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

pub struct EntryValidator {
    policy: ValidationPolicy,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl EntryValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self::with_capabilities(policy, Box::new(SystemClock), Box::new(UuidIds))
    }

    pub fn with_capabilities(
        policy: ValidationPolicy,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        Self { policy, clock, ids }
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Checks the three raw fields and, when they agree, builds a new entry
    /// with a fresh id, the current time and the derived efficiency.
    ///
    /// Checks run in a fixed order: parse, consistency, positive total,
    /// non-negative parts. The first failing check is reported.
    pub fn validate_and_build(
        &self,
        raw_total: &str,
        raw_good: &str,
        raw_bad: &str,
    ) -> Result<Entry, ValidationError> {
        let result = self.check(raw_total, raw_good, raw_bad);
        if let Err(err) = &result {
            debug!(
                "Rejected entry (total={raw_total:?}, good={raw_good:?}, bad={raw_bad:?}): {err}"
            );
        }
        let (total, good, bad) = result?;

        Ok(Entry {
            id: self.ids.next_id(),
            timestamp: self.clock.now_ms(),
            total_hours: total,
            good_hours: good,
            bad_hours: bad,
            efficiency: efficiency_of(good, total, self.policy.efficiency_decimals),
        })
    }

    fn check(
        &self,
        raw_total: &str,
        raw_good: &str,
        raw_bad: &str,
    ) -> Result<(f64, f64, f64), ValidationError> {
        let (Some(total), Some(good), Some(bad)) = (
            parse_hours(raw_total),
            parse_hours(raw_good),
            parse_hours(raw_bad),
        ) else {
            return Err(ValidationError::NotANumber);
        };

        let sum = good + bad;
        let allowed = self.policy.tolerance_hours + comparison_slack(total, good, bad);
        if (total - sum).abs() > allowed {
            return Err(ValidationError::Inconsistent { total, sum });
        }

        if total <= 0.0 {
            return Err(ValidationError::NonPositiveTotal { total });
        }

        if good < 0.0 || bad < 0.0 {
            return Err(ValidationError::NegativeHours);
        }

        Ok((total, good, bad))
    }
}
