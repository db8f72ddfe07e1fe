//! Follow-up (revisit) scheduling.
//!
//! A follow-up is chosen either from a named preset ("7 Days", "1 Month", ...) or as a custom
//! date. Presets map to an `(interval, unit)` pair and the target date is computed from "today";
//! the result is a plain calendar date serialised as `YYYY-MM-DD`.
//!
//! Month arithmetic is calendar based and clamps to the last day of the target month:
//! 2024-01-31 plus one month is 2024-02-29, never March.

use crate::{CoreError, CoreResult};
use chrono::{Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpUnit {
    Days,
    Months,
}

/// Named follow-up choices offered by the consultation form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FollowUpPreset {
    ThreeDays,
    FiveDays,
    SevenDays,
    TenDays,
    FifteenDays,
    OneMonth,
    TwoMonths,
    ThreeMonths,
    SixMonths,
    Custom,
}

impl FollowUpPreset {
    pub const ALL: [FollowUpPreset; 10] = [
        FollowUpPreset::ThreeDays,
        FollowUpPreset::FiveDays,
        FollowUpPreset::SevenDays,
        FollowUpPreset::TenDays,
        FollowUpPreset::FifteenDays,
        FollowUpPreset::OneMonth,
        FollowUpPreset::TwoMonths,
        FollowUpPreset::ThreeMonths,
        FollowUpPreset::SixMonths,
        FollowUpPreset::Custom,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FollowUpPreset::ThreeDays => "3 Days",
            FollowUpPreset::FiveDays => "5 Days",
            FollowUpPreset::SevenDays => "7 Days",
            FollowUpPreset::TenDays => "10 Days",
            FollowUpPreset::FifteenDays => "15 Days",
            FollowUpPreset::OneMonth => "1 Month",
            FollowUpPreset::TwoMonths => "2 Months",
            FollowUpPreset::ThreeMonths => "3 Months",
            FollowUpPreset::SixMonths => "6 Months",
            FollowUpPreset::Custom => "Custom",
        }
    }

    /// The `(interval, unit)` pair for this preset. `Custom` has none.
    pub fn interval(&self) -> Option<(u32, FollowUpUnit)> {
        use FollowUpUnit::{Days, Months};
        match self {
            FollowUpPreset::ThreeDays => Some((3, Days)),
            FollowUpPreset::FiveDays => Some((5, Days)),
            FollowUpPreset::SevenDays => Some((7, Days)),
            FollowUpPreset::TenDays => Some((10, Days)),
            FollowUpPreset::FifteenDays => Some((15, Days)),
            FollowUpPreset::OneMonth => Some((1, Months)),
            FollowUpPreset::TwoMonths => Some((2, Months)),
            FollowUpPreset::ThreeMonths => Some((3, Months)),
            FollowUpPreset::SixMonths => Some((6, Months)),
            FollowUpPreset::Custom => None,
        }
    }
}

impl fmt::Display for FollowUpPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FollowUpPreset {
    type Err = CoreError;

    /// Matches labels case-insensitively and ignores extra whitespace ("7 days", " 1  Month").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.split_whitespace().collect::<Vec<_>>().join(" ");
        FollowUpPreset::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| CoreError::UnknownFollowUpPreset(s.to_string()))
    }
}

impl TryFrom<String> for FollowUpPreset {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FollowUpPreset> for String {
    fn from(value: FollowUpPreset) -> Self {
        value.label().to_string()
    }
}

/// Compute `today + interval` in the given unit.
///
/// # Errors
///
/// Returns [`CoreError::FollowUpOutOfRange`] if the result overflows chrono's date range.
pub fn follow_up_date(interval: u32, unit: FollowUpUnit, today: NaiveDate) -> CoreResult<NaiveDate> {
    let target = match unit {
        FollowUpUnit::Days => today.checked_add_days(Days::new(u64::from(interval))),
        FollowUpUnit::Months => today.checked_add_months(Months::new(interval)),
    };
    target.ok_or(CoreError::FollowUpOutOfRange)
}

/// Resolve a preset label to a concrete date. `Custom` yields `None`.
pub fn preset_date(preset: &str, today: NaiveDate) -> CoreResult<Option<NaiveDate>> {
    let preset: FollowUpPreset = preset.parse()?;
    preset
        .interval()
        .map(|(interval, unit)| follow_up_date(interval, unit, today))
        .transpose()
}

/// The follow-up sub-record of a consultation.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FollowUp {
    pub preset: Option<FollowUpPreset>,
    pub interval: Option<u32>,
    pub unit: Option<FollowUpUnit>,
    pub date: Option<NaiveDate>,
    pub reason: String,
    pub early_if_persist: bool,
}

/// A partial follow-up update. `None` fields leave the current value alone.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub struct FollowUpPatch {
    pub preset: Option<FollowUpPreset>,
    pub interval: Option<u32>,
    pub unit: Option<FollowUpUnit>,
    pub date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub early_if_persist: Option<bool>,
}

impl FollowUp {
    /// Shallow-merge `patch` over `self`.
    ///
    /// No field is derived from another here: changing `interval` or `unit` leaves `date` as it
    /// was. Dates are only computed by [`FollowUp::with_preset`].
    pub fn merged(&self, patch: FollowUpPatch) -> FollowUp {
        FollowUp {
            preset: patch.preset.or(self.preset),
            interval: patch.interval.or(self.interval),
            unit: patch.unit.or(self.unit),
            date: patch.date.or(self.date),
            reason: patch.reason.unwrap_or_else(|| self.reason.clone()),
            early_if_persist: patch.early_if_persist.unwrap_or(self.early_if_persist),
        }
    }

    /// Apply a preset selection.
    ///
    /// A concrete preset always recomputes the date from `today`, discarding any hand-edited
    /// date. `Custom` keeps the current date so the user can edit it directly.
    pub fn with_preset(&self, preset: FollowUpPreset, today: NaiveDate) -> CoreResult<FollowUp> {
        let mut next = self.clone();
        next.preset = Some(preset);
        if let Some((interval, unit)) = preset.interval() {
            next.interval = Some(interval);
            next.unit = Some(unit);
            next.date = Some(follow_up_date(interval, unit, today)?);
        }
        Ok(next)
    }

    pub fn is_custom(&self) -> bool {
        self.preset == Some(FollowUpPreset::Custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn seven_days_from_new_year() {
        assert_eq!(
            preset_date("7 Days", date(2024, 1, 1)).unwrap(),
            Some(date(2024, 1, 8))
        );
    }

    #[test]
    fn one_month_from_january_31_clamps_to_leap_day() {
        assert_eq!(
            preset_date("1 Month", date(2024, 1, 31)).unwrap(),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            preset_date("1 Month", date(2023, 1, 31)).unwrap(),
            Some(date(2023, 2, 28))
        );
    }

    #[test]
    fn custom_preset_has_no_date() {
        assert_eq!(preset_date("Custom", date(2024, 1, 1)).unwrap(), None);
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(matches!(
            preset_date("Fortnight", date(2024, 1, 1)),
            Err(CoreError::UnknownFollowUpPreset(p)) if p == "Fortnight"
        ));
    }

    #[test]
    fn preset_parsing_is_lenient_about_case_and_spacing() {
        assert_eq!(" 7  days ".parse::<FollowUpPreset>().unwrap(), FollowUpPreset::SevenDays);
        assert_eq!("6 MONTHS".parse::<FollowUpPreset>().unwrap(), FollowUpPreset::SixMonths);
    }

    #[test]
    fn date_serialises_without_time_component() {
        let follow_up = FollowUp::default()
            .with_preset(FollowUpPreset::SevenDays, date(2024, 1, 1))
            .unwrap();
        let json = serde_json::to_value(&follow_up).unwrap();
        assert_eq!(json["date"], "2024-01-08");
        assert_eq!(json["preset"], "7 Days");
        assert_eq!(json["unit"], "days");
    }

    #[test]
    fn merge_never_recomputes_the_date() {
        let base = FollowUp::default()
            .with_preset(FollowUpPreset::SevenDays, date(2024, 1, 1))
            .unwrap();
        let patched = base.merged(FollowUpPatch {
            interval: Some(3),
            unit: Some(FollowUpUnit::Months),
            ..FollowUpPatch::default()
        });
        assert_eq!(patched.interval, Some(3));
        assert_eq!(patched.unit, Some(FollowUpUnit::Months));
        assert_eq!(patched.date, Some(date(2024, 1, 8)));

        let recomputed = patched
            .with_preset(FollowUpPreset::ThreeMonths, date(2024, 1, 1))
            .unwrap();
        assert_eq!(recomputed.date, Some(date(2024, 4, 1)));
    }

    #[test]
    fn switching_from_custom_to_preset_discards_manual_date() {
        let today = date(2024, 3, 10);
        let custom = FollowUp::default()
            .with_preset(FollowUpPreset::Custom, today)
            .unwrap()
            .merged(FollowUpPatch {
                date: Some(date(2024, 5, 1)),
                ..Default::default()
            });
        assert!(custom.is_custom());
        assert_eq!(custom.date, Some(date(2024, 5, 1)));

        let preset = custom.with_preset(FollowUpPreset::FiveDays, today).unwrap();
        assert_eq!(preset.date, Some(date(2024, 3, 15)));
    }

    #[test]
    fn selecting_custom_keeps_current_date_editable() {
        let today = date(2024, 3, 10);
        let weekly = FollowUp::default()
            .with_preset(FollowUpPreset::SevenDays, today)
            .unwrap();
        let custom = weekly.with_preset(FollowUpPreset::Custom, today).unwrap();
        assert_eq!(custom.date, weekly.date);
        assert!(custom.is_custom());
    }

    #[test]
    fn merge_is_shallow_and_keeps_unpatched_fields() {
        let base = FollowUp {
            reason: "review bloods".into(),
            early_if_persist: true,
            ..Default::default()
        };
        let merged = base.merged(FollowUpPatch {
            reason: Some("review x-ray".into()),
            ..Default::default()
        });
        assert_eq!(merged.reason, "review x-ray");
        assert!(merged.early_if_persist);
    }
}
