//! Pickup window validation.

use chrono::{NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PickupError {
    #[error("Please select a pickup time")]
    Missing,

    #[error("Pickup time '{0}' is not a valid HH:MM time")]
    Malformed(String),

    #[error("Pickup time must be in the future")]
    NotInFuture,

    #[error("Pickup time must be no later than the shop's closing time ({closing})")]
    AfterClosing { closing: NaiveTime },
}

impl PickupError {
    /// Missing or unparsable input, as opposed to a time outside the window.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::Missing | Self::Malformed(_))
    }
}

fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Resolves a requested `HH:MM` into today's pickup instant.
///
/// The pickup is on `now`'s date, must be strictly after `now`, and must not
/// be later than `closing` when the shop has one. Opening time is not checked.
pub fn resolve_pickup(
    requested: Option<&str>,
    now: NaiveDateTime,
    closing: Option<NaiveTime>,
) -> Result<NaiveDateTime, PickupError> {
    let raw = requested.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(PickupError::Missing);
    }

    let time = parse_time_of_day(raw).ok_or_else(|| PickupError::Malformed(raw.to_string()))?;
    let pickup = now.date().and_time(time);

    if pickup <= now {
        return Err(PickupError::NotInFuture);
    }

    if let Some(closing) = closing
        && pickup.time() > closing
    {
        return Err(PickupError::AfterClosing { closing });
    }

    Ok(pickup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn missing_or_blank_is_rejected() {
        assert_eq!(resolve_pickup(None, at(10, 0), None), Err(PickupError::Missing));
        assert_eq!(
            resolve_pickup(Some("  "), at(10, 0), None),
            Err(PickupError::Missing)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let err = resolve_pickup(Some("noon"), at(10, 0), None).unwrap_err();
        assert_eq!(err, PickupError::Malformed("noon".to_string()));
        assert!(err.is_input_error());
    }

    #[test]
    fn pickup_lands_on_today() {
        let pickup = resolve_pickup(Some("18:30"), at(10, 0), Some(hm(22, 0))).unwrap();
        assert_eq!(pickup, at(18, 30));
    }

    #[test]
    fn now_or_past_is_rejected() {
        assert_eq!(
            resolve_pickup(Some("10:00"), at(10, 0), None),
            Err(PickupError::NotInFuture)
        );
        assert_eq!(
            resolve_pickup(Some("09:15"), at(10, 0), None),
            Err(PickupError::NotInFuture)
        );
    }

    #[test]
    fn after_closing_is_rejected_but_closing_itself_is_fine() {
        assert_eq!(
            resolve_pickup(Some("22:01"), at(10, 0), Some(hm(22, 0))),
            Err(PickupError::AfterClosing { closing: hm(22, 0) })
        );
        assert!(resolve_pickup(Some("22:00"), at(10, 0), Some(hm(22, 0))).is_ok());
    }

    #[test]
    fn seconds_are_accepted() {
        assert_eq!(
            resolve_pickup(Some("11:00:00"), at(10, 0), None).unwrap(),
            at(11, 0)
        );
    }
}
