use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::ApiError;

pub fn validate_id(id: i32, resource: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {resource} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Treats blank form fields as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Optional `HH:MM` shop hour.
pub fn parse_shop_hour(value: Option<&str>, field: &str) -> Result<Option<NaiveTime>, ApiError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    NaiveTime::parse_from_str(raw, "%H:%M")
        .map(Some)
        .map_err(|_| ApiError::validation(format!("{field} must be in HH:MM format")))
}

/// Optional `YYYY-MM-DD` expiry date, stored as midnight of that day.
pub fn parse_expiry_date(value: Option<&str>) -> Result<Option<NaiveDateTime>, ApiError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| Some(d.and_time(NaiveTime::MIN)))
        .map_err(|_| ApiError::validation("Expiry date must be in YYYY-MM-DD format"))
}

pub fn validate_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(Option<f64>, Option<f64>), ApiError> {
    if let Some(lat) = latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        return Err(ApiError::validation("Latitude must be between -90 and 90"));
    }
    if let Some(lng) = longitude
        && !(-180.0..=180.0).contains(&lng)
    {
        return Err(ApiError::validation(
            "Longitude must be between -180 and 180",
        ));
    }
    Ok((latitude, longitude))
}
