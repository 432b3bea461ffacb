use std::collections::HashSet;
use std::env;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::db::DEFAULT_MAX_POOL_SIZE;

pub const DEFAULT_WALK_IN_CAPACITY: i64 = 2;
pub const DEFAULT_AUTHENTICATED_CAPACITY: i64 = 3;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_pool_size: u32,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_expiry_minutes: i64,
    /// Max appointments per (date, slot, location) for unauthenticated bookings.
    pub walk_in_capacity: i64,
    /// Max appointments per (date, slot, location) for customer/admin bookings.
    pub authenticated_capacity: i64,
    /// Dates on which no appointment may be created.
    pub public_holidays: HashSet<NaiveDate>,
    pub mail_relay_endpoint: Option<String>,
    pub mail_from: String,
    pub mail_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_pool_size = env::var("DATABASE_MAX_POOL_SIZE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_POOL_SIZE);
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let jwt_issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "amw-backend".to_string());
        let jwt_audience =
            env::var("JWT_AUDIENCE").unwrap_or_else(|_| "amw-clients".to_string());
        let jwt_expiry_minutes = env::var("JWT_EXPIRY_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("JWT_EXPIRY_MINUTES must be an integer")?;
        let walk_in_capacity = env::var("WALK_IN_CAPACITY")
            .unwrap_or_else(|_| DEFAULT_WALK_IN_CAPACITY.to_string())
            .parse()
            .context("WALK_IN_CAPACITY must be an integer")?;
        let authenticated_capacity = env::var("AUTHENTICATED_CAPACITY")
            .unwrap_or_else(|_| DEFAULT_AUTHENTICATED_CAPACITY.to_string())
            .parse()
            .context("AUTHENTICATED_CAPACITY must be an integer")?;
        let public_holidays = parse_holidays(
            &env::var("PUBLIC_HOLIDAYS").unwrap_or_default(),
        )?;
        let mail_relay_endpoint = env::var("MAIL_RELAY_ENDPOINT").ok();
        let mail_from =
            env::var("MAIL_FROM").unwrap_or_else(|_| "bookings@amw.example".to_string());
        let mail_timeout_secs = env::var("MAIL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("MAIL_TIMEOUT_SECS must be an integer")?;

        Ok(Self {
            database_url,
            database_max_pool_size,
            server_host,
            server_port,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            jwt_expiry_minutes,
            walk_in_capacity,
            authenticated_capacity,
            public_holidays,
            mail_relay_endpoint,
            mail_from,
            mail_timeout_secs,
        })
    }
}

/// Holiday list is a comma-separated set of ISO `YYYY-MM-DD` dates.
fn parse_holidays(raw: &str) -> Result<HashSet<NaiveDate>> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .with_context(|| format!("invalid public holiday date: {value}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::parse_holidays;

    #[test]
    fn parses_comma_separated_holiday_dates() {
        let holidays = parse_holidays("2025-12-25, 2026-01-01").expect("valid list");
        assert_eq!(holidays.len(), 2);
        assert!(holidays.contains(&NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()));
        assert!(holidays.contains(&NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }

    #[test]
    fn empty_list_yields_no_holidays() {
        assert!(parse_holidays("").expect("empty is fine").is_empty());
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_holidays("25/12/2025").is_err());
    }
}
