use anyhow::{Context, Result};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

pub fn now_utc_rfc3339() -> Result<String> {
    format_rfc3339(OffsetDateTime::now_utc())
}

pub fn format_rfc3339(value: OffsetDateTime) -> Result<String> {
    value
        .format(&Rfc3339)
        .context("failed to format timestamp as RFC3339")
}

/// Start of a trailing window of `days` ending at `now`.
pub fn window_start_rfc3339(now: OffsetDateTime, days: u32) -> Result<String> {
    let start = now
        .checked_sub(Duration::days(i64::from(days)))
        .context("export window start is out of range")?;
    format_rfc3339(start)
}

pub fn compute_since_iso(days: u32) -> Result<String> {
    window_start_rfc3339(OffsetDateTime::now_utc(), days)
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    use super::{format_rfc3339, window_start_rfc3339};

    #[test]
    fn window_start_subtracts_whole_days() {
        let now = OffsetDateTime::parse("2026-02-15T12:30:00Z", &Rfc3339).expect("valid now");

        assert_eq!(
            window_start_rfc3339(now, 1).expect("window start"),
            "2026-02-14T12:30:00Z"
        );
        assert_eq!(
            window_start_rfc3339(now, 0).expect("window start"),
            "2026-02-15T12:30:00Z"
        );
    }

    #[test]
    fn formats_utc_with_z_suffix() {
        let value = OffsetDateTime::from_unix_timestamp(0).expect("epoch");

        assert_eq!(
            format_rfc3339(value).expect("epoch formats"),
            "1970-01-01T00:00:00Z"
        );
    }
}
