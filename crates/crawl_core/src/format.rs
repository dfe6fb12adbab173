//! Display helpers shared by the view model and the renderers.

/// Canonical player page for a video identifier.
pub const PLAY_URL_BASE: &str = "https://www.bilibili.com/video/";
/// Inert link target used when no identifier is available.
pub const INERT_LINK: &str = "#";

const HUNDRED_MILLION: i64 = 100_000_000;
const TEN_THOUSAND: i64 = 10_000;

/// Formats a view/favorite count: `亿` above 1e8, `万` above 1e4, comma
/// grouping below that.
pub fn format_count(value: i64) -> String {
    if value >= HUNDRED_MILLION {
        format!("{:.2}亿", value as f64 / HUNDRED_MILLION as f64)
    } else if value >= TEN_THOUSAND {
        format!("{:.1}万", value as f64 / TEN_THOUSAND as f64)
    } else {
        format_with_commas(value)
    }
}

/// Formats seconds as `H:MM:SS`, or `M:SS` when under an hour.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Builds the player link for an identifier; blank identifiers give `#`.
pub fn build_play_url(bvid: Option<&str>) -> String {
    match bvid.map(str::trim) {
        Some(id) if !id.is_empty() => format!("{PLAY_URL_BASE}{id}"),
        _ => INERT_LINK.to_string(),
    }
}

/// Clamps a server-reported progress value into `0..=100`.
pub fn clamp_progress(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

pub(crate) fn format_with_commas(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.push('-');
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_counts_are_grouped() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234), "1,234");
        assert_eq!(format_count(9_999), "9,999");
        assert_eq!(format_count(-1_500), "-1,500");
    }

    #[test]
    fn large_counts_use_units() {
        assert_eq!(format_count(10_000), "1.0万");
        assert_eq!(format_count(15_000), "1.5万");
        assert_eq!(format_count(99_999_999), "10000.0万");
        assert_eq!(format_count(150_000_000), "1.50亿");
        assert_eq!(format_count(100_000_000), "1.00亿");
    }

    #[test]
    fn durations_pad_minutes_and_seconds() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(59.0), "0:59");
        assert_eq!(format_duration(61.0), "1:01");
        assert_eq!(format_duration(3661.0), "1:01:01");
        assert_eq!(format_duration(36_000.0), "10:00:00");
    }

    #[test]
    fn durations_clamp_and_truncate() {
        assert_eq!(format_duration(-5.0), "0:00");
        assert_eq!(format_duration(59.9), "0:59");
        assert_eq!(format_duration(f64::NAN), "0:00");
    }

    #[test]
    fn play_url_for_missing_identifier_is_inert() {
        assert_eq!(
            build_play_url(Some("BV1xx411c7mD")),
            "https://www.bilibili.com/video/BV1xx411c7mD"
        );
        assert_eq!(build_play_url(Some("  ")), "#");
        assert_eq!(build_play_url(None), "#");
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(clamp_progress(-5), 0);
        assert_eq!(clamp_progress(40), 40);
        assert_eq!(clamp_progress(150), 100);
        assert_eq!(clamp_progress(i64::MAX), 100);
    }
}
