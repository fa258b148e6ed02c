use std::time::Duration;

/// Render a duration the way it is reported in timeout errors: `5s`, `1.5s`,
/// `200ms`, `30m0s`, `1h0m0s`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    if d < Duration::from_secs(1) {
        if nanos < 1_000 {
            return format!("{nanos}ns");
        }
        if nanos < 1_000_000 {
            return format!("{}µs", decimal(nanos / 1_000, (nanos % 1_000) as u64, 3));
        }
        return format!(
            "{}ms",
            decimal(nanos / 1_000_000, (nanos % 1_000_000) as u64, 6)
        );
    }

    let secs = d.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = decimal((secs % 60) as u128, d.subsec_nanos() as u64, 9);

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

fn decimal(whole: u128, frac: u64, digits: usize) -> String {
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0digits$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::zero(Duration::ZERO, "0s")]
    #[case::whole_seconds(Duration::from_secs(5), "5s")]
    #[case::fractional_seconds(Duration::from_millis(1500), "1.5s")]
    #[case::millis(Duration::from_millis(200), "200ms")]
    #[case::fractional_millis(Duration::from_micros(2500), "2.5ms")]
    #[case::micros(Duration::from_micros(7), "7µs")]
    #[case::nanos(Duration::from_nanos(15), "15ns")]
    #[case::minutes(Duration::from_secs(90), "1m30s")]
    #[case::half_hour(Duration::from_secs(30 * 60), "30m0s")]
    #[case::hour(Duration::from_secs(3600), "1h0m0s")]
    #[case::mixed(Duration::from_secs(3725), "1h2m5s")]
    fn test_format_duration(#[case] d: Duration, #[case] expected: &str) {
        assert_eq!(format_duration(d), expected);
    }
}
