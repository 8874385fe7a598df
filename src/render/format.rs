//! Human-readable formatting for durations and counts.

/// Options for [`format_duration`].
#[derive(Debug, Clone, Copy)]
pub struct DurationFormat {
    /// Durations below this many seconds render as `-`.
    pub minimum_value: f64,
    /// When true, append the sub-unit remainder (seconds under minutes,
    /// minutes under hours).
    pub is_accurate: bool,
}

impl Default for DurationFormat {
    fn default() -> Self {
        Self {
            minimum_value: 1.0,
            is_accurate: false,
        }
    }
}

/// Group an integer with `,` every three digits from the right.
pub fn format_number(num: u64) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn unit(value: u64, singular: &str) -> String {
    let suffix = if value == 1 { "" } else { "s" };
    format!("{} {}{}.", format_number(value), singular, suffix)
}

/// Render a duration in seconds as `"{n} Sec(s)."`, `"{m} Min(s)."` or
/// `"{h} Hr(s)."`, picking the unit by magnitude. Values below
/// `minimum_value` render as `"-"`.
pub fn format_duration(duration_seconds: f64, options: DurationFormat) -> String {
    if duration_seconds < options.minimum_value {
        return "-".to_string();
    }

    if duration_seconds < 60.0 {
        let seconds = duration_seconds.round() as u64;
        return unit(seconds, "Sec");
    }

    if duration_seconds < 3600.0 {
        let minutes = (duration_seconds / 60.0).floor() as u64;
        let seconds = (duration_seconds % 60.0).round() as u64;
        let mut text = unit(minutes, "Min");
        if options.is_accurate && seconds > 0 {
            text.push(' ');
            text.push_str(&unit(seconds, "Sec"));
        }
        return text;
    }

    let hours = (duration_seconds / 3600.0).floor() as u64;
    let minutes = ((duration_seconds % 3600.0) / 60.0).round() as u64;
    let mut text = unit(hours, "Hr");
    if options.is_accurate && minutes > 0 {
        text.push(' ');
        text.push_str(&unit(minutes, "Min"));
    }
    text
}
