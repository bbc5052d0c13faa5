//! Display strings for prices, returns and volumes.

/// Whole-dollar USD amount with thousands separators, e.g. `$50,123`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(rounded.abs() as u64))
}

/// Signed percentage with two decimals, e.g. `+1.23%`.
pub fn format_percentage(value: f64) -> String {
    // normalise -0.0 so it prints as +0.00%
    let value = if value == 0.0 { 0.0 } else { value };
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.2}%")
}

/// Compact volume: `1.5B`, `2.3M`, `4.0K`, or a plain integer.
pub fn format_volume(value: f64) -> String {
    if value > 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if value > 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if value > 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
