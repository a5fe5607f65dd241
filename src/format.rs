// Human-readable sizes and durations for terminal output

const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

const RULE_WIDTH: usize = 60;

/// Horizontal separator line.
pub fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}

pub fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / MIB
}

pub fn to_gb(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

/// MB below one gigabyte, GB above, two decimals.
pub fn readable_size(bytes: u64) -> String {
    if bytes as f64 >= GIB {
        format!("{:.2} GB", to_gb(bytes))
    } else {
        format!("{:.2} MB", to_mb(bytes))
    }
}

/// Binary-unit size with up to four significant digits, e.g. `512MiB`, `1.5GiB`.
pub fn binary_size(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let int_digits = if value < 1.0 {
        1
    } else {
        value.log10().floor() as usize + 1
    };
    let decimals = 4usize.saturating_sub(int_digits);
    let mut s = format!("{:.*}", decimals, value);
    if s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{}{}", s, UNITS[unit])
}

/// Compact duration like `1h2m3s`, `4m0s`, `59s`.
pub fn compact_duration(d: chrono::Duration) -> String {
    let total = d.num_seconds().max(0);
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}h{}m{}s", h, m, s)
    } else if m > 0 {
        format!("{}m{}s", m, s)
    } else {
        format!("{}s", s)
    }
}
