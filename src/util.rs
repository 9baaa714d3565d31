use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const LABEL_LIMIT: usize = 16;
const LABEL_KEEP: usize = 12;

/// Compact currency-less amount, e.g. `1.25M` or `180K`.
pub fn format_amount(value: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

    let magnitude = value.abs();
    for (scale, suffix) in UNITS {
        if magnitude >= scale {
            let scaled = value / scale;
            let text = format!("{scaled:.2}");
            let text = text.trim_end_matches('0').trim_end_matches('.');
            return format!("{text}{suffix}");
        }
    }
    format!("{value:.0}")
}

pub fn short_label(name: &str) -> String {
    if name.chars().count() <= LABEL_LIMIT {
        return name.to_owned();
    }
    let kept = name.chars().take(LABEL_KEEP).collect::<String>();
    format!("{}...", kept.trim_end())
}

/// Deterministic pseudo-random pair in `[-1, 1]` derived from an id.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(950.0), "950");
        assert_eq!(format_amount(180_000.0), "180K");
        assert_eq!(format_amount(1_250_000.0), "1.25M");
        assert_eq!(format_amount(2_500_000_000.0), "2.5B");
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("Acme"), "Acme");
        assert_eq!(short_label("Institute of Applied Materials"), "Institute of...");
    }

    #[test]
    fn test_stable_pair_is_deterministic_and_bounded() {
        let first = stable_pair("staff_101");
        assert_eq!(first, stable_pair("staff_101"));
        assert_ne!(first, stable_pair("staff_102"));
        for id in ["a", "b", "partner-7", ""] {
            let (x, y) = stable_pair(id);
            assert!((-1.0..=1.0).contains(&x));
            assert!((-1.0..=1.0).contains(&y));
        }
    }
}
