use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::liters_to_ml;

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([\d.]+)").expect("static pattern is valid"))
}

/// Extracts a daily water goal in ml from free text such as "2.5 литра".
///
/// The first run of digits and dots is read as liters, up to its second dot
/// ("1.2.3" reads as 1.2). Text without a number, a bare "." or a value <= 0
/// yields `None`.
pub fn parse_daily_water_ml(text: &str) -> Option<u32> {
    let captured = number_pattern().captures(text)?.get(1)?.as_str();
    let number = match captured.match_indices('.').nth(1) {
        Some((second_dot, _)) => &captured[..second_dot],
        None => captured,
    };

    let liters = match number.parse::<f64>() {
        Ok(liters) if liters > 0.0 => liters,
        _ => {
            debug!("Ignoring daily water recommendation '{}'", text);
            return None;
        }
    };

    liters_to_ml(liters).filter(|ml| *ml > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_liters_from_free_text() {
        assert_eq!(parse_daily_water_ml("2.5 литра"), Some(2500));
        assert_eq!(parse_daily_water_ml("около 3 л в день"), Some(3000));
        assert_eq!(parse_daily_water_ml("1.75"), Some(1750));
    }

    #[test]
    fn test_reads_number_up_to_second_dot() {
        assert_eq!(parse_daily_water_ml("1.2.3 л"), Some(1200));
        assert_eq!(parse_daily_water_ml("2. литра."), Some(2000));
        assert_eq!(parse_daily_water_ml("примерно .5 л"), Some(500));
    }

    #[test]
    fn test_rejects_text_without_a_usable_number() {
        assert_eq!(parse_daily_water_ml("не определено"), None);
        assert_eq!(parse_daily_water_ml(""), None);
        assert_eq!(parse_daily_water_ml("0 литров"), None);
        assert_eq!(parse_daily_water_ml(". л"), None);
        assert_eq!(parse_daily_water_ml("..5 л"), None);
    }
}
