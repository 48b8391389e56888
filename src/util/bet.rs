/// Magnitude suffixes, longest first so "qa" wins over a bare letter.
const SUFFIXES: &[(&str, f64)] = &[
    ("qa", 1e15),
    ("qi", 1e18),
    ("sx", 1e21),
    ("sp", 1e24),
    ("oc", 1e27),
    ("no", 1e30),
    ("dc", 1e33),
    ("k", 1e3),
    ("m", 1e6),
    ("b", 1e9),
    ("t", 1e12),
];

/// Expands an amount written as an abbreviation ("5T", "2.5k"), a percentage of `balance`
/// ("50%"), or a keyword ("all", "half"). Anything else that is not a number gives NaN.
pub fn parse_bet(text: &str, balance: f64) -> f64 {
    let s = text.trim().to_ascii_lowercase().replace(',', "");

    match s.as_str() {
        "all" | "allin" | "max" => return balance,
        "half" => return (balance / 2.0).floor(),
        _ => {}
    }

    if let Some(pct) = s.strip_suffix('%') {
        return match pct.parse::<f64>() {
            Ok(p) => (balance * p / 100.0).floor(),
            Err(_) => f64::NAN,
        };
    }

    for (suffix, scale) in SUFFIXES {
        if let Some(num) = s.strip_suffix(suffix) {
            return match num.parse::<f64>() {
                Ok(n) => (n * scale).floor(),
                Err(_) => f64::NAN,
            };
        }
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::parse_bet;

    #[test]
    fn abbreviations() {
        assert_eq!(parse_bet("5T", 0.0), 5e12);
        assert_eq!(parse_bet("2.5k", 0.0), 2500.0);
        assert_eq!(parse_bet("1qa", 0.0), 1e15);
        assert_eq!(parse_bet("10", 0.0), 10.0);
        assert_eq!(parse_bet("1,000", 0.0), 1000.0);
    }

    #[test]
    fn relative_to_balance() {
        assert_eq!(parse_bet("50%", 901.0), 450.0);
        assert_eq!(parse_bet("all", 901.0), 901.0);
        assert_eq!(parse_bet("half", 901.0), 450.0);
    }

    #[test]
    fn garbage_is_nan() {
        assert!(parse_bet("lots", 10.0).is_nan());
        assert!(parse_bet("x%", 10.0).is_nan());
    }
}
