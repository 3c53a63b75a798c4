//! Presentation formatting for amounts and rates

/// Format with thousands separators and a fixed number of decimals.
///
/// `format_grouped(1234567.891, 2)` → `"1,234,567.89"`
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0.00" reads oddly; drop the sign when nothing non-zero remains
    let is_zero = unsigned.chars().all(|c| c == '0' || c == '.');
    let sign = if is_zero { "" } else { sign };

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Two decimals with thousands separators
pub fn format_amount(value: f64) -> String {
    format_grouped(value, 2)
}

/// Currency amount with a leading `$`
pub fn format_money(value: f64) -> String {
    let amount = format_amount(value);
    match amount.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", amount),
    }
}

/// Exchange rate with four decimals
pub fn format_rate(value: f64) -> String {
    format!("{:.4}", value)
}

/// Plain decimal that keeps one fractional digit on whole values (`18.0`, `3.5`)
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Title-case each whitespace-separated word (`"ciudad de mexico"` → `"Ciudad De Mexico"`)
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(1850.0), "1,850.00");
        assert_eq!(format_amount(50_000.0), "50,000.00");
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(-12_345.5), "-12,345.50");
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn test_money_and_rate() {
        assert_eq!(format_money(2496.205098), "$2,496.21");
        assert_eq!(format_money(-5.0), "-$5.00");
        assert_eq!(format_rate(1.0 / 18.5), "0.0541");
        assert_eq!(format_rate(18.5), "18.5000");
    }

    #[test]
    fn test_decimal_keeps_fraction_on_whole_values() {
        assert_eq!(format_decimal(18.0), "18.0");
        assert_eq!(format_decimal(2.0), "2.0");
        assert_eq!(format_decimal(3.5), "3.5");
        assert_eq!(format_decimal(0.25), "0.25");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("guadalajara"), "Guadalajara");
        assert_eq!(title_case("CIUDAD de mexico"), "Ciudad De Mexico");
        assert_eq!(title_case(""), "");
    }
}
