/// Rounds to an integer and groups thousands with commas: `1234567.4` -> `1,234,567`.
pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }

    let lead = digits.len() % 3;
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (index + 3 - lead) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, "0")]
    #[case(999.0, "999")]
    #[case(1000.0, "1,000")]
    #[case(12345.0, "12,345")]
    #[case(1234567.4, "1,234,567")]
    #[case(-4200.0, "-4,200")]
    #[case(0.6, "1")]
    fn groups_thousands(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_count(value), expected);
    }
}
