//! Zahlenformate der Open-Rails-Dateien.
//!
//! Zwei Darstellungen kommen vor: eine kompakte mit sechs signifikanten
//! Stellen (`fmt_g`) und die kürzeste exakt rücklesbare (`fmt_repr`).

/// Sechs signifikante Stellen, ohne Nullen am Ende; Exponentenform unter
/// 1e-4 und ab 1e6 (`1.5e+06`).
pub fn fmt_g(value: f64) -> String {
    if let Some(special) = special(value) {
        return special;
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.5e}", value);
    let (mantissa, exp) = split_exp(&scientific);
    if (-4..6).contains(&exp) {
        let precision = (5 - exp) as usize;
        trim_fraction(&format!("{:.*}", precision, value))
    } else {
        format!("{}{}", trim_fraction(mantissa), exp_suffix(exp))
    }
}

/// Kürzeste Darstellung, die exakt zurückgelesen wird; ganze Zahlen mit `.0`,
/// Exponentenform unter 1e-4 und ab 1e16.
pub fn fmt_repr(value: f64) -> String {
    if let Some(special) = special(value) {
        return special;
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    let formatted = format!("{:e}", value.abs());
    let (mantissa, exp) = split_exp(&formatted);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let body = if (-4..16).contains(&exp) {
        if exp >= 0 {
            let int_len = exp as usize + 1;
            if digits.len() <= int_len {
                format!("{}{}.0", digits, "0".repeat(int_len - digits.len()))
            } else {
                format!("{}.{}", &digits[..int_len], &digits[int_len..])
            }
        } else {
            format!("0.{}{}", "0".repeat((-exp - 1) as usize), digits)
        }
    } else {
        format!("{}{}", mantissa, exp_suffix(exp))
    };
    format!("{}{}", sign, body)
}

fn special(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("nan".to_string())
    } else if value.is_infinite() {
        Some(if value > 0.0 { "inf" } else { "-inf" }.to_string())
    } else {
        None
    }
}

/// Zerlegt `1.234e5` in Mantisse und Exponent.
fn split_exp(formatted: &str) -> (&str, i32) {
    match formatted.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse().unwrap_or(0)),
        None => (formatted, 0),
    }
}

fn exp_suffix(exp: i32) -> String {
    let sign = if exp < 0 { '-' } else { '+' };
    format!("e{}{:02}", sign, exp.abs())
}

fn trim_fraction(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text.to_string()
    }
}
