use rust_decimal::Decimal;

use crate::invoice::round_currency;

/// Group the digits of an integer with thousands separators
pub fn format_grouped_int(value: i128) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format a money amount with two decimal places and thousands separators
pub fn format_amount(value: Decimal) -> String {
    let rounded = format!("{:.2}", round_currency(value));
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let negative = whole.starts_with('-');
    let digits = whole.trim_start_matches('-');
    let grouped = format_grouped_int(digits.parse::<i128>().unwrap_or(0));

    if negative {
        format!("-{}.{}", grouped, frac)
    } else {
        format!("{}.{}", grouped, frac)
    }
}

/// Format a money amount prefixed with a currency symbol
pub fn format_money(value: Decimal, currency_symbol: &str) -> String {
    format!("{}{}", currency_symbol, format_amount(value))
}

/// Format an hour count without trailing zeros (e.g. 7.5, 4)
pub fn format_hours(value: Decimal) -> String {
    value.normalize().to_string()
}
