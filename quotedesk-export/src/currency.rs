use quotedesk_catalog::round_money;
use rust_decimal::Decimal;

/// `1234.5` with `₹` -> `₹1,234.50`.
pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    let rounded = round_money(amount);
    let digits = format!("{:.2}", rounded.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{}{}{}.{}", sign, symbol, grouped, fraction)
}

/// Excel number format showing the symbol and two decimals.
pub(crate) fn currency_num_format(symbol: &str) -> String {
    format!("\"{}\"#,##0.00", symbol.replace('"', ""))
}
