//! Formatting of money amounts for display.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

/// Formats `number` as dollars with thousands separators and two decimal
/// places, e.g. "$24,650.80" or "-$42.50".
///
/// The amount is rounded to the nearest cent first, so amounts smaller than
/// half a cent are shown as "$0.00".
pub fn format_currency(number: f64) -> String {
    static DOLLARS_FMT: OnceLock<Formatter> = OnceLock::new();

    let dollars_fmt = DOLLARS_FMT.get_or_init(|| {
        Formatter::currency("$")
            .expect("\"$\" is a valid currency prefix")
            .precision(Precision::Decimals(0))
    });

    let total_cents = (number.abs() * 100.0).round() as u64;
    let dollars = total_cents / 100;
    let cents = total_cents % 100;

    let formatted_dollars = if dollars == 0 {
        // numfmt renders zero as "0"
        "$0".to_owned()
    } else {
        dollars_fmt.fmt_string(dollars as f64)
    };

    let sign = if number < 0.0 && total_cents > 0 {
        "-"
    } else {
        ""
    };

    format!("{sign}{formatted_dollars}.{cents:02}")
}
