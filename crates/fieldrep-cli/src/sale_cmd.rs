//! `fieldrep line-total`: price one sale line from raw input text.

use fieldrep_core::sale::line_total;

/// Amounts that do not parse, or are negative, count as zero.
pub fn cmd_line_total(quantity: &str, unit_price: &str) {
    let total = line_total(quantity, unit_price).round_dp(2);
    println!("{total:.2}");
}
