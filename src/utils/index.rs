/// Format an amount in a network's smallest unit as a decimal string with `decimals` places.
pub fn format_token_amount(amount: u128, decimals: u32) -> String {
	if decimals == 0 {
		return amount.to_string();
	}
	let unit = 10u128.pow(decimals);
	format!(
		"{}.{:0width$}",
		amount / unit,
		amount % unit,
		width = decimals as usize
	)
}

/// Format a balance as reported by the network API (a decimal string of smallest units).
///
/// Balances that are not plain unsigned integers are returned unchanged.
pub fn format_balance(balance: &str, decimals: u32) -> String {
	match balance.parse::<u128>() {
		Ok(amount) => format_token_amount(amount, decimals),
		Err(_) => balance.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn formats_smallest_units() {
		assert_eq!(format_token_amount(150_000_000, 8), "1.50000000");
		assert_eq!(format_token_amount(1, 8), "0.00000001");
		assert_eq!(format_token_amount(42, 0), "42");
	}

	#[test]
	fn leaves_unparsable_balances_alone() {
		assert_eq!(format_balance("2500000000", 8), "25.00000000");
		assert_eq!(format_balance("", 8), "");
		assert_eq!(format_balance("-1", 8), "-1");
	}
}
