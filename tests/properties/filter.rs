//! Properties of filter expression evaluation.

use proptest::prelude::*;

use ledger_gateway::models::Parameter;
use ledger_gateway::services::filter::evaluate;

proptest! {
	#[test]
	fn prop_numeric_operators_agree_with_integer_ordering(
		left in any::<u128>(),
		right in any::<u128>(),
	) {
		let parameters = vec![Parameter::new("x", "uint256", left.to_string())];
		for (operator, expected) in [
			(">", left > right),
			(">=", left >= right),
			("<", left < right),
			("<=", left <= right),
			("==", left == right),
			("!=", left != right),
		] {
			let expression = format!("x {} {}", operator, right);
			prop_assert_eq!(evaluate(Some(&expression), &parameters).unwrap(), expected);
		}
	}

	#[test]
	fn prop_signed_comparison_handles_negatives(
		left in any::<i64>(),
		right in any::<i64>(),
	) {
		let parameters = vec![Parameter::new("x", "int256", left.to_string())];
		let expression = format!("x > {}", right);
		prop_assert_eq!(evaluate(Some(&expression), &parameters).unwrap(), left > right);
	}

	#[test]
	fn prop_contains_agrees_with_substring_search(
		haystack in "[a-z]{0,16}",
		needle in "[a-z]{1,4}",
	) {
		let parameters = vec![Parameter::new("memo", "string", haystack.clone())];
		let expression = format!("memo contains '{}'", needle);
		prop_assert_eq!(
			evaluate(Some(&expression), &parameters).unwrap(),
			haystack.contains(&needle)
		);
	}

	#[test]
	fn prop_and_is_conjunction(
		value in any::<u32>(),
		low in any::<u32>(),
		high in any::<u32>(),
	) {
		let parameters = vec![Parameter::new("x", "uint256", value.to_string())];
		let expression = format!("x >= {} AND x <= {}", low, high);
		let expected = value >= low && value <= high;
		prop_assert_eq!(evaluate(Some(&expression), &parameters).unwrap(), expected);
	}

	#[test]
	fn prop_or_is_disjunction(
		value in any::<u32>(),
		a in any::<u32>(),
		b in any::<u32>(),
	) {
		let parameters = vec![Parameter::new("x", "uint256", value.to_string())];
		let expression = format!("x == {} OR x == {}", a, b);
		let expected = value == a || value == b;
		prop_assert_eq!(evaluate(Some(&expression), &parameters).unwrap(), expected);
	}
}
