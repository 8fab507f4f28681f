//! Filter evaluation over decoded event parameters.
//!
//! A filter expression is a boolean combination of typed comparison
//! clauses evaluated against the decoded parameter set of an event
//! occurrence, e.g. `amount > 1000 AND recipient == '0xAb...'`. `OR`
//! binds loosest, `AND` binds tighter, clauses may be wrapped in
//! parentheses, and literals may be quoted. The declared parameter type
//! decides which operators apply and how the comparison is performed.
//!
//! Unknown parameter names, malformed clauses, and operator/type
//! mismatches are parameter errors: a subscription carrying a bad filter
//! fails fast instead of silently dropping occurrences.

use alloy::primitives::{I256, U256};
use std::str::FromStr;

use crate::models::{AdapterError, Parameter};

mod expression;

pub use expression::split_clause;

/// How a declared parameter type compares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeCategory {
	Unsigned,
	Signed,
	Address,
	Bool,
	Text,
}

impl TypeCategory {
	fn from_tag(tag: &str) -> Result<Self, AdapterError> {
		if tag.starts_with("uint") {
			Ok(Self::Unsigned)
		} else if tag.starts_with("int") {
			Ok(Self::Signed)
		} else if tag == "address" {
			Ok(Self::Address)
		} else if tag == "bool" {
			Ok(Self::Bool)
		} else if tag == "string" || tag.starts_with("bytes") {
			Ok(Self::Text)
		} else {
			Err(AdapterError::parameter_error(format!(
				"cannot filter on parameter type '{}'",
				tag
			)))
		}
	}
}

/// Evaluates a filter expression against a decoded parameter set.
///
/// An absent or empty expression matches everything.
///
/// # Arguments
/// * `expression` - The filter expression, if any
/// * `parameters` - Decoded parameters of the observed occurrence
///
/// # Returns
/// Whether the occurrence should be emitted, or a parameter error for a
/// malformed expression
pub fn evaluate(expression: Option<&str>, parameters: &[Parameter]) -> Result<bool, AdapterError> {
	let Some(expression) = expression else {
		return Ok(true);
	};
	if expression.trim().is_empty() {
		return Ok(true);
	}

	// OR binds loosest; any OR branch being true makes the expression true
	for or_branch in expression.split(" OR ") {
		let mut branch_matches = true;
		for clause in or_branch.trim().split(" AND ") {
			if !evaluate_clause(clause, parameters)? {
				branch_matches = false;
				break;
			}
		}
		if branch_matches {
			return Ok(true);
		}
	}
	Ok(false)
}

/// Checks an expression against a parameter declaration list without
/// evaluating it, so a bad filter is rejected before any log arrives
pub fn validate(expression: Option<&str>, declared: &[Parameter]) -> Result<(), AdapterError> {
	let Some(expression) = expression else {
		return Ok(());
	};
	if expression.trim().is_empty() {
		return Ok(());
	}
	for or_branch in expression.split(" OR ") {
		for clause in or_branch.trim().split(" AND ") {
			let (name, operator, _) = parse_clause(clause)?;
			let parameter = find_parameter(name, declared)?;
			let category = TypeCategory::from_tag(&parameter.kind)?;
			check_operator(category, operator)?;
		}
	}
	Ok(())
}

fn evaluate_clause(clause: &str, parameters: &[Parameter]) -> Result<bool, AdapterError> {
	let (name, operator, literal) = parse_clause(clause)?;
	let parameter = find_parameter(name, parameters)?;
	let category = TypeCategory::from_tag(&parameter.kind)?;
	check_operator(category, operator)?;

	match category {
		TypeCategory::Unsigned => {
			let left = parse_unsigned(&parameter.value)?;
			let right = parse_unsigned(literal)?;
			Ok(compare_ordered(&left, &right, operator))
		}
		TypeCategory::Signed => {
			let left = parse_signed(&parameter.value)?;
			let right = parse_signed(literal)?;
			Ok(compare_ordered(&left, &right, operator))
		}
		TypeCategory::Address => {
			let equal = normalize_address(&parameter.value) == normalize_address(literal);
			Ok(if operator == "==" { equal } else { !equal })
		}
		TypeCategory::Bool => {
			let left = parse_bool(&parameter.value)?;
			let right = parse_bool(literal)?;
			Ok(if operator == "==" {
				left == right
			} else {
				left != right
			})
		}
		TypeCategory::Text => {
			// case-insensitive for all text operators
			let left = parameter.value.to_lowercase();
			let right = literal.to_lowercase();
			Ok(match operator {
				"==" => left == right,
				"!=" => left != right,
				"contains" => left.contains(&right),
				"starts_with" => left.starts_with(&right),
				"ends_with" => left.ends_with(&right),
				_ => unreachable!("operator checked above"),
			})
		}
	}
}

fn parse_clause(clause: &str) -> Result<(&str, &str, &str), AdapterError> {
	let clean = clause.trim().trim_matches(|c| c == '(' || c == ')');
	split_clause(clean).ok_or_else(|| {
		AdapterError::parameter_error(format!("malformed filter clause '{}'", clean))
	})
}

fn find_parameter<'a>(
	name: &str,
	parameters: &'a [Parameter],
) -> Result<&'a Parameter, AdapterError> {
	parameters.iter().find(|p| p.name == name).ok_or_else(|| {
		AdapterError::parameter_error(format!("filter references unknown parameter '{}'", name))
	})
}

fn check_operator(category: TypeCategory, operator: &str) -> Result<(), AdapterError> {
	let allowed: &[&str] = match category {
		TypeCategory::Unsigned | TypeCategory::Signed => &["==", "!=", ">", ">=", "<", "<="],
		TypeCategory::Address | TypeCategory::Bool => &["==", "!="],
		TypeCategory::Text => &["==", "!=", "contains", "starts_with", "ends_with"],
	};
	if allowed.contains(&operator) {
		Ok(())
	} else {
		Err(AdapterError::parameter_error(format!(
			"operator '{}' is not applicable to {:?} parameters",
			operator, category
		)))
	}
}

fn compare_ordered<T: Ord>(left: &T, right: &T, operator: &str) -> bool {
	match operator {
		"==" => left == right,
		"!=" => left != right,
		">" => left > right,
		">=" => left >= right,
		"<" => left < right,
		"<=" => left <= right,
		_ => unreachable!("operator checked above"),
	}
}

fn parse_unsigned(value: &str) -> Result<U256, AdapterError> {
	U256::from_str(value.trim()).map_err(|e| {
		AdapterError::parameter_error(format!("cannot compare '{}' numerically: {}", value, e))
	})
}

fn parse_signed(value: &str) -> Result<I256, AdapterError> {
	I256::from_dec_str(value.trim()).map_err(|e| {
		AdapterError::parameter_error(format!("cannot compare '{}' numerically: {}", value, e))
	})
}

fn parse_bool(value: &str) -> Result<bool, AdapterError> {
	match value.trim().to_lowercase().as_str() {
		"true" => Ok(true),
		"false" => Ok(false),
		other => Err(AdapterError::parameter_error(format!(
			"'{}' is not a boolean",
			other
		))),
	}
}

fn normalize_address(value: &str) -> String {
	value.trim().trim_start_matches("0x").to_lowercase()
}
