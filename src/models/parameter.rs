//! Named, typed parameter values exchanged with smart contracts.

use serde::{Deserialize, Serialize};

/// A single named parameter of a smart-contract function or event.
///
/// The application side always carries the value as a string in its
/// canonical form; the codec converts it to and from the ledger's native
/// typed representation. For declared output parameters the value is
/// empty until a call or event fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
	/// Parameter name as declared by the contract interface
	pub name: String,
	/// Declared semantic type tag, e.g. `uint256`, `address`, `string`
	#[serde(rename = "type")]
	pub kind: String,
	/// Canonical string rendering of the value
	#[serde(default)]
	pub value: String,
}

impl Parameter {
	/// Creates a parameter carrying a value
	pub fn new(name: impl Into<String>, kind: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: kind.into(),
			value: value.into(),
		}
	}

	/// Creates an output declaration: name and type without a value
	pub fn declared(name: impl Into<String>, kind: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: kind.into(),
			value: String::new(),
		}
	}
}
