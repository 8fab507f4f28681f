//! Parameter codec: the universal parameter model to and from the
//! ledger's native ABI values.
//!
//! Application-side values travel as canonical strings inside
//! [`Parameter`]; this module resolves declared type tags, coerces values
//! into native ABI form, produces function-call data and event signature
//! topics, and renders decoded outputs back into their canonical string
//! form. All mismatches (unknown tags, wrong arity, malformed values) are
//! parameter errors raised before anything touches the network.

use alloy::primitives::{keccak256, B256};
use alloy_dyn_abi::{DynSolType, DynSolValue};

use crate::models::{AdapterError, Parameter};

/// Resolves a declared type tag into its native ABI type.
///
/// Only scalar tags are supported; the universal parameter model carries
/// scalar string values, so composite tags (arrays, tuples) are rejected
/// as parameter errors.
pub fn resolve_type(tag: &str) -> Result<DynSolType, AdapterError> {
	let resolved = DynSolType::parse(tag)
		.map_err(|e| AdapterError::parameter_error(format!("unknown type tag '{}': {}", tag, e)))?;
	match resolved {
		DynSolType::Bool
		| DynSolType::Int(_)
		| DynSolType::Uint(_)
		| DynSolType::FixedBytes(_)
		| DynSolType::Address
		| DynSolType::Bytes
		| DynSolType::String => Ok(resolved),
		other => Err(AdapterError::parameter_error(format!(
			"unsupported composite type tag '{}'",
			other.sol_type_name()
		))),
	}
}

/// Resolves the declared types of a parameter list, in order
pub fn resolve_types(parameters: &[Parameter]) -> Result<Vec<DynSolType>, AdapterError> {
	parameters.iter().map(|p| resolve_type(&p.kind)).collect()
}

/// Coerces a parameter's string value into its native ABI value
pub fn encode_value(parameter: &Parameter) -> Result<DynSolValue, AdapterError> {
	let kind = resolve_type(&parameter.kind)?;
	kind.coerce_str(&parameter.value).map_err(|e| {
		AdapterError::parameter_error(format!(
			"cannot encode '{}' as {} for parameter {}: {}",
			parameter.value, parameter.kind, parameter.name, e
		))
	})
}

/// Renders a native ABI value back into its canonical string form
pub fn format_value(value: &DynSolValue) -> Result<String, AdapterError> {
	match value {
		DynSolValue::Bool(b) => Ok(b.to_string()),
		DynSolValue::Uint(v, _) => Ok(v.to_string()),
		DynSolValue::Int(v, _) => Ok(v.to_string()),
		DynSolValue::Address(a) => Ok(a.to_checksum(None)),
		DynSolValue::FixedBytes(word, size) => Ok(format!("0x{}", hex::encode(&word[..*size]))),
		DynSolValue::Bytes(bytes) => Ok(format!("0x{}", hex::encode(bytes))),
		DynSolValue::String(s) => Ok(s.clone()),
		other => Err(AdapterError::parameter_error(format!(
			"cannot render composite value of type {}",
			other.sol_type_name().unwrap_or_default()
		))),
	}
}

/// Canonical signature of a function or event, e.g. `transfer(address,uint256)`
pub fn canonical_signature(identifier: &str, types: &[DynSolType]) -> String {
	let joined = types
		.iter()
		.map(|t| t.sol_type_name().into_owned())
		.collect::<Vec<_>>()
		.join(",");
	format!("{}({})", identifier, joined)
}

/// Encodes a function call: 4-byte selector followed by ABI-encoded inputs
///
/// # Errors
/// Fails with a parameter error before producing any data if a type tag is
/// unknown or a value cannot be coerced into its declared type
pub fn function_call_data(
	function_identifier: &str,
	inputs: &[Parameter],
) -> Result<Vec<u8>, AdapterError> {
	let types = resolve_types(inputs)?;
	let values = inputs
		.iter()
		.map(encode_value)
		.collect::<Result<Vec<_>, _>>()?;

	let signature = canonical_signature(function_identifier, &types);
	let selector = &keccak256(signature.as_bytes())[..4];
	let encoded = DynSolValue::Tuple(values).abi_encode_params();

	let mut data = Vec::with_capacity(4 + encoded.len());
	data.extend_from_slice(selector);
	data.extend_from_slice(&encoded);
	Ok(data)
}

/// Signature topic identifying an event, e.g. keccak of `Transfer(address,uint256)`
pub fn event_topic(event_identifier: &str, types: &[DynSolType]) -> B256 {
	keccak256(canonical_signature(event_identifier, types).as_bytes())
}

/// Decodes ABI-encoded output or event data against a declaration list.
///
/// Returns one filled-in [`Parameter`] per declared output, in declaration
/// order.
pub fn decode_values(declared: &[Parameter], data: &[u8]) -> Result<Vec<Parameter>, AdapterError> {
	if declared.is_empty() {
		return Ok(Vec::new());
	}
	let types = resolve_types(declared)?;
	let decoded = DynSolType::Tuple(types)
		.abi_decode_params(data)
		.map_err(|e| AdapterError::parameter_error(format!("cannot decode values: {}", e)))?;

	let values = match decoded {
		DynSolValue::Tuple(values) => values,
		single => vec![single],
	};
	if values.len() != declared.len() {
		return Err(AdapterError::parameter_error(format!(
			"expected {} decoded values, got {}",
			declared.len(),
			values.len()
		)));
	}

	declared
		.iter()
		.zip(values.iter())
		.map(|(declaration, value)| {
			Ok(Parameter::new(
				declaration.name.clone(),
				declaration.kind.clone(),
				format_value(value)?,
			))
		})
		.collect()
}
