//! Round-trip properties of the parameter codec.

use alloy::primitives::Address;
use alloy_dyn_abi::DynSolValue;
use proptest::prelude::*;

use ledger_gateway::models::Parameter;
use ledger_gateway::services::codec;

/// Encodes a single parameter and decodes it back
fn round_trip(parameter: &Parameter) -> Parameter {
	let encoded = DynSolValue::Tuple(vec![codec::encode_value(parameter).unwrap()])
		.abi_encode_params();
	let declared = vec![Parameter::declared(
		parameter.name.as_str(),
		parameter.kind.as_str(),
	)];
	codec::decode_values(&declared, &encoded)
		.unwrap()
		.remove(0)
}

proptest! {
	#[test]
	fn prop_uint256_round_trips(value in any::<u128>()) {
		let parameter = Parameter::new("v", "uint256", value.to_string());
		prop_assert_eq!(round_trip(&parameter).value, value.to_string());
	}

	#[test]
	fn prop_uint64_round_trips(value in any::<u64>()) {
		let parameter = Parameter::new("v", "uint64", value.to_string());
		prop_assert_eq!(round_trip(&parameter).value, value.to_string());
	}

	#[test]
	fn prop_int256_round_trips(value in any::<i128>()) {
		let parameter = Parameter::new("v", "int256", value.to_string());
		prop_assert_eq!(round_trip(&parameter).value, value.to_string());
	}

	#[test]
	fn prop_bool_round_trips(value in any::<bool>()) {
		let parameter = Parameter::new("v", "bool", value.to_string());
		prop_assert_eq!(round_trip(&parameter).value, value.to_string());
	}

	#[test]
	fn prop_address_round_trips(raw in any::<[u8; 20]>()) {
		let checksummed = Address::from(raw).to_checksum(None);
		let parameter = Parameter::new("v", "address", checksummed.clone());
		prop_assert_eq!(round_trip(&parameter).value, checksummed);
	}

	#[test]
	fn prop_string_round_trips(value in "[a-zA-Z0-9_]{1,32}") {
		let parameter = Parameter::new("v", "string", value.clone());
		prop_assert_eq!(round_trip(&parameter).value, value);
	}

	#[test]
	fn prop_bytes_round_trip(raw in proptest::collection::vec(any::<u8>(), 0..64)) {
		let rendered = format!("0x{}", hex::encode(&raw));
		let parameter = Parameter::new("v", "bytes", rendered.clone());
		prop_assert_eq!(round_trip(&parameter).value, rendered);
	}

	#[test]
	fn prop_fixed_bytes_round_trip(raw in any::<[u8; 8]>()) {
		let rendered = format!("0x{}", hex::encode(raw));
		let parameter = Parameter::new("v", "bytes8", rendered.clone());
		prop_assert_eq!(round_trip(&parameter).value, rendered);
	}

	#[test]
	fn prop_call_data_is_selector_plus_words(value in any::<u64>()) {
		let inputs = vec![
			Parameter::new("a", "uint256", value.to_string()),
			Parameter::new("b", "bool", "true"),
		];
		let data = codec::function_call_data("probe", &inputs).unwrap();
		prop_assert_eq!(data.len(), 4 + 2 * 32);
	}
}
