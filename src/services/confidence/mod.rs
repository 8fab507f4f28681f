//! Confidence-to-depth translation.
//!
//! Callers express how final a reported state must be as a probability in
//! [0, 1]; each ledger kind translates that into its own threshold. For
//! proof-of-work ledgers the threshold is a number of block confirmations
//! derived from the attacker model in the Bitcoin whitepaper.

use crate::models::AdapterError;

/// Maps a required probability of finality to a ledger-specific threshold
pub trait ConfidenceCalculator: Send + Sync {
	/// Returns the confirmation depth equivalent to the given confidence
	///
	/// # Arguments
	/// * `confidence` - Required probability of finality in [0, 1]
	///
	/// # Errors
	/// Returns a parameter error if `confidence` lies outside [0, 1]
	fn depth_for(&self, confidence: f64) -> Result<u64, AdapterError>;
}

/// Confidence calculator for proof-of-work ledgers.
///
/// Computes the probability that an attacker controlling a fixed share of
/// the network's mining power can still rewrite a transaction buried under
/// `z` blocks, and picks the smallest `z` whose survival probability meets
/// the requested confidence. Depths are capped at the ledger's practical
/// finality; confidences at or above that point all map to the cap.
#[derive(Debug, Clone)]
pub struct PowConfidenceCalculator {
	adversary_ratio: f64,
	max_depth: u64,
}

impl PowConfidenceCalculator {
	/// Creates a calculator for the given adversary share and finality cap
	pub fn new(adversary_ratio: f64, max_depth: u64) -> Self {
		Self {
			adversary_ratio,
			max_depth,
		}
	}

	/// Probability that a transaction at depth `z` survives an attack
	fn survival_probability(&self, z: u64) -> f64 {
		1.0 - self.attack_success_probability(z)
	}

	/// Nakamoto's attacker-success formula for a transaction `z` blocks deep
	fn attack_success_probability(&self, z: u64) -> f64 {
		let q = self.adversary_ratio;
		let p = 1.0 - q;
		let lambda = z as f64 * (q / p);

		let mut poisson = (-lambda).exp();
		let mut sum = 0.0;
		for k in 0..=z {
			if k > 0 {
				poisson *= lambda / k as f64;
			}
			sum += poisson * (1.0 - (q / p).powi((z - k) as i32));
		}
		1.0 - sum
	}
}

impl Default for PowConfidenceCalculator {
	fn default() -> Self {
		Self::new(0.2, 12)
	}
}

impl ConfidenceCalculator for PowConfidenceCalculator {
	fn depth_for(&self, confidence: f64) -> Result<u64, AdapterError> {
		if !(0.0..=1.0).contains(&confidence) || confidence.is_nan() {
			return Err(AdapterError::parameter_error(format!(
				"required confidence must lie in [0, 1], got {}",
				confidence
			)));
		}
		if confidence <= 0.0 {
			return Ok(0);
		}
		for depth in 0..=self.max_depth {
			if self.survival_probability(depth) >= confidence {
				return Ok(depth);
			}
		}
		// practical finality: deeper waits buy no additional confidence
		Ok(self.max_depth)
	}
}
