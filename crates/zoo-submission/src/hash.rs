use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{SubmissionError, SubmissionResult};

type HmacSha256 = Hmac<Sha256>;

/// Signs the form parameters so submitters cannot swap the submission,
/// type or item of a form.
///
/// ```
/// use zoo_submission::SubmissionHasher;
///
/// let hasher = SubmissionHasher::new("secret");
/// let hash = hasher.hash(1, "article", 0, false).unwrap();
/// assert!(hasher.verify(&hash, 1, "article", 0, false).is_ok());
/// assert!(hasher.verify(&hash, 1, "article", 7, false).is_err());
/// ```
#[derive(Clone)]
pub struct SubmissionHasher {
	secret: Vec<u8>,
}

impl SubmissionHasher {
	pub fn new(secret: impl AsRef<[u8]>) -> Self {
		Self {
			secret: secret.as_ref().to_vec(),
		}
	}

	fn mac(&self, submission_id: i64, type_id: &str, item_id: i64, edit: bool) -> SubmissionResult<HmacSha256> {
		let mut mac = HmacSha256::new_from_slice(&self.secret)
			.map_err(|e| SubmissionError::Secret(e.to_string()))?;
		mac.update(format!("{submission_id}:{type_id}:{item_id}:{}", u8::from(edit)).as_bytes());
		Ok(mac)
	}

	/// Hex encoded HMAC-SHA256 of the form parameters.
	pub fn hash(&self, submission_id: i64, type_id: &str, item_id: i64, edit: bool) -> SubmissionResult<String> {
		let mac = self.mac(submission_id, type_id, item_id, edit)?;
		Ok(hex::encode(mac.finalize().into_bytes()))
	}

	/// Checks `hash` in constant time.
	pub fn verify(
		&self,
		hash: &str,
		submission_id: i64,
		type_id: &str,
		item_id: i64,
		edit: bool,
	) -> SubmissionResult<()> {
		let provided = hex::decode(hash).map_err(|_| SubmissionError::HashMismatch)?;
		self.mac(submission_id, type_id, item_id, edit)?
			.verify_slice(&provided)
			.map_err(|_| SubmissionError::HashMismatch)
	}
}
