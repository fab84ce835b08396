//! Provider B message authentication code.
//!
//! The MAC is the uppercase hex SHA-1 of seven fields joined by `;`, in this exact order:
//!
//! ```text
//! posnetId;terminalNo;cardNumber;minorAmount;currencyCode;merchantId;encKey
//! ```
//!
//! Order, delimiter and digest are fixed by the bank. Any deviation yields a signature the
//! gateway rejects with code 89.

use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

use crate::error::{BridgeError, Result};

const DELIMITER: &str = ";";

/// The ordered fields covered by a Provider B MAC.
///
/// # Examples
///
/// ```
/// use pos_bridge::gateway::mac::SignedFieldSet;
///
/// let mac = SignedFieldSet {
///     posnet_id: "1010",
///     terminal_no: "67000001",
///     card_number: "4111111111111111",
///     amount: "10050",
///     currency_code: "TL",
///     merchant_id: "6700000067",
///     enc_key: "10,10,10,10,10,10,10,10",
/// }
/// .sign()?;
///
/// assert_eq!(mac.len(), 40);
/// assert!(mac.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
/// # Ok::<(), pos_bridge::BridgeError>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SignedFieldSet<'a> {
    /// POS network id.
    pub posnet_id: &'a str,
    /// Terminal number.
    pub terminal_no: &'a str,
    /// Full card number.
    pub card_number: &'a str,
    /// Amount in minor units, as sent in the request.
    pub amount: &'a str,
    /// Currency code, as sent in the request.
    pub currency_code: &'a str,
    /// Merchant id.
    pub merchant_id: &'a str,
    /// Shared secret.
    pub enc_key: &'a str,
}

impl SignedFieldSet<'_> {
    fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("posnet_id", self.posnet_id),
            ("terminal_no", self.terminal_no),
            ("card_number", self.card_number),
            ("amount", self.amount),
            ("currency_code", self.currency_code),
            ("merchant_id", self.merchant_id),
            ("enc_key", self.enc_key),
        ]
    }

    /// Builds the delimited string that gets hashed.
    ///
    /// The result contains the card number and the secret, and is wiped on drop.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::EncodingError`] naming the first empty field.
    pub fn signing_string(&self) -> Result<Zeroizing<String>> {
        let fields = self.fields();
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.is_empty()) {
            return Err(BridgeError::EncodingError(format!("MAC field {name} is empty")));
        }

        let mut joined = Zeroizing::new(String::new());
        for (index, (_, value)) in fields.iter().enumerate() {
            if index > 0 {
                joined.push_str(DELIMITER);
            }
            joined.push_str(value);
        }
        Ok(joined)
    }

    /// Computes the MAC as 40 uppercase hex characters.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::EncodingError`] if any field is empty.
    pub fn sign(&self) -> Result<String> {
        let signing_string = self.signing_string()?;
        let digest = Sha1::digest(signing_string.as_bytes());
        Ok(hex::encode_upper(digest))
    }
}

impl std::fmt::Debug for SignedFieldSet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedFieldSet")
            .field("posnet_id", &self.posnet_id)
            .field("terminal_no", &self.terminal_no)
            .field("amount", &self.amount)
            .field("currency_code", &self.currency_code)
            .field("merchant_id", &self.merchant_id)
            .finish_non_exhaustive()
    }
}
