//! Opaque transaction envelope handling.
//!
//! The Tetto backend builds payment transactions server-side and ships them to
//! the client as base64-encoded binary blobs. This module provides
//! [`TransactionEnvelope`], a thin wrapper around a Solana
//! [`VersionedTransaction`] that can:
//!
//! - decode an envelope from its base64 wire form and re-encode it
//!   byte-for-byte ([`TransactionEnvelope::from_base64`] /
//!   [`TransactionEnvelope::as_base64`]),
//! - extract the signable message region ([`TransactionEnvelope::message_bytes`]),
//! - attach the caller's signature without touching the message bytes
//!   ([`TransactionEnvelope::sign`]).
//!
//! The envelope is never interpreted beyond what signing requires: the backend
//! re-validates the exact message bytes it built, so any client-side mutation
//! of the message region would invalidate the payment.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_transaction::versioned::VersionedTransaction;

/// A server-built payment transaction in transit between decode and submit.
///
/// # Example
///
/// ```rust,ignore
/// use tetto_client::transaction::TransactionEnvelope;
/// use solana_keypair::Keypair;
///
/// let keypair = Keypair::new();
/// let envelope = TransactionEnvelope::from_base64(&unsigned_b64)?;
/// let signed = envelope.sign(&keypair)?;
/// let signed_b64 = signed.as_base64()?;
/// ```
pub struct TransactionEnvelope {
    inner: VersionedTransaction,
}

impl TransactionEnvelope {
    pub fn new(transaction: VersionedTransaction) -> Self {
        Self { inner: transaction }
    }

    pub fn inner(&self) -> &VersionedTransaction {
        &self.inner
    }

    /// Decodes a base64 string into a transaction envelope.
    ///
    /// Purely mechanical: base64 to bytes, bytes to [`VersionedTransaction`]
    /// via bincode. Fails on invalid base64 or a structurally malformed
    /// transaction.
    pub fn from_base64(transaction_b64: &str) -> Result<Self, TransactionDecodeError> {
        let bytes = b64
            .decode(transaction_b64.as_bytes())
            .map_err(|e| TransactionDecodeError(e.to_string()))?;
        let transaction = bincode::deserialize::<VersionedTransaction>(bytes.as_slice())
            .map_err(|e| TransactionDecodeError(e.to_string()))?;
        Ok(Self { inner: transaction })
    }

    /// Encodes the envelope back to its base64 wire form.
    ///
    /// Round-trips byte-for-byte with [`Self::from_base64`] for any
    /// well-formed envelope.
    pub fn as_base64(&self) -> Result<String, TransactionEncodeError> {
        let bytes =
            bincode::serialize(&self.inner).map_err(|e| TransactionEncodeError(e.to_string()))?;
        Ok(b64.encode(bytes))
    }

    /// Serializes the message region, i.e. the exact bytes a signature
    /// commits to.
    pub fn message_bytes(&self) -> Vec<u8> {
        self.inner.message.serialize()
    }

    /// Returns true once every required signature slot holds a real signature.
    pub fn is_fully_signed(&self) -> bool {
        let num_required = self.inner.message.header().num_required_signatures;
        if self.inner.signatures.len() < num_required as usize {
            return false;
        }
        let default = Signature::default();
        !self.inner.signatures.iter().any(|s| default.eq(s))
    }

    /// Signs the envelope's message with the given signer and places the
    /// signature at the signer's slot.
    ///
    /// The message bytes are left bit-for-bit unchanged; only the signature
    /// section is touched. Fails if the signer is not among the transaction's
    /// required signers, which means the backend built the envelope for a
    /// different payer.
    pub fn sign(self, signer: &dyn Signer) -> Result<Self, TransactionSignError> {
        let mut tx = self.inner;
        let msg_bytes = tx.message.serialize();
        let signature = signer
            .try_sign_message(msg_bytes.as_slice())
            .map_err(|e| TransactionSignError(format!("{e}")))?;

        // Required signatures are the first N account keys
        let num_required = tx.message.header().num_required_signatures as usize;
        let static_keys = tx.message.static_account_keys();
        if static_keys.len() < num_required {
            return Err(TransactionSignError(
                "transaction header requires more signers than account keys".to_string(),
            ));
        }
        let pos = static_keys[..num_required]
            .iter()
            .position(|k| *k == signer.pubkey())
            .ok_or(TransactionSignError(
                "signer not found in required signers".to_string(),
            ))?;

        // Ensure the signature vector is large enough, then place the signature
        if tx.signatures.len() < num_required {
            tx.signatures.resize(num_required, Signature::default());
        }
        tx.signatures[pos] = signature;
        Ok(Self { inner: tx })
    }
}

/// Error type for a malformed base64 envelope.
#[derive(Debug, thiserror::Error)]
#[error("Can not decode transaction: {0}")]
pub struct TransactionDecodeError(pub String);

/// Error type for envelope re-serialization failures.
#[derive(Debug, thiserror::Error)]
#[error("Can not encode transaction to base64: {0}")]
pub struct TransactionEncodeError(pub String);

/// Error type for signature attachment failures.
#[derive(Debug, thiserror::Error)]
#[error("Can not sign transaction: {0}")]
pub struct TransactionSignError(pub String);
