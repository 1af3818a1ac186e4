//! Error taxonomy for the pay-to-call pipeline.
//!
//! Every failure a caller can observe is a [`TettoClientError`] variant, so
//! callers pattern-match on the kind instead of parsing message strings. The
//! one distinction that matters for money is between
//! [`TettoClientError::SubmissionRejected`] (the backend definitely did not
//! settle) and [`TettoClientError::SubmissionAmbiguous`] (the outcome is
//! unknown and must be resolved out-of-band before retrying).

use chrono::{DateTime, Utc};
use http::StatusCode;

use crate::transaction::{TransactionEncodeError, TransactionSignError};

/// Errors that can occur while calling a paid service.
#[derive(Debug, thiserror::Error)]
pub enum TettoClientError {
    /// A URL could not be constructed from the configured base URL.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        context: &'static str,
        #[source]
        source: url::ParseError,
    },
    /// A paid call was attempted on a client with no signer configured.
    /// Detected before any network request is made.
    #[error("A signing keypair is required for paid calls")]
    SignerRequired,
    /// The backend rejected the payload before any transaction existed.
    /// Always safe: no funds have moved and none were at risk.
    #[error("Request rejected before payment: {0}")]
    Validation(String),
    /// The backend's response violated the documented wire shape, e.g. an
    /// `ok: true` build response missing its transaction, or an envelope that
    /// does not decode. Surfaced immediately, never retried.
    #[error("Malformed server response: {0}")]
    MalformedResponse(String),
    /// The unsigned envelope could not be signed, e.g. the configured signer
    /// is not among the transaction's required signers.
    #[error(transparent)]
    Signing(#[from] TransactionSignError),
    /// The signed envelope could not be re-serialized for submission.
    /// Should be an extremely rare occurrence.
    #[error(transparent)]
    Encoding(#[from] TransactionEncodeError),
    /// The payment intent's validity window elapsed before submission.
    /// Detected locally; no submit request is sent for an expired intent.
    #[error("Payment intent {intent_id} expired at {expires_at}")]
    IntentExpired {
        intent_id: String,
        expires_at: DateTime<Utc>,
    },
    /// The backend explicitly rejected the signed submission. The intent is
    /// dead; the caller may build a fresh intent and retry the whole pipeline.
    #[error("Submission rejected: {0}")]
    SubmissionRejected(String),
    /// The submit request was dispatched but its outcome is unknown: the
    /// request timed out, the connection dropped mid-exchange, or the reply
    /// violated the contract. Settlement may or may not have happened. Do not
    /// blindly retry; check the receipt out-of-band instead.
    #[error("Submission outcome unknown: {context}: {detail}")]
    SubmissionAmbiguous {
        context: &'static str,
        detail: String,
    },
    /// A catalog endpoint answered `ok: false`.
    #[error("API error: {context}: {message}")]
    Api {
        context: &'static str,
        message: String,
    },
    /// HTTP transport failure before the request was dispatched.
    #[error("HTTP error: {context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with an unexpected HTTP status.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        context: &'static str,
        status: StatusCode,
        body: String,
    },
    /// The response body was not valid JSON of the expected shape.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The response body could not be read as text.
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl TettoClientError {
    /// True when the settlement outcome is unknown to the client.
    ///
    /// Every other failure in the taxonomy is guaranteed not to have moved
    /// funds, because the backend validates before issuing a usable intent
    /// and rejections are explicit.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, TettoClientError::SubmissionAmbiguous { .. })
    }
}
