//! Wire types for the Tetto HTTP+JSON API.
//!
//! Two endpoints drive the pay-to-call protocol:
//!
//! - `POST ./services/{serviceId}/build-transaction` — the backend validates
//!   the payload and, if acceptable, returns an unsigned payment transaction
//!   bound to a single-use payment intent.
//! - `POST ./services/call` — the backend settles the signed transaction and
//!   executes the service.
//!
//! Both respond with an `ok` flag; on `ok: false` the `error` field carries a
//! human-readable message and, for the build endpoint, no funds have moved.
//! The catalog endpoints (`GET ./services`, `GET ./services/{id}`) follow the
//! same envelope shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Settlement asset a payment is denominated in.
///
/// Serialized in wire messages as `"USDC"` or `"SOL"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SettlementAsset {
    Usdc,
    Sol,
}

impl Display for SettlementAsset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SettlementAsset::Usdc => write!(f, "USDC"),
            SettlementAsset::Sol => write!(f, "SOL"),
        }
    }
}

/// Request body for `POST ./services/{serviceId}/build-transaction`.
///
/// Carries the payload and the payer's public identity to the backend
/// *before* any funds move. The payload is opaque to this client; the backend
/// is the sole authority on whether it is acceptable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTransactionRequest {
    /// Base58-encoded public key of the paying wallet.
    pub payer_identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_asset: Option<SettlementAsset>,
    /// Service input, matching the service's input schema.
    pub payload: Value,
}

/// Response body for `POST ./services/{serviceId}/build-transaction`.
///
/// When `ok` is true the backend guarantees `transaction`,
/// `payment_intent_id` and `expires_at` are populated; when `ok` is false
/// only `error` is meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTransactionResponse {
    pub ok: bool,
    /// Base64-encoded unsigned transaction envelope.
    pub transaction: Option<String>,
    pub payment_intent_id: Option<String>,
    /// Total amount in the asset's minor units.
    pub amount_base: Option<u64>,
    pub settlement_asset: Option<SettlementAsset>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Hash of the validated payload, as computed by the backend.
    pub input_digest: Option<String>,
    pub error: Option<String>,
}

/// Request body for `POST ./services/call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub payment_intent_id: String,
    /// Base64-encoded signed transaction envelope.
    pub signed_transaction: String,
}

/// Response body for `POST ./services/call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub ok: bool,
    /// Service output on success.
    pub output: Option<Value>,
    /// Opaque settlement reference, e.g. the payment transaction signature.
    pub settlement_proof: Option<String>,
    pub receipt_id: Option<String>,
    pub error: Option<String>,
}

/// Catalog metadata for a callable service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Price per call in USD.
    pub price_usd: f64,
    pub owner_wallet: Option<String>,
    /// Protocol fee in basis points.
    pub fee_bps: Option<u32>,
}

/// Response body for `GET ./services`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListServicesResponse {
    pub ok: bool,
    pub services: Option<Vec<Service>>,
    pub error: Option<String>,
}

/// Response body for `GET ./services/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetServiceResponse {
    pub ok: bool,
    pub service: Option<Service>,
    pub error: Option<String>,
}
