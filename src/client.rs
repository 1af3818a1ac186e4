//! Client for calling paid Tetto services.
//!
//! [`TettoClient`] drives the two-phase pay-to-call protocol against a Tetto
//! backend:
//!
//! 1. **Build** — [`TettoClient::build_payment_intent`] POSTs the payload and
//!    the payer's public identity; the backend validates the payload *before*
//!    any funds move and answers with an unsigned transaction bound to a
//!    single-use [`PaymentIntent`].
//! 2. **Sign** — [`PaymentIntent::into_submission`] signs the envelope
//!    locally, consuming the intent so it can never be submitted twice.
//! 3. **Submit** — [`TettoClient::submit`] POSTs the signed transaction; the
//!    backend settles the payment and executes the service.
//!
//! [`TettoClient::call`] runs the whole pipeline. Each call is an independent
//! forward-only pass; the client holds no state across calls beyond the
//! transport pool and the signer, both shared read-only, so concurrent calls
//! need no coordination.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tetto_client::{TettoClient, wallet::load_keypair_from_file};
//! use serde_json::json;
//!
//! let keypair = load_keypair_from_file("~/.config/solana/id.json")?;
//! let client = TettoClient::try_from("https://tetto.io/api")?
//!     .with_signer(keypair);
//! let invocation = client.call("svc_1", json!({"text": "Hello"}), None).await?;
//! println!("{}", invocation.output);
//! ```

use chrono::{DateTime, Utc};
use http::{HeaderMap, StatusCode};
use reqwest::Client;
use serde_json::Value;
use solana_signer::Signer;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::TettoClientError;
use crate::proto::{
    BuildTransactionRequest, BuildTransactionResponse, GetServiceResponse, ListServicesResponse,
    Service, SettlementAsset, SubmitRequest, SubmitResponse,
};
use crate::transaction::TransactionEnvelope;

/// A single-use authorization to pay for one validated service call.
///
/// Issued by the backend in response to a successful build request. The
/// unsigned transaction it carries is opaque: the client passes it through
/// the codec unmodified except for the added signature. Consuming the intent
/// via [`PaymentIntent::into_submission`] is the only way to produce a
/// submission, so an intent can back at most one submit attempt.
#[derive(Debug)]
pub struct PaymentIntent {
    id: String,
    /// Base64-encoded unsigned transaction envelope.
    transaction: String,
    asset: Option<SettlementAsset>,
    amount_base: Option<u64>,
    input_digest: Option<String>,
    expires_at: DateTime<Utc>,
}

impl PaymentIntent {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn asset(&self) -> Option<SettlementAsset> {
        self.asset
    }

    /// Total amount in the asset's minor units, if the backend reported it.
    pub fn amount_base(&self) -> Option<u64> {
        self.amount_base
    }

    /// Backend-computed hash of the validated payload, if reported.
    pub fn input_digest(&self) -> Option<&str> {
        self.input_digest.as_deref()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True once the intent's validity window has elapsed. The backend will
    /// not accept a submission for an expired intent, so the client fails
    /// locally instead of sending one.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Signs the unsigned envelope and consumes the intent, binding the
    /// resulting submission to this intent's id.
    ///
    /// Fails locally, without network I/O, if the intent has expired, the
    /// envelope does not decode, or the signer cannot sign it. The envelope's
    /// message region is left bit-for-bit unchanged; the backend re-verifies
    /// it against the bytes it built.
    pub fn into_submission(
        self,
        signer: &dyn Signer,
    ) -> Result<SignedSubmission, TettoClientError> {
        if self.is_expired() {
            return Err(TettoClientError::IntentExpired {
                intent_id: self.id,
                expires_at: self.expires_at,
            });
        }
        let envelope = TransactionEnvelope::from_base64(&self.transaction)
            .map_err(|e| TettoClientError::MalformedResponse(e.to_string()))?;
        let signed = envelope.sign(signer)?;
        let signed_transaction = signed.as_base64()?;
        Ok(SignedSubmission {
            intent_id: self.id,
            signed_transaction,
            expires_at: self.expires_at,
        })
    }
}

/// A signed transaction paired with the payment intent that produced its
/// unsigned form.
///
/// Only constructible through [`PaymentIntent::into_submission`], which
/// guarantees the `intent_id`/`signed_transaction` binding and that every
/// submission was preceded by a successful build.
#[derive(Debug)]
pub struct SignedSubmission {
    intent_id: String,
    signed_transaction: String,
    expires_at: DateTime<Utc>,
}

impl SignedSubmission {
    pub fn intent_id(&self) -> &str {
        &self.intent_id
    }

    pub fn signed_transaction(&self) -> &str {
        &self.signed_transaction
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// The result of a successful paid service call.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Service output.
    pub output: Value,
    /// Opaque settlement reference, e.g. the payment transaction signature.
    pub settlement_proof: Option<String>,
    /// Backend receipt identifier for out-of-band lookup.
    pub receipt_id: Option<String>,
}

/// A client for the Tetto service marketplace.
///
/// Holds the HTTP transport, the backend base URL and an optional signing
/// keypair. Cheap to clone; clones share the transport pool and signer.
#[derive(Clone)]
pub struct TettoClient {
    /// Base URL of the backend (e.g. `https://tetto.io/api/`)
    base_url: Url,
    /// Full URL to `GET /services` requests
    services_url: Url,
    /// Full URL to `POST /services/call` requests
    call_url: Url,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Optional custom headers sent with each request
    headers: HeaderMap,
    /// Optional request timeout
    timeout: Option<Duration>,
    /// Signer for payment transactions; absent in read-only mode
    signer: Option<Arc<dyn Signer + Send + Sync>>,
}

impl TettoClient {
    /// Constructs a new [`TettoClient`] from a base URL.
    ///
    /// This sets up the `./services` and `./services/call` endpoint URLs
    /// relative to the base. The client starts in read-only mode; attach a
    /// keypair with [`Self::with_signer`] to make paid calls.
    pub fn try_new(base_url: Url) -> Result<Self, TettoClientError> {
        let client = Client::new();
        let services_url =
            base_url
                .join("./services")
                .map_err(|e| TettoClientError::UrlParse {
                    context: "Failed to construct ./services URL",
                    source: e,
                })?;
        let call_url =
            base_url
                .join("./services/call")
                .map_err(|e| TettoClientError::UrlParse {
                    context: "Failed to construct ./services/call URL",
                    source: e,
                })?;
        Ok(Self {
            base_url,
            services_url,
            call_url,
            client,
            headers: HeaderMap::new(),
            timeout: None,
            signer: None,
        })
    }

    /// Returns the base URL used by this client.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the configured timeout, if any.
    pub fn timeout(&self) -> &Option<Duration> {
        &self.timeout
    }

    /// Attaches custom headers to all future requests.
    pub fn with_headers(&self, headers: HeaderMap) -> Self {
        let mut this = self.clone();
        this.headers = headers;
        this
    }

    /// Sets a timeout for all future requests.
    ///
    /// The timeout bounds both suspension points of a call: the build
    /// request and the submit request.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut this = self.clone();
        this.timeout = Some(timeout);
        this
    }

    /// Attaches a signing keypair, enabling paid calls.
    pub fn with_signer<S: Signer + Send + Sync + 'static>(&self, signer: S) -> Self {
        let mut this = self.clone();
        this.signer = Some(Arc::new(signer));
        this
    }

    /// Lists the services available in the marketplace.
    pub async fn list_services(&self) -> Result<Vec<Service>, TettoClientError> {
        const CONTEXT: &str = "GET /services";
        let response: ListServicesResponse = self.get_json(&self.services_url, CONTEXT).await?;
        if !response.ok {
            return Err(TettoClientError::Api {
                context: CONTEXT,
                message: response
                    .error
                    .unwrap_or_else(|| "failed to list services".to_string()),
            });
        }
        response.services.ok_or_else(|| {
            TettoClientError::MalformedResponse("ok list response missing services".to_string())
        })
    }

    /// Fetches catalog metadata for a single service.
    pub async fn get_service(&self, service_id: &str) -> Result<Service, TettoClientError> {
        const CONTEXT: &str = "GET /services/{id}";
        let url = self
            .base_url
            .join(&format!("./services/{service_id}"))
            .map_err(|e| TettoClientError::UrlParse {
                context: "Failed to construct ./services/{id} URL",
                source: e,
            })?;
        let response: GetServiceResponse = self.get_json(&url, CONTEXT).await?;
        if !response.ok {
            return Err(TettoClientError::Api {
                context: CONTEXT,
                message: response
                    .error
                    .unwrap_or_else(|| "service not found".to_string()),
            });
        }
        response.service.ok_or_else(|| {
            TettoClientError::MalformedResponse("ok service response missing service".to_string())
        })
    }

    /// Requests a payment intent for a validated service call.
    ///
    /// Sends exactly one build request carrying the payload and the signer's
    /// public identity. On a backend rejection
    /// ([`TettoClientError::Validation`]) no transaction has been built and
    /// no funds were at risk. Ambiguous transport failures are reported, not
    /// retried: a blind retry after a lost response could leave two unspent
    /// intents behind.
    pub async fn build_payment_intent(
        &self,
        service_id: &str,
        payload: Value,
        asset: Option<SettlementAsset>,
    ) -> Result<PaymentIntent, TettoClientError> {
        const CONTEXT: &str = "POST /services/{id}/build-transaction";
        let signer = self.signer.as_ref().ok_or(TettoClientError::SignerRequired)?;
        let url = self
            .base_url
            .join(&format!("./services/{service_id}/build-transaction"))
            .map_err(|e| TettoClientError::UrlParse {
                context: "Failed to construct ./services/{id}/build-transaction URL",
                source: e,
            })?;
        let request = BuildTransactionRequest {
            payer_identity: signer.pubkey().to_string(),
            settlement_asset: asset,
            payload,
        };
        let response: BuildTransactionResponse = self.post_json(&url, CONTEXT, &request).await?;
        if !response.ok {
            return Err(TettoClientError::Validation(
                response
                    .error
                    .unwrap_or_else(|| "payload rejected".to_string()),
            ));
        }
        let transaction = response.transaction.ok_or_else(|| {
            TettoClientError::MalformedResponse("ok build response missing transaction".to_string())
        })?;
        let id = response.payment_intent_id.ok_or_else(|| {
            TettoClientError::MalformedResponse(
                "ok build response missing paymentIntentId".to_string(),
            )
        })?;
        let expires_at = response.expires_at.ok_or_else(|| {
            TettoClientError::MalformedResponse("ok build response missing expiresAt".to_string())
        })?;
        #[cfg(feature = "telemetry")]
        tracing::debug!(
            intent_id = %id,
            amount_base = ?response.amount_base,
            asset = ?response.settlement_asset,
            "Payment intent built"
        );
        Ok(PaymentIntent {
            id,
            transaction,
            asset: response.settlement_asset,
            amount_base: response.amount_base,
            input_digest: response.input_digest,
            expires_at,
        })
    }

    /// Submits a signed transaction for settlement and service execution.
    ///
    /// This is the only point in the pipeline where real value is at risk.
    /// Outcomes are mapped strictly:
    ///
    /// - `ok: true` — settled and executed; returns the [`Invocation`].
    /// - `ok: false` — [`TettoClientError::SubmissionRejected`]; the intent
    ///   is dead and nothing was settled.
    /// - timeout, dropped connection, or a contract-violating reply after
    ///   dispatch — [`TettoClientError::SubmissionAmbiguous`]; settlement may
    ///   or may not have happened and the client must not retry blindly.
    pub async fn submit(
        &self,
        submission: SignedSubmission,
    ) -> Result<Invocation, TettoClientError> {
        const CONTEXT: &str = "POST /services/call";
        if submission.is_expired() {
            return Err(TettoClientError::IntentExpired {
                intent_id: submission.intent_id,
                expires_at: submission.expires_at,
            });
        }
        let request = SubmitRequest {
            payment_intent_id: submission.intent_id,
            signed_transaction: submission.signed_transaction,
        };
        let mut req = self.client.post(self.call_url.clone()).json(&request);
        for (key, value) in self.headers.iter() {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req.send().await.map_err(|e| {
            if e.is_connect() {
                // Never dispatched: no settlement could have happened.
                TettoClientError::Http {
                    context: CONTEXT,
                    source: e,
                }
            } else {
                TettoClientError::SubmissionAmbiguous {
                    context: CONTEXT,
                    detail: e.to_string(),
                }
            }
        })?;
        if http_response.status() != StatusCode::OK {
            let status = http_response.status();
            let body = http_response.text().await.unwrap_or_default();
            return Err(TettoClientError::SubmissionAmbiguous {
                context: CONTEXT,
                detail: format!("unexpected HTTP status {status}: {body}"),
            });
        }
        let response = http_response.json::<SubmitResponse>().await.map_err(|e| {
            TettoClientError::SubmissionAmbiguous {
                context: CONTEXT,
                detail: format!("unreadable response body: {e}"),
            }
        })?;
        if !response.ok {
            return Err(TettoClientError::SubmissionRejected(
                response
                    .error
                    .unwrap_or_else(|| "submission rejected".to_string()),
            ));
        }
        #[cfg(feature = "telemetry")]
        tracing::debug!(
            receipt_id = ?response.receipt_id,
            settlement_proof = ?response.settlement_proof,
            "Call settled and executed"
        );
        Ok(Invocation {
            output: response.output.unwrap_or(Value::Null),
            settlement_proof: response.settlement_proof,
            receipt_id: response.receipt_id,
        })
    }

    /// Calls a paid service end to end: build, sign, submit.
    ///
    /// A strictly forward pipeline with no retries. Failures before
    /// [`Self::submit`] dispatches are free of financial consequence by
    /// construction; see [`TettoClientError::is_ambiguous`] for the one
    /// outcome that is not.
    pub async fn call(
        &self,
        service_id: &str,
        payload: Value,
        asset: Option<SettlementAsset>,
    ) -> Result<Invocation, TettoClientError> {
        // No signer means no payment can be signed; fail before any network I/O.
        let signer = self.signer.clone().ok_or(TettoClientError::SignerRequired)?;
        let intent = self.build_payment_intent(service_id, payload, asset).await?;
        let submission = intent.into_submission(signer.as_ref())?;
        self.submit(submission).await
    }

    /// Generic POST helper that handles JSON serialization, error mapping and
    /// timeout application.
    ///
    /// `context` is a human-readable identifier used in error messages.
    async fn post_json<T, R>(
        &self,
        url: &Url,
        context: &'static str,
        payload: &T,
    ) -> Result<R, TettoClientError>
    where
        T: serde::Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let mut req = self.client.post(url.clone()).json(payload);
        for (key, value) in self.headers.iter() {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| TettoClientError::Http { context, source: e })?;
        if http_response.status() == StatusCode::OK {
            http_response
                .json::<R>()
                .await
                .map_err(|e| TettoClientError::JsonDeserialization { context, source: e })
        } else {
            let status = http_response.status();
            let body = http_response
                .text()
                .await
                .map_err(|e| TettoClientError::ResponseBodyRead { context, source: e })?;
            Err(TettoClientError::HttpStatus {
                context,
                status,
                body,
            })
        }
    }

    /// Generic GET helper; see [`Self::post_json`].
    async fn get_json<R>(&self, url: &Url, context: &'static str) -> Result<R, TettoClientError>
    where
        R: serde::de::DeserializeOwned,
    {
        let mut req = self.client.get(url.clone());
        for (key, value) in self.headers.iter() {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| TettoClientError::Http { context, source: e })?;
        if http_response.status() == StatusCode::OK {
            http_response
                .json::<R>()
                .await
                .map_err(|e| TettoClientError::JsonDeserialization { context, source: e })
        } else {
            let status = http_response.status();
            let body = http_response
                .text()
                .await
                .map_err(|e| TettoClientError::ResponseBodyRead { context, source: e })?;
            Err(TettoClientError::HttpStatus {
                context,
                status,
                body,
            })
        }
    }
}

/// Converts a string URL into a `TettoClient`, parsing the URL and calling
/// `try_new`.
impl TryFrom<&str> for TettoClient {
    type Error = TettoClientError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Normalize: strip trailing slashes and add a single trailing slash
        let mut normalized = value.trim_end_matches('/').to_string();
        normalized.push('/');
        let url = Url::parse(&normalized).map_err(|e| TettoClientError::UrlParse {
            context: "Failed to parse base url",
            source: e,
        })?;
        TettoClient::try_new(url)
    }
}

/// Converts a String URL into a `TettoClient`.
impl TryFrom<String> for TettoClient {
    type Error = TettoClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TettoClient::try_from(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionEnvelope;
    use serde_json::json;
    use solana_keypair::Keypair;
    use solana_message::{Message, VersionedMessage};
    use solana_pubkey::Pubkey;
    use solana_transaction::Instruction;
    use solana_transaction::versioned::VersionedTransaction;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Base64 unsigned envelope whose only required signer is `payer`, the
    /// shape the backend returns from a build request.
    fn unsigned_envelope_b64(payer: &Pubkey) -> String {
        let program_id = Pubkey::new_unique();
        let instruction = Instruction::new_with_bytes(program_id, b"pay", Vec::new());
        let message = Message::new(&[instruction], Some(payer));
        TransactionEnvelope::new(VersionedTransaction {
            signatures: vec![],
            message: VersionedMessage::Legacy(message),
        })
        .as_base64()
        .unwrap()
    }

    fn client_for(server: &MockServer, keypair: Keypair) -> TettoClient {
        TettoClient::try_from(server.uri())
            .unwrap()
            .with_signer(keypair)
    }

    fn build_success_body(transaction: &str, intent_id: &str, expires_at: &str) -> Value {
        json!({
            "ok": true,
            "transaction": transaction,
            "paymentIntentId": intent_id,
            "amountBase": 1_000_000,
            "settlementAsset": "USDC",
            "expiresAt": expires_at,
        })
    }

    #[tokio::test]
    async fn happy_path_builds_signs_and_submits() {
        let server = MockServer::start().await;
        let keypair = Keypair::new();
        let envelope = unsigned_envelope_b64(&keypair.pubkey());
        // Ed25519 signing is deterministic, so the exact signed wire form is
        // known up front.
        let signed_envelope = TransactionEnvelope::from_base64(&envelope)
            .unwrap()
            .sign(&keypair)
            .unwrap()
            .as_base64()
            .unwrap();

        Mock::given(method("POST"))
            .and(path("/services/svc_1/build-transaction"))
            .and(body_partial_json(json!({
                "payerIdentity": keypair.pubkey().to_string(),
                "payload": {"x": 1},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(build_success_body(
                &envelope,
                "pi_1",
                "2999-01-01T00:00:00Z",
            )))
            .expect(1)
            .mount(&server)
            .await;
        // The submit must echo the intent id and carry the signed form of
        // the exact envelope the build returned.
        Mock::given(method("POST"))
            .and(path("/services/call"))
            .and(body_partial_json(json!({
                "paymentIntentId": "pi_1",
                "signedTransaction": signed_envelope,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "output": {"x": 1},
                "settlementProof": "5igSig",
                "receiptId": "r1",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, keypair);
        let invocation = client
            .call("svc_1", json!({"x": 1}), Some(SettlementAsset::Usdc))
            .await
            .unwrap();
        assert_eq!(invocation.output, json!({"x": 1}));
        assert_eq!(invocation.settlement_proof.as_deref(), Some("5igSig"));
        assert_eq!(invocation.receipt_id.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn validation_failure_never_submits() {
        let server = MockServer::start().await;
        let keypair = Keypair::new();

        Mock::given(method("POST"))
            .and(path("/services/svc_1/build-transaction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": false,
                "error": "schema mismatch",
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/services/call"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, keypair);
        let error = client.call("svc_1", json!({"x": 1}), None).await.unwrap_err();
        match error {
            TettoClientError::Validation(message) => assert_eq!(message, "schema mismatch"),
            other => panic!("expected Validation, got {other:?}"),
        }
        server.verify().await;
    }

    #[tokio::test]
    async fn rejected_submission_is_not_ambiguous() {
        let server = MockServer::start().await;
        let keypair = Keypair::new();
        let envelope = unsigned_envelope_b64(&keypair.pubkey());

        Mock::given(method("POST"))
            .and(path("/services/svc_2/build-transaction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(build_success_body(
                &envelope,
                "pi_2",
                "2999-01-01T00:00:00Z",
            )))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/services/call"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": false,
                "error": "intent already consumed",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, keypair);
        let error = client.call("svc_2", json!({}), None).await.unwrap_err();
        assert!(!error.is_ambiguous());
        match error {
            TettoClientError::SubmissionRejected(message) => {
                assert_eq!(message, "intent already consumed")
            }
            other => panic!("expected SubmissionRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_timeout_is_ambiguous() {
        let server = MockServer::start().await;
        let keypair = Keypair::new();
        let envelope = unsigned_envelope_b64(&keypair.pubkey());

        Mock::given(method("POST"))
            .and(path("/services/svc_1/build-transaction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(build_success_body(
                &envelope,
                "pi_1",
                "2999-01-01T00:00:00Z",
            )))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/services/call"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, keypair).with_timeout(Duration::from_millis(100));
        let error = client.call("svc_1", json!({}), None).await.unwrap_err();
        assert!(error.is_ambiguous());
        assert!(matches!(
            error,
            TettoClientError::SubmissionAmbiguous { .. }
        ));
    }

    #[tokio::test]
    async fn expired_intent_fails_locally_without_submitting() {
        let server = MockServer::start().await;
        let keypair = Keypair::new();
        let envelope = unsigned_envelope_b64(&keypair.pubkey());

        Mock::given(method("POST"))
            .and(path("/services/svc_1/build-transaction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(build_success_body(
                &envelope,
                "pi_old",
                "2000-01-01T00:00:00Z",
            )))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/services/call"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, keypair);
        let error = client.call("svc_1", json!({}), None).await.unwrap_err();
        match error {
            TettoClientError::IntentExpired { intent_id, .. } => assert_eq!(intent_id, "pi_old"),
            other => panic!("expected IntentExpired, got {other:?}"),
        }
        server.verify().await;
    }

    #[tokio::test]
    async fn missing_signer_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = TettoClient::try_from(server.uri()).unwrap();
        let error = client.call("svc_1", json!({}), None).await.unwrap_err();
        assert!(matches!(error, TettoClientError::SignerRequired));
        server.verify().await;
    }

    #[tokio::test]
    async fn ok_build_response_without_transaction_is_malformed() {
        let server = MockServer::start().await;
        let keypair = Keypair::new();

        Mock::given(method("POST"))
            .and(path("/services/svc_1/build-transaction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "paymentIntentId": "pi_1",
                "expiresAt": "2999-01-01T00:00:00Z",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, keypair);
        let error = client.call("svc_1", json!({}), None).await.unwrap_err();
        assert!(matches!(error, TettoClientError::MalformedResponse(_)));
    }

    #[test]
    fn signing_preserves_the_message_region() {
        let keypair = Keypair::new();
        let unsigned_b64 = unsigned_envelope_b64(&keypair.pubkey());
        let message_before = TransactionEnvelope::from_base64(&unsigned_b64)
            .unwrap()
            .message_bytes();

        let intent = PaymentIntent {
            id: "pi_1".to_string(),
            transaction: unsigned_b64,
            asset: Some(SettlementAsset::Usdc),
            amount_base: Some(1_000_000),
            input_digest: None,
            expires_at: "2999-01-01T00:00:00Z".parse().unwrap(),
        };
        let submission = intent.into_submission(&keypair).unwrap();
        assert_eq!(submission.intent_id(), "pi_1");

        let signed = TransactionEnvelope::from_base64(submission.signed_transaction()).unwrap();
        assert_eq!(signed.message_bytes(), message_before);
        assert!(signed.is_fully_signed());
    }

    #[tokio::test]
    async fn lists_services_from_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "services": [{
                    "id": "svc_1",
                    "name": "Summarizer",
                    "description": "Summarizes text",
                    "priceUsd": 0.25,
                    "ownerWallet": "ownr11111111111111111111111111111111111111",
                    "feeBps": 1000,
                }],
            })))
            .mount(&server)
            .await;

        let client = TettoClient::try_from(server.uri()).unwrap();
        let services = client.list_services().await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].id, "svc_1");
        assert_eq!(services[0].price_usd, 0.25);
    }

    #[tokio::test]
    async fn catalog_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/missing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": false,
                "error": "service not found",
            })))
            .mount(&server)
            .await;

        let client = TettoClient::try_from(server.uri()).unwrap();
        let error = client.get_service("missing").await.unwrap_err();
        match error {
            TettoClientError::Api { message, .. } => assert_eq!(message, "service not found"),
            other => panic!("expected Api, got {other:?}"),
        }
    }
}
