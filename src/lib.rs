//! Client library for the Tetto paid-service marketplace.
//!
//! Tetto lets an agent invoke a remote service and pay for it atomically with
//! a Solana transaction. The protocol is two-phase: the backend validates the
//! request and returns an unsigned payment transaction bound to a single-use
//! payment intent, the client signs it locally, and the signed transaction is
//! submitted for settlement and execution in one step. The private key never
//! leaves the client.
//!
//! ```rust,ignore
//! use tetto_client::{TettoClient, wallet};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let keypair = wallet::load_keypair_from_file("~/.config/solana/id.json")?;
//!     let client = TettoClient::try_from("https://tetto.io/api")?
//!         .with_signer(keypair);
//!
//!     let invocation = client
//!         .call("svc_summarizer", json!({"text": "A long article"}), None)
//!         .await?;
//!     println!("{}", invocation.output);
//!     Ok(())
//! }
//! ```
//!
//! For lower-level control, [`TettoClient::build_payment_intent`],
//! [`PaymentIntent::into_submission`] and [`TettoClient::submit`] expose the
//! individual protocol steps. Crate feature `telemetry` enables `tracing`
//! instrumentation of the pipeline.

pub mod client;
pub mod error;
pub mod proto;
pub mod transaction;
pub mod wallet;

pub use client::{Invocation, PaymentIntent, SignedSubmission, TettoClient};
pub use error::TettoClientError;
pub use proto::{Service, SettlementAsset};
pub use wallet::{
    generate_keypair, load_keypair_from_env, load_keypair_from_env_var, load_keypair_from_file,
};
