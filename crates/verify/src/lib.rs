//! Source verification against Etherscan-compatible explorers.
//!
//! Submits a solc standard JSON input for a deployed contract and polls the
//! explorer until it reports a final verdict.

use alloy_primitives::{hex, Address, Bytes};
use config::VerificationProfile;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, info, warn};

/// Timeout for each HTTP request to the explorer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Explorer API is unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Explorer returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Explorer has not indexed the contract yet: {0}")]
    NotIndexed(String),

    #[error("Verification request rejected: {0}")]
    Rejected(String),

    #[error("Verification pending")]
    Pending,

    #[error("Verification failed: {0}")]
    Failed(String),

    #[error("Invalid standard JSON input: {0}")]
    Input(#[from] serde_json::Error),
}

impl VerifyError {
    const fn is_not_indexed(&self) -> bool {
        matches!(self, Self::NotIndexed(_))
    }

    const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// What to verify.
#[derive(Debug, Clone)]
pub struct VerifyRequest {
    /// Deployed contract address
    pub address: Address,
    /// Fully qualified name, e.g. `contracts/Token.sol:Token`
    pub contract_name: String,
    /// Long compiler version, e.g. `0.8.18+commit.87f61d96`
    pub compiler_version: String,
    /// solc standard JSON input
    pub input: Value,
    /// ABI-encoded constructor arguments
    pub constructor_args: Bytes,
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Queued under this GUID
    Queued(String),
    AlreadyVerified,
}

/// Final verification verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyStatus {
    Verified,
    AlreadyVerified,
}

/// Etherscan-style `{status, message, result}` envelope.
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    message: String,
    result: Value,
}

impl ExplorerResponse {
    fn result_text(&self) -> String {
        match &self.result {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Verification client for one network.
pub struct Verifier {
    client: reqwest::Client,
    profile: VerificationProfile,
    attempts: usize,
}

impl Verifier {
    pub fn new(profile: VerificationProfile) -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            profile,
            attempts: 10,
        })
    }

    /// Override how many times submission and status checks are retried.
    pub const fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    pub const fn profile(&self) -> &VerificationProfile {
        &self.profile
    }

    /// Submit sources and wait for the explorer's verdict.
    pub async fn verify(&self, request: &VerifyRequest) -> Result<VerifyStatus, VerifyError> {
        let submission = RetryIf::spawn(
            self.backoff(),
            || self.submit(request),
            |e: &VerifyError| {
                if e.is_not_indexed() {
                    warn!(address = %request.address, "Contract not indexed yet, will retry");
                }
                e.is_not_indexed()
            },
        )
        .await?;

        let guid = match submission {
            Submission::Queued(guid) => guid,
            Submission::AlreadyVerified => return Ok(VerifyStatus::AlreadyVerified),
        };
        info!(%guid, explorer = %self.profile.explorer, "Verification submitted");

        RetryIf::spawn(
            self.backoff(),
            || self.check_status(&guid),
            |e: &VerifyError| {
                if e.is_pending() {
                    debug!(%guid, "Verification pending");
                }
                e.is_pending()
            },
        )
        .await
    }

    /// Submit sources for verification.
    pub async fn submit(&self, request: &VerifyRequest) -> Result<Submission, VerifyError> {
        let source = serde_json::to_string(&request.input)?;
        let address = request.address.to_string();
        let compiler = format!("v{}", request.compiler_version.trim_start_matches('v'));
        let constructor_args = hex::encode(&request.constructor_args);

        let form = [
            ("apikey", self.profile.api_key.as_str()),
            ("module", "contract"),
            ("action", "verifysourcecode"),
            ("contractaddress", address.as_str()),
            ("sourceCode", source.as_str()),
            ("codeformat", "solidity-standard-json-input"),
            ("contractname", request.contract_name.as_str()),
            ("compilerversion", compiler.as_str()),
            // sic, the API spells it this way
            ("constructorArguements", constructor_args.as_str()),
        ];

        let response = self
            .client
            .post(&self.profile.api_url)
            .form(&form)
            .send()
            .await?;

        let response = parse_response(response).await?;
        interpret_submission(&response)
    }

    /// Check a submission's status. Returns [`VerifyError::Pending`] while queued.
    pub async fn check_status(&self, guid: &str) -> Result<VerifyStatus, VerifyError> {
        let response = self
            .client
            .get(&self.profile.api_url)
            .query(&[
                ("apikey", self.profile.api_key.as_str()),
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
            ])
            .send()
            .await?;

        let response = parse_response(response).await?;
        interpret_status(&response)
    }

    fn backoff(&self) -> impl Iterator<Item = Duration> {
        // 2s, 4s, 8s, then every 10s
        ExponentialBackoff::from_millis(2)
            .factor(1000)
            .max_delay(Duration::from_secs(10))
            .take(self.attempts)
    }
}

async fn parse_response(response: reqwest::Response) -> Result<ExplorerResponse, VerifyError> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown".to_string());
        return Err(VerifyError::Api { status, body });
    }

    Ok(response.json::<ExplorerResponse>().await?)
}

fn interpret_submission(response: &ExplorerResponse) -> Result<Submission, VerifyError> {
    let result = response.result_text();

    if response.status == "1" {
        return Ok(Submission::Queued(result));
    }

    let lower = result.to_lowercase();
    if lower.contains("already verified") {
        Ok(Submission::AlreadyVerified)
    } else if lower.contains("unable to locate contractcode") {
        Err(VerifyError::NotIndexed(result))
    } else {
        Err(VerifyError::Rejected(format!("{}: {}", response.message, result)))
    }
}

fn interpret_status(response: &ExplorerResponse) -> Result<VerifyStatus, VerifyError> {
    let result = response.result_text();
    let lower = result.to_lowercase();

    if lower.contains("pending in queue") {
        Err(VerifyError::Pending)
    } else if lower.contains("already verified") {
        Ok(VerifyStatus::AlreadyVerified)
    } else if response.status == "1" && lower.contains("pass") {
        Ok(VerifyStatus::Verified)
    } else {
        Err(VerifyError::Failed(result))
    }
}
