//! # b2brouter - Async client for the B2BRouter API
//!
//! A client for the B2BRouter invoicing and tax-compliance (VeriFactu,
//! TicketBAI) REST API, built on top of `reqwest`. It authenticates requests,
//! retries connection failures with exponential backoff, maps error statuses to
//! a typed error and wraps list endpoints in paginated collections.
//!
//! ## Quick Start
//!
//! ```no_run
//! use b2brouter::B2BRouterClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), b2brouter::Error> {
//!     let client = B2BRouterClient::builder("my-api-key")
//!         .api_base("https://api.b2brouter.net")
//!         .build()?;
//!
//!     // Create an invoice
//!     let invoice = client
//!         .invoices()
//!         .create("my-account", json!({
//!             "invoice": {"number": "INV-2025-001", "contact_id": 123}
//!         }))
//!         .await?;
//!     println!("Created invoice {}", invoice["id"]);
//!
//!     // Walk every page of tax reports
//!     let mut offset = 0;
//!     loop {
//!         let page = client
//!             .tax_reports()
//!             .list("my-account", json!({"limit": 100, "offset": offset}))
//!             .await?;
//!         for report in &page {
//!             println!("{} {}", report["id"], report["state"]);
//!         }
//!         match page.next_offset() {
//!             Some(next) => offset = next,
//!             None => break,
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Request pipeline
//!
//! Every call goes through the same steps:
//!
//! 1. [`request::PreparedRequest`] builds the URL, the `X-B2B-API-Key` and
//!    `X-B2B-API-Version` headers, and puts parameters in the query string
//!    (GET, DELETE) or the JSON body (POST, PUT, PATCH).
//! 2. [`retry::RetryingTransport`] sends it through a [`transport::Transport`],
//!    retrying only connection failures, never a received status.
//! 3. [`response::classify`] decodes the body or turns an error status into
//!    the matching [`Error`] variant.
//!
//! ## Error Handling
//!
//! ```no_run
//! use b2brouter::{B2BRouterClient, Error};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = B2BRouterClient::new("my-api-key")?;
//! match client.tax_reports().retrieve("12345", json!({})).await {
//!     Ok(report) => println!("State: {}", report["state"]),
//!     Err(Error::NotFound(err)) => eprintln!("Missing: {}", err.message),
//!     Err(Error::InvalidRequest(err)) => {
//!         eprintln!("Rejected: {} {:?}", err.message, err.json_body);
//!     }
//!     Err(e) => eprintln!("Other error: {} (request id {:?})", e, e.request_id()),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod collection;
mod error;
pub mod request;
pub mod response;
pub mod retry;
pub mod service;
pub mod transport;

pub use client::{
    B2BRouterClient, ClientBuilder, DEFAULT_API_BASE, DEFAULT_API_VERSION, DEFAULT_TIMEOUT,
};
pub use collection::Collection;
pub use error::{ApiError, Error, Result, REQUEST_ID_HEADER};
pub use retry::RetryPolicy;
pub use transport::{RawResponse, Transport};
