//! Survey Insight Capability
//!
//! The boundary to the remote generative model. The rest of the system
//! sees only the `GenerativeCapability` trait:
//! - A request is a model id, ordered content parts (text and inline media)
//!   and generation settings (output schema, thinking budget, aspect ratio)
//! - A response is an ordered list of text and inline-binary parts
//!
//! `GeminiClient` is the production implementation over HTTP.
//!
//! # Example
//!
//! ```rust,ignore
//! use insight_capability::{CapabilityRequest, GeminiClient, GeminiConfig, GenerativeCapability};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new(GeminiConfig::from_env())?;
//! let request = CapabilityRequest::new("gemini-3-flash-preview").with_text("Hello");
//! let response = client.generate(request).await?;
//! println!("{:?}", response.text());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod gemini;
pub mod provider;
pub mod request;
pub mod response;

pub use error::{parse_http_error, CapabilityError};
pub use gemini::{GeminiClient, GeminiConfig};
pub use provider::GenerativeCapability;
pub use request::{CapabilityRequest, ContentPart, GenerationConfig};
pub use response::{CapabilityResponse, ResponsePart};
