//! Client backends.
//!
//! Each backend owns a native client and implements `Client` by supplying
//! the execute step to `client::send_with`.

#[cfg(feature = "ureq-client")]
mod ureq_client;
#[cfg(feature = "ureq-client")]
pub use ureq_client::UreqClient;

#[cfg(feature = "ureq-client")]
mod fluent_client;
#[cfg(feature = "ureq-client")]
pub use fluent_client::FluentClient;

#[cfg(feature = "reqwest-client")]
mod reqwest_client;
#[cfg(feature = "reqwest-client")]
pub use reqwest_client::ReqwestClient;
