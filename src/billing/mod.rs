mod client;
#[cfg(test)]
pub(crate) mod testing;
mod transport;

pub use client::{
    validate_endpoint, BillingClient, Credentials, DEFAULT_API_BASE, DEFAULT_CONTRACT_CODE,
};
pub use transport::{HttpTransport, ReqwestTransport};
