pub mod cache;
pub mod custom_domain;
pub mod error;
pub mod host;
pub mod local_client;
pub mod rate_limit;
pub mod repo;
pub mod reserved;
pub mod service;
pub mod verification;

pub use error::DomainError;
pub use local_client::TenantResolverLocalClient;
pub use service::Service;

#[cfg(test)]
mod service_test;
