pub mod error;
pub mod local_client;
pub mod lookup;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;


pub use error::DomainError;
pub use local_client::AccountLockoutLocalClient;
pub use model::AccountLockState;
pub use service::Service;
