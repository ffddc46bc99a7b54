pub mod account;
pub mod revoked_token;
