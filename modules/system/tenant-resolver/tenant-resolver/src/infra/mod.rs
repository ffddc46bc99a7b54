pub mod dns;
pub mod storage;
