pub mod dns;
pub mod native;
pub mod storage;
pub mod system;
