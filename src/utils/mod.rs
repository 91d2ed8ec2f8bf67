pub mod cookie;
pub mod crypto;
pub mod signature;
pub mod time;
pub mod token;
pub mod upload;
pub mod validation;
