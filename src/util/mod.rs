pub mod handler;
pub mod message;
pub mod result;
pub mod time;
pub mod validate;
