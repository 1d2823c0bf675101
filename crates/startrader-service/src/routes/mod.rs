pub mod chat;
pub mod cleanup;
pub mod tools;
