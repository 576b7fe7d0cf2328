pub mod fake_random;
pub mod fake_store;
mod helper;
