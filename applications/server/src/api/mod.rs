/// API route modules
pub mod health;
pub mod records;
pub mod webhook;
