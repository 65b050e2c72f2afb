//! Database integration tests
//!
//! Need a disposable PostgreSQL database:
//! `DATABASE_URL=postgres://... cargo test --test integration -- --ignored`

mod catalog;
mod common;
mod loans;
