//! Handler-level integration tests

pub mod admin_test;
pub mod agree_test;
