#![allow(dead_code)]

pub use rfwconf_test_utils::init_tracing;
