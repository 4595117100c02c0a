//! Integration tests for p2p-recorder

mod config_test;
mod controller_test;
mod store_test;
