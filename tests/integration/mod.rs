//! Integration tests for protobatch

mod cli_generate;
mod config_loading;
mod test_utils;
