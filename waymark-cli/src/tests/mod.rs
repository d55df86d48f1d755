//! Shared test harness modules for the Waymark CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
use crate::import::{
    ImportConfig, ImportSummary, config_from_layers_for_test, execute_import, run_import_with,
};

mod helpers;
mod steps;
