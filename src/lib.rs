// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod db;
pub mod errors;
pub mod gold;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod registry;
pub mod settings;
pub mod stats;
pub mod utils;
