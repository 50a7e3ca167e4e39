// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Once;

static INIT: Once = Once::new();

pub const LOG_ENV: &str = "TABUNGAN_LOG";

/// Installs the stderr subscriber. Filter comes from `TABUNGAN_LOG`,
/// defaulting to warnings from this crate only. Safe to call repeatedly.
pub fn init() {
    INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("tabungan=warn"));

        // A subscriber may already be installed by an embedding binary.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
    }
}
