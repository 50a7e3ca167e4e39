// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Storage accounts, categories and family members. Deleting any of these
//! leaves transactions that reference them untouched.

pub mod accounts;
pub mod categories;
pub mod members;

/// Trims and drops empty optional text, the way form input arrives.
pub(crate) fn clean(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
