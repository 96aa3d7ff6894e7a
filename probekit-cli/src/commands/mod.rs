// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

use probekit_core::{ConfigLoader, ProbeConfig, ProbeResult};

pub mod features;
pub mod list;
pub mod overhead;
pub mod validate;

/// Load the file if one was given, otherwise fall back to the environment.
pub fn load_config(path: Option<&str>) -> ProbeResult<ProbeConfig> {
    match path {
        Some(path) => {
            let mut config = ConfigLoader::load_file(path)?;
            config.apply_env()?;
            Ok(config)
        }
        None => ProbeConfig::from_env(),
    }
}
