// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `probe validate` command - Validate configuration file.
//!
//! Loads the file, then runs every selection it contains through the
//! selector so unknown or unavailable names show up before a real run.

use probekit_core::{
    ComponentList, ComponentTypes, ConfigLoader, LeafComponents, ProbeConfig, SelectionRequest,
    Selector,
};

pub fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            let mut rejected = 0;
            rejected += report::<ComponentTypes>(&config, "components", &config.components);
            let bundles = &config.user_bundles;
            for (scope, request) in [
                ("user_bundles.global", &bundles.global),
                ("user_bundles.trace", &bundles.trace),
                ("user_bundles.profiler", &bundles.profiler),
                ("user_bundles.mpip", &bundles.mpip),
                ("user_bundles.ompt", &bundles.ompt),
                ("user_bundles.ncclp", &bundles.ncclp),
            ] {
                rejected += report::<LeafComponents>(&config, scope, request);
            }
            println!();
            let events: Vec<&str> = config.hw_counters.events.iter().map(|e| e.name()).collect();
            println!("Hardware counter events: {}", events.join(", "));
            if rejected > 0 {
                println!();
                println!("{} selection entries will be skipped at runtime", rejected);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

fn report<L: ComponentList>(config: &ProbeConfig, field: &str, request: &SelectionRequest) -> usize {
    if request.is_empty() {
        println!("{}: (empty)", field);
        return 0;
    }

    let selection = Selector::new(config).select::<L>(field, request);
    let accepted: Vec<&str> = selection
        .bundle
        .active_ids()
        .into_iter()
        .map(|id| id.name())
        .collect();
    println!("{}: [{}]", field, accepted.join(", "));
    for rejection in &selection.rejected {
        println!("  ✗ {}", rejection);
    }
    selection.rejected.len()
}
