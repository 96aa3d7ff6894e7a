// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `probe list` command - List registered components.

use probekit_core::{ComponentId, COMPONENTS_END};
use serde::Serialize;

#[derive(Serialize)]
struct Entry {
    id: usize,
    name: &'static str,
    available: bool,
    internal: bool,
    requires: Vec<&'static str>,
    aliases: &'static [&'static str],
    description: &'static str,
}

impl Entry {
    fn new(id: ComponentId) -> Self {
        Self {
            id: id.index(),
            name: id.name(),
            available: id.available(),
            internal: id.is_internal(),
            requires: id.requires().iter().map(|b| b.name()).collect(),
            aliases: id.aliases(),
            description: id.description(),
        }
    }
}

pub fn execute(all: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let entries: Vec<Entry> = ComponentId::ALL
        .iter()
        .copied()
        .filter(|id| all || id.available())
        .map(Entry::new)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No components available in this build.");
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════════════════════════════╗");
    println!("║                            REGISTERED COMPONENTS                             ║");
    println!("╠════╦═══════════════════════════╦═══════════╦════════════════╦═══════════════╣");
    println!("║ ID ║ Name                      ║ Available ║ Requires       ║ Aliases       ║");
    println!("╠════╬═══════════════════════════╬═══════════╬════════════════╬═══════════════╣");

    for entry in &entries {
        let available = if entry.internal {
            "internal"
        } else if entry.available {
            "yes"
        } else {
            "no"
        };
        let requires = if entry.requires.is_empty() {
            "-".to_string()
        } else {
            entry.requires.join("+")
        };
        let aliases = entry.aliases.first().copied().unwrap_or("-");

        println!(
            "║ {:<2} ║ {:<25} ║ {:<9} ║ {:<14} ║ {:<13} ║",
            entry.id, entry.name, available, requires, aliases
        );
    }

    println!("╚════╩═══════════════════════════╩═══════════╩════════════════╩═══════════════╝");
    println!();
    println!(
        "Total: {} component(s) shown, {} public",
        entries.len(),
        COMPONENTS_END
    );

    Ok(())
}
