//! Scaffold command implementation

use std::path::Path;

use anyhow::{Context, Result};
use fin_core::scaffold::{scaffold_domain, ScaffoldOptions, WriteAction};

pub fn cmd_scaffold(
    domain: &str,
    dest_dir: &Path,
    entity: Option<String>,
    table: Option<String>,
    include_tenant: bool,
    overwrite: bool,
) -> Result<()> {
    let options = ScaffoldOptions {
        entity,
        table,
        include_tenant,
        overwrite,
    };

    let outcomes = scaffold_domain(domain, dest_dir, &options)
        .with_context(|| format!("Failed to scaffold {}", domain))?;

    for outcome in &outcomes {
        match outcome.action {
            WriteAction::Wrote => println!("   ✏️  wrote   {}", outcome.path.display()),
            WriteAction::Skipped => println!(
                "   ⏭️  skipped {} ({})",
                outcome.path.display(),
                outcome.reason.as_deref().unwrap_or("exists")
            ),
        }
    }

    let written = outcomes
        .iter()
        .filter(|o| o.action == WriteAction::Wrote)
        .count();
    println!("✅ Scaffolded {}: {} file(s) written", domain, written);

    Ok(())
}
