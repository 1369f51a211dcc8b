//! Code generation from embedded templates
//!
//! Host applications use this to drop persistence models and DDL for the
//! budgets or goals domains into their own source tree. Templates use
//! `${name}` placeholders; placeholders without a value are left as-is.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Built-in templates: (domain, file, contents)
const TEMPLATES: &[(&str, &str, &str)] = &[
    (
        "budgets",
        "models.rs.tmpl",
        include_str!("../templates/budgets/models.rs.tmpl"),
    ),
    (
        "budgets",
        "schema.sql.tmpl",
        include_str!("../templates/budgets/schema.sql.tmpl"),
    ),
    (
        "budgets",
        "mod.rs.tmpl",
        include_str!("../templates/budgets/mod.rs.tmpl"),
    ),
    (
        "goals",
        "models.rs.tmpl",
        include_str!("../templates/goals/models.rs.tmpl"),
    ),
    (
        "goals",
        "schema.sql.tmpl",
        include_str!("../templates/goals/schema.sql.tmpl"),
    ),
    (
        "goals",
        "mod.rs.tmpl",
        include_str!("../templates/goals/mod.rs.tmpl"),
    ),
];

/// Domains with built-in templates
pub const DOMAINS: &[&str] = &["budgets", "goals"];

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"))
}

/// Substitute `${name}` placeholders, leaving unknown names untouched
pub fn render_template(template: &str, subs: &HashMap<String, String>) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures| match subs.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Render one of the embedded templates
pub fn render_builtin(domain: &str, file: &str, subs: &HashMap<String, String>) -> Result<String> {
    let (_, _, contents) = TEMPLATES
        .iter()
        .find(|(d, f, _)| *d == domain && *f == file)
        .ok_or_else(|| Error::NotFound(format!("Template {}/{}", domain, file)))?;
    Ok(render_template(contents, subs))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    Wrote,
    Skipped,
}

/// Result of writing one generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub action: WriteAction,
    /// Absolute path of the target file
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Write `content` to `dest`, creating parent directories
///
/// An existing file is left untouched unless `overwrite` is set.
pub fn write(dest: &Path, content: &str, overwrite: bool) -> Result<WriteOutcome> {
    if dest.exists() && !overwrite {
        debug!(path = %dest.display(), "Skipping existing file");
        return Ok(WriteOutcome {
            action: WriteAction::Skipped,
            path: fs::canonicalize(dest)?,
            reason: Some("exists".to_string()),
        });
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, content)?;

    Ok(WriteOutcome {
        action: WriteAction::Wrote,
        path: fs::canonicalize(dest)?,
        reason: None,
    })
}

/// Write `dir/mod.rs`
///
/// With `paired`, `content` is a whitespace or comma separated list of module
/// names and each becomes `pub mod x;` plus `pub use x::*;`. Otherwise
/// `content` is written verbatim (a bare doc comment when absent).
pub fn ensure_mod_rs(
    dir: &Path,
    overwrite: bool,
    paired: bool,
    content: Option<&str>,
) -> Result<WriteOutcome> {
    let body = if paired {
        let modules: Vec<&str> = content
            .unwrap_or("")
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|m| !m.is_empty())
            .collect();

        let mut body = String::new();
        for module in &modules {
            body.push_str(&format!("pub mod {};\n", module));
        }
        if !modules.is_empty() {
            body.push('\n');
        }
        for module in &modules {
            body.push_str(&format!("pub use {}::*;\n", module));
        }
        body
    } else {
        content.unwrap_or("//! Generated module\n").to_string()
    };

    write(&dir.join("mod.rs"), &body, overwrite)
}

/// Options for [`scaffold_domain`]
#[derive(Debug, Clone, Default)]
pub struct ScaffoldOptions {
    /// Struct name; defaults to the domain's singular form
    pub entity: Option<String>,
    /// Table name; defaults to the domain name
    pub table: Option<String>,
    /// Add a `tenant_id` field and column
    pub include_tenant: bool,
    pub overwrite: bool,
}

fn default_entity(domain: &str) -> &'static str {
    match domain {
        "goals" => "Goal",
        _ => "Budget",
    }
}

/// Generate models, schema and `mod.rs` for a domain into `dest_dir`
pub fn scaffold_domain(
    domain: &str,
    dest_dir: &Path,
    options: &ScaffoldOptions,
) -> Result<Vec<WriteOutcome>> {
    if !DOMAINS.contains(&domain) {
        return Err(Error::InvalidData(format!(
            "Unknown scaffold domain: {} (expected one of: {})",
            domain,
            DOMAINS.join(", ")
        )));
    }

    let entity = options
        .entity
        .clone()
        .unwrap_or_else(|| default_entity(domain).to_string());
    let table = options.table.clone().unwrap_or_else(|| domain.to_string());

    let (tenant_field, tenant_column) = if options.include_tenant {
        (
            "    pub tenant_id: String,".to_string(),
            "    tenant_id TEXT NOT NULL,".to_string(),
        )
    } else {
        (String::new(), String::new())
    };

    let subs: HashMap<String, String> = HashMap::from([
        ("Entity".to_string(), entity.clone()),
        ("table_name".to_string(), table.clone()),
        ("tenant_field".to_string(), tenant_field),
        ("tenant_column".to_string(), tenant_column),
    ]);

    let mut outcomes = Vec::with_capacity(3);
    outcomes.push(write(
        &dest_dir.join("models.rs"),
        &render_builtin(domain, "models.rs.tmpl", &subs)?,
        options.overwrite,
    )?);
    outcomes.push(write(
        &dest_dir.join("schema.sql"),
        &render_builtin(domain, "schema.sql.tmpl", &subs)?,
        options.overwrite,
    )?);
    let mod_rs = render_builtin(domain, "mod.rs.tmpl", &subs)?;
    outcomes.push(ensure_mod_rs(
        dest_dir,
        options.overwrite,
        false,
        Some(&mod_rs),
    )?);

    let written = outcomes
        .iter()
        .filter(|o| o.action == WriteAction::Wrote)
        .count();
    info!(
        domain,
        entity = %entity,
        table = %table,
        written,
        skipped = outcomes.len() - written,
        "Scaffolded domain"
    );

    Ok(outcomes)
}
