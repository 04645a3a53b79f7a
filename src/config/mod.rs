//! The configuration rewriter.
//!
//! Edits `.tf` source text in place: only the byte ranges that need to change
//! are replaced, so comments, layout and unrelated attributes come through
//! byte-for-byte.

mod edits;
mod rules;

pub use edits::{TextEdit, apply_edits, merge_spans, removal_extent};

use crate::conditions::{self, Diagnostic};
use crate::error::ParseError;
use crate::hcl::{self, Block};
use edits::{line_indent, newline};
use serde::Serialize;

/// v4 resource types whose name changed in v5.
pub const LEGACY_RESOURCE_TYPES: &[(&str, &str)] = &[
    ("cloudflare_access_policy", "cloudflare_zero_trust_access_policy"),
    ("cloudflare_access_group", "cloudflare_zero_trust_access_group"),
];

/// Resource types whose condition lists are expanded.
pub const CONDITION_RESOURCE_TYPES: &[&str] = &[
    "cloudflare_zero_trust_access_policy",
    "cloudflare_zero_trust_access_group",
];

pub const CONDITION_ATTRIBUTES: &[&str] = &["include", "exclude", "require"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigReport {
    pub resources_renamed: usize,
    pub references_renamed: usize,
    pub attributes_rewritten: usize,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigMigration {
    pub output: String,
    pub report: ConfigReport,
}

impl ConfigMigration {
    pub fn changed(&self) -> bool {
        self.report.resources_renamed > 0
            || self.report.references_renamed > 0
            || self.report.attributes_rewritten > 0
    }
}

/// Migrates one configuration document.
///
/// Legacy resource types are renamed first (labels and `type.name`
/// references, including those inside `${...}` interpolations), then the condition attributes of every access policy and
/// group are expanded. Running this over its own output changes nothing.
pub fn migrate_config(src: &str) -> Result<ConfigMigration, ParseError> {
    let mut report = ConfigReport::default();
    let renamed = rename_legacy_types(src, &mut report)?;

    let body = hcl::parse_body(&renamed)?;
    let mut edits = Vec::new();
    for block in body.blocks() {
        let Some(label) = block.resource_type() else {
            continue;
        };
        if !CONDITION_RESOURCE_TYPES.contains(&label.value.as_str()) {
            continue;
        }
        let address = format!(
            "{}.{}",
            label.value,
            block.resource_name().unwrap_or_default()
        );
        for name in CONDITION_ATTRIBUTES {
            edits.extend(rewrite_conditions(&renamed, block, name, &address, &mut report));
        }
    }

    let output = if edits.is_empty() {
        renamed
    } else {
        apply_edits(&renamed, edits)
    };
    Ok(ConfigMigration { output, report })
}

fn rename_legacy_types(src: &str, report: &mut ConfigReport) -> Result<String, ParseError> {
    let document = hcl::parse_document(src)?;
    let mut edits = Vec::new();

    for block in document.body.blocks() {
        let Some(label) = block.resource_type() else {
            continue;
        };
        if let Some(new_type) = legacy_target(&label.value) {
            log::debug!("Renaming resource type {} to {}", label.value, new_type);
            edits.push(TextEdit::replace(label.span, hcl::quote(new_type)));
            report.resources_renamed += 1;
        }
    }

    // `data.<type>.<name>` roots at `data` and is left alone.
    for reference in &document.references {
        if let Some(new_type) = legacy_target(&reference.root) {
            log::debug!(
                "Renaming reference {}.{} to {}.{}",
                reference.root,
                reference.name,
                new_type,
                reference.name
            );
            edits.push(TextEdit::replace(reference.span, new_type));
            report.references_renamed += 1;
        }
    }

    if edits.is_empty() {
        return Ok(src.to_string());
    }
    Ok(apply_edits(src, edits))
}

fn legacy_target(resource_type: &str) -> Option<&'static str> {
    LEGACY_RESOURCE_TYPES
        .iter()
        .find(|(old, _)| *old == resource_type)
        .map(|(_, new)| *new)
}

/// Builds the edits for one condition attribute of a resource, in either
/// attribute form (`include = [...]`) or v4 block form (`include { ... }`).
fn rewrite_conditions(
    src: &str,
    block: &Block,
    name: &str,
    address: &str,
    report: &mut ConfigReport,
) -> Vec<TextEdit> {
    let location = format!("{}.{}", address, name);

    if let Some(attr) = block.body.get_attribute(name) {
        let Some(elements) = rules::elements_from_expression(&attr.value) else {
            return Vec::new();
        };
        let expansion = conditions::expand_list(&elements);
        record_diagnostics(expansion.diagnostics.clone(), &location, report);
        if expansion.produced == 0 {
            return Vec::new();
        }

        let indent = line_indent(src, attr.span.start);
        log::debug!(
            "Expanded {} into {} conditions and {} plan-time conditions",
            location,
            expansion.elements.len(),
            expansion.deferred.len()
        );
        report.attributes_rewritten += 1;
        return vec![TextEdit::replace(
            attr.value_span,
            rules::render_conditions(&expansion, indent, newline(src)),
        )];
    }

    let blocks: Vec<&Block> = block.body.get_blocks(name).collect();
    let Some(first) = blocks.first() else {
        return Vec::new();
    };
    let expansion = conditions::expand_list(&rules::elements_from_blocks(&blocks));
    record_diagnostics(expansion.diagnostics.clone(), &location, report);
    if expansion.produced == 0 {
        return Vec::new();
    }

    let indent = line_indent(src, first.span.start);
    log::debug!(
        "Lifted {} {} block(s) into {} conditions",
        blocks.len(),
        location,
        expansion.elements.len()
    );
    report.attributes_rewritten += 1;

    let mut edits = vec![TextEdit::replace(
        first.span,
        format!(
            "{} = {}",
            name,
            rules::render_conditions(&expansion, indent, newline(src))
        ),
    )];
    let removals = blocks[1..]
        .iter()
        .map(|block| removal_extent(src, block.span))
        .collect();
    edits.extend(merge_spans(removals).into_iter().map(TextEdit::delete));
    edits
}

fn record_diagnostics(diagnostics: Vec<Diagnostic>, location: &str, report: &mut ConfigReport) {
    for diagnostic in diagnostics {
        let diagnostic = diagnostic.at(location);
        log::warn!("{}", diagnostic);
        report.diagnostics.push(diagnostic);
    }
}
