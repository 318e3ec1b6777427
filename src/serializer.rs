//! Snapshot rendering.
//!
//! The output is loaded downstream as code, so its shape is fixed:
//!
//! ```text
//! exports.Learnsets = {
//! 	missingno: {learnset: {}},
//! 	bulbasaur: {learnset: {growl: ["7L003"], "return": ["7M"]}},
//! };
//! ```
//!
//! (without the trailing comma on the last species). Species appear in dex
//! order with non-positive indices first, moves appear alphabetically, and
//! keys that would not parse as bare identifiers are quoted.

use std::borrow::Cow;
use std::cmp::Ordering;

use schema::{dex_index, Learnset, Snapshot, SpeciesIndex};

/// ECMAScript reserved words. Bare keys matching one of these are quoted.
pub const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

fn needs_quotes(key: &str) -> bool {
    match key.chars().next() {
        None => true,
        Some(first) if first.is_ascii_digit() => true,
        Some(_) => {
            RESERVED_WORDS.contains(&key)
                || !key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
    }
}

/// An object key, quoted only when a bare identifier would not parse.
pub fn object_key(key: &str) -> serde_json::Result<Cow<'_, str>> {
    if needs_quotes(key) {
        Ok(Cow::Owned(serde_json::to_string(key)?))
    } else {
        Ok(Cow::Borrowed(key))
    }
}

/// Non-positive indices first, descending; then positive indices, ascending.
pub fn compare_dex_index(a: i32, b: i32) -> Ordering {
    match (a > 0, b > 0) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, false) => b.cmp(&a),
        (true, true) => a.cmp(&b),
    }
}

/// Species ids of `snapshot` in emission order. Equal indices fall back to id order.
pub fn emission_order<'s>(snapshot: &'s Snapshot, species: &SpeciesIndex) -> Vec<&'s str> {
    let mut ids: Vec<&str> = snapshot.keys().map(String::as_str).collect();
    // Keys arrive sorted, and the sort is stable, so ties stay in id order.
    ids.sort_by(|a, b| compare_dex_index(dex_index(species, a), dex_index(species, b)));
    ids
}

fn render_learnset(learnset: &Learnset) -> serde_json::Result<String> {
    let moves = learnset
        .iter()
        .map(|(move_id, entries)| {
            Ok(format!(
                "{}: {}",
                object_key(move_id)?,
                serde_json::to_string(entries)?
            ))
        })
        .collect::<serde_json::Result<Vec<String>>>()?;
    Ok(format!("{{learnset: {{{}}}}}", moves.join(", ")))
}

/// Render the whole snapshot as the exported literal `exports.<export_name> = {...};`.
pub fn render_snapshot(
    snapshot: &Snapshot,
    species: &SpeciesIndex,
    export_name: &str,
) -> serde_json::Result<String> {
    let lines = emission_order(snapshot, species)
        .into_iter()
        .map(|id| {
            Ok(format!(
                "\t{}: {}",
                object_key(id)?,
                render_learnset(&snapshot[id])?
            ))
        })
        .collect::<serde_json::Result<Vec<String>>>()?;

    let mut out = format!("exports.{} = {{\n", export_name);
    if !lines.is_empty() {
        out.push_str(&lines.join(",\n"));
        out.push('\n');
    }
    out.push_str("};\n");
    Ok(out)
}
