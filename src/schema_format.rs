//! # Schema Formatter
//!
//! Rewrites the `generator` blocks of a Prisma schema so their properties
//! appear in a fixed canonical order with aligned `=` signs. Everything
//! outside generator blocks is preserved byte for byte.
//!
//! ```text
//! generator client {                 generator client {
//!   output = "./client"        =>      provider                = "prisma-client-py"
//!   provider = "prisma-client-py"      output                  = "./client"
//! }                                  }
//! ```
//!
//! ## Block Recognition
//!
//! Blocks are found by a small scanner rather than a regular expression:
//!
//! 1. The keyword `generator`, not preceded by a name character.
//! 2. At least one whitespace character, then a name made of alphanumerics,
//!    `_` and `-`.
//! 3. Optional whitespace and `{`.
//! 4. A non-empty body up to the first `}`.
//!
//! Bodies containing `{` (nested braces) are not supported and such blocks
//! are left untouched, as are blocks with an empty body or no closing brace.
//!
//! ## Property Handling
//!
//! Each body line is trimmed. Blank lines, `//` comment lines and lines
//! without `=` are dropped. The rest are split at the first `=`. A repeated
//! key keeps its first position and its last value. Known keys are written
//! in [`GENERATOR_PROPERTY_ORDER`], followed by unknown keys in the order
//! they were found.
//!
//! Formatting is idempotent: a block already in canonical form renders to
//! identical text, and [`format_schema_file`] only writes when the content
//! actually changes.

use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::error::Result;

/// Canonical order of known generator properties.
pub const GENERATOR_PROPERTY_ORDER: [&str; 7] = [
    "provider",
    "interface",
    "recursive_type_depth",
    "output",
    "enable_experimental_decimal",
    "partial_type_generator",
    "engine_type",
];

/// Width property keys are padded to.
const KEY_WIDTH: usize = 23;

const KEYWORD: &str = "generator";

/// A `generator` block parsed out of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorBlock {
    pub name: String,
    /// Properties in first-encounter order, deduplicated by key.
    pub properties: Vec<(String, String)>,
    /// Byte range of the whole block (keyword through closing brace).
    pub span: Range<usize>,
}

impl GeneratorBlock {
    fn parse(name: &str, body: &str, span: Range<usize>) -> Self {
        let mut properties: Vec<(String, String)> = Vec::new();

        for line in body.trim().split('\n') {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match properties.iter_mut().find(|(k, _)| k == key) {
                Some(existing) => existing.1 = value.to_string(),
                None => properties.push((key.to_string(), value.to_string())),
            }
        }

        Self {
            name: name.to_string(),
            properties,
            span,
        }
    }

    /// Value of a property, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render the block in canonical form, without a trailing newline.
    pub fn render(&self) -> String {
        let mut lines = vec![format!("{} {} {{", KEYWORD, self.name)];

        for key in GENERATOR_PROPERTY_ORDER {
            if let Some(value) = self.get(key) {
                lines.push(property_line(key, value));
            }
        }

        for (key, value) in &self.properties {
            if !GENERATOR_PROPERTY_ORDER.contains(&key.as_str()) {
                lines.push(property_line(key, value));
            }
        }

        lines.push("}".to_string());
        lines.join("\n")
    }
}

fn property_line(key: &str, value: &str) -> String {
    format!("  {:<width$} = {}", key, value, width = KEY_WIDTH)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Find every well-formed generator block in `content`, in order.
pub fn parse_generator_blocks(content: &str) -> Vec<GeneratorBlock> {
    let mut blocks = Vec::new();
    let mut search_from = 0;

    while let Some(offset) = content[search_from..].find(KEYWORD) {
        let start = search_from + offset;
        search_from = start + KEYWORD.len();

        let preceded_by_name = content[..start]
            .chars()
            .next_back()
            .is_some_and(is_name_char);
        if preceded_by_name {
            continue;
        }

        match scan_block(content, start) {
            Scan::Block(block) => {
                search_from = block.span.end;
                blocks.push(block);
            }
            Scan::Skip(resume) => search_from = resume,
            Scan::NoMatch => {}
        }
    }

    blocks
}

enum Scan {
    Block(GeneratorBlock),
    /// Structurally a block, but unsupported; resume scanning here.
    Skip(usize),
    NoMatch,
}

/// Scan a block whose keyword starts at `start`.
fn scan_block(content: &str, start: usize) -> Scan {
    let mut pos = start + KEYWORD.len();

    let ws = skip_while(content, pos, char::is_whitespace);
    if ws == pos {
        return Scan::NoMatch;
    }
    pos = ws;

    let name_end = skip_while(content, pos, is_name_char);
    if name_end == pos {
        return Scan::NoMatch;
    }
    let name = &content[pos..name_end];

    pos = skip_while(content, name_end, char::is_whitespace);
    if !content[pos..].starts_with('{') {
        return Scan::NoMatch;
    }
    let body_start = pos + 1;

    let Some(close) = content[body_start..].find('}').map(|i| body_start + i) else {
        return Scan::NoMatch;
    };
    let body = &content[body_start..close];
    if body.is_empty() || body.contains('{') {
        return Scan::Skip(close + 1);
    }

    Scan::Block(GeneratorBlock::parse(name, body, start..close + 1))
}

/// Byte index of the first char at or after `pos` not matching `pred`.
fn skip_while(content: &str, pos: usize, pred: impl Fn(char) -> bool) -> usize {
    content[pos..]
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map(|(i, _)| pos + i)
        .unwrap_or(content.len())
}

/// Rewrite every generator block of `content` in canonical form.
pub fn format_schema(content: &str) -> String {
    let mut formatted = String::with_capacity(content.len());
    let mut last = 0;

    for block in parse_generator_blocks(content) {
        formatted.push_str(&content[last..block.span.start]);
        formatted.push_str(&block.render());
        last = block.span.end;
    }
    formatted.push_str(&content[last..]);

    formatted
}

/// Format the schema file at `path` in place.
///
/// Returns `Ok(true)` if the file was rewritten, `Ok(false)` if it is
/// already formatted or does not exist.
pub fn format_schema_file(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    let content = fs::read_to_string(path)?;
    let formatted = format_schema(&content);

    if formatted == content {
        return Ok(false);
    }

    fs::write(path, formatted)?;
    Ok(true)
}
