//! Data module parsing and rendering.
//!
//! A data module is the TypeScript text the dashboard imports:
//!
//! ```text
//! import type { ... } from './types';
//!
//! export const reportData = { ... };
//! ```
//!
//! [`parse_report`] recovers a complete [`ReportData`] from such text without
//! evaluating it; [`render_data_module`] produces it.

use crate::defaults::merge_onto_defaults;
use crate::literal::{parse_literal, LiteralError};
use crate::schema::ReportData;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

const TYPE_IMPORT: &str = "import type { CelebProfile, MatchPoint, ContentIdea, MatchScore, ProductDefinition, StrategicPillar, ExternalLink } from './types';";

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("no trailing `= {{ ... }}` object literal found")]
    NoMatch,
    #[error("object literal could not be parsed: {0}")]
    Syntax(#[from] LiteralError),
    #[error("object literal evaluated to {0}, not an object")]
    NotAnObject(&'static str),
    #[error("merged report does not fit the data model: {0}")]
    Shape(#[from] serde_json::Error),
}

fn trailing_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Greedy through to the last closing brace before an optional semicolon.
    RE.get_or_init(|| Regex::new(r"=\s*(\{[\s\S]*\})\s*;?\s*$").expect("static regex"))
}

/// Capture the trailing assigned object literal, braces included.
pub fn extract_literal(module: &str) -> Option<&str> {
    trailing_literal()
        .captures(module)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse the trailing object literal of a data module into a raw object.
///
/// The result is exactly what the module wrote; nothing is merged.
pub fn parse_payload(module: &str) -> Result<Value, PayloadError> {
    let literal = extract_literal(module).ok_or(PayloadError::NoMatch)?;
    let value = parse_literal(literal)?;
    match value {
        Value::Object(_) => Ok(value),
        other => Err(PayloadError::NotAnObject(kind_of(&other))),
    }
}

/// Parse a data module and merge it onto the defaults.
///
/// A successful result is always a complete report. Missing or unusable
/// sections come from the defaults; that is not an error.
pub fn parse_report(module: &str) -> Result<ReportData, PayloadError> {
    let raw = parse_payload(module)?;
    let merged = merge_onto_defaults(&raw);
    let report = serde_json::from_value(merged)?;
    debug!(bytes = module.len(), "Parsed data module");
    Ok(report)
}

/// Render a complete report as a data module.
pub fn render_report(report: &ReportData) -> Result<String, serde_json::Error> {
    Ok(render_data_module(&serde_json::to_value(report)?))
}

/// Render report data as a data module.
pub fn render_data_module(data: &Value) -> String {
    let body = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
    format!("{TYPE_IMPORT}\n\nexport const reportData = {body};")
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{defaults, defaults_value};
    use crate::schema::validate;
    use serde_json::json;

    #[test]
    fn test_recovers_json_literal() {
        let v = parse_payload("export const reportData = {\"a\":1,\"b\":[1,2]};").unwrap();
        assert_eq!(v, json!({"a": 1, "b": [1, 2]}));
    }

    #[test]
    fn test_accepts_object_literal_syntax() {
        let v = parse_payload("x = {a: 'hi', b: 2,};").unwrap();
        assert_eq!(v, json!({"a": "hi", "b": 2}));
    }

    #[test]
    fn test_no_trailing_literal() {
        assert!(matches!(parse_payload("const x = 5;"), Err(PayloadError::NoMatch)));
        assert!(matches!(parse_payload(""), Err(PayloadError::NoMatch)));
        assert!(matches!(
            parse_payload("export const reportData = { a: 1 }; console.log(1)"),
            Err(PayloadError::NoMatch)
        ));
    }

    #[test]
    fn test_broken_literal_is_a_syntax_error() {
        let err = parse_payload("export const reportData = { a: 'open };").unwrap_err();
        assert!(matches!(err, PayloadError::Syntax(_)));
    }

    #[test]
    fn test_code_is_never_evaluated() {
        let err = parse_payload("x = { a: require('fs').readFileSync('/etc/passwd') };").unwrap_err();
        assert!(matches!(err, PayloadError::Syntax(_)));
    }

    #[test]
    fn test_literal_with_import_header() {
        let module = "import type { ReportData } from './types';\n\nexport const reportData = {\n  matchScore: { score: 77 },\n};\n";
        let report = parse_report(module).unwrap();
        assert_eq!(report.match_score.score, 77.0);
        assert_eq!(report.match_score.summary, defaults().match_score.summary);
    }

    #[test]
    fn test_partial_extraction_end_to_end() {
        let module = r#"export const reportData = {
            celebData: { name: "Chef Kim" },
            matchScore: { score: 88, summary: "Strong fit" },
        };"#;
        let report = parse_report(module).unwrap();
        let d = defaults();

        assert_eq!(report.celeb_data.name, "Chef Kim");
        assert_eq!(report.celeb_data.handle, d.celeb_data.handle);
        assert_eq!(report.match_score.score, 88.0);
        assert_eq!(report.match_score.summary, "Strong fit");
        assert_eq!(report.product_definition, d.product_definition);
        assert_eq!(report.match_points, d.match_points);
        assert_eq!(report.content_ideas, d.content_ideas);
        assert_eq!(report.strategic_pillars, d.strategic_pillars);
        assert!(validate(&report).is_empty());
    }

    #[test]
    fn test_rendered_report_is_complete() {
        let report = parse_report("x = { matchScore: { score: 12 } };").unwrap();
        let module = render_report(&report).unwrap();
        let shipped = parse_payload(&module).unwrap();

        let keys: Vec<_> = shipped.as_object().unwrap().keys().cloned().collect();
        let expected: Vec<_> = defaults_value().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, expected);
        assert_eq!(parse_report(&module).unwrap(), report);
    }

    #[test]
    fn test_render_then_parse_is_lossless() {
        let module = render_data_module(defaults_value());
        assert!(module.starts_with("import type {"));
        assert!(module.ends_with("};"));
        assert_eq!(&parse_payload(&module).unwrap(), defaults_value());
        assert_eq!(&parse_report(&module).unwrap(), defaults());
    }
}
