//! Bulletin request prompt and declared output schema.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::domain::catalog::{Period, Persona};

/// Name under which the schema is declared to providers that want one.
pub const REPORT_SCHEMA_NAME: &str = "daily_bulletin";

/// Field order the model must emit.
pub const REPORT_PROPERTY_ORDER: [&str; 3] = ["title", "date", "content"];

static REPORT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "date": { "type": "string" },
            "content": {
                "type": "array",
                "items": { "type": "string" }
            }
        },
        "required": ["title", "date", "content"],
        "additionalProperties": false
    })
});

/// JSON Schema of the bulletin object: `{title, date, content[]}`.
pub fn report_schema() -> &'static Value {
    &REPORT_SCHEMA
}

/// Builds the single user-turn request for a bulletin.
///
/// Asks for major events, news the persona would care about, and how
/// prices feel, with the date pinned to the period's year range.
pub fn report_request_prompt(period: &Period, persona: &Persona) -> String {
    format!(
        "为唐朝{period_name}时期生成一份邸报。\n\
         身份背景：你是{title}。\n\
         内容需包含：当时的大事记、该身份关注的市井新闻、物价感受。\n\
         返回格式必须是JSON：{{\"title\": \"古风标题\", \"date\": \"{year_range}\", \"content\": [\"段落1\", \"段落2\", \"段落3\"]}}",
        period_name = period.display_name,
        title = persona.display_title,
        year_range = period.year_range_label,
    )
}
