//! Upstream rate source descriptors.

use serde::Serialize;

use crate::normalizer::ResponseSchema;

/// Which schema variants a source's body may be read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaRule {
    /// Try every variant in precedence order.
    Detect,
    /// Accept only the given variant.
    Only(ResponseSchema),
}

/// One upstream endpoint able to supply a full rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    /// Endpoint URL, also used as the source identifier.
    pub url: String,
    /// Schema dispatch rule.
    pub schema: SchemaRule,
}

impl SourceDescriptor {
    /// Create a source that auto-detects its schema.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            schema: SchemaRule::Detect,
        }
    }

    /// Restrict the source to one schema variant.
    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = SchemaRule::Only(schema);
        self
    }
}

/// Built-in sources, in priority order.
pub fn default_sources() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor::new("https://api.exchangerate.host/latest"),
        SourceDescriptor::new("https://api.exchangerate-api.com/v4/latest/USD"),
        SourceDescriptor::new("https://open.er-api.com/v6/latest/USD"),
        SourceDescriptor::new(
            "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies/usd.json",
        )
        .with_schema(ResponseSchema::UsdKeyed),
    ]
}
