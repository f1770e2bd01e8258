use serde::{Deserialize, Serialize};

/// Catalog listing filter: a free-text term plus exact-match attribute filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub body_colour: Option<String>,
    pub watt: Option<String>,
    pub size: Option<String>,
    pub beam_angle: Option<String>,
}

impl ProductQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    /// The cleaned search term, or `None` when nothing searchable is left.
    pub fn term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(clean_search_term)
            .filter(|t| !t.is_empty())
    }

    /// `%term%` with `LIKE` wildcards escaped by `\`.
    pub fn like_pattern(&self) -> Option<String> {
        self.term().map(|term| format!("%{}%", escape_like(&term)))
    }

    /// `(column, value)` pairs for every non-blank attribute filter.
    pub fn filters(&self) -> Vec<(&'static str, String)> {
        [
            ("body_colour", &self.body_colour),
            ("watt", &self.watt),
            ("size", &self.size),
            ("beam_angle", &self.beam_angle),
        ]
        .into_iter()
        .filter_map(|(column, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then(|| (column, value.to_string()))
        })
        .collect()
    }
}

/// Lowercases and strips characters that would interfere with a `LIKE` match.
pub fn clean_search_term(term: &str) -> String {
    term.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '.' | '-'))
        .collect()
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
