//! Filter formula builder
//!
//! Builds predicate strings the record store evaluates server-side.
//! Output is deterministic: the same inputs in the same order always
//! produce byte-identical formulas.

use std::fmt;

/// Server-side boolean predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Formula(String);

impl Formula {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quote a string literal, escaping backslashes and double quotes
pub fn quote_literal(literal: &str) -> String {
    let mut quoted = String::with_capacity(literal.len() + 2);
    quoted.push('"');
    for c in literal.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// `{field}="literal"`
pub fn equality(field: &str, literal: &str) -> Formula {
    Formula(format!("{{{}}}={}", field, quote_literal(literal)))
}

/// `RECORD_ID()="id"`
pub fn id_equality(id: &str) -> Formula {
    Formula(format!("RECORD_ID()={}", quote_literal(id)))
}

/// `OR(RECORD_ID()="id_1",RECORD_ID()="id_2",...)` in input order
///
/// Returns `None` for an empty id list; callers resolve that case to an
/// empty result without querying the store.
pub fn or_of_ids<S: AsRef<str>>(ids: &[S]) -> Option<Formula> {
    if ids.is_empty() {
        return None;
    }

    let terms: Vec<String> = ids
        .iter()
        .map(|id| id_equality(id.as_ref()).into_string())
        .collect();

    Some(Formula(format!("OR({})", terms.join(","))))
}
