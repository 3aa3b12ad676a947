//! # Field Substitution
//!
//! Rewrites values in managed files that carry a marker comment naming a
//! field of the triggering event:
//!
//! ```yaml
//! image:
//!   tag: 2.5.5 # {"git-promotion.replacewith":"data.image.tag"}
//! ```
//!
//! With `data.image.tag = 2.6.0` in the field map, only `2.5.5` changes. The
//! key, the separator and the marker comment stay byte for byte. This is a
//! line-based rewrite, not a template engine: a line is touched only when it
//! has the shape `<key>: <value> # <marker>` with the marker at its very end.
//!
//! Lines are split on `\n` only. In a file with CRLF line endings the `\r`
//! sits after the marker, so such lines are never rewritten. The line pattern
//! is compiled per field whose marker occurs in the content, which is why
//! [`Substituter::substitute`] returns a `Result`.

use crate::error::Result;
use crate::fields::FieldMap;
use crate::settings::DEFAULT_MARKER_NAMESPACE;
use log::debug;
use regex::Regex;

/// Rewrites marker-annotated values for one marker namespace.
#[derive(Debug, Clone)]
pub struct Substituter {
    namespace: String,
}

impl Default for Substituter {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_NAMESPACE)
    }
}

impl Substituter {
    /// Creates a substituter for markers of the form `{"<namespace>":"<key>"}`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The marker comment body naming `key`.
    pub fn marker(&self, key: &str) -> String {
        format!(r#"{{"{}":"{}"}}"#, self.namespace, key)
    }

    /// Replaces the value on every line marked with a key from `fields`.
    ///
    /// Keys whose marker does not occur in `content` are skipped without
    /// scanning lines. Lines without a matching marker, and markers naming
    /// keys missing from `fields`, are left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use git_promotion::fields::FieldMap;
    /// use git_promotion::substitution::Substituter;
    ///
    /// let substituter = Substituter::new("ns");
    /// let mut fields = FieldMap::new();
    /// fields.insert("x".to_string(), "9.9.9".to_string());
    ///
    /// let result = substituter
    ///     .substitute(r#"tag: 2.5.5 # {"ns":"x"}"#, &fields)
    ///     .unwrap();
    /// assert_eq!(result, r#"tag: 9.9.9 # {"ns":"x"}"#);
    /// ```
    pub fn substitute(&self, content: &str, fields: &FieldMap) -> Result<String> {
        let mut result = content.to_string();
        for (key, value) in fields {
            let marker = self.marker(key);
            if result.contains(&marker) {
                debug!("replacing value of field {}", key);
                result = replace_marked_value(&result, &marker, value)?;
            }
        }
        Ok(result)
    }
}

fn replace_marked_value(content: &str, marker: &str, value: &str) -> Result<String> {
    let line_pattern = Regex::new(&format!(r"^(.+: ).*( # {})$", regex::escape(marker)))?;

    let lines: Vec<String> = content
        .split('\n')
        .map(|line| {
            if !line.contains(marker) {
                return line.to_string();
            }
            match line_pattern.captures(line) {
                Some(caps) => format!("{}{}{}", &caps[1], value, &caps[2]),
                None => line.to_string(),
            }
        })
        .collect();

    Ok(lines.join("\n"))
}
