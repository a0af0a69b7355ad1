//! RizomUV script templates
//!
//! RizomUV's batch mode runs a Lua script made of `Zom*` calls that each take
//! one nested option table:
//!
//! ```lua
//! ZomLoad({File={Path="C:/job/raw.obj", ImportGroups=true, XYZUVW=true, UVWProps=true}})
//! ```
//!
//! Scripts are written as fixed templates with `$name` placeholders. Rendering
//! substitutes each placeholder with a [`Literal`] in the interpreter's
//! literal syntax: strings are JSON-escaped, numbers and booleans pass
//! through as-is.

use crate::{Error, Result};
use std::fmt;

/// A value substituted into a script template
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Quoted, JSON-escaped string
    Str(String),
    /// Number, printed without a trailing `.0` when integral
    Number(f64),
    /// `true` / `false`
    Bool(bool),
    /// Pre-rendered script text, inserted verbatim
    Raw(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // serde_json never fails on a plain string
            Self::Str(s) => match serde_json::to_string(s) {
                Ok(quoted) => f.write_str(&quoted),
                Err(_) => Err(fmt::Error),
            },
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Named values for the placeholders of a template
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: Vec<(&'static str, Literal)>,
}

impl Bindings {
    /// Create an empty set of bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a placeholder, replacing any previous value
    pub fn bind(mut self, name: &'static str, value: impl Into<Literal>) -> Self {
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
        self
    }

    /// Look up a bound value
    pub fn get(&self, name: &str) -> Option<&Literal> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| value)
    }
}

/// A fixed script made of one directive per line
#[derive(Debug, Clone, Copy)]
pub struct ScriptTemplate {
    lines: &'static [&'static str],
}

impl ScriptTemplate {
    /// Create a template from its directive lines
    pub const fn new(lines: &'static [&'static str]) -> Self {
        Self { lines }
    }

    /// Render the template, one directive per line
    pub fn render(&self, bindings: &Bindings) -> Result<String> {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            render_line(line, bindings, &mut out)?;
        }
        Ok(out)
    }
}

fn render_line(line: &str, bindings: &Bindings, out: &mut String) -> Result<()> {
    let mut rest = line;
    while let Some(start) = rest.find('$') {
        out.push_str(&rest[..start]);
        let (name, tail) = split_placeholder(&rest[start + 1..]);
        if name.is_empty() {
            out.push('$');
        } else {
            let value = bindings
                .get(name)
                .ok_or_else(|| Error::UnboundPlaceholder(name.to_string()))?;
            out.push_str(&value.to_string());
        }
        rest = tail;
    }
    out.push_str(rest);
    Ok(())
}

/// Split `name_rest` into the placeholder name and the remaining text
fn split_placeholder(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| !(c.is_ascii_lowercase() || c == '_'))
        .unwrap_or(s.len());
    s.split_at(end)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    const GREETING: ScriptTemplate = ScriptTemplate::new(&[
        r#"ZomLoad({File={Path=$path}})"#,
        r#"ZomPack({Resolution=$resolution, Margin=$margin, Translate=$translate})"#,
    ]);

    #[test]
    fn test_literal_rendering() {
        assert_eq!(Literal::from("a.obj").to_string(), r#""a.obj""#);
        assert_eq!(Literal::from(0.65).to_string(), "0.65");
        assert_eq!(Literal::from(500.0).to_string(), "500");
        assert_eq!(Literal::from(-30.0).to_string(), "-30");
        assert_eq!(Literal::from(22.5).to_string(), "22.5");
        assert_eq!(Literal::from(true).to_string(), "true");
        assert_eq!(Literal::from(2.0 / 1024.0).to_string(), "0.001953125");
        assert_eq!(Literal::from(4.0 / 1024.0).to_string(), "0.00390625");
    }

    #[test]
    fn test_strings_are_json_escaped() {
        let literal = Literal::from(r#"C:\jobs\"odd" name.obj"#);
        assert_eq!(literal.to_string(), r#""C:\\jobs\\\"odd\" name.obj""#);
    }

    #[test]
    fn test_render() {
        let bindings = Bindings::new()
            .bind("path", "in.obj")
            .bind("resolution", 500.0)
            .bind("margin", 0.5)
            .bind("translate", true);

        let script = GREETING.render(&bindings).expect("all placeholders bound");
        assert_eq!(
            script,
            "ZomLoad({File={Path=\"in.obj\"}})\n\
             ZomPack({Resolution=500, Margin=0.5, Translate=true})"
        );
    }

    #[test]
    fn test_rebind_replaces_value() {
        let bindings = Bindings::new().bind("path", "a").bind("path", "b");
        assert_eq!(bindings.get("path"), Some(&Literal::from("b")));
    }

    #[test]
    fn test_unbound_placeholder() {
        let bindings = Bindings::new().bind("path", "in.obj");
        match GREETING.render(&bindings) {
            Err(Error::UnboundPlaceholder(name)) => assert_eq!(name, "resolution"),
            other => panic!("expected unbound placeholder, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_is_verbatim() {
        const BLOCK: ScriptTemplate = ScriptTemplate::new(&["A()", "$body", "Z()"]);
        let bindings = Bindings::new().bind("body", Literal::Raw("B()\nC()".to_string()));
        assert_eq!(
            BLOCK.render(&bindings).expect("bound"),
            "A()\nB()\nC()\nZ()"
        );
    }
}
