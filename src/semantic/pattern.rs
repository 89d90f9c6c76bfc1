//! Scanner for `${name}` variable references embedded in string fields.

use std::ops::Range;

const OPEN: &str = "${";
const CLOSE: char = '}';

/// One well-formed reference found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference<'a> {
    /// The referenced variable: the identifier before any `.` or `[` accessor.
    pub name: &'a str,
    /// Everything between the delimiters, e.g. `weather.rain`.
    pub expression: &'a str,
    /// Byte range of the whole `${...}` token.
    pub span: Range<usize>,
}

impl<'a> VariableReference<'a> {
    /// The field path after the name, e.g. `.rain` for `${weather.rain}`.
    pub fn accessor(&self) -> &'a str {
        let split = self.expression.find(['.', '[']).unwrap_or(self.expression.len());
        &self.expression[split..]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult<'a> {
    pub references: Vec<VariableReference<'a>>,
    /// Set when the text holds an empty, unterminated or nested reference.
    pub ambiguous: bool,
}

/// Finds every variable reference in `text`, left to right.
///
/// `${}` and `${` without a closing brace are reported as ambiguous. For
/// `${a${b}` the outer token is ambiguous and scanning resumes inside it, so
/// `b` is still found.
pub fn scan(text: &str) -> ScanResult<'_> {
    let mut result = ScanResult::default();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(OPEN) {
        let start = cursor + offset;
        let inner_start = start + OPEN.len();
        let Some(close_offset) = text[inner_start..].find(CLOSE) else {
            result.ambiguous = true;
            break;
        };
        let end = inner_start + close_offset;
        let expression = &text[inner_start..end];

        if expression.contains(OPEN) {
            result.ambiguous = true;
            cursor = inner_start;
            continue;
        }

        let trimmed = expression.trim();
        let name = trimmed
            .split(['.', '['])
            .next()
            .unwrap_or_default()
            .trim();
        if name.is_empty() {
            result.ambiguous = true;
        } else {
            result.references.push(VariableReference {
                name,
                expression: trimmed,
                span: start..end + 1,
            });
        }
        cursor = end + 1;
    }
    result
}

/// Rewrites the variable name of every well-formed reference, keeping its
/// accessor and the surrounding text: `${weather.rain}` becomes
/// `${<replacement>.rain}`.
pub fn substitute(text: &str, mut replacement: impl FnMut(&str) -> String) -> String {
    let scan = scan(text);
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for reference in &scan.references {
        out.push_str(&text[last..reference.span.start]);
        out.push_str(OPEN);
        out.push_str(&replacement(reference.name));
        out.push_str(reference.accessor());
        out.push(CLOSE);
        last = reference.span.end;
    }
    out.push_str(&text[last..]);
    out
}
