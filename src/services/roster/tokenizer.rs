//! Delimited-text tokenizer for roster exports
//!
//! Splits one line of an RFC-4180-ish export into field values, honoring
//! quoted fields and doubled-quote escapes. Iteration is line-based, so
//! newlines inside quoted fields are not supported.

/// Split a single line into its field values.
///
/// A `"` toggles quoting; `""` inside quotes emits a literal quote. A `,`
/// outside quotes ends the current field. Fields are trimmed of surrounding
/// whitespace.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field is a literal quote
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_fields() {
        assert_eq!(split_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_trims_whitespace() {
        assert_eq!(split_line("  a , b ,c  "), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_quoted_field_with_delimiter() {
        assert_eq!(split_line(r#""Doe, Jr.",x"#), vec!["Doe, Jr.", "x"]);
    }

    #[test]
    fn test_split_escaped_quotes() {
        assert_eq!(split_line(r#""She said ""hi""""#), vec![r#"She said "hi""#]);
    }

    #[test]
    fn test_split_mixed_line() {
        let line = r#"Jane,"Doe, Jr.","She said ""hi""",x"#;
        assert_eq!(
            split_line(line),
            vec!["Jane", "Doe, Jr.", r#"She said "hi""#, "x"]
        );
    }

    #[test]
    fn test_split_empty_fields() {
        assert_eq!(split_line("a,,c,"), vec!["a", "", "c", ""]);
    }

    #[test]
    fn test_split_empty_line_is_single_empty_field() {
        assert_eq!(split_line(""), vec![""]);
    }

    #[test]
    fn test_split_unterminated_quote_keeps_rest_of_line() {
        // Malformed input degrades instead of failing: the rest of the line
        // becomes part of the open field.
        assert_eq!(split_line(r#""a,b"#), vec!["a,b"]);
    }
}
