/// Escapes a drug name for use inside an openFDA (Lucene-syntax) search term.
///
/// Every Lucene special character is backslash-escaped, so a name containing quotes,
/// colons or boolean operators stays a single literal phrase.
pub(crate) fn escape_lucene_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(
            ch,
            '\\' | '+'
                | '-'
                | '!'
                | '('
                | ')'
                | '{'
                | '}'
                | '['
                | ']'
                | '^'
                | '"'
                | '~'
                | '*'
                | '?'
                | ':'
                | '/'
                | '&'
                | '|'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_lucene_value;

    #[test]
    fn leaves_plain_names_untouched() {
        assert_eq!(escape_lucene_value("Advil Migraine"), "Advil Migraine");
    }

    #[test]
    fn escapes_lucene_special_characters() {
        let escaped = escape_lucene_value(r#"Tylenol (PM) "extra":500/325\mg"#);
        assert_eq!(escaped, r#"Tylenol \(PM\) \"extra\"\:500\/325\\mg"#);
    }
}
