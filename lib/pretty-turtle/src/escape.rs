//! Lexical helpers for the Turtle grammar: string and IRI escaping, and the `PN_*` character
//! classes used to decide whether an IRI can be written as a prefixed name.

use std::borrow::Cow;

/// Escapes the content of a `"..."` string literal.
///
/// The usual characters get their `ECHAR` form, other C0 controls and characters outside the
/// Basic Multilingual Plane are written as `UCHAR` with lowercase hex digits.
///
/// ```
/// use pretty_turtle::escape_string;
///
/// assert_eq!(escape_string("plain"), "plain");
/// assert_eq!(escape_string("say \"hi\"\n"), "say \\\"hi\\\"\\n");
/// assert_eq!(escape_string("\u{1F600}"), "\\U0001f600");
/// ```
pub fn escape_string(value: &str) -> Cow<'_, str> {
    escape_with(value, |c| match c {
        '\\' => Some(Escape::Echar('\\')),
        '"' => Some(Escape::Echar('"')),
        '\t' => Some(Escape::Echar('t')),
        '\n' => Some(Escape::Echar('n')),
        '\r' => Some(Escape::Echar('r')),
        '\u{8}' => Some(Escape::Echar('b')),
        '\u{c}' => Some(Escape::Echar('f')),
        '\0'..='\u{1f}' => Some(Escape::Uchar),
        c if !is_bmp(c) => Some(Escape::Uchar),
        _ => None,
    })
}

/// Escapes an IRI so that it can be written between `<` and `>`.
///
/// `ECHAR` is not allowed in `IRIREF`, so every escaped character uses the `UCHAR` form.
pub fn escape_iri(iri: &str) -> Cow<'_, str> {
    escape_with(iri, |c| (!is_iri_char(c) || !is_bmp(c)).then_some(Escape::Uchar))
}

enum Escape {
    Echar(char),
    Uchar,
}

fn escape_with(value: &str, escape: impl Fn(char) -> Option<Escape>) -> Cow<'_, str> {
    let Some(start) = value.find(|c: char| escape(c).is_some()) else {
        return Cow::Borrowed(value);
    };

    let mut output = String::with_capacity(value.len() + 8);
    output.push_str(&value[..start]);
    for c in value[start..].chars() {
        match escape(c) {
            Some(Escape::Echar(e)) => {
                output.push('\\');
                output.push(e);
            }
            Some(Escape::Uchar) if is_bmp(c) => {
                output.push_str("\\u");
                push_hex(&mut output, u32::from(c), 4);
            }
            Some(Escape::Uchar) => {
                output.push_str("\\U");
                push_hex(&mut output, u32::from(c), 8);
            }
            None => output.push(c),
        }
    }
    Cow::Owned(output)
}

/// Pushes the `digits` lowest hex digits of `value`, lowercase.
fn push_hex(output: &mut String, value: u32, digits: u32) {
    for shift in (0..digits).rev() {
        let nibble = (value >> (shift * 4)) & 0xF;
        output.push(char::from_digit(nibble, 16).unwrap_or('0'));
    }
}

fn is_bmp(c: char) -> bool {
    u32::from(c) <= 0xFFFF
}

/// Characters allowed unescaped inside an `IRIREF`.
pub fn is_iri_char(c: char) -> bool {
    !matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | '\0'..=' ')
}

/// ```text
/// PN_CHARS_BASE ::= [A-Z] | [a-z] | [#x00C0-#x00D6] | [#x00D8-#x00F6]
///                 | [#x00F8-#x02FF] | [#x0370-#x037D] | [#x037F-#x1FFF]
///                 | [#x200C-#x200D] | [#x2070-#x218F] | [#x2C00-#x2FEF]
///                 | [#x3001-#xD7FF] | [#xF900-#xFDCF] | [#xFDF0-#xFFFD]
///                 | [#x10000-#xEFFFF]
/// ```
pub fn is_pn_chars_base(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}'
    )
}

/// `PN_CHARS_U ::= PN_CHARS_BASE | '_'`
pub fn is_pn_chars_u(c: char) -> bool {
    is_pn_chars_base(c) || c == '_'
}

/// `PN_CHARS ::= PN_CHARS_U | '-' | [0-9] | #x00B7 | [#x0300-#x036F] | [#x203F-#x2040]`
pub fn is_pn_chars(c: char) -> bool {
    is_pn_chars_u(c)
        || c == '-'
        || c.is_ascii_digit()
        || c == '\u{00B7}'
        || matches!(c, '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

/// Checks that `name` matches `PN_PREFIX?`, i.e. can be used as the label of a `@prefix`.
///
/// The empty label is valid.
pub fn is_valid_prefix_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => true,
        Some(c) if is_pn_chars_base(c) => {
            !name.ends_with('.') && chars.all(|c| is_pn_chars(c) || c == '.')
        }
        Some(_) => false,
    }
}

/// Checks that `name` matches `PN_LOCAL` without any backslash escape.
///
/// The empty local name is valid (`ex:` is a complete prefixed name).
pub fn is_valid_local_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.last() == Some(&b'.') {
        return false;
    }

    let mut chars = name.char_indices();
    let mut first = true;
    while let Some((i, c)) = chars.next() {
        let valid = if c == '%' {
            let is_hex = |offset: usize| bytes.get(i + offset).is_some_and(u8::is_ascii_hexdigit);
            if !(is_hex(1) && is_hex(2)) {
                return false;
            }
            chars.next();
            chars.next();
            true
        } else if first {
            is_pn_chars_u(c) || c == ':' || c.is_ascii_digit()
        } else {
            is_pn_chars(c) || c == ':' || c == '.'
        };
        if !valid {
            return false;
        }
        first = false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_escapes() {
        assert!(matches!(escape_string("nothing to do"), Cow::Borrowed(_)));
        assert_eq!(escape_string("a\\b"), "a\\\\b");
        assert_eq!(escape_string("\t\r\u{8}\u{c}"), "\\t\\r\\b\\f");
        assert_eq!(escape_string("\u{1}\u{1f}"), "\\u0001\\u001f");
        assert_eq!(escape_string("é"), "é");
        assert_eq!(escape_string("\u{10ffff}"), "\\U0010ffff");
    }

    #[test]
    fn iri_escapes() {
        assert!(matches!(escape_iri("http://example.com/a#b"), Cow::Borrowed(_)));
        assert_eq!(
            escape_iri("http://example.com/a b"),
            "http://example.com/a\\u0020b"
        );
        assert_eq!(escape_iri("http://example.com/{x}"), "http://example.com/\\u007bx\\u007d");
        assert_eq!(escape_iri("http://example.com/\u{1F600}"), "http://example.com/\\U0001f600");
    }

    #[test]
    fn prefix_names() {
        assert!(is_valid_prefix_name(""));
        assert!(is_valid_prefix_name("ex"));
        assert!(is_valid_prefix_name("ex.a-b_1"));
        assert!(!is_valid_prefix_name("ex."));
        assert!(!is_valid_prefix_name("_ex"));
        assert!(!is_valid_prefix_name("1ex"));
        assert!(!is_valid_prefix_name("e x"));
    }

    #[test]
    fn local_names() {
        assert!(is_valid_local_name(""));
        assert!(is_valid_local_name("name"));
        assert!(is_valid_local_name("123"));
        assert!(is_valid_local_name("_a.b:c"));
        assert!(is_valid_local_name("a%20b"));
        assert!(!is_valid_local_name("a%2"));
        assert!(!is_valid_local_name("a%zz"));
        assert!(!is_valid_local_name("a."));
        assert!(!is_valid_local_name(".a"));
        assert!(!is_valid_local_name("-a"));
        assert!(!is_valid_local_name("a/b"));
        assert!(!is_valid_local_name("a?b"));
    }
}
