//! Body sanitisation applied before a scream is first stored.

/// Escape the HTML-significant characters in `raw` and trim surrounding
/// whitespace.
///
/// Quotes are escaped in both forms (`&quot;` and `&apos;`), so the result is
/// safe inside attribute values as well as element content.
pub fn escape_body(raw: &str) -> String {
  // Single quotes pass through the double-quoted encoder untouched.
  html_escape::encode_double_quoted_attribute(raw)
    .replace('\'', "&apos;")
    .trim()
    .to_owned()
}

/// Decode `bytes` as UTF-8, substituting U+FFFD for invalid sequences.
pub fn lossy_body(bytes: &[u8]) -> String {
  String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escapes_markup_and_quotes() {
    assert_eq!(
      escape_body(r#"<b class="x">Tom & Jerry's</b>"#),
      "&lt;b class=&quot;x&quot;&gt;Tom &amp; Jerry&apos;s&lt;/b&gt;"
    );
  }

  #[test]
  fn trims_after_escaping() {
    assert_eq!(escape_body("  hello \n"), "hello");
  }

  #[test]
  fn existing_entities_are_escaped_again() {
    assert_eq!(escape_body("&amp; 'x'"), "&amp;amp; &apos;x&apos;");
  }

  #[test]
  fn plain_text_is_unchanged() {
    assert_eq!(escape_body("hello"), "hello");
  }

  #[test]
  fn invalid_utf8_is_substituted() {
    assert_eq!(lossy_body(b"ok \xff"), "ok \u{FFFD}");
  }
}
