//! Unicode escape pre-translation.
//!
//! Java translates `\uXXXX` escapes before tokenization, anywhere in the
//! file: `int a = 1;` declares `a`. The scanner runs on the translated
//! text and maps every offset back to the original with an [`OffsetMap`].

use std::borrow::Cow;

use jvz_common::diagnostics::diagnostic_codes;

use crate::scanner::ScannerDiagnostic;

/// Monotonic map from translated offsets to original offsets.
///
/// Holds one anchor per translated escape. Offsets between anchors shift by
/// the anchor's delta. An empty map is the identity.
#[derive(Clone, Debug, Default)]
pub struct OffsetMap {
    /// `(translated_offset, original_offset)` pairs, sorted by both fields.
    anchors: Vec<(u32, u32)>,
}

impl OffsetMap {
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Map an offset in the translated text to the original text.
    #[must_use]
    pub fn to_original(&self, translated: u32) -> u32 {
        let idx = self.anchors.partition_point(|&(t, _)| t <= translated);
        if idx == 0 {
            return translated;
        }
        let (t, o) = self.anchors[idx - 1];
        o + (translated - t)
    }
}

/// Result of translating escapes in one file.
pub struct Translated<'a> {
    pub text: Cow<'a, str>,
    pub offsets: OffsetMap,
    pub diagnostics: Vec<ScannerDiagnostic>,
}

/// Translate all eligible `\uXXXX` escapes in `source`.
///
/// A backslash is eligible when it is preceded by an even number of
/// contiguous backslashes, so `\\u0041` stays as written. Any number of `u`
/// characters may follow the backslash. Surrogate pairs written as two
/// escapes are combined; lone surrogates become U+FFFD.
#[must_use]
pub fn translate_unicode_escapes(source: &str) -> Translated<'_> {
    if memchr::memmem::find(source.as_bytes(), b"\\u").is_none() {
        return Translated {
            text: Cow::Borrowed(source),
            offsets: OffsetMap::default(),
            diagnostics: Vec::new(),
        };
    }

    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut anchors = Vec::new();
    let mut diagnostics = Vec::new();
    let mut copied_up_to = 0usize;
    let mut i = 0usize;
    let mut preceding_backslashes = 0usize;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            preceding_backslashes = 0;
            i += 1;
            continue;
        }
        let eligible = preceding_backslashes % 2 == 0;
        if !eligible || bytes.get(i + 1) != Some(&b'u') {
            preceding_backslashes += 1;
            i += 1;
            continue;
        }

        let Some((unit, escape_len)) = decode_escape(bytes, i) else {
            diagnostics.push(ScannerDiagnostic::new(
                i as u32,
                2,
                diagnostic_codes::ILLEGAL_UNICODE_ESCAPE,
                &[],
            ));
            preceding_backslashes = 0;
            i += 2;
            continue;
        };

        let mut consumed = escape_len;
        let ch = if (0xD800..0xDC00).contains(&unit) {
            match decode_escape(bytes, i + escape_len) {
                Some((low, low_len)) if (0xDC00..0xE000).contains(&low) => {
                    consumed += low_len;
                    let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER)
                }
                _ => char::REPLACEMENT_CHARACTER,
            }
        } else {
            char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)
        };

        out.push_str(&source[copied_up_to..i]);
        out.push(ch);
        copied_up_to = i + consumed;
        anchors.push((out.len() as u32, copied_up_to as u32));

        preceding_backslashes = 0;
        i += consumed;
    }
    out.push_str(&source[copied_up_to..]);

    Translated {
        text: Cow::Owned(out),
        offsets: OffsetMap { anchors },
        diagnostics,
    }
}

/// Decode one `\u+XXXX` escape at `at`, returning the UTF-16 unit and the
/// escape length in bytes.
fn decode_escape(bytes: &[u8], at: usize) -> Option<(u32, usize)> {
    if bytes.get(at) != Some(&b'\\') || bytes.get(at + 1) != Some(&b'u') {
        return None;
    }
    let mut j = at + 1;
    while bytes.get(j) == Some(&b'u') {
        j += 1;
    }
    let hex = bytes.get(j..j + 4)?;
    let mut value = 0u32;
    for &b in hex {
        value = value * 16 + (b as char).to_digit(16)?;
    }
    Some((value, j + 4 - at))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_escapes_borrows() {
        let t = translate_unicode_escapes("class A {}");
        assert!(matches!(t.text, Cow::Borrowed(_)));
        assert!(t.offsets.is_identity());
    }

    #[test]
    fn test_translates_and_maps_offsets() {
        let src = "int \\u0061 = 1;";
        let t = translate_unicode_escapes(src);
        assert_eq!(t.text, "int a = 1;");
        // 'a' sits at translated 4, original 4; '=' at translated 6, original 11.
        assert_eq!(t.offsets.to_original(4), 4);
        assert_eq!(t.offsets.to_original(6), 11);
        assert_eq!(t.offsets.to_original(0), 0);
    }

    #[test]
    fn test_multiple_u_and_escaped_backslash() {
        let t = translate_unicode_escapes("\\uuu0041 \\\\u0041");
        assert_eq!(t.text, "A \\\\u0041");
        assert!(t.diagnostics.is_empty());
    }

    #[test]
    fn test_surrogate_pair_combines() {
        let t = translate_unicode_escapes("\\uD83D\\uDE00");
        assert_eq!(t.text, "\u{1F600}");
    }

    #[test]
    fn test_illegal_escape_reports() {
        let t = translate_unicode_escapes("x = \\u00G1;");
        assert_eq!(t.diagnostics.len(), 1);
        assert_eq!(t.diagnostics[0].code, diagnostic_codes::ILLEGAL_UNICODE_ESCAPE);
        assert_eq!(t.diagnostics[0].start, 4);
        assert_eq!(t.text, "x = \\u00G1;");
    }
}
