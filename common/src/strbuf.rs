//! A growable byte buffer bound to a collation (spec.md §4.4), grounded on
//! `original_source/drizzled/sql_string.cc`.

use std::sync::Arc;

use crate::collation::{Binary, Collation, WideChar};

/// Position of an ill-formed byte sequence or unmappable character found by
/// [`StringBuffer::well_formed_copy_nchars`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WellFormedReport {
    pub first_ill_formed_at: Option<usize>,
    pub first_unmappable_at: Option<usize>,
    pub substitutions: usize,
}

pub struct StringBuffer {
    data: Vec<u8>,
    collation: Arc<dyn Collation>,
    /// `true` when this buffer is a non-owning view (spec.md §4.4); a view
    /// may be read but reallocating it on `append`/`reserve` is disallowed.
    is_view: bool,
}

impl StringBuffer {
    pub fn new(collation: Arc<dyn Collation>) -> Self {
        StringBuffer {
            data: Vec::new(),
            collation,
            is_view: false,
        }
    }

    pub fn binary() -> Self {
        StringBuffer::new(Arc::new(Binary))
    }

    pub fn view(collation: Arc<dyn Collation>, bytes: Vec<u8>) -> Self {
        StringBuffer {
            data: bytes,
            collation,
            is_view: true,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn collation(&self) -> &dyn Collation {
        self.collation.as_ref()
    }

    /// Appends `other`'s bytes, converting through this buffer's collation
    /// if `other_collation` differs; unrepresentable code points are
    /// substituted with `?` and counted (spec.md §4.4).
    pub fn append(&mut self, other: &[u8], other_collation: &dyn Collation) -> usize {
        if self.is_view {
            panic!("cannot append into a non-owning StringBuffer view");
        }
        if other_collation.name() == self.collation.name() {
            self.data.extend_from_slice(other);
            return 0;
        }

        let mut substitutions = 0;
        let mut pos = 0;
        while pos < other.len() {
            match other_collation.mb_wc(&other[pos..]) {
                Some((wc, width)) => {
                    if self.collation.wc_mb(wc, &mut self.data).is_none() {
                        self.data.push(b'?');
                        substitutions += 1;
                    }
                    pos += width;
                }
                None => {
                    self.data.push(b'?');
                    substitutions += 1;
                    pos += 1;
                }
            }
        }
        substitutions
    }

    /// Copies at most `nchars` well-formed characters from `src` (under
    /// `from_cs`) into `dst` (under `to_cs`), reporting the position of the
    /// first ill-formed sequence and first unmappable character, if any.
    pub fn well_formed_copy_nchars(
        to_cs: &dyn Collation,
        dst: &mut Vec<u8>,
        dst_len: usize,
        from_cs: &dyn Collation,
        src: &[u8],
        nchars: usize,
    ) -> WellFormedReport {
        let mut report = WellFormedReport::default();
        let mut pos = 0;
        let mut copied_chars = 0;
        let mut written = 0;

        while pos < src.len() && copied_chars < nchars && written < dst_len {
            match from_cs.mb_wc(&src[pos..]) {
                Some((wc, width)) => {
                    let before = dst.len();
                    match to_cs.wc_mb(wc, dst) {
                        Some(w) => {
                            written += w;
                        }
                        None => {
                            dst.truncate(before);
                            if report.first_unmappable_at.is_none() {
                                report.first_unmappable_at = Some(pos);
                            }
                            to_cs.wc_mb(b'?' as WideChar, dst);
                            written += 1;
                            report.substitutions += 1;
                        }
                    }
                    pos += width;
                    copied_chars += 1;
                }
                None => {
                    if report.first_ill_formed_at.is_none() {
                        report.first_ill_formed_at = Some(pos);
                    }
                    break;
                }
            }
        }
        report
    }

    /// SQL-quoted form: doubles internal `quote_char`, backslashes `\0`,
    /// `\n`, `\r`, `\\` (spec.md §4.4).
    pub fn escape(data: &[u8], quote_char: u8) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len() + 2);
        out.push(quote_char);
        for &b in data {
            match b {
                b if b == quote_char => {
                    out.push(quote_char);
                    out.push(quote_char);
                }
                0 => {
                    out.push(b'\\');
                    out.push(b'0');
                }
                b'\n' => {
                    out.push(b'\\');
                    out.push(b'n');
                }
                b'\r' => {
                    out.push(b'\\');
                    out.push(b'r');
                }
                b'\\' => {
                    out.push(b'\\');
                    out.push(b'\\');
                }
                other => out.push(other),
            }
        }
        out.push(quote_char);
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn append_same_collation_is_plain_concat() {
        let mut buf = StringBuffer::binary();
        buf.append(b"hello", &Binary);
        buf.append(b" world", &Binary);
        assert_eq!(buf.as_bytes(), b"hello world");
    }

    #[test]
    fn escape_doubles_quotes_and_backslashes_control_chars() {
        let escaped = StringBuffer::escape(b"o'brien\n", b'\'');
        assert_eq!(escaped, b"'o''brien\\n'");
    }

    #[test]
    fn well_formed_copy_respects_nchars() {
        let mut dst = Vec::new();
        let report = StringBuffer::well_formed_copy_nchars(&Binary, &mut dst, 100, &Binary, b"abcdef", 3);
        assert_eq!(dst, b"abc");
        assert_eq!(report.first_ill_formed_at, None);
    }
}
