//! The typed column abstraction (spec.md §4.1), dispatching per-variant
//! behavior through a pattern match on `FieldKind` rather than a vtable
//! (spec.md §9, REDESIGN FLAGS item 1).

use std::cmp::Ordering;
use std::sync::Arc;

use common::collation::Collation;
use common::decimal::{Decimal, DecimalResult, RoundMode};
use common::session::WarningSink;
use common::temporal::{Date, DateTime, Timestamp, ZERO_DATE};

use crate::error::StoreResult;
use crate::kind::FieldKind;
use crate::row::RowBuffer;

/// Julian Day Number of the Unix epoch (1970-01-01), used to convert
/// between `Date`/`DateTime` and TIMESTAMP's epoch-seconds packed form.
const EPOCH_JULIAN_DAY: i64 = 2_440_588;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    UInt(u64),
    Real(f64),
    Decimal(Decimal),
    Date(Date),
    DateTime(DateTime),
    Timestamp(Timestamp),
    Str(Vec<u8>),
    Enum(u32),
    Null,
}

/// A typed column descriptor binding a byte range in a `RowBuffer` to a
/// variant and a collation (see GLOSSARY). Built with chained `with_*`
/// setters, matching the teacher's `SrcColumn` builder style.
#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub offset: usize,
    pub len: usize,
    pub nullable: bool,
    pub null_bit: usize,
    pub unsigned: bool,
    pub collation: Arc<dyn Collation>,
    pub decimal_precision: u8,
    pub decimal_scale: u8,
    pub declared_len: usize,
    pub enum_labels: Vec<String>,
}

impl Field {
    pub fn new(name: &str, kind: FieldKind, offset: usize, len: usize, collation: Arc<dyn Collation>) -> Self {
        Field {
            name: name.to_string(),
            kind,
            offset,
            len,
            nullable: false,
            null_bit: 0,
            unsigned: false,
            collation,
            decimal_precision: 0,
            decimal_scale: 0,
            declared_len: len,
            enum_labels: Vec::new(),
        }
    }

    pub fn with_nullable(mut self, null_bit: usize) -> Self {
        self.nullable = true;
        self.null_bit = null_bit;
        self
    }

    pub fn with_unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    pub fn with_decimal(mut self, precision: u8, scale: u8) -> Self {
        self.decimal_precision = precision;
        self.decimal_scale = scale;
        self
    }

    pub fn with_declared_len(mut self, declared_len: usize) -> Self {
        self.declared_len = declared_len;
        self
    }

    pub fn with_enum_labels(mut self, labels: Vec<String>) -> Self {
        self.enum_labels = labels;
        self
    }

    pub fn is_null(&self, row: &RowBuffer) -> bool {
        self.nullable && row.is_null(self.null_bit)
    }

    fn set_null(&self, row: &mut RowBuffer, is_null: bool) {
        if self.nullable {
            row.set_null(self.null_bit, is_null);
        }
    }

    /// Zeroes the packed bytes; numeric -> 0, temporal -> all-zero ("zero
    /// date" sentinel), string -> empty (spec.md §4.1).
    pub fn reset(&self, row: &mut RowBuffer) {
        let zero = vec![0u8; self.len];
        row.write(self.offset, &zero);
        self.set_null(row, false);
    }

    // ---- store ----------------------------------------------------------

    pub fn store_str(
        &self,
        row: &mut RowBuffer,
        text: &str,
        sink: &mut dyn WarningSink,
        strict: bool,
    ) -> StoreResult {
        let result = match self.kind {
            FieldKind::Tiny | FieldKind::Long | FieldKind::LongLong => self.store_int_text(row, text),
            FieldKind::Double => self.store_double_text(row, text),
            FieldKind::Decimal => self.store_decimal_text(row, text),
            FieldKind::Date => self.store_date_text(row, text),
            FieldKind::DateTime => self.store_datetime_text(row, text),
            FieldKind::Timestamp => self.store_timestamp_text(row, text),
            FieldKind::Varchar | FieldKind::Blob => self.store_string_bytes(row, text.as_bytes()),
            FieldKind::Enum => self.store_enum_text(row, text),
            FieldKind::Null => StoreResult::Ok,
        };

        if !result.is_silent() {
            self.report(result, sink, strict);
        }
        self.set_null(row, false);
        result
    }

    pub fn store_null(&self, row: &mut RowBuffer) {
        self.reset(row);
        self.set_null(row, true);
    }

    /// Stores an already-typed `FieldValue` (used by the row-write state
    /// machine's UPDATE-expression path, where the expression evaluator --
    /// out of scope here -- has already produced a value rather than text).
    /// Routes through the text `store` path for every variant except NULL,
    /// consistent with every extractor/storer in this type being total.
    pub fn store_value(
        &self,
        row: &mut RowBuffer,
        value: &FieldValue,
        sink: &mut dyn WarningSink,
        strict: bool,
    ) -> StoreResult {
        match value {
            FieldValue::Null => {
                self.store_null(row);
                StoreResult::Ok
            }
            FieldValue::Int(n) => self.store_str(row, &n.to_string(), sink, strict),
            FieldValue::UInt(n) => self.store_str(row, &n.to_string(), sink, strict),
            FieldValue::Real(n) => self.store_str(row, &n.to_string(), sink, strict),
            FieldValue::Decimal(d) => self.store_str(row, &d.to_plain_string(), sink, strict),
            FieldValue::Date(d) => self.store_str(row, &d.to_string(), sink, strict),
            FieldValue::DateTime(dt) => self.store_str(row, &dt.to_string(), sink, strict),
            FieldValue::Timestamp(ts) => self.store_str(row, &ts.epoch_seconds.to_string(), sink, strict),
            FieldValue::Str(bytes) => self.store_str(row, &String::from_utf8_lossy(bytes), sink, strict),
            FieldValue::Enum(idx) => {
                let idx = *idx as usize;
                if idx >= 1 && idx <= self.enum_labels.len() {
                    self.store_str(row, &self.enum_labels[idx - 1].clone(), sink, strict)
                } else {
                    self.store_str(row, "", sink, strict)
                }
            }
        }
    }

    fn report(&self, result: StoreResult, sink: &mut dyn WarningSink, strict: bool) {
        if let Some(err) = result.to_field_error() {
            sink.push_warning(
                if strict {
                    common::session::WarningLevel::Error
                } else {
                    common::session::WarningLevel::Warning
                },
                "WARN_DATA_TRUNCATED",
                &format!("{}: {}", self.name, err),
            );
            sink.bump_cuted_fields();
        }
    }

    fn store_int_text(&self, row: &mut RowBuffer, text: &str) -> StoreResult {
        let trimmed = text.trim_start();
        let (value, rest, any_digits) = parse_leading_i128(trimmed);
        if !any_digits {
            row.write(self.offset, &vec![0u8; self.len]);
            return StoreResult::BadValue;
        }

        let (clamped, overflowed) = self.clamp_to_width(value);
        self.write_int(row, clamped);

        if overflowed {
            StoreResult::OutOfRange
        } else if !rest.trim().is_empty() {
            StoreResult::TruncatedData
        } else {
            StoreResult::Ok
        }
    }

    fn clamp_to_width(&self, value: i128) -> (i128, bool) {
        let (min, max): (i128, i128) = match (self.kind, self.unsigned) {
            (FieldKind::Tiny, false) => (i8::MIN as i128, i8::MAX as i128),
            (FieldKind::Tiny, true) => (0, u8::MAX as i128),
            (FieldKind::Long, false) => (i32::MIN as i128, i32::MAX as i128),
            (FieldKind::Long, true) => (0, u32::MAX as i128),
            (FieldKind::LongLong, false) => (i64::MIN as i128, i64::MAX as i128),
            (FieldKind::LongLong, true) => (0, u64::MAX as i128),
            _ => (i64::MIN as i128, i64::MAX as i128),
        };
        if value < min {
            (min, true)
        } else if value > max {
            (max, true)
        } else {
            (value, false)
        }
    }

    fn write_int(&self, row: &mut RowBuffer, value: i128) {
        let bytes: Vec<u8> = match self.len {
            1 => vec![value as u8],
            4 => (value as i32).to_le_bytes().to_vec(),
            8 => (value as i64).to_le_bytes().to_vec(),
            _ => (value as i64).to_le_bytes().to_vec(),
        };
        row.write(self.offset, &bytes);
    }

    /// Inverse of `write_int`: widens whatever on-row width this field uses
    /// (1/4/8 bytes) back to `i64`, respecting signedness.
    fn read_int(&self, row: &RowBuffer) -> i64 {
        let unsigned = self.unsigned || self.kind == FieldKind::Enum;
        match self.len {
            1 => {
                let b = row.slice(self.offset, 1)[0];
                if unsigned {
                    b as i64
                } else {
                    b as i8 as i64
                }
            }
            4 => {
                let bytes: [u8; 4] = row.slice(self.offset, 4).try_into().unwrap();
                if unsigned {
                    u32::from_le_bytes(bytes) as i64
                } else {
                    i32::from_le_bytes(bytes) as i64
                }
            }
            _ => {
                let len = self.len.min(8);
                let mut buf = [0u8; 8];
                buf[..len].copy_from_slice(row.slice(self.offset, len));
                i64::from_le_bytes(buf)
            }
        }
    }

    fn store_double_text(&self, row: &mut RowBuffer, text: &str) -> StoreResult {
        let trimmed = text.trim();
        match trimmed.parse::<f64>() {
            Ok(v) => {
                row.write(self.offset, &v.to_le_bytes());
                StoreResult::Ok
            }
            Err(_) => {
                row.write(self.offset, &0f64.to_le_bytes());
                StoreResult::BadValue
            }
        }
    }

    fn store_decimal_text(&self, row: &mut RowBuffer, text: &str) -> StoreResult {
        let (dec, parse_result) = Decimal::from_str_checked(text);
        let (rescaled, rescale_result) =
            dec.rescale(self.decimal_precision as u32, self.decimal_scale as u32, RoundMode::HalfUp);
        self.write_decimal_bytes(row, &rescaled);

        match (parse_result, rescale_result) {
            (DecimalResult::BadNum, _) => StoreResult::BadValue,
            (_, DecimalResult::Overflow) => StoreResult::OutOfRange,
            (DecimalResult::Truncated, _) | (_, DecimalResult::Truncated) => StoreResult::TruncatedData,
            _ => StoreResult::Ok,
        }
    }

    fn write_decimal_bytes(&self, row: &mut RowBuffer, dec: &Decimal) {
        let packed = dec.pack_bin(self.decimal_precision as u32, self.decimal_scale as u32);
        row.write(self.offset, &packed);
    }

    fn store_date_text(&self, row: &mut RowBuffer, text: &str) -> StoreResult {
        match Date::parse(text, false) {
            Ok(d) => {
                row.write(self.offset, &d.pack());
                StoreResult::Ok
            }
            Err(_) => {
                row.write(self.offset, &ZERO_DATE.pack());
                StoreResult::BadValue
            }
        }
    }

    fn store_datetime_text(&self, row: &mut RowBuffer, text: &str) -> StoreResult {
        match DateTime::parse(text, false) {
            Ok(dt) => {
                row.write(self.offset, &dt.pack());
                StoreResult::Ok
            }
            Err(_) => {
                row.write(self.offset, &[0u8; 8]);
                StoreResult::BadValue
            }
        }
    }

    fn store_timestamp_text(&self, row: &mut RowBuffer, text: &str) -> StoreResult {
        match DateTime::parse(text, false) {
            Ok(dt) => {
                let jd = dt.date.to_julian_day();
                let day_seconds = dt.hour as i64 * 3600 + dt.minute as i64 * 60 + dt.second as i64;
                let epoch_seconds = (jd - EPOCH_JULIAN_DAY) * 86_400 + day_seconds;
                if epoch_seconds < 0 || epoch_seconds > u32::MAX as i64 {
                    row.write(self.offset, &0u32.to_le_bytes());
                    StoreResult::OutOfRange
                } else {
                    row.write(self.offset, &(epoch_seconds as u32).to_le_bytes());
                    StoreResult::Ok
                }
            }
            Err(_) => {
                row.write(self.offset, &0u32.to_le_bytes());
                StoreResult::BadValue
            }
        }
    }

    fn store_string_bytes(&self, row: &mut RowBuffer, bytes: &[u8]) -> StoreResult {
        let fits = bytes.len() <= self.declared_len;
        let (trimmed, was_truncated) = if fits {
            (bytes.to_vec(), false)
        } else {
            (bytes[..self.declared_len].to_vec(), true)
        };
        let prefix_len = if self.declared_len >= 256 { 2 } else { 1 };
        let mut out = Vec::with_capacity(prefix_len + trimmed.len());
        if prefix_len == 1 {
            out.push(trimmed.len() as u8);
        } else {
            out.extend_from_slice(&(trimmed.len() as u16).to_le_bytes());
        }
        out.extend_from_slice(&trimmed);
        out.resize(self.len, 0);
        row.write(self.offset, &out);

        if !was_truncated {
            StoreResult::Ok
        } else if bytes[self.declared_len..].iter().all(|&b| b == b' ') {
            StoreResult::TruncatedSpacesOnly
        } else {
            StoreResult::TruncatedData
        }
    }

    fn store_enum_text(&self, row: &mut RowBuffer, text: &str) -> StoreResult {
        let found = self
            .enum_labels
            .iter()
            .position(|label| label.eq_ignore_ascii_case(text));
        match found {
            Some(idx) => {
                let index = (idx + 1) as u32;
                self.write_int(row, index as i128);
                StoreResult::Ok
            }
            None => {
                self.write_int(row, 0);
                StoreResult::BadValue
            }
        }
    }

    // ---- extractors -------------------------------------------------------

    pub fn val_int(&self, row: &RowBuffer) -> i64 {
        if self.is_null(row) {
            return 0;
        }
        match self.kind {
            FieldKind::Tiny | FieldKind::Long | FieldKind::LongLong | FieldKind::Enum => self.read_int(row),
            FieldKind::Double => self.val_real(row) as i64,
            FieldKind::Decimal => self.val_decimal(row).to_i64().0,
            _ => 0,
        }
    }

    pub fn val_real(&self, row: &RowBuffer) -> f64 {
        if self.is_null(row) {
            return 0.0;
        }
        match self.kind {
            FieldKind::Double => f64::from_le_bytes(row.slice(self.offset, 8).try_into().unwrap()),
            FieldKind::Decimal => {
                self.val_decimal(row).to_plain_string().parse::<f64>().unwrap_or(0.0)
            }
            FieldKind::Tiny | FieldKind::Long | FieldKind::LongLong => self.val_int(row) as f64,
            _ => 0.0,
        }
    }

    pub fn val_decimal(&self, row: &RowBuffer) -> Decimal {
        if self.is_null(row) {
            return Decimal::zero();
        }
        match self.kind {
            FieldKind::Decimal => {
                let size = Decimal::bin_size(self.decimal_precision as u32, self.decimal_scale as u32);
                let bytes = row.slice(self.offset, size);
                Decimal::unpack_bin(bytes, self.decimal_precision as u32, self.decimal_scale as u32)
            }
            FieldKind::Tiny | FieldKind::Long | FieldKind::LongLong => {
                Decimal::from_str_checked(&self.val_int(row).to_string()).0
            }
            FieldKind::Double => Decimal::from_str_checked(&self.val_real(row).to_string()).0,
            _ => Decimal::zero(),
        }
    }

    pub fn val_str(&self, row: &RowBuffer) -> Vec<u8> {
        if self.is_null(row) {
            return Vec::new();
        }
        match self.kind {
            FieldKind::Varchar | FieldKind::Blob => {
                let prefix_len = if self.declared_len >= 256 { 2 } else { 1 };
                let header = row.slice(self.offset, prefix_len);
                let data_len = if prefix_len == 1 {
                    header[0] as usize
                } else {
                    u16::from_le_bytes([header[0], header[1]]) as usize
                };
                row.slice(self.offset + prefix_len, data_len).to_vec()
            }
            FieldKind::Enum => {
                let idx = self.val_int(row) as usize;
                if idx >= 1 && idx <= self.enum_labels.len() {
                    self.enum_labels[idx - 1].clone().into_bytes()
                } else {
                    Vec::new()
                }
            }
            FieldKind::Date => self.val_date(row).to_string().into_bytes(),
            FieldKind::DateTime => self.val_datetime(row).to_string().into_bytes(),
            FieldKind::Decimal => self.val_decimal(row).to_plain_string().into_bytes(),
            FieldKind::Tiny | FieldKind::Long | FieldKind::LongLong => self.val_int(row).to_string().into_bytes(),
            FieldKind::Double => self.val_real(row).to_string().into_bytes(),
            FieldKind::Timestamp | FieldKind::Null => Vec::new(),
        }
    }

    pub fn val_date(&self, row: &RowBuffer) -> Date {
        let bytes: [u8; 3] = row.slice(self.offset, 3).try_into().unwrap_or_default();
        Date::unpack(bytes)
    }

    pub fn val_datetime(&self, row: &RowBuffer) -> DateTime {
        let bytes: [u8; 8] = row.slice(self.offset, 8).try_into().unwrap_or_default();
        DateTime::unpack(bytes)
    }

    pub fn val_timestamp(&self, row: &RowBuffer) -> Timestamp {
        let bytes: [u8; 4] = row.slice(self.offset, 4).try_into().unwrap_or_default();
        Timestamp::unpack(bytes)
    }

    // ---- comparison / hashing / keys --------------------------------------

    /// Total order on the packed bytes; strings go through the collation
    /// service (spec.md §4.1).
    pub fn cmp(&self, a: &RowBuffer, b: &RowBuffer) -> Ordering {
        match self.kind {
            FieldKind::Varchar | FieldKind::Blob => {
                self.collation.strnncoll(&self.val_str(a), &self.val_str(b))
            }
            FieldKind::Double => self.val_real(a).partial_cmp(&self.val_real(b)).unwrap_or(Ordering::Equal),
            FieldKind::Decimal => {
                let (x, _) = self.val_decimal(a).to_i64();
                let (y, _) = self.val_decimal(b).to_i64();
                x.cmp(&y)
            }
            FieldKind::Date => self.val_date(a).compare(&self.val_date(b)),
            FieldKind::DateTime => self.val_datetime(a).compare(&self.val_datetime(b)),
            _ => self.cmp_binary(a, b),
        }
    }

    /// Byte-wise order regardless of collation (spec.md §4.1).
    pub fn cmp_binary(&self, a: &RowBuffer, b: &RowBuffer) -> Ordering {
        a.slice(self.offset, self.len).cmp(b.slice(self.offset, self.len))
    }

    /// Folds the packed bytes into two accumulators (spec.md §4.1); NULL
    /// mixes a distinguished pattern rather than zero bytes.
    pub fn hash(&self, row: &RowBuffer, nr1: &mut u64, nr2: &mut u64) {
        if self.is_null(row) {
            *nr1 ^= (*nr1 << 1) | 1;
            return;
        }
        match self.kind {
            FieldKind::Varchar | FieldKind::Blob => {
                self.collation.hash_sort(&self.val_str(row), nr1, nr2)
            }
            _ => self.collation.hash_sort(row.slice(self.offset, self.len), nr1, nr2),
        }
    }

    pub fn key_cmp(&self, a: &RowBuffer, b: &RowBuffer) -> Ordering {
        self.cmp(a, b)
    }

    /// For VARCHAR/BLOB only a prefix of `field_length` is keyable
    /// (spec.md §4.1).
    pub fn key_length(&self) -> usize {
        match self.kind {
            FieldKind::Varchar | FieldKind::Blob => self.declared_len.min(self.len),
            _ => self.len,
        }
    }

    pub fn sort_length(&self) -> usize {
        self.key_length()
    }

    // ---- pack / unpack ------------------------------------------------

    /// Writes the on-wire/on-disk packed form; may be shorter than the row
    /// form (VARCHAR strips trailing fill; spec.md §4.1).
    pub fn pack(&self, dst: &mut Vec<u8>, row: &RowBuffer) {
        match self.kind {
            FieldKind::Varchar | FieldKind::Blob => dst.extend_from_slice(&self.val_str(row)),
            _ => dst.extend_from_slice(row.slice(self.offset, self.len)),
        }
    }

    /// Inverse of `pack`. When the sender's `source_len` differs from our
    /// on-row length, fall back to a byte copy of `min(len, source_len)`
    /// (spec.md §4.1 — cross-version metadata mismatch).
    pub fn unpack(&self, row: &mut RowBuffer, src: &[u8], source_len: usize) {
        match self.kind {
            FieldKind::Varchar | FieldKind::Blob => {
                self.store_string_bytes(row, &src[..src.len().min(self.declared_len)]);
            }
            _ if source_len == self.len => {
                row.write(self.offset, &src[..self.len.min(src.len())]);
            }
            _ => {
                let copy_len = self.len.min(source_len).min(src.len());
                let mut buf = vec![0u8; self.len];
                buf[..copy_len].copy_from_slice(&src[..copy_len]);
                row.write(self.offset, &buf);
            }
        }
    }
}

/// Consumes leading decimal digits (after whitespace/sign handling was
/// already done by the caller); returns `(value, remaining_text,
/// any_digit_consumed)`.
fn parse_leading_i128(s: &str) -> (i128, &str, bool) {
    let mut chars = s.char_indices().peekable();
    let negative = match chars.peek() {
        Some((_, '-')) => {
            chars.next();
            true
        }
        Some((_, '+')) => {
            chars.next();
            false
        }
        _ => false,
    };

    let mut end = chars.peek().map(|&(i, _)| i).unwrap_or(s.len());
    let mut any_digits = false;
    for (i, c) in chars {
        if c.is_ascii_digit() {
            any_digits = true;
            end = i + c.len_utf8();
        } else {
            end = i;
            break;
        }
    }
    if !any_digits {
        return (0, s, false);
    }

    let digit_start = if negative || s.starts_with('+') { 1 } else { 0 };
    let digits = &s[digit_start..end];
    let value: i128 = digits.parse().unwrap_or(i128::MAX);
    let value = if negative { -value } else { value };
    (value, &s[end..], true)
}

#[cfg(test)]
mod test {
    use super::*;
    use common::collation::Binary;

    fn int_field(kind: FieldKind, len: usize) -> Field {
        Field::new("c", kind, 0, len, Arc::new(Binary))
    }

    #[test]
    fn store_int_truncates_on_trailing_garbage() {
        let field = int_field(FieldKind::Long, 4);
        let mut row = RowBuffer::new(4, 0);
        let mut sink = TestSink::default();
        let result = field.store_str(&mut row, "42abc", &mut sink, false);
        assert_eq!(result, StoreResult::TruncatedData);
        assert_eq!(field.val_int(&row), 42);
    }

    #[test]
    fn store_int_out_of_range_clamps() {
        let field = int_field(FieldKind::Tiny, 1);
        let mut row = RowBuffer::new(1, 0);
        let mut sink = TestSink::default();
        field.store_str(&mut row, "999", &mut sink, false);
        assert_eq!(field.val_int(&row), i8::MAX as i64);
    }

    #[test]
    fn store_and_extract_round_trips_for_varchar() {
        let field = Field::new("s", FieldKind::Varchar, 0, 9, Arc::new(Binary)).with_declared_len(8);
        let mut row = RowBuffer::new(9, 0);
        let mut sink = TestSink::default();
        field.store_str(&mut row, "hello", &mut sink, false);
        assert_eq!(field.val_str(&row), b"hello");
    }

    #[test]
    fn pack_length_invariant_round_trips() {
        let field = int_field(FieldKind::Long, 4);
        let mut row = RowBuffer::new(4, 0);
        let mut sink = TestSink::default();
        field.store_str(&mut row, "12345", &mut sink, false);

        let mut packed = Vec::new();
        field.pack(&mut packed, &row);

        let mut row2 = RowBuffer::new(4, 0);
        field.unpack(&mut row2, &packed, packed.len());
        assert_eq!(field.val_int(&row), field.val_int(&row2));
    }

    #[test]
    fn cmp_orders_numeric_fields() {
        let field = int_field(FieldKind::Long, 4);
        let mut sink = TestSink::default();
        let mut low = RowBuffer::new(4, 0);
        field.store_str(&mut low, "1", &mut sink, false);
        let mut high = RowBuffer::new(4, 0);
        field.store_str(&mut high, "2", &mut sink, false);
        assert_eq!(field.cmp(&low, &high), Ordering::Less);
    }

    #[test]
    fn reset_zeroes_bytes_and_clears_null() {
        let field = int_field(FieldKind::Long, 4).with_nullable(0);
        let mut row = RowBuffer::new(4, 1);
        row.set_null(0, true);
        field.reset(&mut row);
        assert!(!field.is_null(&row));
        assert_eq!(field.val_int(&row), 0);
    }

    #[test]
    fn enum_store_unknown_label_is_bad_value() {
        let field = int_field(FieldKind::Enum, 1).with_enum_labels(vec!["a".into(), "b".into()]);
        let mut row = RowBuffer::new(1, 0);
        let mut sink = TestSink::default();
        let result = field.store_str(&mut row, "zz", &mut sink, false);
        assert_eq!(result, StoreResult::BadValue);
        assert_eq!(field.val_int(&row), 0);
    }

    #[test]
    fn store_value_routes_typed_value_through_store_str() {
        let field = int_field(FieldKind::Long, 4);
        let mut row = RowBuffer::new(4, 0);
        let mut sink = TestSink::default();
        field.store_value(&mut row, &FieldValue::Int(7), &mut sink, false);
        assert_eq!(field.val_int(&row), 7);
    }

    #[derive(Default)]
    struct TestSink {
        cuted: u64,
    }

    impl WarningSink for TestSink {
        fn push_warning(&mut self, _level: common::session::WarningLevel, _code: &str, _text: &str) {}
        fn cuted_fields(&self) -> u64 {
            self.cuted
        }
        fn bump_cuted_fields(&mut self) {
            self.cuted += 1;
        }
    }
}
