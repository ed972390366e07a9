//! Compact base-10⁹ decimal, modeled after `my_decimal.cc` and the
//! `EnhancedDecimalDecoder` binary layout (spec.md §4.3).

use std::fmt;

/// Number of base-10 digits packed into one `u32` limb.
const DIG_PER_DEC1: u32 = 9;
const POWERS10: [u32; 10] = [
    1, 10, 100, 1_000, 10_000, 100_000, 1_000_000, 10_000_000, 100_000_000, 1_000_000_000,
];

/// Outcome of a decimal parse/store/rescale operation. Mirrors the
/// `E_DEC_*` family from `my_decimal.cc`'s `decimal_operation_results`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalResult {
    Ok,
    Truncated,
    Overflow,
    DivZero,
    BadNum,
    Oom,
}

/// Rounding mode used when a value must be fit to a smaller scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundMode {
    HalfUp,
    Truncate,
}

/// A fixed-point decimal value: sign plus a little-endian array of
/// base-10⁹ limbs, split at `intg_digits`/`frac_digits`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    pub negative: bool,
    pub intg_digits: u32,
    pub frac_digits: u32,
    /// Little-endian base-10⁹ limbs: limb 0 holds the least-significant
    /// fractional digits, last limb holds the most-significant integer digits.
    limbs: Vec<u32>,
}

impl Decimal {
    pub fn zero() -> Self {
        Decimal {
            negative: false,
            intg_digits: 1,
            frac_digits: 0,
            limbs: vec![0],
        }
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    /// `string -> decimal` (spec.md §4.3): leading whitespace, sign, integer
    /// digits, optional fractional digits. Trailing non-space is TRUNCATED;
    /// non-base-10 garbage with no digits at all is BAD_NUM.
    pub fn from_str_checked(s: &str) -> (Decimal, DecimalResult) {
        let trimmed = s.trim_start();
        let mut chars = trimmed.chars().peekable();

        let negative = match chars.peek() {
            Some('-') => {
                chars.next();
                true
            }
            Some('+') => {
                chars.next();
                false
            }
            _ => false,
        };

        let mut int_part = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                int_part.push(c);
                chars.next();
            } else {
                break;
            }
        }

        let mut frac_part = String::new();
        if let Some(&'.') = chars.peek() {
            chars.next();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() {
                    frac_part.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
        }

        if int_part.is_empty() && frac_part.is_empty() {
            return (Decimal::zero(), DecimalResult::BadNum);
        }

        let rest: String = chars.collect();
        let result = if rest.trim().is_empty() {
            DecimalResult::Ok
        } else {
            DecimalResult::Truncated
        };

        let dec = Decimal::from_digit_strings(negative, &int_part, &frac_part);
        (dec, result)
    }

    fn from_digit_strings(negative: bool, int_part: &str, frac_part: &str) -> Decimal {
        let int_part = if int_part.is_empty() { "0" } else { int_part };
        let intg_digits = int_part.len() as u32;
        let frac_digits = frac_part.len() as u32;

        let mut limbs = Vec::new();
        // fractional limbs, most-significant-first grouping, stored least-significant-limb-first
        let frac_groups = group_digits(frac_part, true);
        for g in frac_groups.iter().rev() {
            limbs.push(*g);
        }
        let int_groups = group_digits(int_part, false);
        for g in int_groups.iter().rev() {
            limbs.push(*g);
        }
        if limbs.is_empty() {
            limbs.push(0);
        }

        let negative = negative && !limbs.iter().all(|&l| l == 0);
        Decimal {
            negative,
            intg_digits,
            frac_digits,
            limbs,
        }
    }

    /// Renders canonical decimal text, e.g. `-123.40`.
    pub fn to_plain_string(&self) -> String {
        let mut s = String::new();
        if self.negative && !self.is_zero() {
            s.push('-');
        }

        let int_digits = self.integer_digit_string();
        s.push_str(&int_digits);

        if self.frac_digits > 0 {
            s.push('.');
            s.push_str(&self.fraction_digit_string());
        }
        s
    }

    fn integer_digit_string(&self) -> String {
        let frac_groups = ((self.frac_digits + DIG_PER_DEC1 - 1) / DIG_PER_DEC1) as usize;
        let int_groups = self.limbs.len() - frac_groups.min(self.limbs.len());
        if int_groups == 0 {
            return "0".to_string();
        }
        let mut parts = Vec::with_capacity(int_groups);
        for (i, idx) in (frac_groups..self.limbs.len()).rev().enumerate() {
            if i == 0 {
                parts.push(self.limbs[idx].to_string());
            } else {
                parts.push(format!("{:09}", self.limbs[idx]));
            }
        }
        if parts.is_empty() {
            "0".to_string()
        } else {
            parts.join("")
        }
    }

    fn fraction_digit_string(&self) -> String {
        let frac_groups = ((self.frac_digits + DIG_PER_DEC1 - 1) / DIG_PER_DEC1) as usize;
        let mut parts = Vec::with_capacity(frac_groups);
        for idx in (0..frac_groups.min(self.limbs.len())).rev() {
            parts.push(format!("{:09}", self.limbs[idx]));
        }
        let joined = parts.join("");
        let joined = if joined.len() < self.frac_digits as usize {
            format!("{:0<width$}", joined, width = self.frac_digits as usize)
        } else {
            joined
        };
        joined[..self.frac_digits as usize].to_string()
    }

    /// `decimal -> string` with ZEROFILL padding to a fixed (precision, scale).
    pub fn to_zerofilled_string(&self, precision: u32, scale: u32, fill: char) -> String {
        let plain = self.rescale(precision, scale, RoundMode::Truncate).0;
        let int_len = precision.saturating_sub(scale).max(1);
        let int_str = plain.integer_digit_string();
        let padded = if (int_str.len() as u32) < int_len {
            format!(
                "{}{}",
                fill.to_string().repeat((int_len - int_str.len() as u32) as usize),
                int_str
            )
        } else {
            int_str
        };
        let mut out = String::new();
        if plain.negative && !plain.is_zero() {
            out.push('-');
        }
        out.push_str(&padded);
        if scale > 0 {
            out.push('.');
            out.push_str(&plain.fraction_digit_string());
        }
        out
    }

    /// `decimal -> i64`, HALF_UP toward zero; overflow clamps and flags.
    pub fn to_i64(&self) -> (i64, DecimalResult) {
        let int_str = self.integer_digit_string();
        let frac_str = self.fraction_digit_string();
        let round_up = frac_str.chars().next().map(|c| c >= '5').unwrap_or(false);

        let mut magnitude: i128 = int_str.parse().unwrap_or(i128::MAX);
        if round_up {
            magnitude += 1;
        }
        let signed = if self.negative { -magnitude } else { magnitude };

        if signed > i64::MAX as i128 {
            (i64::MAX, DecimalResult::Overflow)
        } else if signed < i64::MIN as i128 {
            (i64::MIN, DecimalResult::Overflow)
        } else {
            (signed as i64, DecimalResult::Ok)
        }
    }

    /// Rescale to a new (precision, scale), per `my_decimal.cc`'s rescale used
    /// internally by `store` when the source scale differs from the column's.
    pub fn rescale(&self, precision: u32, scale: u32, mode: RoundMode) -> (Decimal, DecimalResult) {
        let int_str = self.integer_digit_string();
        let mut frac_str = self.fraction_digit_string();

        let mut result = DecimalResult::Ok;
        let mut carry = false;

        if (frac_str.len() as u32) > scale {
            let dropped = &frac_str[scale as usize..];
            let round_up = mode == RoundMode::HalfUp
                && dropped.chars().next().map(|c| c >= '5').unwrap_or(false);
            frac_str.truncate(scale as usize);
            result = DecimalResult::Truncated;
            if round_up {
                carry = true;
            }
        } else if (frac_str.len() as u32) < scale {
            frac_str = format!("{:0<width$}", frac_str, width = scale as usize);
        }

        let mut int_val: i128 = int_str.parse().unwrap_or(0);
        if carry {
            let frac_val: i128 = if frac_str.is_empty() {
                0
            } else {
                frac_str.parse().unwrap_or(0)
            };
            let frac_val = frac_val + 1;
            let scale_pow = 10i128.pow(scale);
            if frac_val >= scale_pow {
                int_val += 1;
                frac_str = "0".repeat(scale as usize);
            } else {
                frac_str = format!("{:0width$}", frac_val, width = scale as usize);
            }
        }

        let int_limit = precision.saturating_sub(scale).max(1);
        let max_int: i128 = 10i128.pow(int_limit) - 1;
        let (int_val, frac_str, out_of_range) = if int_val > max_int {
            (max_int, "9".repeat(scale as usize), true)
        } else {
            (int_val, frac_str, false)
        };

        if out_of_range {
            result = DecimalResult::Overflow;
        }

        let mut dec = Decimal::from_digit_strings(self.negative, &int_val.to_string(), &frac_str);
        dec.intg_digits = int_limit;
        dec.frac_digits = scale;
        (dec, result)
    }

    /// On-row byte length of the compact base-10⁹ binary form for a given
    /// (precision, scale), per `my_decimal.cc`'s `decimal_bin_size`.
    pub fn bin_size(precision: u32, scale: u32) -> usize {
        let intg = precision.saturating_sub(scale).max(1);
        let frac = scale;
        let intg0 = (intg / DIG_PER_DEC1) as usize;
        let frac0 = (frac / DIG_PER_DEC1) as usize;
        let intg0x = (intg % DIG_PER_DEC1) as usize;
        let frac0x = (frac % DIG_PER_DEC1) as usize;
        intg0 * 4 + dig2bytes(intg0x) + frac0 * 4 + dig2bytes(frac0x)
    }

    /// Packs this value (already rescaled to `(precision, scale)`, see
    /// [`Decimal::rescale`]) into the compact base-10⁹ binary form
    /// `my_decimal.cc`'s `decimal2bin` produces: a leading partial limb,
    /// full 9-digit limbs, a trailing partial limb, each stored big-endian
    /// in the minimal byte width for its digit count, with the sign folded
    /// in by flipping the first byte's top bit (positive) or bit-inverting
    /// every byte (negative) so unsigned byte comparison orders correctly.
    pub fn pack_bin(&self, precision: u32, scale: u32) -> Vec<u8> {
        let intg = precision.saturating_sub(scale).max(1);
        let frac = scale;
        let intg0 = intg / DIG_PER_DEC1;
        let frac0 = frac / DIG_PER_DEC1;
        let intg0x = intg % DIG_PER_DEC1;
        let frac0x = frac % DIG_PER_DEC1;

        let int_digits = self.integer_digit_string();
        let int_str = pad_left(&int_digits, intg as usize);
        let frac_digits = self.fraction_digit_string();
        let frac_str = pad_right(&frac_digits, frac as usize);

        let mut out = Vec::with_capacity(Decimal::bin_size(precision, scale));
        let mut pos = 0usize;
        if intg0x > 0 {
            write_limb(&mut out, &int_str[pos..pos + intg0x as usize], intg0x as usize);
            pos += intg0x as usize;
        }
        for _ in 0..intg0 {
            write_limb(&mut out, &int_str[pos..pos + DIG_PER_DEC1 as usize], DIG_PER_DEC1 as usize);
            pos += DIG_PER_DEC1 as usize;
        }

        let mut fpos = 0usize;
        for _ in 0..frac0 {
            write_limb(&mut out, &frac_str[fpos..fpos + DIG_PER_DEC1 as usize], DIG_PER_DEC1 as usize);
            fpos += DIG_PER_DEC1 as usize;
        }
        if frac0x > 0 {
            write_limb(&mut out, &frac_str[fpos..fpos + frac0x as usize], frac0x as usize);
        }

        // The magnitude's first byte always has its top bit clear (every limb
        // fits its allotted byte width). Negative values are bit-inverted
        // first so larger magnitudes sort as smaller byte strings, then every
        // value's first byte has its top bit flipped so negative (0......)
        // sorts below positive (1......).
        if !out.is_empty() {
            if self.negative && !self.is_zero() {
                for b in out.iter_mut() {
                    *b = !*b;
                }
            }
            out[0] ^= 0x80;
        }
        out
    }

    /// Inverse of [`Decimal::pack_bin`].
    pub fn unpack_bin(bytes: &[u8], precision: u32, scale: u32) -> Decimal {
        let intg = precision.saturating_sub(scale).max(1);
        let frac = scale;
        let intg0 = intg / DIG_PER_DEC1;
        let frac0 = frac / DIG_PER_DEC1;
        let intg0x = intg % DIG_PER_DEC1;
        let frac0x = frac % DIG_PER_DEC1;

        if bytes.is_empty() {
            return Decimal::zero();
        }
        let negative = bytes[0] & 0x80 == 0;
        let mut buf = bytes.to_vec();
        buf[0] ^= 0x80;
        if negative {
            for b in buf.iter_mut() {
                *b = !*b;
            }
        }

        let mut pos = 0usize;
        let mut int_str = String::new();
        if intg0x > 0 {
            int_str.push_str(&read_limb(&buf, &mut pos, intg0x as usize));
        }
        for _ in 0..intg0 {
            int_str.push_str(&read_limb(&buf, &mut pos, DIG_PER_DEC1 as usize));
        }

        let mut frac_str = String::new();
        for _ in 0..frac0 {
            frac_str.push_str(&read_limb(&buf, &mut pos, DIG_PER_DEC1 as usize));
        }
        if frac0x > 0 {
            frac_str.push_str(&read_limb(&buf, &mut pos, frac0x as usize));
        }

        let mut dec = Decimal::from_digit_strings(negative, &int_str, &frac_str);
        dec.intg_digits = intg;
        dec.frac_digits = scale;
        dec
    }
}

fn pad_left(digits: &str, width: usize) -> String {
    if digits.len() >= width {
        digits[digits.len() - width..].to_string()
    } else {
        format!("{:0>width$}", digits, width = width)
    }
}

fn pad_right(digits: &str, width: usize) -> String {
    if digits.len() >= width {
        digits[..width].to_string()
    } else {
        format!("{:0<width$}", digits, width = width)
    }
}

/// Minimal byte width for an n-digit base-10⁹ limb (`dig2bytes` in `my_decimal.cc`).
fn dig2bytes(n: usize) -> usize {
    const TABLE: [usize; 10] = [0, 1, 1, 2, 2, 3, 3, 4, 4, 4];
    TABLE[n.min(9)]
}

fn write_limb(out: &mut Vec<u8>, digits: &str, ndigits: usize) {
    let val: u32 = digits.parse().unwrap_or(0);
    let width = dig2bytes(ndigits);
    let be = val.to_be_bytes();
    out.extend_from_slice(&be[4 - width..]);
}

fn read_limb(buf: &[u8], pos: &mut usize, ndigits: usize) -> String {
    let width = dig2bytes(ndigits);
    let mut arr = [0u8; 4];
    arr[4 - width..].copy_from_slice(&buf[*pos..*pos + width]);
    *pos += width;
    let val = u32::from_be_bytes(arr);
    format!("{:0>width$}", val, width = ndigits)
}

fn group_digits(digits: &str, is_fraction: bool) -> Vec<u32> {
    if digits.is_empty() {
        return Vec::new();
    }
    let mut groups = Vec::new();
    if is_fraction {
        let mut chars: Vec<char> = digits.chars().collect();
        while !chars.is_empty() {
            let take = DIG_PER_DEC1.min(chars.len() as u32) as usize;
            let group: String = chars.drain(..take).collect();
            let padded = format!("{:0<9}", group);
            groups.push(padded.parse().unwrap_or(0));
        }
    } else {
        let len = digits.len();
        let mut start = len % DIG_PER_DEC1 as usize;
        if start == 0 && len > 0 {
            start = DIG_PER_DEC1 as usize;
        }
        let mut pos = 0;
        if start > 0 && start <= len {
            groups.push(digits[..start].parse().unwrap_or(0));
            pos = start;
        }
        while pos < len {
            let end = (pos + DIG_PER_DEC1 as usize).min(len);
            groups.push(digits[pos..end].parse().unwrap_or(0));
            pos = end;
        }
    }
    let _ = POWERS10;
    groups
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_simple_value() {
        let (d, r) = Decimal::from_str_checked("123.45");
        assert_eq!(r, DecimalResult::Ok);
        assert_eq!(d.to_plain_string(), "123.45");
    }

    #[test]
    fn trailing_garbage_is_truncated() {
        let (d, r) = Decimal::from_str_checked("42abc");
        assert_eq!(r, DecimalResult::Truncated);
        assert_eq!(d.to_plain_string(), "42");
    }

    #[test]
    fn pure_garbage_is_bad_num() {
        let (_, r) = Decimal::from_str_checked("abc");
        assert_eq!(r, DecimalResult::BadNum);
    }

    #[test]
    fn negative_value_round_trips() {
        let (d, _) = Decimal::from_str_checked("-7.5");
        assert_eq!(d.to_plain_string(), "-7.5");
    }

    #[test]
    fn rescale_truncates_and_flags() {
        let (d, _) = Decimal::from_str_checked("123.456");
        let (rescaled, r) = d.rescale(5, 2, RoundMode::HalfUp);
        assert_eq!(rescaled.to_plain_string(), "123.46");
        assert_eq!(r, DecimalResult::Truncated);
    }

    #[test]
    fn rescale_overflow_clamps() {
        let (d, _) = Decimal::from_str_checked("99999.9");
        let (rescaled, r) = d.rescale(5, 2, RoundMode::HalfUp);
        assert_eq!(r, DecimalResult::Overflow);
        assert_eq!(rescaled.to_plain_string(), "999.99");
    }

    #[test]
    fn to_i64_rounds_half_up() {
        let (d, _) = Decimal::from_str_checked("2.5");
        let (n, r) = d.to_i64();
        assert_eq!(n, 3);
        assert_eq!(r, DecimalResult::Ok);
    }

    #[test]
    fn zerofill_pads_integer_part() {
        let (d, _) = Decimal::from_str_checked("7.1");
        assert_eq!(d.to_zerofilled_string(5, 2, '0'), "007.10");
    }

    #[test]
    fn bin_round_trips_positive_and_negative() {
        for text in ["123.46", "-123.46", "0.00", "999.99", "-1.00"] {
            let (d, _) = Decimal::from_str_checked(text);
            let (rescaled, _) = d.rescale(5, 2, RoundMode::HalfUp);
            let packed = rescaled.pack_bin(5, 2);
            assert_eq!(packed.len(), Decimal::bin_size(5, 2));
            let unpacked = Decimal::unpack_bin(&packed, 5, 2);
            assert_eq!(unpacked.to_plain_string(), rescaled.to_plain_string());
        }
    }

    #[test]
    fn bin_size_matches_mysql_dig2bytes_table() {
        // precision 5, scale 2 -> intg=3 (one partial 3-digit limb), frac=2
        // (one partial 2-digit limb): dig2bytes[3] + dig2bytes[2] = 2 + 1.
        assert_eq!(Decimal::bin_size(5, 2), 3);
        // precision 9, scale 0 -> intg=9 (one full limb), frac=0.
        assert_eq!(Decimal::bin_size(9, 0), 4);
    }

    #[test]
    fn bin_ordering_is_unsigned_byte_comparable() {
        let (small, _) = Decimal::from_str_checked("-5.00");
        let (big, _) = Decimal::from_str_checked("5.00");
        let small_packed = small.rescale(5, 2, RoundMode::HalfUp).0.pack_bin(5, 2);
        let big_packed = big.rescale(5, 2, RoundMode::HalfUp).0.pack_bin(5, 2);
        assert!(small_packed < big_packed);
    }
}
