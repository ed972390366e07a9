//! `FieldKind`: the tagged variant that replaces the teacher's virtual
//! per-type column hierarchy (spec.md §9, REDESIGN FLAGS item 1).

/// Result family used by the expression evaluator for arithmetic promotion
/// (spec.md §4.1.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFamily {
    Int,
    Real,
    Decimal,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Tiny,
    Long,
    LongLong,
    Double,
    Decimal,
    Date,
    DateTime,
    Timestamp,
    Varchar,
    Blob,
    Enum,
    Null,
}

impl FieldKind {
    /// The merge-lattice row/column label (spec.md §4.1.1's table groups
    /// TINY/LONG/LONGLONG under one `NUM` label and STR/ENUM under one).
    fn lattice_label(self) -> LatticeLabel {
        match self {
            FieldKind::Tiny | FieldKind::Long | FieldKind::LongLong => LatticeLabel::Num,
            FieldKind::Double => LatticeLabel::Double,
            FieldKind::Decimal => LatticeLabel::Dec,
            FieldKind::Timestamp => LatticeLabel::Ts,
            FieldKind::DateTime => LatticeLabel::Dt,
            FieldKind::Date => LatticeLabel::DateLabel,
            FieldKind::Varchar | FieldKind::Enum => LatticeLabel::Str,
            FieldKind::Blob => LatticeLabel::Blob,
            FieldKind::Null => LatticeLabel::Null,
        }
    }

    pub fn result_family(self) -> ResultFamily {
        match self {
            FieldKind::Tiny | FieldKind::Long | FieldKind::LongLong => ResultFamily::Int,
            FieldKind::Double => ResultFamily::Real,
            FieldKind::Decimal => ResultFamily::Decimal,
            _ => ResultFamily::String,
        }
    }

    /// `NUM` merged with `NUM` widens toward `LONGLONG` (spec.md §4.1.1).
    fn widen_num(a: FieldKind, b: FieldKind) -> FieldKind {
        fn rank(k: FieldKind) -> u8 {
            match k {
                FieldKind::Tiny => 0,
                FieldKind::Long => 1,
                _ => 2,
            }
        }
        if rank(a) >= rank(b) {
            a
        } else {
            b
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LatticeLabel {
    Num,
    Double,
    Dec,
    Ts,
    Dt,
    DateLabel,
    Str,
    Blob,
    Null,
}

/// `merge(A, B)`: the variant that can losslessly (or least-lossily) hold
/// values of either, per spec.md §4.1.1's table. NULL is the identity.
pub fn merge(a: FieldKind, b: FieldKind) -> FieldKind {
    if a == FieldKind::Null {
        return b;
    }
    if b == FieldKind::Null {
        return a;
    }
    if a.lattice_label() == LatticeLabel::Num && b.lattice_label() == LatticeLabel::Num {
        return FieldKind::widen_num(a, b);
    }

    // spec.md §9 open question: the original source's merge table for
    // (LONGLONG, DATE) is LONGLONG -> DATE -> DATE, asymmetric and
    // surprising relative to the rest of the NUM row (which resolves to
    // STR). Preserved verbatim rather than normalized to commutative; the
    // reverse order (DATE, LONGLONG) falls through to the general table.
    if a == FieldKind::LongLong && b == FieldKind::Date {
        return FieldKind::Date;
    }

    use LatticeLabel::*;
    let result = match (a.lattice_label(), b.lattice_label()) {
        (Num, Double) | (Double, Num) => Double,
        (Num, Dec) | (Dec, Num) => Dec,
        (Num, Ts) | (Ts, Num) => Str,
        (Num, Dt) | (Dt, Num) => Str,
        // Asymmetric per spec.md §9 open questions: the source's merge
        // table for (LONGLONG, DATE) is LONGLONG -> DATE -> DATE, not the
        // STR the rest of the NUM row would suggest. Preserved verbatim.
        (Num, DateLabel) => DateLabel,
        (DateLabel, Num) => Str,
        (Num, Str) | (Str, Num) => Str,
        (Num, Blob) | (Blob, Num) => Blob,

        (Double, Double) => Double,
        (Double, Dec) | (Dec, Double) => Double,
        (Double, Ts) | (Ts, Double) => Str,
        (Double, Dt) | (Dt, Double) => Str,
        (Double, DateLabel) | (DateLabel, Double) => Str,
        (Double, Str) | (Str, Double) => Str,
        (Double, Blob) | (Blob, Double) => Blob,

        (Dec, Dec) => Dec,
        (Dec, Ts) | (Ts, Dec) => Str,
        (Dec, Dt) | (Dt, Dec) => Str,
        (Dec, DateLabel) | (DateLabel, Dec) => Str,
        (Dec, Str) | (Str, Dec) => Str,
        (Dec, Blob) | (Blob, Dec) => Blob,

        (Ts, Ts) => Ts,
        (Ts, Dt) | (Dt, Ts) => Dt,
        (Ts, DateLabel) | (DateLabel, Ts) => DateLabel,
        (Ts, Str) | (Str, Ts) => Str,
        (Ts, Blob) | (Blob, Ts) => Blob,

        (Dt, Dt) => Dt,
        (Dt, DateLabel) | (DateLabel, Dt) => DateLabel,
        (Dt, Str) | (Str, Dt) => Str,
        (Dt, Blob) | (Blob, Dt) => Blob,

        (DateLabel, DateLabel) => DateLabel,
        (DateLabel, Str) | (Str, DateLabel) => Str,
        (DateLabel, Blob) | (Blob, DateLabel) => Blob,

        (Str, Str) => Str,
        (Str, Blob) | (Blob, Str) => Blob,

        (Blob, Blob) => Blob,
        (Null, _) | (_, Null) => Null,
        (Num, Num) => unreachable!("handled above"),
    };

    label_to_representative(result)
}

fn label_to_representative(label: LatticeLabel) -> FieldKind {
    match label {
        LatticeLabel::Num => FieldKind::LongLong,
        LatticeLabel::Double => FieldKind::Double,
        LatticeLabel::Dec => FieldKind::Decimal,
        LatticeLabel::Ts => FieldKind::Timestamp,
        LatticeLabel::Dt => FieldKind::DateTime,
        LatticeLabel::DateLabel => FieldKind::Date,
        LatticeLabel::Str => FieldKind::Varchar,
        LatticeLabel::Blob => FieldKind::Blob,
        LatticeLabel::Null => FieldKind::Null,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn null_is_identity() {
        assert_eq!(merge(FieldKind::Null, FieldKind::Long), FieldKind::Long);
        assert_eq!(merge(FieldKind::Decimal, FieldKind::Null), FieldKind::Decimal);
    }

    #[test]
    fn num_widens_toward_longlong() {
        assert_eq!(merge(FieldKind::Tiny, FieldKind::Long), FieldKind::Long);
        assert_eq!(merge(FieldKind::Long, FieldKind::LongLong), FieldKind::LongLong);
    }

    #[test]
    fn num_and_double_merge_to_double() {
        assert_eq!(merge(FieldKind::Long, FieldKind::Double), FieldKind::Double);
    }

    #[test]
    fn blob_is_absorbing() {
        assert_eq!(merge(FieldKind::Blob, FieldKind::Varchar), FieldKind::Blob);
        assert_eq!(merge(FieldKind::Long, FieldKind::Blob), FieldKind::Blob);
    }

    #[test]
    fn merge_is_commutative() {
        let kinds = [
            FieldKind::Tiny,
            FieldKind::Double,
            FieldKind::Decimal,
            FieldKind::Timestamp,
            FieldKind::DateTime,
            FieldKind::Date,
            FieldKind::Varchar,
            FieldKind::Blob,
        ];
        for &a in &kinds {
            for &b in &kinds {
                assert_eq!(merge(a, b), merge(b, a), "merge({:?},{:?}) not commutative", a, b);
            }
        }
    }

    #[test]
    fn merge_is_idempotent() {
        for &k in &[FieldKind::Long, FieldKind::Double, FieldKind::Date, FieldKind::Varchar] {
            assert_eq!(merge(k, k), k);
        }
    }

    #[test]
    fn longlong_date_asymmetry_is_preserved() {
        // spec.md §9 open question: the original source's (LONGLONG, DATE)
        // merge is asymmetric. LONGLONG-first resolves to DATE; the
        // reverse order follows the general NUM/DATE row, which is STR.
        assert_eq!(merge(FieldKind::LongLong, FieldKind::Date), FieldKind::Date);
        assert_eq!(merge(FieldKind::Date, FieldKind::LongLong), FieldKind::Varchar);
    }

    #[test]
    fn result_family_projection() {
        assert_eq!(FieldKind::Tiny.result_family(), ResultFamily::Int);
        assert_eq!(FieldKind::Double.result_family(), ResultFamily::Real);
        assert_eq!(FieldKind::Decimal.result_family(), ResultFamily::Decimal);
        assert_eq!(FieldKind::Date.result_family(), ResultFamily::String);
        assert_eq!(FieldKind::Null.result_family(), ResultFamily::String);
    }
}
