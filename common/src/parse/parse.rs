use crate::err::decode_error::Needed;

/// A cursor over an in-memory byte slice that the codec primitives in
/// [`crate::codec`] decode fixed-width values from. Modeled as a trait
/// (rather than a concrete `Cursor<&[u8]>`) so the same decode logic works
/// against a plain slice or a `bytes::Bytes` view without copying.
macro_rules! impl_check {
    ($t:ty, $arr:ty => $($name:ident: $m:ident),*) => {
        $(
            fn $name(&mut self) -> Result<$t, Needed> {
                let arr: $arr = self.read_array()?;
                Ok(<$t>::$m(arr))
            }
        )*
    };
}

pub trait InputBuf {
    fn left(&self) -> usize;
    fn slice(&self) -> &[u8];
    fn jump_to(&mut self, pos: usize) -> Result<(), Needed>;

    fn read_vec(&mut self, count: usize) -> Result<Vec<u8>, Needed> {
        if self.left() < count {
            return Err(Needed::NoEnoughData);
        }
        let data: Vec<u8> = self.slice()[..count].to_vec();
        self.jump_to(count)?;
        Ok(data)
    }

    fn read_to_end(&mut self) -> Vec<u8> {
        let len = self.left();
        self.read_vec(len).unwrap_or_default()
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Needed> {
        if self.left() < N {
            return Err(Needed::NoEnoughData);
        }
        let mut arr: [u8; N] = [0; N];
        arr.copy_from_slice(&self.slice()[..N]);
        self.jump_to(N)?;
        Ok(arr)
    }

    impl_check!(u8, [u8; 1] => read_u8_be: from_be_bytes, read_u8_le: from_le_bytes);
    impl_check!(u16, [u8; 2] => read_u16_be: from_be_bytes, read_u16_le: from_le_bytes);
    impl_check!(u32, [u8; 4] => read_u32_be: from_be_bytes, read_u32_le: from_le_bytes);
    impl_check!(u64, [u8; 8] => read_u64_be: from_be_bytes, read_u64_le: from_le_bytes);
    impl_check!(i8, [u8; 1] => read_i8_be: from_be_bytes, read_i8_le: from_le_bytes);
    impl_check!(i16, [u8; 2] => read_i16_be: from_be_bytes, read_i16_le: from_le_bytes);
    impl_check!(i32, [u8; 4] => read_i32_be: from_be_bytes, read_i32_le: from_le_bytes);
    impl_check!(i64, [u8; 8] => read_i64_be: from_be_bytes, read_i64_le: from_le_bytes);
    impl_check!(f32, [u8; 4] => read_f32_be: from_be_bytes, read_f32_le: from_le_bytes);
    impl_check!(f64, [u8; 8] => read_f64_be: from_be_bytes, read_f64_le: from_le_bytes);
}

impl InputBuf for &[u8] {
    fn left(&self) -> usize {
        self.len()
    }

    fn slice(&self) -> &[u8] {
        self
    }

    fn jump_to(&mut self, pos: usize) -> Result<(), Needed> {
        if self.len() < pos {
            return Err(Needed::NoEnoughData);
        }
        *self = &self[pos..];
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_fixed_width_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut s = &data[..];
        assert_eq!(s.read_u32_le().unwrap(), 0x0403_0201);
        assert_eq!(s.left(), 0);
    }

    #[test]
    fn read_past_end_is_needed() {
        let data = [0x01];
        let mut s = &data[..];
        assert!(matches!(s.read_u32_le(), Err(Needed::NoEnoughData)));
    }
}
