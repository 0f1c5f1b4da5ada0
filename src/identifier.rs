//! XOR distance and bit extraction over byte-string identifiers.
//!
//! Based on the distance/bit-index arithmetic in
//! <https://github.com/tristanls/k-bucket/blob/master/index.js>, generalized from a
//! machine-word-sized fold to an arbitrary-length big-endian byte string so identifiers
//! longer than `size_of::<usize>()` still order correctly.

/// Identifiers are opaque byte strings; callers decide the length (20 bytes/160 bits is
/// the common case, but nothing here assumes it).
pub type Id = Vec<u8>;

/// XOR distance between two identifiers, as a big-endian byte string.
///
/// The shorter identifier is conceptually right-padded with `0xFF` bytes, so a missing
/// tail counts as maximally distant rather than zero. The result compares correctly with
/// `Ord`/`PartialOrd` on `[u8]` because it is itself a big-endian magnitude.
pub fn distance(a: &[u8], b: &[u8]) -> Vec<u8> {
    let len = a.len().max(b.len());
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0xFF);
        let y = b.get(i).copied().unwrap_or(0xFF);
        out.push(x ^ y);
    }
    out
}

/// The `i`th bit of `id`, MSB-first from byte 0. `true` means 1 (route right), `false`
/// means 0 (route left).
///
/// Identifiers shorter than `i` requires always route left, regardless of whether `i`
/// falls on a byte boundary.
pub fn bit_at(id: &[u8], i: usize) -> bool {
    let byte_index = i / 8;
    if byte_index >= id.len() {
        return false;
    }
    let bit_in_byte = i % 8;
    (id[byte_index] & (1 << (7 - bit_in_byte))) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_reflexive() {
        let a = vec![0x01, 0x02, 0x03];
        assert_eq!(distance(&a, &a), vec![0, 0, 0]);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = vec![0x01, 0x02, 0x03];
        let b = vec![0xff, 0x00, 0x10];
        assert_eq!(distance(&a, &b), distance(&b, &a));
    }

    #[test]
    fn distance_pads_short_side_with_0xff() {
        let a = vec![0x00];
        let b = vec![0x00, 0x00];
        // second byte of `a` is conceptually 0xff, so xor with 0x00 is 0xff
        assert_eq!(distance(&a, &b), vec![0x00, 0xff]);
    }

    #[test]
    fn bit_at_reads_msb_first() {
        let id = [0b1000_0001u8];
        assert!(bit_at(&id, 0));
        assert!(!bit_at(&id, 1));
        assert!(!bit_at(&id, 6));
        assert!(bit_at(&id, 7));
    }

    #[test]
    fn bit_at_short_identifier_routes_left() {
        let id = [0x00u8]; // 8 bits total
        assert!(!bit_at(&id, 8)); // one bit past the end, not on... it IS on a byte boundary
        assert!(!bit_at(&id, 9)); // past the end, not on a byte boundary
        assert!(!bit_at(&id, 16));
    }
}
