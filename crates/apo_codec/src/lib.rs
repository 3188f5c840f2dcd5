//! # Apo Codec
//!
//! Deterministic big-endian binary encoding for apo.
//!
//! The same value always encodes to the same bytes:
//! - `bool` is one byte (0 or 1)
//! - Fixed-width integers are big-endian two's complement at their exact width
//! - `usize` / `isize` use the host pointer width
//! - Floats are their IEEE-754 bits, big-endian; complex numbers are two floats
//! - Text and sequences carry a 4-byte length prefix, then their content
//! - Fixed-size arrays use the sequence form and check the length on decode
//! - `Option` fields carry a 1-byte presence flag
//! - Records encode their persisted fields in declaration order
//!
//! Types opt in through [`Encode`] and [`Decode`]; structs usually get both
//! from [`impl_record!`]. Maps, closures and channels deliberately have no
//! implementation; wrap such fields in [`Transient`] to carry them without
//! persisting them.
//!
//! ## Usage
//!
//! ```
//! use apo_codec::{from_bytes, to_bytes};
//!
//! let bytes = to_bytes(&(7u16, "hi".to_string())).unwrap();
//! assert_eq!(bytes, vec![0, 7, 0, 0, 0, 2, b'h', b'i']);
//!
//! let decoded: (u16, String) = from_bytes(&bytes).unwrap();
//! assert_eq!(decoded, (7, "hi".to_string()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod decoder;
mod encoder;
mod error;
mod impls;
mod record;
mod types;
mod value;

pub use buffer::Buffer;
pub use decoder::{decode_into, from_bytes, Decoder, MAX_EMPTY_ITEMS};
pub use encoder::{to_bytes, Encoder};
pub use error::{CodecError, CodecResult};
pub use types::{Complex, Complex128, Complex64, Transient};
pub use value::{decode_value, encode_value, OpaqueKind, Shape, Value};

/// Trait for types that can be encoded to canonical bytes.
pub trait Encode {
    /// Append this value's encoding to `encoder`.
    fn encode(&self, encoder: &mut Encoder) -> CodecResult<()>;
}

/// Trait for types that can be decoded from canonical bytes.
pub trait Decode: Sized {
    /// Decode a value from the front of `decoder`, advancing it.
    fn decode(decoder: &mut Decoder<'_>) -> CodecResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn roundtrip_integers(a in any::<i64>(), b in any::<u32>(), c in any::<i8>()) {
            let bytes = to_bytes(&(a, b, c)).unwrap();
            prop_assert_eq!(bytes.len(), 13);
            prop_assert_eq!(from_bytes::<(i64, u32, i8)>(&bytes).unwrap(), (a, b, c));
        }

        #[test]
        fn roundtrip_float_bits(bits in any::<u64>()) {
            let value = f64::from_bits(bits);
            let decoded: f64 = from_bytes(&to_bytes(&value).unwrap()).unwrap();
            prop_assert_eq!(decoded.to_bits(), bits);
        }

        #[test]
        fn roundtrip_text(s in ".*") {
            let bytes = to_bytes(s.as_str()).unwrap();
            prop_assert_eq!(bytes.len(), 4 + s.len());
            prop_assert_eq!(from_bytes::<String>(&bytes).unwrap(), s);
        }

        #[test]
        fn roundtrip_nested(v in prop::collection::vec(prop::option::of(any::<u16>()), 0..32)) {
            let bytes = to_bytes(&v).unwrap();
            let present = v.iter().filter(|x| x.is_some()).count();
            prop_assert_eq!(bytes.len(), 4 + v.len() + 2 * present);
            prop_assert_eq!(from_bytes::<Vec<Option<u16>>>(&bytes).unwrap(), v);
        }

        #[test]
        fn fixed_array_length_must_match(len in 0usize..8) {
            let bytes = to_bytes(&vec![1u8; len]).unwrap();
            let result = from_bytes::<[u8; 4]>(&bytes);
            if len == 4 {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(
                    result,
                    Err(CodecError::LengthMismatch { expected: 4, actual: len })
                );
            }
        }
    }
}
