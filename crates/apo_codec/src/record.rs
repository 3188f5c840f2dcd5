//! Composite record support.

/// Implements [`Encode`](crate::Encode) and [`Decode`](crate::Decode) for a
/// struct by listing its persisted fields.
///
/// Fields are encoded in the order they are listed, which should be the
/// declaration order. Fields named in the optional `skip { .. }` block are not
/// persisted and are restored with `Default::default()` on decode.
///
/// ```
/// use apo_codec::{from_bytes, impl_record, to_bytes};
///
/// #[derive(Debug, PartialEq)]
/// struct User {
///     id: u64,
///     name: String,
///     manager: Option<Box<User>>,
///     visits: u32,
/// }
///
/// impl_record!(User { id, name, manager } skip { visits });
///
/// let user = User { id: 7, name: "ada".into(), manager: None, visits: 3 };
/// let bytes = to_bytes(&user).unwrap();
/// assert_eq!(bytes.len(), 8 + 4 + 3 + 1);
///
/// let back: User = from_bytes(&bytes).unwrap();
/// assert_eq!(back.visits, 0);
/// ```
#[macro_export]
macro_rules! impl_record {
    ($name:ident { $($field:ident),* $(,)? }) => {
        $crate::impl_record!($name { $($field),* } skip {});
    };
    ($name:ident { $($field:ident),* $(,)? } skip { $($skipped:ident),* $(,)? }) => {
        impl $crate::Encode for $name {
            #[allow(unused_variables)]
            fn encode(&self, encoder: &mut $crate::Encoder) -> $crate::CodecResult<()> {
                $( $crate::Encode::encode(&self.$field, encoder)?; )*
                Ok(())
            }
        }

        impl $crate::Decode for $name {
            #[allow(unused_variables)]
            fn decode(decoder: &mut $crate::Decoder<'_>) -> $crate::CodecResult<Self> {
                Ok(Self {
                    $( $field: $crate::Decode::decode(decoder)?, )*
                    $( $skipped: ::core::default::Default::default(), )*
                })
            }
        }
    };
}
