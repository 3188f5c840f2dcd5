//! `Encode` / `Decode` for the built-in shapes.

use std::marker::PhantomData;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{CodecError, CodecResult};
use crate::{Decode, Encode};

macro_rules! impl_fixed {
    ($($ty:ty => $put:ident, $get:ident;)+) => {
        $(
            impl Encode for $ty {
                #[inline]
                fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
                    encoder.$put(*self);
                    Ok(())
                }
            }

            impl Decode for $ty {
                #[inline]
                fn decode(decoder: &mut Decoder<'_>) -> CodecResult<Self> {
                    decoder.$get()
                }
            }
        )+
    };
}

impl_fixed! {
    bool => put_bool, get_bool;
    u8 => put_u8, get_u8;
    i8 => put_i8, get_i8;
    u16 => put_u16, get_u16;
    i16 => put_i16, get_i16;
    u32 => put_u32, get_u32;
    i32 => put_i32, get_i32;
    u64 => put_u64, get_u64;
    i64 => put_i64, get_i64;
    u128 => put_u128, get_u128;
    i128 => put_i128, get_i128;
    usize => put_usize, get_usize;
    isize => put_isize, get_isize;
    f32 => put_f32, get_f32;
    f64 => put_f64, get_f64;
}

impl Encode for str {
    fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
        encoder.put_str(self)
    }
}

impl Encode for String {
    fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
        encoder.put_str(self)
    }
}

impl Decode for String {
    fn decode(decoder: &mut Decoder<'_>) -> CodecResult<Self> {
        decoder.get_str().map(str::to_owned)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
        encoder.put_seq(self)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
        encoder.put_seq(self)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(decoder: &mut Decoder<'_>) -> CodecResult<Self> {
        decoder.get_seq()
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
        encoder.put_seq(self.as_slice())
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode(decoder: &mut Decoder<'_>) -> CodecResult<Self> {
        let len = decoder.get_len()?;
        if len != N {
            return Err(CodecError::LengthMismatch {
                expected: N,
                actual: len,
            });
        }
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::decode(decoder)?);
        }
        items
            .try_into()
            .map_err(|items: Vec<T>| CodecError::LengthMismatch {
                expected: N,
                actual: items.len(),
            })
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
        match self {
            Some(value) => {
                encoder.put_presence(true);
                value.encode(encoder)
            }
            None => {
                encoder.put_presence(false);
                Ok(())
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(decoder: &mut Decoder<'_>) -> CodecResult<Self> {
        if decoder.get_presence()? {
            T::decode(decoder).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
        (**self).encode(encoder)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(decoder: &mut Decoder<'_>) -> CodecResult<Self> {
        T::decode(decoder).map(Box::new)
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
        (**self).encode(encoder)
    }
}

impl Encode for () {
    fn encode(&self, _encoder: &mut Encoder) -> CodecResult<()> {
        Ok(())
    }
}

impl Decode for () {
    fn decode(_decoder: &mut Decoder<'_>) -> CodecResult<Self> {
        Ok(())
    }
}

impl<T: ?Sized> Encode for PhantomData<T> {
    fn encode(&self, _encoder: &mut Encoder) -> CodecResult<()> {
        Ok(())
    }
}

impl<T: ?Sized> Decode for PhantomData<T> {
    fn decode(_decoder: &mut Decoder<'_>) -> CodecResult<Self> {
        Ok(PhantomData)
    }
}

macro_rules! impl_tuple {
    ($($ty:ident $var:ident),+) => {
        impl<$($ty: Encode),+> Encode for ($($ty,)+) {
            fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
                let ($($var,)+) = self;
                $($var.encode(encoder)?;)+
                Ok(())
            }
        }

        impl<$($ty: Decode),+> Decode for ($($ty,)+) {
            fn decode(decoder: &mut Decoder<'_>) -> CodecResult<Self> {
                Ok(($(<$ty as Decode>::decode(decoder)?,)+))
            }
        }
    };
}

impl_tuple!(A a);
impl_tuple!(A a, B b);
impl_tuple!(A a, B b, C c);
impl_tuple!(A a, B b, C c, D d);
impl_tuple!(A a, B b, C c, D d, E e);
impl_tuple!(A a, B b, C c, D d, E e, F f);
