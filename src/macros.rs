use crate::{
    error::{Error, Result},
    primitive::{JsonPrimitive, Primitive, ValueKind},
};

macro_rules! impl_integer_primitive {
    ( $($t:ty,)* ) => { $(
        impl Primitive for $t {
            const KIND: ValueKind = ValueKind::Integer;

            fn parse_text(text: &str) -> Result<Option<Self>> {
                text.parse::<$t>().map(Some).map_err(|err| Error::Parse {
                    text: text.to_owned(),
                    kind: Self::KIND,
                    source: Box::new(err),
                })
            }

            fn format_text(&self) -> String {
                self.to_string()
            }

            // the error type is uninhabited for `i64` itself
            #[allow(unreachable_patterns)]
            fn to_json(&self) -> JsonPrimitive {
                match i64::try_from(*self) {
                    Ok(i) => JsonPrimitive::Integer(i),
                    Err(_) => JsonPrimitive::Real(*self as f64),
                }
            }

            fn from_json(value: &JsonPrimitive) -> Option<Self> {
                match value {
                    JsonPrimitive::Integer(i) => <$t>::try_from(*i).ok(),
                    _ => None,
                }
            }
        }
    )* };
}

macro_rules! impl_real_primitive {
    ( $($t:ty,)* ) => { $(
        impl Primitive for $t {
            const KIND: ValueKind = ValueKind::Real;

            fn parse_text(text: &str) -> Result<Option<Self>> {
                text.parse::<$t>().map(Some).map_err(|err| Error::Parse {
                    text: text.to_owned(),
                    kind: Self::KIND,
                    source: Box::new(err),
                })
            }

            fn format_text(&self) -> String {
                self.to_string()
            }

            fn to_json(&self) -> JsonPrimitive {
                JsonPrimitive::Real(f64::from(*self))
            }

            fn from_json(value: &JsonPrimitive) -> Option<Self> {
                match value {
                    JsonPrimitive::Real(f) => Some(*f as $t),
                    JsonPrimitive::Integer(i) => Some(*i as $t),
                    _ => None,
                }
            }
        }
    )* };
}

impl_integer_primitive!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,);
impl_real_primitive!(f32, f64,);
