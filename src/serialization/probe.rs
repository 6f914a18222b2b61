//! Root classification.
//!
//! Looks at how a value starts serializing to decide which path the safe
//! serializer takes. Anything other than a string, a `Pii` newtype or an
//! `Option` around one stops the probe at the first call, so the cost does
//! not depend on the size of the value.

use std::fmt;

use serde::ser::{self, Impossible, Serialize};

use crate::security::pii::PII_TYPE_NAME;
use crate::serialization::exception::EXCEPTION_TYPE_NAME;

/// How the root of a value serializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootKind {
    /// A plain string.
    Text(String),
    /// A `Pii` wrapper, carrying the raw value.
    Pii(String),
    /// `None` or unit.
    Null,
    /// An `ExceptionRecord`.
    Exception,
    /// Anything else.
    Other,
}

/// Classify the root of `value`.
pub fn classify<T: ?Sized + Serialize>(value: &T) -> RootKind {
    match value.serialize(RootProbe) {
        Ok(kind) | Err(Stop(kind)) => kind,
    }
}

/// Early exit carrying the classification.
#[derive(Debug)]
struct Stop(RootKind);

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probe stopped at {:?}", self.0)
    }
}

impl std::error::Error for Stop {}

impl ser::Error for Stop {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Stop(RootKind::Other)
    }
}

struct RootProbe;

macro_rules! other_scalar {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, _v: $ty) -> Result<RootKind, Stop> {
                Ok(RootKind::Other)
            }
        )*
    };
}

impl ser::Serializer for RootProbe {
    type Ok = RootKind;
    type Error = Stop;

    type SerializeSeq = Impossible<RootKind, Stop>;
    type SerializeTuple = Impossible<RootKind, Stop>;
    type SerializeTupleStruct = Impossible<RootKind, Stop>;
    type SerializeTupleVariant = Impossible<RootKind, Stop>;
    type SerializeMap = Impossible<RootKind, Stop>;
    type SerializeStruct = Impossible<RootKind, Stop>;
    type SerializeStructVariant = Impossible<RootKind, Stop>;

    other_scalar! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_f32: f32,
        serialize_f64: f64,
        serialize_char: char,
        serialize_bytes: &[u8],
    }

    fn serialize_str(self, v: &str) -> Result<RootKind, Stop> {
        Ok(RootKind::Text(v.to_string()))
    }

    fn serialize_none(self) -> Result<RootKind, Stop> {
        Ok(RootKind::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<RootKind, Stop> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<RootKind, Stop> {
        Ok(RootKind::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<RootKind, Stop> {
        Ok(RootKind::Other)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<RootKind, Stop> {
        Ok(RootKind::Other)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<RootKind, Stop> {
        if name != PII_TYPE_NAME {
            return Ok(RootKind::Other);
        }
        match value.serialize(self)? {
            RootKind::Text(raw) => Ok(RootKind::Pii(raw)),
            _ => Ok(RootKind::Other),
        }
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<RootKind, Stop> {
        Ok(RootKind::Other)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Stop> {
        Err(Stop(RootKind::Other))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Stop> {
        Err(Stop(RootKind::Other))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Stop> {
        Err(Stop(RootKind::Other))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Stop> {
        Err(Stop(RootKind::Other))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Stop> {
        Err(Stop(RootKind::Other))
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Stop> {
        if name == EXCEPTION_TYPE_NAME {
            Err(Stop(RootKind::Exception))
        } else {
            Err(Stop(RootKind::Other))
        }
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Stop> {
        Err(Stop(RootKind::Other))
    }
}
