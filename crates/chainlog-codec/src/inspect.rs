use serde::ser::{self, Serialize};

use crate::error::{CodecError, CodecResult};

/// What a value reports about itself through the serde data model,
/// independent of the bytes any particular codec would produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Shape {
    /// The value itself is `None` or `()`.
    pub nil: bool,
    /// A NaN or infinite float appears somewhere inside the value.
    pub non_finite: bool,
}

/// Walk `value` and report its [`Shape`].
///
/// `human_readable` should match the target codec, since some types
/// serialize differently for text and binary formats.
pub(crate) fn inspect<T: Serialize + ?Sized>(
    value: &T,
    human_readable: bool,
) -> CodecResult<Shape> {
    let mut inspector = Inspector {
        top: true,
        human_readable,
        shape: Shape::default(),
    };
    value.serialize(&mut inspector)?;
    Ok(inspector.shape)
}

struct Inspector {
    top: bool,
    human_readable: bool,
    shape: Shape,
}

impl Inspector {
    /// Returns whether the call being entered is the outermost one.
    fn enter(&mut self) -> bool {
        std::mem::replace(&mut self.top, false)
    }

    fn scalar(&mut self) -> CodecResult<()> {
        self.enter();
        Ok(())
    }

    fn float(&mut self, finite: bool) -> CodecResult<()> {
        self.enter();
        if !finite {
            self.shape.non_finite = true;
        }
        Ok(())
    }

    fn absent(&mut self) -> CodecResult<()> {
        if self.enter() {
            self.shape.nil = true;
        }
        Ok(())
    }
}

impl ser::Error for CodecError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        CodecError::Encode(msg.to_string())
    }
}

impl<'a> ser::Serializer for &'a mut Inspector {
    type Ok = ();
    type Error = CodecError;

    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn is_human_readable(&self) -> bool {
        self.human_readable
    }

    fn serialize_bool(self, _v: bool) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_i8(self, _v: i8) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_i16(self, _v: i16) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_i32(self, _v: i32) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_i64(self, _v: i64) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_i128(self, _v: i128) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_u8(self, _v: u8) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_u16(self, _v: u16) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_u32(self, _v: u32) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_u64(self, _v: u64) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_u128(self, _v: u128) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_f32(self, v: f32) -> CodecResult<()> {
        self.float(v.is_finite())
    }

    fn serialize_f64(self, v: f64) -> CodecResult<()> {
        self.float(v.is_finite())
    }

    fn serialize_char(self, _v: char) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_str(self, _v: &str) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_bytes(self, _v: &[u8]) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_none(self) -> CodecResult<()> {
        self.absent()
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> CodecResult<()> {
        self.enter();
        value.serialize(self)
    }

    fn serialize_unit(self) -> CodecResult<()> {
        self.absent()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> CodecResult<()> {
        self.scalar()
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> CodecResult<()> {
        self.enter();
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> CodecResult<()> {
        self.enter();
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> CodecResult<Self> {
        self.enter();
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> CodecResult<Self> {
        self.enter();
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> CodecResult<Self> {
        self.enter();
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> CodecResult<Self> {
        self.enter();
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> CodecResult<Self> {
        self.enter();
        Ok(self)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> CodecResult<Self> {
        self.enter();
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> CodecResult<Self> {
        self.enter();
        Ok(self)
    }
}

impl ser::SerializeSeq for &mut Inspector {
    type Ok = ();
    type Error = CodecError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> CodecResult<()> {
        Ok(())
    }
}

impl ser::SerializeTuple for &mut Inspector {
    type Ok = ();
    type Error = CodecError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> CodecResult<()> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for &mut Inspector {
    type Ok = ();
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> CodecResult<()> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for &mut Inspector {
    type Ok = ();
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> CodecResult<()> {
        Ok(())
    }
}

impl ser::SerializeMap for &mut Inspector {
    type Ok = ();
    type Error = CodecError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> CodecResult<()> {
        key.serialize(&mut **self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> CodecResult<()> {
        Ok(())
    }
}

impl ser::SerializeStruct for &mut Inspector {
    type Ok = ();
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> CodecResult<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> CodecResult<()> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for &mut Inspector {
    type Ok = ();
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> CodecResult<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> CodecResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Marker;

    #[derive(Serialize)]
    struct Reading {
        label: String,
        value: f64,
    }

    fn shape<T: Serialize + ?Sized>(value: &T) -> Shape {
        inspect(value, true).unwrap()
    }

    #[test]
    fn only_top_level_absence_is_nil() {
        assert!(shape(&None::<u32>).nil);
        assert!(shape(&()).nil);

        assert!(!shape(&Some(())).nil);
        assert!(!shape(&Some(None::<u32>)).nil);
        assert!(!shape(&Marker).nil);
        assert!(!shape(&vec![(); 3]).nil);
        assert!(!shape(&0u8).nil);
        assert!(!shape("").nil);
    }

    #[test]
    fn non_finite_floats_are_found_anywhere() {
        assert!(shape(&f64::NAN).non_finite);
        assert!(shape(&vec![1.0, f64::INFINITY]).non_finite);
        assert!(shape(&Reading {
            label: "x".into(),
            value: f64::NEG_INFINITY
        })
        .non_finite);

        let mut map = BTreeMap::new();
        map.insert("k", Some(f32::NAN));
        assert!(shape(&map).non_finite);

        assert_eq!(shape(&1.5f64), Shape::default());
    }
}
