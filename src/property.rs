//! The typed property traits table.
//!
//! [`PropertyValue`] binds each supported value type to its wire encoding:
//! the type atom a stored value must declare, the element width, the
//! container shape and the encode/decode pair. [`TypedProperty`] is the
//! validated carrier the window operations hand out; no partially decoded
//! state escapes it.
//!
//! Decoding is strict: a structural mismatch (wrong element width, scalar
//! requested from a multi-element buffer, buffer length not a multiple of
//! the element width) fails with `PropertyTypeMismatch` instead of guessing.

use std::fmt;

use crate::atoms::Atoms;
use crate::error::{Result, X11Error};
use crate::types::{AtomId, PropertyFormat, RawProperty, WindowId};

/// Per-type descriptor of a property's wire encoding.
///
/// Implementations are pure and stateless. `decode(encode(v)) == v` holds
/// for every well-formed value; `encode` itself cannot fail.
pub trait PropertyValue: Sized {
    /// Element width of the encoded buffer.
    const FORMAT: PropertyFormat;
    /// Whether the type is a variable-length sequence rather than a scalar.
    const IS_ARRAY: bool;

    /// The type atom a wire value of this type must declare.
    fn type_atom(atoms: &Atoms) -> AtomId;

    /// Decode a raw buffer, checking its structure against this type.
    fn decode(raw: &RawProperty) -> Result<Self>;

    /// Encode the value into a raw property buffer.
    fn encode(&self, atoms: &Atoms) -> RawProperty;
}

fn expect_format(raw: &RawProperty, format: PropertyFormat) -> Result<()> {
    if raw.format != format {
        return Err(X11Error::type_mismatch(format!(
            "expected format width {}, server reported {}",
            format.bits(),
            raw.format.bits()
        )));
    }

    if raw.data.len() % format.bytes() != 0 {
        return Err(X11Error::type_mismatch(format!(
            "buffer length {} is not a multiple of the {}-byte element width",
            raw.data.len(),
            format.bytes()
        )));
    }

    Ok(())
}

fn expect_scalar(raw: &RawProperty, format: PropertyFormat) -> Result<()> {
    expect_format(raw, format)?;

    if raw.value_len != 1 || raw.data.len() != format.bytes() {
        return Err(X11Error::type_mismatch(format!(
            "expected a single {}-bit element, got {} elements",
            format.bits(),
            raw.value_len
        )));
    }

    Ok(())
}

fn scalar_u32(raw: &RawProperty) -> Result<u32> {
    expect_scalar(raw, PropertyFormat::Bits32)?;

    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&raw.data);
    Ok(u32::from_ne_bytes(bytes))
}

macro_rules! cardinal_scalar {
    ($ty:ty) => {
        impl PropertyValue for $ty {
            const FORMAT: PropertyFormat = PropertyFormat::Bits32;
            const IS_ARRAY: bool = false;

            fn type_atom(atoms: &Atoms) -> AtomId {
                atoms.cardinal
            }

            fn decode(raw: &RawProperty) -> Result<Self> {
                expect_scalar(raw, Self::FORMAT)?;
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(&raw.data);
                Ok(<$ty>::from_ne_bytes(bytes))
            }

            fn encode(&self, atoms: &Atoms) -> RawProperty {
                RawProperty::from_elements(
                    atoms.cardinal,
                    Self::FORMAT,
                    self.to_ne_bytes().to_vec(),
                )
            }
        }
    };
}

cardinal_scalar!(u32);
cardinal_scalar!(i32);

macro_rules! cardinal_array {
    ($elem:ty, $format:expr, $bytes:expr) => {
        impl PropertyValue for Vec<$elem> {
            const FORMAT: PropertyFormat = $format;
            const IS_ARRAY: bool = true;

            fn type_atom(atoms: &Atoms) -> AtomId {
                atoms.cardinal
            }

            fn decode(raw: &RawProperty) -> Result<Self> {
                expect_format(raw, Self::FORMAT)?;
                Ok(raw
                    .data
                    .chunks_exact($bytes)
                    .map(|chunk| {
                        let mut bytes = [0u8; $bytes];
                        bytes.copy_from_slice(chunk);
                        <$elem>::from_ne_bytes(bytes)
                    })
                    .collect())
            }

            fn encode(&self, atoms: &Atoms) -> RawProperty {
                let data = self.iter().flat_map(|v| v.to_ne_bytes()).collect();
                RawProperty::from_elements(atoms.cardinal, Self::FORMAT, data)
            }
        }
    };
}

cardinal_array!(u8, PropertyFormat::Bits8, 1);
cardinal_array!(u16, PropertyFormat::Bits16, 2);
cardinal_array!(u32, PropertyFormat::Bits32, 4);
cardinal_array!(i32, PropertyFormat::Bits32, 4);

impl PropertyValue for bool {
    const FORMAT: PropertyFormat = PropertyFormat::Bits32;
    const IS_ARRAY: bool = false;

    fn type_atom(atoms: &Atoms) -> AtomId {
        atoms.cardinal
    }

    fn decode(raw: &RawProperty) -> Result<Self> {
        Ok(scalar_u32(raw)? != 0)
    }

    fn encode(&self, atoms: &Atoms) -> RawProperty {
        u32::from(*self).encode(atoms)
    }
}

impl PropertyValue for AtomId {
    const FORMAT: PropertyFormat = PropertyFormat::Bits32;
    const IS_ARRAY: bool = false;

    fn type_atom(atoms: &Atoms) -> AtomId {
        atoms.atom
    }

    fn decode(raw: &RawProperty) -> Result<Self> {
        Ok(AtomId(scalar_u32(raw)?))
    }

    fn encode(&self, atoms: &Atoms) -> RawProperty {
        RawProperty::from_elements(atoms.atom, Self::FORMAT, self.0.to_ne_bytes().to_vec())
    }
}

impl PropertyValue for WindowId {
    const FORMAT: PropertyFormat = PropertyFormat::Bits32;
    const IS_ARRAY: bool = false;

    fn type_atom(atoms: &Atoms) -> AtomId {
        atoms.window
    }

    fn decode(raw: &RawProperty) -> Result<Self> {
        Ok(WindowId(scalar_u32(raw)?))
    }

    fn encode(&self, atoms: &Atoms) -> RawProperty {
        RawProperty::from_elements(atoms.window, Self::FORMAT, self.0.to_ne_bytes().to_vec())
    }
}

macro_rules! id_array {
    ($elem:ty, $atom_field:ident) => {
        impl PropertyValue for Vec<$elem> {
            const FORMAT: PropertyFormat = PropertyFormat::Bits32;
            const IS_ARRAY: bool = true;

            fn type_atom(atoms: &Atoms) -> AtomId {
                atoms.$atom_field
            }

            fn decode(raw: &RawProperty) -> Result<Self> {
                expect_format(raw, Self::FORMAT)?;
                Ok(raw
                    .data
                    .chunks_exact(4)
                    .map(|chunk| {
                        let mut bytes = [0u8; 4];
                        bytes.copy_from_slice(chunk);
                        <$elem>::from(u32::from_ne_bytes(bytes))
                    })
                    .collect())
            }

            fn encode(&self, atoms: &Atoms) -> RawProperty {
                let data = self.iter().flat_map(|v| v.0.to_ne_bytes()).collect();
                RawProperty::from_elements(atoms.$atom_field, Self::FORMAT, data)
            }
        }
    };
}

id_array!(AtomId, atom);
id_array!(WindowId, window);

impl PropertyValue for String {
    const FORMAT: PropertyFormat = PropertyFormat::Bits8;
    const IS_ARRAY: bool = true;

    fn type_atom(atoms: &Atoms) -> AtomId {
        atoms.utf8_string
    }

    fn decode(raw: &RawProperty) -> Result<Self> {
        expect_format(raw, Self::FORMAT)?;
        String::from_utf8(raw.data.clone()).map_err(|e| {
            X11Error::InvalidPropertyData(format!("property text is not valid UTF-8: {e}"))
        })
    }

    fn encode(&self, atoms: &Atoms) -> RawProperty {
        RawProperty::from_elements(
            atoms.utf8_string,
            Self::FORMAT,
            self.as_bytes().to_vec(),
        )
    }
}

/// Latin-1 text stored under the predefined `STRING` type atom.
///
/// Carries the ICCCM legacy text encoding, including embedded NUL bytes
/// (WM_CLASS packs instance and class name into one value this way). Bytes
/// outside ASCII map to their Latin-1 code points on decode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct XString(pub String);

impl XString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for XString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for XString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for XString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PropertyValue for XString {
    const FORMAT: PropertyFormat = PropertyFormat::Bits8;
    const IS_ARRAY: bool = true;

    fn type_atom(atoms: &Atoms) -> AtomId {
        atoms.string
    }

    fn decode(raw: &RawProperty) -> Result<Self> {
        expect_format(raw, Self::FORMAT)?;
        Ok(Self(raw.data.iter().map(|&b| b as char).collect()))
    }

    fn encode(&self, atoms: &Atoms) -> RawProperty {
        let data = self
            .0
            .chars()
            .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
            .collect();
        RawProperty::from_elements(atoms.string, Self::FORMAT, data)
    }
}

/// A list of UTF-8 strings, encoded as NUL-terminated strings packed back to
/// back (the _NET_DESKTOP_NAMES / WM_COMMAND layout).
impl PropertyValue for Vec<String> {
    const FORMAT: PropertyFormat = PropertyFormat::Bits8;
    const IS_ARRAY: bool = true;

    fn type_atom(atoms: &Atoms) -> AtomId {
        atoms.utf8_string
    }

    fn decode(raw: &RawProperty) -> Result<Self> {
        expect_format(raw, Self::FORMAT)?;

        let mut out = Vec::new();
        let mut rest = raw.data.as_slice();
        while !rest.is_empty() {
            let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
            let s = std::str::from_utf8(&rest[..end]).map_err(|e| {
                X11Error::InvalidPropertyData(format!("string list entry is not valid UTF-8: {e}"))
            })?;
            out.push(s.to_owned());
            rest = if end < rest.len() { &rest[end + 1..] } else { &[] };
        }

        Ok(out)
    }

    fn encode(&self, atoms: &Atoms) -> RawProperty {
        let mut data = Vec::new();
        for s in self {
            data.extend_from_slice(s.as_bytes());
            data.push(0);
        }
        RawProperty::from_elements(atoms.utf8_string, Self::FORMAT, data)
    }
}

/// A raw property validated against the traits of `T`.
///
/// Exists only after successful validation; the decoded value is read-only
/// afterwards. Constructed by the window property operations, never
/// directly by callers.
#[derive(Debug, Clone)]
pub struct TypedProperty<T> {
    raw: RawProperty,
    value: T,
}

impl<T: PropertyValue> TypedProperty<T> {
    /// Validate a raw buffer against the traits of `T`.
    ///
    /// The declared type atom is checked before any byte is decoded, so a
    /// mismatched property fails cheaply regardless of buffer contents.
    pub(crate) fn parse(raw: RawProperty, atoms: &Atoms) -> Result<Self> {
        let expected = T::type_atom(atoms);
        if raw.type_atom != expected {
            return Err(X11Error::atom_mismatch(expected, raw.type_atom));
        }

        let value = T::decode(&raw)?;
        Ok(Self { raw, value })
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn raw(&self) -> &RawProperty {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeConnection;

    fn fixture_atoms() -> Atoms {
        Atoms::new(&FakeConnection::new()).unwrap()
    }

    fn round_trip<T>(value: T, atoms: &Atoms)
    where
        T: PropertyValue + PartialEq + std::fmt::Debug + Clone,
    {
        let raw = value.encode(atoms);
        assert!(raw.is_consistent());
        assert_eq!(raw.type_atom, T::type_atom(atoms));
        assert_eq!(T::decode(&raw).unwrap(), value);
    }

    #[test]
    fn encode_decode_round_trips() {
        let atoms = fixture_atoms();

        round_trip(42u32, &atoms);
        round_trip(-7i32, &atoms);
        round_trip(true, &atoms);
        round_trip(AtomId(99), &atoms);
        round_trip(WindowId(0x1400002), &atoms);
        round_trip(vec![AtomId(4), AtomId(6), AtomId(31)], &atoms);
        round_trip(vec![1u16, 2, 3], &atoms);
        round_trip(vec![10u32, 20, 30], &atoms);
        round_trip(String::from("hello wörld"), &atoms);
        round_trip(XString::from("Navigator\0Firefox"), &atoms);
        round_trip(vec!["one".to_owned(), "two".to_owned()], &atoms);
    }

    #[test]
    fn descriptor_constants_match_container_shape() {
        assert!(!u32::IS_ARRAY);
        assert!(!WindowId::IS_ARRAY);
        assert!(<Vec<u32>>::IS_ARRAY);
        assert!(String::IS_ARRAY);
        assert_eq!(String::FORMAT, PropertyFormat::Bits8);
        assert_eq!(<Vec<u16>>::FORMAT, PropertyFormat::Bits16);
    }

    #[test]
    fn scalar_rejects_multi_element_buffer() {
        let atoms = fixture_atoms();

        // 12 bytes at format 32: fine as a 3-element array...
        let raw = RawProperty::from_elements(
            atoms.cardinal,
            PropertyFormat::Bits32,
            vec![1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0],
        );
        assert_eq!(<Vec<u32>>::decode(&raw).unwrap().len(), 3);

        // ...but a structural mismatch as a scalar.
        assert!(matches!(
            u32::decode(&raw),
            Err(X11Error::PropertyTypeMismatch(_))
        ));
    }

    #[test]
    fn format_width_mismatch_is_rejected() {
        let atoms = fixture_atoms();

        let raw = RawProperty::from_elements(
            atoms.cardinal,
            PropertyFormat::Bits16,
            vec![1, 0, 2, 0],
        );
        assert!(matches!(
            <Vec<u32>>::decode(&raw),
            Err(X11Error::PropertyTypeMismatch(_))
        ));
    }

    #[test]
    fn ragged_buffer_is_rejected() {
        let atoms = fixture_atoms();

        let mut raw = RawProperty::from_elements(
            atoms.cardinal,
            PropertyFormat::Bits32,
            vec![0u8; 8],
        );
        raw.data.push(0xff); // 9 bytes, not a multiple of 4
        assert!(matches!(
            <Vec<u32>>::decode(&raw),
            Err(X11Error::PropertyTypeMismatch(_))
        ));
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let atoms = fixture_atoms();

        let raw = RawProperty::from_elements(
            atoms.utf8_string,
            PropertyFormat::Bits8,
            vec![0x66, 0xff, 0xfe],
        );
        assert!(matches!(
            String::decode(&raw),
            Err(X11Error::InvalidPropertyData(_))
        ));
    }

    #[test]
    fn parse_checks_type_atom_before_decoding() {
        let atoms = fixture_atoms();

        // Structurally perfect cardinal buffer, but declared as WINDOW: the
        // type atom check must fail first, whatever the bytes look like.
        let raw = RawProperty::from_elements(
            atoms.window,
            PropertyFormat::Bits32,
            7u32.to_ne_bytes().to_vec(),
        );
        assert!(matches!(
            TypedProperty::<u32>::parse(raw, &atoms),
            Err(X11Error::PropertyTypeMismatch(_))
        ));
    }

    #[test]
    fn string_list_ignores_trailing_terminator() {
        let atoms = fixture_atoms();

        let raw = RawProperty::from_elements(
            atoms.utf8_string,
            PropertyFormat::Bits8,
            b"ab\0cd\0".to_vec(),
        );
        assert_eq!(<Vec<String>>::decode(&raw).unwrap(), vec!["ab", "cd"]);

        // Unterminated last entry still decodes.
        let raw = RawProperty::from_elements(
            atoms.utf8_string,
            PropertyFormat::Bits8,
            b"ab\0cd".to_vec(),
        );
        assert_eq!(<Vec<String>>::decode(&raw).unwrap(), vec!["ab", "cd"]);
    }

    #[test]
    fn latin1_round_trip_with_high_bytes() {
        let atoms = fixture_atoms();

        let raw = RawProperty::from_elements(
            atoms.string,
            PropertyFormat::Bits8,
            vec![b'n', 0xe9, b't'], // "nét" in Latin-1
        );
        let s = XString::decode(&raw).unwrap();
        assert_eq!(s.as_str(), "nét");
        assert_eq!(s.encode(&atoms).data, vec![b'n', 0xe9, b't']);
    }
}
