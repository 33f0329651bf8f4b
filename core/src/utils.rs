use std::fmt;
use num_enum::TryFromPrimitive;

/// Registry-aware rendering of a raw id: variant name if known, hex otherwise.
pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:02x}", raw),
    }
}
