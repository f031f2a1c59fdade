//! Typedefs, built-in types, and definition lifecycle status.

use std::fmt;

use smol_str::SmolStr;

/// Lifecycle status of a definition.
///
/// The order is load-bearing: a definition may only reference definitions of
/// equal or weaker status within its own module (`Current < Deprecated <
/// Obsolete`, weaker meaning closer to `Current`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    #[default]
    Current,
    Deprecated,
    Obsolete,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Current => "current",
            Status::Deprecated => "deprecated",
            Status::Obsolete => "obsolete",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, reusable data-type definition.
///
/// The owning scope is positional: a typedef sits either in a module's or
/// submodule's top-level list or in one schema node's local list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Typedef {
    pub name: SmolStr,
    /// The type this typedef derives from, possibly prefix-qualified.
    pub base_type: SmolStr,
    pub status: Status,
}

impl Typedef {
    pub fn new(name: impl Into<SmolStr>, base_type: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            base_type: base_type.into(),
            status: Status::Current,
        }
    }
}

/// The built-in types every module can use without deriving them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Binary,
    Bits,
    Boolean,
    Decimal64,
    Empty,
    Enumeration,
    Identityref,
    InstanceIdentifier,
    Int8,
    Int16,
    Int32,
    Int64,
    Leafref,
    String,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Union,
}

impl BuiltinType {
    /// Recognizes a built-in type name; same dispatch shape and cost contract
    /// as [`crate::syntax::match_keyword`].
    pub fn from_name(name: &str) -> Option<Self> {
        let first = *name.as_bytes().first()?;
        let rest = &name[1..];
        let ty = match first {
            b'b' => match rest {
                "inary" => BuiltinType::Binary,
                "its" => BuiltinType::Bits,
                "oolean" => BuiltinType::Boolean,
                _ => return None,
            },
            b'd' => match rest {
                "ecimal64" => BuiltinType::Decimal64,
                _ => return None,
            },
            b'e' => match rest {
                "mpty" => BuiltinType::Empty,
                "numeration" => BuiltinType::Enumeration,
                _ => return None,
            },
            b'i' => match rest {
                "dentityref" => BuiltinType::Identityref,
                "nstance-identifier" => BuiltinType::InstanceIdentifier,
                "nt8" => BuiltinType::Int8,
                "nt16" => BuiltinType::Int16,
                "nt32" => BuiltinType::Int32,
                "nt64" => BuiltinType::Int64,
                _ => return None,
            },
            b'l' => match rest {
                "eafref" => BuiltinType::Leafref,
                _ => return None,
            },
            b's' => match rest {
                "tring" => BuiltinType::String,
                _ => return None,
            },
            b'u' => match rest {
                "int8" => BuiltinType::Uint8,
                "int16" => BuiltinType::Uint16,
                "int32" => BuiltinType::Uint32,
                "int64" => BuiltinType::Uint64,
                "nion" => BuiltinType::Union,
                _ => return None,
            },
            _ => return None,
        };
        Some(ty)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BuiltinType::Binary => "binary",
            BuiltinType::Bits => "bits",
            BuiltinType::Boolean => "boolean",
            BuiltinType::Decimal64 => "decimal64",
            BuiltinType::Empty => "empty",
            BuiltinType::Enumeration => "enumeration",
            BuiltinType::Identityref => "identityref",
            BuiltinType::InstanceIdentifier => "instance-identifier",
            BuiltinType::Int8 => "int8",
            BuiltinType::Int16 => "int16",
            BuiltinType::Int32 => "int32",
            BuiltinType::Int64 => "int64",
            BuiltinType::Leafref => "leafref",
            BuiltinType::String => "string",
            BuiltinType::Uint8 => "uint8",
            BuiltinType::Uint16 => "uint16",
            BuiltinType::Uint32 => "uint32",
            BuiltinType::Uint64 => "uint64",
            BuiltinType::Union => "union",
        }
    }

    pub const ALL: [BuiltinType; 19] = [
        BuiltinType::Binary,
        BuiltinType::Bits,
        BuiltinType::Boolean,
        BuiltinType::Decimal64,
        BuiltinType::Empty,
        BuiltinType::Enumeration,
        BuiltinType::Identityref,
        BuiltinType::InstanceIdentifier,
        BuiltinType::Int8,
        BuiltinType::Int16,
        BuiltinType::Int32,
        BuiltinType::Int64,
        BuiltinType::Leafref,
        BuiltinType::String,
        BuiltinType::Uint8,
        BuiltinType::Uint16,
        BuiltinType::Uint32,
        BuiltinType::Uint64,
        BuiltinType::Union,
    ];
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
