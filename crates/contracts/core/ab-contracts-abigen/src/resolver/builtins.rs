//! Built-in ABI types and their source spellings

/// Type name that raises ABI version when used
pub(super) const BITSET: &str = "bitset";

/// Canonical ABI names of built-in types
const BUILTIN_TYPES: &[&str] = &[
    "bool",
    "int8",
    "uint8",
    "int16",
    "uint16",
    "int32",
    "uint32",
    "int64",
    "uint64",
    "int128",
    "uint128",
    "varint32",
    "varuint32",
    "float32",
    "float64",
    "float128",
    "time_point",
    "time_point_sec",
    "block_timestamp_type",
    "name",
    "bytes",
    "string",
    "checksum160",
    "checksum256",
    "checksum512",
    "public_key",
    "signature",
    "symbol",
    "symbol_code",
    "asset",
    "extended_asset",
    BITSET,
];

/// Whether `name` is a canonical ABI name of a built-in type
pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

/// Canonical ABI name for a built-in type's source spelling
pub(super) fn builtin_name(spelling: &str) -> Option<&'static str> {
    let spelling = spelling.trim().trim_start_matches("::");
    let spelling = spelling
        .strip_prefix("std::")
        .or_else(|| spelling.strip_prefix("eosio::"))
        .or_else(|| spelling.strip_prefix("core::primitive::"))
        .or_else(|| spelling.strip_prefix("alloc::string::"))
        .unwrap_or(spelling);

    let name = match spelling {
        "bool" => "bool",
        "int8_t" | "signed char" | "char" | "i8" => "int8",
        "uint8_t" | "unsigned char" | "u8" => "uint8",
        "int16_t" | "short" | "i16" => "int16",
        "uint16_t" | "unsigned short" | "u16" => "uint16",
        "int32_t" | "int" | "i32" => "int32",
        "uint32_t" | "unsigned int" | "unsigned" | "u32" => "uint32",
        "int64_t" | "long long" | "i64" => "int64",
        "uint64_t" | "unsigned long long" | "u64" => "uint64",
        "int128_t" | "__int128" | "i128" => "int128",
        "uint128_t" | "unsigned __int128" | "u128" => "uint128",
        "signed_int" => "varint32",
        "unsigned_int" => "varuint32",
        "float" | "f32" => "float32",
        "double" | "f64" => "float64",
        "long double" => "float128",
        "string" | "String" => "string",
        "block_timestamp" => "block_timestamp_type",
        "ecc_public_key" => "public_key",
        "ecc_signature" => "signature",
        other => {
            return BUILTIN_TYPES.iter().copied().find(|&name| name == other);
        }
    };

    Some(name)
}
