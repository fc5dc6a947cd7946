//! Account/action name encoding and identifier validation


/// Alphabet of the base-32 name encoding
pub const NAME_CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";
/// Maximum length of a name in characters
pub const MAX_NAME_LENGTH: usize = 13;
/// Maximum length of a call identifier in characters
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Name or identifier validation error
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum NameError {
    /// Name is longer than 13 characters
    #[error("Name `{name}` is more than 13 characters long")]
    TooLong { name: String },
    /// Name doesn't survive encoding round trip
    #[error("Name `{name}` is not properly normalized")]
    NotNormalized { name: String },
    /// Identifier is empty
    #[error("Identifier is empty")]
    EmptyIdentifier,
    /// Identifier is longer than 128 characters
    #[error("Identifier `{identifier}` is more than 128 characters long")]
    IdentifierTooLong { identifier: String },
    /// Identifier doesn't start with a letter or underscore
    #[error("Identifier `{identifier}` does not start with letter or underscore")]
    InvalidIdentifierStart { identifier: String },
    /// Identifier contains a character other than letter, digit or underscore
    #[error(
        "Identifier `{identifier}` has a character `{character}` which is not a number, letter, \
        or underscore"
    )]
    InvalidIdentifierCharacter { identifier: String, character: char },
}

#[inline]
fn char_to_symbol(c: u8) -> u64 {
    match c {
        b'a'..=b'z' => u64::from(c - b'a') + 6,
        b'1'..=b'5' => u64::from(c - b'1') + 1,
        _ => 0,
    }
}

/// Encode a name into its 64-bit representation.
///
/// The first 12 characters take 5 bits each starting from the most significant bits, the 13th
/// character (if any) takes the remaining 4 bits. Characters outside of the alphabet encode as `.`.
pub fn string_to_name(name: &str) -> u64 {
    let bytes = name.as_bytes();
    let mut value = 0u64;

    for (index, &c) in bytes.iter().take(12).enumerate() {
        value |= (char_to_symbol(c) & 0x1f) << (64 - 5 * (index + 1));
    }
    if let Some(&c) = bytes.get(12) {
        value |= char_to_symbol(c) & 0x0f;
    }

    value
}

/// Decode a 64-bit name into its string representation, trailing dots are trimmed
pub fn name_to_string(value: u64) -> String {
    let mut chars = [b'.'; MAX_NAME_LENGTH];
    let mut tmp = value;

    for index in 0..MAX_NAME_LENGTH {
        let mask = if index == 0 { 0x0f } else { 0x1f };
        chars[MAX_NAME_LENGTH - 1 - index] = NAME_CHARMAP[(tmp & mask) as usize];
        tmp >>= if index == 0 { 4 } else { 5 };
    }

    let len = chars
        .iter()
        .rposition(|&c| c != b'.')
        .map_or(0, |position| position + 1);

    chars[..len].iter().copied().map(char::from).collect()
}

/// Check that `name` is a valid normalized name
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(NameError::TooLong {
            name: name.to_string(),
        });
    }

    if name_to_string(string_to_name(name)) != name {
        return Err(NameError::NotNormalized {
            name: name.to_string(),
        });
    }

    Ok(())
}

/// Check that `identifier` is a valid C-like identifier usable as a call name
pub fn validate_identifier(identifier: &str) -> Result<(), NameError> {
    let mut chars = identifier.chars();
    let Some(first) = chars.next() else {
        return Err(NameError::EmptyIdentifier);
    };

    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        return Err(NameError::IdentifierTooLong {
            identifier: identifier.to_string(),
        });
    }

    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(NameError::InvalidIdentifierStart {
            identifier: identifier.to_string(),
        });
    }

    if let Some(character) = chars.find(|&c| !(c.is_ascii_alphanumeric() || c == '_')) {
        return Err(NameError::InvalidIdentifierCharacter {
            identifier: identifier.to_string(),
            character,
        });
    }

    Ok(())
}

/// Function selector of a call derived from its identifier (djb2)
pub fn identifier_to_id(identifier: &str) -> u64 {
    identifier.bytes().fold(5381u64, |hash, c| {
        (hash << 5).wrapping_add(hash).wrapping_add(u64::from(c))
    })
}
