//! Code page 437 conversion for protocol strings.
//!
//! Every string field is 64 bytes of code page 437 padded with spaces. The
//! lower half is ASCII; the upper half maps to the glyphs below.

/// Width in bytes of a protocol string field.
pub const STRING_LENGTH: usize = 64;

const UPPER_HALF: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// Decode one code page 437 byte.
#[must_use]
pub fn decode_byte(byte: u8) -> char {
    if byte.is_ascii() {
        char::from(byte)
    } else {
        UPPER_HALF[usize::from(byte - 0x80)]
    }
}

/// Encode one character. Characters outside ASCII become `?` unless
/// `full` is set and the character exists in the upper half.
#[must_use]
pub fn encode_char(c: char, full: bool) -> u8 {
    if c.is_ascii() {
        return u8::try_from(c).unwrap_or(b'?');
    }
    if !full {
        return b'?';
    }
    UPPER_HALF
        .iter()
        .position(|&glyph| glyph == c)
        .and_then(|index| u8::try_from(index + 0x80).ok())
        .unwrap_or(b'?')
}

/// Decode a padded string field, dropping trailing spaces.
#[must_use]
pub fn decode_padded(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
    raw[..end].iter().copied().map(decode_byte).collect()
}

/// Encode `text` into a space-padded string field, truncating past
/// [`STRING_LENGTH`] characters.
#[must_use]
pub fn encode_padded(text: &str, full: bool) -> [u8; STRING_LENGTH] {
    let mut field = [b' '; STRING_LENGTH];
    for (slot, c) in field.iter_mut().zip(text.chars()) {
        *slot = encode_char(c, full);
    }
    field
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn decoding_trims_padding_only_at_the_end() {
        let mut raw = [b' '; STRING_LENGTH];
        raw[..9].copy_from_slice(b"D3  serve");
        assert_eq!(decode_padded(&raw), "D3  serve");
        assert_eq!(decode_padded(&[b' '; STRING_LENGTH]), "");
    }

    #[rstest]
    #[case::ascii('a', false, b'a')]
    #[case::upper_without_full('é', false, b'?')]
    #[case::upper_with_full('é', true, 0x82)]
    #[case::unmapped('€', true, b'?')]
    fn encodes_characters(#[case] c: char, #[case] full: bool, #[case] expected: u8) {
        assert_eq!(encode_char(c, full), expected);
    }

    #[test]
    fn upper_half_decodes_box_drawing() {
        assert_eq!(decode_byte(0xB3), '│');
        assert_eq!(decode_byte(0xFE), '■');
    }

    #[test]
    fn long_text_is_truncated() {
        let text = "x".repeat(80);
        let field = encode_padded(&text, false);
        assert!(field.iter().all(|&b| b == b'x'));
    }
}
