use nanoid::nanoid;

/// Alphabet for document identifiers. Alphanumeric with the easily confused
/// glyphs (0/O, 1/I/l) removed so ids survive being read aloud or retyped.
const DOC_ID_ALPHABET: &[char] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'M', 'N', 'P', 'Q',
    'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'k', 'm', 'n', 'p',
    'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Default document id length.
const DOC_ID_LENGTH: usize = 22;

/// Generates a new document identifier.
pub fn generate_doc_id() -> String {
    nanoid!(DOC_ID_LENGTH, DOC_ID_ALPHABET)
}
