use nanoid::nanoid;

const ALPHABET: [char; 36] = [
  '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e',
  'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't',
  'u', 'v', 'w', 'x', 'y', 'z',
];

/// Lowercase alphanumeric ids, safe in URLs and case-insensitive stores.
pub fn custom_nanoid() -> String {
  nanoid!(21, &ALPHABET)
}
