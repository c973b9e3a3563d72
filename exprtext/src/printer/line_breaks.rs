/// Replaces the first space at or after each offset with a line break.
///
/// Offsets count characters and must be sorted in ascending order. Offsets
/// without a space after them are ignored.
pub(super) fn apply(string: String, offsets: &[usize]) -> String {
    if offsets.is_empty() {
        return string;
    }

    let mut chars: Vec<char> = string.chars().collect();

    for &offset in offsets {
        let found = chars.iter().skip(offset).position(|c| *c == ' ');
        if let Some(distance) = found {
            chars[offset + distance] = '\n';
        }
    }

    chars.into_iter().collect()
}
