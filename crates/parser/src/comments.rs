//! Comment stripping
//!
//! Removes `<!-- ... -->` regions from raw markup before tokenizing.
//! Quoted attribute values are opaque: a `<!--` or `-->` inside quotes
//! within a tag is copied verbatim.

/// Strip comment regions from markup text.
///
/// An unterminated comment drops everything after its `<!--`; an
/// unterminated quote inside a tag clamps to end of input. Both are
/// long-standing behaviors that downstream documents rely on.
pub fn strip_comments(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::with_capacity(input.len());
    let mut inside_tag = false;
    let mut i = 0;

    while i < chars.len() {
        if starts_with(&chars, i, "<!--") {
            match find(&chars, i + 4, "-->") {
                Some(end) => {
                    i = end + 3;
                    continue;
                }
                // Unterminated comment: the remainder of input is gone
                None => break,
            }
        }

        let c = chars[i];
        match c {
            '<' => {
                inside_tag = true;
                output.push(c);
                i += 1;
            }
            '>' => {
                inside_tag = false;
                output.push(c);
                i += 1;
            }
            '"' | '\'' if inside_tag => {
                // Copy the quoted span opaquely, clamping to EOF when
                // the closing quote is missing
                output.push(c);
                i += 1;
                while i < chars.len() && chars[i] != c {
                    output.push(chars[i]);
                    i += 1;
                }
                if i < chars.len() {
                    output.push(c);
                    i += 1;
                }
            }
            _ => {
                output.push(c);
                i += 1;
            }
        }
    }

    output
}

fn starts_with(chars: &[char], pos: usize, needle: &str) -> bool {
    needle
        .chars()
        .enumerate()
        .all(|(offset, c)| chars.get(pos + offset) == Some(&c))
}

fn find(chars: &[char], from: usize, needle: &str) -> Option<usize> {
    (from..chars.len()).find(|&i| starts_with(chars, i, needle))
}
