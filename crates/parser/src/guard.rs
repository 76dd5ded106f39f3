//! Script/style body guarding
//!
//! Element bodies of `<script>` and `<style>` may contain `<`, `>` and
//! bare line breaks that the tokenizer would misread as markup. Before
//! tokenizing, those characters are swapped for sentinel strings; the
//! tree builder swaps them back when it wraps text tokens.

/// Sentinel for `<` inside a guarded body
pub const GUARD_LT: &str = "[-[lt]-]";
/// Sentinel for `>` inside a guarded body
pub const GUARD_GT: &str = "[-[gt]-]";
/// Sentinel for CR inside a guarded body
pub const GUARD_CR: &str = "[-[cr]-]";
/// Sentinel for LF inside a guarded body
pub const GUARD_LF: &str = "[-[lf]-]";

/// Check whether the chars at `pos` start with `needle`, ASCII
/// case-insensitively
fn at_str_ci(chars: &[char], pos: usize, needle: &str) -> bool {
    let slice: String = chars[pos.min(chars.len())..]
        .iter()
        .take(needle.len())
        .collect();
    slice.eq_ignore_ascii_case(needle)
}

/// Replace `<`, `>`, CR and LF inside every `<tag_name ...>` body with
/// sentinels. The opening tag itself (name and attributes) passes
/// through untouched; a missing close tag guards through end of input.
pub fn guard(input: &str, tag_name: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::with_capacity(input.len());
    let open = format!("<{}", tag_name);
    let close = format!("</{}", tag_name);
    let mut i = 0;

    while i < chars.len() {
        let boundary = chars
            .get(i + open.len())
            .map(|c| !c.is_ascii_alphanumeric())
            .unwrap_or(true);
        if at_str_ci(&chars, i, &open) && boundary {
            // Copy the opening tag through its '>'
            let mut self_closed = false;
            while i < chars.len() && chars[i] != '>' {
                self_closed = chars[i] == '/';
                output.push(chars[i]);
                i += 1;
            }
            if i < chars.len() {
                output.push('>');
                i += 1;
            }
            if self_closed {
                continue;
            }

            // Guard the body until the matching close tag (or EOF)
            while i < chars.len() && !at_str_ci(&chars, i, &close) {
                match chars[i] {
                    '<' => output.push_str(GUARD_LT),
                    '>' => output.push_str(GUARD_GT),
                    '\r' => output.push_str(GUARD_CR),
                    '\n' => output.push_str(GUARD_LF),
                    c => output.push(c),
                }
                i += 1;
            }
        } else {
            output.push(chars[i]);
            i += 1;
        }
    }

    output
}

/// Reverse the four sentinel substitutions, wherever they appear.
/// Deliberately global and stateless.
pub fn unguard(input: &str) -> String {
    input
        .replace(GUARD_LT, "<")
        .replace(GUARD_GT, ">")
        .replace(GUARD_CR, "\r")
        .replace(GUARD_LF, "\n")
}
