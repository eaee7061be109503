//! Tab codec
//!
//! The in-memory document never contains tab characters. Tabs are expanded
//! to 8-column stops when lines enter the editor and optionally packed back
//! into tabs when lines are written out.
//!
//! Packing is lossy on irregular tab/space mixes: `pack(expand(x))` need not
//! equal `x`. `expand(pack(line))` reproduces a tab-free `line` unless its
//! last partial 8-column chunk ends in spaces. That chunk still packs to a
//! tab, which expands to the full stop.

use alloc::string::String;

/// Fixed width of a stored tab stop
pub const TAB_STOP: usize = 8;

/// Replaces every tab with spaces up to the next multiple of [`TAB_STOP`].
pub fn expand(line: &str) -> String {
    if !line.contains('\t') {
        return line.into();
    }

    let mut out = String::with_capacity(line.len() + TAB_STOP);
    let mut pos = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let fill = TAB_STOP - pos % TAB_STOP;
            out.extend(core::iter::repeat(' ').take(fill));
            pos += fill;
        } else {
            out.push(ch);
            pos += 1;
        }
    }
    out
}

/// Packs trailing spaces of each 8-column chunk into a tab.
///
/// The line is cut into consecutive chunks of [`TAB_STOP`] characters. A
/// chunk that ends in spaces is emitted with those spaces stripped and one
/// tab appended; any other chunk is emitted unchanged.
pub fn pack(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chunk = String::with_capacity(TAB_STOP);
    let mut chars = line.chars().peekable();

    while chars.peek().is_some() {
        chunk.clear();
        chunk.extend(chars.by_ref().take(TAB_STOP));
        let stripped = chunk.trim_end_matches(' ');
        if stripped.len() != chunk.len() {
            out.push_str(stripped);
            out.push('\t');
        } else {
            out.push_str(&chunk);
        }
    }
    out
}

/// Normalizes a line received from a file: strips trailing line
/// terminators and whitespace, then expands tabs.
pub fn normalize_loaded(line: &str) -> String {
    expand(line.trim_end_matches(&['\r', '\n', '\t', ' '][..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_without_tabs_is_identity() {
        assert_eq!(expand("plain text"), "plain text");
        assert_eq!(expand(""), "");
    }

    #[test]
    fn test_expand_to_next_stop() {
        assert_eq!(expand("\tx"), "        x");
        assert_eq!(expand("ab\tc"), "ab      c");
        assert_eq!(expand("12345678\ty"), "12345678        y");
        assert_eq!(expand("a\t\tb"), "a               b");
    }

    #[test]
    fn test_pack_leading_indent() {
        assert_eq!(pack("        x"), "\tx");
        assert_eq!(pack("                x = 1"), "\t\tx = 1");
    }

    #[test]
    fn test_pack_chunk_without_trailing_space_unchanged() {
        assert_eq!(pack("abcdefgh"), "abcdefgh");
        assert_eq!(pack("short"), "short");
    }

    #[test]
    fn test_pack_trailing_space_in_last_chunk() {
        // The final partial chunk is packed too
        assert_eq!(pack("ab  "), "ab\t");
    }

    #[test]
    fn test_expand_pack_reproduces_tab_free_lines() {
        for line in [
            "",
            "no indent",
            "    four",
            "        eight",
            "  a  b    c        d",
            "x       y",
            "if x:            # comment",
        ] {
            assert_eq!(expand(&pack(line)), line, "line {:?}", line);
        }
    }

    #[test]
    fn test_expand_pack_widens_trailing_space_in_last_chunk() {
        assert_eq!(expand(&pack("ab  ")), "ab      ");
        assert_eq!(expand(&pack("        x ")), "        x       ");
        // A full final chunk keeps its width
        assert_eq!(expand(&pack("abcdef  ")), "abcdef  ");
    }

    #[test]
    fn test_pack_expand_is_lossy_on_space_before_tab() {
        let original = "ab \tc";
        assert_ne!(pack(&expand(original)), original);
        assert_eq!(pack(&expand(original)), "ab\tc");
    }

    #[test]
    fn test_normalize_loaded() {
        assert_eq!(normalize_loaded("\tfoo  \r\n"), "        foo");
        assert_eq!(normalize_loaded("bar\t"), "bar");
    }
}
