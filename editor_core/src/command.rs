//! Prompt answer parsing
//!
//! Interactive commands collect a line of text on the status line. These
//! functions turn those answers into structured values.

use crate::key::{Command, Key};

/// Flag changes requested through the toggle prompt.
///
/// `None` keeps the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagUpdate {
    pub case_sensitive: Option<bool>,
    pub autoindent: Option<bool>,
    pub tab_size: Option<usize>,
    pub write_tabs: Option<bool>,
}

/// Parses `case, autoindent, tab size, write tabs`.
///
/// Fields are positional and comma-separated. An empty or missing field
/// keeps the old value, a yes/no field is true when it starts with `y`,
/// and a tab size that is not a positive number is ignored.
pub fn parse_flags(answer: &str) -> FlagUpdate {
    let mut fields = answer.split(',').map(str::trim);
    let mut next = || fields.next().filter(|f| !f.is_empty());

    let case_sensitive = next().map(is_yes);
    let autoindent = next().map(is_yes);
    let tab_size = next()
        .and_then(|f| f.parse::<usize>().ok())
        .filter(|&n| n > 0);
    let write_tabs = next().map(is_yes);

    FlagUpdate {
        case_sensitive,
        autoindent,
        tab_size,
        write_tabs,
    }
}

fn is_yes(field: &str) -> bool {
    field.starts_with(['y', 'Y'])
}

/// Parses a 1-based line number into a 0-based index.
///
/// Numbers below 1 select the first line; text that is not a number
/// yields `None`.
pub fn parse_goto(answer: &str) -> Option<usize> {
    let number: i64 = answer.trim().parse().ok()?;
    Some(usize::try_from(number.saturating_sub(1)).unwrap_or(0))
}

/// Answer to the per-match replace question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceAnswer {
    Yes,
    No,
    All,
    Quit,
}

/// Interprets a key pressed at the `yes/No/all/quit` question.
///
/// Anything unrecognized counts as no.
pub fn parse_replace_answer(key: Key) -> ReplaceAnswer {
    match key {
        Key::Command(Command::Quit) => ReplaceAnswer::Quit,
        Key::Char(ch) => match ch.to_ascii_lowercase() {
            'q' => ReplaceAnswer::Quit,
            'a' => ReplaceAnswer::All,
            'y' => ReplaceAnswer::Yes,
            _ => ReplaceAnswer::No,
        },
        Key::Command(_) => ReplaceAnswer::No,
    }
}

/// Whether the quit confirmation answer allows discarding changes
pub fn confirms_discard(answer: Option<&str>) -> bool {
    answer.is_some_and(|a| a.starts_with(['y', 'Y']))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags_full() {
        assert_eq!(
            parse_flags("y, n, 8, yes"),
            FlagUpdate {
                case_sensitive: Some(true),
                autoindent: Some(false),
                tab_size: Some(8),
                write_tabs: Some(true),
            }
        );
    }

    #[test]
    fn test_parse_flags_empty_fields_keep_values() {
        assert_eq!(
            parse_flags(",,2"),
            FlagUpdate {
                tab_size: Some(2),
                ..FlagUpdate::default()
            }
        );
        assert_eq!(parse_flags(""), FlagUpdate::default());
    }

    #[test]
    fn test_parse_flags_bad_tab_size_ignored() {
        assert_eq!(parse_flags("Y,,x").tab_size, None);
        assert_eq!(parse_flags("Y,,0").tab_size, None);
        assert_eq!(parse_flags("Y,,0").case_sensitive, Some(true));
    }

    #[test]
    fn test_parse_goto() {
        assert_eq!(parse_goto("1"), Some(0));
        assert_eq!(parse_goto(" 42 "), Some(41));
        assert_eq!(parse_goto("0"), Some(0));
        assert_eq!(parse_goto("-7"), Some(0));
        assert_eq!(parse_goto("abc"), None);
        assert_eq!(parse_goto(""), None);
    }

    #[test]
    fn test_parse_replace_answer() {
        assert_eq!(parse_replace_answer(Key::Char('y')), ReplaceAnswer::Yes);
        assert_eq!(parse_replace_answer(Key::Char('A')), ReplaceAnswer::All);
        assert_eq!(parse_replace_answer(Key::Char('q')), ReplaceAnswer::Quit);
        assert_eq!(
            parse_replace_answer(Key::Command(Command::Quit)),
            ReplaceAnswer::Quit
        );
        assert_eq!(parse_replace_answer(Key::Char('n')), ReplaceAnswer::No);
        assert_eq!(
            parse_replace_answer(Key::Command(Command::Enter)),
            ReplaceAnswer::No
        );
    }

    #[test]
    fn test_confirms_discard() {
        assert!(confirms_discard(Some("y")));
        assert!(confirms_discard(Some("Yes")));
        assert!(!confirms_discard(Some("N")));
        assert!(!confirms_discard(Some("")));
        assert!(!confirms_discard(None));
    }
}
