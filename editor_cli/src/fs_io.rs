//! Filesystem line store

use std::fs;
use std::io;

use editor_core::{EditorIo, IoError};

/// [`EditorIo`] over the local filesystem, names are paths
#[derive(Debug, Clone, Copy, Default)]
pub struct FsEditorIo;

/// Splits file contents into lines without terminators.
///
/// Invalid UTF-8 is replaced rather than rejected. A final line terminator
/// does not start another line.
pub fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(String::from)
        .collect()
}

/// Joins lines into file contents, terminating every line
pub fn join_lines(lines: &[String]) -> String {
    let mut text = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

fn io_error(name: &str, err: io::Error) -> IoError {
    if err.kind() == io::ErrorKind::NotFound {
        IoError::NotFound(name.into())
    } else {
        IoError::Failed {
            name: name.into(),
            reason: err.to_string(),
        }
    }
}

impl EditorIo for FsEditorIo {
    fn read_lines(&mut self, name: &str) -> Result<Vec<String>, IoError> {
        let bytes = fs::read(name).map_err(|e| io_error(name, e))?;
        Ok(split_lines(&bytes))
    }

    fn write_lines(&mut self, name: &str, lines: &[String]) -> Result<(), IoError> {
        fs::write(name, join_lines(lines)).map_err(|e| io_error(name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn path_in(dir: &TempDir, file: &str) -> String {
        dir.path().join(file).to_string_lossy().into_owned()
    }

    #[test]
    fn test_split_strips_terminators() {
        assert_eq!(split_lines(b"a\r\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines(b"a\n"), vec!["a"]);
        assert_eq!(split_lines(b"a\n\n"), vec!["a", ""]);
        assert!(split_lines(b"").is_empty());
    }

    #[test]
    fn test_split_replaces_invalid_utf8() {
        assert_eq!(split_lines(b"ok\xff\n"), vec!["ok\u{fffd}"]);
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let name = path_in(&dir, "out.txt");
        let mut io = FsEditorIo;

        io.write_lines(&name, &["one".into(), "".into(), "\tthree".into()])
            .unwrap();
        assert_eq!(fs::read_to_string(&name).unwrap(), "one\n\n\tthree\n");
        assert_eq!(io.read_lines(&name).unwrap(), vec!["one", "", "\tthree"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let name = path_in(&dir, "absent.txt");
        assert_eq!(
            FsEditorIo.read_lines(&name),
            Err(IoError::NotFound(name.clone()))
        );
    }

    #[test]
    fn test_unwritable_location() {
        let dir = TempDir::new().unwrap();
        let name = path_in(&dir, "no/such/dir.txt");
        match FsEditorIo.write_lines(&name, &["x".into()]) {
            Err(IoError::NotFound(n)) | Err(IoError::Failed { name: n, .. }) => {
                assert_eq!(n, name)
            }
            Ok(()) => panic!("write into a missing directory succeeded"),
        }
    }
}
