use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use super::error::ReportError;
use super::parse::{ParsedReport, ReportParser};

/// Streams `path` into a parser, stopping at the end marker without reading the rest.
pub(super) fn read_report_file(path: &Path) -> Result<ParsedReport, ReportError> {
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    read_report(BufReader::new(file)).map_err(|error| match error {
        ReportError::Io { source, .. } => io_error(source),
        other => other,
    })
}

pub(super) fn read_report(reader: impl BufRead) -> Result<ParsedReport, ReportError> {
    let mut parser = ReportParser::new();
    let mut consumed = 0usize;

    for line in reader.lines() {
        let line = line.map_err(|source| ReportError::Io {
            path: Default::default(),
            source,
        })?;
        consumed += 1;
        if parser.feed_line(&line)?.is_break() {
            break;
        }
    }

    debug!(lines = consumed, "report stream consumed");
    parser.finish()
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read};

    use super::*;

    /// Errors on any read, so touching the stream past the end marker fails the parse.
    struct Tripwire;

    impl Read for Tripwire {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("read past end marker"))
        }
    }

    #[test]
    fn stops_reading_at_end_marker() {
        let head = Cursor::new(b"1 a.xlsx\nSheet1\n#$\n".to_vec());
        let reader = BufReader::with_capacity(
            4,
            head.chain(Tripwire),
        );

        let report = read_report(reader).expect("parses");
        assert!(report.terminated);
        assert_eq!(report.tree.sheet_count(), 1);
    }

    #[test]
    fn reads_file_with_crlf_endings() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        std::io::Write::write_all(
            &mut file,
            b"#% generated\r\n1 dir/a.xlsx\r\nOne\r\nTwo\r\n#+ 1 1 4\r\n",
        )
        .expect("write");

        let report = read_report_file(file.path()).expect("parses");
        assert_eq!(report.tree.sheet_count(), 2);
        assert_eq!(report.links.len(), 1);
        assert!(!report.terminated);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.txt");
        let error = read_report_file(&path).expect_err("missing");

        match error {
            ReportError::Io { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
