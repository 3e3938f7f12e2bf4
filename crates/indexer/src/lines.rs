use crate::error::{IndexerError, Result};
use crate::parse::normalize_line;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Streams normalized lines from a source file.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the whole file, and a final
/// line without a terminator is still yielded.
pub struct LineStream<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineStream<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            buf: Vec::with_capacity(256),
        }
    }

    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(normalize_line(&String::from_utf8_lossy(&self.buf))))
    }
}

/// Open `path` read-only for line streaming.
pub async fn open_lines(path: &Path) -> Result<LineStream<File>> {
    let file = File::open(path).await.map_err(|source| IndexerError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LineStream::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn yields_every_line_including_unterminated_tail() {
        let data: &[u8] = b"A\tB\nc\td\r\nLAST";
        let mut lines = LineStream::new(data);
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("a\tb"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("c\td"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("last"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_fatal() {
        let data: &[u8] = b"1\t\xff\xfe\n2\tok\n";
        let mut lines = LineStream::new(data);
        let first = lines.next_line().await.unwrap().unwrap();
        assert!(first.starts_with("1\t"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("2\tok"));
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = match open_lines(Path::new("/definitely/not/here.tsv")).await {
            Ok(_) => panic!("expected open failure"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("/definitely/not/here.tsv"));
    }
}
