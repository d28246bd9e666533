/// Line buffer for `text/event-stream` bodies.
///
/// Network chunks split lines (and UTF-8 sequences) arbitrarily, so bytes are
/// held until a full line arrives and only complete `data:` payloads come out.
#[derive(Debug, Default)]
pub struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns the payloads of every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(data) = data_payload(&String::from_utf8_lossy(&line)) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Flushes a trailing line the server did not terminate.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        data_payload(&String::from_utf8_lossy(&rest))
    }
}

fn data_payload(line: &str) -> Option<String> {
    line.trim()
        .strip_prefix("data:")
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_line_is_kept_for_next_chunk() {
        let mut buf = SseBuffer::new();
        assert!(buf.push(b"data: {\"a\":").is_empty());
        assert_eq!(buf.push(b"1}\n\ndata: [DONE]\n"), vec!["{\"a\":1}", "[DONE]"]);
    }

    #[test]
    fn test_non_data_lines_are_ignored() {
        let mut buf = SseBuffer::new();
        let out = buf.push(b": keep-alive\nevent: message\ndata: hi\r\n\n");
        assert_eq!(out, vec!["hi"]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let mut buf = SseBuffer::new();
        let bytes = "data: café\n".as_bytes();
        let (a, b) = bytes.split_at(bytes.len() - 2);
        assert!(buf.push(a).is_empty());
        assert_eq!(buf.push(b), vec!["café"]);
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut buf = SseBuffer::new();
        buf.push(b"data: tail");
        assert_eq!(buf.finish().as_deref(), Some("tail"));
        assert_eq!(buf.finish(), None);
    }
}
