//! Minimal server-sent events decoder

/// Marker some servers send as the last `data:` line
const DONE_MARKER: &str = "[DONE]";

/// Splits a byte stream into SSE `data` payloads.
///
/// Events are separated by a blank line; multiple `data:` lines in one event
/// are joined with `\n`. Other fields are ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every payload it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // Chunks may split a UTF-8 character
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut payloads = Vec::new();
        while let Some(idx) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let block: Vec<u8> = self.buffer.drain(..idx + 2).collect();
            if let Some(data) = parse_block(&String::from_utf8_lossy(&block)) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Flush a trailing event not followed by a blank line
    pub fn finish(&mut self) -> Option<String> {
        let block = std::mem::take(&mut self.buffer);
        parse_block(&String::from_utf8_lossy(&block))
    }
}

fn parse_block(block: &str) -> Option<String> {
    let data: Vec<&str> = block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();

    if data.is_empty() {
        return None;
    }
    let payload = data.join("\n");
    if payload.trim() == DONE_MARKER {
        return None;
    }
    Some(payload)
}
