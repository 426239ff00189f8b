use serde_json::Value;

/// Splits a byte stream into lines. Bytes are buffered until a `\n` so a
/// multi-byte character split across network chunks decodes intact.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    /// Feed a chunk and take every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..line.len() - 1]).into_owned());
        }
        lines
    }

    /// Whatever trailing text never saw a newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// One interpreted line of an OpenAI-style streaming response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamLine {
    Delta(String),
    Done,
    Skip,
}

pub fn parse_line(line: &str) -> StreamLine {
    let line = line.trim();
    let Some(payload) = line.strip_prefix("data:") else {
        // blank separators, `event:` and `:` comment lines
        return StreamLine::Skip;
    };
    let payload = payload.trim_start();
    if payload == "[DONE]" {
        return StreamLine::Done;
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(chunk) => match chunk
            .pointer("/choices/0/delta/content")
            .and_then(Value::as_str)
        {
            Some(content) if !content.is_empty() => StreamLine::Delta(content.to_string()),
            _ => StreamLine::Skip,
        },
        Err(e) => {
            tracing::warn!(error = %e, line = %payload, "skipping unparseable stream chunk");
            StreamLine::Skip
        }
    }
}
