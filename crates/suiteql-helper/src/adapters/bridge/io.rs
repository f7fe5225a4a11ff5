use std::io::{BufRead, Write};

use crate::error::{AppError, AppResult};

use super::protocol::{BridgeResponse, ErrorBody, ResponseBody, PROTOCOL_VERSION};

/// Newline-delimited JSON framing over a reader/writer pair.
pub struct NdjsonIo<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> NdjsonIo<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Next non-blank line, or `None` at end of input.
    pub fn read_line(&mut self) -> AppResult<Option<String>> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = self.reader.read_line(&mut line)?;
            if n == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    pub fn write_json_line<T: serde::Serialize>(&mut self, v: &T) -> AppResult<()> {
        serde_json::to_writer(&mut self.writer, v)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Reply to a line that could not be parsed as a request.
    pub fn protocol_error(&mut self, msg: String) -> AppResult<()> {
        let e = AppError::InvalidRequest(msg);
        let resp = BridgeResponse {
            v: PROTOCOL_VERSION,
            id: String::new(),
            body: ResponseBody::Err(ErrorBody {
                error: e.to_string(),
                code: e.code(),
            }),
        };
        self.write_json_line(&resp)
    }

    #[cfg(test)]
    pub fn into_writer(self) -> W {
        self.writer
    }
}
