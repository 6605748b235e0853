//! Reassembly of raw transport chunks into protocol frames.
//!
//! A frame is one `\n`-terminated line carrying `data: <payload>`. Lines are
//! buffered as bytes and only decoded once complete; `\n` never occurs inside
//! a multi-byte UTF-8 sequence, so a chunk boundary can fall anywhere.

pub const DATA_PREFIX: &str = "data:";
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Payload of a `data:` line.
    Data(String),
    /// The sentinel line; nothing follows it.
    Done,
}

#[derive(Debug, Default)]
pub struct FrameDecoder {
    residue: Vec<u8>,
    done: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the sentinel has been decoded.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Append a chunk and return every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        if self.done {
            return Vec::new();
        }
        self.residue.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.residue[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            if let Some(frame) = decode_line(&self.residue[start..end]) {
                let is_done = frame == Frame::Done;
                frames.push(frame);
                if is_done {
                    self.done = true;
                    self.residue.clear();
                    return frames;
                }
            }
            start = end + 1;
        }
        self.residue.drain(..start);
        frames
    }

    /// Flush a trailing line the server did not terminate.
    pub fn finish(&mut self) -> Vec<Frame> {
        if self.done || self.residue.is_empty() {
            self.residue.clear();
            return Vec::new();
        }
        let line = std::mem::take(&mut self.residue);
        match decode_line(&line) {
            Some(frame) => {
                self.done = frame == Frame::Done;
                vec![frame]
            }
            None => Vec::new(),
        }
    }
}

fn decode_line(raw: &[u8]) -> Option<Frame> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = String::from_utf8_lossy(raw);
    let payload = line.strip_prefix(DATA_PREFIX)?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);

    if payload == DONE_SENTINEL {
        Some(Frame::Done)
    } else {
        Some(Frame::Data(payload.to_string()))
    }
}

/// Wire encoder, the inverse of [`FrameDecoder`]: one `data: <payload>` line per
/// payload followed by a blank line, optionally closed by the sentinel.
///
/// Used to build agent stream bodies for stub servers and replayed fixtures.
pub fn encode_frames<'a>(payloads: impl IntoIterator<Item = &'a str>, sentinel: bool) -> String {
    let mut out = String::new();
    for payload in payloads {
        out.push_str("data: ");
        out.push_str(payload);
        out.push_str("\n\n");
    }
    if sentinel {
        out.push_str("data: ");
        out.push_str(DONE_SENTINEL);
        out.push_str("\n\n");
    }
    out
}
