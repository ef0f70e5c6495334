use std::borrow::Cow;

/// One raw unit of transport payload.
/// Can be Text or Binary data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl Frame {
    /// Get the frame as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Frame::Text(s) => Some(s),
            Frame::Binary(_) => None,
        }
    }

    /// Decode the frame as text. Binary payloads are read as UTF-8,
    /// replacing invalid sequences.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Frame::Text(s) => Cow::Borrowed(s),
            Frame::Binary(b) => String::from_utf8_lossy(b),
        }
    }

    /// Check if frame is text
    pub fn is_text(&self) -> bool {
        matches!(self, Frame::Text(_))
    }

    /// Check if frame is binary
    pub fn is_binary(&self) -> bool {
        matches!(self, Frame::Binary(_))
    }
}

impl From<String> for Frame {
    fn from(text: String) -> Self {
        Frame::Text(text)
    }
}

impl From<&str> for Frame {
    fn from(text: &str) -> Self {
        Frame::Text(text.to_string())
    }
}
