use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Total-message-size ceiling the provider enforces, measured on the
/// wire-encoded payload.
pub const MESSAGE_SIZE_LIMIT: u64 = 25_000_000;

/// A file attached to a message, or an inline image referenced from the HTML
/// body as `cid:<file_name>`. Content travels Base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(
        mime_type: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Size this attachment occupies on the wire, after Base64 expansion.
    pub fn encoded_len(&self) -> u64 {
        encoded_len(self.content.len())
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.content)
    }
}

/// Base64 length of `raw` bytes: `ceil(raw / 3) * 4`, padding included.
/// The provider's budget is measured on the encoded payload, not raw bytes.
pub fn encoded_len(raw: usize) -> u64 {
    (raw as u64).div_ceil(3) * 4
}

pub fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_len_matches_formula() {
        assert_eq!(encoded_len(0), 0);
        assert_eq!(encoded_len(1), 4);
        assert_eq!(encoded_len(2), 4);
        assert_eq!(encoded_len(3), 4);
        assert_eq!(encoded_len(4), 8);
        assert_eq!(encoded_len(1000), 1336);
    }

    #[test]
    fn encoded_len_agrees_with_real_encoder() {
        for n in [0usize, 1, 3, 1000, 4096] {
            let a = Attachment::new("application/octet-stream", "blob", vec![0xabu8; n]);
            assert_eq!(a.to_base64().len() as u64, encoded_len(n), "n = {n}");
        }
    }

    #[test]
    fn base64_round_trips_exactly() {
        for n in [0usize, 1, 3, 1000, 10_000_000] {
            let bytes: Vec<u8> = (0..n).map(|i| (i % 251) as u8).collect();
            let a = Attachment::new("application/pdf", "sample.pdf", bytes.clone());
            assert_eq!(decode_base64(&a.to_base64()).unwrap(), bytes, "n = {n}");
        }
    }
}
