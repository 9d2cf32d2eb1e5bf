use thiserror::Error;

pub type Result<T> = std::result::Result<T, DnsError>;

/// Failures produced while encoding a query or decoding a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    /// The caller-supplied name cannot be put on the wire.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The received bytes violate the wire grammar.
    /// When a field runs off the end of the buffer, `offset` is the buffer length.
    #[error("malformed message at offset {offset}: {reason}")]
    MalformedMessage { offset: usize, reason: String },

    /// The buffer ended before the counts in the header were satisfied.
    #[error("truncated message: {section} section declares {expected} entries, only {parsed} present")]
    TruncatedMessage {
        section: &'static str,
        expected: u16,
        parsed: u16,
    },

    /// Record data does not fit the 16-bit length field.
    #[error("record data of {length} bytes exceeds 65535")]
    RDataTooLong { length: usize },

    /// Compression pointers were followed more times than any legal name needs.
    #[error("compression loop at offset {offset} after {jumps} jumps")]
    CompressionLoop { offset: usize, jumps: usize },
}

impl DnsError {
    pub fn invalid_name(name: &str, reason: impl Into<String>) -> Self {
        DnsError::InvalidName {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        DnsError::MalformedMessage {
            offset,
            reason: reason.into(),
        }
    }

    /// True for every error caused by bad received bytes, pointer loops included.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            DnsError::MalformedMessage { .. } | DnsError::CompressionLoop { .. }
        )
    }
}
