use tracing::trace;

use crate::error::{DnsError, Result};
use crate::wire::take;

/// DNS labels are limited to 63 bytes
pub const MAX_LABEL_LENGTH: usize = 63;

/// Limit on the encoded name: length prefixes, labels and the zero terminator
pub const MAX_NAME_LENGTH: usize = 255;

/// Upper bound on pointer jumps within a single name
const MAX_POINTER_JUMPS: usize = 128;

/// Encode a domain name to DNS message format
/// Format: length-prefixed labels terminated with a null byte
/// Example: "example.com" -> [7]example[3]com[0]
/// The empty string is the root name and encodes to a single zero byte
pub fn encode_domain_name(name: &str) -> Result<Vec<u8>> {
    let mut encoded = Vec::with_capacity(name.len() + 2);

    if !name.is_empty() {
        for label in name.split('.') {
            let label_bytes = label.as_bytes();

            if label_bytes.is_empty() {
                return Err(DnsError::invalid_name(name, "empty label"));
            }
            if label_bytes.len() > MAX_LABEL_LENGTH {
                return Err(DnsError::invalid_name(
                    name,
                    format!(
                        "label of {} bytes exceeds {}",
                        label_bytes.len(),
                        MAX_LABEL_LENGTH
                    ),
                ));
            }

            encoded.push(label_bytes.len() as u8);
            encoded.extend_from_slice(label_bytes);
        }
    }

    // Null terminator
    encoded.push(0);

    if encoded.len() > MAX_NAME_LENGTH {
        return Err(DnsError::invalid_name(
            name,
            format!(
                "encoded length {} exceeds {}",
                encoded.len(),
                MAX_NAME_LENGTH
            ),
        ));
    }

    Ok(encoded)
}

/// Parse a domain name from DNS message format, following compression pointers
/// Returns the dotted name and the number of bytes it occupies at `offset`.
/// Once a pointer is taken the count stops growing: it covers the labels read in
/// place plus the two pointer bytes, never anything reached through the jump.
pub fn parse_domain_name(bytes: &[u8], offset: usize) -> Result<(String, usize)> {
    let mut labels = Vec::new();
    let mut wire_len = 0;
    let mut pos = offset;
    let mut consumed = None;
    let mut jumps = 0;

    loop {
        let length = *bytes
            .get(pos)
            .ok_or_else(|| DnsError::malformed(bytes.len(), "name runs past end of message"))?;

        match length & 0xC0 {
            0xC0 => {
                let low = *bytes
                    .get(pos + 1)
                    .ok_or_else(|| {
                        DnsError::malformed(bytes.len(), "incomplete compression pointer")
                    })?;
                let target = (usize::from(length & 0x3F) << 8) | usize::from(low);

                if consumed.is_none() {
                    consumed = Some(pos + 2 - offset);
                }

                jumps += 1;
                if jumps > MAX_POINTER_JUMPS {
                    return Err(DnsError::CompressionLoop { offset: pos, jumps });
                }
                if target >= bytes.len() {
                    return Err(DnsError::malformed(
                        pos,
                        format!(
                            "compression pointer to {} outside {}-byte message",
                            target,
                            bytes.len()
                        ),
                    ));
                }

                trace!(from = pos, to = target, "following compression pointer");
                pos = target;
            }
            0x00 => {
                let len = usize::from(length);

                wire_len += len + 1;
                if wire_len > MAX_NAME_LENGTH {
                    return Err(DnsError::malformed(
                        pos,
                        format!("name exceeds {} bytes", MAX_NAME_LENGTH),
                    ));
                }

                // Check for end of name
                if len == 0 {
                    let consumed = match consumed {
                        Some(consumed) => consumed,
                        None => pos + 1 - offset,
                    };
                    return Ok((labels.join("."), consumed));
                }

                let label = take(bytes, pos + 1, len, "label")?;
                labels.push(String::from_utf8_lossy(label).into_owned());
                pos += 1 + len;
            }
            _ => {
                return Err(DnsError::malformed(
                    pos,
                    format!("reserved label type 0x{:02x}", length),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Twelve bytes of header padding followed by www.example.com at offset 12
    fn message_with_name() -> Vec<u8> {
        let mut bytes = vec![0u8; 12];
        bytes.extend(encode_domain_name("www.example.com").unwrap());
        bytes
    }

    #[test]
    fn test_encode_domain_name() {
        let encoded = encode_domain_name("example.com").unwrap();
        assert_eq!(
            encoded,
            vec![7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0]
        );
    }

    #[test]
    fn test_encode_root_domain() {
        assert_eq!(encode_domain_name("").unwrap(), vec![0]);
    }

    #[test]
    fn test_encode_rejects_long_label() {
        let name = format!("{}.com", "a".repeat(64));
        assert!(matches!(
            encode_domain_name(&name),
            Err(DnsError::InvalidName { .. })
        ));

        let name = format!("{}.com", "a".repeat(63));
        assert_eq!(encode_domain_name(&name).unwrap().len(), 69);
    }

    #[test]
    fn test_encode_rejects_empty_labels() {
        for name in ["a..b", ".example.com", "example.com.", "."] {
            assert!(
                matches!(
                    encode_domain_name(name),
                    Err(DnsError::InvalidName { .. })
                ),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_encode_rejects_long_name() {
        // 3 * 64 + 62 + 1 = 255 fits, one more byte does not
        let fits = ["a".repeat(63), "b".repeat(63), "c".repeat(63), "d".repeat(61)].join(".");
        assert_eq!(encode_domain_name(&fits).unwrap().len(), 255);

        let too_long = ["a".repeat(63), "b".repeat(63), "c".repeat(63), "d".repeat(62)].join(".");
        assert!(matches!(
            encode_domain_name(&too_long),
            Err(DnsError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_parse_domain_name() {
        let bytes = vec![
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0,
        ];
        let (name, consumed) = parse_domain_name(&bytes, 0).unwrap();
        assert_eq!(name, "example.com");
        assert_eq!(consumed, 13);
    }

    #[test]
    fn test_parse_root_domain() {
        let (name, consumed) = parse_domain_name(&[0], 0).unwrap();
        assert_eq!(name, "");
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_parse_compressed_name() {
        let mut bytes = message_with_name();
        let pointer_at = bytes.len();
        bytes.extend([0xC0, 0x0C]);

        let (name, consumed) = parse_domain_name(&bytes, pointer_at).unwrap();
        assert_eq!(name, "www.example.com");
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_parse_labels_then_pointer() {
        let mut bytes = message_with_name();
        let start = bytes.len();
        // mail + pointer to "example.com" at offset 16
        bytes.extend([4, b'm', b'a', b'i', b'l', 0xC0, 16]);

        let (name, consumed) = parse_domain_name(&bytes, start).unwrap();
        assert_eq!(name, "mail.example.com");
        assert_eq!(consumed, 7);
    }

    #[test]
    fn test_parse_chained_pointers_counts_first_only() {
        let mut bytes = message_with_name();
        let second = bytes.len();
        bytes.extend([3, b'f', b't', b'p', 0xC0, 16]);
        let third = bytes.len();
        bytes.extend([0xC0, second as u8]);

        let (name, consumed) = parse_domain_name(&bytes, third).unwrap();
        assert_eq!(name, "ftp.example.com");
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_parse_rejects_reserved_label_types() {
        for first in [0x80u8, 0x40] {
            let bytes = [first, b'a', 0];
            let err = parse_domain_name(&bytes, 0).unwrap_err();
            assert!(matches!(err, DnsError::MalformedMessage { offset: 0, .. }));
        }
    }

    #[test]
    fn test_parse_pointer_out_of_range() {
        let bytes = [0xC0, 0x40];
        assert!(matches!(
            parse_domain_name(&bytes, 0),
            Err(DnsError::MalformedMessage { .. })
        ));
    }

    #[test]
    fn test_parse_incomplete_pointer() {
        let bytes = [3, b'w', b'w', b'w', 0xC0];
        assert!(matches!(
            parse_domain_name(&bytes, 0),
            Err(DnsError::MalformedMessage { offset: 5, .. })
        ));
    }

    #[test]
    fn test_parse_pointer_loop() {
        // Two pointers aimed at each other
        let bytes = [0xC0, 0x02, 0xC0, 0x00];
        let err = parse_domain_name(&bytes, 0).unwrap_err();
        assert!(matches!(err, DnsError::CompressionLoop { .. }));
        assert!(err.is_malformed());

        let self_pointer = [0xC0, 0x00];
        assert!(matches!(
            parse_domain_name(&self_pointer, 0),
            Err(DnsError::CompressionLoop { .. })
        ));
    }

    #[test]
    fn test_parse_label_past_end() {
        let bytes = [7, b'e', b'x', b'a'];
        assert!(matches!(
            parse_domain_name(&bytes, 0),
            Err(DnsError::MalformedMessage { .. })
        ));
        assert!(parse_domain_name(&bytes, 10).is_err());
    }

    #[test]
    fn test_parse_missing_terminator() {
        let bytes = [3, b'c', b'o', b'm'];
        assert!(matches!(
            parse_domain_name(&bytes, 0),
            Err(DnsError::MalformedMessage { offset: 4, .. })
        ));
    }

    #[test]
    fn test_parse_pointer_back_to_earlier_name() {
        // Terminator of the target lies before the pointer, as in every answer pointing at its question
        let mut bytes = message_with_name();
        bytes.extend([0x00, 0x01, 0x00, 0x01]);
        let first = bytes.len();
        bytes.extend([0xC0, 0x0C, 0xC0, 0x0C]);

        assert_eq!(
            parse_domain_name(&bytes, first).unwrap(),
            ("www.example.com".to_string(), 2)
        );
        assert_eq!(
            parse_domain_name(&bytes, first + 2).unwrap(),
            ("www.example.com".to_string(), 2)
        );
    }

    #[test]
    fn test_parse_name_at_length_limit() {
        // 127 one-byte labels plus the terminator is exactly 255 bytes
        let name = vec!["a"; 127].join(".");
        let encoded = encode_domain_name(&name).unwrap();
        assert_eq!(encoded.len(), MAX_NAME_LENGTH);

        let (decoded, consumed) = parse_domain_name(&encoded, 0).unwrap();
        assert_eq!(decoded, name);
        assert_eq!(consumed, MAX_NAME_LENGTH);
    }

    #[test]
    fn test_parse_rejects_name_over_limit() {
        // 128 one-byte labels decode to 257 bytes, reachable only on the wire
        let mut bytes = Vec::new();
        for _ in 0..128 {
            bytes.extend([1, b'a']);
        }
        bytes.push(0);

        assert!(matches!(
            parse_domain_name(&bytes, 0),
            Err(DnsError::MalformedMessage { .. })
        ));
    }

    fn labels_within_limit() -> impl Strategy<Value = Vec<String>> {
        prop_oneof![
            proptest::collection::vec("[a-zA-Z0-9-]{1,63}", 0..=3),
            proptest::collection::vec("[a-z0-9-]{1,3}", 0..=127),
        ]
        .prop_filter("encoded name must fit in 255 bytes", |labels| {
            labels.iter().map(|label| label.len() + 1).sum::<usize>() < MAX_NAME_LENGTH
        })
    }

    proptest! {
        #[test]
        fn domain_name_roundtrip(labels in labels_within_limit()) {
            let name = labels.join(".");
            let encoded = encode_domain_name(&name).unwrap();
            let (decoded, consumed) = parse_domain_name(&encoded, 0).unwrap();
            prop_assert_eq!(decoded, name);
            prop_assert_eq!(consumed, encoded.len());
        }
    }
}
