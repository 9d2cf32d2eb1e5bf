use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::dns_header::{DnsHeader, HEADER_SIZE};
use crate::dns_question_and_answer::{DnsQuestion, DnsRecord};
use crate::error::{DnsError, Result};

/// A decoded response. Authority and additional records are walked over but not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsResponse {
    pub header: DnsHeader,
    pub questions: Vec<DnsQuestion>,
    pub answers: Vec<DnsRecord>,
}

impl DnsResponse {
    /// The first question, which is the only one a query built here carries
    pub fn question(&self) -> Option<&DnsQuestion> {
        self.questions.first()
    }
}

/// Build the complete query message: header followed by a single question
pub fn build_query(id: u16, name: &str, qtype: u16, qclass: u16) -> Result<Bytes> {
    let question = DnsQuestion::new(name, qtype, qclass);

    let mut query = BytesMut::with_capacity(HEADER_SIZE + name.len() + 6);
    DnsHeader::query(id).write_to(&mut query);
    question.write_to(&mut query)?;

    debug!(id, qname = name, qtype, qclass, len = query.len(), "built query");

    Ok(query.freeze())
}

/// Parse a DNS response from the buffer
/// Takes an immutable borrow of the buffer, returns owned structures
pub fn parse_response(buf: &[u8]) -> Result<DnsResponse> {
    let header = DnsHeader::from_bytes(buf)?;
    let mut offset = HEADER_SIZE; // Start after header

    let mut questions = Vec::with_capacity(usize::from(header.question_count));
    for parsed in 0..header.question_count {
        ensure_remaining(buf, offset, "question", header.question_count, parsed)?;
        let (question, consumed) = DnsQuestion::from_bytes(buf, offset)
            .map_err(|e| cut_short(e, buf, "question", header.question_count, parsed))?;
        questions.push(question);
        offset += consumed;
    }

    let mut answers = Vec::with_capacity(usize::from(header.answer_count));
    for parsed in 0..header.answer_count {
        ensure_remaining(buf, offset, "answer", header.answer_count, parsed)?;
        let (answer, consumed) = DnsRecord::from_bytes(buf, offset)
            .map_err(|e| cut_short(e, buf, "answer", header.answer_count, parsed))?;
        answers.push(answer);
        offset += consumed;
    }

    for (section, count) in [
        ("authority", header.authority_count),
        ("additional", header.additional_count),
    ] {
        for parsed in 0..count {
            ensure_remaining(buf, offset, section, count, parsed)?;
            offset += DnsRecord::skip(buf, offset)
                .map_err(|e| cut_short(e, buf, section, count, parsed))?;
        }
    }

    debug!(
        id = header.id,
        rcode = header.rcode(),
        questions = questions.len(),
        answers = answers.len(),
        len = buf.len(),
        "parsed response"
    );

    Ok(DnsResponse {
        header,
        questions,
        answers,
    })
}

/// A declared entry that would start at or past the end of the buffer means the message was cut short
fn ensure_remaining(
    buf: &[u8],
    offset: usize,
    section: &'static str,
    expected: u16,
    parsed: u16,
) -> Result<()> {
    if offset >= buf.len() {
        return Err(DnsError::TruncatedMessage {
            section,
            expected,
            parsed,
        });
    }
    Ok(())
}

/// A declared entry that runs off the end of the buffer was cut short, not malformed
fn cut_short(
    err: DnsError,
    buf: &[u8],
    section: &'static str,
    expected: u16,
    parsed: u16,
) -> DnsError {
    match err {
        DnsError::MalformedMessage { offset, .. } if offset >= buf.len() => {
            DnsError::TruncatedMessage {
                section,
                expected,
                parsed,
            }
        }
        err => err,
    }
}
