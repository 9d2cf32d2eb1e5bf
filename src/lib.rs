//! Query encoding and response decoding for the DNS wire format, plus a
//! one-shot UDP lookup that ties the two together.

pub mod client;
pub mod dns_header;
pub mod dns_message;
pub mod dns_name;
pub mod dns_question_and_answer;
pub mod error;
mod wire;

pub use dns_header::{DnsFlags, DnsHeader};
pub use dns_message::{build_query, parse_response, DnsResponse};
pub use dns_name::{encode_domain_name, parse_domain_name};
pub use dns_question_and_answer::{DnsQuestion, DnsRecord, RecordClass, RecordType};
pub use error::{DnsError, Result};
