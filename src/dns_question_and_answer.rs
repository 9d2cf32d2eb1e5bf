use std::fmt;
use std::net::Ipv4Addr;

use bytes::BufMut;

use crate::dns_name::{encode_domain_name, parse_domain_name};
use crate::error::{DnsError, Result};
use crate::wire::{read_u16, read_u32, take};

/// DNS Question Section
/// Format: QNAME + QTYPE (2 bytes) + QCLASS (2 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    pub name: String, // Domain name (e.g., "example.com")
    pub qtype: u16,   // Query type (A, AAAA, CNAME, etc.)
    pub qclass: u16,  // Query class (usually IN for Internet)
}

/// DNS Resource Record
/// Format: NAME + TYPE (2 bytes) + CLASS (2 bytes) + TTL (4 bytes) + RDLENGTH (2 bytes) + RDATA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub name: String,   // Owner name, decompressed
    pub rtype: u16,     // Record type (A, AAAA, CNAME, etc.)
    pub rclass: u16,    // Record class (usually IN for Internet)
    pub ttl: i32,       // Time to live in seconds
    pub rdata: Vec<u8>, // Resource data (format depends on record type)
}

/// Bytes between the owner name and RDATA: type, class, TTL, rdlength
const RECORD_FIXED_LEN: usize = 10;

/// Size of the RDATA of an address record
const IPV4_RDATA_LEN: usize = 4;

/// Common DNS record types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A = 1,     // IPv4 address
    NS = 2,    // Name server
    CNAME = 5, // Canonical name
    SOA = 6,   // Start of authority
    PTR = 12,  // Pointer record
    MX = 15,   // Mail exchange
    TXT = 16,  // Text record
    AAAA = 28, // IPv6 address
    OPT = 41,  // EDNS0 option
}

impl RecordType {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(RecordType::A),
            2 => Some(RecordType::NS),
            5 => Some(RecordType::CNAME),
            6 => Some(RecordType::SOA),
            12 => Some(RecordType::PTR),
            15 => Some(RecordType::MX),
            16 => Some(RecordType::TXT),
            28 => Some(RecordType::AAAA),
            41 => Some(RecordType::OPT),
            _ => None,
        }
    }

    /// Accepts a mnemonic in any case or a bare number
    pub fn parse(value: &str) -> Option<u16> {
        if let Ok(number) = value.parse::<u16>() {
            return Some(number);
        }
        let upper = value.to_ascii_uppercase();
        [
            RecordType::A,
            RecordType::NS,
            RecordType::CNAME,
            RecordType::SOA,
            RecordType::PTR,
            RecordType::MX,
            RecordType::TXT,
            RecordType::AAAA,
            RecordType::OPT,
        ]
        .into_iter()
        .find(|rtype| rtype.mnemonic() == upper)
        .map(RecordType::to_u16)
    }

    pub fn to_u16(self) -> u16 {
        self as u16
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::NS => "NS",
            RecordType::CNAME => "CNAME",
            RecordType::SOA => "SOA",
            RecordType::PTR => "PTR",
            RecordType::MX => "MX",
            RecordType::TXT => "TXT",
            RecordType::AAAA => "AAAA",
            RecordType::OPT => "OPT",
        }
    }
}

/// Common DNS classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordClass {
    IN = 1, // Internet
    CS = 2, // CSNET (obsolete)
    CH = 3, // CHAOS
    HS = 4, // Hesiod
}

impl RecordClass {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(RecordClass::IN),
            2 => Some(RecordClass::CS),
            3 => Some(RecordClass::CH),
            4 => Some(RecordClass::HS),
            _ => None,
        }
    }

    pub fn to_u16(self) -> u16 {
        self as u16
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            RecordClass::IN => "IN",
            RecordClass::CS => "CS",
            RecordClass::CH => "CH",
            RecordClass::HS => "HS",
        }
    }
}

/// Mnemonic for known types, `TYPE<n>` otherwise
pub struct TypeName(pub u16);

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match RecordType::from_u16(self.0) {
            Some(rtype) => f.write_str(rtype.mnemonic()),
            None => write!(f, "TYPE{}", self.0),
        }
    }
}

/// Mnemonic for known classes, `CLASS<n>` otherwise
pub struct ClassName(pub u16);

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match RecordClass::from_u16(self.0) {
            Some(rclass) => f.write_str(rclass.mnemonic()),
            None => write!(f, "CLASS{}", self.0),
        }
    }
}

impl DnsQuestion {
    pub fn new(name: impl Into<String>, qtype: u16, qclass: u16) -> Self {
        DnsQuestion {
            name: name.into(),
            qtype,
            qclass,
        }
    }

    /// Parse a DNS question from bytes starting at the given offset
    /// Returns the question and the number of bytes it occupies
    pub fn from_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (name, name_len) = parse_domain_name(bytes, offset)?;

        let fields = offset + name_len;
        let qtype = read_u16(bytes, fields, "question type")?;
        let qclass = read_u16(bytes, fields + 2, "question class")?;

        Ok((
            DnsQuestion {
                name,
                qtype,
                qclass,
            },
            name_len + 4,
        ))
    }

    pub fn write_to<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_slice(&encode_domain_name(&self.name)?);
        buf.put_u16(self.qtype);
        buf.put_u16(self.qclass);
        Ok(())
    }

    /// Convert the question to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.name.len() + 6);
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }
}

impl DnsRecord {
    /// Parse a resource record from bytes starting at the given offset
    /// Returns the record and the number of bytes it occupies
    pub fn from_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (name, name_len) = parse_domain_name(bytes, offset)?;

        let fields = offset + name_len;
        let rtype = read_u16(bytes, fields, "record type")?;
        let rclass = read_u16(bytes, fields + 2, "record class")?;
        let ttl = read_u32(bytes, fields + 4, "record ttl")? as i32;
        let rdlength = usize::from(read_u16(bytes, fields + 8, "record length")?);

        let data_offset = fields + RECORD_FIXED_LEN;
        let rdata = take(bytes, data_offset, rdlength, "record data")?.to_vec();

        if rtype == RecordType::A.to_u16() && rdlength != IPV4_RDATA_LEN {
            return Err(DnsError::malformed(
                fields + 8,
                format!(
                    "address record carries {} bytes of data, expected {}",
                    rdlength, IPV4_RDATA_LEN
                ),
            ));
        }

        Ok((
            DnsRecord {
                name,
                rtype,
                rclass,
                ttl,
                rdata,
            },
            name_len + RECORD_FIXED_LEN + rdlength,
        ))
    }

    /// Step over a record without keeping it, returning its size on the wire
    pub fn skip(bytes: &[u8], offset: usize) -> Result<usize> {
        let (_, name_len) = parse_domain_name(bytes, offset)?;

        let fields = offset + name_len;
        let rdlength = usize::from(read_u16(bytes, fields + 8, "record length")?);
        take(bytes, fields + RECORD_FIXED_LEN, rdlength, "record data")?;

        Ok(name_len + RECORD_FIXED_LEN + rdlength)
    }

    pub fn write_to<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        let rdlength = u16::try_from(self.rdata.len()).map_err(|_| DnsError::RDataTooLong {
            length: self.rdata.len(),
        })?;

        buf.put_slice(&encode_domain_name(&self.name)?);
        buf.put_u16(self.rtype);
        buf.put_u16(self.rclass);
        buf.put_i32(self.ttl);
        buf.put_u16(rdlength);
        buf.put_slice(&self.rdata);
        Ok(())
    }

    /// Convert the record to bytes, name uncompressed
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.name.len() + 12 + self.rdata.len());
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Create a new resource record with the given parameters
    pub fn new(name: String, rtype: u16, rclass: u16, ttl: i32, rdata: Vec<u8>) -> Self {
        DnsRecord {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
        }
    }

    /// Create an A record (IPv4 address)
    pub fn new_a_record(name: String, ttl: i32, ip: Ipv4Addr) -> Self {
        Self::new(
            name,
            RecordType::A.to_u16(),
            RecordClass::IN.to_u16(),
            ttl,
            ip.octets().to_vec(),
        )
    }

    pub fn rdlength(&self) -> usize {
        self.rdata.len()
    }

    /// The address carried by an A record
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        if self.rtype != RecordType::A.to_u16() {
            return None;
        }
        let octets: [u8; IPV4_RDATA_LEN] = self.rdata.as_slice().try_into().ok()?;
        Some(Ipv4Addr::from(octets))
    }
}
