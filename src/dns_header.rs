use bytes::BufMut;

use crate::error::{DnsError, Result};

/// Size of the fixed message header
pub const HEADER_SIZE: usize = 12;

/// The 12-byte header that opens every DNS message.
/// `flags` holds the flags word already converted from network order;
/// use the accessors or [`DnsFlags`] to read its sub-fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnsHeader {
    pub id: u16,
    pub flags: u16,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnsFlags {
    pub qr: bool,              // Query/Response (false = query, true = response)
    pub opcode: u8,            // Operation code (0 = standard query)
    pub aa: bool,              // Authoritative Answer
    pub tc: bool,              // Truncation
    pub rd: bool,              // Recursion Desired
    pub ra: bool,              // Recursion Available
    pub z: u8,                 // Reserved (must be 0)
    pub rcode: u8,             // Response code (0 = no error, 1 = format error, etc.)
}

const QR_BIT: u16 = 1 << 15;
const OPCODE_SHIFT: u16 = 11;
const AA_BIT: u16 = 1 << 10;
const TC_BIT: u16 = 1 << 9;
const RD_BIT: u16 = 1 << 8;
const RA_BIT: u16 = 1 << 7;
const Z_SHIFT: u16 = 4;

impl DnsFlags {
    pub fn to_u16(&self) -> u16 {
        let mut flags: u16 = 0;

        if self.qr { flags |= QR_BIT; }                          // QR at bit 15
        flags |= (self.opcode as u16 & 0xF) << OPCODE_SHIFT;     // OPCODE at bits 11-14
        if self.aa { flags |= AA_BIT; }                          // AA at bit 10
        if self.tc { flags |= TC_BIT; }                          // TC at bit 9
        if self.rd { flags |= RD_BIT; }                          // RD at bit 8
        if self.ra { flags |= RA_BIT; }                          // RA at bit 7
        flags |= (self.z as u16 & 0x7) << Z_SHIFT;               // Z at bits 4-6 (reserved)
        flags |= self.rcode as u16 & 0xF;                        // RCODE at bits 0-3

        flags
    }

    pub fn from_u16(flags: u16) -> Self {
        DnsFlags {
            qr: flags & QR_BIT != 0,
            opcode: ((flags >> OPCODE_SHIFT) & 0xF) as u8,
            aa: flags & AA_BIT != 0,
            tc: flags & TC_BIT != 0,
            rd: flags & RD_BIT != 0,
            ra: flags & RA_BIT != 0,
            z: ((flags >> Z_SHIFT) & 0x7) as u8,
            rcode: (flags & 0xF) as u8,
        }
    }
}

impl DnsHeader {
    /// Header for a standard recursive query carrying a single question
    pub fn query(id: u16) -> Self {
        let flags = DnsFlags {
            rd: true,
            ..DnsFlags::default()
        };

        DnsHeader {
            id,
            flags: flags.to_u16(),
            question_count: 1,
            answer_count: 0,
            authority_count: 0,
            additional_count: 0,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(DnsError::malformed(
                bytes.len(),
                format!("header needs {} bytes, got {}", HEADER_SIZE, bytes.len()),
            ));
        }

        let field = |i: usize| u16::from_be_bytes([bytes[i], bytes[i + 1]]);

        Ok(DnsHeader {
            id: field(0),
            flags: field(2),
            question_count: field(4),
            answer_count: field(6),
            authority_count: field(8),
            additional_count: field(10),
        })
    }

    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16(self.id);
        buf.put_u16(self.flags);
        buf.put_u16(self.question_count);
        buf.put_u16(self.answer_count);
        buf.put_u16(self.authority_count);
        buf.put_u16(self.additional_count);
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        self.write_to(&mut &mut bytes[..]);
        bytes
    }

    pub fn flags(&self) -> DnsFlags {
        DnsFlags::from_u16(self.flags)
    }

    pub fn set_flags(&mut self, flags: DnsFlags) {
        self.flags = flags.to_u16();
    }

    pub fn is_response(&self) -> bool {
        self.flags & QR_BIT != 0
    }

    pub fn opcode(&self) -> u8 {
        ((self.flags >> OPCODE_SHIFT) & 0xF) as u8
    }

    pub fn is_authoritative(&self) -> bool {
        self.flags & AA_BIT != 0
    }

    pub fn is_truncated(&self) -> bool {
        self.flags & TC_BIT != 0
    }

    pub fn recursion_desired(&self) -> bool {
        self.flags & RD_BIT != 0
    }

    pub fn recursion_available(&self) -> bool {
        self.flags & RA_BIT != 0
    }

    pub fn reserved(&self) -> u8 {
        ((self.flags >> Z_SHIFT) & 0x7) as u8
    }

    pub fn rcode(&self) -> u8 {
        (self.flags & 0xF) as u8
    }
}
