//! Parsed view over a raw DNS message.

use super::{
    DEFAULT_NAME_BUDGET, DecodeError, FLAG_AA, FLAG_QR, FLAG_RA, FLAG_RD, HEADER_LEN, MASK_RCODE,
    RCODE_NOERROR, decode_name, read_u16,
};

/// TYPE, CLASS and TTL of a resource record, before RDLENGTH.
const RR_FIXED_LEN: usize = 8;

/// The fixed 12-byte message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub flags: u16,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

impl Header {
    /// Decode the header at the start of `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_LEN {
            return Err(DecodeError::Truncated);
        }

        Ok(Self {
            id: read_u16(buf, 0)?,
            flags: read_u16(buf, 2)?,
            question_count: read_u16(buf, 4)?,
            answer_count: read_u16(buf, 6)?,
            authority_count: read_u16(buf, 8)?,
            additional_count: read_u16(buf, 10)?,
        })
    }

    pub fn response_flag(&self) -> bool {
        self.flags & FLAG_QR != 0
    }

    pub fn response_code(&self) -> u8 {
        (self.flags & MASK_RCODE) as u8
    }

    pub fn authoritative(&self) -> bool {
        self.flags & FLAG_AA != 0
    }

    pub fn recursion_desired(&self) -> bool {
        self.flags & FLAG_RD != 0
    }

    pub fn recursion_available(&self) -> bool {
        self.flags & FLAG_RA != 0
    }
}

/// The single question entry of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: u16,
    pub qclass: u16,
}

/// A parsed DNS message that keeps ownership of its bytes.
///
/// Only messages with RCODE 0 get their question (and, for referrals, the
/// delegated name server) decoded; error responses carry the header alone.
#[derive(Debug, Clone)]
pub struct DnsMessage {
    buf: Vec<u8>,
    header: Header,
    question: Option<Question>,
    authority_offset: Option<usize>,
    delegation: Option<String>,
}

impl DnsMessage {
    /// Parse a raw datagram.
    pub fn parse(buf: Vec<u8>) -> Result<Self, DecodeError> {
        let header = Header::parse(&buf)?;
        let mut message = Self {
            buf,
            header,
            question: None,
            authority_offset: None,
            delegation: None,
        };

        if header.response_code() != RCODE_NOERROR {
            return Ok(message);
        }

        if header.question_count != 1 {
            return Err(DecodeError::UnsupportedQuestionCount(header.question_count));
        }

        let (name, name_end) = decode_name(&message.buf, HEADER_LEN, DEFAULT_NAME_BUDGET)?;
        let qtype = read_u16(&message.buf, name_end)?;
        let qclass = read_u16(&message.buf, name_end + 2)?;

        message.question = Some(Question { name, qtype, qclass });
        message.authority_offset = Some(name_end + 4);

        if header.response_flag() && header.answer_count == 0 && header.authority_count > 0 {
            message.delegation = message.extract_delegation_address()?;
        }

        Ok(message)
    }

    /// Name carried in the first authority record's RDATA.
    ///
    /// `None` when the message has answers, no authority records, or no
    /// decoded question. Assumes the answer section is empty, so the
    /// authority section starts right after the question.
    pub fn extract_delegation_address(&self) -> Result<Option<String>, DecodeError> {
        if self.header.answer_count > 0 || self.header.authority_count == 0 {
            return Ok(None);
        }
        let Some(offset) = self.authority_offset else {
            return Ok(None);
        };

        let (_, owner_end) = decode_name(&self.buf, offset, DEFAULT_NAME_BUDGET)?;
        let rdlength = usize::from(read_u16(&self.buf, owner_end + RR_FIXED_LEN)?);
        let rdata_start = owner_end + RR_FIXED_LEN + 2;
        if rdata_start + rdlength > self.buf.len() {
            return Err(DecodeError::Truncated);
        }

        let (name, _) = decode_name(&self.buf, rdata_start, DEFAULT_NAME_BUDGET)?;

        Ok(Some(name))
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn id(&self) -> u16 {
        self.header.id
    }

    pub fn response_flag(&self) -> bool {
        self.header.response_flag()
    }

    pub fn response_code(&self) -> u8 {
        self.header.response_code()
    }

    pub fn answer_count(&self) -> u16 {
        self.header.answer_count
    }

    pub fn authority_count(&self) -> u16 {
        self.header.authority_count
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn question_name(&self) -> Option<&str> {
        self.question.as_ref().map(|q| q.name.as_str())
    }

    /// Offset where the authority section begins, valid for NOERROR
    /// messages without answers.
    pub fn authority_section_offset(&self) -> Option<usize> {
        self.authority_offset
    }

    /// Delegated server name of a referral response.
    pub fn delegation(&self) -> Option<&str> {
        self.delegation.as_deref()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{encode_name, fixtures};

    #[test]
    fn header_fields_from_crafted_header() {
        let header = [0x12, 0x34, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00];

        let header = Header::parse(&header).unwrap();

        assert_eq!(header.id, 4660);
        assert!(header.response_flag());
        assert_eq!(header.response_code(), RCODE_NOERROR);
        assert_eq!(header.answer_count, 0);
        assert_eq!(header.authority_count, 1);
    }

    #[test]
    fn header_shorter_than_twelve_bytes_is_truncated() {
        assert_eq!(Header::parse(&[0x12, 0x34, 0x80]), Err(DecodeError::Truncated));
        assert_eq!(DnsMessage::parse(vec![0; 11]).unwrap_err(), DecodeError::Truncated);
    }

    #[test]
    fn parse_query() {
        let message = DnsMessage::parse(fixtures::query(0xBEEF, "www.example.com")).unwrap();

        assert_eq!(message.id(), 0xBEEF);
        assert!(!message.response_flag());
        assert!(message.header().recursion_desired());
        assert_eq!(
            message.question(),
            Some(&Question {
                name: "www.example.com".to_string(),
                qtype: 1,
                qclass: 1,
            })
        );
        assert_eq!(message.authority_section_offset(), Some(message.as_bytes().len()));
        assert_eq!(message.delegation(), None);
    }

    #[test]
    fn parse_referral_extracts_nameserver() {
        let query = fixtures::query(7, "example.com");
        let message = DnsMessage::parse(fixtures::delegation(&query, "a.gtld-servers.net")).unwrap();

        assert_eq!(message.answer_count(), 0);
        assert_eq!(message.authority_count(), 1);
        assert_eq!(message.delegation(), Some("a.gtld-servers.net"));
    }

    #[test]
    fn authority_owner_pointer_decodes_to_question_name() {
        let query = fixtures::query(7, "mail.example.org");
        let message = DnsMessage::parse(fixtures::delegation(&query, "ns1.example.org")).unwrap();
        let offset = message.authority_section_offset().unwrap();

        let (owner, next) = decode_name(message.as_bytes(), offset, DEFAULT_NAME_BUDGET).unwrap();

        assert_eq!(Some(owner.as_str()), message.question_name());
        assert_eq!(next, offset + 2);
    }

    #[test]
    fn referral_with_uncompressed_owner() {
        let mut response = fixtures::query(9, "example.com");
        response[2] = 0x80;
        response[9] = 0x01;
        response.extend_from_slice(&encode_name("com").unwrap());
        response.extend_from_slice(&[0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x0E, 0x10]);
        let rdata = encode_name("ns.tld-servers.net").unwrap();
        response.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        response.extend_from_slice(&rdata);

        let message = DnsMessage::parse(response).unwrap();

        assert_eq!(message.delegation(), Some("ns.tld-servers.net"));
    }

    #[test]
    fn answer_has_no_delegation() {
        let query = fixtures::query(1, "example.com");
        let message = DnsMessage::parse(fixtures::answer(&query, [93, 184, 216, 34])).unwrap();

        assert_eq!(message.answer_count(), 1);
        assert!(message.header().authoritative());
        assert_eq!(message.delegation(), None);
        assert_eq!(message.extract_delegation_address(), Ok(None));
    }

    #[test]
    fn error_response_keeps_header_only() {
        let query = fixtures::query(3, "missing.example");
        let message = DnsMessage::parse(fixtures::error_response(&query, 3)).unwrap();

        assert_eq!(message.id(), 3);
        assert!(message.response_flag());
        assert_eq!(message.response_code(), 3);
        assert_eq!(message.question(), None);
        assert_eq!(message.authority_section_offset(), None);
        assert_eq!(message.delegation(), None);
    }

    #[test]
    fn error_response_skips_question_count_check() {
        let mut response = vec![0u8; HEADER_LEN];
        response[2] = 0x80;
        response[3] = 0x02;

        let message = DnsMessage::parse(response).unwrap();

        assert_eq!(message.response_code(), 2);
    }

    #[test]
    fn multiple_questions_are_rejected() {
        let mut query = fixtures::query(1, "example.com");
        query[5] = 2;

        assert_eq!(
            DnsMessage::parse(query).unwrap_err(),
            DecodeError::UnsupportedQuestionCount(2)
        );
    }

    #[test]
    fn question_without_type_and_class_is_truncated() {
        let mut query = fixtures::query(1, "example.com");
        query.truncate(query.len() - 3);

        assert_eq!(DnsMessage::parse(query).unwrap_err(), DecodeError::Truncated);
    }

    #[test]
    fn referral_with_rdata_past_end_is_truncated() {
        let query = fixtures::query(1, "example.com");
        let mut response = fixtures::delegation(&query, "ns.example.com");
        response.truncate(response.len() - 4);

        assert_eq!(DnsMessage::parse(response).unwrap_err(), DecodeError::Truncated);
    }

    #[test]
    fn referral_missing_authority_record_is_truncated() {
        let mut response = fixtures::query(1, "example.com");
        response[2] = 0x80;
        response[9] = 0x01;

        assert_eq!(DnsMessage::parse(response).unwrap_err(), DecodeError::Truncated);
    }

    #[test]
    fn delegation_only_for_responses() {
        let mut query = fixtures::query(1, "example.com");
        query[9] = 0x01;

        let message = DnsMessage::parse(query).unwrap();

        assert_eq!(message.delegation(), None);
    }
}
