//! Wire-format message builders shared by unit tests.

use super::encode_name;

/// A standard recursive query for `domain` (type A, class IN).
pub(crate) fn query(id: u16, domain: &str) -> Vec<u8> {
    let mut packet = Vec::with_capacity(512);

    packet.extend_from_slice(&id.to_be_bytes());
    packet.extend_from_slice(&[0x01, 0x00]); // Flags: RD
    packet.extend_from_slice(&[0x00, 0x01]); // Questions: 1
    packet.extend_from_slice(&[0x00, 0x00]); // Answer RRs: 0
    packet.extend_from_slice(&[0x00, 0x00]); // Authority RRs: 0
    packet.extend_from_slice(&[0x00, 0x00]); // Additional RRs: 0
    packet.extend_from_slice(&encode_name(domain).unwrap());
    packet.extend_from_slice(&[0x00, 0x01]); // Type: A
    packet.extend_from_slice(&[0x00, 0x01]); // Class: IN

    packet
}

/// A referral: no answers, one NS record whose owner points at the question.
pub(crate) fn delegation(query: &[u8], nameserver: &str) -> Vec<u8> {
    let mut response = query.to_vec();
    response[2] = 0x80 | (query[2] & 0x01); // QR, keep RD
    response[3] = 0x00;
    response[8] = 0x00; // Authority RRs: 1
    response[9] = 0x01;

    let rdata = encode_name(nameserver).unwrap();
    response.extend_from_slice(&[0xC0, 0x0C]); // Owner: pointer to question
    response.extend_from_slice(&[0x00, 0x02]); // Type: NS
    response.extend_from_slice(&[0x00, 0x01]); // Class: IN
    response.extend_from_slice(&[0x00, 0x02, 0xA3, 0x00]); // TTL: 172800
    response.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    response.extend_from_slice(&rdata);

    response
}

/// An authoritative answer with a single A record.
pub(crate) fn answer(query: &[u8], addr: [u8; 4]) -> Vec<u8> {
    let mut response = query.to_vec();
    response[2] = 0x84 | (query[2] & 0x01); // QR, AA, keep RD
    response[3] = 0x00;
    response[6] = 0x00; // Answer RRs: 1
    response[7] = 0x01;

    response.extend_from_slice(&[0xC0, 0x0C]);
    response.extend_from_slice(&[0x00, 0x01]); // Type: A
    response.extend_from_slice(&[0x00, 0x01]); // Class: IN
    response.extend_from_slice(&[0x00, 0x00, 0x01, 0x2C]); // TTL: 300
    response.extend_from_slice(&[0x00, 0x04]);
    response.extend_from_slice(&addr);

    response
}

/// A header-only error response with the given RCODE.
pub(crate) fn error_response(query: &[u8], rcode: u8) -> Vec<u8> {
    let mut response = query.to_vec();
    response[2] = 0x80 | (query[2] & 0x01);
    response[3] = rcode & 0x0F;

    response
}
