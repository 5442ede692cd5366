//! Header flag rewriting on raw message bytes.

use super::{FLAG_AA, FLAG_QR, FLAG_RA, FLAG_RD, RCODE_BLOCKED, SENTINEL};

/// Flags word of every locally refused response (`0x81 0x83`).
const BLOCKED_FLAGS: u16 = FLAG_QR | FLAG_RD | FLAG_RA | RCODE_BLOCKED as u16;

/// Build the local refusal for a blocklisted query.
///
/// The ID and question section are kept as sent by the client. The flags
/// word is overwritten with a fixed pattern: QR=1, Opcode=0, AA=0, TC=0,
/// RD=1, RA=1, Z=0 and the blocked RCODE. No records are appended.
pub fn build_blocked_response(query: &[u8]) -> Vec<u8> {
    let mut response = query.to_vec();
    if flags_word(&response).is_some() {
        write_flags(&mut response, BLOCKED_FLAGS);
    }

    response
}

/// Present an upstream response as coming from a recursive resolver.
///
/// Clears AA and sets RA; every other byte is left as received. Applying it
/// twice gives the same bytes as applying it once.
pub fn finalize_upstream_response(response: &[u8]) -> Vec<u8> {
    let mut response = response.to_vec();
    if let Some(flags) = flags_word(&response) {
        write_flags(&mut response, (flags & !FLAG_AA) | FLAG_RA);
    }

    response
}

/// Strip trailing [`SENTINEL`] padding from a pre-filled receive buffer.
pub fn trim_padding(buf: &[u8]) -> &[u8] {
    let end = buf
        .iter()
        .rposition(|&b| b != SENTINEL)
        .map_or(0, |pos| pos + 1);

    &buf[..end]
}

fn flags_word(buf: &[u8]) -> Option<u16> {
    super::read_flags(buf).ok()
}

fn write_flags(buf: &mut [u8], flags: u16) {
    buf[2..4].copy_from_slice(&flags.to_be_bytes());
}
