//! Domain name encoding and decompression.

use super::DecodeError;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;
const POINTER_MASK: u8 = 0xC0;

/// Decode a possibly compressed domain name starting at `offset`.
///
/// Returns the dotted name (the root name decodes to an empty string) and
/// the offset of the first byte after the name as it appears at `offset`:
/// past the terminating zero, or past the two pointer bytes when the name
/// ends in a compression pointer.
///
/// Pointers use the standard 14-bit target. A pointer back to a target
/// already visited fails with [`DecodeError::PointerLoop`], and `budget`
/// caps the total number of labels and pointer hops walked.
pub fn decode_name(
    buf: &[u8],
    offset: usize,
    budget: usize,
) -> Result<(String, usize), DecodeError> {
    let mut labels = Vec::new();
    let mut wire_len = 1;
    let mut pos = offset;
    let mut resume = None;
    let mut visited = Vec::new();
    let mut steps = 0;

    loop {
        steps += 1;
        if steps > budget {
            return Err(DecodeError::PointerLoop);
        }

        let len = *buf.get(pos).ok_or(DecodeError::Truncated)?;
        match len & POINTER_MASK {
            0x00 if len == 0 => break,
            0x00 => {
                let start = pos + 1;
                let end = start + len as usize;
                let label = buf.get(start..end).ok_or(DecodeError::Truncated)?;

                wire_len += 1 + label.len();
                if wire_len > MAX_NAME_LEN {
                    return Err(DecodeError::NameTooLong);
                }

                labels.push(String::from_utf8_lossy(label).into_owned());
                pos = end;
            }
            POINTER_MASK => {
                let low = *buf.get(pos + 1).ok_or(DecodeError::Truncated)?;
                if resume.is_none() {
                    resume = Some(pos + 2);
                }
                pos = usize::from(u16::from_be_bytes([len & !POINTER_MASK, low]));
                if visited.contains(&pos) {
                    return Err(DecodeError::PointerLoop);
                }
                visited.push(pos);
            }
            _ => return Err(DecodeError::BadLabel(len)),
        }
    }

    Ok((labels.join("."), resume.unwrap_or(pos + 1)))
}

/// Encode a dotted name as uncompressed wire labels.
///
/// A single trailing dot is accepted; `""` and `"."` encode the root name.
pub fn encode_name(name: &str) -> Result<Vec<u8>, DecodeError> {
    let name = name.strip_suffix('.').unwrap_or(name);
    let mut buf = Vec::with_capacity(name.len() + 2);

    if !name.is_empty() {
        for label in name.split('.') {
            if label.is_empty() {
                return Err(DecodeError::EmptyLabel);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DecodeError::LabelTooLong);
            }
            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
    }
    buf.push(0);

    if buf.len() > MAX_NAME_LEN {
        return Err(DecodeError::NameTooLong);
    }

    Ok(buf)
}
