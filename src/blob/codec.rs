//! Field-element packing.
//!
//! Both the KZG blob layout and the dispersal service expect data as a
//! sequence of 32-byte symbols that are valid BLS12-381 scalars. Prefixing
//! every 31-byte chunk with a zero byte keeps each symbol below the field
//! modulus without inspecting the payload.

/// Bytes of a single encoded symbol.
pub const BYTES_PER_SYMBOL: usize = 32;

/// Payload bytes carried by one symbol (the high byte is always zero).
pub const PAYLOAD_BYTES_PER_SYMBOL: usize = BYTES_PER_SYMBOL - 1;

/// Insert a zero byte in front of every 31-byte chunk.
///
/// The last chunk is not padded out to 31 bytes; callers that need a fixed
/// layout pad the input first.
pub fn pad_empty_byte(data: &[u8]) -> Vec<u8> {
    let symbols = data.len().div_ceil(PAYLOAD_BYTES_PER_SYMBOL);
    let mut out = Vec::with_capacity(symbols * BYTES_PER_SYMBOL);

    for chunk in data.chunks(PAYLOAD_BYTES_PER_SYMBOL) {
        out.push(0);
        out.extend_from_slice(chunk);
    }

    out
}

/// Strip the zero byte from the front of every 32-byte symbol.
pub fn remove_empty_byte(encoded: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded.len());

    for symbol in encoded.chunks(BYTES_PER_SYMBOL) {
        if symbol.len() > 1 {
            out.extend_from_slice(&symbol[1..]);
        }
    }

    out
}

/// Number of encoded bytes needed for `len` payload bytes.
pub fn encoded_len(len: usize) -> usize {
    let full = len / PAYLOAD_BYTES_PER_SYMBOL;
    let rest = len % PAYLOAD_BYTES_PER_SYMBOL;
    full * BYTES_PER_SYMBOL + if rest > 0 { rest + 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_symbol_has_zero_high_byte() {
        let data: Vec<u8> = (0..100u8).map(|b| b | 0x80).collect();
        let encoded = pad_empty_byte(&data);

        for symbol in encoded.chunks(BYTES_PER_SYMBOL) {
            assert_eq!(symbol[0], 0);
        }
        assert_eq!(encoded.len(), encoded_len(data.len()));
    }

    #[test]
    fn test_partial_last_chunk() {
        let data = vec![0xff; 40];
        let encoded = pad_empty_byte(&data);
        // 31 bytes + marker, then 9 bytes + marker
        assert_eq!(encoded.len(), 42);
        assert_eq!(encoded[32], 0);
        assert_eq!(remove_empty_byte(&encoded), data);
    }

    #[test]
    fn test_empty_input() {
        assert!(pad_empty_byte(&[]).is_empty());
        assert!(remove_empty_byte(&[]).is_empty());
        assert_eq!(encoded_len(0), 0);
    }
}
