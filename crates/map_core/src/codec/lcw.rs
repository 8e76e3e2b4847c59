//! LCW ("format 80") compression.
//!
//! The command stream mixes literal runs with copies out of the bytes
//! already produced. Offsets are absolute positions in the output except
//! for the short relative copy.
//!
//! | Command | Bytes | Meaning |
//! |---|---|---|
//! | `0ccc pppp` `pppppppp` | 2 | copy `c + 3` bytes from `p` back |
//! | `10cc cccc` | 1 + n | `c` literal bytes follow; `0x80` ends the stream |
//! | `11cc cccc` `pppp` | 3 | copy `c + 3` bytes from offset `p` |
//! | `0xFE` `nnnn` `v` | 4 | fill `n` bytes with `v` |
//! | `0xFF` `nnnn` `pppp` | 5 | copy `n` bytes from offset `p` |
//!
//! Multi-byte fields are little-endian.

use crate::error::{MapError, Result};

const END: u8 = 0x80;
const FILL: u8 = 0xFE;
const LONG_COPY: u8 = 0xFF;
const MAX_LITERALS: usize = 0x3F;
const MAX_RELATIVE_LEN: usize = 10;
const MAX_RELATIVE_DISTANCE: usize = 0xFFF;
const MAX_SHORT_LEN: usize = 64;
const MAX_LONG_LEN: usize = u16::MAX as usize;
const MIN_MATCH: usize = 3;

const HASH_BITS: u32 = 12;
const CHAIN_DEPTH: usize = 64;

fn hash3(data: &[u8], pos: usize) -> usize {
    let key = u32::from(data[pos]) | (u32::from(data[pos + 1]) << 8) | (u32::from(data[pos + 2]) << 16);
    (key.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
}

/// Greedy match finder over hash chains of 3-byte prefixes.
struct Matcher {
    head: Vec<Option<usize>>,
    prev: Vec<Option<usize>>,
}

impl Matcher {
    fn new(len: usize) -> Self {
        Self {
            head: vec![None; 1 << HASH_BITS],
            prev: vec![None; len],
        }
    }

    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH <= data.len() {
            let hash = hash3(data, pos);
            self.prev[pos] = self.head[hash];
            self.head[hash] = Some(pos);
        }
    }

    /// Longest earlier match for `pos` as `(offset, len)`.
    fn longest(&self, data: &[u8], pos: usize) -> Option<(usize, usize)> {
        if pos + MIN_MATCH > data.len() {
            return None;
        }
        let limit = (data.len() - pos).min(MAX_LONG_LEN);
        let mut best: Option<(usize, usize)> = None;
        let mut candidate = self.head[hash3(data, pos)];
        for _ in 0..CHAIN_DEPTH {
            let Some(start) = candidate else { break };
            // Overlapping copies are fine: the decoder copies byte by byte.
            let len = (0..limit).take_while(|&i| data[start + i] == data[pos + i]).count();
            if len >= MIN_MATCH && best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((start, len));
            }
            candidate = self.prev[start];
        }
        best
    }
}

fn run_length(data: &[u8], pos: usize) -> usize {
    let value = data[pos];
    data[pos..]
        .iter()
        .take(MAX_LONG_LEN)
        .take_while(|&&b| b == value)
        .count()
}

#[allow(clippy::cast_possible_truncation)] // chunks hold at most MAX_LITERALS bytes
fn flush_literals(out: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(MAX_LITERALS) {
        out.push(END | chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
}

#[allow(clippy::cast_possible_truncation)] // len and offset are capped at u16::MAX by the caller
fn push_copy(out: &mut Vec<u8>, pos: usize, offset: usize, len: usize) {
    let back = pos - offset;
    if len <= MAX_RELATIVE_LEN && back <= MAX_RELATIVE_DISTANCE {
        out.push((((len - MIN_MATCH) as u8) << 4) | (back >> 8) as u8);
        out.push((back & 0xFF) as u8);
    } else if len <= MAX_SHORT_LEN {
        out.push(0xC0 | (len - MIN_MATCH) as u8);
        out.extend_from_slice(&(offset as u16).to_le_bytes());
    } else {
        out.push(LONG_COPY);
        out.extend_from_slice(&(len as u16).to_le_bytes());
        out.extend_from_slice(&(offset as u16).to_le_bytes());
    }
}

/// Compress `data`. Inputs longer than 64 KiB cannot address their tail
/// with absolute offsets, so callers should frame data in blocks.
#[must_use]
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2 + 16);
    let mut matcher = Matcher::new(data.len());
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < data.len() {
        let run = run_length(data, pos);
        let found = matcher.longest(data, pos);
        let advance = match found {
            Some((_, len)) if len >= run || run <= 4 => len,
            _ if run > 4 => run,
            _ => 0,
        };

        if advance == 0 || pos > u16::MAX as usize {
            matcher.insert(data, pos);
            pos += 1;
            continue;
        }

        flush_literals(&mut out, &data[literal_start..pos]);
        match found {
            Some((offset, len)) if len == advance => push_copy(&mut out, pos, offset, len),
            _ => {
                #[allow(clippy::cast_possible_truncation)] // runs stop at MAX_LONG_LEN
                let run = advance as u16;
                out.push(FILL);
                out.extend_from_slice(&run.to_le_bytes());
                out.push(data[pos]);
            }
        }
        for p in pos..pos + advance {
            matcher.insert(data, p);
        }
        pos += advance;
        literal_start = pos;
    }

    flush_literals(&mut out, &data[literal_start..]);
    out.push(END);
    out
}

struct Cursor<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn byte(&mut self) -> Result<u8> {
        let value = *self
            .src
            .get(self.pos)
            .ok_or_else(|| MapError::CorruptBlock(format!("command stream ends at byte {}", self.pos)))?;
        self.pos += 1;
        Ok(value)
    }

    fn word(&mut self) -> Result<usize> {
        let lo = self.byte()?;
        let hi = self.byte()?;
        Ok(usize::from(u16::from_le_bytes([lo, hi])))
    }
}

fn copy_within(out: &mut Vec<u8>, from: usize, len: usize) -> Result<()> {
    if from >= out.len() {
        return Err(MapError::CorruptBlock(format!(
            "copy source {from} beyond {} decoded bytes",
            out.len()
        )));
    }
    for i in 0..len {
        let byte = out[from + i];
        out.push(byte);
    }
    Ok(())
}

fn ensure_room(out: &[u8], len: usize, expected_len: usize) -> Result<()> {
    if out.len() + len > expected_len {
        return Err(MapError::CorruptBlock(format!(
            "command of {len} bytes at {} overruns {expected_len}",
            out.len()
        )));
    }
    Ok(())
}

/// Decompress a command stream that must expand to exactly `expected_len` bytes.
pub fn decompress(src: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut cursor = Cursor { src, pos: 0 };

    loop {
        if cursor.pos >= src.len() && out.len() == expected_len {
            break;
        }
        let command = cursor.byte()?;
        match command {
            END => break,
            FILL => {
                let len = cursor.word()?;
                let value = cursor.byte()?;
                ensure_room(&out, len, expected_len)?;
                out.resize(out.len() + len, value);
            }
            LONG_COPY => {
                let len = cursor.word()?;
                let offset = cursor.word()?;
                ensure_room(&out, len, expected_len)?;
                copy_within(&mut out, offset, len)?;
            }
            c if c & 0xC0 == 0xC0 => {
                let len = usize::from(c & 0x3F) + MIN_MATCH;
                let offset = cursor.word()?;
                ensure_room(&out, len, expected_len)?;
                copy_within(&mut out, offset, len)?;
            }
            c if c & 0x80 != 0 => {
                let len = usize::from(c & 0x3F);
                let end = cursor.pos + len;
                let literals = src.get(cursor.pos..end).ok_or_else(|| {
                    MapError::CorruptBlock(format!("literal run of {len} past end of stream"))
                })?;
                ensure_room(&out, len, expected_len)?;
                out.extend_from_slice(literals);
                cursor.pos = end;
            }
            c => {
                let len = usize::from(c >> 4) + MIN_MATCH;
                let back = (usize::from(c & 0x0F) << 8) | usize::from(cursor.byte()?);
                if back == 0 || back > out.len() {
                    return Err(MapError::CorruptBlock(format!(
                        "relative copy {back} back from {}",
                        out.len()
                    )));
                }
                let from = out.len() - back;
                ensure_room(&out, len, expected_len)?;
                copy_within(&mut out, from, len)?;
            }
        }
    }

    if out.len() != expected_len {
        return Err(MapError::CorruptBlock(format!(
            "expanded to {} bytes, expected {expected_len}",
            out.len()
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty() {
        let packed = compress(&[]);
        assert_eq!(packed, vec![END]);
        assert!(decompress(&packed, 0).unwrap().is_empty());
    }

    #[test]
    fn test_literals_only() {
        let data = b"abcdefg";
        let packed = compress(data);
        assert_eq!(packed[0], 0x87);
        assert_eq!(decompress(&packed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_long_run_uses_fill() {
        let data = vec![0xFF; 4096];
        let packed = compress(&data);
        assert!(packed.len() < 16);
        assert_eq!(decompress(&packed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_hand_written_stream() {
        // "ab", relative copy 4 from 2 back, fill 3 x 'z', absolute copy 3 from 0.
        let stream = [0x82, b'a', b'b', 0x10, 0x02, FILL, 3, 0, b'z', 0xC0, 0, 0, END];
        assert_eq!(decompress(&stream, 12).unwrap(), b"abababzzzaba");
    }

    #[test]
    fn test_bad_streams_rejected() {
        assert!(matches!(decompress(&[0x85, 1, 2], 5), Err(MapError::CorruptBlock(_))));
        assert!(matches!(decompress(&[0x00, 0x05, END], 3), Err(MapError::CorruptBlock(_))));
        assert!(matches!(decompress(&[0x81, 7, END], 2), Err(MapError::CorruptBlock(_))));
        // A stream may stop without the end marker once it is complete.
        assert_eq!(decompress(&[0x81, 7], 1).unwrap(), vec![7]);
    }

    #[test]
    fn test_oversized_fill_rejected_before_expanding() {
        let stream: Vec<u8> = std::iter::repeat([FILL, 0xFF, 0xFF, 0]).take(4000).flatten().collect();
        match decompress(&stream, 8192) {
            Err(MapError::CorruptBlock(message)) => assert!(message.contains("at 0 overruns 8192"), "{message}"),
            other => panic!("expected an overrun, got {other:?}"),
        }
    }

    #[test]
    fn test_commands_past_expected_len_rejected() {
        // Literals, then each copy kind, one byte past the expected length.
        assert!(matches!(decompress(&[0x83, 1, 2, 3, END], 2), Err(MapError::CorruptBlock(_))));
        assert!(matches!(decompress(&[0x82, 1, 2, 0x00, 0x02, END], 4), Err(MapError::CorruptBlock(_))));
        assert!(matches!(decompress(&[0x82, 1, 2, 0xC0, 0, 0, END], 4), Err(MapError::CorruptBlock(_))));
        assert!(matches!(
            decompress(&[0x82, 1, 2, LONG_COPY, 3, 0, 0, 0, END], 4),
            Err(MapError::CorruptBlock(_))
        ));
    }

    #[test]
    fn test_template_like_data() {
        let mut data = Vec::new();
        for i in 0..2048u16 {
            let template: u16 = if i % 37 < 30 { 0xFFFF } else { i % 5 };
            data.extend_from_slice(&template.to_le_bytes());
        }
        let packed = compress(&data);
        assert!(packed.len() < data.len());
        assert_eq!(decompress(&packed, data.len()).unwrap(), data);
    }

    proptest! {
        #[test]
        fn prop_compress_round_trip(data in proptest::collection::vec(0u8..4, 0..3000)) {
            let packed = compress(&data);
            prop_assert_eq!(decompress(&packed, data.len()).unwrap(), data);
        }
    }
}
