//! Block framing for compressed map payloads.
//!
//! Data is cut into blocks of at most [`BLOCK_SIZE`] bytes. Each block is
//! LCW-compressed and written behind a four-byte header:
//! `[u16 compressed_len][u16 uncompressed_len]`, both little-endian.

use std::io::{self, Read, Write};

use super::lcw;
use crate::error::{MapError, Result};

/// Largest uncompressed block.
pub const BLOCK_SIZE: usize = 8192;

const HEADER_LEN: usize = 4;

/// Compressing writer. Call [`BlockWriter::finish`] to emit the final partial block.
#[derive(Debug)]
pub struct BlockWriter<W: Write> {
    inner: W,
    pending: Vec<u8>,
    written: usize,
}

impl<W: Write> BlockWriter<W> {
    /// Wrap a sink.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(BLOCK_SIZE),
            written: 0,
        }
    }

    /// Bytes emitted to the sink so far, headers included.
    #[must_use]
    pub const fn bytes_written(&self) -> usize {
        self.written
    }

    fn emit_block(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let packed = lcw::compress(&self.pending);
        let compressed = u16::try_from(packed.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "compressed block exceeds 64 KiB"))?;
        let uncompressed = u16::try_from(self.pending.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "block exceeds 64 KiB"))?;
        self.inner.write_all(&compressed.to_le_bytes())?;
        self.inner.write_all(&uncompressed.to_le_bytes())?;
        self.inner.write_all(&packed)?;
        self.written += HEADER_LEN + packed.len();
        self.pending.clear();
        Ok(())
    }

    /// Flush the last block and return the sink with the total bytes written.
    pub fn finish(mut self) -> Result<(W, usize)> {
        self.emit_block()?;
        self.inner.flush()?;
        Ok((self.inner, self.written))
    }
}

impl<W: Write> Write for BlockWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = BLOCK_SIZE - self.pending.len();
        let take = room.min(buf.len());
        self.pending.extend_from_slice(&buf[..take]);
        if self.pending.len() == BLOCK_SIZE {
            self.emit_block()?;
        }
        Ok(take)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Decompressing reader over a block-framed stream.
#[derive(Debug)]
pub struct BlockReader<R: Read> {
    inner: R,
    block: Vec<u8>,
    offset: usize,
}

impl<R: Read> BlockReader<R> {
    /// Wrap a source.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            block: Vec::new(),
            offset: 0,
        }
    }

    /// Decode the next block, or `None` at a clean end of stream.
    pub fn next_block(&mut self) -> Result<Option<Vec<u8>>> {
        let mut header = [0u8; HEADER_LEN];
        let got = read_up_to(&mut self.inner, &mut header)?;
        if got == 0 {
            return Ok(None);
        }
        if got < HEADER_LEN {
            return Err(MapError::Truncated {
                expected: HEADER_LEN,
                actual: got,
            });
        }

        let compressed = usize::from(u16::from_le_bytes([header[0], header[1]]));
        let uncompressed = usize::from(u16::from_le_bytes([header[2], header[3]]));
        if uncompressed > BLOCK_SIZE {
            return Err(MapError::CorruptBlock(format!(
                "block claims {uncompressed} bytes, limit is {BLOCK_SIZE}"
            )));
        }

        let mut packed = vec![0u8; compressed];
        let got = read_up_to(&mut self.inner, &mut packed)?;
        if got < compressed {
            return Err(MapError::Truncated {
                expected: compressed,
                actual: got,
            });
        }
        lcw::decompress(&packed, uncompressed).map(Some)
    }

    /// Decode blocks until `len` bytes are available or the stream ends.
    ///
    /// Fails with [`MapError::Truncated`] when the stream is shorter.
    pub fn read_payload(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut payload = Vec::with_capacity(len);
        payload.extend_from_slice(&self.block[self.offset..]);
        self.block.clear();
        self.offset = 0;

        while payload.len() < len {
            match self.next_block()? {
                Some(block) => payload.extend_from_slice(&block),
                None => {
                    return Err(MapError::Truncated {
                        expected: len,
                        actual: payload.len(),
                    })
                }
            }
        }

        if payload.len() > len {
            self.block = payload.split_off(len);
        }
        Ok(payload)
    }
}

impl<R: Read> Read for BlockReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.offset >= self.block.len() {
            match self.next_block() {
                Ok(Some(block)) => {
                    self.block = block;
                    self.offset = 0;
                }
                Ok(None) => return Ok(0),
                Err(MapError::Io(e)) => return Err(e),
                Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
            }
        }
        let available = &self.block[self.offset..];
        let take = available.len().min(buf.len());
        buf[..take].copy_from_slice(&available[..take]);
        self.offset += take;
        Ok(take)
    }
}

/// Fill as much of `buf` as the source provides before EOF.
fn read_up_to(source: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
