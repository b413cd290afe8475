use std::convert::TryFrom;
use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use log::warn;
use num_enum::TryFromPrimitive;

use crate::{Error, Result};

/// the size in bytes of a 'sector' in a region file. Sectors are Minecraft's
/// size unit for chunks: offsets in the chunk directory are counted in whole
/// sectors, so chunk data always starts on a 4096-byte boundary.
pub const SECTOR_SIZE: usize = 4096;

/// size of the header for each chunk in the region file. This header
/// proceeds the compressed chunk data.
pub(crate) const CHUNK_HEADER_SIZE: usize = 5;

/// A Minecraft region file over a seekable stream, eg a file or an mmap in a
/// cursor.
///
/// A region packs up to 1024 chunks of a 32x32 chunk area, with a directory
/// of 4-byte location words at the start of the file. Only the sectors of
/// chunks that are actually present are ever read.
pub struct Region<S> {
    stream: S,
}

impl<S> Region<S>
where
    S: Read + Seek,
{
    /// Create a region from an existing stream. A seek of zero is assumed to
    /// be the start of the region. No chunk data is read until asked for.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Return the inner stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Read and decompress the chunk at the chunk coordinates x, z. These
    /// should both be 0..32. Returns `Ok(None)` if the chunk is not present
    /// in this region. The data returned is uncompressed NBT.
    pub fn read_chunk(&mut self, x: usize, z: usize) -> Result<Option<Vec<u8>>> {
        match self.location(x, z)? {
            Some(loc) => self.read_chunk_at(&loc).map(Some),
            None => Ok(None),
        }
    }

    /// Run `f` over the uncompressed NBT of every chunk present in this
    /// region. A chunk that fails to read or decompress is logged and
    /// skipped. An unreadable chunk directory fails the whole region.
    pub fn for_each_chunk<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(usize, usize, &[u8]),
    {
        for z in 0..32 {
            for x in 0..32 {
                let loc = match self.location(x, z)? {
                    Some(loc) => loc,
                    None => continue, // chunk is not present
                };

                match self.read_chunk_at(&loc) {
                    Ok(data) => f(x, z, &data),
                    Err(e) => warn!("skipping chunk ({}, {}): {}", x, z, e),
                }
            }
        }

        Ok(())
    }

    /// Read the location word for the chunk at x, z. `None` means the chunk
    /// is not present. Offsets are in units of whole sectors.
    pub fn location(&mut self, x: usize, z: usize) -> Result<Option<ChunkLocation>> {
        if x >= 32 || z >= 32 {
            return Err(Error::InvalidOffset(x as isize, z as isize));
        }

        self.stream.seek(SeekFrom::Start(header_pos(x, z)))?;

        let mut buf = [0u8; 4];
        self.stream.read_exact(&mut buf[..])?;

        let mut offset = 0u64;
        offset |= (buf[0] as u64) << 16;
        offset |= (buf[1] as u64) << 8;
        offset |= buf[2] as u64;
        let sectors = buf[3] as u64;

        if offset == 0 && sectors == 0 {
            Ok(None)
        } else {
            Ok(Some(ChunkLocation { offset, sectors }))
        }
    }

    fn read_chunk_at(&mut self, loc: &ChunkLocation) -> Result<Vec<u8>> {
        self.stream
            .seek(SeekFrom::Start(loc.offset * SECTOR_SIZE as u64))?;

        let mut buf = [0u8; CHUNK_HEADER_SIZE];
        self.stream.read_exact(&mut buf)?;
        let meta = ChunkMeta::new(&buf)?;

        let mut compressed = (&mut self.stream).take(meta.compressed_len as u64);

        match meta.compression_scheme {
            CompressionScheme::Gzip => {
                let mut decoder = flate2::write::GzDecoder::new(vec![]);
                io::copy(&mut compressed, &mut decoder)?;
                Ok(decoder.finish()?)
            }
            CompressionScheme::Zlib => {
                let mut decoder = flate2::write::ZlibDecoder::new(vec![]);
                io::copy(&mut compressed, &mut decoder)?;
                Ok(decoder.finish()?)
            }
            CompressionScheme::Uncompressed => {
                let mut buf = vec![];
                compressed.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

/// Various compression schemes that chunk NBT data is compressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum CompressionScheme {
    Gzip = 1,
    Zlib = 2,
    Uncompressed = 3,
}

fn header_pos(x: usize, z: usize) -> u64 {
    (4 * ((x % 32) + (z % 32) * 32)) as u64
}

#[derive(Debug)]
pub struct ChunkLocation {
    /// The offset, in units of 4kiB sectors, into the region file this chunk
    /// is located at. Offset 0 is the start of the file.
    pub offset: u64,

    /// The number of 4kiB sectors that this chunk occupies in the region file.
    pub sectors: u64,
}

/// Encodes how the chunk's NBT data is compressed.
#[derive(Debug)]
struct ChunkMeta {
    compressed_len: u32,
    compression_scheme: CompressionScheme,
}

impl ChunkMeta {
    fn new(data: &[u8]) -> Result<Self> {
        if data.len() < CHUNK_HEADER_SIZE {
            return Err(Error::InsufficientData);
        }

        let mut buf = &data[..CHUNK_HEADER_SIZE];
        let len = buf.read_u32::<BigEndian>()?;
        let scheme = buf.read_u8()?;
        let scheme = CompressionScheme::try_from(scheme).map_err(|_| Error::InvalidChunkMeta)?;

        if len == 0 {
            return Err(Error::InsufficientData);
        }

        Ok(Self {
            compressed_len: len - 1, // this len includes the compression byte.
            compression_scheme: scheme,
        })
    }
}
