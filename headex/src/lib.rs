//! Extract player head texture profiles from *Minecraft: Java Edition*
//! worlds.
//!
//! Player heads carry their skin as a base64-encoded JSON blob ("profile")
//! buried in the world's NBT data. This crate digs those profiles out of
//! region files, entity files, player data, and data packs.
//!
//! * For the region container format, see [`Region`].
//! * For the NBT tree and decoder, see [`nbt`].
//! * For the whole-world extraction entry point, see [`extract_heads`].
//!
//! ```no_run
//! use std::path::PathBuf;
//! use headex::{extract_heads, Options};
//!
//! let worlds = vec![PathBuf::from("saves/my-world")];
//! let heads = extract_heads(&worlds, &Options::default()).unwrap();
//! for head in heads {
//!     println!("{}", head);
//! }
//! ```

pub mod nbt;
pub mod scan;
pub mod validate;

mod extract;
mod region;

pub use extract::*;
pub use region::*;

#[cfg(test)]
mod test;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// Chunk coordinates outside of the 32x32 region area.
    InvalidOffset(isize, isize),
    /// Chunk header present but malformed, eg an unknown compression scheme.
    InvalidChunkMeta,
    InsufficientData,
    /// A tag type id that is not part of the NBT format.
    InvalidTag(u8),
    /// A list or array with a negative length, or a non-empty list of End
    /// tags.
    InvalidListTag,
    /// NBT string data that was not valid modified UTF-8.
    NonunicodeString,
    /// Tag tree nesting beyond the depth the decoder is willing to follow.
    DepthLimit,
    /// The worker pool could not be constructed.
    ThreadPool(rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => f.write_fmt(format_args!("io error: {}", e)),
            Error::InvalidOffset(x, z) => {
                f.write_fmt(format_args!("invalid offset: x = {}, z = {}", x, z))
            }
            Error::InvalidChunkMeta => {
                f.write_str("compression scheme was not recognised for chunk")
            }
            Error::InsufficientData => f.write_str("insufficient data to parse chunk metadata"),
            Error::InvalidTag(t) => f.write_fmt(format_args!("invalid nbt tag value: {}", t)),
            Error::InvalidListTag => f.write_str("invalid nbt list"),
            Error::NonunicodeString => f.write_str("invalid nbt string: not modified utf-8"),
            Error::DepthLimit => f.write_str("nbt nested too deeply"),
            Error::ThreadPool(e) => f.write_fmt(format_args!("could not build pool: {}", e)),
        }
    }
}

impl std::error::Error for Error {}
