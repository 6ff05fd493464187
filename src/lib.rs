//! Pure Rust async implementation of the UT2004 UDP status query protocol
//! (the GameSpy-era `\x80` query served on game port + 1).
pub mod error;
pub mod info;
pub mod packet;
mod parse;
pub mod query;
pub mod table;
