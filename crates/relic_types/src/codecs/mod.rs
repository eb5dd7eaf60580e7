//! Compression codecs used by the resource formats.
//!
//! Every codec here is a pure function from bytes to bytes with no shared
//! mutable state; callers may run them in parallel across independent
//! resources. Most are decode-only, since the tools read shipped game
//! data; PackBits and the icns RLE also have encoders because round-trip
//! is an inherent property of those two.
//!
//! | Module | Scheme | Used by |
//! |--------|--------|---------|
//! | [`packbits`] | classic QuickDraw RLE + icns variant | PICT rows, icons |
//! | [`macski`] | RUN4 / COOK / CO2K command-byte schemes | MacSki |
//! | [`dinopark`] | LZSS + RLE with `'LZSS'`/`'RLE '` headers | DinoPark Tycoon |
//! | [`presage`] | LZSS, 12-bit offset / 4-bit count | Presage engine games |
//! | [`soundmusicsys`] | LZSS over a 4096-byte window | SoundMusicSys data |
//! | [`pathways`] | run-length scheme with u32 size header | Pathways Into Darkness |
//! | [`shpd`] | LZSS, offset measured from output end | Lemmings / Prince of Persia |

pub mod dinopark;
pub mod macski;
pub mod packbits;
pub mod pathways;
pub mod presage;
pub mod shpd;
pub mod soundmusicsys;
