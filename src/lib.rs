// lib.rs      picgif crate.
//
// Copyright (c) 2019-2026  Douglas Lau
//
//! # picgif
//!
//! A library for decoding and encoding GIF images, including its own LZW
//! codec and full animation support.
//!
//! Decoding is layered: a [Decoder] can iterate over low-level
//! [Block]s, mid-level [Frame]s, or high-level [Step]s: full rasters of
//! the logical screen, composited using each frame's disposal method.
//! Encoding mirrors the same three layers on an [Encoder].
//!
//! Recoverable oddities in a file (truncated image data, malformed
//! comments, unknown extensions) are collected as [Warning]s rather than
//! aborting the decode.
//!
//! [Block]: block/enum.Block.html
//! [Decoder]: struct.Decoder.html
//! [Encoder]: struct.Encoder.html
//! [Frame]: block/struct.Frame.html
//! [Step]: struct.Step.html
//! [Warning]: enum.Warning.html
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod block;
pub mod decode;
pub mod encode;
mod error;
mod lzw;
mod private;

pub use crate::error::{Error, Result, Warning};
pub use crate::private::{Decoder, Encoder, Step};
