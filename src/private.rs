// private.rs
//
// Copyright (c) 2019-2026  Douglas Lau
//
//! Private module for top-level items
use crate::{decode, encode, Result};
use pix::gray::Gray8;
use pix::rgb::SRgba8;
use pix::{Palette, Raster};
use std::io::{Read, Write};

/// Raster for an animation step.
pub(crate) enum StepRaster {
    /// True color 24-bit raster
    TrueColor(Raster<SRgba8>),
    /// Indexed color 8-bit raster
    Indexed(Raster<Gray8>, Palette),
}

impl Clone for StepRaster {
    fn clone(&self) -> Self {
        match self {
            StepRaster::TrueColor(r) => {
                StepRaster::TrueColor(Raster::with_raster(r))
            }
            StepRaster::Indexed(r, p) => {
                StepRaster::Indexed(Raster::with_raster(r), p.clone())
            }
        }
    }
}

/// One step of an animation.
///
/// Steps yielded by a [Steps](decode/struct.Steps.html) iterator are fully
/// composited onto the logical screen; steps built for encoding carry the
/// raster exactly as given.
#[derive(Clone)]
pub struct Step {
    /// Raster of the animation step
    pub(crate) raster: StepRaster,
    /// Display time, in centiseconds
    pub(crate) delay_time_cs: u16,
    /// Transparent color index, if any
    pub(crate) transparent_color: Option<u8>,
    /// Step contains transparent pixels
    pub(crate) has_mask: bool,
    /// Raster is a composite of the steps so far
    pub(crate) composited: bool,
}

impl Step {
    /// Create an animation step with a true color raster.
    pub fn with_true_color(raster: Raster<SRgba8>) -> Self {
        Step {
            raster: StepRaster::TrueColor(raster),
            delay_time_cs: 0,
            transparent_color: None,
            has_mask: false,
            composited: false,
        }
    }

    /// Create an animation step with an indexed raster.
    pub fn with_indexed(raster: Raster<Gray8>, palette: Palette) -> Self {
        Step {
            raster: StepRaster::Indexed(raster, palette),
            delay_time_cs: 0,
            transparent_color: None,
            has_mask: false,
            composited: false,
        }
    }

    /// Adjust the display time, in centiseconds.
    pub fn with_delay_time_cs(mut self, delay_time_cs: u16) -> Self {
        self.delay_time_cs = delay_time_cs;
        self
    }

    /// Adjust the transparent color index.
    pub fn with_transparent_color(mut self, clr: Option<u8>) -> Self {
        self.transparent_color = clr;
        self.has_mask = clr.is_some();
        self
    }

    /// Get the true color raster, if the step has one.
    pub fn raster(&self) -> Option<&Raster<SRgba8>> {
        match &self.raster {
            StepRaster::TrueColor(r) => Some(r),
            StepRaster::Indexed(_, _) => None,
        }
    }

    /// Get the display time, in centiseconds.
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }

    /// Get the transparent color index, if any.
    pub fn transparent_color(&self) -> Option<u8> {
        self.transparent_color
    }

    /// Check whether the step contains transparent pixels.
    pub fn has_transparency(&self) -> bool {
        self.has_mask
    }

    /// Check whether the raster is a composite of the steps so far.
    pub fn is_composited(&self) -> bool {
        self.composited
    }
}

/// GIF file decoder
///
/// Can be converted to one of three `Iterator`s:
/// * [into_iter] / [into_steps] for high-level [Step]s
/// * [into_frames] for mid-level [Frame]s
/// * [into_blocks] for low-level [Block]s
///
/// ## Example: Get a `Raster` from a GIF
/// ```
/// use picgif::Decoder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00, 0x0A, 0x00, 0x91,
/// #   0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF,
/// #   0x00, 0x00, 0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00,
/// #   0x2C, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x0A, 0x00, 0x00, 0x02,
/// #   0x16, 0x8C, 0x2D, 0x99, 0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02,
/// #   0x75, 0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C,
/// #   0x01, 0x00, 0x3B,
/// # ][..];
/// // ... open a `File` as "gif"
/// if let Some(step) = Decoder::new(gif).into_steps().next() {
///     // was there a decoding error?
///     let step = step?;
///     let raster = step.raster();
///     // ... work with raster
/// }
/// # Ok(())
/// # }
/// ```
///
/// [Block]: block/enum.Block.html
/// [Frame]: block/struct.Frame.html
/// [into_blocks]: struct.Decoder.html#method.into_blocks
/// [into_frames]: struct.Decoder.html#method.into_frames
/// [into_iter]: struct.Decoder.html#method.into_iter
/// [into_steps]: struct.Decoder.html#method.into_steps
/// [Step]: struct.Step.html
pub struct Decoder<R: Read> {
    /// Reader for input data
    reader: R,
    /// Maximum image size, in bytes
    max_image_sz: Option<usize>,
}

impl<R: Read> Decoder<R> {
    /// Create a new GIF decoder.
    pub fn new(reader: R) -> Self {
        Decoder {
            reader,
            max_image_sz: Some(1 << 25),
        }
    }

    /// Set the maximum image size (in bytes) to allow for decoding.
    pub fn max_image_sz(mut self, max_image_sz: Option<usize>) -> Self {
        self.max_image_sz = max_image_sz;
        self
    }

    /// Convert into a block `Iterator`.
    pub fn into_blocks(self) -> decode::Blocks<R> {
        decode::Blocks::new(self.reader, self.max_image_sz)
    }

    /// Convert into a frame `Iterator`.
    pub fn into_frames(self) -> decode::Frames<R> {
        decode::Frames::new(self.into_blocks())
    }

    /// Convert into a step `Iterator`.
    pub fn into_steps(self) -> decode::Steps<R> {
        decode::Steps::new(self.into_frames())
    }
}

impl<R: Read> IntoIterator for Decoder<R> {
    type Item = Result<Step>;
    type IntoIter = decode::Steps<R>;

    /// Convert into a step `Iterator`
    fn into_iter(self) -> Self::IntoIter {
        self.into_steps()
    }
}

/// GIF file encoder
///
/// Can be converted to one of three encoders:
/// * [into_step_enc] for high-level [Step]s
/// * [into_frame_enc] for mid-level [Frame]s
/// * [into_block_enc] for low-level [Block]s
///
/// ## Encoding Example
/// ```
/// use picgif::{Encoder, Step};
/// use pix::{gray::Gray8, Palette, Raster, rgb::SRgb8};
/// use std::error::Error;
/// use std::io::Write;
///
/// fn encode<W: Write>(mut w: W) -> Result<(), Box<dyn Error>> {
///     let mut enc = Encoder::new(&mut w).into_step_enc();
///     let mut raster = Raster::with_clear(4, 4);
///     *raster.pixel_mut(0, 0) = Gray8::new(1);
///     *raster.pixel_mut(1, 1) = Gray8::new(1);
///     *raster.pixel_mut(2, 2) = Gray8::new(1);
///     *raster.pixel_mut(3, 3) = Gray8::new(1);
///     let mut palette = Palette::new(2);
///     palette.set_entry(SRgb8::new(0xFF, 0, 0));
///     palette.set_entry(SRgb8::new(0xFF, 0xFF, 0));
///     let step = Step::with_indexed(raster, palette);
///     enc.encode_step(&step)?;
///     Ok(())
/// }
/// ```
///
/// [Block]: block/enum.Block.html
/// [Frame]: block/struct.Frame.html
/// [into_block_enc]: struct.Encoder.html#method.into_block_enc
/// [into_frame_enc]: struct.Encoder.html#method.into_frame_enc
/// [into_step_enc]: struct.Encoder.html#method.into_step_enc
/// [Step]: struct.Step.html
pub struct Encoder<W: Write> {
    /// Writer for output data
    writer: W,
}

impl<W: Write> Encoder<W> {
    /// Create a new GIF encoder.
    pub fn new(writer: W) -> Self {
        Encoder { writer }
    }

    /// Convert into a block encoder.
    pub fn into_block_enc(self) -> encode::BlockEnc<W> {
        encode::BlockEnc::new(self.writer)
    }

    /// Convert into a frame encoder.
    pub fn into_frame_enc(self) -> encode::FrameEnc<W> {
        encode::FrameEnc::new(self.into_block_enc())
    }

    /// Convert into a step encoder.
    pub fn into_step_enc(self) -> encode::StepEnc<W> {
        encode::StepEnc::new(self.into_frame_enc())
    }
}
