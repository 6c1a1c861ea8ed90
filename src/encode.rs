// encode.rs
//
// Copyright (c) 2019-2026  Douglas Lau
//
//! GIF file encoding
use crate::block::*;
use crate::error::{Error, Result};
use crate::lzw::Compressor;
use crate::private::{Step, StepRaster};
use pix::el::Pixel;
use pix::gray::Gray;
use pix::rgb::{Rgb, SRgb8, SRgba8};
use pix::{Palette, Raster};
use std::convert::TryFrom;
use std::io::{self, Write};

/// Encoder for writing [Block](block/enum.Block.html)s into a GIF file.
///
/// Created with Encoder.[into_block_enc](struct.Encoder.html#method.into_block_enc).
pub struct BlockEnc<W: Write> {
    /// Writer for output data
    writer: W,
}

impl<W: Write> BlockEnc<W> {
    /// Create a new block encoder
    pub(crate) fn new(writer: W) -> Self {
        BlockEnc { writer }
    }

    /// Encode one block
    pub fn encode<B>(&mut self, block: B) -> Result<()>
    where
        B: Into<Block>,
    {
        use crate::block::Block::*;
        let w = &mut self.writer;
        match block.into() {
            Header(b) => b.format(w),
            LogicalScreenDesc(b) => b.format(w),
            GlobalColorTable(b) => b.format(w),
            PlainText(b) => b.format(w),
            GraphicControl(b) => b.format(w),
            Comment(b) => b.format(w),
            Application(b) => b.format(w),
            Unknown(b) => b.format(w),
            ImageDesc(b) => b.format(w),
            LocalColorTable(b) => b.format(w),
            ImageData(b) => b.format(w),
            Trailer(b) => b.format(w),
        }?;
        Ok(())
    }
}

impl Header {
    /// Format the header block
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(b"GIF")?;
        w.write_all(&self.version())
    }
}

impl LogicalScreenDesc {
    /// Format the logical screen descriptor block
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let mut buf = Vec::with_capacity(7);
        let width = self.screen_width();
        buf.push(width as u8);
        buf.push((width >> 8) as u8);
        let height = self.screen_height();
        buf.push(height as u8);
        buf.push((height >> 8) as u8);
        buf.push(self.flags());
        buf.push(self.background_color_idx());
        buf.push(self.pixel_aspect_ratio());
        w.write_all(&buf)
    }
}

impl ColorTable {
    /// Format a global / local color table block
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.padded_colors())
    }
}

impl PlainText {
    /// Format the plain text extension block
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        w.write_all(&[ExtensionCode::PlainText_.into()])?;
        format_sub_blocks(self.sub_blocks(), w)
    }
}

impl GraphicControl {
    /// Format the graphic control extension block
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        let mut buf = Vec::with_capacity(7);
        buf.push(ExtensionCode::GraphicControl_.into());
        buf.push(4); // block size
        buf.push(self.flags());
        let delay = self.delay_time();
        buf.push(delay as u8);
        buf.push((delay >> 8) as u8);
        buf.push(self.transparent_color().unwrap_or(0));
        buf.push(0); // block size
        w.write_all(&buf)
    }
}

impl Comment {
    /// Format the comment extension block
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        w.write_all(&[ExtensionCode::Comment_.into()])?;
        format_sub_blocks(self.comments(), w)
    }
}

impl Application {
    /// Format the application extension block
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        w.write_all(&[ExtensionCode::Application_.into()])?;
        format_sub_blocks(self.app_data(), w)
    }
}

impl Unknown {
    /// Format an unknown extension block
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        w.write_all(self.ext_id())?;
        format_sub_blocks(self.sub_blocks(), w)
    }
}

/// Format a sequence of sub-blocks, followed by the terminator
fn format_sub_blocks<W: Write>(
    sub_blocks: &[Vec<u8>],
    w: &mut W,
) -> io::Result<()> {
    for b in sub_blocks {
        debug_assert!(b.len() < 256);
        w.write_all(&[b.len() as u8])?;
        w.write_all(b)?;
    }
    w.write_all(&[0])
}

impl ImageDesc {
    /// Format the image descriptor block
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(BlockCode::ImageDesc_.signature())?;
        let mut buf = Vec::with_capacity(9);
        let left = self.left();
        buf.push(left as u8);
        buf.push((left >> 8) as u8);
        let top = self.top();
        buf.push(top as u8);
        buf.push((top >> 8) as u8);
        let width = self.width();
        buf.push(width as u8);
        buf.push((width >> 8) as u8);
        let height = self.height();
        buf.push(height as u8);
        buf.push((height >> 8) as u8);
        buf.push(self.flags());
        w.write_all(&buf)
    }
}

impl ImageData {
    /// Format the image data block (min code size + LZW sub-blocks)
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&[self.min_code_size()])?;
        let mut compressed = Vec::with_capacity(self.data().len() / 2 + 16);
        let mut enc = Compressor::new(self.min_code_size());
        enc.compress(self.data(), &mut compressed);
        let mut bw = BlockWriter::new(w);
        bw.write_all(&compressed)?;
        bw.flush()?;
        drop(bw);
        w.write_all(&[0])
    }
}

impl Trailer {
    /// Format the trailer block
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(BlockCode::Trailer_.signature())
    }
}

/// Writer to chunk data into sub-blocks of up to 255 bytes
struct BlockWriter<'a, W: Write> {
    /// Inner writer
    writer: &'a mut W,
    /// Sub-block buffer
    buf: Vec<u8>,
}

impl<'a, W: Write> BlockWriter<'a, W> {
    /// Create a new block writer
    fn new(writer: &'a mut W) -> Self {
        let buf = Vec::with_capacity(256);
        BlockWriter { writer, buf }
    }
}

impl<'a, W: Write> Write for BlockWriter<'a, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let remaining = 0xFF - self.buf.len();
        let consumed = remaining.min(buf.len());
        self.buf.extend_from_slice(&buf[..consumed]);
        if self.buf.len() == 0xFF {
            self.writer.write_all(&[0xFF])?;
            self.writer.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(consumed)
    }

    fn flush(&mut self) -> io::Result<()> {
        let len = self.buf.len();
        if len > 0 {
            self.writer.write_all(&[len as u8])?;
            self.writer.write_all(&self.buf[..len])?;
            self.buf.clear();
        }
        Ok(())
    }
}

/// Encoder for writing [Frame](block/struct.Frame.html)s into a GIF file.
///
/// Created with Encoder.[into_frame_enc](struct.Encoder.html#method.into_frame_enc).
pub struct FrameEnc<W: Write> {
    /// Block encoder
    block_enc: BlockEnc<W>,
    /// Preamble has been written
    started: bool,
    /// Trailer has been written
    done: bool,
}

impl<W: Write> FrameEnc<W> {
    /// Create a new frame encoder
    pub(crate) fn new(block_enc: BlockEnc<W>) -> Self {
        FrameEnc {
            block_enc,
            started: false,
            done: false,
        }
    }

    /// Encode the preamble blocks.  Must be called before any frames.
    pub fn encode_preamble(&mut self, preamble: &Preamble) -> Result<()> {
        if self.started || self.done {
            return Err(Error::InvalidBlockSequence);
        }
        self.block_enc.encode(preamble.header.clone())?;
        self.block_enc.encode(preamble.logical_screen_desc.clone())?;
        if let Some(tbl) = &preamble.global_color_table {
            self.block_enc.encode(Block::GlobalColorTable(tbl.clone()))?;
        }
        if let Some(b) = &preamble.loop_count_ext {
            self.block_enc.encode(b.clone())?;
        }
        for c in &preamble.comments {
            self.block_enc.encode(c.clone())?;
        }
        self.started = true;
        Ok(())
    }

    /// Encode one frame.  Must be called after the preamble.
    pub fn encode_frame(&mut self, frame: &Frame) -> Result<()> {
        if !self.started || self.done {
            return Err(Error::InvalidBlockSequence);
        }
        if let Some(gce) = &frame.graphic_control_ext {
            self.block_enc.encode(*gce)?;
        }
        self.block_enc.encode(frame.image_desc.clone())?;
        if let Some(tbl) = &frame.local_color_table {
            self.block_enc.encode(Block::LocalColorTable(tbl.clone()))?;
        }
        self.block_enc.encode(frame.image_data.clone())?;
        Ok(())
    }

    /// Encode the trailer block.  Must be called last.
    pub fn encode_trailer(&mut self) -> Result<()> {
        if !self.started || self.done {
            return Err(Error::InvalidBlockSequence);
        }
        self.block_enc.encode(Trailer::default())?;
        self.done = true;
        Ok(())
    }
}

/// Encoder for writing [Step](struct.Step.html)s into a GIF file.
///
/// The first step decides the logical screen size, the global color table
/// and the header version; every following step must fit on that screen.
/// The trailer is written when the encoder is dropped.
///
/// Created with Encoder.[into_step_enc](struct.Encoder.html#method.into_step_enc).
pub struct StepEnc<W: Write> {
    /// Frame encoder
    frame_enc: FrameEnc<W>,
    /// Logical screen dimensions
    screen: Option<(u16, u16)>,
    /// Animation loop count (zero loops forever)
    loop_count: Option<u16>,
    /// Background color for flattening translucent pixels
    background: SRgb8,
    /// Global color table, once the preamble has been written
    global_tbl: Option<ColorTable>,
}

impl<W: Write> Drop for StepEnc<W> {
    fn drop(&mut self) {
        if self.global_tbl.is_some() {
            let _ = self.frame_enc.encode_trailer();
        }
    }
}

impl<W: Write> StepEnc<W> {
    /// Create a new step encoder
    pub(crate) fn new(frame_enc: FrameEnc<W>) -> Self {
        StepEnc {
            frame_enc,
            screen: None,
            loop_count: None,
            background: SRgb8::default(),
            global_tbl: None,
        }
    }

    /// Adjust the animation loop count.
    ///
    /// A loop count of zero means loop forever.
    pub fn with_loop_count(mut self, loop_count: u16) -> Self {
        self.loop_count = Some(loop_count);
        self
    }

    /// Adjust the logical screen size.
    ///
    /// When not set, the first step decides it.
    pub fn with_screen_size(mut self, width: u16, height: u16) -> Self {
        self.screen = Some((width, height));
        self
    }

    /// Adjust the background color used to flatten translucent pixels
    pub fn with_background_color(mut self, clr: SRgb8) -> Self {
        self.background = clr;
        self
    }

    /// Encode one step.
    ///
    /// A step with a zero-area raster is skipped silently.
    pub fn encode_step(&mut self, step: &Step) -> Result<()> {
        match &step.raster {
            StepRaster::Indexed(raster, palette) => {
                let width = u16::try_from(raster.width())?;
                let height = u16::try_from(raster.height())?;
                if width == 0 || height == 0 {
                    return Ok(());
                }
                let tbl = color_table(palette);
                let data: Vec<u8> = raster
                    .pixels()
                    .iter()
                    .map(|p| u8::from(Gray::value(*p)))
                    .collect();
                self.encode_indices(
                    step.delay_time_cs,
                    width,
                    height,
                    tbl,
                    &data,
                    step.transparent_color,
                )
            }
            StepRaster::TrueColor(raster) => {
                let width = u16::try_from(raster.width())?;
                let height = u16::try_from(raster.height())?;
                if width == 0 || height == 0 {
                    return Ok(());
                }
                let (tbl, data, transparent) =
                    quantize(raster, self.background);
                self.encode_indices(
                    step.delay_time_cs,
                    width,
                    height,
                    tbl,
                    &data,
                    transparent,
                )
            }
        }
    }

    /// Encode one frame of color indices
    fn encode_indices(
        &mut self,
        delay_time_cs: u16,
        width: u16,
        height: u16,
        tbl: ColorTable,
        data: &[u8],
        transparent: Option<u8>,
    ) -> Result<()> {
        let needs_control = transparent.is_some() || delay_time_cs > 0;
        self.ensure_preamble(width, height, &tbl, needs_control)?;
        if let Some((sw, sh)) = self.screen {
            if width > sw || height > sh {
                return Err(Error::InvalidFrameDimensions);
            }
        }
        let graphic_control_ext = if needs_control {
            let mut control = GraphicControl::default();
            control.set_transparent_color(transparent);
            control.set_delay_time(delay_time_cs / 10);
            control.set_disposal_method(if transparent.is_some() {
                DisposalMethod::Background
            } else {
                DisposalMethod::Keep
            });
            Some(control)
        } else {
            None
        };
        let shares_global =
            self.global_tbl.as_ref().map_or(false, |g| *g == tbl);
        let mut image_desc =
            ImageDesc::default().with_width(width).with_height(height);
        if !shares_global {
            image_desc = image_desc.with_color_table(&tbl);
        }
        let mut image_data = ImageData::new(image_desc.image_sz());
        image_data.set_min_code_size(tbl.len_bits() + 1);
        image_data.add_data(data);
        let local_color_table = if shares_global { None } else { Some(tbl) };
        self.frame_enc.encode_frame(&Frame::new(
            graphic_control_ext,
            image_desc,
            local_color_table,
            image_data,
        ))
    }

    /// Write the preamble if this is the first frame
    fn ensure_preamble(
        &mut self,
        width: u16,
        height: u16,
        tbl: &ColorTable,
        needs_control: bool,
    ) -> Result<()> {
        if self.global_tbl.is_some() {
            return Ok(());
        }
        let (sw, sh) = self.screen.unwrap_or((width, height));
        self.screen = Some((sw, sh));
        let version = if needs_control || self.loop_count.is_some() {
            *b"89a"
        } else {
            *b"87a"
        };
        let mut preamble = Preamble::default();
        preamble.header = Header::with_version(version);
        preamble.logical_screen_desc = LogicalScreenDesc::default()
            .with_screen_width(sw)
            .with_screen_height(sh)
            .with_color_table(tbl);
        preamble.global_color_table = Some(tbl.clone());
        if let Some(lc) = self.loop_count {
            preamble.loop_count_ext = Some(Application::with_loop_count(lc));
        }
        self.frame_enc.encode_preamble(&preamble)?;
        self.global_tbl = Some(tbl.clone());
        Ok(())
    }

    /// Encode a whole animation with one shared palette.
    ///
    /// Every step is flattened over the background color onto a canvas
    /// sized to the largest step, then all frames are quantized jointly.
    /// The animation loops forever unless a loop count was set.
    pub fn encode_animation(&mut self, steps: &[Step]) -> Result<()> {
        if steps.is_empty() {
            return Err(Error::EmptyAnimation);
        }
        // animations always get an 89a header and a loop block
        if self.loop_count.is_none() {
            self.loop_count = Some(0);
        }
        let mut width = 0;
        let mut height = 0;
        for step in steps {
            let (w, h) = match &step.raster {
                StepRaster::TrueColor(r) => (r.width(), r.height()),
                StepRaster::Indexed(r, _) => (r.width(), r.height()),
            };
            width = width.max(w);
            height = height.max(h);
        }
        let width = u16::try_from(width)?;
        let height = u16::try_from(height)?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidRasterDimensions);
        }
        self.screen = Some((width, height));
        let flattened: Vec<Raster<SRgb8>> = steps
            .iter()
            .map(|s| flatten(s, width.into(), height.into(), self.background))
            .collect();
        let mut palette = Palette::new(256);
        palette.set_threshold_fn(palette_threshold_rgb8_256);
        for raster in &flattened {
            for p in raster.pixels() {
                palette.set_entry(*p);
            }
        }
        let tbl = color_table(&palette);
        for (step, raster) in steps.iter().zip(&flattened) {
            let data: Vec<u8> = raster
                .pixels()
                .iter()
                .map(|p| palette.set_entry(*p).unwrap_or(0) as u8)
                .collect();
            self.encode_indices(
                step.delay_time_cs,
                width,
                height,
                tbl.clone(),
                &data,
                None,
            )?;
        }
        Ok(())
    }
}

/// Flatten a step onto an opaque canvas
fn flatten(
    step: &Step,
    width: u32,
    height: u32,
    background: SRgb8,
) -> Raster<SRgb8> {
    let mut canvas = Raster::with_clear(width, height);
    for p in canvas.pixels_mut() {
        *p = background;
    }
    match &step.raster {
        StepRaster::TrueColor(raster) => {
            for y in 0..raster.height().min(height) {
                for x in 0..raster.width().min(width) {
                    let p = raster.pixel(x as i32, y as i32);
                    let alpha = u8::from(Pixel::alpha(p));
                    if alpha > 0 {
                        *canvas.pixel_mut(x as i32, y as i32) =
                            flatten_pixel(p, alpha, background);
                    }
                }
            }
        }
        StepRaster::Indexed(raster, palette) => {
            for y in 0..raster.height().min(height) {
                for x in 0..raster.width().min(width) {
                    let idx = u8::from(Gray::value(
                        raster.pixel(x as i32, y as i32),
                    ));
                    if step.transparent_color == Some(idx) {
                        continue;
                    }
                    if let Some(clr) = palette.entry(usize::from(idx)) {
                        *canvas.pixel_mut(x as i32, y as i32) = clr;
                    }
                }
            }
        }
    }
    canvas
}

/// Quantize a true color raster into indices plus a color table.
///
/// Translucent pixels are flattened over the background color first;
/// fully transparent pixels get a reserved index past the palette.
fn quantize(
    raster: &Raster<SRgba8>,
    background: SRgb8,
) -> (ColorTable, Vec<u8>, Option<u8>) {
    let any_transparent = raster
        .pixels()
        .iter()
        .any(|p| u8::from(Pixel::alpha(*p)) == 0);
    // cap opaque colors at 255 when an index is reserved
    let capacity = if any_transparent { 255 } else { 256 };
    let mut palette = Palette::new(capacity);
    palette.set_threshold_fn(palette_threshold_rgb8_256);
    for p in raster.pixels() {
        let alpha = u8::from(Pixel::alpha(*p));
        if alpha > 0 {
            palette.set_entry(flatten_pixel(*p, alpha, background));
        }
    }
    let mut colors = palette_colors(&palette);
    let transparent = if any_transparent {
        // index just past the opaque colors
        colors.extend_from_slice(&[0, 0, 0]);
        Some((colors.len() / CHANNELS - 1) as u8)
    } else {
        None
    };
    let data: Vec<u8> = raster
        .pixels()
        .iter()
        .map(|p| {
            let alpha = u8::from(Pixel::alpha(*p));
            if alpha > 0 {
                let clr = flatten_pixel(*p, alpha, background);
                palette.set_entry(clr).unwrap_or(0) as u8
            } else {
                transparent.unwrap_or(0)
            }
        })
        .collect();
    (ColorTable::with_colors(&colors), data, transparent)
}

/// Flatten one pixel over the background color
fn flatten_pixel(p: SRgba8, alpha: u8, background: SRgb8) -> SRgb8 {
    if alpha == 255 {
        SRgb8::new(
            u8::from(Rgb::red(p)),
            u8::from(Rgb::green(p)),
            u8::from(Rgb::blue(p)),
        )
    } else {
        let a = u32::from(alpha);
        let mix = |c: u8, b: u8| {
            ((u32::from(c) * a + u32::from(b) * (255 - a)) / 255) as u8
        };
        SRgb8::new(
            mix(u8::from(Rgb::red(p)), u8::from(Rgb::red(background))),
            mix(u8::from(Rgb::green(p)), u8::from(Rgb::green(background))),
            mix(u8::from(Rgb::blue(p)), u8::from(Rgb::blue(background))),
        )
    }
}

/// Get the raw RGB components of a palette
fn palette_colors(palette: &Palette) -> Vec<u8> {
    let mut colors = Vec::with_capacity(256 * CHANNELS);
    let mut i = 0;
    while let Some(clr) = palette.entry(i) {
        colors.push(u8::from(Rgb::red(clr)));
        colors.push(u8::from(Rgb::green(clr)));
        colors.push(u8::from(Rgb::blue(clr)));
        i += 1;
    }
    colors
}

/// Build a color table from a palette
fn color_table(palette: &Palette) -> ColorTable {
    ColorTable::with_colors(&palette_colors(palette))
}

/// Get the difference threshold for SRgb8 with 256 capacity palette
fn palette_threshold_rgb8_256(v: usize) -> SRgb8 {
    let i = match v as u8 {
        0x00..=0x0F => 0,
        0x10..=0x1E => 1,
        0x1F..=0x2D => 2,
        0x2E..=0x3B => 3,
        0x3C..=0x49 => 4,
        0x4A..=0x56 => 5,
        0x57..=0x63 => 6,
        0x64..=0x6F => 7,
        0x70..=0x7B => 8,
        0x7C..=0x86 => 9,
        0x87..=0x91 => 10,
        0x92..=0x9B => 11,
        0x9C..=0xA5 => 12,
        0xA6..=0xAE => 13,
        0xAF..=0xB7 => 14,
        0xB8..=0xBF => 15,
        0xC0..=0xC7 => 16,
        0xC8..=0xCE => 17,
        0xCF..=0xD5 => 18,
        0xD6..=0xDB => 19,
        0xDC..=0xE1 => 20,
        0xE2..=0xE6 => 21,
        0xE7..=0xEB => 22,
        0xEC..=0xEF => 23,
        0xF0..=0xF3 => 24,
        0xF4..=0xF6 => 25,
        0xF7..=0xF9 => 26,
        0xFA..=0xFB => 27,
        0xFC..=0xFD => 28,
        0xFE..=0xFE => 29,
        0xFF..=0xFF => 30,
    };
    SRgb8::new(i * 4, i * 4, i * 5)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::private::{Decoder, Encoder};
    use pix::gray::Gray8;
    use pix::rgb::SRgba8;

    #[test]
    fn indexed_round_trip() -> Result<()> {
        let mut buf = Vec::new();
        {
            let mut enc = Encoder::new(&mut buf).into_step_enc();
            let mut raster = Raster::<Gray8>::with_clear(4, 4);
            *raster.pixel_mut(0, 0) = Gray8::new(1);
            *raster.pixel_mut(3, 3) = Gray8::new(1);
            let mut palette = Palette::new(2);
            palette.set_entry(SRgb8::new(0, 0, 0));
            palette.set_entry(SRgb8::new(255, 0, 0));
            let step = Step::with_indexed(raster, palette);
            enc.encode_step(&step)?;
        }
        assert_eq!(&buf[..6], b"GIF87a");
        assert_eq!(*buf.last().unwrap(), b';');
        let mut steps = Decoder::new(&buf[..]).into_steps();
        let step = steps.next().unwrap()?;
        let raster = step.raster().unwrap();
        assert_eq!(raster.pixel(0, 0), SRgba8::new(255, 0, 0, 255));
        assert_eq!(raster.pixel(3, 3), SRgba8::new(255, 0, 0, 255));
        assert_eq!(raster.pixel(1, 2), SRgba8::new(0, 0, 0, 255));
        assert!(steps.next().is_none());
        Ok(())
    }

    #[test]
    fn transparent_round_trip() -> Result<()> {
        let mut buf = Vec::new();
        {
            let mut enc = Encoder::new(&mut buf).into_step_enc();
            let mut raster = Raster::<SRgba8>::with_clear(2, 2);
            *raster.pixel_mut(0, 0) = SRgba8::new(255, 0, 0, 255);
            *raster.pixel_mut(1, 0) = SRgba8::new(0, 255, 0, 255);
            *raster.pixel_mut(0, 1) = SRgba8::new(0, 0, 255, 255);
            let step = Step::with_true_color(raster);
            enc.encode_step(&step)?;
        }
        // transparency means an 89a header
        assert_eq!(&buf[..6], b"GIF89a");
        let mut steps = Decoder::new(&buf[..]).into_steps();
        let step = steps.next().unwrap()?;
        assert!(step.has_transparency());
        let raster = step.raster().unwrap();
        assert_eq!(raster.pixel(0, 0), SRgba8::new(255, 0, 0, 255));
        assert_eq!(raster.pixel(1, 0), SRgba8::new(0, 255, 0, 255));
        assert_eq!(u8::from(Pixel::alpha(raster.pixel(1, 1))), 0);
        Ok(())
    }

    #[test]
    fn zero_area_skipped() -> Result<()> {
        let mut buf = Vec::new();
        {
            let mut enc = Encoder::new(&mut buf).into_step_enc();
            let raster = Raster::<SRgba8>::with_clear(0, 4);
            enc.encode_step(&Step::with_true_color(raster))?;
        }
        assert!(buf.is_empty());
        Ok(())
    }

    #[test]
    fn empty_animation() {
        let mut buf = Vec::new();
        let mut enc = Encoder::new(&mut buf).into_step_enc();
        assert!(matches!(
            enc.encode_animation(&[]),
            Err(Error::EmptyAnimation)
        ));
    }

    #[test]
    fn animation_round_trip() -> Result<()> {
        let mut buf = Vec::new();
        {
            let mut enc =
                Encoder::new(&mut buf).into_step_enc().with_loop_count(0);
            let mut r0 = Raster::<SRgba8>::with_clear(4, 4);
            *r0.pixel_mut(0, 0) = SRgba8::new(255, 0, 0, 255);
            let mut r1 = Raster::<SRgba8>::with_clear(4, 4);
            *r1.pixel_mut(1, 1) = SRgba8::new(255, 0, 0, 255);
            let steps = [
                Step::with_true_color(r0).with_delay_time_cs(200),
                Step::with_true_color(r1).with_delay_time_cs(200),
            ];
            enc.encode_animation(&steps)?;
        }
        assert_eq!(&buf[..6], b"GIF89a");
        let mut frames = Decoder::new(&buf[..]).into_frames();
        let preamble = frames.preamble()?.unwrap();
        assert_eq!(
            preamble.loop_count_ext.and_then(|b| b.loop_count()),
            Some(0)
        );
        drop(frames);
        let mut count = 0;
        for step in Decoder::new(&buf[..]).into_steps() {
            let step = step?;
            assert_eq!(step.delay_time_cs(), 200);
            let raster = step.raster().unwrap();
            // flattened over the default black background
            assert_eq!(u8::from(Pixel::alpha(raster.pixel(3, 3))), 255);
            count += 1;
        }
        assert_eq!(count, 2);
        Ok(())
    }

    #[test]
    fn animation_loops_by_default() -> Result<()> {
        let mut buf = Vec::new();
        {
            let mut enc = Encoder::new(&mut buf).into_step_enc();
            let mut r0 = Raster::<SRgba8>::with_clear(2, 2);
            *r0.pixel_mut(0, 0) = SRgba8::new(255, 0, 0, 255);
            let mut r1 = Raster::<SRgba8>::with_clear(2, 2);
            *r1.pixel_mut(1, 1) = SRgba8::new(255, 0, 0, 255);
            let steps =
                [Step::with_true_color(r0), Step::with_true_color(r1)];
            enc.encode_animation(&steps)?;
        }
        assert_eq!(&buf[..6], b"GIF89a");
        let mut frames = Decoder::new(&buf[..]).into_frames();
        let preamble = frames.preamble()?.unwrap();
        assert_eq!(
            preamble.loop_count_ext.and_then(|b| b.loop_count()),
            Some(0)
        );
        Ok(())
    }

    #[test]
    fn indexed_animation_keeps_content() -> Result<()> {
        let mut buf = Vec::new();
        {
            let mut enc = Encoder::new(&mut buf).into_step_enc();
            let mut raster = Raster::<Gray8>::with_clear(2, 2);
            *raster.pixel_mut(0, 0) = Gray8::new(1);
            let mut palette = Palette::new(2);
            palette.set_entry(SRgb8::new(0, 0, 0));
            palette.set_entry(SRgb8::new(0, 255, 0));
            let steps = [Step::with_indexed(raster, palette)];
            enc.encode_animation(&steps)?;
        }
        let mut steps = Decoder::new(&buf[..]).into_steps();
        let step = steps.next().unwrap()?;
        let raster = step.raster().unwrap();
        assert_eq!(raster.pixel(0, 0), SRgba8::new(0, 255, 0, 255));
        assert_eq!(raster.pixel(1, 1), SRgba8::new(0, 0, 0, 255));
        Ok(())
    }

    #[test]
    fn transparent_index_reserved() {
        let mut raster = Raster::<SRgba8>::with_clear(4, 1);
        *raster.pixel_mut(0, 0) = SRgba8::new(255, 0, 0, 255);
        *raster.pixel_mut(1, 0) = SRgba8::new(0, 255, 0, 255);
        *raster.pixel_mut(2, 0) = SRgba8::new(0, 0, 255, 255);
        // (3, 0) stays fully transparent
        let (tbl, data, transparent) = quantize(&raster, SRgb8::default());
        let t = transparent.unwrap();
        // reserved index sits past every opaque color
        assert_eq!(usize::from(t) + 1, tbl.len());
        for (i, d) in data.iter().enumerate() {
            if i < 3 {
                assert_ne!(*d, t);
            } else {
                assert_eq!(*d, t);
            }
        }
    }

    #[test]
    fn frame_before_preamble() {
        let mut buf = Vec::new();
        let mut enc = Encoder::new(&mut buf).into_frame_enc();
        let frame = Frame::new(
            None,
            ImageDesc::default().with_width(1).with_height(1),
            None,
            ImageData::new(1),
        );
        assert!(matches!(
            enc.encode_frame(&frame),
            Err(Error::InvalidBlockSequence)
        ));
    }
}
