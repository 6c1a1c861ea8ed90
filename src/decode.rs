// decode.rs
//
// Copyright (c) 2019-2026  Douglas Lau
//
//! GIF file decoding
use crate::block::*;
use crate::error::{Error, Result, Warning};
use crate::lzw::Decompressor;
use crate::private::{Step, StepRaster};
use pix::el::Pixel;
use pix::rgb::SRgba8;
use pix::Raster;
use std::io::{ErrorKind, Read};

/// Buffer size (must be at least as large as a color table with 256 entries)
const BUF_SZ: usize = 1024;

/// Interlace passes: (starting row, row step)
const INTERLACE_PASS: [(u32, u32); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

/// An iterator over every [Block](block/enum.Block.html) in a GIF file.
///
/// Created with Decoder.[into_blocks](struct.Decoder.html#method.into_blocks).
pub struct Blocks<R: Read> {
    /// Reader for input data
    reader: R,
    /// Maximum image size, in bytes
    max_image_sz: Option<usize>,
    /// Buffered input data
    buffer: Vec<u8>,
    /// Next expected block code / size, if known
    expected_next: Option<(BlockCode, usize)>,
    /// Image size of the current frame, in pixels
    image_sz: usize,
    /// LZW decompressor for the current image data
    decompressor: Option<Decompressor>,
    /// Extra image data already reported for the current frame
    extra_flagged: bool,
    /// Accumulated warnings
    warnings: Vec<Warning>,
    /// Decoding finished flag
    done: bool,
}

impl<R: Read> Iterator for Blocks<R> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let res = self.next_block();
        match &res {
            Ok(Block::Trailer(_)) | Err(_) => self.done = true,
            _ => {}
        }
        Some(res)
    }
}

impl<R: Read> Blocks<R> {
    /// Create a new block iterator
    pub(crate) fn new(reader: R, max_image_sz: Option<usize>) -> Self {
        use self::BlockCode::Header_;
        Blocks {
            reader,
            max_image_sz,
            buffer: Vec::with_capacity(BUF_SZ),
            expected_next: Some((Header_, Header_.size())),
            image_sz: 0,
            decompressor: None,
            extra_flagged: false,
            warnings: vec![],
            done: false,
        }
    }

    /// Get the warnings accumulated so far
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Decode the next block (including all sub-blocks)
    fn next_block(&mut self) -> Result<Block> {
        self.fill_buffer()?;
        let (bc, sz) = self.examine_buffer()?;
        let mut block = self.decode_block(bc, sz)?;
        if block.has_sub_blocks() {
            while self.decode_sub_block(&mut block)? {}
        }
        self.check_block_end(&mut block)?;
        Ok(block)
    }

    /// Fill the buffer from the reader
    fn fill_buffer(&mut self) -> Result<()> {
        let mut len = self.buffer.len();
        self.buffer.resize(BUF_SZ, 0);
        while len < BUF_SZ {
            match self.reader.read(&mut self.buffer[len..]) {
                Ok(0) => break, // EOF
                Ok(n) => len += n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.buffer.resize(len, 0);
        Ok(())
    }

    /// Examine the buffer for the next block code and size
    fn examine_buffer(&mut self) -> Result<(BlockCode, usize)> {
        let bc_sz = self.expected_next.take().or_else(|| {
            self.buffer
                .first()
                .and_then(|t| BlockCode::from_u8(*t))
                .map(|b| (b, b.size()))
        });
        match bc_sz {
            Some(b) => {
                self.expected_next = self.expected(b.0);
                Ok(b)
            }
            None if self.buffer.is_empty() => {
                Err(Error::UnexpectedEndOfFile)
            }
            None => Err(Error::InvalidBlockCode),
        }
    }

    /// Get the next expected block code and size, if any
    fn expected(&self, bc: BlockCode) -> Option<(BlockCode, usize)> {
        use crate::block::BlockCode::*;
        let buf = &self.buffer[..];
        match bc {
            Header_ => Some((LogicalScreenDesc_, LogicalScreenDesc_.size())),
            LogicalScreenDesc_ => {
                let sz = LogicalScreenDesc_.size();
                if buf.len() >= sz {
                    if let Ok(b) = LogicalScreenDesc::from_buf(&buf[..sz]) {
                        let sz = b.table_size_bytes();
                        if sz > 0 {
                            return Some((GlobalColorTable_, sz));
                        }
                    }
                }
                None
            }
            ImageDesc_ => {
                let sz = ImageDesc_.size();
                if buf.len() >= sz {
                    if let Ok(b) = ImageDesc::from_buf(&buf[..sz]) {
                        let sz = b.table_size_bytes();
                        if sz > 0 {
                            return Some((LocalColorTable_, sz));
                        } else {
                            return Some((ImageData_, ImageData_.size()));
                        }
                    }
                }
                None
            }
            LocalColorTable_ => Some((ImageData_, ImageData_.size())),
            Trailer_ => Some((Header_, Header_.size())),
            _ => None,
        }
    }

    /// Decode one block
    fn decode_block(&mut self, bc: BlockCode, sz: usize) -> Result<Block> {
        if self.buffer.len() >= sz {
            debug!("  block  : {:?} {:?}", bc, sz);
            let block = self.parse_block(bc, sz)?;
            self.buffer.drain(..sz);
            self.check_block_start(&block)?;
            Ok(block)
        } else {
            Err(Error::UnexpectedEndOfFile)
        }
    }

    /// Parse a block in the buffer
    fn parse_block(&mut self, bc: BlockCode, sz: usize) -> Result<Block> {
        use crate::block::BlockCode::*;
        let buf = &self.buffer[..sz];
        Ok(match bc {
            Header_ => Header::from_buf(buf)?.into(),
            LogicalScreenDesc_ => LogicalScreenDesc::from_buf(buf)?.into(),
            GlobalColorTable_ => {
                Block::GlobalColorTable(ColorTable::with_colors(buf))
            }
            Extension_ => {
                let block = parse_extension(buf);
                if let Block::Unknown(b) = &block {
                    let ext_id = b.ext_id().first().copied().unwrap_or(0);
                    self.warnings.push(Warning::UnknownExtension(ext_id));
                }
                block
            }
            ImageDesc_ => ImageDesc::from_buf(buf)?.into(),
            LocalColorTable_ => {
                Block::LocalColorTable(ColorTable::with_colors(buf))
            }
            ImageData_ => ImageData::from_buf(self.image_sz, buf)?.into(),
            Trailer_ => Trailer::default().into(),
        })
    }

    /// Check the start of a block (before sub-blocks)
    fn check_block_start(&mut self, block: &Block) -> Result<()> {
        match block {
            Block::ImageDesc(b) => {
                self.image_sz = b.image_sz();
                if let Some(sz) = self.max_image_sz {
                    if self.image_sz > sz {
                        return Err(Error::TooLargeImage);
                    }
                }
            }
            Block::ImageData(b) => {
                self.decompressor =
                    Some(Decompressor::new(b.min_code_size()));
                self.extra_flagged = false;
            }
            _ => {}
        }
        Ok(())
    }

    /// Decode one sub-block
    fn decode_sub_block(&mut self, block: &mut Block) -> Result<bool> {
        self.fill_buffer()?;
        let len = self.buffer.len();
        if len > 0 {
            let sz = self.buffer[0] as usize;
            if len > sz {
                let bsz = sz + 1;
                if sz > 0 {
                    self.parse_sub_block(block, bsz)?;
                }
                self.buffer.drain(..bsz);
                return Ok(sz > 0);
            }
        }
        // A short read once the end code has been seen keeps the frame;
        // the block terminator (and trailer) never arrive
        if let Block::ImageData(b) = block {
            let ended = self
                .decompressor
                .as_ref()
                .map_or(false, |d| d.has_ended());
            if ended {
                warn!("Missing block terminator");
                if b.is_complete() {
                    self.warnings.push(Warning::TruncatedImageData);
                }
                self.done = true;
                return Ok(false);
            }
        }
        Err(Error::UnexpectedEndOfFile)
    }

    /// Parse a sub-block in the buffer
    fn parse_sub_block(&mut self, block: &mut Block, sz: usize) -> Result<()> {
        debug_assert!(sz <= 256);
        use crate::block::Block::*;
        match block {
            PlainText(b) => b.add_sub_block(&self.buffer[1..sz]),
            GraphicControl(b) => {
                if sz != 5 {
                    return Err(Error::MalformedGraphicControlExtension);
                }
                let buf = &self.buffer[1..sz];
                b.set_flags(buf[0], buf[3]);
                b.set_delay_time(u16::from(buf[1]) | u16::from(buf[2]) << 8);
            }
            Comment(b) => {
                let buf = &self.buffer[1..sz];
                if std::str::from_utf8(buf).is_err() {
                    warn!("Malformed comment: {:?}", buf);
                    self.warnings.push(Warning::MalformedComment);
                }
                b.add_comment(buf);
            }
            Application(b) => b.add_app_data(&self.buffer[1..sz]),
            Unknown(b) => b.add_sub_block(&self.buffer[1..sz]),
            ImageData(b) => self.decode_image_data(b, sz)?,
            _ => return Err(Error::InvalidBlockSequence),
        }
        Ok(())
    }

    /// Decode image data through the LZW decompressor
    fn decode_image_data(
        &mut self,
        b: &mut ImageData,
        sz: usize,
    ) -> Result<()> {
        let dec = match &mut self.decompressor {
            Some(dec) => dec,
            None => return Err(Error::InvalidBlockSequence),
        };
        let mut decoded = Vec::with_capacity(2 * sz);
        dec.decompress(&self.buffer[1..sz], &mut decoded)?;
        let extra = b.add_data(&decoded);
        if extra > 0 && !self.extra_flagged {
            self.warnings.push(Warning::ExtraImageData);
            self.extra_flagged = true;
        }
        Ok(())
    }

    /// Check the end of a block (after sub-blocks)
    fn check_block_end(&mut self, block: &mut Block) -> Result<()> {
        if let Block::ImageData(b) = block {
            let ended = self
                .decompressor
                .take()
                .map(|d| d.has_ended())
                .unwrap_or(false);
            if !b.is_complete() {
                if ended {
                    warn!("Truncated image data: {} pixels", b.missing());
                    self.warnings.push(Warning::TruncatedImageData);
                } else {
                    return Err(Error::IncompleteImageData);
                }
            }
        }
        Ok(())
    }
}

/// Parse an extension block introducer
fn parse_extension(buf: &[u8]) -> Block {
    use crate::block::ExtensionCode::*;
    debug_assert_eq!(buf.len(), BlockCode::Extension_.size());
    match ExtensionCode::from(buf[1]) {
        PlainText_ => PlainText::default().into(),
        GraphicControl_ => GraphicControl::default().into(),
        Comment_ => Comment::default().into(),
        Application_ => Application::default().into(),
        Unknown_(n) => {
            let mut b = Unknown::default();
            b.add_sub_block(&[n]);
            b.into()
        }
    }
}

impl Header {
    /// Decode a header block from a buffer
    fn from_buf(buf: &[u8]) -> Result<Self> {
        debug_assert_eq!(buf.len(), BlockCode::Header_.size());
        if &buf[..3] == b"GIF" {
            let version = [buf[3], buf[4], buf[5]];
            match &version {
                b"87a" | b"89a" => Ok(Header::with_version(version)),
                _ => Err(Error::UnsupportedVersion(version)),
            }
        } else {
            Err(Error::MalformedHeader)
        }
    }
}

impl LogicalScreenDesc {
    /// Decode a logical screen descriptor block from a buffer
    fn from_buf(buf: &[u8]) -> Result<Self> {
        debug_assert_eq!(buf.len(), BlockCode::LogicalScreenDesc_.size());
        let width = u16::from(buf[0]) | u16::from(buf[1]) << 8;
        let height = u16::from(buf[2]) | u16::from(buf[3]) << 8;
        let mut desc = LogicalScreenDesc::default()
            .with_screen_width(width)
            .with_screen_height(height)
            .with_background_color_idx(buf[5])
            .with_pixel_aspect_ratio(buf[6]);
        desc.set_flags(buf[4]);
        Ok(desc)
    }
}

impl ImageDesc {
    /// Decode an image descriptor block from a buffer
    fn from_buf(buf: &[u8]) -> Result<Self> {
        debug_assert_eq!(buf.len(), BlockCode::ImageDesc_.size());
        let left = u16::from(buf[1]) | u16::from(buf[2]) << 8;
        let top = u16::from(buf[3]) | u16::from(buf[4]) << 8;
        let width = u16::from(buf[5]) | u16::from(buf[6]) << 8;
        let height = u16::from(buf[7]) | u16::from(buf[8]) << 8;
        let mut desc = ImageDesc::default()
            .with_left(left)
            .with_top(top)
            .with_width(width)
            .with_height(height);
        desc.set_flags(buf[9]);
        Ok(desc)
    }
}

impl ImageData {
    /// Decode the start of an image data block from a buffer
    fn from_buf(image_sz: usize, buf: &[u8]) -> Result<Self> {
        debug_assert_eq!(buf.len(), BlockCode::ImageData_.size());
        if buf[0] > 11 {
            return Err(Error::InvalidLzwData);
        }
        let mut data = ImageData::new(image_sz);
        data.set_min_code_size(buf[0]);
        Ok(data)
    }
}

/// An iterator over every [Frame](block/struct.Frame.html) in a GIF file.
///
/// Created with Decoder.[into_frames](struct.Decoder.html#method.into_frames).
pub struct Frames<R: Read> {
    /// Block iterator
    blocks: Blocks<R>,
    /// Preamble under construction
    preamble: Option<Preamble>,
    /// Graphic control for the next frame
    graphic_control_ext: Option<GraphicControl>,
    /// Image descriptor for the next frame
    image_desc: Option<ImageDesc>,
    /// Local color table for the next frame
    local_color_table: Option<ColorTable>,
}

impl<R: Read> Iterator for Frames<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(block) = self.blocks.next() {
            match block {
                Ok(b) => match self.handle_block(b) {
                    Ok(Some(f)) => return Some(Ok(f)),
                    Ok(None) => {} // need more blocks
                    Err(e) => return Some(Err(e)),
                },
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

impl<R: Read> Frames<R> {
    /// Create a new frame iterator
    pub(crate) fn new(blocks: Blocks<R>) -> Self {
        Frames {
            blocks,
            preamble: None,
            graphic_control_ext: None,
            image_desc: None,
            local_color_table: None,
        }
    }

    /// Get the warnings accumulated so far
    pub fn warnings(&self) -> &[Warning] {
        self.blocks.warnings()
    }

    /// Read the preamble blocks.  These are the blocks before any frames.
    pub fn preamble(&mut self) -> Result<Option<Preamble>> {
        if self.has_frame() {
            return Ok(None);
        }
        self.preamble = Some(Preamble::default());
        while let Some(block) = self.blocks.next() {
            self.handle_block(block?)?;
            if self.has_frame() {
                break;
            }
        }
        Ok(self.preamble.take())
    }

    /// Check if any frame blocks have been seen
    fn has_frame(&self) -> bool {
        self.graphic_control_ext.is_some()
            || self.image_desc.is_some()
            || self.local_color_table.is_some()
    }

    /// Handle one block
    fn handle_block(&mut self, block: Block) -> Result<Option<Frame>> {
        match block {
            Block::Header(b) => {
                if let Some(f) = &mut self.preamble {
                    f.header = b;
                }
            }
            Block::LogicalScreenDesc(b) => {
                if let Some(f) = &mut self.preamble {
                    f.logical_screen_desc = b;
                }
            }
            Block::GlobalColorTable(b) => {
                if let Some(f) = &mut self.preamble {
                    f.global_color_table = Some(b);
                }
            }
            Block::Application(b) => {
                if let (Some(f), Some(_)) = (&mut self.preamble, b.loop_count())
                {
                    f.loop_count_ext = Some(b);
                }
            }
            Block::Comment(b) => {
                if let Some(f) = &mut self.preamble {
                    f.comments.push(b);
                }
            }
            Block::GraphicControl(b) => {
                if self.has_frame() {
                    return Err(Error::InvalidBlockSequence);
                }
                self.graphic_control_ext = Some(b);
            }
            Block::ImageDesc(b) => {
                if self.image_desc.is_some() {
                    return Err(Error::InvalidBlockSequence);
                }
                self.image_desc = Some(b);
            }
            Block::LocalColorTable(b) => {
                self.local_color_table = Some(b);
            }
            Block::ImageData(image_data) => {
                let graphic_control_ext = self.graphic_control_ext.take();
                let image_desc = self.image_desc.take();
                let local_color_table = self.local_color_table.take();
                match image_desc {
                    Some(image_desc) => {
                        return Ok(Some(Frame::new(
                            graphic_control_ext,
                            image_desc,
                            local_color_table,
                            image_data,
                        )));
                    }
                    None => return Err(Error::InvalidBlockSequence),
                }
            }
            _ => {}
        }
        Ok(None)
    }
}

/// An iterator over every [Step](struct.Step.html) in a GIF file.
///
/// Each step is a full composited raster of the logical screen, built from
/// the frames seen so far using their disposal methods.
///
/// Created with Decoder.[into_steps](struct.Decoder.html#method.into_steps).
pub struct Steps<R: Read> {
    /// Frame iterator
    frames: Frames<R>,
    /// Logical screen dimensions, once the preamble has been read
    screen: Option<(u32, u32)>,
    /// Global color table, if present
    global_tbl: Option<ColorTable>,
    /// Running composite canvas (scratch state between frames)
    composite: Option<Raster<SRgba8>>,
}

impl<R: Read> Iterator for Steps<R> {
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.screen.is_none() {
            match self.frames.preamble() {
                Ok(Some(p)) => {
                    self.screen = Some((
                        p.screen_width().into(),
                        p.screen_height().into(),
                    ));
                    self.global_tbl = p.global_color_table;
                }
                Ok(None) => self.screen = Some((0, 0)),
                Err(e) => return Some(Err(e)),
            }
        }
        // leftover composite is dropped when frames run out
        match self.frames.next()? {
            Ok(frame) => Some(self.step(&frame)),
            Err(e) => Some(Err(e)),
        }
    }
}

impl<R: Read> Steps<R> {
    /// Create a new step iterator
    pub(crate) fn new(frames: Frames<R>) -> Self {
        Steps {
            frames,
            screen: None,
            global_tbl: None,
            composite: None,
        }
    }

    /// Get the warnings accumulated so far
    pub fn warnings(&self) -> &[Warning] {
        self.frames.warnings()
    }

    /// Composite one frame into a step
    fn step(&mut self, frame: &Frame) -> Result<Step> {
        let (sw, sh) = self.screen.unwrap_or((0, 0));
        let left = u32::from(frame.image_desc.left());
        let top = u32::from(frame.image_desc.top());
        let width = u32::from(frame.image_desc.width());
        let height = u32::from(frame.image_desc.height());
        if left + width > sw || top + height > sh {
            return Err(Error::InvalidFrameDimensions);
        }
        let tbl = frame
            .local_color_table
            .as_ref()
            .or_else(|| self.global_tbl.as_ref())
            .ok_or(Error::MissingColorTable)?;
        let mut sub_image = Raster::with_clear(sw, sh);
        let has_mask = write_frame_pixels(&mut sub_image, frame, tbl)?;
        let delay_time_cs = normalize_delay(&frame.graphic_control_ext);
        let (shown, composited) = self.dispose(frame, sub_image);
        Ok(Step {
            raster: StepRaster::TrueColor(shown),
            delay_time_cs,
            transparent_color: frame.transparent_color(),
            has_mask,
            composited,
        })
    }

    /// Apply the frame's disposal method.
    ///
    /// Returns the raster to show, along with its composited flag.  The
    /// shown raster and the retained scratch canvas are never the same
    /// allocation.
    fn dispose(
        &mut self,
        frame: &Frame,
        sub_image: Raster<SRgba8>,
    ) -> (Raster<SRgba8>, bool) {
        use crate::block::DisposalMethod::*;
        match frame.disposal_method() {
            NoAction | Keep => {
                let mut canvas = self.take_composite(&sub_image);
                blend_over(&mut canvas, &sub_image);
                self.composite = Some(Raster::with_raster(&canvas));
                (canvas, true)
            }
            Background => {
                let mut canvas = self.take_composite(&sub_image);
                blend_over(&mut canvas, &sub_image);
                let mut next = Raster::with_raster(&canvas);
                blank_region(
                    &mut next,
                    frame.image_desc.left().into(),
                    frame.image_desc.top().into(),
                    frame.image_desc.width().into(),
                    frame.image_desc.height().into(),
                );
                self.composite = Some(next);
                (canvas, true)
            }
            Previous => {
                let mut canvas = self.take_composite(&sub_image);
                let next = Raster::with_raster(&canvas);
                blend_over(&mut canvas, &sub_image);
                self.composite = Some(next);
                (canvas, true)
            }
            Reserved(_) => {
                // reserved methods pass the frame through untouched
                (sub_image, false)
            }
        }
    }

    /// Take the running composite, or start a fresh transparent canvas
    fn take_composite(&mut self, sub_image: &Raster<SRgba8>) -> Raster<SRgba8> {
        match self.composite.take() {
            Some(canvas) => canvas,
            None => Raster::with_clear(sub_image.width(), sub_image.height()),
        }
    }
}

/// Write a frame's color indices into a logical screen raster.
///
/// Rows are unraveled from interlaced order when flagged.  Indices equal
/// to the transparent color keep the cleared (alpha zero) pixel.
///
/// Returns true when the frame contains a transparency mask.
fn write_frame_pixels(
    raster: &mut Raster<SRgba8>,
    frame: &Frame,
    tbl: &ColorTable,
) -> Result<bool> {
    let width = usize::from(frame.image_desc.width());
    let height = u32::from(frame.image_desc.height());
    let left = usize::from(frame.image_desc.left());
    let top = usize::from(frame.image_desc.top());
    let interlaced = frame.image_desc.interlaced();
    let transparent = frame.transparent_color();
    let data = frame.image_data.data();
    let screen_width = raster.width() as usize;
    let pixels = raster.pixels_mut();
    let mut has_mask = false;
    for (row, y) in InterlaceRows::new(height, interlaced).enumerate() {
        let start = row * width;
        if start >= data.len() {
            // truncated image data; remaining rows stay transparent
            break;
        }
        let end = (start + width).min(data.len());
        let base = (top + y as usize) * screen_width + left;
        for (x, idx) in data[start..end].iter().enumerate() {
            if Some(*idx) == transparent {
                has_mask = true;
                continue;
            }
            let (r, g, b) = tbl
                .entry(usize::from(*idx))
                .ok_or(Error::InvalidColorIndex)?;
            pixels[base + x] = SRgba8::new(r, g, b, 255);
        }
    }
    Ok(has_mask)
}

/// Convert a stored delay to centiseconds.
///
/// A zero delay is normalized to one second, so animations never have
/// zero-duration steps.
fn normalize_delay(gce: &Option<GraphicControl>) -> u16 {
    let delay = gce.map(|g| g.delay_time()).unwrap_or(0);
    let cs = u32::from(delay) * 10;
    if cs == 0 {
        100
    } else {
        cs.min(u32::from(u16::MAX)) as u16
    }
}

/// Blend a frame over a composite canvas, in place.
///
/// GIF transparency is binary, so source pixels are either fully opaque
/// or fully clear.
fn blend_over(dst: &mut Raster<SRgba8>, src: &Raster<SRgba8>) {
    for (d, s) in dst.pixels_mut().iter_mut().zip(src.pixels()) {
        if u8::from(Pixel::alpha(*s)) != 0 {
            *d = *s;
        }
    }
}

/// Blank a rectangular region to fully transparent
fn blank_region(
    raster: &mut Raster<SRgba8>,
    left: usize,
    top: usize,
    width: usize,
    height: usize,
) {
    let screen_width = raster.width() as usize;
    let pixels = raster.pixels_mut();
    for y in top..top + height {
        let base = y * screen_width + left;
        for p in &mut pixels[base..base + width] {
            *p = SRgba8::default();
        }
    }
}

/// Iterator of destination rows for a frame, in stream order
struct InterlaceRows {
    /// Number of rows in the frame
    height: u32,
    /// Rows are interlaced
    interlaced: bool,
    /// Current interlace pass
    pass: usize,
    /// Next destination row
    y: u32,
}

impl InterlaceRows {
    /// Create a new row iterator
    fn new(height: u32, interlaced: bool) -> Self {
        InterlaceRows {
            height,
            interlaced,
            pass: 0,
            y: 0,
        }
    }
}

impl Iterator for InterlaceRows {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if !self.interlaced {
            if self.y < self.height {
                let y = self.y;
                self.y += 1;
                return Some(y);
            }
            return None;
        }
        while self.pass < INTERLACE_PASS.len() {
            let (_, step) = INTERLACE_PASS[self.pass];
            if self.y < self.height {
                let y = self.y;
                self.y += step;
                return Some(y);
            }
            self.pass += 1;
            if self.pass < INTERLACE_PASS.len() {
                self.y = INTERLACE_PASS[self.pass].0;
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::private::{Decoder, Encoder};

    #[test]
    fn interlace_rows() {
        let rows: Vec<u32> = InterlaceRows::new(8, true).collect();
        assert_eq!(rows, [0, 4, 2, 6, 1, 3, 5, 7]);
        let rows: Vec<u32> = InterlaceRows::new(9, true).collect();
        assert_eq!(rows, [0, 8, 4, 2, 6, 1, 3, 5, 7]);
        let rows: Vec<u32> = InterlaceRows::new(1, true).collect();
        assert_eq!(rows, [0]);
        let rows: Vec<u32> = InterlaceRows::new(3, false).collect();
        assert_eq!(rows, [0, 1, 2]);
    }

    #[test]
    fn simple_1() -> crate::error::Result<()> {
        let gif = [
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00, 0x0A, 0x00, 0x91,
            0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF,
            0x00, 0x00, 0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x2C, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x0A, 0x00, 0x00, 0x02,
            0x16, 0x8C, 0x2D, 0x99, 0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02,
            0x75, 0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C,
            0x01, 0x00, 0x3B,
        ];
        let image = [
            1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
            1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
            1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
            1, 1, 1, 0, 0, 0, 0, 2, 2, 2, //
            1, 1, 1, 0, 0, 0, 0, 2, 2, 2, //
            2, 2, 2, 0, 0, 0, 0, 1, 1, 1, //
            2, 2, 2, 0, 0, 0, 0, 1, 1, 1, //
            2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
            2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
            2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
        ];
        for f in Decoder::new(&gif[..]).into_frames() {
            assert_eq!(f?.image_data.data(), &image[..]);
        }
        Ok(())
    }

    #[test]
    fn simple_1_steps() -> crate::error::Result<()> {
        let gif = [
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00, 0x0A, 0x00, 0x91,
            0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF,
            0x00, 0x00, 0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x2C, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x0A, 0x00, 0x00, 0x02,
            0x16, 0x8C, 0x2D, 0x99, 0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02,
            0x75, 0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C,
            0x01, 0x00, 0x3B,
        ];
        let mut steps = Decoder::new(&gif[..]).into_steps();
        let step = steps.next().unwrap()?;
        let raster = step.raster().unwrap();
        assert_eq!(raster.width(), 10);
        assert_eq!(raster.height(), 10);
        // palette: 0 = white, 1 = red, 2 = blue
        assert_eq!(raster.pixel(0, 0), SRgba8::new(255, 0, 0, 255));
        assert_eq!(raster.pixel(5, 0), SRgba8::new(0, 0, 255, 255));
        assert_eq!(raster.pixel(4, 4), SRgba8::new(255, 255, 255, 255));
        // zero delay is normalized to one second
        assert_eq!(step.delay_time_cs(), 100);
        assert!(steps.next().is_none());
        assert!(steps.warnings().is_empty());
        Ok(())
    }

    #[test]
    fn bad_header() {
        let gif = b"JIF89a\x01\x00\x01\x00\x00\x00\x00;";
        let mut blocks = Decoder::new(&gif[..]).into_blocks();
        assert!(matches!(
            blocks.next(),
            Some(Err(Error::MalformedHeader))
        ));
        assert!(blocks.next().is_none());
    }

    #[test]
    fn interlaced_rows_unraveled() -> crate::error::Result<()> {
        let mut buf = Vec::new();
        {
            let mut enc = Encoder::new(&mut buf).into_block_enc();
            let mut colors = Vec::new();
            for i in 0..8u8 {
                colors.extend_from_slice(&[i * 30, 0, 0]);
            }
            let tbl = ColorTable::with_colors(&colors);
            enc.encode(Header::default())?;
            enc.encode(
                LogicalScreenDesc::default()
                    .with_screen_width(8)
                    .with_screen_height(8)
                    .with_color_table(&tbl),
            )?;
            enc.encode(Block::GlobalColorTable(tbl))?;
            enc.encode(
                ImageDesc::default()
                    .with_width(8)
                    .with_height(8)
                    .with_interlaced(true),
            )?;
            let mut data = ImageData::new(64);
            data.set_min_code_size(3);
            // rows in stream order, each filled with its destination row
            for y in &[0u8, 4, 2, 6, 1, 3, 5, 7] {
                data.add_data(&[*y; 8]);
            }
            enc.encode(data)?;
            enc.encode(Trailer::default())?;
        }
        let mut steps = Decoder::new(&buf[..]).into_steps();
        let step = steps.next().unwrap()?;
        let raster = step.raster().unwrap();
        for y in 0..8 {
            let red = (y as u8) * 30;
            assert_eq!(raster.pixel(0, y), SRgba8::new(red, 0, 0, 255));
            assert_eq!(raster.pixel(7, y), SRgba8::new(red, 0, 0, 255));
        }
        Ok(())
    }

    #[test]
    fn disposal_methods() -> crate::error::Result<()> {
        let mut buf = Vec::new();
        {
            let mut enc = Encoder::new(&mut buf).into_block_enc();
            // 0 black, 1 red, 2 green, 3 blue
            let tbl = ColorTable::with_colors(&[
                0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255,
            ]);
            enc.encode(Header::default())?;
            enc.encode(
                LogicalScreenDesc::default()
                    .with_screen_width(4)
                    .with_screen_height(4)
                    .with_color_table(&tbl),
            )?;
            enc.encode(Block::GlobalColorTable(tbl))?;
            // frame 0: full red, kept in place
            let mut control = GraphicControl::default();
            control.set_disposal_method(DisposalMethod::Keep);
            enc.encode(control)?;
            enc.encode(ImageDesc::default().with_width(4).with_height(4))?;
            let mut data = ImageData::new(16);
            data.add_data(&[1; 16]);
            enc.encode(data)?;
            // frame 1: green 2x2 at (1,1), region restored to background
            let mut control = GraphicControl::default();
            control.set_disposal_method(DisposalMethod::Background);
            enc.encode(control)?;
            enc.encode(
                ImageDesc::default()
                    .with_left(1)
                    .with_top(1)
                    .with_width(2)
                    .with_height(2),
            )?;
            let mut data = ImageData::new(4);
            data.add_data(&[2; 4]);
            enc.encode(data)?;
            // frame 2: blue 2x2 at (0,0), canvas restored to previous
            let mut control = GraphicControl::default();
            control.set_disposal_method(DisposalMethod::Previous);
            enc.encode(control)?;
            enc.encode(ImageDesc::default().with_width(2).with_height(2))?;
            let mut data = ImageData::new(4);
            data.add_data(&[3; 4]);
            enc.encode(data)?;
            // frame 3: red dot at (3,3)
            enc.encode(
                ImageDesc::default()
                    .with_left(3)
                    .with_top(3)
                    .with_width(1)
                    .with_height(1),
            )?;
            let mut data = ImageData::new(1);
            data.add_data(&[1]);
            enc.encode(data)?;
            enc.encode(Trailer::default())?;
        }
        let red = SRgba8::new(255, 0, 0, 255);
        let green = SRgba8::new(0, 255, 0, 255);
        let blue = SRgba8::new(0, 0, 255, 255);
        let mut steps = Decoder::new(&buf[..]).into_steps();
        let s0 = steps.next().unwrap()?;
        let r0 = s0.raster().unwrap();
        assert!(s0.is_composited());
        assert_eq!(r0.pixel(0, 0), red);
        assert_eq!(r0.pixel(3, 3), red);
        let s1 = steps.next().unwrap()?;
        let r1 = s1.raster().unwrap();
        // the shown raster keeps the green square; only the next canvas
        // has the region blanked
        assert_eq!(r1.pixel(1, 1), green);
        assert_eq!(r1.pixel(2, 2), green);
        assert_eq!(r1.pixel(0, 0), red);
        let s2 = steps.next().unwrap()?;
        let r2 = s2.raster().unwrap();
        assert_eq!(r2.pixel(0, 0), blue);
        assert_eq!(r2.pixel(1, 1), blue);
        // blanked by frame 1's disposal, not covered by the blue square
        assert_eq!(u8::from(Pixel::alpha(r2.pixel(2, 2))), 0);
        assert_eq!(u8::from(Pixel::alpha(r2.pixel(1, 2))), 0);
        assert_eq!(r2.pixel(3, 3), red);
        let s3 = steps.next().unwrap()?;
        let r3 = s3.raster().unwrap();
        // frame 2's blue square was dropped when restoring to previous
        assert_eq!(r3.pixel(0, 0), red);
        assert_eq!(u8::from(Pixel::alpha(r3.pixel(1, 1))), 0);
        assert_eq!(r3.pixel(3, 3), red);
        assert!(steps.next().is_none());
        Ok(())
    }

    #[test]
    fn truncated_image_warns() -> crate::error::Result<()> {
        let mut buf = Vec::new();
        {
            let mut enc = Encoder::new(&mut buf).into_block_enc();
            let tbl = ColorTable::with_colors(&[0, 0, 0, 255, 0, 0]);
            enc.encode(Header::default())?;
            enc.encode(
                LogicalScreenDesc::default()
                    .with_screen_width(4)
                    .with_screen_height(4)
                    .with_color_table(&tbl),
            )?;
            enc.encode(Block::GlobalColorTable(tbl))?;
            enc.encode(ImageDesc::default().with_width(4).with_height(4))?;
            // only half the pixels are present
            let mut data = ImageData::new(16);
            data.add_data(&[1; 8]);
            enc.encode(data)?;
            enc.encode(Trailer::default())?;
        }
        let mut steps = Decoder::new(&buf[..]).into_steps();
        let step = steps.next().unwrap()?;
        let raster = step.raster().unwrap();
        assert_eq!(raster.pixel(0, 0), SRgba8::new(255, 0, 0, 255));
        // rows past the truncation stay transparent
        assert_eq!(u8::from(Pixel::alpha(raster.pixel(0, 3))), 0);
        assert!(steps.next().is_none());
        assert_eq!(steps.warnings(), &[Warning::TruncatedImageData]);
        Ok(())
    }

    #[test]
    fn missing_block_terminator() -> crate::error::Result<()> {
        let mut buf = Vec::new();
        {
            let mut enc = Encoder::new(&mut buf).into_step_enc();
            let mut raster = Raster::<SRgba8>::with_clear(2, 2);
            for p in raster.pixels_mut() {
                *p = SRgba8::new(255, 0, 0, 255);
            }
            enc.encode_step(&Step::with_true_color(raster))?;
        }
        // cut off the block terminator and trailer
        assert_eq!(buf.pop(), Some(b';'));
        assert_eq!(buf.pop(), Some(0));
        let mut steps = Decoder::new(&buf[..]).into_steps();
        let step = steps.next().unwrap()?;
        let raster = step.raster().unwrap();
        assert_eq!(raster.pixel(0, 0), SRgba8::new(255, 0, 0, 255));
        assert_eq!(raster.pixel(1, 1), SRgba8::new(255, 0, 0, 255));
        assert!(steps.next().is_none());
        assert_eq!(steps.warnings(), &[Warning::TruncatedImageData]);
        Ok(())
    }

    #[test]
    fn unknown_extension_warns() -> crate::error::Result<()> {
        let mut buf = Vec::new();
        {
            let mut enc = Encoder::new(&mut buf).into_block_enc();
            enc.encode(Header::default())?;
            enc.encode(
                LogicalScreenDesc::default()
                    .with_screen_width(1)
                    .with_screen_height(1),
            )?;
            let mut ext = Unknown::default();
            ext.add_sub_block(&[0xAB]);
            ext.add_sub_block(b"mystery");
            enc.encode(ext)?;
            enc.encode(Trailer::default())?;
        }
        let mut blocks = Decoder::new(&buf[..]).into_blocks();
        assert!(matches!(blocks.next(), Some(Ok(Block::Header(_)))));
        assert!(matches!(
            blocks.next(),
            Some(Ok(Block::LogicalScreenDesc(_)))
        ));
        assert!(matches!(blocks.next(), Some(Ok(Block::Unknown(_)))));
        assert!(matches!(blocks.next(), Some(Ok(Block::Trailer(_)))));
        assert!(blocks.next().is_none());
        assert_eq!(blocks.warnings(), &[Warning::UnknownExtension(0xAB)]);
        Ok(())
    }

    #[test]
    fn truncated_file() {
        let gif = b"GIF89a\x04\x00";
        let mut blocks = Decoder::new(&gif[..]).into_blocks();
        assert!(matches!(blocks.next(), Some(Ok(Block::Header(_)))));
        assert!(matches!(
            blocks.next(),
            Some(Err(Error::UnexpectedEndOfFile))
        ));
    }
}
