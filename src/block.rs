// block.rs
//
// Copyright (c) 2019-2026  Douglas Lau
//
//! GIF container blocks
//!
//! Every block of the GIF format is modeled as its own type, with flag
//! bytes decomposed into typed fields at parse time.

/// Channels per color table entry (RGB)
pub(crate) const CHANNELS: usize = 3;

/// Method to dispose of a frame before rendering the next one
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisposalMethod {
    /// Disposal not specified (treated as `Keep`)
    NoAction,
    /// Leave the frame in place
    Keep,
    /// Restore the frame region to the background
    Background,
    /// Restore to the state before the frame was drawn
    Previous,
    /// Reserved for future versions of the format
    Reserved(u8),
}

impl Default for DisposalMethod {
    fn default() -> Self {
        DisposalMethod::Keep
    }
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        use self::DisposalMethod::*;
        match n & 0b0111 {
            0 => NoAction,
            1 => Keep,
            2 => Background,
            3 => Previous,
            _ => Reserved(n & 0b0111),
        }
    }
}

impl From<DisposalMethod> for u8 {
    fn from(d: DisposalMethod) -> Self {
        use self::DisposalMethod::*;
        match d {
            NoAction => 0,
            Keep => 1,
            Background => 2,
            Previous => 3,
            Reserved(n) => n & 0b0111,
        }
    }
}

/// Block type codes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockCode {
    Header_,
    LogicalScreenDesc_,
    GlobalColorTable_,
    Extension_,
    ImageDesc_,
    LocalColorTable_,
    ImageData_,
    Trailer_,
}

impl BlockCode {
    /// Lookup a block code from a separator byte
    pub fn from_u8(t: u8) -> Option<Self> {
        use self::BlockCode::*;
        match t {
            b',' => Some(ImageDesc_), // (0x2C) Image separator
            b'!' => Some(Extension_), // (0x21) Extension introducer
            b';' => Some(Trailer_),   // (0x3B) GIF trailer
            _ => None,
        }
    }

    /// Get the block signature bytes
    pub fn signature(self) -> &'static [u8] {
        use self::BlockCode::*;
        match self {
            ImageDesc_ => b",",
            Extension_ => b"!",
            Trailer_ => b";",
            _ => &[],
        }
    }

    /// Get the fixed block size, including the signature
    pub fn size(self) -> usize {
        use self::BlockCode::*;
        match self {
            Header_ => 6,
            LogicalScreenDesc_ => 7,
            ImageDesc_ => 10,
            Trailer_ => 1,
            Extension_ => 2, // +sub-blocks
            ImageData_ => 1, // +sub-blocks
            _ => 0,
        }
    }
}

/// Extension type codes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionCode {
    PlainText_,
    GraphicControl_,
    Comment_,
    Application_,
    Unknown_(u8),
}

impl From<u8> for ExtensionCode {
    fn from(n: u8) -> Self {
        use self::ExtensionCode::*;
        match n {
            0x01 => PlainText_,
            0xF9 => GraphicControl_,
            0xFE => Comment_,
            0xFF => Application_,
            _ => Unknown_(n),
        }
    }
}

impl From<ExtensionCode> for u8 {
    fn from(t: ExtensionCode) -> Self {
        use self::ExtensionCode::*;
        match t {
            PlainText_ => 0x01,
            GraphicControl_ => 0xF9,
            Comment_ => 0xFE,
            Application_ => 0xFF,
            Unknown_(n) => n,
        }
    }
}

/// Header block (first in file)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Version bytes: `87a` or `89a`
    version: [u8; 3],
}

impl Default for Header {
    fn default() -> Self {
        Header { version: *b"89a" }
    }
}

impl Header {
    /// Create a header with a specific version
    pub fn with_version(version: [u8; 3]) -> Self {
        Header { version }
    }

    /// Get the version bytes
    pub fn version(&self) -> [u8; 3] {
        self.version
    }
}

/// Color table (global or local)
///
/// An ordered list of up to 256 RGB triples; the on-disk size is always a
/// power of two between 2 and 256.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTable {
    /// RGB color components
    colors: Vec<u8>,
    /// Colors are sorted by decreasing importance
    sorted: bool,
}

impl ColorTable {
    /// Create a color table from raw RGB components
    pub fn with_colors(colors: &[u8]) -> Self {
        assert_eq!(colors.len() % CHANNELS, 0);
        ColorTable {
            colors: colors.to_vec(),
            sorted: false,
        }
    }

    /// Get the number of color entries
    pub fn len(&self) -> usize {
        self.colors.len() / CHANNELS
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get the raw RGB components
    pub fn colors(&self) -> &[u8] {
        &self.colors
    }

    /// Get one entry as an RGB triple
    pub fn entry(&self, i: usize) -> Option<(u8, u8, u8)> {
        let j = i * CHANNELS;
        if j + 2 < self.colors.len() {
            Some((self.colors[j], self.colors[j + 1], self.colors[j + 2]))
        } else {
            None
        }
    }

    /// Get the sorted flag
    pub fn sorted(&self) -> bool {
        self.sorted
    }

    /// Get the on-disk entry count (next power of two, 2..=256)
    pub fn disk_len(&self) -> usize {
        self.len().max(2).next_power_of_two().min(256)
    }

    /// Get the table size exponent field (on-disk size = `2^(n+1)`)
    pub fn len_bits(&self) -> u8 {
        let sz = self.disk_len();
        for b in 0..7 {
            if (sz >> (b + 1)) == 1 {
                return b;
            }
        }
        7
    }

    /// Pad the raw components out to the on-disk size
    pub(crate) fn padded_colors(&self) -> Vec<u8> {
        let mut colors = self.colors.clone();
        colors.resize(self.disk_len() * CHANNELS, 0);
        colors
    }
}

/// Logical screen descriptor block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalScreenDesc {
    /// Width of the logical screen
    screen_width: u16,
    /// Height of the logical screen
    screen_height: u16,
    /// Global color table entry count (zero when absent)
    table_len: usize,
    /// Color resolution field (bits per primary, minus one)
    color_resolution: u8,
    /// Global color table sorted flag
    sorted: bool,
    /// Index into the global color table
    background_color_idx: u8,
    /// Pixel aspect ratio field
    pixel_aspect_ratio: u8,
}

impl LogicalScreenDesc {
    const TABLE_PRESENT: u8 = 0b1000_0000;
    const COLOR_RESOLUTION: u8 = 0b0111_0000;
    const TABLE_SORTED: u8 = 0b0000_1000;
    const TABLE_SIZE: u8 = 0b0000_0111;

    /// Adjust the screen width
    pub fn with_screen_width(mut self, screen_width: u16) -> Self {
        self.screen_width = screen_width;
        self
    }

    /// Get the screen width
    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }

    /// Adjust the screen height
    pub fn with_screen_height(mut self, screen_height: u16) -> Self {
        self.screen_height = screen_height;
        self
    }

    /// Get the screen height
    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }

    /// Adjust the global color table size
    pub fn with_table_len(mut self, table_len: usize) -> Self {
        self.table_len = table_len;
        self
    }

    /// Get the global color table entry count (zero when absent)
    pub fn table_len(&self) -> usize {
        self.table_len
    }

    /// Adjust the background color index
    pub fn with_background_color_idx(mut self, idx: u8) -> Self {
        self.background_color_idx = idx;
        self
    }

    /// Get the background color index
    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }

    /// Adjust the pixel aspect ratio field
    pub fn with_pixel_aspect_ratio(mut self, ratio: u8) -> Self {
        self.pixel_aspect_ratio = ratio;
        self
    }

    /// Get the pixel aspect ratio field
    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }

    /// Get the color resolution (bits per primary)
    pub fn color_resolution(&self) -> u8 {
        self.color_resolution + 1
    }

    /// Decompose a flags byte
    pub(crate) fn set_flags(&mut self, flags: u8) {
        self.table_len = if flags & Self::TABLE_PRESENT != 0 {
            2 << usize::from(flags & Self::TABLE_SIZE)
        } else {
            0
        };
        self.color_resolution = (flags & Self::COLOR_RESOLUTION) >> 4;
        self.sorted = flags & Self::TABLE_SORTED != 0;
    }

    /// Compose the flags byte
    pub(crate) fn flags(&self) -> u8 {
        let mut flags = (self.color_resolution << 4) & Self::COLOR_RESOLUTION;
        if self.table_len > 0 {
            flags |= Self::TABLE_PRESENT;
            flags |= table_len_bits(self.table_len) & Self::TABLE_SIZE;
        }
        if self.sorted {
            flags |= Self::TABLE_SORTED;
        }
        flags
    }

    /// Size the descriptor for a global color table
    pub fn with_color_table(self, table: &ColorTable) -> Self {
        let bits = table.len_bits();
        let mut desc = self.with_table_len(table.disk_len());
        desc.color_resolution = bits;
        desc
    }

    /// Get the global color table size in bytes
    pub(crate) fn table_size_bytes(&self) -> usize {
        self.table_len * CHANNELS
    }
}

/// Get the size exponent for a color table entry count
fn table_len_bits(len: usize) -> u8 {
    let sz = len.max(2).next_power_of_two().min(256);
    for b in 0..7 {
        if (sz >> (b + 1)) == 1 {
            return b;
        }
    }
    7
}

/// Graphic control extension block
///
/// Carries the disposal / transparency / timing metadata for the one
/// image which follows it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphicControl {
    /// Disposal method for the frame
    disposal_method: DisposalMethod,
    /// User input requested flag
    user_input: bool,
    /// Transparent color index, if any
    transparent_color: Option<u8>,
    /// Frame delay, in the file's stored units
    delay_time: u16,
}

impl GraphicControl {
    const DISPOSAL_METHOD: u8 = 0b0001_1100;
    const USER_INPUT: u8 = 0b0000_0010;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    /// Get the disposal method
    pub fn disposal_method(&self) -> DisposalMethod {
        self.disposal_method
    }

    /// Set the disposal method
    pub fn set_disposal_method(&mut self, disposal_method: DisposalMethod) {
        self.disposal_method = disposal_method;
    }

    /// Get the user input flag
    pub fn user_input(&self) -> bool {
        self.user_input
    }

    /// Set the user input flag
    pub fn set_user_input(&mut self, user_input: bool) {
        self.user_input = user_input;
    }

    /// Get the transparent color index, if any
    pub fn transparent_color(&self) -> Option<u8> {
        self.transparent_color
    }

    /// Set the transparent color index
    pub fn set_transparent_color(&mut self, transparent_color: Option<u8>) {
        self.transparent_color = transparent_color;
    }

    /// Get the stored frame delay (file units)
    pub fn delay_time(&self) -> u16 {
        self.delay_time
    }

    /// Set the stored frame delay (file units)
    pub fn set_delay_time(&mut self, delay_time: u16) {
        self.delay_time = delay_time;
    }

    /// Decompose a flags byte plus transparent index
    pub(crate) fn set_flags(&mut self, flags: u8, transparent_idx: u8) {
        self.disposal_method =
            DisposalMethod::from((flags & Self::DISPOSAL_METHOD) >> 2);
        self.user_input = flags & Self::USER_INPUT != 0;
        self.transparent_color = if flags & Self::TRANSPARENT_COLOR != 0 {
            Some(transparent_idx)
        } else {
            None
        };
    }

    /// Compose the flags byte
    pub(crate) fn flags(&self) -> u8 {
        let mut flags = u8::from(self.disposal_method) << 2;
        if self.user_input {
            flags |= Self::USER_INPUT;
        }
        if self.transparent_color.is_some() {
            flags |= Self::TRANSPARENT_COLOR;
        }
        flags
    }
}

/// Comment extension block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    /// Sequence of comment sub-blocks (ASCII recommended)
    comments: Vec<Vec<u8>>,
}

impl Comment {
    /// Add a comment sub-block
    pub fn add_comment(&mut self, b: &[u8]) {
        assert!(b.len() < 256);
        self.comments.push(b.to_vec());
    }

    /// Get the comment sub-blocks
    pub fn comments(&self) -> &[Vec<u8>] {
        &self.comments
    }
}

/// Plain text extension block (rarely used)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainText {
    /// Sequence of sub-blocks
    sub_blocks: Vec<Vec<u8>>,
}

impl PlainText {
    /// Add a sub-block
    pub fn add_sub_block(&mut self, b: &[u8]) {
        assert!(b.len() < 256);
        self.sub_blocks.push(b.to_vec());
    }

    /// Get the sub-blocks
    pub fn sub_blocks(&self) -> &[Vec<u8>] {
        &self.sub_blocks
    }
}

/// Application extension block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Application {
    /// Sequence of sub-blocks (first is the application ID)
    app_data: Vec<Vec<u8>>,
}

impl Application {
    /// Check for a looping animation application ID
    fn is_looping(app_id: &[u8]) -> bool {
        app_id == b"NETSCAPE2.0" || app_id == b"ANIMEXTS1.0"
    }

    /// Create a looping animation extension.
    ///
    /// A `loop_count` of zero means loop forever.
    pub fn with_loop_count(loop_count: u16) -> Self {
        let mut app_data = vec![];
        app_data.push(b"NETSCAPE2.0".to_vec());
        app_data.push(vec![1, loop_count as u8, (loop_count >> 8) as u8]);
        Application { app_data }
    }

    /// Add an application data sub-block
    pub fn add_app_data(&mut self, b: &[u8]) {
        assert!(b.len() < 256);
        self.app_data.push(b.to_vec());
    }

    /// Get the application data sub-blocks
    pub fn app_data(&self) -> &[Vec<u8>] {
        &self.app_data
    }

    /// Get the animation loop count, if this is a looping extension
    pub fn loop_count(&self) -> Option<u16> {
        let d = &self.app_data;
        let looping = d.len() == 2
            && Self::is_looping(&d[0])
            && d[1].len() == 3
            && d[1][0] == 1; // sub-block ID
        if looping {
            Some(u16::from(d[1][1]) | u16::from(d[1][2]) << 8)
        } else {
            None
        }
    }
}

/// Extension block of unknown type (skipped verbatim)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unknown {
    /// Sequence of sub-blocks (first holds the extension ID byte)
    sub_blocks: Vec<Vec<u8>>,
}

impl Unknown {
    /// Get the extension ID
    pub fn ext_id(&self) -> &[u8] {
        match self.sub_blocks.first() {
            Some(b) => b,
            None => &[],
        }
    }

    /// Add a sub-block
    pub fn add_sub_block(&mut self, b: &[u8]) {
        assert!(b.len() < 256);
        self.sub_blocks.push(b.to_vec());
    }

    /// Get the sub-blocks, not including the extension ID
    pub fn sub_blocks(&self) -> &[Vec<u8>] {
        if self.sub_blocks.is_empty() {
            &[]
        } else {
            &self.sub_blocks[1..]
        }
    }
}

/// Image descriptor block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDesc {
    /// Left position within the logical screen
    left: u16,
    /// Top position within the logical screen
    top: u16,
    /// Width of the image
    width: u16,
    /// Height of the image
    height: u16,
    /// Rows are stored in interlaced order
    interlaced: bool,
    /// Local color table entry count (zero when absent)
    table_len: usize,
    /// Local color table sorted flag
    sorted: bool,
}

impl ImageDesc {
    const TABLE_PRESENT: u8 = 0b1000_0000;
    const INTERLACED: u8 = 0b0100_0000;
    const TABLE_SORTED: u8 = 0b0010_0000;
    const TABLE_SIZE: u8 = 0b0000_0111;

    /// Adjust the left position
    pub fn with_left(mut self, left: u16) -> Self {
        self.left = left;
        self
    }

    /// Get the left position
    pub fn left(&self) -> u16 {
        self.left
    }

    /// Adjust the top position
    pub fn with_top(mut self, top: u16) -> Self {
        self.top = top;
        self
    }

    /// Get the top position
    pub fn top(&self) -> u16 {
        self.top
    }

    /// Adjust the width
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Get the width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Adjust the height
    pub fn with_height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }

    /// Get the height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Adjust the interlaced flag
    pub fn with_interlaced(mut self, interlaced: bool) -> Self {
        self.interlaced = interlaced;
        self
    }

    /// Get the interlaced flag
    pub fn interlaced(&self) -> bool {
        self.interlaced
    }

    /// Size the descriptor for a local color table
    pub fn with_color_table(mut self, table: &ColorTable) -> Self {
        self.table_len = table.disk_len();
        self.sorted = table.sorted();
        self
    }

    /// Get the local color table entry count (zero when absent)
    pub fn table_len(&self) -> usize {
        self.table_len
    }

    /// Decompose a flags byte
    pub(crate) fn set_flags(&mut self, flags: u8) {
        self.table_len = if flags & Self::TABLE_PRESENT != 0 {
            2 << usize::from(flags & Self::TABLE_SIZE)
        } else {
            0
        };
        self.interlaced = flags & Self::INTERLACED != 0;
        self.sorted = flags & Self::TABLE_SORTED != 0;
    }

    /// Compose the flags byte
    pub(crate) fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.table_len > 0 {
            flags |= Self::TABLE_PRESENT;
            flags |= table_len_bits(self.table_len) & Self::TABLE_SIZE;
        }
        if self.interlaced {
            flags |= Self::INTERLACED;
        }
        if self.sorted {
            flags |= Self::TABLE_SORTED;
        }
        flags
    }

    /// Get the image size in pixels
    pub fn image_sz(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Get the local color table size in bytes
    pub(crate) fn table_size_bytes(&self) -> usize {
        self.table_len * CHANNELS
    }
}

/// Image data block
///
/// Holds the decoded color indices on the read path, or the indices to be
/// compressed on the write path; the LZW layer sees only this buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// LZW minimum code size
    min_code_size: u8,
    /// Expected image size, in pixels
    image_sz: usize,
    /// Color indices, one per pixel
    data: Vec<u8>,
}

impl ImageData {
    /// Create a new image data block
    pub fn new(image_sz: usize) -> Self {
        ImageData {
            min_code_size: 2,
            image_sz,
            data: Vec::with_capacity(image_sz),
        }
    }

    /// Set the LZW minimum code size (clamped to 2..=11)
    pub(crate) fn set_min_code_size(&mut self, min_code_size: u8) {
        self.min_code_size = min_code_size.max(2).min(11);
    }

    /// Get the LZW minimum code size
    pub fn min_code_size(&self) -> u8 {
        self.min_code_size
    }

    /// Check if the data is complete
    pub fn is_complete(&self) -> bool {
        self.data.len() == self.image_sz
    }

    /// Get the number of missing pixels
    pub(crate) fn missing(&self) -> usize {
        self.image_sz.saturating_sub(self.data.len())
    }

    /// Add color index data.
    ///
    /// Returns the number of extra bytes which did not fit.
    pub fn add_data(&mut self, data: &[u8]) -> usize {
        let rem = self.image_sz - self.data.len();
        if data.len() <= rem {
            self.data.extend_from_slice(data);
            0
        } else {
            self.data.extend_from_slice(&data[..rem]);
            warn!("Extra image data: {} bytes", data.len() - rem);
            data.len() - rem
        }
    }

    /// Get the color index data
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Trailer block (last in file)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trailer {}

/// One block of a GIF file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Header(Header),
    LogicalScreenDesc(LogicalScreenDesc),
    GlobalColorTable(ColorTable),
    PlainText(PlainText),
    GraphicControl(GraphicControl),
    Comment(Comment),
    Application(Application),
    Unknown(Unknown),
    ImageDesc(ImageDesc),
    LocalColorTable(ColorTable),
    ImageData(ImageData),
    Trailer(Trailer),
}

impl Block {
    /// Check whether the block is followed by sub-blocks
    pub fn has_sub_blocks(&self) -> bool {
        use self::Block::*;
        matches!(
            self,
            PlainText(_)
                | GraphicControl(_)
                | Comment(_)
                | Application(_)
                | Unknown(_)
                | ImageData(_)
        )
    }
}

impl From<Header> for Block {
    fn from(b: Header) -> Self {
        Block::Header(b)
    }
}

impl From<LogicalScreenDesc> for Block {
    fn from(b: LogicalScreenDesc) -> Self {
        Block::LogicalScreenDesc(b)
    }
}

impl From<PlainText> for Block {
    fn from(b: PlainText) -> Self {
        Block::PlainText(b)
    }
}

impl From<GraphicControl> for Block {
    fn from(b: GraphicControl) -> Self {
        Block::GraphicControl(b)
    }
}

impl From<Comment> for Block {
    fn from(b: Comment) -> Self {
        Block::Comment(b)
    }
}

impl From<Application> for Block {
    fn from(b: Application) -> Self {
        Block::Application(b)
    }
}

impl From<Unknown> for Block {
    fn from(b: Unknown) -> Self {
        Block::Unknown(b)
    }
}

impl From<ImageDesc> for Block {
    fn from(b: ImageDesc) -> Self {
        Block::ImageDesc(b)
    }
}

impl From<ImageData> for Block {
    fn from(b: ImageData) -> Self {
        Block::ImageData(b)
    }
}

impl From<Trailer> for Block {
    fn from(b: Trailer) -> Self {
        Block::Trailer(b)
    }
}

/// Blocks at the start of a file, before any frames
#[derive(Debug, Default)]
pub struct Preamble {
    /// Header block
    pub header: Header,
    /// Logical screen descriptor block
    pub logical_screen_desc: LogicalScreenDesc,
    /// Global color table, if present
    pub global_color_table: Option<ColorTable>,
    /// Looping animation extension, if present
    pub loop_count_ext: Option<Application>,
    /// Comment blocks
    pub comments: Vec<Comment>,
}

impl Preamble {
    /// Get the logical screen width
    pub fn screen_width(&self) -> u16 {
        self.logical_screen_desc.screen_width()
    }

    /// Get the logical screen height
    pub fn screen_height(&self) -> u16 {
        self.logical_screen_desc.screen_height()
    }
}

/// All blocks of one frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Graphic control extension, if present
    pub graphic_control_ext: Option<GraphicControl>,
    /// Image descriptor block
    pub image_desc: ImageDesc,
    /// Local color table, if present
    pub local_color_table: Option<ColorTable>,
    /// Image data block
    pub image_data: ImageData,
}

impl Frame {
    /// Create a new frame
    pub fn new(
        graphic_control_ext: Option<GraphicControl>,
        image_desc: ImageDesc,
        local_color_table: Option<ColorTable>,
        image_data: ImageData,
    ) -> Self {
        Frame {
            graphic_control_ext,
            image_desc,
            local_color_table,
            image_data,
        }
    }

    /// Get the disposal method for the frame
    pub fn disposal_method(&self) -> DisposalMethod {
        match &self.graphic_control_ext {
            Some(gc) => gc.disposal_method(),
            None => DisposalMethod::NoAction,
        }
    }

    /// Get the transparent color index, if any
    pub fn transparent_color(&self) -> Option<u8> {
        self.graphic_control_ext.and_then(|gc| gc.transparent_color())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn color_table_len_bits() {
        for (len, bits) in &[
            (2, 0u8),
            (4, 1),
            (7, 2),
            (16, 3),
            (17, 4),
            (64, 5),
            (65, 6),
            (130, 7),
            (256, 7),
        ] {
            let colors = vec![0; len * CHANNELS];
            let t = ColorTable::with_colors(&colors);
            assert_eq!(t.len_bits(), *bits, "len {}", len);
        }
    }

    #[test]
    fn color_table_padding() {
        let t = ColorTable::with_colors(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.disk_len(), 4);
        assert_eq!(t.padded_colors().len(), 12);
        assert_eq!(t.entry(1), Some((4, 5, 6)));
        assert_eq!(t.entry(3), None);
    }

    #[test]
    fn screen_desc_flags() {
        let mut desc = LogicalScreenDesc::default();
        desc.set_flags(0b1001_0011);
        assert_eq!(desc.table_len(), 16);
        assert_eq!(desc.color_resolution(), 2);
        let flags = desc.flags();
        assert_eq!(flags, 0b1001_0011);
    }

    #[test]
    fn graphic_control_flags() {
        let mut gc = GraphicControl::default();
        gc.set_flags(0b0000_1101, 42);
        assert_eq!(gc.disposal_method(), DisposalMethod::Previous);
        assert_eq!(gc.transparent_color(), Some(42));
        assert!(!gc.user_input());
        assert_eq!(gc.flags(), 0b0000_1101);
        gc.set_transparent_color(None);
        assert_eq!(gc.flags(), 0b0000_1100);
    }

    #[test]
    fn loop_count() {
        let b = Application::default();
        assert_eq!(b.loop_count(), None);
        let b = Application::with_loop_count(0);
        assert_eq!(b.loop_count(), Some(0));
        let b = Application::with_loop_count(4);
        assert_eq!(b.loop_count(), Some(4));
    }
}
