// lzw.rs
//
// Copyright (c) 2020-2026  Douglas Lau
//
//! Lempel-Ziv-Welch compression for GIF
use crate::error::{Error, Result};

/// Maximum code bits allowed for GIF
const MAX_BITS: u8 = 12;

/// Number of entries in a full code table
const TABLE_SZ: usize = 1 << MAX_BITS;

/// Bound on back-reference chain walks (cycle guard)
const STACK_LIMIT: usize = 2 * TABLE_SZ;

/// Slots in the compressor hash dictionary
const HASH_SZ: usize = 5003;

/// Code type
type Code = u16;

/// LZW data decompressor
///
/// Codes are fed in as raw sub-block payload bytes; the bit accumulator
/// spans sub-block boundaries, since a single code may straddle them.
pub struct Decompressor {
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: u8,
    /// Prefix code for each table entry
    prefix: Vec<Code>,
    /// Trailing byte for each table entry
    suffix: Vec<u8>,
    /// Next unused table slot
    next_code: Code,
    /// Most recent code, once one has been read
    last: Option<Code>,
    /// First byte of the most recent expansion
    first_byte: u8,
    /// Pending output bytes, in reverse order
    stack: Vec<u8>,
    /// Bit accumulator
    acc: u32,
    /// Number of bits in accumulator
    n_bits: u8,
    /// End code has been read
    ended: bool,
}

/// LZW data compressor
///
/// The dictionary is an open-addressing hash table keyed by
/// `(prefix code, byte)`, probed with secondary displacement.
pub struct Compressor {
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: u8,
    /// Hash keys (packed prefix / byte pairs; negative when empty)
    keys: Vec<i32>,
    /// Assigned code for each occupied slot
    codes: Vec<Code>,
    /// Next unused code
    next_code: Code,
    /// Hash shift amount
    hshift: u32,
    /// Bit accumulator
    acc: u32,
    /// Number of bits in accumulator
    n_bits: u8,
}

impl Decompressor {
    /// Create a new decompressor
    pub fn new(min_code_size: u8) -> Self {
        let min_code_bits = min_code_size.max(2).min(MAX_BITS - 1);
        let mut dec = Decompressor {
            min_code_bits,
            code_bits: min_code_bits + 1,
            prefix: vec![0; TABLE_SZ],
            suffix: vec![0; TABLE_SZ],
            next_code: 0,
            last: None,
            first_byte: 0,
            stack: Vec::with_capacity(TABLE_SZ),
            acc: 0,
            n_bits: 0,
            ended: false,
        };
        dec.reset();
        dec
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Reset the code table (on clear code)
    fn reset(&mut self) {
        for code in 0..self.clear_code() {
            self.suffix[code as usize] = code as u8;
        }
        self.next_code = self.end_code() + 1;
        self.code_bits = self.min_code_bits + 1;
        self.last = None;
    }

    /// Check whether the end code has been read
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Decompress a byte buffer, appending decoded bytes to `out`
    pub fn decompress(&mut self, bytes: &[u8], out: &mut Vec<u8>) -> Result<()> {
        for &byte in bytes {
            if self.ended {
                break;
            }
            self.acc |= u32::from(byte) << self.n_bits;
            self.n_bits += 8;
            while self.n_bits >= self.code_bits {
                let code = (self.acc & ((1 << self.code_bits) - 1)) as Code;
                self.acc >>= self.code_bits;
                self.n_bits -= self.code_bits;
                self.step(code, out)?;
                if self.ended {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Process one code
    fn step(&mut self, code: Code, out: &mut Vec<u8>) -> Result<()> {
        if code == self.clear_code() {
            self.reset();
            return Ok(());
        }
        if code == self.end_code() {
            self.ended = true;
            return Ok(());
        }
        let last = match self.last {
            Some(last) => last,
            None => {
                // first code after a clear must be a direct entry
                if code >= self.clear_code() {
                    return Err(Error::InvalidLzwData);
                }
                self.first_byte = code as u8;
                self.last = Some(code);
                out.push(code as u8);
                return Ok(());
            }
        };
        if code > self.next_code {
            return Err(Error::InvalidLzwData);
        }
        let mut cur = code;
        if cur == self.next_code {
            // code not yet in table: previous code plus its first byte
            self.stack.push(self.first_byte);
            cur = last;
        }
        let mut steps = 0;
        while cur >= self.clear_code() {
            self.stack.push(self.suffix[cur as usize]);
            cur = self.prefix[cur as usize];
            steps += 1;
            if steps > STACK_LIMIT {
                self.stack.clear();
                return Err(Error::LzwCycle);
            }
        }
        let first = cur as u8;
        self.stack.push(first);
        self.first_byte = first;
        if (self.next_code as usize) < TABLE_SZ {
            self.prefix[self.next_code as usize] = last;
            self.suffix[self.next_code as usize] = first;
            self.next_code += 1;
            if self.next_code >= 1 << self.code_bits
                && self.code_bits < MAX_BITS
            {
                self.code_bits += 1;
            }
        }
        self.last = Some(code);
        while let Some(byte) = self.stack.pop() {
            out.push(byte);
        }
        Ok(())
    }

    /// Get the current code width (bits)
    #[cfg(test)]
    fn code_width(&self) -> u8 {
        self.code_bits
    }
}

impl Compressor {
    /// Create a new compressor
    pub fn new(min_code_size: u8) -> Self {
        let min_code_bits = min_code_size.max(2).min(MAX_BITS - 1);
        let mut hshift = 0;
        let mut sz = HASH_SZ;
        while sz < 65536 {
            sz *= 2;
            hshift += 1;
        }
        let mut enc = Compressor {
            min_code_bits,
            code_bits: min_code_bits + 1,
            keys: vec![-1; HASH_SZ],
            codes: vec![0; HASH_SZ],
            next_code: 0,
            hshift: 8 - hshift,
            acc: 0,
            n_bits: 0,
        };
        enc.reset();
        enc
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Reset the dictionary (after emitting a clear code)
    fn reset(&mut self) {
        for key in &mut self.keys {
            *key = -1;
        }
        self.next_code = self.end_code() + 1;
        self.code_bits = self.min_code_bits + 1;
    }

    /// Probe the dictionary for a `(prefix, byte)` pair.
    ///
    /// Returns the matched code, or the empty slot where the pair belongs.
    fn probe(&self, prefix: Code, byte: u8) -> std::result::Result<Code, usize> {
        let key = (i32::from(byte) << MAX_BITS) + i32::from(prefix);
        let mut i = ((byte as usize) << self.hshift) ^ prefix as usize;
        if self.keys[i] == key {
            return Ok(self.codes[i]);
        }
        if self.keys[i] < 0 {
            return Err(i);
        }
        // secondary displacement probe
        let disp = if i == 0 { 1 } else { HASH_SZ - i };
        loop {
            i = if i >= disp { i - disp } else { i + HASH_SZ - disp };
            if self.keys[i] == key {
                return Ok(self.codes[i]);
            }
            if self.keys[i] < 0 {
                return Err(i);
            }
        }
    }

    /// Pack one code into the output buffer
    fn pack(&mut self, code: Code, out: &mut Vec<u8>) {
        self.acc |= u32::from(code) << self.n_bits;
        self.n_bits += self.code_bits;
        while self.n_bits >= 8 {
            out.push(self.acc as u8);
            self.acc >>= 8;
            self.n_bits -= 8;
        }
        if self.next_code > (1 << self.code_bits) - 1
            && self.code_bits < MAX_BITS
        {
            self.code_bits += 1;
        }
    }

    /// Flush any partial byte in the accumulator
    fn flush(&mut self, out: &mut Vec<u8>) {
        if self.n_bits > 0 {
            out.push(self.acc as u8);
            self.acc = 0;
            self.n_bits = 0;
        }
    }

    /// Compress a byte buffer.
    ///
    /// The output is the raw code stream, without sub-block chunking.
    pub fn compress(&mut self, bytes: &[u8], out: &mut Vec<u8>) {
        self.pack(self.clear_code(), out);
        let mut bytes = bytes.iter().copied();
        let mut ent = match bytes.next() {
            Some(byte) => Code::from(byte),
            None => {
                let end = self.end_code();
                self.pack(end, out);
                self.flush(out);
                return;
            }
        };
        for byte in bytes {
            match self.probe(ent, byte) {
                Ok(code) => ent = code,
                Err(slot) => {
                    let key = (i32::from(byte) << MAX_BITS) + i32::from(ent);
                    self.pack(ent, out);
                    if (self.next_code as usize) < TABLE_SZ {
                        self.keys[slot] = key;
                        self.codes[slot] = self.next_code;
                        self.next_code += 1;
                    } else {
                        let clear = self.clear_code();
                        self.pack(clear, out);
                        self.reset();
                    }
                    ent = Code::from(byte);
                }
            }
        }
        self.pack(ent, out);
        let end = self.end_code();
        self.pack(end, out);
        self.flush(out);
    }
}
