use byteorder::{ByteOrder, LittleEndian};

/// Color escape marker. In-band sequence of one flag byte plus an RGB
/// triplet, four bytes wide, contributing nothing to the decoded text.
const COLOR_ESCAPE: u8 = 0x1b;

/// Forward-only reader over one response section payload.
///
/// Wraps a borrowed byte buffer and a read position. Reads never fail the
/// caller: past the end of the buffer they return sentinel values ("" / -1 /
/// 0) so that truncated sections decode to default-valued records.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, pos: 0 }
    }

    /// Get the value of the escaped, null-terminated string starting one
    /// byte past the current position. The leading byte is a marker the
    /// format never backs with a usable length, so it is skipped unread.
    ///
    /// Color escapes are stripped. Remaining bytes map to characters one to
    /// one (no multi-byte text decode). Advances to one past the zero
    /// terminator, or to the buffer end if the terminator is missing.
    /// Positioned on the last byte or beyond, returns "" without advancing.
    pub fn read_string(&mut self) -> String {
        let mut i = self.pos + 1;
        if i >= self.data.len() {
            return String::new();
        }

        let mut value = String::new();
        while let Some(&byte) = self.data.get(i) {
            match byte {
                0 => {
                    self.pos = i + 1;
                    return value;
                }
                COLOR_ESCAPE => i += 4,
                b => {
                    value.push(char::from(b));
                    i += 1;
                }
            }
        }

        // ran off the end without a terminator
        self.pos = self.data.len();
        value
    }

    /// Get the little-endian two's-complement 32-bit integer at the current
    /// position.
    ///
    /// Advances by 4 unconditionally. Past the buffer end the value is
    /// absent and -1 stands in for it; a partial trailing window decodes at
    /// its actual width, sign-extended.
    pub fn read_i32(&mut self) -> i32 {
        let start = self.pos;
        self.pos += 4;
        if start >= self.data.len() {
            return -1;
        }
        let end = self.data.len().min(start + 4);
        LittleEndian::read_int(&self.data[start..end], end - start) as i32
    }

    /// Get the byte in the last slot of an `align`-wide field. The players
    /// section keeps its team tag in the fourth byte of a 4-byte slot.
    ///
    /// Advances by `align`; returns 0 when the slot runs past the buffer.
    pub fn read_u8(&mut self, align: usize) -> u8 {
        debug_assert!(align > 0);
        let i = self.pos + align - 1;
        self.pos += align;
        if i >= self.data.len() {
            return 0;
        }
        self.data[i]
    }

    /// Skip `delta` bytes. Used for the fixed per-section headers.
    pub fn seek(&mut self, delta: usize) {
        self.pos += delta;
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }
}
