// Copyright © 2018 Cormac O'Brien
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Content flag bits (`spec.md` §6): the only bits this core requires.

bitflags! {
    pub struct ContentFlags: u32 {
        const SOLID      = 0b0000_0001;
        const OPAQUE     = 0b0000_0010;
        const AREAPORTAL = 0b0000_0100;
        const NONSOLID   = 0b0000_1000;
    }
}

impl ContentFlags {
    /// The composite "opaque for BSP" definition (`spec.md` §6): solid and
    /// not areaportal-only.
    pub fn is_opaque_for_bsp(self) -> bool {
        self.contains(ContentFlags::SOLID) && !self.contains(ContentFlags::AREAPORTAL)
    }

    pub fn is_areaportal(self) -> bool {
        self.contains(ContentFlags::AREAPORTAL)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_opaque_for_bsp() {
        assert!((ContentFlags::SOLID).is_opaque_for_bsp());
        assert!(!(ContentFlags::SOLID | ContentFlags::AREAPORTAL).is_opaque_for_bsp());
        assert!(!(ContentFlags::AREAPORTAL).is_opaque_for_bsp());
        assert!(!(ContentFlags::NONSOLID).is_opaque_for_bsp());
    }
}
