// Copyright © 2018 Cormac O'Brien
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of this software
// and associated documentation files (the "Software"), to deal in the Software without
// restriction, including without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all copies or
// substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
// BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Error types for the map compiler core.
//!
//! Local geometric operations (winding splits, flood steps) never return
//! `Result` — they return sentinel values consumed by their caller. Only
//! entity- and compiler-level operations return `Result<_, DmapError>`.

use std::fmt::{self, Display};

use failure::{Backtrace, Context, Fail};

#[derive(Debug)]
pub struct DmapError {
    inner: Context<DmapErrorKind>,
}

impl DmapError {
    pub fn kind(&self) -> DmapErrorKind {
        self.inner.get_context().clone()
    }
}

impl From<DmapErrorKind> for DmapError {
    fn from(kind: DmapErrorKind) -> Self {
        DmapError {
            inner: Context::new(kind),
        }
    }
}

impl From<Context<DmapErrorKind>> for DmapError {
    fn from(inner: Context<DmapErrorKind>) -> Self {
        DmapError { inner }
    }
}

impl Fail for DmapError {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl Display for DmapError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum DmapErrorKind {
    #[fail(display = "entity {}: flood reached the outside (leak)", entity)]
    Leak { entity: usize },

    #[fail(display = "entity {}, brush {}: side winding failed to materialize", entity, brush)]
    BadBrush { entity: usize, brush: usize },

    #[fail(
        display = "areaportal side {} connects {} areas, expected exactly 2",
        side, area_count
    )]
    InvalidAreaportal { side: usize, area_count: usize },

    #[fail(display = "invalid usage: {}", _0)]
    Usage(String),

    #[fail(display = "I/O error: {}", _0)]
    Io(String),
}

impl From<std::io::Error> for DmapError {
    fn from(err: std::io::Error) -> Self {
        DmapErrorKind::Io(err.to_string()).into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_leak_display() {
        let err: DmapError = DmapErrorKind::Leak { entity: 3 }.into();
        assert_eq!(err.kind(), DmapErrorKind::Leak { entity: 3 });
        assert_eq!(format!("{}", err), "entity 3: flood reached the outside (leak)");
    }
}
