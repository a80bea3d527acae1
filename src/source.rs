use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOffset(usize);

impl SourceOffset {
    pub fn byte_offset(&self) -> usize {
        self.0
    }
}

impl From<usize> for SourceOffset {
    fn from(offset: usize) -> Self {
        Self(offset)
    }
}

impl From<SourceOffset> for miette::SourceOffset {
    fn from(offset: SourceOffset) -> Self {
        offset.0.into()
    }
}

/// A byte range into the source text, stored as offset and length so that
/// diagnostics can slice the offending line and underline exactly this span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    offset: SourceOffset,
    length: SourceOffset,
}

impl SourceSpan {
    pub fn new(offset: SourceOffset, length: SourceOffset) -> Self {
        Self { offset, length }
    }
    pub fn len(&self) -> SourceOffset {
        self.length
    }
    pub fn range(start: SourceOffset, end: SourceOffset) -> Self {
        Self {
            offset: start,
            length: (end.0.saturating_sub(start.0)).into(),
        }
    }
    pub fn start(&self) -> SourceOffset {
        self.offset
    }
    pub fn end(&self) -> SourceOffset {
        (self.offset.0 + self.length.0).into()
    }
    /// The smallest span covering both `self` and `other`.
    pub fn to(&self, other: SourceSpan) -> Self {
        let start = self.offset.0.min(other.offset.0);
        let end = self.end().0.max(other.end().0);
        (start..end).into()
    }
}

impl From<&SourceSpan> for miette::SourceSpan {
    fn from(span: &SourceSpan) -> Self {
        Self::new(span.offset.into(), span.length.into())
    }
}
impl From<SourceSpan> for miette::SourceSpan {
    fn from(span: SourceSpan) -> Self {
        Self::from(&span)
    }
}

impl From<Range<usize>> for SourceSpan {
    fn from(range: Range<usize>) -> Self {
        Self::range(range.start.into(), range.end.into())
    }
}

impl From<usize> for SourceSpan {
    fn from(offset: usize) -> Self {
        Self::new(offset.into(), 1.into())
    }
}
