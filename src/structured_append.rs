//! Splitting content that exceeds one PDF417 symbol across a Macro PDF417
//! sequence.
//!
//! The coordinator only decides where to cut: every piece becomes an
//! ordinary [Symbol] carrying its position, and is encoded independently.

use core::ops::Range;

use tracing::{debug, instrument};

use crate::content::Content;
use crate::error::{Error, InputError, InternalError, Result};
use crate::pdf417::high_level::{self, Compaction, NUMERIC_GROUP};
use crate::pdf417::options::MAX_SEGMENTS;
use crate::pdf417::{assemble, Pdf417Options, StructuredAppend};
use crate::symbol::Symbol;

/// Linked symbols sharing a file id, in position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredAppendSequence {
    file_id: u16,
    symbols: Vec<Symbol>,
}

impl StructuredAppendSequence {
    #[inline]
    pub fn file_id(&self) -> u16 {
        self.file_id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut [Symbol] {
        &mut self.symbols
    }

    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }

    /// Encodes every symbol, stopping at the first failure.
    pub fn encode_all(&mut self) -> Result<()> {
        for symbol in &mut self.symbols {
            symbol.encode()?;
        }
        Ok(())
    }
}

/// Splits content into pieces that each fit one symbol built from a
/// template configuration.
#[derive(Debug, Clone)]
pub struct Coordinator {
    template: Pdf417Options,
    file_id: u16,
    file_name: Option<String>,
    include_segment_count: bool,
}

impl Coordinator {
    pub fn new(template: Pdf417Options, file_id: u16) -> Result<Self, InputError> {
        template.validate()?;
        // checks the file id
        StructuredAppend::new(1, 1, file_id)?;
        Ok(Self { template, file_id, file_name: None, include_segment_count: false })
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Result<Self, InputError> {
        let file_name = file_name.into();
        StructuredAppend::new(1, 1, self.file_id)?.with_file_name(file_name.as_str())?;
        self.file_name = Some(file_name);
        Ok(self)
    }

    pub fn with_segment_count(mut self, include: bool) -> Self {
        self.include_segment_count = include;
        self
    }

    fn control(&self, position: u32, total: u32) -> Result<StructuredAppend, InputError> {
        let sa = StructuredAppend::new(position, total, self.file_id)?.with_segment_count(self.include_segment_count);
        match &self.file_name {
            Some(name) => sa.with_file_name(name.as_str()),
            None => Ok(sa),
        }
    }

    /// Byte offsets a piece may end at: segment ends, every character
    /// boundary inside text and byte runs and every full numeric group.
    pub fn split_points(&self, content: &Content) -> Result<Vec<usize>> {
        let segmentation = high_level::segment(content.bytes())?;
        let mut points = Vec::new();
        for seg in &segmentation.segments {
            match seg.mode {
                Compaction::Numeric => {
                    points.extend((seg.start + NUMERIC_GROUP..seg.end()).step_by(NUMERIC_GROUP));
                }
                Compaction::Text | Compaction::Byte => {
                    points.extend((seg.start + 1..seg.end()).filter(|&i| content.is_char_boundary(i)));
                }
            }
            points.push(seg.end());
        }
        Ok(points)
    }

    /// Assembles `range` with the largest control block any position can
    /// need. A capacity error comes back as `Ok(Some(_))`.
    fn check_piece(&self, content: &Content, range: Range<usize>) -> Result<Option<Error>> {
        match self.assemble_piece(content, range) {
            Ok(()) => Ok(None),
            Err(e @ Error::Input(InputError::CapacityExceeded { .. })) => Ok(Some(e)),
            Err(e) => Err(e),
        }
    }

    fn fits(&self, content: &Content, range: Range<usize>) -> Result<bool> {
        Ok(self.check_piece(content, range)?.is_none())
    }

    fn assemble_piece(&self, content: &Content, range: Range<usize>) -> Result<()> {
        let piece = Content::from_bytes(content.bytes()[range].to_vec(), content.eci())?;
        let mut options = self.template.clone();
        options.set_structured_append(Some(self.control(MAX_SEGMENTS, MAX_SEGMENTS)?))?;
        assemble(&piece, &options, &mut Vec::new())?;
        Ok(())
    }

    /// Byte ranges of the pieces, in order.
    #[instrument(level = "debug", skip_all, fields(len = content.len()))]
    pub fn plan(&self, content: &Content) -> Result<Vec<Range<usize>>> {
        if content.is_empty() {
            return Err(InputError::EmptyContent.into());
        }
        if content.is_gs1() {
            return Err(InputError::invalid("structured_append", "gs1", "GS1 content cannot be split").into());
        }

        let mut single = self.template.clone();
        single.set_structured_append(None)?;
        match assemble(content, &single, &mut Vec::new()) {
            Ok(_) => return Ok(vec![0..content.len()]),
            Err(Error::Input(InputError::CapacityExceeded { .. })) => {}
            Err(e) => return Err(e),
        }

        let points = self.split_points(content)?;
        let mut pieces = Vec::new();
        let mut start = 0;
        while start < content.len() {
            let first = points.partition_point(|&p| p <= start);
            let candidates = &points[first..];
            let Some(&smallest) = candidates.first() else {
                return Err(InternalError::InvalidField("no split point after a piece").into());
            };
            if let Some(err) = self.check_piece(content, start..smallest)? {
                return Err(err);
            }

            // largest fitting candidate, then walk past any non-monotonic tail
            let (mut lo, mut hi) = (0, candidates.len() - 1);
            while lo < hi {
                let mid = (lo + hi + 1) / 2;
                if self.fits(content, start..candidates[mid])? {
                    lo = mid;
                } else {
                    hi = mid - 1;
                }
            }
            while lo + 1 < candidates.len() && self.fits(content, start..candidates[lo + 1])? {
                lo += 1;
            }

            pieces.push(start..candidates[lo]);
            start = candidates[lo];
        }

        if pieces.len() > MAX_SEGMENTS as usize {
            return Err(InputError::invalid("structured_append.total", pieces.len(), "more than 99999 symbols needed").into());
        }
        debug!(pieces = pieces.len(), "planned");
        Ok(pieces)
    }

    /// Splits `content` into configured, not yet encoded symbols.
    pub fn split(&self, content: &Content) -> Result<StructuredAppendSequence> {
        let pieces = self.plan(content)?;
        let total = pieces.len() as u32;

        let mut symbols = Vec::with_capacity(pieces.len());
        for (i, range) in pieces.into_iter().enumerate() {
            let mut options = self.template.clone();
            options.set_structured_append(Some(self.control(i as u32 + 1, total)?))?;

            let mut symbol = Symbol::with_options(options);
            symbol.set_content_bytes(&content.bytes()[range]).set_eci(Some(content.eci()))?;
            symbols.push(symbol);
        }

        Ok(StructuredAppendSequence { file_id: self.file_id, symbols })
    }
}
