//! Iteration over buffers holding several records back to back.

use core::iter::FusedIterator;

use bytemuck::Pod;

use crate::error::{FormatError, Result};
use crate::layout::Limits;
use crate::view::RecordView;

/// Yields a [`RecordView`] per record. A malformed record produces one error and ends the
/// iteration; there is no attempt to resynchronise.
pub struct ActivityStream<'a, P> {
    buf: &'a [u8],
    offset: usize,
    limits: Limits,
    done: bool,
    _primitive: core::marker::PhantomData<P>,
}

impl<'a, P: Pod> ActivityStream<'a, P> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_limits(buf, &Limits::default())
    }

    pub fn with_limits(buf: &'a [u8], limits: &Limits) -> Self {
        Self {
            buf,
            offset: 0,
            limits: *limits,
            done: false,
            _primitive: core::marker::PhantomData,
        }
    }

    /// Byte offset of the next record to be decoded.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.offset..]
    }
}

impl<'a, P: Pod> Iterator for ActivityStream<'a, P> {
    type Item = Result<RecordView<'a, P>, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.buf.len() {
            return None;
        }

        match RecordView::with_limits(self.remaining(), &self.limits) {
            Ok(view) => {
                self.offset += view.byte_size();
                Some(Ok(view))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<P: Pod> FusedIterator for ActivityStream<'_, P> {}
