/*!
 * Console Device
 * Character device bound to the standard descriptors
 */

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::traits::Vnode;
use super::types::*;

/// Console state shared by every vnode opened on it
#[derive(Debug, Default)]
pub struct Console {
    input: Mutex<VecDeque<u8>>,
    output: Mutex<Vec<u8>>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for subsequent reads
    pub fn feed_input(&self, data: &[u8]) {
        self.input.lock().extend(data.iter().copied());
    }

    /// Everything written so far
    pub fn output(&self) -> Vec<u8> {
        self.output.lock().clone()
    }

    /// Drain and return everything written so far
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut *self.output.lock())
    }
}

/// Vnode for an open console
pub(super) struct ConsoleVnode {
    console: Arc<Console>,
}

impl ConsoleVnode {
    pub(super) fn new(console: Arc<Console>) -> Self {
        Self { console }
    }
}

impl Vnode for ConsoleVnode {
    // Offsets are meaningless on a character device
    fn read_at(&self, _offset: u64, buf: &mut [u8]) -> VfsResult<usize> {
        let mut input = self.console.input.lock();
        let count = buf.len().min(input.len());
        for (dst, src) in buf.iter_mut().zip(input.drain(..count)) {
            *dst = src;
        }
        Ok(count)
    }

    fn write_at(&self, _offset: u64, data: &[u8]) -> VfsResult<usize> {
        self.console.output.lock().extend_from_slice(data);
        tracing::trace!(bytes = data.len(), "console write");
        Ok(data.len())
    }

    fn metadata(&self) -> VfsResult<Metadata> {
        Ok(Metadata {
            file_type: FileType::CharDevice,
            size: 0,
            permissions: Permissions::new(0o620),
        })
    }
}
