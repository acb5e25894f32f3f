/*!
 * File Handle Implementation
 * Positionless vnode over an in-memory node
 */

use std::sync::Arc;

use super::super::traits::Vnode;
use super::super::types::*;
use super::node::Node;
use super::MemFS;
use crate::core::limits::MAX_FILE_SIZE;

/// In-memory vnode
pub(super) struct MemVnode {
    pub fs: MemFS,
    pub node: Arc<Node>,
}

impl Vnode for MemVnode {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> VfsResult<usize> {
        let data = self.node.data.read();
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        if start >= data.len() {
            return Ok(0);
        }
        let count = buf.len().min(data.len() - start);
        buf[..count].copy_from_slice(&data[start..start + count]);
        Ok(count)
    }

    fn write_at(&self, offset: u64, data: &[u8]) -> VfsResult<usize> {
        let end = usize::try_from(offset)
            .ok()
            .and_then(|start| start.checked_add(data.len()))
            .filter(|end| *end <= MAX_FILE_SIZE)
            .ok_or(VfsError::FileTooLarge)?;
        let start = end - data.len();

        let mut contents = self.node.data.write();
        let old_len = contents.len();
        if end > old_len {
            let grow = end - old_len;
            self.fs.check_and_reserve_space(grow)?;
            if contents.try_reserve_exact(grow).is_err() {
                self.fs.release_space(grow);
                return Err(VfsError::OutOfSpace);
            }
            contents.resize(end, 0);
        }
        contents[start..end].copy_from_slice(data);
        Ok(data.len())
    }

    fn metadata(&self) -> VfsResult<Metadata> {
        Ok(Metadata {
            file_type: FileType::File,
            size: self.node.len() as u64,
            permissions: self.node.permissions,
        })
    }
}
