/*!
 * Filesystem Node Types
 * Backing storage for in-memory files
 */

use parking_lot::RwLock;

use super::super::types::Permissions;

/// In-memory file node
#[derive(Debug)]
pub(in crate::vfs) struct Node {
    pub data: RwLock<Vec<u8>>,
    pub permissions: Permissions,
}

impl Node {
    pub fn new(permissions: Permissions) -> Self {
        Self {
            data: RwLock::new(Vec::new()),
            permissions,
        }
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }
}
