/*!
 * VFS File Type Enum
 * Kind of object a vnode refers to
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// File type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    File,
    CharDevice,
    #[default]
    Unknown,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FileType::File => write!(f, "file"),
            FileType::CharDevice => write!(f, "char device"),
            FileType::Unknown => write!(f, "unknown"),
        }
    }
}
