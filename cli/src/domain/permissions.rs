//! Unix permission policies for secret stores.
//!
//! Pure functions over permission bits; callers fetch the mode.

use crate::domain::error::PermissionProblem;

/// Highest mode a private directory (pass store, `~/.gnupg`, `~/.ssh`) may carry.
pub const PRIVATE_DIR_MAX: u32 = 0o700;
/// Highest mode a private file (SSH key, token file, config) may carry.
pub const PRIVATE_FILE_MAX: u32 = 0o600;

const GROUP_OTHER_BITS: u32 = 0o077;

/// Which policy applies to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    PrivateDir,
    PrivateFile,
}

impl Policy {
    /// Check `mode` (only the low nine bits are considered).
    ///
    /// # Errors
    ///
    /// Returns the problem when group/other bits are set or the owner lacks
    /// the bits needed to use the path.
    pub fn check(self, mode: u32) -> Result<(), PermissionProblem> {
        let mode = mode & 0o777;
        let (max, needed) = match self {
            Policy::PrivateDir => (PRIVATE_DIR_MAX, 0o500),
            Policy::PrivateFile => (PRIVATE_FILE_MAX, 0o400),
        };
        if mode & GROUP_OTHER_BITS != 0 {
            return Err(PermissionProblem::TooPermissive { mode, max });
        }
        if mode & needed != needed {
            return Err(PermissionProblem::TooRestrictive { mode, needed });
        }
        Ok(())
    }
}
