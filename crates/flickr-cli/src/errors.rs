// ============================================================================
// CLI error categories and exit codes
// ============================================================================

use std::path::PathBuf;

use flickr_core::{ErrorKind, FlickrError};
use thiserror::Error;

/// sysexits(3) values
pub const EX_USAGE: u8 = 64;
pub const EX_UNAVAILABLE: u8 = 69;
pub const EX_IOERR: u8 = 74;
pub const EX_NOPERM: u8 = 77;
pub const EX_CONFIG: u8 = 78;

/// A local file could not be read or written
#[derive(Debug, Error)]
#[error("failed to {action} {}: {source}", .path.display())]
pub struct FileIoError {
    pub action: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

pub fn exit_code_for(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::AuthProtocol => EX_NOPERM,
        ErrorKind::Transport => EX_UNAVAILABLE,
        ErrorKind::RemoteApi => 1,
        ErrorKind::Input => EX_CONFIG,
        ErrorKind::Usage => EX_USAGE,
    }
}

/// Pick the process exit code for a failed command
pub fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(flickr) = cause.downcast_ref::<FlickrError>() {
            return exit_code_for(flickr.kind());
        }
        if cause.downcast_ref::<FileIoError>().is_some() {
            return EX_IOERR;
        }
    }
    1
}
