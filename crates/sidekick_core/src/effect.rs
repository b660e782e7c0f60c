use std::path::PathBuf;

use crate::Reply;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartConversion { path: PathBuf },
    /// Write one line to the host and flush.
    Emit(Reply),
    Shutdown,
}
