//! Upload intake: multipart parsing, filename sanitizing and scoped temp files.
//!
//! Every file written for a request is owned by an [`UploadScope`]; dropping
//! the scope deletes the files, so cleanup happens on every exit path.

mod receive;
mod sanitize;
mod scope;

pub use receive::{FILE_FIELD, UploadError, check_content_length, receive_files};
pub use sanitize::sanitize_filename;
pub use scope::{UploadScope, UploadedFile};
