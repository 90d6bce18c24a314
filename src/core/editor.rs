//! Editor buffer contract

use std::io;
use std::path::Path;

/// The text widget holding the document being edited
pub trait EditorBuffer {
    /// Read `path` and decode it into text
    fn decode_text(&self, path: &Path) -> io::Result<String>;

    /// Encode buffer text into the bytes written to disk
    fn encode_text(&self, text: &str) -> io::Result<Vec<u8>>;

    /// Replace the buffer contents
    fn fill_buffer(&mut self, text: &str);

    /// Current buffer contents
    fn grab_buffer(&self) -> String;

    /// The buffer now matches what is on disk
    fn mark_saved(&mut self);
}
