//! Status bar contract

/// A status bar holding a message stack per context, GTK style.
pub trait StatusSink {
    /// Id for messages posted under `description`; stable per description
    fn context_id(&mut self, description: &str) -> u32;

    /// Show `message` on top of the stack for `context`
    fn push(&mut self, context: u32, message: &str);

    /// Remove the topmost message of `context`
    fn pop(&mut self, context: u32);
}
