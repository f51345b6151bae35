/// Represents complex (mostly async) operations that may cause multiple mutations
/// over time.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatTask {
    /// Sends the current prompt to the chat endpoint and starts waiting for
    /// the reply in the background.
    ///
    /// Ignored when the prompt is blank or while a previous reply is still
    /// awaited.
    Send,
}
