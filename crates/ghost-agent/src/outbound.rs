//! The reserved outbound channel: text and file delivery to the operator.

use std::path::Path;

use async_trait::async_trait;

use crate::error::AgentError;

/// Conversation back to the user. The execution loop is its only writer
/// while a plan runs.
#[async_trait]
pub trait OutboundChannel: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<(), AgentError>;

    async fn send_file(&self, path: &Path, caption: &str) -> Result<(), AgentError>;
}

/// Send `text` in chunks of at most `chunk_chars` characters.
///
/// Blank text sends nothing. Chunk boundaries fall on character boundaries,
/// never inside a code point.
pub async fn send_long(
    channel: &dyn OutboundChannel,
    text: &str,
    chunk_chars: usize,
) -> Result<(), AgentError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    for chunk in split_chunks(text, chunk_chars.max(1)) {
        channel.send_text(chunk).await?;
    }
    Ok(())
}

fn split_chunks(text: &str, chunk_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(chunk_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        chunks.push(&rest[..end]);
        rest = &rest[end..];
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    #[async_trait]
    impl OutboundChannel for Collect {
        async fn send_text(&self, text: &str) -> Result<(), AgentError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn send_file(&self, path: &Path, _caption: &str) -> Result<(), AgentError> {
            self.0.lock().unwrap().push(path.display().to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_short_text_single_message() {
        let channel = Collect::default();
        send_long(&channel, "hello", 4000).await.unwrap();
        assert_eq!(*channel.0.lock().unwrap(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_long_text_split() {
        let channel = Collect::default();
        let text = "x".repeat(9000);
        send_long(&channel, &text, 4000).await.unwrap();
        let sent = channel.0.lock().unwrap();
        let sizes: Vec<_> = sent.iter().map(|s| s.len()).collect();
        assert_eq!(sizes, vec![4000, 4000, 1000]);
    }

    #[tokio::test]
    async fn test_blank_text_not_sent() {
        let channel = Collect::default();
        send_long(&channel, "  \n ", 4000).await.unwrap();
        assert!(channel.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_split_respects_code_points() {
        assert_eq!(split_chunks("äöüß", 3), vec!["äöü", "ß"]);
    }
}
