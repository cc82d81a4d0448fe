//! Chunked abstractive summarization through an LLM

use crate::{create_llm, ChatMessage, LLMConfig, LLMError, Result, SummaryConfig, LLM};
use tracing::{debug, info};

/// Completion tokens budgeted per requested summary word
const TOKENS_PER_WORD: u32 = 2;

const SYSTEM_PROMPT: &str = "You summarize transcripts of spoken audio. \
Stay faithful to the source, do not add facts, and reply with the summary text only.";

/// Split `text` into consecutive pieces of at most `chunk_size` characters.
///
/// Boundaries fall on character positions, not bytes, and are not adjusted
/// to word or sentence edges.
pub fn split_chunks(text: &str, chunk_size: usize) -> Vec<&str> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == chunk_size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&text[start..]);

    chunks
}

/// Summarizes text chunk by chunk with a chat model
pub struct AbstractiveSummarizer {
    llm: Box<dyn LLM>,
    chunk_size: usize,
    min_length: u32,
    max_length: u32,
}

impl AbstractiveSummarizer {
    pub fn new(llm: Box<dyn LLM>, config: &SummaryConfig) -> Self {
        Self {
            llm,
            chunk_size: config.chunk_size(),
            min_length: config.min_length(),
            max_length: config.max_length(),
        }
    }

    /// Build the configured provider and check that it answers.
    pub async fn initialize(llm_config: &LLMConfig, config: &SummaryConfig) -> Result<Self> {
        let llm_config = llm_config
            .clone()
            .with_max_tokens(config.max_length().saturating_mul(TOKENS_PER_WORD));
        let llm = create_llm(&llm_config)?;
        Self::initialize_with(llm, config).await
    }

    /// Probe an already constructed model before accepting it
    pub async fn initialize_with(llm: Box<dyn LLM>, config: &SummaryConfig) -> Result<Self> {
        if !llm.is_available().await {
            return Err(LLMError::ProviderUnavailable(llm.provider_type()));
        }
        info!("Abstractive summarizer ready ({:?})", llm.provider_type());
        Ok(Self::new(llm, config))
    }

    /// Summarize one chunk to between `min_length` and `max_length` words
    pub async fn summarize_chunk(&self, text: &str, min_length: u32, max_length: u32) -> Result<String> {
        let prompt = format!(
            "Summarize the following transcript excerpt in {} to {} words.\n\n{}",
            min_length, max_length, text
        );
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];

        let response = self.llm.chat(messages).await?;
        let summary = response.content().trim();
        if summary.is_empty() {
            return Err(LLMError::ResponseError("empty summary".to_string()));
        }

        if let Some(tokens) = response.tokens_used() {
            debug!("Chunk summarized using {} tokens", tokens);
        }
        Ok(summary.to_string())
    }

    /// Summarize every chunk in order and join the results with single spaces
    pub async fn summarize_text(&self, text: &str) -> Result<String> {
        let chunks = split_chunks(text, self.chunk_size);
        debug!("Summarizing {} chunk(s)", chunks.len());

        let mut summaries = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            summaries.push(
                self.summarize_chunk(chunk, self.min_length, self.max_length)
                    .await?,
            );
        }

        Ok(summaries.join(" "))
    }
}
