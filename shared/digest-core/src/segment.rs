//! Timed transcript segments

use serde::{Deserialize, Serialize};

/// One timed piece of a transcript, times in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Full transcript text plus its ordered segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Normalize raw recognizer output.
    ///
    /// Segment text is trimmed, segments are stably ordered by start time and
    /// every `end` is clamped to be at least its `start`. The full text is the
    /// trimmed segment texts joined by single spaces, in segment order.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let mut segments: Vec<Segment> = segments
            .into_iter()
            .map(|seg| Segment {
                start: seg.start,
                end: seg.end.max(seg.start),
                text: seg.text.trim().to_string(),
            })
            .collect();

        segments.sort_by(|a, b| a.start.total_cmp(&b.start));

        let text = segments
            .iter()
            .map(|seg| seg.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self { text, segments }
    }

    /// True when every segment has `end >= start` and starts never decrease
    pub fn is_ordered(&self) -> bool {
        self.segments.iter().all(|seg| seg.end >= seg.start)
            && self
                .segments
                .windows(2)
                .all(|pair| pair[1].start >= pair[0].start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_segments_trims_and_joins_in_order() {
        let transcript = Transcript::from_segments(vec![
            Segment::new(0.0, 2.5, "  Hello there. "),
            Segment::new(2.5, 5.0, "\tGeneral Kenobi.\n"),
        ]);

        assert_eq!(transcript.text, "Hello there. General Kenobi.");
        assert_eq!(transcript.segments[0].text, "Hello there.");
        assert!(transcript.is_ordered());
    }

    #[test]
    fn test_from_segments_restores_temporal_order() {
        let transcript = Transcript::from_segments(vec![
            Segment::new(4.0, 6.0, "third"),
            Segment::new(0.0, 2.0, "first"),
            Segment::new(2.0, 1.0, "second"),
        ]);

        assert!(transcript.is_ordered());
        assert_eq!(transcript.text, "first second third");
        assert_eq!(transcript.segments[1].end, 2.0);
    }

    #[test]
    fn test_empty_segments_give_empty_text() {
        let transcript = Transcript::from_segments(Vec::new());
        assert!(transcript.text.is_empty());
        assert!(transcript.is_ordered());
    }
}
