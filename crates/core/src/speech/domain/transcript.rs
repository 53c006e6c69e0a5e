#[derive(Clone, Debug, PartialEq)]
pub struct SpeechAlternative {
    pub transcript: String,
    pub confidence: f32,
}

/// One consecutive portion of the audio, with alternatives ranked best first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentResult {
    pub alternatives: Vec<SpeechAlternative>,
}

impl SegmentResult {
    pub fn best(&self) -> Option<&SpeechAlternative> {
        self.alternatives.first()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TranscriptResult {
    pub segments: Vec<SegmentResult>,
}

impl TranscriptResult {
    /// Top alternative of every segment, joined with single spaces.
    ///
    /// Segments without alternatives, or whose best transcript is empty,
    /// contribute nothing.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(SegmentResult::best)
            .map(|alt| alt.transcript.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
