use super::normalize::normalize;
use crate::engine::DetectedTextRegion;
use serde::Serialize;

/// Plate text reported when no fragment survives filtering ("not recognized")
pub const NOT_RECOGNIZED: &str = "Không nhận diện được";

/// Fragments need strictly more confidence than this
const MIN_CONFIDENCE: f64 = 0.3;
/// Fragments need at least this many characters after normalization
const MIN_TEXT_LEN: usize = 2;

/// An accepted, normalized line of plate text
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFragment {
    pub center_y: f32,
    pub text: String,
    pub confidence: f64,
}

impl NormalizedFragment {
    /// Normalize a detected region, returning `None` if it is too short or
    /// too uncertain to be part of a plate
    pub fn accept(region: &DetectedTextRegion) -> Option<Self> {
        let text = normalize(&region.text);
        if text.chars().count() < MIN_TEXT_LEN || region.confidence <= MIN_CONFIDENCE {
            return None;
        }

        Some(Self {
            center_y: region.bbox.center_y(),
            text,
            confidence: region.confidence,
        })
    }
}

/// One accepted fragment as reported to the client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentScore {
    pub text: String,
    /// Percentage, rounded to 2 decimals
    pub confidence: f64,
}

/// Final plate reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlateResult {
    pub plate: String,
    /// Percentage, rounded to 2 decimals
    pub confidence: f64,
    pub all: Vec<FragmentScore>,
}

/// Accepted fragments in top-to-bottom reading order.
///
/// The sort is stable, so fragments on the same line keep detection order.
pub fn accepted_fragments(regions: &[DetectedTextRegion]) -> Vec<NormalizedFragment> {
    let mut fragments: Vec<NormalizedFragment> =
        regions.iter().filter_map(NormalizedFragment::accept).collect();
    fragments.sort_by(|a, b| a.center_y.total_cmp(&b.center_y));
    fragments
}

/// Assemble recognizer output into a plate reading.
///
/// One fragment is a single-row plate. Two or more are read as a two-row
/// (square) plate: the top two rows are joined and their confidences
/// averaged. Rows past the second only show up in `all`.
pub fn assemble(regions: &[DetectedTextRegion]) -> PlateResult {
    let fragments = accepted_fragments(regions);

    let (plate, confidence) = match fragments.as_slice() {
        [] => (NOT_RECOGNIZED.to_string(), 0.0),
        [only] => (only.text.clone(), only.confidence),
        [first, second, ..] => (
            format!("{}{}", first.text, second.text),
            (first.confidence + second.confidence) / 2.0,
        ),
    };

    PlateResult {
        plate,
        confidence: to_percent(confidence),
        all: fragments
            .into_iter()
            .map(|fragment| FragmentScore {
                confidence: to_percent(fragment.confidence),
                text: fragment.text,
            })
            .collect(),
    }
}

fn to_percent(confidence: f64) -> f64 {
    (confidence * 100.0 * 100.0).round() / 100.0
}
