mod bulk;
mod evaluate;
mod questionnaire;
pub mod render;
mod store;

pub use bulk::read_bulk;
pub use evaluate::{Bucket, FactorScore, Report, Responses, SeriesPoint};
pub use questionnaire::{
    BucketText, Factor, Questionnaire, Scale, ScaleLabel, Stressor, Thresholds, QUESTIONNAIRES,
};
pub use store::RatingStore;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 尺度の範囲外の評点
    #[error("rating {value} for {factor} is outside {min}..={max}")]
    InvalidRating {
        factor: String,
        value: u32,
        min: u32,
        max: u32,
    },
    /// 評点の数が因子数と合わない
    #[error("expected {expected} ratings, got {actual}")]
    RatingCount { expected: usize, actual: usize },
    #[error("rating for {factor} is not a whole number: {input:?}")]
    NotANumber { factor: String, input: String },
    #[error("unknown factor {0}")]
    UnknownFactor(String),
    #[error("unknown stressor {0}")]
    UnknownStressor(String),
    #[error("unknown questionnaire {0}")]
    UnknownPreset(String),
    /// 設問定義の不備
    #[error("invalid questionnaire definition: {0}")]
    InvalidDefinition(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::InvalidRating {
            factor: "Tension/Anxiety".to_string(),
            value: 5,
            min: 0,
            max: 4,
        };
        assert_eq!(
            error.to_string(),
            "rating 5 for Tension/Anxiety is outside 0..=4"
        );
        assert_eq!(
            Error::RatingCount {
                expected: 12,
                actual: 3
            }
            .to_string(),
            "expected 12 ratings, got 3"
        );
    }
}
