use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Questionnaire};

/// 重症度の区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Low,
    Moderate,
    High,
}

impl Bucket {
    /// グラフの棒の色
    pub fn color(&self) -> &'static str {
        match self {
            Bucket::Low => "green",
            Bucket::Moderate => "orange",
            Bucket::High => "red",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Low => write!(f, "low"),
            Bucket::Moderate => write!(f, "moderate"),
            Bucket::High => write!(f, "high"),
        }
    }
}

/// 1回分の回答
///
/// 因子の並び順どおりの評点と、チェックリストで選ばれた追加ストレス要因。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Responses {
    pub ratings: Vec<u32>,
    pub stressors: Vec<String>,
}

impl Responses {
    pub fn new(ratings: Vec<u32>) -> Self {
        Self {
            ratings,
            stressors: Vec::new(),
        }
    }

    pub fn with_stressors<I, S>(mut self, stressors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stressors = stressors.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorScore {
    pub factor: String,
    pub rating: u32,
    pub bucket: Bucket,
}

/// 因子別グラフの棒1本
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub factor: String,
    pub value: u32,
    pub bucket: Bucket,
    pub color: &'static str,
}

/// 評価結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub total: u32,
    pub max: u32,
    /// total / max の比 (0〜1)
    pub normalized: f64,
    pub bucket: Bucket,
    pub summary: Option<String>,
    /// 因子の定義順
    pub factors: Vec<FactorScore>,
    pub advisories: Vec<String>,
}

impl Report {
    pub fn has_stress(&self) -> bool {
        self.bucket == Bucket::High
    }

    pub fn factor_bucket(&self, factor: &str) -> Option<Bucket> {
        self.factors
            .iter()
            .find(|score| score.factor == factor)
            .map(|score| score.bucket)
    }

    pub fn series(&self) -> Vec<SeriesPoint> {
        self.factors
            .iter()
            .map(|score| SeriesPoint {
                factor: score.factor.clone(),
                value: score.rating,
                bucket: score.bucket,
                color: score.bucket.color(),
            })
            .collect()
    }
}

impl Questionnaire {
    /// 評点を集計して判定する
    ///
    /// 評点は尺度の範囲内であること。範囲外の評点がひとつでもあれば
    /// 集計せずに `Error::InvalidRating` を返す。
    pub fn evaluate(&self, responses: &Responses) -> Result<Report, Error> {
        if responses.ratings.len() != self.factors.len() {
            return Err(Error::RatingCount {
                expected: self.factors.len(),
                actual: responses.ratings.len(),
            });
        }
        for (factor, &value) in self.factors.iter().zip(&responses.ratings) {
            if !self.scale.contains(value) {
                return Err(Error::InvalidRating {
                    factor: factor.name.clone(),
                    value,
                    min: self.scale.min,
                    max: self.scale.max,
                });
            }
        }
        if let Some(id) = responses
            .stressors
            .iter()
            .find(|id| self.stressor(id).is_none())
        {
            return Err(Error::UnknownStressor(id.clone()));
        }

        let max = self.max_total()?;
        // 各評点は scale.max 以下なので合計は max を超えない
        let total: u32 = responses.ratings.iter().sum();
        let bucket = self.thresholds.bucket(total, self.factor_count()?);

        let factors = self
            .factors
            .iter()
            .zip(&responses.ratings)
            .map(|(factor, &rating)| FactorScore {
                factor: factor.name.clone(),
                rating,
                bucket: self.thresholds.bucket(rating, 1),
            })
            .collect::<Vec<_>>();

        let mut advisories = self
            .factors
            .iter()
            .zip(&factors)
            .filter(|(_, score)| score.bucket >= self.advisory_from)
            .filter_map(|(factor, score)| factor.advice.get(score.bucket))
            .map(str::to_string)
            .collect::<Vec<_>>();
        advisories.extend(
            self.stressors
                .iter()
                .filter(|stressor| responses.stressors.contains(&stressor.id))
                .map(|stressor| stressor.tip.clone()),
        );

        debug!(
            questionnaire = %self.name,
            total,
            max,
            %bucket,
            advisories = advisories.len(),
            "evaluated responses"
        );

        Ok(Report {
            total,
            max,
            normalized: f64::from(total) / f64::from(max),
            bucket,
            summary: self.messages.get(bucket).map(str::to_string),
            factors,
            advisories,
        })
    }

    /// 評点だけで判定する
    pub fn evaluate_ratings(&self, ratings: &[u32]) -> Result<Report, Error> {
        self.evaluate(&Responses::new(ratings.to_vec()))
    }
}
