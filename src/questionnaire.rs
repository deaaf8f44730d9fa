use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::{Bucket, Error};

/// 同梱の設問定義
///
/// ビルド時に埋め込み、初回参照時に一度だけ読み込む。
pub static QUESTIONNAIRES: Lazy<Vec<Questionnaire>> = Lazy::new(|| {
    [
        include_str!("../resources/poms.json"),
        include_str!("../resources/poms-lite.json"),
        include_str!("../resources/wellbeing.json"),
    ]
    .iter()
    .map(|json| Questionnaire::from_json(json).expect("bundled questionnaire is valid"))
    .collect()
});

/// 回答時に示す尺度の目安
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ScaleLabel {
    pub score: u32,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scale {
    pub min: u32,
    pub max: u32,
    /// スライダーの初期位置
    pub default: u32,
    #[serde(default)]
    pub labels: Vec<ScaleLabel>,
}

impl Scale {
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// 判定境界
///
/// 因子1つあたりの倍率で持つ。因子数 `count` の合計点に対しては
/// `count * moderate` 未満が Low、`count * high` 未満が Moderate、それ以外が High。
/// 境界値は上側の区分に含まれる。
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct Thresholds {
    pub moderate: u32,
    pub high: u32,
}

impl Thresholds {
    pub fn bucket(&self, value: u32, count: u32) -> Bucket {
        if value < count.saturating_mul(self.moderate) {
            Bucket::Low
        } else if value < count.saturating_mul(self.high) {
            Bucket::Moderate
        } else {
            Bucket::High
        }
    }
}

/// 区分ごとの文言。どの区分も省略できる。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketText {
    pub low: Option<String>,
    pub moderate: Option<String>,
    pub high: Option<String>,
}

impl BucketText {
    pub fn get(&self, bucket: Bucket) -> Option<&str> {
        match bucket {
            Bucket::Low => self.low.as_deref(),
            Bucket::Moderate => self.moderate.as_deref(),
            Bucket::High => self.high.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Factor {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub advice: BucketText,
}

/// 追加ストレス要因のチェックリスト項目
#[derive(Debug, Clone, Deserialize)]
pub struct Stressor {
    pub id: String,
    pub label: String,
    pub tip: String,
}

/// 設問定義のマスタ表現
#[derive(Debug, Clone, Deserialize)]
pub struct Questionnaire {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub instructions: Option<String>,
    pub scale: Scale,
    pub thresholds: Thresholds,
    /// この区分以上の因子だけ助言を出す
    #[serde(default = "default_advisory_from")]
    pub advisory_from: Bucket,
    #[serde(default)]
    pub messages: BucketText,
    pub factors: Vec<Factor>,
    #[serde(default)]
    pub stressors: Vec<Stressor>,
}

fn default_advisory_from() -> Bucket {
    Bucket::Moderate
}

impl Questionnaire {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let questionnaire: Questionnaire = serde_json::from_str(json)?;
        questionnaire.validate()?;
        Ok(questionnaire)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let questionnaire: Questionnaire = serde_json::from_reader(reader)?;
        questionnaire.validate()?;
        Ok(questionnaire)
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let reader = std::io::BufReader::new(std::fs::File::open(path)?);
        Self::from_reader(reader)
    }

    /// 同梱定義を名前で取得する
    pub fn preset(name: &str) -> Result<&'static Questionnaire, Error> {
        QUESTIONNAIRES
            .iter()
            .find(|questionnaire| questionnaire.name == name)
            .ok_or_else(|| Error::UnknownPreset(name.to_string()))
    }

    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |reason: String| Err(Error::InvalidDefinition(reason));

        if self.factors.is_empty() {
            return invalid(format!("{}: no factors defined", self.name));
        }
        if self.scale.min >= self.scale.max {
            return invalid(format!(
                "{}: scale minimum {} must be below maximum {}",
                self.name, self.scale.min, self.scale.max
            ));
        }
        if !self.scale.contains(self.scale.default) {
            return invalid(format!(
                "{}: default rating {} lies outside {}..={}",
                self.name, self.scale.default, self.scale.min, self.scale.max
            ));
        }
        if self.thresholds.moderate > self.thresholds.high {
            return invalid(format!(
                "{}: moderate cutpoint {} exceeds high cutpoint {}",
                self.name, self.thresholds.moderate, self.thresholds.high
            ));
        }
        // 合計点と境界値が u32 に収まること
        self.max_total()?;
        if self.factor_count()?.checked_mul(self.thresholds.high).is_none() {
            return invalid(format!(
                "{}: high cutpoint {} is too large for {} factors",
                self.name,
                self.thresholds.high,
                self.factors.len()
            ));
        }
        let mut names = HashSet::new();
        if let Some(factor) = self.factors.iter().find(|f| !names.insert(f.name.as_str())) {
            return invalid(format!("{}: duplicate factor {}", self.name, factor.name));
        }
        let mut ids = HashSet::new();
        if let Some(stressor) = self.stressors.iter().find(|s| !ids.insert(s.id.as_str())) {
            return invalid(format!("{}: duplicate stressor {}", self.name, stressor.id));
        }
        Ok(())
    }

    /// 因子名から並び順を引く
    pub fn position(&self, factor: &str) -> Option<usize> {
        self.factors.iter().position(|f| f.name == factor)
    }

    pub fn stressor(&self, id: &str) -> Option<&Stressor> {
        self.stressors.iter().find(|s| s.id == id)
    }

    /// 最高点 = 因子数 × 尺度の最大値
    pub fn max_total(&self) -> Result<u32, Error> {
        self.factor_count()?
            .checked_mul(self.scale.max)
            .ok_or_else(|| {
                Error::InvalidDefinition(format!(
                    "{}: maximum total of {} factors rated up to {} is too large",
                    self.name,
                    self.factors.len(),
                    self.scale.max
                ))
            })
    }

    pub(crate) fn factor_count(&self) -> Result<u32, Error> {
        u32::try_from(self.factors.len()).map_err(|_| {
            Error::InvalidDefinition(format!(
                "{}: too many factors ({})",
                self.name,
                self.factors.len()
            ))
        })
    }
}
