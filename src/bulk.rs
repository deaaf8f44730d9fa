use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{Error, Questionnaire, Responses};

/// CSV で回答をまとめて読み込む
///
/// 1行目は見出し。列は `id`、因子の定義順の評点、最後に任意で
/// `;` 区切りの追加ストレス要因 ID。範囲の検証は評価時に行う。
pub fn read_bulk<'q, R: Read + 'q>(
    questionnaire: &'q Questionnaire,
    reader: R,
) -> impl Iterator<Item = Result<(String, Responses), Error>> + 'q {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
        .into_records()
        .map(move |record| parse_row(questionnaire, &record?))
}

fn parse_row(questionnaire: &Questionnaire, record: &StringRecord) -> Result<(String, Responses), Error> {
    let count = questionnaire.factors.len();
    let id = record.get(0).unwrap_or_default().to_string();
    if record.len() < count + 1 || record.len() > count + 2 {
        return Err(Error::RatingCount {
            expected: count,
            actual: record.len().saturating_sub(1),
        });
    }

    let ratings = questionnaire
        .factors
        .iter()
        .zip(record.iter().skip(1))
        .map(|(factor, field)| {
            field.parse::<u32>().map_err(|_| Error::NotANumber {
                factor: factor.name.clone(),
                input: field.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let stressors = record
        .get(count + 1)
        .map(|field| {
            field
                .split(';')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    Ok((id, Responses::new(ratings).with_stressors(stressors)))
}
