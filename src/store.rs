use crate::{Error, Questionnaire, Responses};

/// 回答中のセッション状態
///
/// 評点は尺度の初期値で埋めておき、チェックリストは空から始める。
/// 状態は呼び出し側が持ち、評価のときに `responses()` で渡す。
#[derive(Debug, Clone)]
pub struct RatingStore<'q> {
    questionnaire: &'q Questionnaire,
    values: Vec<u32>,
    offset: usize,
    selected: Vec<bool>,
}

impl<'q> RatingStore<'q> {
    pub fn new(questionnaire: &'q Questionnaire) -> Self {
        Self {
            questionnaire,
            values: vec![questionnaire.scale.default; questionnaire.factors.len()],
            offset: 0,
            selected: vec![false; questionnaire.stressors.len()],
        }
    }

    pub fn questionnaire(&self) -> &'q Questionnaire {
        self.questionnaire
    }

    /// 次の未回答の因子に評点を格納する
    pub fn push(&mut self, value: u32) -> Result<(), Error> {
        if self.offset >= self.values.len() {
            return Err(Error::RatingCount {
                expected: self.values.len(),
                actual: self.offset + 1,
            });
        }
        self.insert(self.offset + 1, value)?;
        self.offset += 1;
        Ok(())
    }

    /// 並び順(1始まり)を指定して評点を格納する
    pub fn insert(&mut self, position: usize, value: u32) -> Result<(), Error> {
        let factor = position
            .checked_sub(1)
            .and_then(|index| self.questionnaire.factors.get(index))
            .ok_or_else(|| Error::UnknownFactor(format!("#{}", position)))?;
        if !self.questionnaire.scale.contains(value) {
            return Err(Error::InvalidRating {
                factor: factor.name.clone(),
                value,
                min: self.questionnaire.scale.min,
                max: self.questionnaire.scale.max,
            });
        }
        self.values[position - 1] = value;
        Ok(())
    }

    /// 因子名を指定して評点を格納する
    pub fn set(&mut self, factor: &str, value: u32) -> Result<(), Error> {
        let index = self
            .questionnaire
            .position(factor)
            .ok_or_else(|| Error::UnknownFactor(factor.to_string()))?;
        self.insert(index + 1, value)
    }

    /// 次に `push` される因子の並び順(0始まり)
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_complete(&self) -> bool {
        self.offset == self.values.len()
    }

    pub fn ratings(&self) -> &[u32] {
        &self.values
    }

    pub fn select_stressor(&mut self, id: &str) -> Result<(), Error> {
        let index = self.stressor_index(id)?;
        self.selected[index] = true;
        Ok(())
    }

    /// チェックリストの選択を反転し、反転後の状態を返す
    pub fn toggle_stressor(&mut self, id: &str) -> Result<bool, Error> {
        let index = self.stressor_index(id)?;
        self.selected[index] = !self.selected[index];
        Ok(self.selected[index])
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.stressor_index(id)
            .map(|index| self.selected[index])
            .unwrap_or(false)
    }

    /// 初期値に戻す
    pub fn reset(&mut self) {
        self.values.fill(self.questionnaire.scale.default);
        self.selected.fill(false);
        self.offset = 0;
    }

    pub fn responses(&self) -> Responses {
        Responses::new(self.values.clone()).with_stressors(
            self.questionnaire
                .stressors
                .iter()
                .zip(&self.selected)
                .filter(|&(_, &selected)| selected)
                .map(|(stressor, _)| stressor.id.clone()),
        )
    }

    fn stressor_index(&self, id: &str) -> Result<usize, Error> {
        self.questionnaire
            .stressors
            .iter()
            .position(|stressor| stressor.id == id)
            .ok_or_else(|| Error::UnknownStressor(id.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Bucket;

    fn poms() -> &'static Questionnaire {
        Questionnaire::preset("poms").unwrap()
    }

    #[test]
    fn test_defaults() {
        let store = RatingStore::new(poms());
        assert_eq!(store.ratings(), &[2; 12]);
        assert_eq!(store.offset(), 0);
        assert!(!store.is_complete());
        assert!(store.responses().stressors.is_empty());
    }

    #[test]
    fn test_push() {
        let mut store = RatingStore::new(poms());
        for _ in 0..12 {
            assert!(store.push(0).is_ok());
        }
        assert!(store.is_complete());
        assert!(matches!(
            store.push(0),
            Err(Error::RatingCount {
                expected: 12,
                actual: 13
            })
        ));
        let report = poms().evaluate(&store.responses()).unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(report.bucket, Bucket::Low);
    }

    #[test]
    fn test_push_out_of_range() {
        let mut store = RatingStore::new(poms());
        assert!(matches!(
            store.push(5),
            Err(Error::InvalidRating { value: 5, .. })
        ));
        assert_eq!(store.offset(), 0);
        assert!(store.push(4).is_ok());
        assert_eq!(store.offset(), 1);
    }

    #[test]
    fn test_insert() {
        let mut store = RatingStore::new(poms());
        assert!(matches!(store.insert(0, 1), Err(Error::UnknownFactor(_))));
        assert!(store.insert(1, 1).is_ok());
        assert!(store.insert(12, 1).is_ok());
        assert!(matches!(store.insert(13, 1), Err(Error::UnknownFactor(_))));
        assert!(store.insert(10, 5).is_err());
        assert_eq!(store.ratings()[0], 1);
        assert_eq!(store.ratings()[11], 1);
        assert_eq!(store.ratings()[9], 2);
    }

    #[test]
    fn test_set() {
        let mut store = RatingStore::new(poms());
        assert!(store.set("Homesickness", 4).is_ok());
        assert_eq!(store.ratings()[10], 4);
        assert!(matches!(
            store.set("Boredom", 1),
            Err(Error::UnknownFactor(name)) if name == "Boredom"
        ));
    }

    #[test]
    fn test_stressors() {
        let mut store = RatingStore::new(poms());
        assert!(store.select_stressor("health").is_ok());
        assert!(store.toggle_stressor("exams").unwrap());
        assert!(store.toggle_stressor("finances").unwrap());
        assert!(!store.toggle_stressor("finances").unwrap());
        assert!(store.is_selected("exams"));
        assert!(!store.is_selected("finances"));
        assert!(!store.is_selected("lottery"));
        assert!(matches!(
            store.toggle_stressor("lottery"),
            Err(Error::UnknownStressor(_))
        ));
        assert_eq!(store.responses().stressors, vec!["exams", "health"]);
    }

    #[test]
    fn test_reset() {
        let mut store = RatingStore::new(poms());
        store.push(4).unwrap();
        store.push(0).unwrap();
        store.select_stressor("exams").unwrap();
        store.reset();
        assert_eq!(store.ratings(), &[2; 12]);
        assert_eq!(store.offset(), 0);
        assert!(!store.is_selected("exams"));
        assert_eq!(store.responses(), Responses::new(vec![2; 12]));
    }
}
