//! IBM Model 1 の語彙翻訳確率による素性
//!
//! 目的言語句の各終端記号 `t` について、入力文の各単語 `s`
//! (文頭・文末記号を除く)と空ソース記号からの翻訳確率 `p(t | s)` を合計し、
//! その対数から入力文長による正規化項を引いた値を加算します。
//!
//! ```text
//! score = Σ_t ( ln( p(t | NULL) + Σ_s p(t | s) ) - ln(1 + |source|) )
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{Model1Error, Result};
use crate::feature::{FeatureBase, FeatureFunction};
use crate::lexical_table::{DEFAULT_FLOOR, LexicalTable};
use crate::model::CompiledModel;
use crate::phrase::WordSequence;
use crate::symbol::{Handle, SymbolPool};
use crate::vocabulary::{GIZA_NULL, Vocabulary};

/// 確率をスコアの尺度に変換します。
#[inline(always)]
pub fn transform_score(prob: f32) -> f32 {
    prob.ln()
}

/// 読み込み済みの Model 1
///
/// 構築後は変更されないため、複数のスレッドから共有できます。
#[derive(Debug, Clone)]
pub struct Model1 {
    vcb_s: Vocabulary,
    vcb_t: Vocabulary,
    table: LexicalTable,
    empty_word: Handle,
    trace: bool,
}

impl Model1 {
    /// 読み込み済みの表から新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `name` - エラーメッセージに使う素性の名前
    /// * `pool` - 表の構築に使ったシンボルプール
    /// * `vcb_s` - 原言語の語彙表
    /// * `vcb_t` - 目的言語の語彙表
    /// * `table` - 語彙翻訳確率表
    ///
    /// # エラー
    ///
    /// 空ソース記号がプールに存在しない場合に [`Model1Error::MissingSymbol`] を返します。
    pub fn new(
        name: &str,
        pool: &SymbolPool,
        vcb_s: Vocabulary,
        vcb_t: Vocabulary,
        table: LexicalTable,
    ) -> Result<Self> {
        let empty_word = pool
            .lookup(GIZA_NULL)
            .ok_or_else(|| Model1Error::missing_symbol(name, GIZA_NULL))?;
        Ok(Self {
            vcb_s,
            vcb_t,
            table,
            empty_word,
            trace: false,
        })
    }

    /// スコア計算中に各確率を `trace` レベルで出力するかどうかを設定します。
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn source_vocabulary(&self) -> &Vocabulary {
        &self.vcb_s
    }

    pub fn target_vocabulary(&self) -> &Vocabulary {
        &self.vcb_t
    }

    pub fn lexical_table(&self) -> &LexicalTable {
        &self.table
    }

    /// 空ソース記号のハンドルを返します。
    pub const fn empty_word(&self) -> Handle {
        self.empty_word
    }

    /// 入力文と目的言語句に対するスコアを計算します。
    ///
    /// 入力文の先頭と末尾は文頭・文末記号とみなし、確率の合計には含めません。
    /// 非終端記号はスコアに寄与しません。
    pub fn score<S, T>(&self, source: &S, target: &T) -> f32
    where
        S: WordSequence + ?Sized,
        T: WordSequence + ?Sized,
    {
        let norm = transform_score((1 + source.len()) as f32);
        let source_end = source.len().saturating_sub(1);

        let mut score = 0.0;
        for pos_t in 0..target.len() {
            let word_t = target.word(pos_t);
            if word_t.is_non_terminal() {
                continue;
            }
            let Some(factor_t) = word_t.factor(0) else {
                continue;
            };
            let mut this_word_prob = self.table.get_probability(self.empty_word, factor_t);
            for pos_s in 1..source_end {
                let Some(factor_s) = source.word(pos_s).factor(0) else {
                    continue;
                };
                let model_prob = self.table.get_probability(factor_s, factor_t);
                if self.trace {
                    log::trace!("p( {factor_t:?} | {factor_s:?} ) = {model_prob}");
                }
                this_word_prob += model_prob;
            }
            score += transform_score(this_word_prob) - norm;
        }
        score
    }
}

/// 語彙翻訳確率による素性
///
/// 受け付ける設定キー:
///
/// | キー | 内容 |
/// |------|------|
/// | `path` | 語彙翻訳表ファイル |
/// | `sourceVocabulary` | 原言語の語彙ファイル |
/// | `targetVocabulary` | 目的言語の語彙ファイル |
/// | `floor` | 確率の下限値(既定値 `1e-7`、バイナリモデルでは保存された値) |
/// | `compiledModel` | `compiler build` で作成したバイナリモデル |
///
/// その他のキーは [`FeatureBase::set_parameter`] に渡されます。
pub struct Model1Feature {
    base: FeatureBase,
    pool: Arc<SymbolPool>,
    file_name_model1: Option<PathBuf>,
    file_name_vcb_s: Option<PathBuf>,
    file_name_vcb_t: Option<PathBuf>,
    file_name_compiled: Option<PathBuf>,
    floor: Option<f32>,
    model: Option<Model1>,
}

impl Model1Feature {
    /// 設定前の新しいインスタンスを作成します。
    pub fn new<S>(name: S, pool: Arc<SymbolPool>) -> Self
    where
        S: Into<String>,
    {
        Self {
            base: FeatureBase::new(name, 1),
            pool,
            file_name_model1: None,
            file_name_vcb_s: None,
            file_name_vcb_t: None,
            file_name_compiled: None,
            floor: None,
            model: None,
        }
    }

    /// 共通の設定を返します。
    pub fn base(&self) -> &FeatureBase {
        &self.base
    }

    /// 読み込み済みのモデルを返します。
    pub fn model(&self) -> Option<&Model1> {
        self.model.as_ref()
    }

    fn required<'a>(path: &'a Option<PathBuf>, key: &'static str) -> Result<&'a PathBuf> {
        path.as_ref()
            .ok_or_else(|| Model1Error::invalid_argument(key, "must be specified"))
    }

    fn load_text_tables(&self) -> Result<(Vocabulary, Vocabulary, LexicalTable)> {
        let name = self.base.name();
        let path_vcb_s = Self::required(&self.file_name_vcb_s, "sourceVocabulary")?;
        let path_vcb_t = Self::required(&self.file_name_vcb_t, "targetVocabulary")?;
        let path_model1 = Self::required(&self.file_name_model1, "path")?;

        log::info!("{name}: Loading source vocabulary from file {}", path_vcb_s.display());
        let mut vcb_s = Vocabulary::new(&self.pool);
        vcb_s.load(&self.pool, path_vcb_s)?;

        log::info!("{name}: Loading target vocabulary from file {}", path_vcb_t.display());
        let mut vcb_t = Vocabulary::new(&self.pool);
        vcb_t.load(&self.pool, path_vcb_t)?;

        log::info!(
            "{name}: Loading model 1 lexical translation table from file {}",
            path_model1.display()
        );
        let mut table = LexicalTable::new(self.floor.unwrap_or(DEFAULT_FLOOR));
        table.load(path_model1, &vcb_s, &vcb_t)?;

        Ok((vcb_s, vcb_t, table))
    }

    fn load_compiled(&self, path: &Path) -> Result<(Vocabulary, Vocabulary, LexicalTable)> {
        log::info!(
            "{}: Loading compiled model 1 from file {}",
            self.base.name(),
            path.display()
        );
        let compiled = CompiledModel::from_path(path)?;
        let (vcb_s, vcb_t, mut table) = compiled.into_tables(&self.pool)?;
        if let Some(floor) = self.floor {
            table.set_floor(floor);
        }
        Ok((vcb_s, vcb_t, table))
    }
}

impl FeatureFunction for Model1Feature {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn num_scores(&self) -> usize {
        self.base.num_scores()
    }

    fn set_parameter(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "path" => self.file_name_model1 = Some(PathBuf::from(value)),
            "sourceVocabulary" => self.file_name_vcb_s = Some(PathBuf::from(value)),
            "targetVocabulary" => self.file_name_vcb_t = Some(PathBuf::from(value)),
            "compiledModel" => self.file_name_compiled = Some(PathBuf::from(value)),
            "floor" => {
                let floor: f32 = value.parse().map_err(|_| {
                    Model1Error::invalid_argument("floor", format!("not a number: {value}"))
                })?;
                if !(floor > 0.0 && floor <= 1.0) {
                    return Err(Model1Error::invalid_argument(
                        "floor",
                        format!("must be in (0, 1]: {value}"),
                    ));
                }
                self.floor = Some(floor);
            }
            _ => self.base.set_parameter(key, value)?,
        }
        Ok(())
    }

    fn load(&mut self) -> Result<()> {
        let (vcb_s, vcb_t, table) = match &self.file_name_compiled {
            Some(path) => {
                let text_paths = [
                    &self.file_name_model1,
                    &self.file_name_vcb_s,
                    &self.file_name_vcb_t,
                ];
                if text_paths.iter().any(|p| p.is_some()) {
                    return Err(Model1Error::invalid_argument(
                        "compiledModel",
                        "cannot be combined with path, sourceVocabulary or targetVocabulary",
                    ));
                }
                self.load_compiled(path)?
            }
            None => self.load_text_tables()?,
        };
        log::debug!(
            "{}: {} source words, {} target words, {} table entries",
            self.base.name(),
            vcb_s.len(),
            vcb_t.len(),
            table.len()
        );
        let model = Model1::new(self.base.name(), &self.pool, vcb_s, vcb_t, table)?
            .with_trace(self.base.verbose() >= 3);
        self.model = Some(model);
        log::info!("{}: Done.", self.base.name());
        Ok(())
    }

    fn score(&self, source: &dyn WordSequence, target: &dyn WordSequence) -> Result<f32> {
        let model = self.model.as_ref().ok_or_else(|| {
            Model1Error::invalid_state(
                format!("{} is not loaded", self.base.name()),
                "call load() before scoring",
            )
        })?;
        Ok(model.score(source, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::phrase::{Phrase, Sentence};
    use crate::word::NonTerminalMode;

    fn model(pool: &SymbolPool) -> Model1 {
        let mut vcb_s = Vocabulary::new(pool);
        vcb_s
            .load_from_reader(pool, "1 le 1\n2 chat 1\n".as_bytes(), "src.vcb")
            .unwrap();
        let mut vcb_t = Vocabulary::new(pool);
        vcb_t
            .load_from_reader(pool, "1 the 1\n2 cat 1\n".as_bytes(), "trg.vcb")
            .unwrap();
        let mut table = LexicalTable::new(1e-4);
        table
            .load_from_reader(
                "1 1 0.7\n2 2 0.8\n0 1 0.2\n0 2 0.1\n".as_bytes(),
                "s2t",
                &vcb_s,
                &vcb_t,
            )
            .unwrap();
        Model1::new("Model10", pool, vcb_s, vcb_t, table).unwrap()
    }

    #[test]
    fn test_score() {
        let pool = SymbolPool::new();
        let model = model(&pool);
        let source = Sentence::from_str(&pool, "le chat").unwrap();
        let target = Phrase::from_str(&pool, "the cat", NonTerminalMode::SingleLabel).unwrap();

        let norm = 5f32.ln();
        let the = (0.2f32 + 0.7 + 1e-4).ln() - norm;
        let cat = (0.1f32 + 1e-4 + 0.8).ln() - norm;
        let score = model.score(&source, &target);
        assert!((score - (the + cat)).abs() < 1e-6);
    }

    #[test]
    fn test_non_terminals_are_ignored() {
        let pool = SymbolPool::new();
        let model = model(&pool);
        let source = Sentence::from_str(&pool, "le chat").unwrap();
        let with_nt =
            Phrase::from_str(&pool, "the [NP] cat", NonTerminalMode::SingleLabel).unwrap();
        let without_nt = Phrase::from_str(&pool, "the cat", NonTerminalMode::SingleLabel).unwrap();
        assert_eq!(
            model.score(&source, &with_nt).to_bits(),
            model.score(&source, &without_nt).to_bits()
        );
        let only_nt = Phrase::from_str(&pool, "[NP]", NonTerminalMode::SingleLabel).unwrap();
        assert_eq!(model.score(&source, &only_nt), 0.0);
    }

    #[test]
    fn test_unknown_target_word_uses_floor() {
        let pool = SymbolPool::new();
        let model = model(&pool);
        let source = Sentence::from_str(&pool, "le").unwrap();
        let target = Phrase::from_str(&pool, "dog", NonTerminalMode::SingleLabel).unwrap();
        let expected = (2e-4f32).ln() - 4f32.ln();
        assert!((model.score(&source, &target) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_boundary_markers_are_excluded() {
        let pool = SymbolPool::new();
        let model = model(&pool);
        let source = Sentence::from_str(&pool, "").unwrap();
        let target = Phrase::from_str(&pool, "cat", NonTerminalMode::SingleLabel).unwrap();
        let expected = 0.1f32.ln() - 3f32.ln();
        assert!((model.score(&source, &target) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_missing_symbol() {
        let pool = SymbolPool::new();
        let other = SymbolPool::new();
        let vcb_s = Vocabulary::new(&other);
        let vcb_t = Vocabulary::new(&other);
        let result = Model1::new("Model10", &pool, vcb_s, vcb_t, LexicalTable::default());
        assert!(matches!(result, Err(Model1Error::MissingSymbol(_))));
    }

    #[test]
    fn test_set_parameter() {
        let pool = Arc::new(SymbolPool::new());
        let mut feature = Model1Feature::new("Model10", pool);
        feature.set_parameter("path", "s2t.t1").unwrap();
        feature.set_parameter("floor", "1e-4").unwrap();
        feature.set_parameter("tuneable", "false").unwrap();
        assert!(!feature.base().tuneable());
        assert!(feature.set_parameter("floor", "0").is_err());
        assert!(matches!(
            feature.set_parameter("lexicon", "x"),
            Err(Model1Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_score_before_load() {
        let pool = Arc::new(SymbolPool::new());
        let feature = Model1Feature::new("Model10", pool.clone());
        let source = Sentence::from_str(&pool, "le").unwrap();
        let target = Phrase::from_str(&pool, "the", NonTerminalMode::SingleLabel).unwrap();
        assert!(matches!(
            feature.score(&source, &target),
            Err(Model1Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_compiled_model_conflicts_with_text_paths() {
        let pool = Arc::new(SymbolPool::new());
        let mut feature = Model1Feature::new("Model10", pool);
        feature.set_parameter("compiledModel", "model1.bin").unwrap();
        feature.set_parameter("sourceVocabulary", "src.vcb").unwrap();
        match feature.load() {
            Err(Model1Error::InvalidArgument(e)) => assert_eq!(e.arg, "compiledModel"),
            r => panic!("unexpected result: {r:?}"),
        }
        assert!(feature.model().is_none());
    }

    #[test]
    fn test_load_without_paths() {
        let pool = Arc::new(SymbolPool::new());
        let mut feature = Model1Feature::new("Model10", pool);
        feature.set_parameter("path", "s2t.t1").unwrap();
        assert!(matches!(
            feature.load(),
            Err(Model1Error::InvalidArgument(_))
        ));
    }
}
