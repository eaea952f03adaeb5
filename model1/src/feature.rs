//! 素性関数の共通インタフェース
//!
//! デコーダは [`FeatureFunction`] を実装した素性を設定行から構築し
//! ([`registry::FeatureRegistry`])、読み込み後に仮説ごとのスコアを
//! [`ScoreBreakdown`] に加算させます。
//!
//! 語彙翻訳スコアを計算する素性は [`model1::Model1Feature`] です。

pub mod model1;
pub mod registry;

use hashbrown::HashMap;

use crate::errors::{Model1Error, Result};
use crate::phrase::WordSequence;

/// 素性関数
///
/// 設定 ([`set_parameter`](Self::set_parameter)) と読み込み
/// ([`load`](Self::load)) は探索の開始前に1スレッドで行われます。
/// 読み込み後は状態が変化しないため、[`score`](Self::score) は
/// 複数のスレッドからロックなしで同時に呼び出せます。
pub trait FeatureFunction: Send + Sync {
    /// 素性の名前を返します。スコアはこの名前の下に加算されます。
    fn name(&self) -> &str;

    /// この素性が出力するスコアの数を返します。
    fn num_scores(&self) -> usize {
        1
    }

    /// 設定のキーと値を1組受け取ります。
    ///
    /// # エラー
    ///
    /// 未知のキーや不正な値の場合にエラーを返します。
    fn set_parameter(&mut self, key: &str, value: &str) -> Result<()>;

    /// 設定に従ってモデルを読み込みます。
    fn load(&mut self) -> Result<()>;

    /// 入力文と目的言語句に対するスコアを計算します。
    ///
    /// # エラー
    ///
    /// [`load`](Self::load) の前に呼ばれた場合にエラーを返します。
    fn score(&self, source: &dyn WordSequence, target: &dyn WordSequence) -> Result<f32>;

    /// スコアを計算し、この素性の名前の下で `scores` に加算します。
    fn evaluate(
        &self,
        source: &dyn WordSequence,
        target: &dyn WordSequence,
        scores: &mut ScoreBreakdown,
    ) -> Result<()> {
        let score = self.score(source, target)?;
        scores.plus_equals(self.name(), score);
        Ok(())
    }
}

/// 全ての素性が共通で受け付ける設定
#[derive(Clone, Debug)]
pub struct FeatureBase {
    name: String,
    num_scores: usize,
    tuneable: bool,
    filterable: bool,
    verbose: u8,
}

impl FeatureBase {
    /// 新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `name` - 素性の名前
    /// * `num_scores` - 素性が出力するスコアの数
    pub fn new<S>(name: S, num_scores: usize) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            num_scores,
            tuneable: true,
            filterable: true,
            verbose: 0,
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub const fn num_scores(&self) -> usize {
        self.num_scores
    }

    pub const fn tuneable(&self) -> bool {
        self.tuneable
    }

    pub const fn filterable(&self) -> bool {
        self.filterable
    }

    /// 素性ごとの詳細ログのレベルを返します。
    pub const fn verbose(&self) -> u8 {
        self.verbose
    }

    /// 共通の設定キーを処理します。
    ///
    /// 受け付けるキーは `name`、`num-features`、`tuneable`、`filterable`、
    /// `verbose` です。
    ///
    /// # エラー
    ///
    /// 未知のキーや、値が解釈できない場合に [`Model1Error::InvalidArgument`] を返します。
    pub fn set_parameter(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "name" => self.name = value.to_string(),
            "num-features" => {
                let n: usize = value.parse().map_err(|_| {
                    Model1Error::invalid_argument("num-features", format!("not a number: {value}"))
                })?;
                if n != self.num_scores {
                    return Err(Model1Error::invalid_argument(
                        "num-features",
                        format!("{} produces {} score(s), not {n}", self.name, self.num_scores),
                    ));
                }
            }
            "tuneable" => self.tuneable = parse_bool("tuneable", value)?,
            "filterable" => self.filterable = parse_bool("filterable", value)?,
            "verbose" => {
                self.verbose = value.parse().map_err(|_| {
                    Model1Error::invalid_argument("verbose", format!("not a level: {value}"))
                })?;
            }
            _ => {
                return Err(Model1Error::invalid_argument(
                    "key",
                    format!("Unknown argument {key}={value} for {}", self.name),
                ));
            }
        }
        Ok(())
    }
}

fn parse_bool(arg: &'static str, value: &str) -> Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Model1Error::invalid_argument(
            arg,
            format!("not a boolean: {value}"),
        )),
    }
}

/// 仮説ごとの素性スコアの集計
#[derive(Clone, Debug, Default)]
pub struct ScoreBreakdown {
    scores: HashMap<String, f32>,
}

impl ScoreBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// 素性 `name` のスコアに `score` を加算します。
    pub fn plus_equals(&mut self, name: &str, score: f32) {
        *self.scores.entry_ref(name).or_insert(0.0) += score;
    }

    /// 素性 `name` のスコアを返します。
    pub fn get(&self, name: &str) -> Option<f32> {
        self.scores.get(name).copied()
    }

    /// `(素性名, スコア)` のイテレータを取得します。順序は不定です。
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.scores.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// 集計をクリアします。
    pub fn clear(&mut self) {
        self.scores.clear();
    }
}
