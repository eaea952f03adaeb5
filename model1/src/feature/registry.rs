//! 設定行から素性を構築するレジストリ

use std::sync::Arc;

use hashbrown::HashMap;

use crate::config::{DecoderConfig, FeatureLine};
use crate::errors::{Model1Error, Result};
use crate::feature::FeatureFunction;
use crate::feature::model1::Model1Feature;
use crate::symbol::SymbolPool;

/// 素性の名前とシンボルプールから未設定の素性を作る関数
pub type FeatureBuilder = fn(String, Arc<SymbolPool>) -> Box<dyn FeatureFunction>;

fn build_model1(name: String, pool: Arc<SymbolPool>) -> Box<dyn FeatureFunction> {
    Box::new(Model1Feature::new(name, pool))
}

/// 型名から素性を構築するレジストリ
///
/// `Model1` は標準で登録されています。
pub struct FeatureRegistry {
    builders: HashMap<String, FeatureBuilder>,
    counts: HashMap<String, usize>,
    pool: Arc<SymbolPool>,
}

impl FeatureRegistry {
    /// 新しいレジストリを作成します。
    ///
    /// 構築される素性はすべて `pool` を共有します。
    pub fn new(pool: Arc<SymbolPool>) -> Self {
        let mut registry = Self {
            builders: HashMap::new(),
            counts: HashMap::new(),
            pool,
        };
        registry.register("Model1", build_model1);
        registry
    }

    /// 型名に対応する構築関数を登録します。既存の登録は置き換えられます。
    pub fn register<S>(&mut self, feature_type: S, builder: FeatureBuilder)
    where
        S: Into<String>,
    {
        self.builders.insert(feature_type.into(), builder);
    }

    /// 素性を構築して設定します。
    ///
    /// 名前は `name=` で指定されていればその値、なければ `<型名><通し番号>`
    /// (通し番号は型ごとに0から)です。`name` 以外の引数は記述順に
    /// [`FeatureFunction::set_parameter`] に渡されます。
    ///
    /// # エラー
    ///
    /// 型名が登録されていない場合は [`Model1Error::InvalidArgument`] を返します。
    /// 引数の設定に失敗した場合はそのエラーを返します。
    pub fn create(&mut self, line: &FeatureLine) -> Result<Box<dyn FeatureFunction>> {
        let feature_type = line.feature_type();
        let builder = *self.builders.get(feature_type).ok_or_else(|| {
            Model1Error::invalid_argument(
                "feature_type",
                format!("Unknown feature type {feature_type}"),
            )
        })?;

        let index = self.counts.entry_ref(feature_type).or_insert(0);
        let name = match line.get("name") {
            Some(name) => name.to_string(),
            None => format!("{feature_type}{index}"),
        };
        *index += 1;

        let mut feature = builder(name, Arc::clone(&self.pool));
        for (key, value) in line.params() {
            if key == "name" {
                continue;
            }
            feature.set_parameter(key, value)?;
        }
        log::debug!("created feature {} of type {feature_type}", feature.name());
        Ok(feature)
    }

    /// 設定のすべての素性を記述順に構築します。
    pub fn create_all(&mut self, config: &DecoderConfig) -> Result<Vec<Box<dyn FeatureFunction>>> {
        config
            .features()
            .iter()
            .map(|line| self.create(line))
            .collect()
    }
}
