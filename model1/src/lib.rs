//! # Model1-rkyv
//!
//! 統計的機械翻訳のデコーダで使う、IBM Model 1 の語彙翻訳確率による素性の実装です。
//!
//! ## 概要
//!
//! GIZA++ 形式の語彙ファイル(`.vcb`)と語彙翻訳表(`.t1`)を読み込み、
//! 入力文と目的言語句の組に対して次のスコアを計算します。
//!
//! ```text
//! score = Σ_t ( ln( p(t | NULL) + Σ_s p(t | s) ) - ln(1 + |source|) )
//! ```
//!
//! 単語の文字列は [`SymbolPool`] でハンドルにインターンされ、表の検索は
//! すべてハンドルの比較で行われます。読み込んだ表は rkyv 形式のバイナリモデル
//! ([`CompiledModel`]) として保存でき、次回以降の読み込みを高速化できます。
//!
//! ## 主な機能
//!
//! - **語彙ファイルと語彙翻訳表の読み込み**: 行番号付きのエラー報告
//! - **文法記号の解析**: 因子(`|`区切り)と非終端記号(`[X]`、`[X][Y]`)
//! - **素性フレームワーク**: moses.ini 形式の設定から素性を構築
//! - **バイナリモデル**: rkyv による検証付きの保存と読み込み
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use model1_rkyv::{LexicalTable, Model1, Phrase, Sentence, SymbolPool, Vocabulary};
//! use model1_rkyv::word::NonTerminalMode;
//!
//! let pool = SymbolPool::new();
//!
//! let mut vcb_s = Vocabulary::new(&pool);
//! vcb_s.load_from_reader(&pool, "1 le 1\n2 chat 1\n".as_bytes(), "src.vcb")?;
//! let mut vcb_t = Vocabulary::new(&pool);
//! vcb_t.load_from_reader(&pool, "1 the 1\n2 cat 1\n".as_bytes(), "trg.vcb")?;
//!
//! let mut table = LexicalTable::default();
//! table.load_from_reader("1 1 0.7\n2 2 0.8\n".as_bytes(), "s2t.t1", &vcb_s, &vcb_t)?;
//!
//! let model = Model1::new("Model10", &pool, vcb_s, vcb_t, table)?;
//!
//! let source = Sentence::from_str(&pool, "le chat")?;
//! let target = Phrase::from_str(&pool, "the [NP] cat", NonTerminalMode::SingleLabel)?;
//! let score = model.score(&source, &target);
//! assert!(score < 0.0);
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// デコーダ設定ファイルの読み込み
pub mod config;

/// エラー型の定義
pub mod errors;

/// 素性関数と語彙翻訳素性
pub mod feature;

/// 語彙翻訳確率表
pub mod lexical_table;

/// バイナリモデルの保存と読み込み
pub mod model;

/// 入力文と目的言語句
pub mod phrase;

/// 文字列のインターン
pub mod symbol;

/// 内部ユーティリティ関数
pub mod utils;

/// 語彙ファイル
pub mod vocabulary;

/// 文法記号
pub mod word;

#[cfg(test)]
mod tests;

// Re-exports
pub use errors::{Model1Error, Result};
pub use feature::model1::{Model1, Model1Feature};
pub use feature::registry::FeatureRegistry;
pub use feature::{FeatureFunction, ScoreBreakdown};
pub use lexical_table::LexicalTable;
pub use model::CompiledModel;
pub use phrase::{Phrase, Sentence, WordSequence};
pub use symbol::{Handle, SymbolPool};
pub use vocabulary::Vocabulary;
pub use word::Word;

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
