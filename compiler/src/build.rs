//! バイナリモデルのビルドモジュール
//!
//! 語彙ファイルと語彙翻訳表を読み込み、[`CompiledModel`] として書き出します。

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use model1_rkyv::errors::Model1Error;
use model1_rkyv::lexical_table::DEFAULT_FLOOR;
use model1_rkyv::{CompiledModel, LexicalTable, SymbolPool, Vocabulary};

use clap::Parser;

/// ビルドコマンドの引数
#[derive(Parser, Debug)]
#[clap(
    name = "build",
    about = "A program to build the binary Model 1 lexical translation model."
)]
pub struct Args {
    /// Source vocabulary file (.vcb).
    #[clap(short = 's', long)]
    source_vocab_in: PathBuf,

    /// Target vocabulary file (.vcb).
    #[clap(short = 't', long)]
    target_vocab_in: PathBuf,

    /// Lexical translation table (.t1), rows of `sourceId targetId probability`.
    #[clap(short = 'l', long)]
    lexical_table_in: PathBuf,

    /// Probability floor stored in the model.
    #[clap(short = 'f', long, default_value_t = DEFAULT_FLOOR)]
    floor: f32,

    /// File to which the binary model is output.
    #[clap(short = 'o', long)]
    model_out: PathBuf,
}

/// ビルド処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 確率の下限値が `(0, 1]` の範囲外
    #[error("Invalid floor {0}: must be in (0, 1].")]
    InvalidFloor(f32),

    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 表の読み込みまたはモデルの書き込みエラー
    #[error("Model building failed: {0}")]
    Model1(#[from] Model1Error),
}

/// ビルドコマンドを実行する
///
/// # エラー
///
/// ファイルの読み書きや表の解析に失敗した場合、`BuildError`を返します。
pub fn run(args: Args) -> Result<(), BuildError> {
    if !(args.floor > 0.0 && args.floor <= 1.0) {
        return Err(BuildError::InvalidFloor(args.floor));
    }

    eprintln!("Loading the lexical tables...");
    let pool = SymbolPool::new();
    let model = build_model(&pool, &args)?;
    eprintln!(
        "{} symbols, {} table entries",
        pool.len(),
        model.num_entries()
    );

    eprintln!("Writing the binary model...");
    let file = File::create(&args.model_out)?;
    model.write(BufWriter::new(file))?;

    eprintln!("Successfully built the model to {}", args.model_out.display());
    Ok(())
}

/// テキスト形式の表を読み込み、バイナリモデルを作成する
///
/// CLIに依存しないコアのビルドロジックです。
pub fn build_model(pool: &SymbolPool, args: &Args) -> Result<CompiledModel, BuildError> {
    let mut vcb_s = Vocabulary::new(pool);
    vcb_s.load(pool, &args.source_vocab_in)?;

    let mut vcb_t = Vocabulary::new(pool);
    vcb_t.load(pool, &args.target_vocab_in)?;

    let mut table = LexicalTable::new(args.floor);
    table.load(&args.lexical_table_in, &vcb_s, &vcb_t)?;

    Ok(CompiledModel::from_tables(pool, &vcb_s, &vcb_t, &table)?)
}
