//! Model 1 バイナリモデルコンパイラのメインエントリーポイント
//!
//! テキスト形式の語彙ファイルと語彙翻訳表から、`score` や `compiledModel` 設定で
//! 読み込めるバイナリモデルを作成するCLIツールです。

mod build;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::build::BuildError;

/// コマンドライン引数の構造体
#[derive(Parser, Debug)]
#[clap(name = "compile", version)]
struct Cli {
    /// 実行するサブコマンド
    #[clap(subcommand)]
    command: Command,
}

/// 利用可能なサブコマンド
#[derive(Parser, Debug)]
enum Command {
    /// テキスト形式の表からバイナリモデルを構築します
    ///
    /// 原言語・目的言語の語彙ファイル(.vcb)と語彙翻訳表(.t1)を読み込み、
    /// rkyv形式のバイナリモデルを出力します。
    Build(build::Args),
}

/// コンパイラの実行中に発生する可能性のあるエラー
#[derive(Debug, Error)]
pub enum CompileError {
    /// モデルビルド中のエラー
    #[error(transparent)]
    BuildError(#[from] BuildError),
}

/// ログ出力を初期化します。
///
/// ライブラリの`log`レコードは`RUST_LOG`(既定値は`info`)に従って標準エラー出力に出力されます。
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), CompileError> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => Ok(build::run(args)?),
    }
}
