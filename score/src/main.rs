//! 語彙翻訳スコアを計算するユーティリティ
//!
//! このバイナリは、設定ファイルの素性を読み込み、標準入力から読み込んだ
//! `入力文 ||| 目的言語句` の各行について素性ごとのスコアを出力します。

use std::error::Error;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use model1_rkyv::config::DecoderConfig;
use model1_rkyv::word::NonTerminalMode;
use model1_rkyv::{FeatureRegistry, Phrase, Sentence, SymbolPool};

use clap::Parser;
use tracing_subscriber::EnvFilter;

const PAIR_DELIMITER: &str = "|||";

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "score", about = "Scores phrase pairs with lexical translation features")]
struct Args {
    /// Decoder configuration file (moses.ini).
    #[clap(short = 'c', long)]
    config: PathBuf,

    /// Parses non-terminals in the target phrase as double labels, e.g. `[X][NP]`.
    #[clap(long)]
    double_nt: bool,
}

/// メイン関数
///
/// 素性を構築・読み込みし、標準入力の各行のスコアを素性の記述順にタブ区切りで出力します。
fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mode = if args.double_nt {
        NonTerminalMode::DoubleLabel
    } else {
        NonTerminalMode::SingleLabel
    };

    eprintln!("Loading the features...");
    let config = DecoderConfig::from_path(&args.config)?;
    let pool = Arc::new(SymbolPool::new());
    let mut registry = FeatureRegistry::new(Arc::clone(&pool));
    let mut features = registry.create_all(&config)?;
    for feature in &mut features {
        feature.load()?;
    }
    if features.is_empty() {
        eprintln!("Warning: no features in {}", args.config.display());
    }

    eprintln!("Ready to score");

    let is_tty = atty::is(atty::Stream::Stdout);

    let out = std::io::stdout();
    let mut out = BufWriter::new(out.lock());
    for (i, line) in std::io::stdin().lock().lines().enumerate() {
        let line = line?;
        let Some((source, target)) = line.split_once(PAIR_DELIMITER) else {
            return Err(format!("stdin: line {}: missing {PAIR_DELIMITER}", i + 1).into());
        };
        let source = Sentence::from_str(&pool, source)?;
        let target = Phrase::from_str(&pool, target, mode)?;
        for (j, feature) in features.iter().enumerate() {
            if j != 0 {
                out.write_all(b"\t")?;
            }
            write!(out, "{}", feature.score(&source, &target)?)?;
        }
        out.write_all(b"\n")?;
        if is_tty {
            out.flush()?;
        }
    }

    Ok(())
}
