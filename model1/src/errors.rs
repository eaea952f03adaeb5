//! エラー型の定義
//!
//! このモジュールは、model1-rkyvで使用されるすべてのエラー型を定義します。
//! 読み込み時のエラーはすべて致命的であり、再試行は想定していません。

use std::error::Error;
use std::fmt::{self, Debug};

/// model1-rkyv専用のResult型
///
/// エラー型としてデフォルトで[`Model1Error`]を使用します。
pub type Result<T, E = Model1Error> = std::result::Result<T, E>;

/// model1-rkyvのエラー型
#[derive(Debug, thiserror::Error)]
pub enum Model1Error {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// 語彙ファイル・語彙翻訳表の行のフィールド数が不正な場合や、
    /// 文法記号の括弧が不正な場合に発生します。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 無効な状態エラー
    ///
    /// [`InvalidStateError`]のエラーバリアント。
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// 語彙IDの重複エラー
    #[error(transparent)]
    DuplicateId(DuplicateIdError),

    /// 未知の語彙IDエラー
    #[error(transparent)]
    UnknownVocabulary(UnknownVocabularyError),

    /// 空ソース記号が解決できないエラー
    #[error(transparent)]
    MissingSymbol(MissingSymbolError),

    /// I/Oエラー
    ///
    /// [`std::io::Error`](std::io::Error)のエラーバリアント。
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// rkyvシリアライゼーションエラー
    ///
    /// [`rkyv::rancor::Error`](rkyv::rancor::Error)のエラーバリアント。
    #[error(transparent)]
    RkyvError(#[from] rkyv::rancor::Error),
}

impl Model1Error {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 行番号を持たない無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `name` - 入力の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<N, S>(name: N, msg: S) -> Self
    where
        N: Into<String>,
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            name: name.into(),
            line: None,
            msg: msg.into(),
        })
    }

    /// 行番号付きの無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `name` - ファイルの名前
    /// * `line` - 1始まりの行番号
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format_at<N, S>(name: N, line: usize, msg: S) -> Self
    where
        N: Into<String>,
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            name: name.into(),
            line: Some(line),
            msg: msg.into(),
        })
    }

    /// 無効な状態エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `cause` - エラーの原因
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }

    pub(crate) fn duplicate_id<N>(name: N, line: usize, id: u32, stored_id: Option<u32>) -> Self
    where
        N: Into<String>,
    {
        Self::DuplicateId(DuplicateIdError {
            name: name.into(),
            line,
            id,
            stored_id,
        })
    }

    pub(crate) fn unknown_vocabulary<N>(
        name: N,
        line: usize,
        source_id: Option<u32>,
        target_id: Option<u32>,
    ) -> Self
    where
        N: Into<String>,
    {
        Self::UnknownVocabulary(UnknownVocabularyError {
            name: name.into(),
            line,
            source_id,
            target_id,
        })
    }

    pub(crate) fn missing_symbol<F>(feature: F, symbol: &'static str) -> Self
    where
        F: Into<String>,
    {
        Self::MissingSymbol(MissingSymbolError {
            feature: feature.into(),
            symbol,
        })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// 入力ファイルのパスまたは入力の名前
    pub(crate) name: String,

    /// 1始まりの行番号
    pub(crate) line: Option<usize>,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl InvalidFormatError {
    /// エラーが発生した行番号を返します。
    pub fn line(&self) -> Option<usize> {
        self.line
    }
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "InvalidFormatError: {}: line {}: {}",
                self.name, line, self.msg
            ),
            None => write!(f, "InvalidFormatError: {}: {}", self.name, self.msg),
        }
    }
}

impl Error for InvalidFormatError {}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidStateError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}

/// 語彙ファイルの行が既存のエントリと衝突した場合に使用されるエラー
///
/// 既に使用されているIDを再定義した場合と、既に格納された表層形に
/// 別のIDを与えた場合があります。後者では `stored_id` が `Some` になります。
#[derive(Debug)]
pub struct DuplicateIdError {
    pub(crate) name: String,
    pub(crate) line: usize,
    pub(crate) id: u32,
    pub(crate) stored_id: Option<u32>,
}

impl DuplicateIdError {
    /// エラーが発生した行番号を返します。
    pub fn line(&self) -> usize {
        self.line
    }

    /// 行で指定されたIDを返します。
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 表層形が既に格納されていたIDを返します。
    pub fn stored_id(&self) -> Option<u32> {
        self.stored_id
    }
}

impl fmt::Display for DuplicateIdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.stored_id {
            Some(stored_id) => write!(
                f,
                "DuplicateIdError: {}: line {}: word is already stored with vocabulary id {}, cannot store it as {}",
                self.name, self.line, stored_id, self.id
            ),
            None => write!(
                f,
                "DuplicateIdError: {}: line {}: overwrites existing vocabulary entry {}",
                self.name, self.line, self.id
            ),
        }
    }
}

impl Error for DuplicateIdError {}

/// 語彙翻訳表の行が語彙に存在しないIDを参照した場合に使用されるエラー
///
/// 解決できなかった側のIDのみが `Some` になります。
#[derive(Debug)]
pub struct UnknownVocabularyError {
    pub(crate) name: String,
    pub(crate) line: usize,
    pub(crate) source_id: Option<u32>,
    pub(crate) target_id: Option<u32>,
}

impl UnknownVocabularyError {
    /// エラーが発生した行番号を返します。
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for UnknownVocabularyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "UnknownVocabularyError: {}: line {}: has unknown vocabulary",
            self.name, self.line
        )?;
        if let Some(id) = self.source_id {
            write!(f, " (source id {id})")?;
        }
        if let Some(id) = self.target_id {
            write!(f, " (target id {id})")?;
        }
        Ok(())
    }
}

impl Error for UnknownVocabularyError {}

/// 空ソース記号がシンボルプールに存在しない場合に使用されるエラー
#[derive(Debug)]
pub struct MissingSymbolError {
    pub(crate) feature: String,
    pub(crate) symbol: &'static str,
}

impl fmt::Display for MissingSymbolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "MissingSymbolError: {}: factor for {} does not exist",
            self.feature, self.symbol
        )
    }
}

impl Error for MissingSymbolError {}
