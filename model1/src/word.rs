//! 同期文法のトークン
//!
//! 表層文字列から [`Word`] を構築します。`[` と `]` で囲まれたトークンは
//! 非終端記号、それ以外は終端記号として扱われます。いずれの場合も
//! 中身を `|` で分割し、各要素をインターンして因子として格納します。

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::errors::{Model1Error, Result};
use crate::symbol::{Handle, SymbolPool};

/// 1語あたりの因子の最大数
pub const MAX_NUM_FACTORS: usize = 4;

/// 因子の区切り文字
pub const FACTOR_DELIMITER: char = '|';

/// 非終端記号のラベル形式
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NonTerminalMode {
    /// `[NP]` のように、ラベルが1つだけの形式。
    #[default]
    SingleLabel,
    /// `[X][NP]` のように、原言語側と目的言語側のラベルが並ぶ形式。
    ///
    /// 2つ目のラベルが因子として使われます。
    DoubleLabel,
}

/// 固定長の因子配列
///
/// 終端記号・非終端記号に共通する部分で、ハッシュは因子の並びのみから計算されます。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Factors {
    factors: [Option<Handle>; MAX_NUM_FACTORS],
}

impl Factors {
    /// ハンドルの列から因子配列を作成します。
    ///
    /// 因子が1つもない場合や、[`MAX_NUM_FACTORS`] を超える場合はエラーを返します。
    pub fn new<I>(handles: I) -> Result<Self>
    where
        I: IntoIterator<Item = Handle>,
    {
        let mut factors = [None; MAX_NUM_FACTORS];
        let mut len = 0;
        for handle in handles {
            let slot = factors.get_mut(len).ok_or_else(|| {
                Model1Error::invalid_format(
                    "word",
                    format!("a word must have at most {MAX_NUM_FACTORS} factors"),
                )
            })?;
            *slot = Some(handle);
            len += 1;
        }
        if len == 0 {
            return Err(Model1Error::invalid_format("word", "a word has no factors"));
        }
        Ok(Self { factors })
    }

    /// `i` 番目の因子を返します。
    #[inline(always)]
    pub fn get(&self, i: usize) -> Option<Handle> {
        self.factors.get(i).copied().flatten()
    }

    /// 因子の数を返します。
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.factors[0].is_none()
    }

    /// 因子を順に返すイテレータを取得します。
    pub fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.factors.iter().map_while(|f| *f)
    }
}

/// 同期文法のトークン
///
/// 構築後は変更されません。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Word {
    factors: Factors,
    is_non_terminal: bool,
}

impl Hash for Word {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.factors.hash(state);
        self.is_non_terminal.hash(state);
    }
}

impl Word {
    /// 因子配列から終端記号を作成します。
    pub const fn terminal(factors: Factors) -> Self {
        Self {
            factors,
            is_non_terminal: false,
        }
    }

    /// 因子配列から非終端記号を作成します。
    pub const fn non_terminal(factors: Factors) -> Self {
        Self {
            factors,
            is_non_terminal: true,
        }
    }

    /// 表層文字列を解析して新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `pool` - 因子をインターンするシンボルプール
    /// * `token` - 1トークン分の表層文字列
    /// * `mode` - 非終端記号のラベル形式
    ///
    /// # エラー
    ///
    /// 次の場合に [`Model1Error::InvalidFormat`] を返します。
    ///
    /// - [`NonTerminalMode::DoubleLabel`] で2つ目の `[` が存在しない場合
    /// - 因子が1つもない場合、または [`MAX_NUM_FACTORS`] を超える場合
    ///
    /// # 例
    ///
    /// ```
    /// use model1_rkyv::symbol::SymbolPool;
    /// use model1_rkyv::word::{NonTerminalMode, Word};
    ///
    /// let pool = SymbolPool::new();
    /// let w = Word::from_str(&pool, "[X][NP|label]", NonTerminalMode::DoubleLabel)?;
    /// assert!(w.is_non_terminal());
    /// assert_eq!(w.factor(0), pool.lookup("NP"));
    /// assert_eq!(w.factor(1), pool.lookup("label"));
    /// assert_eq!(w.display(&pool).to_string(), "[NP|label]");
    /// # Ok::<(), model1_rkyv::errors::Model1Error>(())
    /// ```
    pub fn from_str(pool: &SymbolPool, token: &str, mode: NonTerminalMode) -> Result<Self> {
        let is_non_terminal = token.len() >= 2 && token.starts_with('[') && token.ends_with(']');

        let payload = if is_non_terminal {
            match mode {
                NonTerminalMode::SingleLabel => &token[1..token.len() - 1],
                NonTerminalMode::DoubleLabel => {
                    let start = token[1..].find('[').map(|i| i + 1).ok_or_else(|| {
                        Model1Error::invalid_format(
                            "word",
                            format!("a double-label non-terminal needs a second label, {token:?}"),
                        )
                    })?;
                    &token[start + 1..token.len() - 1]
                }
            }
        } else {
            token
        };

        Self::from_payload(pool, token, payload, is_non_terminal)
    }

    /// 括弧を解釈せずに、表層文字列全体を終端記号として解析します。
    ///
    /// 入力文のトークンのように、文法記号が現れない文脈で使います。
    pub fn terminal_from_str(pool: &SymbolPool, token: &str) -> Result<Self> {
        Self::from_payload(pool, token, token, false)
    }

    fn from_payload(
        pool: &SymbolPool,
        token: &str,
        payload: &str,
        is_non_terminal: bool,
    ) -> Result<Self> {
        let factors = Factors::new(
            payload
                .split(FACTOR_DELIMITER)
                .filter(|piece| !piece.is_empty())
                .map(|piece| pool.intern(piece)),
        )
        .map_err(|e| match e {
            Model1Error::InvalidFormat(mut e) => {
                e.msg = format!("{}, {token:?}", e.msg);
                Model1Error::InvalidFormat(e)
            }
            e => e,
        })?;

        Ok(Self {
            factors,
            is_non_terminal,
        })
    }

    /// 非終端記号かどうかを返します。
    #[inline(always)]
    pub const fn is_non_terminal(&self) -> bool {
        self.is_non_terminal
    }

    /// `i` 番目の因子を返します。
    #[inline(always)]
    pub fn factor(&self, i: usize) -> Option<Handle> {
        self.factors.get(i)
    }

    /// 因子配列を返します。
    #[inline(always)]
    pub const fn factors(&self) -> &Factors {
        &self.factors
    }

    /// 表示用のラッパーを返します。
    ///
    /// 因子を `|` で連結し、非終端記号の場合は `[` と `]` で囲みます。
    pub fn display<'a>(&'a self, pool: &'a SymbolPool) -> WordDisplay<'a> {
        WordDisplay { word: self, pool }
    }
}

/// [`Word::display`] が返す表示用ラッパー
pub struct WordDisplay<'a> {
    word: &'a Word,
    pool: &'a SymbolPool,
}

impl fmt::Display for WordDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.word.is_non_terminal {
            f.write_str("[")?;
        }
        for (i, handle) in self.word.factors.iter().enumerate() {
            if i != 0 {
                write!(f, "{FACTOR_DELIMITER}")?;
            }
            match self.pool.resolve(handle) {
                Some(text) => f.write_str(&text)?,
                None => write!(f, "<{}>", handle.index())?,
            }
        }
        if self.word.is_non_terminal {
            f.write_str("]")?;
        }
        Ok(())
    }
}
