//! 入力文と目的言語句の表現を提供するモジュール
//!
//! スコア計算では、入力文と目的言語句をいずれも [`Word`] の列として扱います。
//! [`WordSequence`] はその共通の読み取りインタフェースです。

use std::ops::Index;

use crate::errors::Result;
use crate::symbol::SymbolPool;
use crate::word::{NonTerminalMode, Word};

/// 文頭記号
pub const BOS: &str = "<s>";

/// 文末記号
pub const EOS: &str = "</s>";

/// [`Word`] の列への読み取り専用アクセス
pub trait WordSequence {
    /// 単語数を返します。
    fn len(&self) -> usize;

    /// `pos` 番目の単語を返します。
    ///
    /// # Panics
    ///
    /// `pos` が範囲外の場合にパニックします。
    fn word(&self, pos: usize) -> &Word;

    /// 列が空かどうかを返します。
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 目的言語句
///
/// 終端記号と非終端記号が混在する単語列です。
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Phrase {
    words: Vec<Word>,
}

impl Phrase {
    /// 単語列から新しいインスタンスを作成します。
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// 空白区切りの文字列を解析して新しいインスタンスを作成します。
    ///
    /// # エラー
    ///
    /// いずれかのトークンが [`Word::from_str`] で解析できない場合にエラーを返します。
    pub fn from_str(pool: &SymbolPool, text: &str, mode: NonTerminalMode) -> Result<Self> {
        let words = text
            .split_ascii_whitespace()
            .map(|token| Word::from_str(pool, token, mode))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { words })
    }

    /// 単語のイテレータを取得します。
    pub fn iter(&self) -> std::slice::Iter<'_, Word> {
        self.words.iter()
    }
}

impl WordSequence for Phrase {
    #[inline(always)]
    fn len(&self) -> usize {
        self.words.len()
    }

    #[inline(always)]
    fn word(&self, pos: usize) -> &Word {
        &self.words[pos]
    }
}

impl Index<usize> for Phrase {
    type Output = Word;

    fn index(&self, pos: usize) -> &Word {
        &self.words[pos]
    }
}

/// 入力文
///
/// 先頭と末尾は常に文頭記号 [`BOS`] と文末記号 [`EOS`] です。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sentence {
    words: Vec<Word>,
}

impl Sentence {
    /// 空白区切りの文字列を解析し、文頭・文末記号を付けた入力文を作成します。
    ///
    /// 入力文の各トークンは終端記号として解析されます。
    ///
    /// # エラー
    ///
    /// いずれかのトークンが [`Word::from_str`] で解析できない場合にエラーを返します。
    ///
    /// # 例
    ///
    /// ```
    /// use model1_rkyv::phrase::{Sentence, WordSequence};
    /// use model1_rkyv::symbol::SymbolPool;
    ///
    /// let pool = SymbolPool::new();
    /// let sent = Sentence::from_str(&pool, "le chat")?;
    /// assert_eq!(sent.len(), 4);
    /// assert_eq!(sent.word(0).factor(0), pool.lookup("<s>"));
    /// assert_eq!(sent.word(3).factor(0), pool.lookup("</s>"));
    /// # Ok::<(), model1_rkyv::errors::Model1Error>(())
    /// ```
    pub fn from_str(pool: &SymbolPool, text: &str) -> Result<Self> {
        let mut words = vec![Word::terminal_from_str(pool, BOS)?];
        for token in text.split_ascii_whitespace() {
            words.push(Word::terminal_from_str(pool, token)?);
        }
        words.push(Word::terminal_from_str(pool, EOS)?);
        Ok(Self { words })
    }
}

impl WordSequence for Sentence {
    #[inline(always)]
    fn len(&self) -> usize {
        self.words.len()
    }

    #[inline(always)]
    fn word(&self, pos: usize) -> &Word {
        &self.words[pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_from_str() {
        let pool = SymbolPool::new();
        let phrase =
            Phrase::from_str(&pool, "the [NP] of  cats", NonTerminalMode::SingleLabel).unwrap();
        assert_eq!(phrase.len(), 4);
        assert!(phrase.word(1).is_non_terminal());
        assert!(!phrase[3].is_non_terminal());
        assert_eq!(phrase[3].factor(0), pool.lookup("cats"));
    }

    #[test]
    fn test_phrase_invalid_token() {
        let pool = SymbolPool::new();
        assert!(Phrase::from_str(&pool, "the [NP]", NonTerminalMode::DoubleLabel).is_err());
    }

    #[test]
    fn test_sentence_boundaries() {
        let pool = SymbolPool::new();
        let sent = Sentence::from_str(&pool, "le chat noir").unwrap();
        assert_eq!(sent.len(), 5);
        let inner: Vec<_> = (1..sent.len() - 1).map(|i| sent.word(i).factor(0)).collect();
        assert_eq!(
            inner,
            vec![pool.lookup("le"), pool.lookup("chat"), pool.lookup("noir")]
        );
    }

    #[test]
    fn test_empty_sentence() {
        let pool = SymbolPool::new();
        let sent = Sentence::from_str(&pool, "  ").unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent.word(1).factor(0), pool.lookup(EOS));
    }

    #[test]
    fn test_sentence_tokens_are_terminals() {
        let pool = SymbolPool::new();
        let sent = Sentence::from_str(&pool, "[X]").unwrap();
        assert!(!sent.word(1).is_non_terminal());
    }
}
