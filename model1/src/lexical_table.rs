//! 語彙翻訳確率表
//!
//! `(原言語ハンドル, 目的言語ハンドル)` をキーとする疎な確率表です。
//! 表に存在しない組や、下限値未満の確率は下限値として読み出されます。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use hashbrown::HashMap;

use crate::errors::{Model1Error, Result};
use crate::symbol::Handle;
use crate::utils;
use crate::vocabulary::Vocabulary;

/// 確率の下限値のデフォルト
pub const DEFAULT_FLOOR: f32 = 1e-7;

/// 語彙翻訳確率表 `p(target | source)`
#[derive(Debug, Clone)]
pub struct LexicalTable {
    table: HashMap<Handle, HashMap<Handle, f32>>,
    floor: f32,
}

impl Default for LexicalTable {
    fn default() -> Self {
        Self::new(DEFAULT_FLOOR)
    }
}

impl LexicalTable {
    /// 指定された下限値で空の表を作成します。
    pub fn new(floor: f32) -> Self {
        Self {
            table: HashMap::new(),
            floor,
        }
    }

    /// 確率の下限値を返します。
    #[inline(always)]
    pub const fn floor(&self) -> f32 {
        self.floor
    }

    /// 確率の下限値を変更します。格納済みの値は変更されません。
    pub fn set_floor(&mut self, floor: f32) {
        self.floor = floor;
    }

    /// 確率を格納します。同じ組が既にあれば上書きし、以前の値を返します。
    pub fn insert(&mut self, source: Handle, target: Handle, prob: f32) -> Option<f32> {
        self.table.entry(source).or_default().insert(target, prob)
    }

    /// `p(target | source)` を返します。
    ///
    /// 表に存在しない場合や、格納値が下限値未満の場合は下限値を返します。
    #[inline(always)]
    pub fn get_probability(&self, source: Handle, target: Handle) -> f32 {
        match self.table.get(&source).and_then(|row| row.get(&target)) {
            Some(&prob) if prob >= self.floor => prob,
            _ => self.floor,
        }
    }

    /// 格納されたエントリ数を返します。
    pub fn len(&self) -> usize {
        self.table.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.table.values().all(HashMap::is_empty)
    }

    /// 格納された `(原言語, 目的言語, 確率)` を返すイテレータを取得します。順序は不定です。
    pub fn iter(&self) -> impl Iterator<Item = (Handle, Handle, f32)> + '_ {
        self.table
            .iter()
            .flat_map(|(&s, row)| row.iter().map(move |(&t, &p)| (s, t, p)))
    }

    /// 語彙翻訳表ファイルを読み込みます。
    ///
    /// 詳細は [`LexicalTable::load_from_reader`] を参照してください。
    pub fn load<P>(&mut self, path: P, vcb_s: &Vocabulary, vcb_t: &Vocabulary) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path)?;
        self.load_from_reader(file, &path.display().to_string(), vcb_s, vcb_t)
    }

    /// リーダーから語彙翻訳表を読み込みます。
    ///
    /// 各行は `原言語ID 目的言語ID 確率` の3列です。IDはそれぞれ
    /// `vcb_s` と `vcb_t` で解決されます。同じ組が複数回現れた場合は
    /// 最後の行の値が使われます。
    ///
    /// # エラー
    ///
    /// - 列数が3でない行、数値として解釈できない列、`[0, 1]` の範囲外の
    ///   確率がある場合は [`Model1Error::InvalidFormat`]
    /// - いずれかのIDが語彙に存在しない場合は [`Model1Error::UnknownVocabulary`]
    pub fn load_from_reader<R>(
        &mut self,
        rdr: R,
        name: &str,
        vcb_s: &Vocabulary,
        vcb_t: &Vocabulary,
    ) -> Result<()>
    where
        R: Read,
    {
        let mut num_rows = 0;
        utils::for_each_record(rdr, name, |line_no, [id_s, id_t, prob]| {
            let id_s: u32 = utils::parse_field(id_s, "source id", name, line_no)?;
            let id_t: u32 = utils::parse_field(id_t, "target id", name, line_no)?;
            let prob: f32 = utils::parse_field(prob, "probability", name, line_no)?;
            if !(0.0..=1.0).contains(&prob) {
                return Err(Model1Error::invalid_format_at(
                    name,
                    line_no,
                    format!("probability {prob} is out of range [0, 1]"),
                ));
            }
            let word_s = vcb_s.get_word(id_s);
            let word_t = vcb_t.get_word(id_t);
            let (Some(word_s), Some(word_t)) = (word_s, word_t) else {
                return Err(Model1Error::unknown_vocabulary(
                    name,
                    line_no,
                    word_s.is_none().then_some(id_s),
                    word_t.is_none().then_some(id_t),
                ));
            };
            if let Some(prev) = self.insert(word_s, word_t, prob) {
                log::warn!(
                    "{name}: line {line_no}: overwrites p({id_t} | {id_s}) = {prev} with {prob}"
                );
            }
            num_rows += 1;
            Ok(())
        })?;
        log::debug!("{name}: loaded {num_rows} lexical table rows");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::symbol::SymbolPool;

    fn vocabs(pool: &SymbolPool) -> (Vocabulary, Vocabulary) {
        let mut vcb_s = Vocabulary::new(pool);
        vcb_s
            .load_from_reader(pool, "1 le 1\n2 the 1\n".as_bytes(), "src.vcb")
            .unwrap();
        let mut vcb_t = Vocabulary::new(pool);
        vcb_t
            .load_from_reader(pool, "1 chat 1\n2 cat 1\n".as_bytes(), "trg.vcb")
            .unwrap();
        (vcb_s, vcb_t)
    }

    #[test]
    fn test_floor_fallback() {
        let pool = SymbolPool::new();
        let mut table = LexicalTable::new(1e-4);
        let a = pool.intern("a");
        let b = pool.intern("b");
        let c = pool.intern("c");
        table.insert(a, b, 0.25);
        table.insert(a, c, 1e-6);
        assert_eq!(table.get_probability(a, b), 0.25);
        assert_eq!(table.get_probability(a, c), 1e-4);
        assert_eq!(table.get_probability(b, a), 1e-4);
        assert_eq!(table.get_probability(a, a), 1e-4);
        assert_eq!(table.floor(), 1e-4);
    }

    #[test]
    fn test_default_floor() {
        let table = LexicalTable::default();
        assert_eq!(table.floor(), DEFAULT_FLOOR);
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_from_reader() {
        let pool = SymbolPool::new();
        let (vcb_s, vcb_t) = vocabs(&pool);
        let mut table = LexicalTable::new(1e-4);
        table
            .load_from_reader("1 2 0.9\n0 2 0.1\n".as_bytes(), "s2t.t1", &vcb_s, &vcb_t)
            .unwrap();
        let le = pool.lookup("le").unwrap();
        let cat = pool.lookup("cat").unwrap();
        let chat = pool.lookup("chat").unwrap();
        let null = pool.lookup("GIZANULL").unwrap();
        assert_eq!(table.get_probability(le, cat), 0.9);
        assert_eq!(table.get_probability(null, cat), 0.1);
        assert_eq!(table.get_probability(chat, cat), 1e-4);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_load_last_write_wins() {
        let pool = SymbolPool::new();
        let (vcb_s, vcb_t) = vocabs(&pool);
        let mut table = LexicalTable::default();
        table
            .load_from_reader("1 2 0.9\n1 2 0.3\n".as_bytes(), "s2t.t1", &vcb_s, &vcb_t)
            .unwrap();
        let le = pool.lookup("le").unwrap();
        let cat = pool.lookup("cat").unwrap();
        assert_eq!(table.get_probability(le, cat), 0.3);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_load_unknown_vocabulary() {
        let pool = SymbolPool::new();
        let (vcb_s, vcb_t) = vocabs(&pool);
        let mut table = LexicalTable::default();
        let err = table
            .load_from_reader("1 2 0.9\n\n1 5 0.3\n".as_bytes(), "s2t.t1", &vcb_s, &vcb_t)
            .unwrap_err();
        match err {
            Model1Error::UnknownVocabulary(e) => {
                assert_eq!(e.line(), 3);
                assert!(e.to_string().contains("target id 5"));
                assert!(!e.to_string().contains("source id"));
            }
            e => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_load_wrong_field_count() {
        let pool = SymbolPool::new();
        let (vcb_s, vcb_t) = vocabs(&pool);
        let mut table = LexicalTable::default();
        assert!(matches!(
            table.load_from_reader("1 2 0.9 7\n".as_bytes(), "s2t.t1", &vcb_s, &vcb_t),
            Err(Model1Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_load_invalid_probability() {
        let pool = SymbolPool::new();
        let (vcb_s, vcb_t) = vocabs(&pool);
        for row in ["1 2 abc\n", "1 2 1.5\n", "1 2 -0.1\n", "1 2 NaN\n"] {
            let mut table = LexicalTable::default();
            assert!(matches!(
                table.load_from_reader(row.as_bytes(), "s2t.t1", &vcb_s, &vcb_t),
                Err(Model1Error::InvalidFormat(_))
            ));
        }
    }
}
