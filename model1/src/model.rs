//! 語彙表と語彙翻訳表をまとめたバイナリモデル
//!
//! テキスト形式の語彙ファイルと語彙翻訳表の読み込みは、大きな表では
//! 起動時間の大半を占めます。[`CompiledModel`] はこれらを `rkyv` 形式で
//! 1つのファイルに保存し、読み込み時に検証してから復元します。
//!
//! ファイルの先頭には [`MODEL_MAGIC`] があり、続くデータが16バイト境界から
//! 始まるようにパディングされます。
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use rkyv::rancor::Error;
use rkyv::util::AlignedVec;
use rkyv::{
    Archive, Deserialize, Serialize, access, api::serialize_using, ser::Serializer,
    ser::allocator::Arena, ser::sharing::Share, ser::writer::IoWriter, util::with_arena,
};

use crate::errors::{Model1Error, Result};
use crate::lexical_table::LexicalTable;
use crate::symbol::SymbolPool;
use crate::vocabulary::{StoreError, Vocabulary};

/// バイナリモデルを識別するマジックバイト。
///
/// "0.1" はファイルフォーマットのバージョンであり、クレートのバージョンとは独立しています。
pub const MODEL_MAGIC: &[u8] = b"Model1LexicalTableRkyv 0.1\n";

const MODEL_MAGIC_LEN: usize = MODEL_MAGIC.len();
const RKYV_ALIGNMENT: usize = 16;
const PADDING_LEN: usize = (RKYV_ALIGNMENT - (MODEL_MAGIC_LEN % RKYV_ALIGNMENT)) % RKYV_ALIGNMENT;

const MODEL_NAME: &str = "compiled model";

/// 語彙表の1エントリ
#[derive(Archive, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VocabEntry {
    id: u32,
    word: String,
}

/// 語彙翻訳表の1エントリ
#[derive(Archive, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TableEntry {
    source_id: u32,
    target_id: u32,
    prob: f32,
}

/// シリアライズ可能な Model 1 の表一式
///
/// 単語はハンドルではなく文字列で保持されるため、読み込み側は任意の
/// [`SymbolPool`] に復元できます。
#[derive(Archive, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CompiledModel {
    source_vocab: Vec<VocabEntry>,
    target_vocab: Vec<VocabEntry>,
    entries: Vec<TableEntry>,
    floor: f32,
}

impl CompiledModel {
    /// 読み込み済みの表からバイナリモデルを作成します。
    ///
    /// エントリは `(原言語ID, 目的言語ID)` の順に並べられるため、
    /// 同じ表からは常に同じバイト列が得られます。
    ///
    /// # エラー
    ///
    /// 表のハンドルが `pool` または語彙表で解決できない場合に
    /// [`Model1Error::InvalidState`] を返します。
    pub fn from_tables(
        pool: &SymbolPool,
        vcb_s: &Vocabulary,
        vcb_t: &Vocabulary,
        table: &LexicalTable,
    ) -> Result<Self> {
        let source_vocab = Self::vocab_entries(pool, vcb_s)?;
        let target_vocab = Self::vocab_entries(pool, vcb_t)?;

        let mut entries = table
            .iter()
            .map(|(word_s, word_t, prob)| {
                let source_id = vcb_s.get_word_id(word_s).ok_or_else(|| {
                    Model1Error::invalid_state(
                        "lexical table refers to a word outside the source vocabulary",
                        format!("{word_s:?}"),
                    )
                })?;
                let target_id = vcb_t.get_word_id(word_t).ok_or_else(|| {
                    Model1Error::invalid_state(
                        "lexical table refers to a word outside the target vocabulary",
                        format!("{word_t:?}"),
                    )
                })?;
                Ok(TableEntry {
                    source_id,
                    target_id,
                    prob,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        entries.sort_unstable_by_key(|e| (e.source_id, e.target_id));

        Ok(Self {
            source_vocab,
            target_vocab,
            entries,
            floor: table.floor(),
        })
    }

    fn vocab_entries(pool: &SymbolPool, vocab: &Vocabulary) -> Result<Vec<VocabEntry>> {
        vocab
            .iter()
            .filter(|&(id, _)| id != 0)
            .map(|(id, word)| {
                let word = pool.resolve(word).ok_or_else(|| {
                    Model1Error::invalid_state(
                        "vocabulary handle is not in the symbol pool",
                        format!("id {id}"),
                    )
                })?;
                Ok(VocabEntry {
                    id,
                    word: word.to_string(),
                })
            })
            .collect()
    }

    /// 確率の下限値を返します。
    pub const fn floor(&self) -> f32 {
        self.floor
    }

    /// 語彙翻訳表のエントリ数を返します。
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// `pool` に単語をインターンし、語彙表と語彙翻訳表を復元します。
    ///
    /// # エラー
    ///
    /// 語彙IDが重複している場合や、表のエントリが未知の語彙IDを
    /// 参照している場合に [`Model1Error::InvalidFormat`] を返します。
    pub fn into_tables(self, pool: &SymbolPool) -> Result<(Vocabulary, Vocabulary, LexicalTable)> {
        let vcb_s = Self::restore_vocab(pool, &self.source_vocab, "source")?;
        let vcb_t = Self::restore_vocab(pool, &self.target_vocab, "target")?;

        let mut table = LexicalTable::new(self.floor);
        for entry in &self.entries {
            let (Some(word_s), Some(word_t)) =
                (vcb_s.get_word(entry.source_id), vcb_t.get_word(entry.target_id))
            else {
                return Err(Model1Error::invalid_format(
                    MODEL_NAME,
                    format!(
                        "entry ({}, {}) refers to an unknown vocabulary id",
                        entry.source_id, entry.target_id
                    ),
                ));
            };
            table.insert(word_s, word_t, entry.prob);
        }
        Ok((vcb_s, vcb_t, table))
    }

    fn restore_vocab(pool: &SymbolPool, entries: &[VocabEntry], side: &str) -> Result<Vocabulary> {
        let mut vocab = Vocabulary::new(pool);
        for entry in entries {
            let msg = match vocab.try_store(pool.intern(&entry.word), entry.id) {
                Ok(()) => continue,
                Err(StoreError::IdInUse | StoreError::WordBound(_)) => {
                    format!("duplicate {side} vocabulary id {}", entry.id)
                }
                Err(StoreError::IdOutOfRange) => {
                    format!("{side} vocabulary id {} is too large", entry.id)
                }
            };
            return Err(Model1Error::invalid_format(MODEL_NAME, msg));
        }
        Ok(vocab)
    }

    /// モデルを`rkyv`フォーマットでライターに書き込みます。
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合、または`rkyv`のシリアライズに失敗した場合にエラーを返します。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(MODEL_MAGIC)?;

        let padding_bytes = vec![0xFF; PADDING_LEN];
        wtr.write_all(&padding_bytes)?;

        with_arena(|arena: &mut Arena| {
            let writer = IoWriter::new(&mut wtr);
            let mut serializer = Serializer::new(writer, arena.acquire(), Share::new());
            serialize_using::<_, Error>(self, &mut serializer)
        })
        .map_err(|e| {
            Model1Error::invalid_state("rkyv serialization failed".to_string(), e.to_string())
        })?;

        wtr.flush()?;
        Ok(())
    }

    /// リーダーからモデルを読み込みます。
    ///
    /// データ全体をアライメント済みのバッファに読み込み、検証してから復元します。
    ///
    /// # エラー
    ///
    /// - マジックナンバーが一致しない場合は [`Model1Error::InvalidArgument`]
    /// - データが破損している場合は [`Model1Error::InvalidState`]
    pub fn read<R: Read>(mut rdr: R) -> Result<Self> {
        let mut magic = [0; MODEL_MAGIC_LEN];
        rdr.read_exact(&mut magic)?;
        if !magic.starts_with(MODEL_MAGIC) {
            return Err(Model1Error::invalid_argument(
                "rdr",
                "The magic number of the input model mismatches.",
            ));
        }

        let mut padding_buf = vec![0; PADDING_LEN];
        rdr.read_exact(&mut padding_buf)?;

        let mut buffer = Vec::new();
        rdr.read_to_end(&mut buffer)?;

        let mut aligned_bytes: AlignedVec = AlignedVec::with_capacity(buffer.len());
        aligned_bytes.extend_from_slice(&buffer);

        let archived = access::<ArchivedCompiledModel, Error>(&aligned_bytes).map_err(|e| {
            Model1Error::invalid_state(
                "rkyv validation failed. The model file may be corrupted or incompatible."
                    .to_string(),
                e.to_string(),
            )
        })?;

        Ok(rkyv::deserialize::<Self, Error>(archived)?)
    }

    /// ファイルからモデルを読み込みます。
    ///
    /// # エラー
    ///
    /// ファイルを開けない場合は [`Model1Error::InvalidArgument`]、
    /// その他は [`CompiledModel::read`] と同じです。
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Model1Error::invalid_argument(
                "path",
                format!("Failed to open model file {}: {e}", path.display()),
            )
        })?;
        Self::read(BufReader::new(file))
    }
}
