//! 語彙表
//!
//! インターン済みの [`Handle`] と、モデル内で使われる密な整数IDとの
//! 双方向の対応を管理します。ID 0 は常に空ソース記号 [`GIZA_NULL`] に
//! 予約されています。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use hashbrown::HashMap;

use crate::errors::{Model1Error, Result};
use crate::symbol::{Handle, SymbolPool};
use crate::utils::{self, FromU32};

/// 対応する原言語単語がないことを表す空ソース記号の表層形
pub const GIZA_NULL: &str = "GIZANULL";

/// 現在のID空間の末尾から飛ばせるIDの最大数
const MAX_ID_GAP: usize = 1 << 24;

/// 語彙表への格納に失敗した理由
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum StoreError {
    /// IDが既に別のハンドルに使われている
    IdInUse,
    /// ハンドルが既に格納されているID
    WordBound(u32),
    IdOutOfRange,
}

/// 語彙表
///
/// 一度格納したIDが別のハンドルに黙って付け替えられることはありません。
#[derive(Debug, Clone)]
pub struct Vocabulary {
    lookup: HashMap<Handle, u32>,
    vocab: Vec<Option<Handle>>,
    null_word: Handle,
}

impl Vocabulary {
    /// 新しい語彙表を作成します。
    ///
    /// [`GIZA_NULL`] をインターンし、ID 0 に格納します。
    pub fn new(pool: &SymbolPool) -> Self {
        let null_word = pool.intern(GIZA_NULL);
        let mut vocab = Self {
            lookup: HashMap::new(),
            vocab: vec![],
            null_word,
        };
        vocab.store(null_word, 0);
        vocab
    }

    /// ハンドルとIDの組を格納します。
    ///
    /// IDが既に使われている場合、ハンドルが既に別のIDに格納されている場合、
    /// またはIDが大きすぎて格納できない場合は `false` を返し、状態を変更しません。
    /// 全く同じ組を再度格納した場合は何もせずに `true` を返します。
    pub fn store(&mut self, word: Handle, id: u32) -> bool {
        self.try_store(word, id).is_ok()
    }

    /// [`Vocabulary::store`] と同じですが、失敗の理由を返します。
    pub(crate) fn try_store(&mut self, word: Handle, id: u32) -> Result<(), StoreError> {
        if let Some(&stored_id) = self.lookup.get(&word) {
            return if stored_id == id {
                Ok(())
            } else {
                Err(StoreError::WordBound(stored_id))
            };
        }
        let idx = usize::from_u32(id);
        if self.vocab.get(idx).is_some_and(Option::is_some) {
            return Err(StoreError::IdInUse);
        }
        if self.vocab.len() <= idx {
            if idx - self.vocab.len() > MAX_ID_GAP {
                return Err(StoreError::IdOutOfRange);
            }
            self.vocab
                .try_reserve(idx + 1 - self.vocab.len())
                .map_err(|_| StoreError::IdOutOfRange)?;
            self.vocab.resize(idx + 1, None);
        }
        self.vocab[idx] = Some(word);
        self.lookup.insert(word, id);
        Ok(())
    }

    /// ハンドルが未登録であれば新しいIDを割り当てて格納します。
    ///
    /// 新しいIDは現在の語彙サイズです。登録済みであれば既存のIDを返します。
    pub fn store_if_new(&mut self, word: Handle) -> u32 {
        if let Some(&id) = self.lookup.get(&word) {
            return id;
        }
        let id = u32::try_from(self.vocab.len()).unwrap();
        self.vocab.push(Some(word));
        self.lookup.insert(word, id);
        id
    }

    /// ハンドルのIDを返します。
    #[inline(always)]
    pub fn get_word_id(&self, word: Handle) -> Option<u32> {
        self.lookup.get(&word).copied()
    }

    /// IDのハンドルを返します。
    ///
    /// 範囲外のID、または欠番のIDに対しては `None` を返します。
    #[inline(always)]
    pub fn get_word(&self, id: u32) -> Option<Handle> {
        self.vocab.get(usize::from_u32(id)).copied().flatten()
    }

    /// 空ソース記号のハンドルを返します。
    #[inline(always)]
    pub const fn null_word(&self) -> Handle {
        self.null_word
    }

    /// ID空間の大きさ(最大ID + 1)を返します。
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    /// 語彙表が空かどうかを返します。構築直後でも ID 0 があるため常に `false` です。
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// 格納された `(ID, ハンドル)` の組をID順に返すイテレータを取得します。
    pub fn iter(&self) -> impl Iterator<Item = (u32, Handle)> + '_ {
        self.vocab
            .iter()
            .enumerate()
            .filter_map(|(id, word)| Some((u32::try_from(id).ok()?, (*word)?)))
    }

    /// 語彙ファイルを読み込みます。
    ///
    /// # エラー
    ///
    /// ファイルを開けない場合、または内容が不正な場合にエラーを返します。
    /// 詳細は [`Vocabulary::load_from_reader`] を参照してください。
    pub fn load<P>(&mut self, pool: &SymbolPool, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path)?;
        self.load_from_reader(pool, file, &path.display().to_string())
    }

    /// リーダーから語彙表を読み込みます。
    ///
    /// 各行は `ID 表層形 頻度` の3列です。3列目は使用しません。
    ///
    /// # 引数
    ///
    /// * `pool` - 表層形をインターンするシンボルプール
    /// * `rdr` - 語彙ファイルのリーダー
    /// * `name` - エラーメッセージに使う入力の名前
    ///
    /// # エラー
    ///
    /// - 列数が3でない行、IDが整数でない行、IDが大きすぎる行がある場合は
    ///   [`Model1Error::InvalidFormat`]
    /// - 既に格納されたIDを再定義する行、既に格納された表層形に別のIDを
    ///   与える行がある場合は [`Model1Error::DuplicateId`]
    pub fn load_from_reader<R>(&mut self, pool: &SymbolPool, rdr: R, name: &str) -> Result<()>
    where
        R: Read,
    {
        let mut num_entries = 0;
        utils::for_each_record(rdr, name, |line_no, [id, surface, _]| {
            let id: u32 = utils::parse_field(id, "vocabulary id", name, line_no)?;
            let word = pool.intern(surface);
            match self.try_store(word, id) {
                Ok(()) => {}
                Err(StoreError::IdInUse) => {
                    return Err(Model1Error::duplicate_id(name, line_no, id, None));
                }
                Err(StoreError::WordBound(stored_id)) => {
                    return Err(Model1Error::duplicate_id(name, line_no, id, Some(stored_id)));
                }
                Err(StoreError::IdOutOfRange) => {
                    return Err(Model1Error::invalid_format_at(
                        name,
                        line_no,
                        format!("vocabulary id {id} is too large"),
                    ));
                }
            }
            num_entries += 1;
            Ok(())
        })?;
        log::debug!("{name}: loaded {num_entries} vocabulary entries");
        Ok(())
    }
}
