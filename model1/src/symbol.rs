//! 文字列のインターンを行うシンボルプール
//!
//! 表層形の文字列を [`Handle`] に変換します。同じプールに対して同じ文字列を
//! インターンすると、常に同一の [`Handle`] が返されます。
//!
//! プールは複数のスレッドから同時に使用できます。語彙の読み込みと、
//! 文法や入力文の解析が並行して行われても、同一文字列に対して
//! 2つの異なる [`Handle`] が作られることはありません。

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;

/// インターンされた文字列を識別する不透明なトークン
///
/// 等価性とハッシュは文字列の内容ではなく、プール内のスロット番号
/// (すなわち同一性)によって定義されます。内容の比較はインターン時に
/// 一度だけ行われ、以降は行われません。
///
/// 異なる [`SymbolPool`] から得られたハンドル同士を比較してはいけません。
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Handle(u32);

impl Handle {
    /// プール内のスロット番号を返します。
    #[inline(always)]
    pub const fn index(self) -> u32 {
        self.0
    }
}

#[derive(Default)]
struct PoolInner {
    map: HashMap<Arc<str>, Handle>,
    strings: Vec<Arc<str>>,
}

/// スレッドセーフな文字列インターンサービス
///
/// プロセス全体で共有する場合は `Arc<SymbolPool>` として明示的に渡してください。
///
/// # 例
///
/// ```
/// use model1_rkyv::symbol::SymbolPool;
///
/// let pool = SymbolPool::new();
/// let a = pool.intern("house");
/// let b = pool.intern("house");
/// assert_eq!(a, b);
/// assert_eq!(pool.lookup("house"), Some(a));
/// assert_eq!(pool.lookup("haus"), None);
/// assert_eq!(pool.resolve(a).as_deref(), Some("house"));
/// ```
#[derive(Default)]
pub struct SymbolPool {
    inner: RwLock<PoolInner>,
}

impl SymbolPool {
    /// 空のプールを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 文字列をインターンし、そのハンドルを返します。
    ///
    /// 既にインターンされている場合は既存のハンドルを返します。
    /// 検索と挿入は書き込みロックの下で一度に行われるため、
    /// 並行呼び出しでも同じ文字列には同じハンドルが返されます。
    pub fn intern(&self, text: &str) -> Handle {
        if let Some(handle) = self.lookup(text) {
            return handle;
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have inserted the text between the two locks.
        if let Some(&handle) = inner.map.get(text) {
            return handle;
        }
        let handle = Handle(u32::try_from(inner.strings.len()).unwrap());
        let text: Arc<str> = Arc::from(text);
        inner.strings.push(text.clone());
        inner.map.insert(text, handle);
        handle
    }

    /// 既にインターンされている文字列のハンドルを返します。
    ///
    /// 文字列がプールに存在しない場合は `None` を返し、プールは変更しません。
    pub fn lookup(&self, text: &str) -> Option<Handle> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.map.get(text).copied()
    }

    /// ハンドルに対応する文字列を返します。
    pub fn resolve(&self, handle: Handle) -> Option<Arc<str>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.strings.get(handle.0 as usize).cloned()
    }

    /// インターンされた文字列の数を返します。
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.strings.len()
    }

    /// プールが空かどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SymbolPool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SymbolPool")
            .field("len", &self.len())
            .finish()
    }
}
