//! ユーティリティ関数と型変換トレイトを提供するモジュール
//!
//! 主に以下の機能を提供します：
//!
//! - `FromU32`: u32からの型変換トレイト
//! - 空白区切りのテキスト表を1行ずつ解析するヘルパー

use std::io::{BufRead, BufReader, Read};
use std::str::FromStr;

use crate::errors::{Model1Error, Result};

/// u32から他の型への変換を提供するトレイト
pub trait FromU32 {
    /// u32値から実装型を生成する
    fn from_u32(src: u32) -> Self;
}

#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
impl FromU32 for usize {
    #[inline(always)]
    fn from_u32(src: u32) -> Self {
        // Since the pointer width is guaranteed to be 32 or 64,
        // the following process always succeeds.
        unsafe { Self::try_from(src).unwrap_unchecked() }
    }
}

/// 行を空白で分割し、ちょうど `N` 個のフィールドを返します。
///
/// フィールド数が `N` と異なる場合は `None` を返します。
///
/// # 例
///
/// ```
/// # use model1_rkyv::utils::split_fields;
/// assert_eq!(split_fields::<3>("2  house\t7"), Some(["2", "house", "7"]));
/// assert_eq!(split_fields::<3>("2 house"), None);
/// assert_eq!(split_fields::<3>("2 house 7 8"), None);
/// ```
pub fn split_fields<const N: usize>(line: &str) -> Option<[&str; N]> {
    let mut spl = line.split_ascii_whitespace();
    let mut fields = [""; N];
    for field in &mut fields {
        *field = spl.next()?;
    }
    if spl.next().is_some() {
        return None;
    }
    Some(fields)
}

/// フィールドを数値などにパースします。
///
/// 失敗した場合は、行番号付きのフォーマットエラーを返します。
pub(crate) fn parse_field<T>(field: &str, what: &str, name: &str, line_no: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    field.parse().map_err(|e| {
        Model1Error::invalid_format_at(name, line_no, format!("invalid {what} {field:?}: {e}"))
    })
}

/// 3列のテキスト表を1行ずつ読み込み、各行のフィールドを `f` に渡します。
///
/// 空行は読み飛ばします。行番号は空行も含めて1から数えます。
/// 空行以外でフィールド数が3でない行があると、フォーマットエラーを返します。
///
/// # 引数
///
/// * `rdr` - 表のリーダー
/// * `name` - エラーメッセージに使う入力の名前(通常はファイルパス)
/// * `f` - `(行番号, フィールド)` を受け取るコールバック
pub(crate) fn for_each_record<R, F>(rdr: R, name: &str, mut f: F) -> Result<()>
where
    R: Read,
    F: FnMut(usize, [&str; 3]) -> Result<()>,
{
    let rdr = BufReader::new(rdr);
    for (i, line) in rdr.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields::<3>(&line).ok_or_else(|| {
            Model1Error::invalid_format_at(name, line_no, "has wrong number of tokens")
        })?;
        f(line_no, fields)?;
    }
    Ok(())
}
