//! デコーダ設定ファイルの読み込み
//!
//! moses.ini 形式の設定ファイルのうち `[feature]` セクションを解析し、
//! 素性ごとの設定行 [`FeatureLine`] を取り出します。
//!
//! ```text
//! # comment
//! [feature]
//! Model1 path=s2t.t1 sourceVocabulary=src.vcb targetVocabulary=trg.vcb
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::errors::{Model1Error, Result};

const FEATURE_SECTION: &str = "feature";

/// 素性の設定行
///
/// `<型名> key=value ...` の形式です。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeatureLine {
    feature_type: String,
    params: Vec<(String, String)>,
}

impl FeatureLine {
    /// 設定行を解析します。
    ///
    /// # エラー
    ///
    /// 行が空の場合や、`key=value` の形式でない引数がある場合に
    /// [`Model1Error::InvalidFormat`] を返します。
    ///
    /// # 例
    ///
    /// ```
    /// use model1_rkyv::config::FeatureLine;
    ///
    /// let line = FeatureLine::parse("Model1 path=s2t.t1 name=Lex")?;
    /// assert_eq!(line.feature_type(), "Model1");
    /// assert_eq!(line.get("name"), Some("Lex"));
    /// # Ok::<(), model1_rkyv::errors::Model1Error>(())
    /// ```
    pub fn parse(line: &str) -> Result<Self> {
        Self::parse_inner(line, |msg| Model1Error::invalid_format("feature line", msg))
    }

    fn parse_inner<F>(line: &str, err: F) -> Result<Self>
    where
        F: Fn(String) -> Model1Error,
    {
        let mut tokens = line.split_ascii_whitespace();
        let feature_type = tokens
            .next()
            .ok_or_else(|| err("empty feature line".to_string()))?;
        let params = tokens
            .map(|token| match token.split_once('=') {
                Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
                _ => Err(err(format!(
                    "{feature_type}: argument {token} is not of the form key=value"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            feature_type: feature_type.to_string(),
            params,
        })
    }

    /// 素性の型名を返します。
    pub fn feature_type(&self) -> &str {
        &self.feature_type
    }

    /// 記述順の `(キー, 値)` を返します。
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// キーの値を返します。同じキーが複数ある場合は最後の値です。
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// デコーダ設定
#[derive(Clone, Debug, Default)]
pub struct DecoderConfig {
    features: Vec<FeatureLine>,
}

impl DecoderConfig {
    /// 設定ファイルを読み込みます。
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Model1Error::invalid_argument(
                "path",
                format!("Failed to open config file {}: {e}", path.display()),
            )
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// リーダーから設定を読み込みます。
    ///
    /// `[feature]` セクションの各行を [`FeatureLine`] として解析します。
    /// `#` で始まる行と空行は読み飛ばし、その他のセクションは無視します。
    ///
    /// # エラー
    ///
    /// 素性の設定行が不正な場合に行番号付きの [`Model1Error::InvalidFormat`] を返します。
    pub fn from_reader<R>(rdr: R, name: &str) -> Result<Self>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);
        let mut section: Option<String> = None;
        let mut features = vec![];

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = i + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                if header != FEATURE_SECTION {
                    log::debug!("{name}: line {line_no}: ignoring section [{header}]");
                }
                section = Some(header.to_string());
                continue;
            }
            if section.as_deref() != Some(FEATURE_SECTION) {
                continue;
            }
            features.push(FeatureLine::parse_inner(line, |msg| {
                Model1Error::invalid_format_at(name, line_no, msg)
            })?);
        }

        log::debug!("{name}: {} feature line(s)", features.len());
        Ok(Self { features })
    }

    /// 記述順の素性の設定行を返します。
    pub fn features(&self) -> &[FeatureLine] {
        &self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feature_line() {
        let line = FeatureLine::parse("Model1  path=a.t1 sourceVocabulary=s.vcb floor=").unwrap();
        assert_eq!(line.feature_type(), "Model1");
        assert_eq!(line.params().len(), 3);
        assert_eq!(line.get("path"), Some("a.t1"));
        assert_eq!(line.get("floor"), Some(""));
        assert_eq!(line.get("name"), None);
    }

    #[test]
    fn test_parse_value_with_equals() {
        let line = FeatureLine::parse("Model1 path=a=b").unwrap();
        assert_eq!(line.get("path"), Some("a=b"));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            FeatureLine::parse("Model1 path"),
            Err(Model1Error::InvalidFormat(_))
        ));
        assert!(matches!(
            FeatureLine::parse("Model1 =x"),
            Err(Model1Error::InvalidFormat(_))
        ));
        assert!(matches!(
            FeatureLine::parse("   "),
            Err(Model1Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_decoder_config() {
        let ini = "\
# decoder configuration
[input-factors]
0

[feature]
Model1 name=Lex path=s2t.t1
# disabled
Model1 path=t2s.t1

[weight]
Lex= 0.5
";
        let config = DecoderConfig::from_reader(ini.as_bytes(), "moses.ini").unwrap();
        assert_eq!(config.features().len(), 2);
        assert_eq!(config.features()[0].get("name"), Some("Lex"));
        assert_eq!(config.features()[1].get("path"), Some("t2s.t1"));
    }

    #[test]
    fn test_decoder_config_error_line() {
        let ini = "[feature]\n\nModel1 path\n";
        match DecoderConfig::from_reader(ini.as_bytes(), "moses.ini") {
            Err(Model1Error::InvalidFormat(e)) => assert_eq!(e.line(), Some(3)),
            r => panic!("unexpected result: {r:?}"),
        }
    }
}
