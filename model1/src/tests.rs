//! Model1-rkyvのテストモジュール群
//!
//! ファイルからの読み込み、設定による素性の構築、バイナリモデル、
//! 並行スコア計算の動作を検証します。

mod concurrency;
