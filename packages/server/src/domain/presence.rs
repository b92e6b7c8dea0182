//! Presence hook
//!
//! 接続が切れたプレイヤーを Registry 上でも「切断済み」にするためのインターフェース。
//! Hub（Infrastructure 層）はこの trait だけに依存し、実装は UseCase 層が提供する。

use async_trait::async_trait;

use super::Username;

#[async_trait]
pub trait PlayerPresence: Send + Sync {
    /// 接続が破棄されたプレイヤーをオフラインにし、Room から外す。
    ///
    /// Hub は 1 接続につきちょうど 1 回、ロックを解放した後に呼び出す。
    async fn player_disconnected(&self, username: &Username);
}
