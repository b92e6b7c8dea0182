//! UseCase: ゲーム終了（death / game_over）
//!
//! ## 設計ノート
//!
//! 対象 Room は送信者の接続にキャッシュされた Room ID で決まる。結果は追記され、
//! Room は削除せず `Waiting` に戻して再利用する。

use std::sync::Arc;

use duelhub_shared::time::Clock;

use crate::domain::{
    GameResult, RepositoryError, ResultIdFactory, ResultRepository, RoomId, RoomRepository,
    Timestamp,
};

use super::membership::RoomLock;

/// 終了したゲームの勝敗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    pub winner: String,
    pub loser: String,
    /// 秒
    pub duration: i64,
}

pub struct FinishGameUseCase {
    rooms: Arc<dyn RoomRepository>,
    results: Arc<dyn ResultRepository>,
    clock: Arc<dyn Clock>,
    room_lock: RoomLock,
}

impl FinishGameUseCase {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        results: Arc<dyn ResultRepository>,
        clock: Arc<dyn Clock>,
        room_lock: RoomLock,
    ) -> Self {
        Self {
            rooms,
            results,
            clock,
            room_lock,
        }
    }

    /// クライアントが報告した game_over を記録する
    pub async fn game_over(
        &self,
        room_id: Option<&RoomId>,
        outcome: GameOutcome,
    ) -> Result<GameResult, RepositoryError> {
        let _guard = self.room_lock.lock().await;
        self.record(room_id, outcome).await
    }

    /// プレイヤーの死亡から game_over を組み立てて記録する
    ///
    /// 勝者は Room 内で `loser` 以外の最初のプレイヤー。対戦時間は `started_at` から
    /// 計算する。Room が無いか 2 人未満なら `Ok(None)`。
    pub async fn death(
        &self,
        room_id: &RoomId,
        loser: &str,
    ) -> Result<Option<(GameOutcome, GameResult)>, RepositoryError> {
        let _guard = self.room_lock.lock().await;
        let Some(room) = self.rooms.get_by_id(room_id).await else {
            return Ok(None);
        };
        if room.players.len() < 2 {
            return Ok(None);
        }

        let winner = room
            .opponent_of(loser)
            .map(|player| player.as_str().to_string())
            .unwrap_or_default();
        let now = Timestamp::new(self.clock.now_millis());
        let duration = room
            .started_at
            .map(|started_at| now.seconds_since(started_at))
            .unwrap_or(0);
        let outcome = GameOutcome {
            winner,
            loser: loser.to_string(),
            duration,
        };

        let result = self.record(Some(room_id), outcome.clone()).await?;
        Ok(Some((outcome, result)))
    }

    async fn record(
        &self,
        room_id: Option<&RoomId>,
        outcome: GameOutcome,
    ) -> Result<GameResult, RepositoryError> {
        let result = GameResult {
            id: ResultIdFactory::generate(),
            room_id: room_id.cloned(),
            winner: outcome.winner,
            loser: outcome.loser,
            play_time: Timestamp::new(self.clock.now_millis()),
            duration: outcome.duration,
        };
        self.results.add(result.clone()).await?;

        if let Some(room_id) = room_id {
            if let Some(mut room) = self.rooms.get_by_id(room_id).await {
                room.finish();
                self.rooms.update(room).await?;
            }
        }

        tracing::info!(
            "Game over in {:?}: '{}' beat '{}' ({}s)",
            room_id.map(RoomId::as_str),
            result.winner,
            result.loser,
            result.duration
        );
        Ok(result)
    }
}
