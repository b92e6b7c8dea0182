//! JSON ファイル版 ResultRepository（`game_results.json`）

use std::path::Path;

use async_trait::async_trait;

use super::collection::JsonCollection;
use crate::domain::{GameResult, RepositoryError, ResultRepository};

pub const RESULTS_FILE: &str = "game_results.json";

pub struct JsonResultRepository {
    results: JsonCollection<GameResult>,
}

impl JsonResultRepository {
    pub async fn open(data_dir: &Path) -> Result<Self, RepositoryError> {
        Ok(Self {
            results: JsonCollection::open("results", data_dir.join(RESULTS_FILE)).await?,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            results: JsonCollection::in_memory("results"),
        }
    }
}

#[async_trait]
impl ResultRepository for JsonResultRepository {
    async fn add(&self, result: GameResult) -> Result<(), RepositoryError> {
        self.results
            .mutate(|results| {
                results.push(result);
                true
            })
            .await
            .map(|_| ())
    }

    async fn list(&self) -> Vec<GameResult> {
        self.results.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timestamp;

    #[tokio::test]
    async fn test_results_are_appended_in_order() {
        // テスト項目: 結果は追記順に保持される
        // given (前提条件):
        let repo = JsonResultRepository::in_memory();

        // when (操作):
        for (winner, loser) in [("bob", "alice"), ("alice", "bob")] {
            repo.add(GameResult {
                id: format!("result_{}", winner),
                room_id: None,
                winner: winner.to_string(),
                loser: loser.to_string(),
                play_time: Timestamp::new(1_000),
                duration: 30,
            })
            .await
            .unwrap();
        }

        // then (期待する結果):
        let results = repo.list().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].winner, "bob");
        assert_eq!(results[1].winner, "alice");
    }
}
