//! JSON ファイルに永続化されるコレクション
//!
//! 1 コレクション = 1 ファイル = 1 つの `RwLock`。ファイル形式は
//! `{"<key>": [ ... ]}`。
//!
//! 変更はロックを保持したまま「コピーに適用 → 一時ファイルに書き込み → rename」
//! の順で行い、永続化に成功してからメモリ上の状態を差し替える。読み取りは
//! 読み取りロックの下でスナップショットを取る。

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;

use crate::domain::RepositoryError;

pub struct JsonCollection<T> {
    /// ファイル内のラッパーキー（例: "users"）
    key: &'static str,
    /// 永続化先。`None` ならメモリのみ
    path: Option<PathBuf>,
    items: RwLock<Vec<T>>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// ファイルから読み込む。ファイルが無ければ空で始める。
    pub async fn open(key: &'static str, path: PathBuf) -> Result<Self, RepositoryError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RepositoryError::Persistence {
                    collection: key,
                    reason: format!("cannot create {}: {}", parent.display(), e),
                })?;
        }

        let items = load(key, &path).await;
        tracing::info!(
            "Loaded {} {} from {}",
            items.len(),
            key,
            path.display()
        );

        Ok(Self {
            key,
            path: Some(path),
            items: RwLock::new(items),
        })
    }

    /// 永続化しないコレクション（テスト用）
    pub fn in_memory(key: &'static str) -> Self {
        Self {
            key,
            path: None,
            items: RwLock::new(Vec::new()),
        }
    }

    /// 条件に一致する最初の要素のコピー
    pub async fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        let items = self.items.read().await;
        items.iter().find(|item| predicate(item)).cloned()
    }

    /// 全要素のスナップショット
    pub async fn snapshot(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    /// 変更を適用して永続化する。
    ///
    /// `apply` は変更があった場合に `true` を返す。`false` の場合は何も書き込まない。
    pub async fn mutate(
        &self,
        apply: impl FnOnce(&mut Vec<T>) -> bool,
    ) -> Result<bool, RepositoryError> {
        let mut items = self.items.write().await;

        let mut next = items.clone();
        if !apply(&mut next) {
            return Ok(false);
        }

        if let Some(path) = &self.path {
            self.persist(path, &next).await?;
        }
        *items = next;
        Ok(true)
    }

    async fn persist(&self, path: &Path, items: &[T]) -> Result<(), RepositoryError> {
        let to_error = |reason: String| RepositoryError::Persistence {
            collection: self.key,
            reason,
        };

        let mut document = serde_json::Map::new();
        document.insert(
            self.key.to_string(),
            serde_json::to_value(items).map_err(|e| to_error(e.to_string()))?,
        );
        let bytes = serde_json::to_vec_pretty(&document).map_err(|e| to_error(e.to_string()))?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| to_error(format!("write {}: {}", tmp_path.display(), e)))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| to_error(format!("rename to {}: {}", path.display(), e)))?;

        tracing::debug!("Persisted {} {} to {}", items.len(), self.key, path.display());
        Ok(())
    }
}

async fn load<T: DeserializeOwned>(key: &str, path: &Path) -> Vec<T> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let parsed = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|mut document| document.get_mut(key).map(serde_json::Value::take))
        .map(serde_json::from_value::<Vec<T>>);

    match parsed {
        Some(Ok(items)) => items,
        Some(Err(e)) => {
            tracing::warn!("Failed to parse {} in {}: {}", key, path.display(), e);
            Vec::new()
        }
        None => {
            tracing::warn!("{} has no '{}' list, starting empty", path.display(), key);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u32,
        label: String,
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("duelhub-collection-{}", uuid::Uuid::new_v4().simple()))
            .join(name)
    }

    #[tokio::test]
    async fn test_mutate_persists_before_returning() {
        // テスト項目: mutate が返った時点でファイルに書き込まれている
        // given (前提条件):
        let path = temp_path("items.json");
        let collection = JsonCollection::<Item>::open("items", path.clone())
            .await
            .unwrap();

        // when (操作):
        let changed = collection
            .mutate(|items| {
                items.push(Item {
                    id: 1,
                    label: "first".to_string(),
                });
                true
            })
            .await
            .unwrap();

        // then (期待する結果):
        assert!(changed);
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(document["items"][0]["label"], "first");
    }

    #[tokio::test]
    async fn test_open_reloads_persisted_items() {
        // テスト項目: 再オープンすると永続化済みの要素が読み込まれる
        // given (前提条件):
        let path = temp_path("items.json");
        {
            let collection = JsonCollection::<Item>::open("items", path.clone())
                .await
                .unwrap();
            collection
                .mutate(|items| {
                    items.push(Item {
                        id: 7,
                        label: "kept".to_string(),
                    });
                    true
                })
                .await
                .unwrap();
        }

        // when (操作):
        let reopened = JsonCollection::<Item>::open("items", path).await.unwrap();

        // then (期待する結果):
        let items = reopened.snapshot().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 7);
    }

    #[tokio::test]
    async fn test_open_with_corrupt_file_starts_empty() {
        // テスト項目: 壊れたファイルは警告のうえ空として扱われる
        // given (前提条件):
        let path = temp_path("items.json");
        tokio::fs::create_dir_all(path.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        // when (操作):
        let collection = JsonCollection::<Item>::open("items", path).await.unwrap();

        // then (期待する結果):
        assert!(collection.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_mutation_is_not_applied() {
        // テスト項目: apply が false を返した場合は変更なしとして扱われる
        // given (前提条件):
        let collection = JsonCollection::<Item>::in_memory("items");

        // when (操作):
        let changed = collection
            .mutate(|items| {
                items.push(Item {
                    id: 1,
                    label: "discarded".to_string(),
                });
                false
            })
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!changed);
        assert!(collection.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_mutations_are_all_applied() {
        // テスト項目: 並行した変更がすべて反映される（ロストアップデートがない）
        // given (前提条件):
        let collection = std::sync::Arc::new(JsonCollection::<Item>::in_memory("items"));

        // when (操作):
        let mut handles = Vec::new();
        for id in 0..32 {
            let collection = collection.clone();
            handles.push(tokio::spawn(async move {
                collection
                    .mutate(|items| {
                        items.push(Item {
                            id,
                            label: format!("item-{}", id),
                        });
                        true
                    })
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果):
        assert_eq!(collection.snapshot().await.len(), 32);
    }
}
