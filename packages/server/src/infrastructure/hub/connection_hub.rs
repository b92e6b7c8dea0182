//! Connection Hub
//!
//! ## 責務
//!
//! - 接続中のプレイヤー（username → LiveConnection）の管理
//! - 心拍テーブル（username → 最終受信時刻）の管理
//! - 送信先の選択とメールボックスへの投入（direct / room / members / global）
//! - 心拍タイムアウトした接続の掃除
//!
//! ## 設計ノート
//!
//! 2 つのマップは 1 つの `Mutex` の下に置き、外部には動詞だけを公開する。
//! 心拍テーブルのキーは常に接続中の username の部分集合になる。
//!
//! 接続の破棄（unregister / 溢れ / タイムアウト）はすべてロック内でエントリを
//! 取り除き、ロックを外してから `PlayerPresence` を 1 回だけ呼ぶ。Hub がロックを
//! 保持したまま Registry Store を呼ぶことはない。

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use thiserror::Error;
use tokio::{sync::Mutex, task::JoinHandle, time::MissedTickBehavior};

use crate::domain::{PlayerPresence, RoomId, Username};
use duelhub_shared::time::Clock;

use super::mailbox::{self, MailboxReceiver, MailboxSender};

/// Hub の設定
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// 接続ごとの送信キューの上限
    pub mailbox_capacity: usize,
    /// これより長く心拍が無い接続は切断する
    pub heartbeat_timeout: Duration,
    /// 掃除タスクの実行間隔
    pub sweep_interval: Duration,
    /// Writer が WebSocket Ping を送る間隔
    pub ping_interval: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 256,
            heartbeat_timeout: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(1),
            ping_interval: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("player '{0}' already has a live session")]
    DuplicateSession(String),
}

/// 接続ごとに払い出される識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

pub type Mailbox = MailboxSender<String>;
pub type MailboxInbox = MailboxReceiver<String>;

struct LiveConnection {
    id: ConnectionId,
    room_id: Option<RoomId>,
    mailbox: Mailbox,
}

#[derive(Default)]
struct HubState {
    connections: HashMap<Username, LiveConnection>,
    heartbeats: HashMap<Username, i64>,
}

impl HubState {
    /// エントリを取り除き、メールボックスを閉じて Writer を終わらせる
    fn evict(&mut self, username: &Username) -> bool {
        self.heartbeats.remove(username);
        match self.connections.remove(username) {
            Some(connection) => {
                connection.mailbox.close();
                true
            }
            None => false,
        }
    }
}

pub struct Hub {
    state: Mutex<HubState>,
    next_id: AtomicU64,
    presence: Arc<dyn PlayerPresence>,
    clock: Arc<dyn Clock>,
    config: HubConfig,
}

impl Hub {
    pub fn new(
        presence: Arc<dyn PlayerPresence>,
        clock: Arc<dyn Clock>,
        config: HubConfig,
    ) -> Self {
        Self {
            state: Mutex::new(HubState::default()),
            next_id: AtomicU64::new(1),
            presence,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// 設定された容量で新しいメールボックスを作る
    pub fn mailbox(&self) -> (Mailbox, MailboxInbox) {
        mailbox::channel(self.config.mailbox_capacity)
    }

    /// 接続を登録する
    ///
    /// 重複チェックと挿入は同じクリティカルセクションで行う。どちらかのテーブルに
    /// 既に username があれば `DuplicateSession`。
    pub async fn register(
        &self,
        username: Username,
        room_id: Option<RoomId>,
        mailbox: Mailbox,
    ) -> Result<ConnectionId, HubError> {
        let mut state = self.state.lock().await;
        if state.connections.contains_key(&username) || state.heartbeats.contains_key(&username)
        {
            return Err(HubError::DuplicateSession(username.into_string()));
        }

        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        state
            .heartbeats
            .insert(username.clone(), self.clock.now_millis());
        state.connections.insert(
            username.clone(),
            LiveConnection {
                id,
                room_id,
                mailbox,
            },
        );
        tracing::info!(
            "Player '{}' registered as {} ({} live)",
            username,
            id,
            state.connections.len()
        );
        Ok(id)
    }

    /// 接続を解除する
    ///
    /// 登録時の `ConnectionId` と一致する場合のみ取り除く。古い接続からの解除が
    /// 新しい接続を追い出すことはない。2 回目以降の呼び出しは何もしない。
    pub async fn unregister(&self, username: &Username, id: ConnectionId) -> bool {
        let removed = {
            let mut state = self.state.lock().await;
            match state.connections.get(username) {
                Some(conn) if conn.id == id => state.evict(username),
                _ => false,
            }
        };

        if removed {
            tracing::info!("Player '{}' ({}) unregistered", username, id);
            self.presence.player_disconnected(username).await;
        }
        removed
    }

    /// 接続 ID に関係なく接続を切断する（ログアウト用）
    pub async fn disconnect(&self, username: &Username) -> bool {
        let removed = self.state.lock().await.evict(username);
        if removed {
            tracing::info!("Player '{}' disconnected", username);
            self.presence.player_disconnected(username).await;
        }
        removed
    }

    /// 心拍を記録する。接続していない username は無視する。
    pub async fn touch(&self, username: &Username) -> bool {
        let now = self.clock.now_millis();
        let mut state = self.state.lock().await;
        if !state.connections.contains_key(username) {
            return false;
        }
        state.heartbeats.insert(username.clone(), now);
        true
    }

    pub async fn set_room(&self, username: &Username, room_id: Option<RoomId>) -> bool {
        let mut state = self.state.lock().await;
        match state.connections.get_mut(username) {
            Some(conn) => {
                conn.room_id = room_id;
                true
            }
            None => false,
        }
    }

    pub async fn room_of(&self, username: &Username) -> Option<RoomId> {
        let state = self.state.lock().await;
        state
            .connections
            .get(username)
            .and_then(|conn| conn.room_id.clone())
    }

    pub async fn is_connected(&self, username: &Username) -> bool {
        self.state.lock().await.connections.contains_key(username)
    }

    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.connections.len()
    }

    pub async fn heartbeat_usernames(&self) -> Vec<Username> {
        let state = self.state.lock().await;
        let mut usernames: Vec<Username> = state.heartbeats.keys().cloned().collect();
        usernames.sort();
        usernames
    }

    /// 1 人に送る。届けられたら `true`。
    pub async fn send_to(&self, username: &Username, message: &str) -> bool {
        self.deliver(|name, _| name == username, message).await == 1
    }

    /// 送信者と同じ Room の他のメンバーに送る（送信者には送らない）
    ///
    /// 送信者が Room に属していなければ誰にも送らない。戻り値は届けた数。
    pub async fn broadcast_to_room(&self, sender: &Username, message: &str) -> usize {
        let Some(room_id) = self.room_of(sender).await else {
            tracing::debug!("Player '{}' is not in a room, nothing to relay", sender);
            return 0;
        };
        self.deliver(
            |name, conn| name != sender && conn.room_id.as_ref() == Some(&room_id),
            message,
        )
        .await
    }

    /// Room のメンバー全員に送る
    pub async fn broadcast_to_members(&self, room_id: &RoomId, message: &str) -> usize {
        self.deliver(|_, conn| conn.room_id.as_ref() == Some(room_id), message)
            .await
    }

    /// 接続中の全員に送る
    pub async fn broadcast_global(&self, message: &str) -> usize {
        self.deliver(|_, _| true, message).await
    }

    /// 選択された接続のメールボックスに投入する
    ///
    /// 投入できなかった（満杯 / 閉じている）接続はその場で切断する。
    async fn deliver(
        &self,
        select: impl Fn(&Username, &LiveConnection) -> bool,
        message: &str,
    ) -> usize {
        let mut delivered = 0;
        let mut dropped = Vec::new();
        {
            let mut state = self.state.lock().await;
            for (username, conn) in state.connections.iter() {
                if !select(username, conn) {
                    continue;
                }
                match conn.mailbox.try_push(message.to_string()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!(
                            "Dropping player '{}' ({}): {}",
                            username,
                            conn.id,
                            e
                        );
                        dropped.push(username.clone());
                    }
                }
            }
            for username in &dropped {
                state.evict(username);
            }
        }

        for username in &dropped {
            self.presence.player_disconnected(username).await;
        }
        delivered
    }

    /// 心拍がタイムアウトした接続をすべて切断する
    ///
    /// 最終受信からの経過時間がタイムアウトを「超えた」ものだけが対象。
    pub async fn sweep_expired(&self) -> Vec<Username> {
        let now = self.clock.now_millis();
        let timeout = i64::try_from(self.config.heartbeat_timeout.as_millis()).unwrap_or(i64::MAX);

        let expired: Vec<Username> = {
            let mut state = self.state.lock().await;
            let expired: Vec<Username> = state
                .heartbeats
                .iter()
                .filter(|(_, last_seen)| now.saturating_sub(**last_seen) > timeout)
                .map(|(username, _)| username.clone())
                .collect();
            for username in &expired {
                state.evict(username);
            }
            expired
        };

        for username in &expired {
            tracing::warn!("Player '{}' timed out, closing connection", username);
            self.presence.player_disconnected(username).await;
        }
        expired
    }

    /// 掃除タスクを起動する
    pub fn spawn_heartbeat_sweep(self: &Arc<Self>) -> JoinHandle<()> {
        let hub = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(hub.config.sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(
                "Heartbeat sweep started (timeout {:?}, every {:?})",
                hub.config.heartbeat_timeout,
                hub.config.sweep_interval
            );
            loop {
                ticker.tick().await;
                let expired = hub.sweep_expired().await;
                if !expired.is_empty() {
                    tracing::debug!("Sweep evicted {} connection(s)", expired.len());
                }
            }
        })
    }
}
