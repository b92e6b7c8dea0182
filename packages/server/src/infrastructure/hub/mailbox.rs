//! Bounded outbound mailbox
//!
//! 接続ごとの送信キュー。Hub が `try_push` で積み、Writer タスクが `recv` で取り出す。
//!
//! ## Overflow policy
//!
//! `try_push` は決してブロックしない。キューが満杯なら `MailboxError::Full`、
//! 受信側が既に閉じていれば `MailboxError::Closed` を返す。Hub はどちらの場合も
//! その接続を「遅い / 死んだコンシューマ」とみなして切断する
//! （バックプレッシャーもメッセージの破棄・再送もしない）。
//!
//! `MailboxSender` を close / drop すると、Writer は残りを送り切った後に
//! `recv` で `None` を受け取り終了する。

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MailboxError {
    #[error("mailbox is full (capacity {0})")]
    Full(usize),

    #[error("mailbox is closed")]
    Closed,
}

struct State<T> {
    queue: VecDeque<T>,
    closed: bool,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    notify: Notify,
    capacity: usize,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn close(&self) {
        let was_open = {
            let mut state = self.lock();
            !std::mem::replace(&mut state.closed, true)
        };
        if was_open {
            self.notify.notify_one();
        }
    }
}

/// Create a mailbox holding at most `capacity` undelivered items.
pub fn channel<T>(capacity: usize) -> (MailboxSender<T>, MailboxReceiver<T>) {
    let capacity = capacity.max(1);
    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            queue: VecDeque::with_capacity(capacity),
            closed: false,
        }),
        notify: Notify::new(),
        capacity,
    });

    (
        MailboxSender {
            shared: shared.clone(),
        },
        MailboxReceiver { shared },
    )
}

/// Producer half, owned by the Hub.
pub struct MailboxSender<T> {
    shared: Arc<Shared<T>>,
}

impl<T> MailboxSender<T> {
    /// Enqueue without blocking.
    pub fn try_push(&self, item: T) -> Result<(), MailboxError> {
        {
            let mut state = self.shared.lock();
            if state.closed {
                return Err(MailboxError::Closed);
            }
            if state.queue.len() >= self.shared.capacity {
                return Err(MailboxError::Full(self.shared.capacity));
            }
            state.queue.push_back(item);
        }
        self.shared.notify.notify_one();
        Ok(())
    }

    /// Signal the writer to finish.
    pub fn close(&self) {
        self.shared.close();
    }
}

impl<T> Drop for MailboxSender<T> {
    fn drop(&mut self) {
        self.shared.close();
    }
}

/// Consumer half, owned by the connection's writer task.
pub struct MailboxReceiver<T> {
    shared: Arc<Shared<T>>,
}

impl<T> MailboxReceiver<T> {
    /// Wait for the next item. Returns `None` once the mailbox is closed and drained.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            {
                let mut state = self.shared.lock();
                if let Some(item) = state.queue.pop_front() {
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }
            self.shared.notify.notified().await;
        }
    }
}

impl<T> Drop for MailboxReceiver<T> {
    fn drop(&mut self) {
        self.shared.close();
    }
}
