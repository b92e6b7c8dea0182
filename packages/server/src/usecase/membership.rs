//! Room membership helpers shared by the room lifecycle use cases.
//!
//! 呼び出し側は Room のライフサイクルロック（[`RoomLock`]）を保持していること。

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{RepositoryError, RoomId, RoomRepository, UserRepository, Username};

/// Room を読み取り → 変更 → 書き戻しする操作を直列化するロック
///
/// Repository はコレクション単位でしかロックしないため、「定員チェック → 追加」
/// のような複数ステップの操作はこのロックの下で行う。
pub type RoomLock = Arc<Mutex<()>>;

pub fn new_room_lock() -> RoomLock {
    Arc::new(Mutex::new(()))
}

/// プレイヤーを Room から外す
///
/// ホストが抜けた場合は次のプレイヤーに移し、誰もいなくなった Room は削除する。
/// Room が既に無い、またはメンバーでない場合は何もしない。
pub async fn leave_room(
    rooms: &Arc<dyn RoomRepository>,
    username: &Username,
    room_id: &RoomId,
) -> Result<(), RepositoryError> {
    let Some(mut room) = rooms.get_by_id(room_id).await else {
        return Ok(());
    };
    if !room.release(username) {
        return Ok(());
    }

    if room.is_empty() {
        rooms.remove(room_id).await?;
        tracing::info!("Room '{}' removed (last player '{}' left)", room_id, username);
    } else {
        rooms.update(room).await?;
        tracing::info!("Player '{}' left room '{}'", username, room_id);
    }
    Ok(())
}

/// User の所属 Room を書き換える。ユーザーが存在しなければ `false`。
pub async fn assign_room(
    users: &Arc<dyn UserRepository>,
    username: &Username,
    room_id: Option<RoomId>,
) -> Result<bool, RepositoryError> {
    let Some(mut user) = users.find_by_username(username).await else {
        return Ok(false);
    };
    if user.room_id == room_id {
        return Ok(true);
    }
    user.room_id = room_id;
    users.update(user).await
}

/// プレイヤーをオフラインにし、参加しているすべての Room から外す
///
/// ユーザーが存在しなければ `false`。
pub async fn sign_out_player(
    users: &Arc<dyn UserRepository>,
    rooms: &Arc<dyn RoomRepository>,
    username: &Username,
) -> Result<bool, RepositoryError> {
    let joined: Vec<RoomId> = rooms
        .list()
        .await
        .into_iter()
        .filter(|room| room.is_member(username))
        .map(|room| room.id)
        .collect();
    for room_id in &joined {
        leave_room(rooms, username, room_id).await?;
    }

    let Some(mut user) = users.find_by_username(username).await else {
        return Ok(false);
    };
    user.sign_out();
    users.update(user).await
}
