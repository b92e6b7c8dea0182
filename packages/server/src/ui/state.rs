//! Server state and dependency wiring.

use std::sync::Arc;

use duelhub_shared::time::Clock;

use crate::{
    domain::{ResultRepository, RoomRepository, UserRepository},
    infrastructure::{
        codec::FrameCodec,
        hub::{Hub, HubConfig},
    },
    usecase::{
        ConnectPlayerUseCase, CreateRoomUseCase, DisconnectPlayerUseCase, FinishGameUseCase,
        JoinRoomUseCase, ListRoomsUseCase, LoginUseCase, LogoutUseCase, RegisterUserUseCase,
        ResetSessionsUseCase, StartGameUseCase, new_room_lock,
    },
};

/// Shared application state
pub struct AppState {
    /// 接続中のプレイヤーと配信
    pub hub: Arc<Hub>,
    /// WebSocket フレームのエンコード / デコード
    pub codec: Arc<dyn FrameCodec>,
    pub register_user_usecase: Arc<RegisterUserUseCase>,
    pub login_usecase: Arc<LoginUseCase>,
    pub logout_usecase: Arc<LogoutUseCase>,
    pub connect_player_usecase: Arc<ConnectPlayerUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub list_rooms_usecase: Arc<ListRoomsUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub start_game_usecase: Arc<StartGameUseCase>,
    pub finish_game_usecase: Arc<FinishGameUseCase>,
    pub reset_sessions_usecase: Arc<ResetSessionsUseCase>,
}

impl AppState {
    /// Repository から UseCase と Hub を組み立てる
    ///
    /// 切断時の後始末（[`DisconnectPlayerUseCase`]）は Hub の presence フックとして渡す。
    pub fn new(
        users: Arc<dyn UserRepository>,
        rooms: Arc<dyn RoomRepository>,
        results: Arc<dyn ResultRepository>,
        clock: Arc<dyn Clock>,
        hub_config: HubConfig,
        codec: Arc<dyn FrameCodec>,
    ) -> Self {
        let room_lock = new_room_lock();

        let disconnect_player_usecase = Arc::new(DisconnectPlayerUseCase::new(
            users.clone(),
            rooms.clone(),
            room_lock.clone(),
        ));
        let hub = Arc::new(Hub::new(
            disconnect_player_usecase,
            clock.clone(),
            hub_config,
        ));

        Self {
            hub,
            codec,
            register_user_usecase: Arc::new(RegisterUserUseCase::new(users.clone())),
            login_usecase: Arc::new(LoginUseCase::new(users.clone(), clock.clone())),
            logout_usecase: Arc::new(LogoutUseCase::new(
                users.clone(),
                rooms.clone(),
                room_lock.clone(),
            )),
            connect_player_usecase: Arc::new(ConnectPlayerUseCase::new(users.clone())),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                users.clone(),
                rooms.clone(),
                clock.clone(),
                room_lock.clone(),
            )),
            list_rooms_usecase: Arc::new(ListRoomsUseCase::new(rooms.clone())),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                users.clone(),
                rooms.clone(),
                room_lock.clone(),
            )),
            start_game_usecase: Arc::new(StartGameUseCase::new(
                rooms.clone(),
                clock.clone(),
                room_lock.clone(),
            )),
            finish_game_usecase: Arc::new(FinishGameUseCase::new(
                rooms.clone(),
                results,
                clock,
                room_lock,
            )),
            reset_sessions_usecase: Arc::new(ResetSessionsUseCase::new(users, rooms)),
        }
    }
}
