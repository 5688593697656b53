//! Data transfer objects for the REST API.

pub mod pool_dto;
pub mod user_dto;

pub use pool_dto::{
    CreatePoolRequest, JoinPoolRequest, ParticipantDto, PoolDetailResponse, PoolResponse,
    PoolResultDto,
};
pub use user_dto::{
    LeaderboardEntry, PurchasePointsRequest, RegisterUserRequest, TransactionDto, UserResponse,
};
