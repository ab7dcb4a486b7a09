//! Runtime adapters and the API surface consumed by the HTTP layer.

pub mod api;
pub mod tokio_spawner;

pub use api::{
    CancelRequest, CourseListResponse, Health, HistoryResponse, RegisterRequest,
    RegistrationInfoResponse, Reply, SetTimerRequest, StatusResponse, TimersResponse,
};
pub use tokio_spawner::TokioSpawner;
