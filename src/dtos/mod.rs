//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod analytics;
pub mod circle;
pub mod interaction;
pub mod membership;
pub mod query;
pub mod user;

// Re-exports per mantenere gli import compatti
pub use analytics::{
    AnalyticsDTO, CircleBalanceDTO, DailyActivityDTO, GrowthPointDTO, MemberBalanceDTO,
    TopCircleDTO, TrendPointDTO, UserBalanceDTO,
};
pub use circle::{CircleCreatedDTO, CircleDTO, CreateCircleDTO, JoinCircleDTO, UpdateCircleDTO};
pub use interaction::{CreateInteractionDTO, InteractionDTO, RecordInteractionDTO};
pub use membership::{CreateMembershipDTO, MembershipDTO, UserCircleDTO};
pub use query::HistoryQuery;
pub use user::{CreateUserDTO, UserDTO};
