//! Domain models with validation at construction
//!
//! Submitted forms are validated into stored records here.
//! Invalid input returns ValidationError, never a panic.

pub mod admin;
pub mod attendance;
pub mod calendar;
pub mod equipment;
pub mod user;
pub mod validation;

pub use admin::{AdminAccount, LoginRequest, ADMINS, HASH_COST};
pub use attendance::{month_descriptor, same_day_filters, AttendanceRecord, HISTORY};
pub use calendar::{day_bounds, Bounds, Month, MonthOption};
pub use equipment::{
    Condition, ConditionCounts, ConditionUpdate, EquipmentFilter, Inspection, InspectionRequest,
    EQUIPMENT,
};
pub use user::{RegistrationRequest, User, UserType, USERS};
pub use validation::ValidationError;
