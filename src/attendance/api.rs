//! Public API for attendance backends

pub use crate::attendance::error::{AttendanceError, AttendanceResult};
pub use crate::attendance::http::{
    HttpApiConfig, HttpAttendanceApi, DEFAULT_HTTP_TIMEOUT_SECS, UPDATE_ATTENDANCE_PATH,
};
pub use crate::attendance::link::LinkLauncher;
pub use crate::attendance::traits::{AttendanceApi, Receipt};
