mod dispatch;
mod navigator;
mod routes;

pub use dispatch::landing_route;
pub use navigator::{Navigator, RecordingNavigator};
pub use routes::{
    ADMIN_DASHBOARD, ADMIN_LOGIN, COORDINATOR_DASHBOARD, COORDINATOR_LOGIN, DOCTOR_DASHBOARD,
    DOCTOR_LOGIN, PATIENT_DASHBOARD, PATIENT_LOGIN, login_route,
};
