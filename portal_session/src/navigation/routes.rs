use crate::principal::Role;

pub const DOCTOR_LOGIN: &str = "/login";
pub const PATIENT_LOGIN: &str = "/patient/login";
pub const COORDINATOR_LOGIN: &str = "/coordinator/login";
pub const ADMIN_LOGIN: &str = "/admin/login";

pub const DOCTOR_DASHBOARD: &str = "/dashboard";
pub const PATIENT_DASHBOARD: &str = "/patient/dashboard";
pub const COORDINATOR_DASHBOARD: &str = "/coordinator/dashboard";
pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";

/// Login page of the portal `role` signs in to.
pub fn login_route(role: Role) -> &'static str {
    match role.namespace() {
        Role::Doctor => DOCTOR_LOGIN,
        Role::Patient => PATIENT_LOGIN,
        Role::Coordinator => COORDINATOR_LOGIN,
        Role::Admin | Role::SuperAdmin => ADMIN_LOGIN,
    }
}

pub(super) fn dashboard_route(role: Role) -> &'static str {
    match role.namespace() {
        Role::Doctor => DOCTOR_DASHBOARD,
        Role::Patient => PATIENT_DASHBOARD,
        Role::Coordinator => COORDINATOR_DASHBOARD,
        Role::Admin | Role::SuperAdmin => ADMIN_DASHBOARD,
    }
}
