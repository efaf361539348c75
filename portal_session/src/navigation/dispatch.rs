use crate::principal::{AccountStatus, Role};

use super::routes::{ADMIN_DASHBOARD, dashboard_route, login_route};

/// Where a user lands after signing in or registering.
///
/// Admins and super admins always land on the admin dashboard. Every other
/// role lands on its own dashboard when active and on its login page
/// otherwise. This is the only place that decision is made.
pub fn landing_route(role: Role, status: AccountStatus) -> &'static str {
    match (role, status) {
        (Role::Admin | Role::SuperAdmin, _) => ADMIN_DASHBOARD,
        (role, AccountStatus::Active) => dashboard_route(role),
        (role, AccountStatus::PendingVerification | AccountStatus::Suspended) => {
            login_route(role)
        }
    }
}
