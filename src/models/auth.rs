// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// 1. Role (Cargo do usuário dentro da empresa)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Manager,
    Admin,
    SystemAdmin,
}

impl Role {
    /// Lista de capacidades que o cargo concede.
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .iter()
            .copied()
            .filter(|cap| self.has(*cap))
            .collect()
    }

    pub fn has(&self, capability: Capability) -> bool {
        use Capability::*;
        match capability {
            RecordTime | ViewOwnAttendance | RequestLeave | ViewOwnPayslips => true,
            ViewTeamAttendance | ApproveRequests | ManageShifts => matches!(
                self,
                Role::Manager | Role::Admin | Role::SystemAdmin
            ),
            ManageMasterData | ManagePayrollPeriods | ManageEmployees => {
                matches!(self, Role::Admin | Role::SystemAdmin)
            }
            ViewAuditLogs => matches!(self, Role::SystemAdmin),
        }
    }
}

// ---
// 2. Capability (O que o usuário pode fazer)
// ---
// Substitui o filtro de menu por string de cargo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    RecordTime,
    ViewOwnAttendance,
    RequestLeave,
    ViewOwnPayslips,
    ViewTeamAttendance,
    ApproveRequests,
    ManageShifts,
    ManageMasterData,
    ManagePayrollPeriods,
    ManageEmployees,
    ViewAuditLogs,
}

impl Capability {
    pub const ALL: [Capability; 11] = [
        Capability::RecordTime,
        Capability::ViewOwnAttendance,
        Capability::RequestLeave,
        Capability::ViewOwnPayslips,
        Capability::ViewTeamAttendance,
        Capability::ApproveRequests,
        Capability::ManageShifts,
        Capability::ManageMasterData,
        Capability::ManagePayrollPeriods,
        Capability::ManageEmployees,
        Capability::ViewAuditLogs,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Capability::RecordTime => "attendance:record",
            Capability::ViewOwnAttendance => "attendance:read:own",
            Capability::RequestLeave => "leave:request",
            Capability::ViewOwnPayslips => "payroll:read:own",
            Capability::ViewTeamAttendance => "attendance:read:team",
            Capability::ApproveRequests => "approvals:write",
            Capability::ManageShifts => "shifts:write",
            Capability::ManageMasterData => "master:write",
            Capability::ManagePayrollPeriods => "payroll_periods:write",
            Capability::ManageEmployees => "employees:write",
            Capability::ViewAuditLogs => "audit_logs:read",
        }
    }
}

// ---
// 3. Claims (o conteúdo do JWT emitido pelo provedor de autenticação)
// ---
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,        // ID do usuário
    pub company_id: Uuid, // Tenant
    pub role: Role,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
}

// ---
// 4. Identity (Quem está fazendo a requisição)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: Role,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            company_id: claims.company_id,
            role: claims.role,
        }
    }
}

// Resposta de GET /api/me/capabilities
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesResponse {
    pub identity: Identity,
    pub capabilities: Vec<Capability>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_only_gets_self_service_capabilities() {
        let caps = Role::Employee.capabilities();
        assert_eq!(
            caps,
            vec![
                Capability::RecordTime,
                Capability::ViewOwnAttendance,
                Capability::RequestLeave,
                Capability::ViewOwnPayslips,
            ]
        );
    }

    #[test]
    fn capabilities_grow_with_role() {
        assert!(Role::Manager.has(Capability::ApproveRequests));
        assert!(!Role::Manager.has(Capability::ManageEmployees));
        assert!(Role::Admin.has(Capability::ManagePayrollPeriods));
        assert!(!Role::Admin.has(Capability::ViewAuditLogs));
        assert_eq!(Role::SystemAdmin.capabilities().len(), Capability::ALL.len());
    }

    #[test]
    fn role_uses_snake_case_on_the_wire() {
        let role: Role = serde_json::from_str("\"system_admin\"").unwrap();
        assert_eq!(role, Role::SystemAdmin);
    }
}
