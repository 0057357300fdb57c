//! Wire representations of the backend resources.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crud::{Entity, Resource};

/// Account role reported by `/me/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    #[default]
    Employee,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Manager => write!(f, "MANAGER"),
            Role::Employee => write!(f, "EMPLOYEE"),
            Role::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// The authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_departments: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_employees: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyDraft {
    pub name: String,
}

impl Entity for Company {
    type Draft = CompanyDraft;

    fn id(&self) -> i64 {
        self.id
    }

    fn to_draft(&self) -> CompanyDraft {
        CompanyDraft {
            name: self.name.clone(),
        }
    }

    fn resource() -> Resource {
        Resource {
            endpoint: "/companies/",
            all_endpoint: Some("/companies/all/"),
            entity_name: "company",
            entity_name_plural: "companies",
            error_fields: &["name"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub company: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_employees: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepartmentDraft {
    /// Owning company id; `None` until chosen.
    pub company: Option<i64>,
    pub name: String,
}

impl Entity for Department {
    type Draft = DepartmentDraft;

    fn id(&self) -> i64 {
        self.id
    }

    fn to_draft(&self) -> DepartmentDraft {
        DepartmentDraft {
            company: Some(self.company),
            name: self.name.clone(),
        }
    }

    fn resource() -> Resource {
        Resource {
            endpoint: "/departments/",
            all_endpoint: Some("/departments/all/"),
            entity_name: "department",
            entity_name_plural: "departments",
            error_fields: &["name", "company"],
        }
    }
}

/// Hiring pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
    #[default]
    ApplicationReceived,
    InterviewScheduled,
    Hired,
    NotAccepted,
    #[serde(other)]
    Unknown,
}

impl EmployeeStatus {
    pub fn label(self) -> &'static str {
        match self {
            EmployeeStatus::ApplicationReceived => "Application Received",
            EmployeeStatus::InterviewScheduled => "Interview Scheduled",
            EmployeeStatus::Hired => "Hired",
            EmployeeStatus::NotAccepted => "Not Accepted",
            EmployeeStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub company: i64,
    pub department: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    #[serde(default)]
    pub status: EmployeeStatus,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub hired_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_employed: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeDraft {
    pub company: Option<i64>,
    pub department: Option<i64>,
    pub status: EmployeeStatus,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub address: String,
    pub designation: String,
    pub hired_on: Option<String>,
}

impl Entity for Employee {
    type Draft = EmployeeDraft;

    fn id(&self) -> i64 {
        self.id
    }

    fn to_draft(&self) -> EmployeeDraft {
        EmployeeDraft {
            company: Some(self.company),
            department: Some(self.department),
            status: self.status,
            name: self.name.clone(),
            email: self.email.clone(),
            mobile: self.mobile.clone(),
            address: self.address.clone(),
            designation: self.designation.clone(),
            hired_on: self.hired_on.clone(),
        }
    }

    fn resource() -> Resource {
        Resource {
            endpoint: "/employees/",
            all_endpoint: None,
            entity_name: "employee",
            entity_name_plural: "employees",
            error_fields: &[
                "name",
                "email",
                "company",
                "department",
                "mobile",
                "designation",
                "status",
                "hired_on",
                "address",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_employee_from_wire() {
        let employee: Employee = serde_json::from_value(json!({
            "id": 4,
            "company": 1,
            "department": 2,
            "company_name": "Acme",
            "department_name": "Ops",
            "status": "INTERVIEW_SCHEDULED",
            "name": "Grace",
            "email": "grace@acme.test",
            "mobile": "555",
            "address": "",
            "designation": "Engineer",
            "hired_on": null,
            "days_employed": null
        }))
        .unwrap();

        assert_eq!(employee.status, EmployeeStatus::InterviewScheduled);
        assert_eq!(employee.to_draft().department, Some(2));
    }

    #[test]
    fn test_unknown_values_are_tolerated() {
        let user: UserProfile =
            serde_json::from_value(json!({"id": 1, "role": "AUDITOR"})).unwrap();
        assert_eq!(user.role, Role::Unknown);

        let status: EmployeeStatus = serde_json::from_value(json!("ON_LEAVE")).unwrap();
        assert_eq!(status, EmployeeStatus::Unknown);
    }

    #[test]
    fn test_draft_serializes_wire_names() {
        let draft = EmployeeDraft {
            status: EmployeeStatus::Hired,
            ..EmployeeDraft::default()
        };
        let value = serde_json::to_value(draft).unwrap();
        assert_eq!(value["status"], "HIRED");
        assert!(value["company"].is_null());
    }
}
