use serde::{Deserialize, Serialize};

/// Aggregate statistics returned by `GET admin/dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_complaints: u64,
    pub resolved_complaints: u64,
    pub pending_complaints: u64,
    /// Percentage, computed by the server.
    pub resolution_rate: f64,
    #[serde(default)]
    pub complaints_by_category: Vec<CategoryCount>,
    #[serde(default)]
    pub complaints_by_status: Vec<StatusCount>,
    #[serde(default)]
    pub users_by_role: Vec<RoleCount>,
    #[serde(default)]
    pub recent_complaints: Vec<RecentComplaint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub color: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCount {
    pub role: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentComplaint {
    pub id: i64,
    pub subject: String,
    pub category: Option<CategoryRef>,
    pub status: Option<StatusRef>,
    pub user: Option<UserRef>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRef {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub name: String,
}

/// Envelope of the dashboard endpoint. `data` is only trusted when
/// `status` is true.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardEnvelope {
    #[serde(default)]
    pub status: bool,
    pub message: Option<String>,
    pub data: Option<DashboardStats>,
}
