//! Display projections of [`DashboardStats`].
//!
//! Everything here is derived on demand from the fetched read model and
//! never stored alongside it.

use crate::models::complaint::{DashboardStats, RecentComplaint};
use crate::services::navigation::NavTarget;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt::Write;

pub const CATEGORY_ACCENT: &str = "#3b82f6";
const STATUS_FALLBACK_COLOR: &str = "#6b7280";
const MISSING: &str = "—";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub count: u64,
    pub width_percent: f64,
    pub color: String,
}

impl Bar {
    pub fn width_css(&self) -> String {
        format!("{:.2}%", self.width_percent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCards {
    pub total: u64,
    pub pending: u64,
    pub resolved: u64,
    pub resolution_rate: f64,
    pub users: u64,
}

impl SummaryCards {
    pub fn resolution_rate_label(&self) -> String {
        format!("{:.1}% resolution rate", self.resolution_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleTile {
    pub role: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentRow {
    pub id: i64,
    pub href: String,
    pub subject: String,
    pub category: String,
    pub status: String,
    pub status_color: String,
    pub submitted_by: String,
    pub created: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shortcut {
    pub label: &'static str,
    pub description: &'static str,
    pub href: String,
}

/// Everything the dashboard page shows, derived from one `DashboardStats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardProjection {
    pub cards: SummaryCards,
    pub category_bars: Vec<Bar>,
    pub status_bars: Vec<Bar>,
    pub roles: Vec<RoleTile>,
    pub recent: Vec<RecentRow>,
    pub shortcuts: Vec<Shortcut>,
}

impl DashboardProjection {
    pub fn build(stats: &DashboardStats, date_format: &str) -> Self {
        Self {
            cards: summary_cards(stats),
            category_bars: category_bars(stats),
            status_bars: status_bars(stats),
            roles: stats
                .users_by_role
                .iter()
                .map(|r| RoleTile {
                    role: r.role.clone(),
                    count: r.count,
                })
                .collect(),
            recent: recent_rows(stats, date_format),
            shortcuts: shortcuts(),
        }
    }
}

/// `count / total * 100`, with an empty total giving 0 and the result
/// clamped to a drawable bar.
pub fn percent_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

pub fn total_users(stats: &DashboardStats) -> u64 {
    stats.users_by_role.iter().map(|r| r.count).sum()
}

pub fn summary_cards(stats: &DashboardStats) -> SummaryCards {
    SummaryCards {
        total: stats.total_complaints,
        pending: stats.pending_complaints,
        resolved: stats.resolved_complaints,
        resolution_rate: stats.resolution_rate,
        users: total_users(stats),
    }
}

pub fn category_bars(stats: &DashboardStats) -> Vec<Bar> {
    stats
        .complaints_by_category
        .iter()
        .map(|c| Bar {
            label: c.category.clone(),
            count: c.count,
            width_percent: percent_of(c.count, stats.total_complaints),
            color: CATEGORY_ACCENT.to_string(),
        })
        .collect()
}

pub fn status_bars(stats: &DashboardStats) -> Vec<Bar> {
    stats
        .complaints_by_status
        .iter()
        .map(|s| Bar {
            label: s.status.clone(),
            count: s.count,
            width_percent: percent_of(s.count, stats.total_complaints),
            color: safe_color(&s.color).unwrap_or(STATUS_FALLBACK_COLOR).to_string(),
        })
        .collect()
}

pub fn recent_rows(stats: &DashboardStats, date_format: &str) -> Vec<RecentRow> {
    stats
        .recent_complaints
        .iter()
        .map(|c| recent_row(c, date_format))
        .collect()
}

fn recent_row(complaint: &RecentComplaint, date_format: &str) -> RecentRow {
    let status = complaint.status.as_ref();
    RecentRow {
        id: complaint.id,
        href: NavTarget::Complaint(complaint.id).path(),
        subject: complaint.subject.clone(),
        category: complaint
            .category
            .as_ref()
            .map_or_else(|| MISSING.to_string(), |c| c.name.clone()),
        status: status.map_or_else(|| MISSING.to_string(), |s| s.name.clone()),
        status_color: status
            .and_then(|s| s.color.as_deref())
            .and_then(safe_color)
            .unwrap_or(STATUS_FALLBACK_COLOR)
            .to_string(),
        submitted_by: complaint
            .user
            .as_ref()
            .map_or_else(|| MISSING.to_string(), |u| u.name.clone()),
        created: format_date(&complaint.created_at, date_format),
    }
}

/// Formats a server timestamp as a calendar date. Anything that does not
/// parse is returned as-is.
pub fn format_date(raw: &str, format: &str) -> String {
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));

    let Ok(date) = date else {
        return raw.to_string();
    };

    let mut formatted = String::new();
    match write!(formatted, "{}", date.format(format)) {
        Ok(()) => formatted,
        Err(_) => raw.to_string(),
    }
}

/// Whether `format` is a strftime pattern chrono can render.
pub fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Server colors end up inside a `style` attribute, so only `#rgb`-style
/// hex values and bare color keywords pass.
pub fn safe_color(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    let valid = match raw.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => !raw.is_empty() && raw.len() <= 32 && raw.chars().all(|c| c.is_ascii_alphabetic()),
    };
    valid.then_some(raw)
}

pub fn shortcuts() -> Vec<Shortcut> {
    vec![
        Shortcut {
            label: "Manage Users",
            description: "Add, edit or deactivate accounts",
            href: NavTarget::AdminUsers.path(),
        },
        Shortcut {
            label: "Manage Categories",
            description: "Organize complaint categories",
            href: NavTarget::AdminCategories.path(),
        },
        Shortcut {
            label: "Settings",
            description: "Configure the complaint system",
            href: NavTarget::AdminSettings.path(),
        },
    ]
}
