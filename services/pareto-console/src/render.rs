//! Plain-text rendering of dashboard screens

use pareto_model::{
    Alert, AuditLog, DashboardStats, Lead, LeadBreakdown, LeadStats, Severity, Tenant, User,
};
use serde_json::Value;

/// Column-aligned text table
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, H>(headers: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, C>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }

        let mut out = String::new();
        push_line(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule, &widths);
        for row in &self.rows {
            push_line(&mut out, row, &widths);
        }
        out
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!("{cell:<width$}")
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// Server timestamp shortened to `YYYY-MM-DD HH:MM`; unparseable values
/// are shown as sent
pub fn timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return "-".to_string();
    };
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    match chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub fn tenants(rows: &[&Tenant]) -> String {
    if rows.is_empty() {
        return "No tenants found.\n".to_string();
    }
    let mut table = Table::new(["ID", "Company", "Email", "Phone", "Active", "Users"]);
    for t in rows {
        table.row([
            t.id.to_string(),
            t.company_name.clone(),
            or_dash(t.email.as_deref()),
            or_dash(t.phone.as_deref()),
            yes_no(t.is_active).to_string(),
            t.user_count.to_string(),
        ]);
    }
    table.render()
}

/// Users table; `tenant_name` labels the tenant column when known
pub fn users<'a>(rows: &[&User], tenant_name: impl Fn(i64) -> Option<&'a str>) -> String {
    if rows.is_empty() {
        return "No users found.\n".to_string();
    }
    let mut table = Table::new(["ID", "Name", "Tenant", "Phone", "Email", "Enabled", "Token"]);
    for u in rows {
        let tenant = tenant_name(u.tenant_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", u.tenant_id));
        table.row([
            u.id.to_string(),
            u.full_name(),
            tenant,
            u.phone_number.clone(),
            or_dash(u.email.as_deref()),
            yes_no(u.is_enabled).to_string(),
            yes_no(u.has_token).to_string(),
        ]);
    }
    table.render()
}

pub fn leads(rows: &[&Lead]) -> String {
    if rows.is_empty() {
        return "No leads found.\n".to_string();
    }
    let mut table = Table::new(["ID", "Subject", "Owner", "Priority", "Status", "Tenant", "Created"]);
    for l in rows {
        table.row([
            l.id.to_string(),
            l.subject.clone(),
            or_dash(l.owner.as_deref()),
            l.priority.map(|p| p.as_str()).unwrap_or("-").to_string(),
            l.status.map(|s| s.as_str()).unwrap_or("-").to_string(),
            or_dash(l.tenant_name.as_deref()),
            timestamp(l.created_at.as_deref()),
        ]);
    }
    table.render()
}

pub fn lead_stats(stats: &LeadStats) -> String {
    let mut line = format!(
        "Total: {}  Open: {}  In progress: {}",
        stats.total, stats.open, stats.in_progress
    );
    if let Some(high) = stats.high_priority {
        line.push_str(&format!("  High priority: {high}"));
    }
    if let Some(mine) = stats.my_leads {
        line.push_str(&format!("  Mine: {mine}"));
    }
    line.push('\n');
    line
}

/// Status and priority buckets, keys in alphabetical order
pub fn lead_breakdown(stats: &LeadBreakdown) -> String {
    let mut table = Table::new(["Group", "Value", "Leads"]);
    table.row(["Total".to_string(), "-".to_string(), stats.total.to_string()]);
    for (status, count) in &stats.by_status {
        table.row(["Status".to_string(), status.clone(), count.to_string()]);
    }
    for (priority, count) in &stats.by_priority {
        table.row(["Priority".to_string(), priority.clone(), count.to_string()]);
    }
    table.render()
}

/// Lead detail view; content and actions are shown verbatim
pub fn lead_detail(lead: &Lead) -> String {
    let mut out = format!("Lead #{}: {}\n", lead.id, lead.subject);
    out.push_str(&format!("Owner:    {}\n", or_dash(lead.owner.as_deref())));
    out.push_str(&format!(
        "Priority: {}\n",
        lead.priority.map(|p| p.as_str()).unwrap_or("-")
    ));
    out.push_str(&format!(
        "Status:   {}\n",
        lead.status.map(|s| s.as_str()).unwrap_or("-")
    ));
    out.push_str("\nContent:\n");
    out.push_str(&verbatim(&lead.content));
    out.push_str("\nActions:\n");
    out.push_str(&verbatim(&lead.action));
    out
}

fn verbatim(value: &Value) -> String {
    match value {
        Value::Null => "-\n".to_string(),
        Value::String(text) => format!("{text}\n"),
        other => match serde_json::to_string_pretty(other) {
            Ok(text) => format!("{text}\n"),
            Err(_) => format!("{other}\n"),
        },
    }
}

pub fn audit_logs(rows: &[&AuditLog]) -> String {
    if rows.is_empty() {
        return "No audit log entries.\n".to_string();
    }
    let mut table = Table::new(["When", "Admin", "Action", "Entity", "IP"]);
    for log in rows {
        let entity = match (&log.entity_type, log.entity_id) {
            (Some(kind), Some(id)) => format!("{kind} #{id}"),
            (Some(kind), None) => kind.clone(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => "-".to_string(),
        };
        table.row([
            timestamp(log.created_at.as_deref()),
            or_dash(log.admin.as_deref()),
            log.action.clone(),
            entity,
            or_dash(log.ip_address.as_deref()),
        ]);
    }
    table.render()
}

pub fn stats(stats: &DashboardStats) -> String {
    let mut table = Table::new(["Metric", "Value"]);
    table
        .row(["Tenants".to_string(), stats.total_tenants.to_string()])
        .row(["Users".to_string(), stats.total_users.to_string()])
        .row(["Active users".to_string(), stats.active_users.to_string()])
        .row(["Admins".to_string(), stats.total_admins.to_string()]);
    table.render()
}

pub fn alert(alert: &Alert) -> String {
    let tag = match alert.severity {
        Severity::Info => "info",
        Severity::Success => "ok",
        Severity::Error => "error",
        Severity::Warning => "warn",
    };
    format!("[{tag}] {}", alert.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tenant(id: i64, name: &str) -> Tenant {
        serde_json::from_value(json!({"id": id, "company_name": name, "user_count": 3})).unwrap()
    }

    #[test]
    fn columns_are_aligned() {
        let mut table = Table::new(["ID", "Name"]);
        table.row(["1", "Acme"]).row(["200", "B"]);
        let text = table.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID   Name");
        assert_eq!(lines[1], "---  ----");
        assert_eq!(lines[2], "1    Acme");
        assert_eq!(lines[3], "200  B");
    }

    #[test]
    fn tenants_table_shows_server_counts() {
        let a = tenant(1, "Acme");
        let text = tenants(&[&a]);
        assert!(text.contains("Acme"));
        assert!(text.lines().nth(2).unwrap().ends_with('3'));
    }

    #[test]
    fn timestamps_are_shortened() {
        assert_eq!(timestamp(Some("2025-03-01T14:05:09.123456")), "2025-03-01 14:05");
        assert_eq!(timestamp(Some("2025-03-01T14:05:09+00:00")), "2025-03-01 14:05");
        assert_eq!(timestamp(Some("yesterday")), "yesterday");
        assert_eq!(timestamp(None), "-");
    }

    #[test]
    fn empty_lists_say_so() {
        assert_eq!(tenants(&[]), "No tenants found.\n");
        assert_eq!(leads(&[]), "No leads found.\n");
    }

    #[test]
    fn users_fall_back_to_tenant_id() {
        let user: User = serde_json::from_value(json!({
            "id": 4, "tenant_id": 9, "first_name": "Ada", "last_name": "L", "phone_number": "+1"
        }))
        .unwrap();
        let text = users(&[&user], |_| None);
        assert!(text.contains("#9"));
        assert!(text.contains("Ada L"));
    }

    #[test]
    fn breakdown_lists_every_bucket() {
        let stats: LeadBreakdown = serde_json::from_value(json!({
            "total": 4,
            "by_status": {"Open": 3, "Closed": 1},
            "by_priority": {"High": 2}
        }))
        .unwrap();
        let text = lead_breakdown(&stats);
        let rows: Vec<&str> = text.lines().skip(2).collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].starts_with("Total"));
        assert!(rows[1].contains("Closed"));
        assert!(rows[3].contains("High"));
    }

    #[test]
    fn lead_content_is_rendered_verbatim() {
        let lead: Lead = serde_json::from_value(json!({
            "id": 2,
            "lead_subject": "Roof repair",
            "lead_content": {"name": "Bob"},
            "actions": "call back"
        }))
        .unwrap();
        let text = lead_detail(&lead);
        assert!(text.contains("\"name\": \"Bob\""));
        assert!(text.contains("call back"));
    }
}
