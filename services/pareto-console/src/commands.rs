//! CLI subcommands and their dispatch onto [`Dashboard`]

use std::path::PathBuf;

use clap::{Args, Subcommand};
use pareto_model::{
    AuditFilter, LeadDraft, LeadFilter, LeadPriority, LeadStatus, PageId, SessionStore, Tenant,
    TenantDraft, Theme, User, UserDraft,
};

use crate::dashboard::Dashboard;
use crate::error::{ConsoleError, Result};
use crate::{migration, render};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session token
    Login {
        /// Username (admin portal) or email (user portal)
        login: String,
        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// End the session
    Logout,
    /// Show who the stored session belongs to
    Whoami,
    /// Headline numbers
    Stats,
    /// Manage tenants
    #[command(subcommand)]
    Tenants(TenantCommand),
    /// Manage users
    #[command(subcommand)]
    Users(UserCommand),
    /// Manage CRM leads
    #[command(subcommand)]
    Leads(LeadCommand),
    /// Browse the admin audit log
    AuditLogs(AuditArgs),
    /// Set the first password of a user-portal account
    SetupPassword {
        email: String,
    },
    /// Ask for a password reset e-mail for a user-portal account
    RequestReset {
        email: String,
    },
    /// Set a new password with the token from a reset e-mail
    ResetPassword {
        token: String,
    },
    /// Change the password of the logged-in account
    ChangePassword,
    /// Show or change the stored theme
    Theme {
        /// `light`, `dark` or `toggle`; shows the current theme when omitted
        value: Option<String>,
    },
    /// Print the tenants-table migration SQL
    MigrationSql,
}

#[derive(Debug, Subcommand)]
pub enum TenantCommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
    },
    Show {
        id: i64,
    },
    Create(TenantFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: TenantFields,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct TenantFields {
    #[arg(long)]
    pub company_name: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub inactive: bool,
}

impl From<TenantFields> for TenantDraft {
    fn from(fields: TenantFields) -> Self {
        Self {
            company_name: fields.company_name,
            email: fields.email,
            phone: fields.phone,
            is_active: !fields.inactive,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
        /// Only users of this tenant
        #[arg(long)]
        tenant: Option<i64>,
    },
    Show {
        id: i64,
    },
    Create(UserFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: UserFields,
    },
    Delete {
        id: i64,
    },
    /// Upload a Google token file for a user
    UploadToken {
        id: i64,
        /// Path to the token JSON file
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct UserFields {
    #[arg(long)]
    pub tenant: i64,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub calendar_id: Option<String>,
    #[arg(long)]
    pub disabled: bool,
}

impl From<UserFields> for UserDraft {
    fn from(fields: UserFields) -> Self {
        Self {
            tenant_id: fields.tenant,
            first_name: fields.first_name,
            last_name: fields.last_name,
            phone_number: fields.phone,
            email: fields.email,
            is_enabled: !fields.disabled,
            google_calendar_id: fields.calendar_id,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum LeadCommand {
    List(LeadListArgs),
    Show {
        id: i64,
    },
    /// Create a lead from a free-text message (user portal)
    Create {
        message: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        priority: Option<LeadPriority>,
        #[arg(long)]
        status: Option<LeadStatus>,
    },
    Delete {
        id: i64,
    },
    /// Lead counts by status and priority
    Stats {
        /// Only this tenant (admin portal)
        #[arg(long)]
        tenant: Option<i64>,
    },
}

#[derive(Debug, Args)]
pub struct LeadListArgs {
    #[arg(long)]
    pub status: Option<LeadStatus>,
    #[arg(long)]
    pub priority: Option<LeadPriority>,
    #[arg(long)]
    pub tenant: Option<i64>,
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub offset: Option<u32>,
    #[arg(long, default_value = "")]
    pub search: String,
    /// Only leads assigned to the logged-in user
    #[arg(long)]
    pub mine: bool,
}

impl From<LeadListArgs> for LeadFilter {
    fn from(args: LeadListArgs) -> Self {
        Self {
            status: args.status,
            priority: args.priority,
            tenant_id: args.tenant,
            limit: args.limit,
            offset: args.offset,
            search: args.search,
            my_leads: args.mine,
        }
    }
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub admin: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long, default_value = "")]
    pub search: String,
}

impl From<AuditArgs> for AuditFilter {
    fn from(args: AuditArgs) -> Self {
        Self {
            admin: args.admin,
            action: args.action,
            entity_type: args.entity_type,
            limit: args.limit,
            search: args.search,
        }
    }
}

/// Interactive input the commands need; swapped out in tests
pub trait Prompt {
    fn password(&mut self, label: &str) -> Result<String>;
}

/// Reads passwords from the terminal without echo
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn password(&mut self, label: &str) -> Result<String> {
        Ok(rpassword::prompt_password(format!("{label}: "))?)
    }
}

/// Execute one command, returning the text to print
pub async fn execute<S: SessionStore>(
    dashboard: &mut Dashboard<S>,
    command: Command,
    prompt: &mut dyn Prompt,
) -> Result<String> {
    match command {
        Command::Login { login, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt.password("Password")?,
            };
            let session = dashboard.login(&login, &password).await?;
            Ok(format!(
                "Logged in as {} ({})\n",
                session.identity.display_name(),
                session.portal()
            ))
        }
        Command::SetupPassword { email } => {
            let password = prompt.password("New password")?;
            let confirm = prompt.password("Confirm password")?;
            let message = dashboard.setup_password(&email, &password, &confirm).await?;
            Ok(format!("{message}\n"))
        }
        Command::RequestReset { email } => {
            let ticket = dashboard.request_password_reset(&email).await?;
            let mut out = format!("{}\n", ticket.message);
            if let Some(token) = ticket.token {
                out.push_str(&format!("Reset token: {token}\n"));
            }
            Ok(out)
        }
        Command::ResetPassword { token } => {
            let new = prompt.password("New password")?;
            let confirm = prompt.password("Confirm password")?;
            let message = dashboard.reset_password(&token, &new, &confirm).await?;
            Ok(format!("{message}\n"))
        }
        Command::Theme { value } => theme(dashboard, value.as_deref()),
        Command::MigrationSql => Ok(migration::render()),
        command => {
            if dashboard.start().await.is_none() {
                return Err(ConsoleError::NotAuthenticated);
            }
            authenticated(dashboard, command, prompt).await
        }
    }
}

async fn authenticated<S: SessionStore>(
    dashboard: &mut Dashboard<S>,
    command: Command,
    prompt: &mut dyn Prompt,
) -> Result<String> {
    match command {
        Command::Logout => {
            dashboard.logout().await;
            Ok("Logged out\n".to_string())
        }
        Command::Whoami => match dashboard.session() {
            Some(session) => Ok(format!(
                "{} ({})\n",
                session.identity.display_name(),
                session.portal()
            )),
            None => Err(ConsoleError::NotAuthenticated),
        },
        Command::Stats => {
            dashboard.open_page(PageId::Dashboard).await?;
            Ok(dashboard.stats().map(render::stats).unwrap_or_default())
        }
        Command::Tenants(command) => tenants(dashboard, command).await,
        Command::Users(command) => users(dashboard, command).await,
        Command::Leads(command) => leads(dashboard, command).await,
        Command::AuditLogs(args) => {
            let rows = dashboard.load_audit_logs(args.into()).await?;
            Ok(render::audit_logs(&rows))
        }
        Command::ChangePassword => {
            let current = prompt.password("Current password")?;
            let new = prompt.password("New password")?;
            let confirm = prompt.password("Confirm new password")?;
            let message = dashboard.change_password(&current, &new, &confirm).await?;
            Ok(format!("{message}\n"))
        }
        Command::Login { .. }
        | Command::SetupPassword { .. }
        | Command::RequestReset { .. }
        | Command::ResetPassword { .. }
        | Command::Theme { .. }
        | Command::MigrationSql => Err(ConsoleError::Unsupported(
            "command does not need a session",
        )),
    }
}

async fn tenants<S: SessionStore>(
    dashboard: &mut Dashboard<S>,
    command: TenantCommand,
) -> Result<String> {
    match command {
        TenantCommand::List { search } => {
            let rows = dashboard.load_tenants(&search).await?.to_vec();
            let visible = pareto_model::filter::search(&rows, &search);
            Ok(render::tenants(&visible))
        }
        TenantCommand::Show { id } => {
            dashboard.load_tenants("").await?;
            let tenant = find(dashboard.tenants(), id, |t: &Tenant| t.id)?;
            Ok(render::tenants(&[tenant]))
        }
        TenantCommand::Create(fields) => {
            let tenant = dashboard.save_tenant(None, &fields.into()).await?;
            Ok(format!("Created tenant {} ({})\n", tenant.company_name, tenant.id))
        }
        TenantCommand::Update { id, fields } => {
            let tenant = dashboard.save_tenant(Some(id), &fields.into()).await?;
            Ok(format!("Updated tenant {} ({})\n", tenant.company_name, tenant.id))
        }
        TenantCommand::Delete { id } => {
            dashboard.load_tenants("").await?;
            dashboard.delete_tenant(id).await?;
            Ok(format!("Deleted tenant {id}\n"))
        }
    }
}

async fn users<S: SessionStore>(
    dashboard: &mut Dashboard<S>,
    command: UserCommand,
) -> Result<String> {
    match command {
        UserCommand::List { search, tenant } => {
            let rows: Vec<User> = dashboard
                .load_users(&search)
                .await?
                .into_iter()
                .filter(|user| tenant.map_or(true, |tenant_id| user.tenant_id == tenant_id))
                .cloned()
                .collect();
            let rows: Vec<&User> = rows.iter().collect();
            Ok(render::users(&rows, |id| dashboard.tenant_name(id)))
        }
        UserCommand::Show { id } => {
            dashboard.load_users("").await?;
            let user = find(dashboard.users(), id, |u: &User| u.id)?;
            Ok(render::users(&[user], |id| dashboard.tenant_name(id)))
        }
        UserCommand::Create(fields) => {
            let user = dashboard.save_user(None, &fields.into()).await?;
            Ok(format!("Created user {} ({})\n", user.full_name(), user.id))
        }
        UserCommand::Update { id, fields } => {
            let user = dashboard.save_user(Some(id), &fields.into()).await?;
            Ok(format!("Updated user {} ({})\n", user.full_name(), user.id))
        }
        UserCommand::Delete { id } => {
            dashboard.load_users("").await?;
            dashboard.delete_user(id).await?;
            Ok(format!("Deleted user {id}\n"))
        }
        UserCommand::UploadToken { id, file } => {
            let raw = std::fs::read_to_string(&file)?;
            let message = dashboard.upload_token(id, &raw).await?;
            Ok(format!("{message}\n"))
        }
    }
}

async fn leads<S: SessionStore>(
    dashboard: &mut Dashboard<S>,
    command: LeadCommand,
) -> Result<String> {
    match command {
        LeadCommand::List(args) => {
            let rows = dashboard.load_leads(args.into()).await?;
            let mut out = render::leads(&rows);
            if let Some(stats) = dashboard.lead_stats() {
                out.push('\n');
                out.push_str(&render::lead_stats(stats));
            }
            Ok(out)
        }
        LeadCommand::Show { id } => {
            let lead = dashboard.show_lead(id).await?;
            Ok(render::lead_detail(&lead))
        }
        LeadCommand::Create { message } => {
            let lead = dashboard.create_lead(&message).await?;
            Ok(format!("Created lead {}: {}\n", lead.id, lead.subject))
        }
        LeadCommand::Update {
            id,
            subject,
            owner,
            priority,
            status,
        } => {
            let draft = LeadDraft {
                message: None,
                subject,
                owner,
                priority,
                status,
            };
            let lead = dashboard.update_lead(id, &draft).await?;
            Ok(format!("Updated lead {}\n", lead.id))
        }
        LeadCommand::Delete { id } => {
            dashboard.delete_lead(id).await?;
            Ok(format!("Deleted lead {id}\n"))
        }
        LeadCommand::Stats { tenant } => {
            let breakdown = dashboard.load_lead_breakdown(tenant).await?;
            Ok(render::lead_breakdown(breakdown))
        }
    }
}

fn theme<S: SessionStore>(dashboard: &mut Dashboard<S>, value: Option<&str>) -> Result<String> {
    let theme = match value {
        None => dashboard.theme(),
        Some("toggle") => dashboard.toggle_theme(),
        Some(raw) => {
            let theme: Theme = raw.parse()?;
            dashboard.set_theme(theme);
            theme
        }
    };
    Ok(format!("Theme: {}\n", theme.as_str()))
}

fn find<'a, T>(rows: &'a [T], id: i64, key: impl Fn(&T) -> i64) -> Result<&'a T> {
    rows.iter().find(|row| key(row) == id).ok_or_else(|| {
        ConsoleError::Request(pareto_model::RequestError::Http {
            status: 404,
            message: format!("No record with id {id}"),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::io::{HttpResponse, MockHttpClient};
    use crate::session::SessionManager;
    use clap::Parser;
    use pareto_model::{MemoryStore, Portal};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Arc;

    #[derive(Parser)]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    struct Scripted(VecDeque<&'static str>);

    impl Prompt for Scripted {
        fn password(&mut self, _label: &str) -> Result<String> {
            Ok(self.0.pop_front().unwrap_or_default().to_string())
        }
    }

    fn parse(args: &[&str]) -> Command {
        let mut argv = vec!["pareto-console"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv).command
    }

    fn dashboard(mock: MockHttpClient) -> Dashboard<MemoryStore> {
        let api = ApiClient::new("http://api.test", Arc::new(mock));
        Dashboard::new(SessionManager::new(api, MemoryStore::new(), Portal::User), 5_000)
    }

    #[test]
    fn lead_filters_parse_from_flags() {
        let command = parse(&[
            "leads", "list", "--status", "in-progress", "--priority", "high", "--mine",
        ]);
        let Command::Leads(LeadCommand::List(args)) = command else {
            panic!("unexpected command");
        };
        let filter = LeadFilter::from(args);
        assert_eq!(filter.status, Some(LeadStatus::InProgress));
        assert_eq!(filter.priority, Some(LeadPriority::High));
        assert!(filter.my_leads);
    }

    #[test]
    fn tenant_fields_map_to_draft() {
        let command = parse(&[
            "tenants", "update", "4", "--company-name", "Acme", "--inactive",
        ]);
        let Command::Tenants(TenantCommand::Update { id, fields }) = command else {
            panic!("unexpected command");
        };
        let draft = TenantDraft::from(fields);
        assert_eq!(id, 4);
        assert_eq!(draft.company_name, "Acme");
        assert!(!draft.is_active);
    }

    #[tokio::test]
    async fn migration_sql_needs_no_session() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().never();
        let mut dash = dashboard(mock);

        let out = execute(&mut dash, Command::MigrationSql, &mut Scripted(VecDeque::new()))
            .await
            .unwrap();
        assert!(out.contains("ADD COLUMN IF NOT EXISTS created_at"));
    }

    #[tokio::test]
    async fn setup_password_mismatch_never_calls_api() {
        let mut mock = MockHttpClient::new();
        mock.expect_post_json().never();
        let mut dash = dashboard(mock);

        let prompt = &mut Scripted(VecDeque::from(["password1", "password2"]));
        let err = execute(
            &mut dash,
            parse(&["setup-password", "ada@example.test"]),
            prompt,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match.");
    }

    #[tokio::test]
    async fn request_reset_shows_debug_token_without_session() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().never();
        mock.expect_post_json()
            .withf(|url, token, _| url.ends_with("/api/user/request-reset") && token.is_none())
            .returning(|_, _, _| {
                Box::pin(async {
                    Ok(HttpResponse {
                        status: 200,
                        body: json!({
                            "success": true,
                            "message": "If the email exists, a reset link will be sent.",
                            "reset_token": "r-7"
                        })
                        .to_string(),
                    })
                })
            });
        let mut dash = dashboard(mock);

        let out = execute(
            &mut dash,
            parse(&["request-reset", "ada@example.test"]),
            &mut Scripted(VecDeque::new()),
        )
        .await
        .unwrap();
        assert_eq!(
            out,
            "If the email exists, a reset link will be sent.\nReset token: r-7\n"
        );
    }

    #[tokio::test]
    async fn commands_without_session_are_refused() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().never();
        let mut dash = dashboard(mock);

        let err = execute(&mut dash, parse(&["leads", "list"]), &mut Scripted(VecDeque::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::NotAuthenticated));
    }

    #[tokio::test]
    async fn login_prompts_for_missing_password() {
        let mut mock = MockHttpClient::new();
        mock.expect_post_json()
            .withf(|_, _, body| body["password"] == "from-prompt")
            .returning(|_, _, _| {
                Box::pin(async {
                    Ok(HttpResponse {
                        status: 200,
                        body: json!({
                            "success": true,
                            "session_token": "t",
                            "user": {"id": 1, "email": "ada@example.test", "full_name": "Ada"}
                        })
                        .to_string(),
                    })
                })
            });
        let mut dash = dashboard(mock);

        let out = execute(
            &mut dash,
            parse(&["login", "ada@example.test"]),
            &mut Scripted(VecDeque::from(["from-prompt"])),
        )
        .await
        .unwrap();
        assert_eq!(out, "Logged in as Ada (user)\n");
    }

    #[tokio::test]
    async fn theme_toggle_persists() {
        let mut dash = dashboard(MockHttpClient::new());
        let prompt = &mut Scripted(VecDeque::new());

        let out = execute(&mut dash, parse(&["theme", "toggle"]), prompt)
            .await
            .unwrap();
        assert_eq!(out, "Theme: dark\n");
        let out = execute(&mut dash, parse(&["theme"]), prompt).await.unwrap();
        assert_eq!(out, "Theme: dark\n");
    }
}
