//! Queueless CLI - command-line client for the Queueless REST API

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "queueless")]
#[command(about = "Queueless queue/token service CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL
    #[arg(long, env = "QUEUELESS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Bearer token from `login` (needed for serve, miss, history, analytics)
    #[arg(long, env = "QUEUELESS_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List centers and their departments
    Services,

    /// Show the live queue of a department
    List {
        /// Department ID
        department_id: i64,
    },

    /// Take a token in a department queue
    Join {
        /// Department ID
        department_id: i64,

        /// Priority token (served before regular tokens)
        #[arg(short, long)]
        priority: bool,
    },

    /// Serve a waiting token (admin)
    Serve {
        /// Token number
        token_number: i64,

        /// Department ID, required when the number waits in several departments
        #[arg(short, long)]
        department: Option<i64>,
    },

    /// Mark a waiting token as missed (admin)
    Miss {
        /// Token number
        token_number: i64,

        /// Department ID, required when the number waits in several departments
        #[arg(short, long)]
        department: Option<i64>,
    },

    /// Show your token history
    History,

    /// Show booking analytics (admin)
    Analytics,

    /// Create an account and print its bearer token
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Register as administrator
        #[arg(long)]
        admin: bool,
    },

    /// Sign in and print a bearer token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Send feedback
    Feedback {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// 1 to 5
        #[arg(long)]
        rating: i32,
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Check that the daemon is up
    Status,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Department {
    id: i64,
    name: String,
    max_slots: i64,
    avg_service_time: i64,
}

#[derive(Deserialize)]
struct Center {
    name: String,
    departments: Vec<Department>,
}

#[derive(Tabled)]
struct ServiceRow {
    center: String,
    id: i64,
    department: String,
    max_slots: i64,
    avg_minutes: i64,
}

#[derive(Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct QueueRow {
    #[tabled(rename = "token")]
    token_number: i64,
    priority: bool,
    status: String,
    #[tabled(rename = "joined")]
    created_at: String,
}

#[derive(Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct JoinResult {
    #[tabled(rename = "token")]
    token_number: i64,
    #[tabled(rename = "wait (min)")]
    estimated_wait_time: i64,
    #[tabled(rename = "department")]
    department_id: i64,
    priority: bool,
}

#[derive(Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct HistoryRow {
    #[tabled(rename = "token")]
    token_number: i64,
    #[tabled(rename = "center")]
    center_name: String,
    #[tabled(rename = "department")]
    department_name: String,
    #[tabled(rename = "slot")]
    slot_time: String,
    status: String,
}

#[derive(Deserialize, Tabled)]
struct PeakHour {
    hour: String,
    bookings: i64,
}

#[derive(Deserialize, Tabled)]
struct ServiceStat {
    service: String,
    count: i64,
}

#[derive(Deserialize, Tabled)]
struct StatusStat {
    status: String,
    count: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Analytics {
    peak_hours: Vec<PeakHour>,
    service_stats: Vec<ServiceStat>,
    token_status: Vec<StatusStat>,
}

#[derive(Deserialize)]
struct AuthResult {
    token: String,
    role: String,
}

struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http: reqwest::Client::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await.context("Failed to connect to daemon")?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        match response.json::<ApiErrorBody>().await {
            Ok(body) => anyhow::bail!("{} ({}): {}", body.error, status.as_u16(), body.message),
            Err(_) if status == StatusCode::UNAUTHORIZED => {
                anyhow::bail!("Not signed in. Run `queueless login` and set QUEUELESS_TOKEN")
            }
            Err(_) => anyhow::bail!("Request failed with status {}", status),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::GET, path))
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        self.send(self.request(Method::POST, path).json(&body))
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    async fn post_empty(&self, path: &str) -> Result<()> {
        self.send(self.request(Method::POST, path)).await?;
        Ok(())
    }
}

fn transition_path(action: &str, token_number: i64, department: Option<i64>) -> String {
    match department {
        Some(dept) => format!("/queue/{}/{}?departmentId={}", action, token_number, dept),
        None => format!("/queue/{}/{}", action, token_number),
    }
}

fn print_grant(grant: AuthResult) {
    println!("{}", format!("✓ Signed in as {}", grant.role).green().bold());
    println!();
    println!("export QUEUELESS_TOKEN={}", grant.token);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api = ApiClient::new(&cli.api_url, cli.token);

    match cli.command {
        Commands::Services => {
            let centers: Vec<Center> = api.get("/services").await?;
            let rows: Vec<ServiceRow> = centers
                .into_iter()
                .flat_map(|center| {
                    let name = center.name;
                    center.departments.into_iter().map(move |d| ServiceRow {
                        center: name.clone(),
                        id: d.id,
                        department: d.name,
                        max_slots: d.max_slots,
                        avg_minutes: d.avg_service_time,
                    })
                })
                .collect();

            if rows.is_empty() {
                println!("{}", "No services configured".yellow());
            } else {
                println!("{}", Table::new(rows));
            }
        }

        Commands::List { department_id } => {
            let queue: Vec<QueueRow> = api
                .get(&format!("/queue/list/{}", department_id))
                .await?;

            println!(
                "{}",
                format!("Department {} - {} waiting", department_id, queue.len())
                    .cyan()
                    .bold()
            );
            if !queue.is_empty() {
                println!("{}", Table::new(queue));
            }
        }

        Commands::Join {
            department_id,
            priority,
        } => {
            let joined: JoinResult = api
                .post(
                    "/queue/join",
                    json!({ "departmentId": department_id, "priority": priority }),
                )
                .await?;

            println!("{}", "✓ Joined the queue".green().bold());
            println!();
            println!("{}", Table::new(vec![joined]));
        }

        Commands::Serve {
            token_number,
            department,
        } => {
            api.post_empty(&transition_path("serve", token_number, department))
                .await?;
            println!("{}", format!("✓ Token {} served", token_number).green().bold());
        }

        Commands::Miss {
            token_number,
            department,
        } => {
            api.post_empty(&transition_path("miss", token_number, department))
                .await?;
            println!(
                "{}",
                format!("✓ Token {} marked missed", token_number).yellow().bold()
            );
        }

        Commands::History => {
            let history: Vec<HistoryRow> = api.get("/tokens/history").await?;
            if history.is_empty() {
                println!("{}", "No tokens yet".yellow());
            } else {
                println!("{}", Table::new(history));
            }
        }

        Commands::Analytics => {
            let report: Analytics = api.get("/admin/analytics").await?;

            println!("{}", "Peak hours (UTC)".cyan().bold());
            println!("{}", Table::new(report.peak_hours));
            println!();
            println!("{}", "Tokens per service".cyan().bold());
            println!("{}", Table::new(report.service_stats));
            println!();
            println!("{}", "Token status".cyan().bold());
            println!("{}", Table::new(report.token_status));
        }

        Commands::Register {
            name,
            email,
            password,
            admin,
        } => {
            let grant: AuthResult = api
                .post(
                    "/auth/register",
                    json!({
                        "fullName": name,
                        "email": email,
                        "password": password,
                        "role": if admin { "admin" } else { "user" },
                    }),
                )
                .await?;
            print_grant(grant);
        }

        Commands::Login { email, password } => {
            let grant: AuthResult = api
                .post("/auth/login", json!({ "email": email, "password": password }))
                .await?;
            print_grant(grant);
        }

        Commands::Feedback {
            name,
            email,
            rating,
            message,
        } => {
            #[derive(Deserialize)]
            struct Created {
                id: String,
            }

            let created: Created = api
                .post(
                    "/feedback",
                    json!({ "name": name, "email": email, "rating": rating, "message": message }),
                )
                .await?;
            println!("{}", format!("✓ Feedback recorded ({})", created.id).green().bold());
        }

        Commands::Status => {
            #[derive(Deserialize)]
            struct Health {
                status: String,
                version: String,
            }

            match api.get::<Health>("/health").await {
                Ok(health) => {
                    println!("{}", "System Status".cyan().bold());
                    println!("  status:  {}", health.status.green());
                    println!("  version: {}", health.version);
                }
                Err(e) => {
                    println!("{}", "✗ Daemon not reachable".red().bold());
                    println!("  {}", e);
                }
            }
        }
    }

    Ok(())
}
