//! AuditVault CLI: submit inspection documents and review them by role.
//!
//! Set AUDITVAULT_ANALYSIS_URL, AUDITVAULT_LEDGER_URL and optionally
//! AUDITVAULT_API_KEY; client state lives under AUDITVAULT_STATE_DIR.
//! Set AUDITVAULT_WALLET_ADDRESS to enable the wallet.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use auditvault_api_client::clients_from_config;
use auditvault_cli::provider::TerminalProvider;
use auditvault_cli::{init_tracing, truncate_string, user_error};
use auditvault_core::constants::{verification_link, WALLET_INSTALL_URL};
use auditvault_core::models::{InspectionMeta, UploadedFile, UserRole};
use auditvault_core::{AppError, ClientConfig};
use auditvault_services::activity::{
    activity_category, format_relative, group_by_actor, truncate_address,
};
use auditvault_services::inspections::record_from_submission;
use auditvault_services::{
    export, AccountProvider, AppContext, ExportFormat, ForgeryWarning, LoadingGuard,
    SubmissionWorkflow, WorkflowState,
};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "auditvault", about = "AuditVault inspection client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with a demo account
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        /// inspector, manager, auditor or regulator
        #[arg(long, default_value = "inspector")]
        role: UserRole,
    },
    /// Clear the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Connect the configured wallet account to the session
    ConnectWallet,
    /// Run forgery analysis on a file without submitting it
    Analyze {
        file: PathBuf,
    },
    /// Analyze, upload, sign and submit an inspection document
    Inspect {
        file: PathBuf,
        /// Continue without asking when forgery is detected
        #[arg(long)]
        yes: bool,
        #[arg(long)]
        site_id: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Signature over the payload, if signed elsewhere
        #[arg(long)]
        signature: Option<String>,
    },
    /// Submit a payload signed in an earlier run
    ResumeSubmit {
        #[arg(long)]
        signature: Option<String>,
    },
    /// Discard a signed payload left by an earlier run
    Abandon,
    /// Issue a certificate for a file
    IssueCertificate {
        file: PathBuf,
    },
    /// Revoke a certificate by hash
    RevokeCertificate {
        cert_hash: String,
    },
    /// Recent ledger activity grouped by actor
    Activity {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        json: bool,
    },
    /// Upload history of this client
    History,
    /// Inspections visible to the logged-in role
    Inspections,
    /// Manager: approve a pending inspection
    Approve {
        id: String,
    },
    /// Manager: reject a pending inspection; auditor: reject an approved one
    Reject {
        id: String,
    },
    /// Auditor: final approval of a manager-approved inspection
    FinalApprove {
        id: String,
    },
    /// Export all inspections
    Export {
        /// csv or report
        #[arg(long, default_value = "csv")]
        format: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Compliance summary over all inspections
    Summary,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn busy(ctx: &AppContext, lines: &[&str]) -> LoadingGuard {
    let guard = ctx
        .loading
        .start(Some(lines.iter().map(|l| l.to_string()).collect()));
    for line in &ctx.loading.current().lines {
        eprintln!("{}", line);
    }
    guard
}

fn print_notifications(ctx: &AppContext) {
    for n in ctx.notifications.list() {
        match &n.action_url {
            Some(url) => println!("[{:?}] {}: {} ({})", n.kind, n.title, n.message, url),
            None => println!("[{:?}] {}: {}", n.kind, n.title, n.message),
        }
    }
}

fn confirm_forgery(assume_yes: bool) -> impl Fn(&ForgeryWarning) -> bool {
    move |warning: &ForgeryWarning| {
        if assume_yes {
            eprintln!("{}", warning.message());
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt(warning.message())
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

fn require_role(ctx: &AppContext, roles: &[UserRole]) -> anyhow::Result<UserRole> {
    let user = ctx
        .auth
        .user()
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `auditvault login` first"))?;
    if !roles.contains(&user.role) {
        anyhow::bail!("This command is not available to the {} role", user.role);
    }
    Ok(user.role)
}

/// Sign and submit from `ReadyToSign` or `ReadyToSubmit`, recording the result.
async fn finish_submission(
    ctx: &AppContext,
    workflow: &mut SubmissionWorkflow,
    signature: Option<String>,
) -> anyhow::Result<()> {
    if workflow.state() == WorkflowState::ReadyToSign {
        let _loading = busy(ctx, &["> REQUESTING SIGNATURE PAYLOAD..."]);
        let payload = workflow.sign().await.map_err(user_error)?;
        println!(
            "Payload ready: contract {} on chain {}, nonce {}",
            payload.contract_address, payload.chain_id, payload.nonce
        );
    }

    let record = {
        let _loading = busy(ctx, &["> SUBMITTING INSPECTION TO LEDGER..."]);
        workflow.submit(signature).await.map_err(user_error)?
    };

    ctx.history.record_submission(&record).map_err(user_error)?;
    let user = ctx.auth.user();
    let inspector_name = user.as_ref().map(|u| u.name.clone()).unwrap_or_default();
    let inspection = record_from_submission(&record, &record.payload.inspector, &inspector_name);
    ctx.inspections.add(inspection).map_err(user_error)?;

    println!("Inspection submitted: {}", record.content.ipfs_cid);
    if let Some(tx) = record.receipt.tx_hash.as_deref() {
        println!("Transaction: {}", verification_link(tx));
    }
    Ok(())
}

async fn run(ctx: &AppContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login {
            email,
            password,
            role,
        } => {
            let password = match password {
                Some(p) => p,
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .interact()
                    .context("Read password")?,
            };
            let user = ctx.auth.login(&email, &password, role).map_err(user_error)?;
            println!("Logged in as {} ({}, {})", user.name, user.role, user.organization);
        }
        Commands::Logout => {
            ctx.auth.logout().map_err(user_error)?;
            ctx.wallet.disconnect();
            println!("Logged out");
        }
        Commands::Whoami => match ctx.auth.user() {
            Some(user) => print_json(&user)?,
            None => println!("Not logged in"),
        },
        Commands::ConnectWallet => match ctx.wallet.connect().await {
            Ok(account) => {
                ctx.auth.connect_wallet(&account).map_err(user_error)?;
                println!("Wallet connected: {}", truncate_address(&account, 6, 4));
            }
            Err(AppError::WalletNotInstalled) => {
                println!("No wallet detected. Install MetaMask: {}", WALLET_INSTALL_URL);
            }
            Err(e) => return Err(user_error(e)),
        },
        Commands::Analyze { file } => {
            let file = UploadedFile::from_path(&file).map_err(user_error)?;
            let _loading = busy(ctx, &["> RUNNING FORGERY ANALYSIS..."]);
            let response = ctx.analysis.analyze(&file).await.map_err(|e| {
                user_error(AppError::Analysis(e))
            })?;
            print_json(&response.results)?;
            let summary = response.effective_summary();
            println!(
                "Summary: {} real, {} fake, {} total",
                summary.real, summary.fake, summary.total
            );
        }
        Commands::Inspect {
            file,
            yes,
            site_id,
            location,
            signature,
        } => {
            let mut workflow = ctx.workflow().map_err(user_error)?;
            if workflow.state() == WorkflowState::ReadyToSubmit {
                anyhow::bail!(
                    "A signed payload for {} is waiting. Run `resume-submit` or `abandon` first",
                    workflow.file_name().unwrap_or("an earlier file")
                );
            }

            let upload = UploadedFile::from_path(&file).map_err(user_error)?;
            workflow
                .select_file(upload, InspectionMeta { site_id, location })
                .map_err(user_error)?;

            let summary = {
                let _loading = busy(ctx, &["> RUNNING FORGERY ANALYSIS..."]);
                workflow.analyze().await.map_err(user_error)?
            };
            println!(
                "Analysis: {} real, {} fake, {} total",
                summary.real, summary.fake, summary.total
            );

            let content = {
                let prompt = confirm_forgery(yes);
                let _loading = busy(ctx, &["> UPLOADING TO IPFS..."]);
                workflow.begin_upload(&prompt).await.map_err(user_error)?
            };
            println!("Stored as {} ({})", content.ipfs_cid, content.content_hash);

            finish_submission(ctx, &mut workflow, signature).await?;
        }
        Commands::ResumeSubmit { signature } => {
            let mut workflow = ctx.workflow().map_err(user_error)?;
            if !workflow.can_submit() {
                anyhow::bail!("Nothing to resume: no signed payload is cached");
            }
            finish_submission(ctx, &mut workflow, signature).await?;
        }
        Commands::Abandon => {
            let mut workflow = ctx.workflow().map_err(user_error)?;
            workflow.abandon().map_err(user_error)?;
            println!("Cached submission discarded");
        }
        Commands::IssueCertificate { file } => {
            let file = UploadedFile::from_path(&file).map_err(user_error)?;
            let _loading = busy(ctx, &["> ISSUING CERTIFICATE..."]);
            let response = ctx
                .ledger
                .issue_certificate(&file)
                .await
                .map_err(|e| user_error(AppError::Certificate(e)))?;
            print_json(&response)?;
            println!("Verify: {}", verification_link(&response.data.tx_hash));
        }
        Commands::RevokeCertificate { cert_hash } => {
            let _loading = busy(ctx, &["> REVOKING CERTIFICATE..."]);
            let response = ctx
                .ledger
                .revoke_certificate(&cert_hash)
                .await
                .map_err(|e| user_error(AppError::Certificate(e)))?;
            println!("Revoked. Transaction: {}", verification_link(&response.tx));
        }
        Commands::Activity {
            limit,
            search,
            json,
        } => {
            let limit = limit.unwrap_or(ctx.config.activity_limit);
            let response = {
                let _loading = busy(ctx, &["> FETCHING RECENT ACTIVITY..."]);
                ctx.ledger
                    .fetch_recent_activity(limit)
                    .await
                    .map_err(|e| user_error(AppError::Activity(e)))?
            };
            let rows = group_by_actor(&response.items, &search);
            if json {
                print_json(&rows)?;
                return Ok(());
            }

            let now = chrono::Utc::now().timestamp();
            println!(
                "{:<15} {:>7} {:<12} {:<24} {:>10}  LATEST TX",
                "ACTOR", "ACTIONS", "CATEGORY", "LATEST", "VOLUME"
            );
            for row in &rows {
                let latest_type = row.latest_type.as_deref().unwrap_or("-");
                println!(
                    "{:<15} {:>7} {:<12} {:<24} {:>10.2}  {}",
                    truncate_address(&row.actor, 6, 4),
                    row.action_count(),
                    activity_category(latest_type),
                    truncate_string(
                        &format!("{} {}", latest_type, format_relative(row.latest_timestamp, now)),
                        24
                    ),
                    row.total_volume,
                    row.latest_tx
                        .as_deref()
                        .map(|tx| truncate_address(tx, 10, 8))
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            println!("{} actors, {} items", rows.len(), response.items.len());
        }
        Commands::History => {
            let entries = ctx.history.entries().map_err(user_error)?;
            if entries.is_empty() {
                println!("No uploads yet");
            }
            for entry in entries.iter().rev() {
                println!(
                    "{}  {:<30} {:<9} {}{}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    truncate_string(&entry.document_name, 30),
                    entry.status.display_name(),
                    entry.ipfs_cid,
                    if entry.status.certificate_available() {
                        "  [certificate available]"
                    } else {
                        ""
                    }
                );
            }
        }
        Commands::Inspections => {
            let user = ctx
                .auth
                .user()
                .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `auditvault login` first"))?;
            let address = ctx.wallet.account().unwrap_or(user.wallet_address);
            let records = ctx.inspections.by_role(user.role, Some(address.as_str()));
            for r in &records {
                println!(
                    "{:<38} {:<12} {:<28} {:>4.1}  {}",
                    r.id,
                    r.site_id,
                    truncate_string(&r.location, 28),
                    r.compliance_score,
                    r.status
                );
            }
            println!("{} inspections", records.len());
        }
        Commands::Approve { id } => {
            require_role(ctx, &[UserRole::Manager])?;
            let record = ctx
                .manager_dashboard()
                .approve(&id)
                .await
                .map_err(user_error)?;
            println!("{} is now {}", record.site_id, record.status);
            print_notifications(ctx);
        }
        Commands::Reject { id } => {
            let record = match require_role(ctx, &[UserRole::Manager, UserRole::Auditor])? {
                UserRole::Manager => ctx.manager_dashboard().reject(&id).await,
                _ => ctx.auditor_dashboard().reject(&id),
            }
            .map_err(user_error)?;
            println!("{} is now {}", record.site_id, record.status);
            print_notifications(ctx);
        }
        Commands::FinalApprove { id } => {
            require_role(ctx, &[UserRole::Auditor])?;
            let record = ctx
                .auditor_dashboard()
                .final_approve(&id)
                .await
                .map_err(user_error)?;
            println!("{} is now {}", record.site_id, record.status);
            print_notifications(ctx);
        }
        Commands::Export { format, out } => {
            let format: ExportFormat = format.parse().map_err(user_error)?;
            let records = ctx.regulator_dashboard().records();
            export::write_export(&out, format, &records).map_err(user_error)?;
            println!("Exported {} records to {}", records.len(), out.display());
        }
        Commands::Summary => {
            print_json(&ctx.regulator_dashboard().summary())?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let (analysis, ledger) =
        clients_from_config(&config).context("Failed to create service clients")?;
    let provider = TerminalProvider::from_env().map(|p| Arc::new(p) as Arc<dyn AccountProvider>);

    let ctx = AppContext::open(config, Arc::new(analysis), Arc::new(ledger), provider)
        .map_err(user_error)?;
    let _events = ctx.wallet.spawn_event_listener();
    ctx.wallet.check_connection().await;

    let cli = Cli::parse();
    run(&ctx, cli.command).await
}
