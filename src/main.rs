use anyhow::{bail, Context};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::broadcast;

use gatepass::app_state::AppState;
use gatepass::config::Config;
use gatepass::gateway::{BucketKind, GatePassGateway, HttpGateway};
use gatepass::models::Stage;
use gatepass::realtime::{InProcessChannel, PollAdapter, RefreshBridge, RefreshFilter};
use gatepass::session::SessionStore;
use gatepass::workflow::{ApprovalDesk, ReturnRole, SubmissionForm};

const POLL_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    Config::init();

    std::fs::create_dir_all("logs").context("Failed to create logs directory")?;
    let file_appender = tracing_appender::rolling::daily("logs", "gatepass.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(non_blocking)
        .init();

    let config = Config::get();
    let store = SessionStore::new(&config.session_dir);
    let session = store
        .load()
        .context("No local session found; sign in through the portal first")?;
    if session.is_expired() {
        bail!("Stored auth token has expired; sign in again");
    }
    let stage = session
        .stage()
        .context("This account carries no approval role")?;

    let gateway: Arc<dyn GatePassGateway> =
        Arc::new(HttpGateway::new(&config, session.token.clone())?);
    let state = AppState::new(gateway, session);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("pending") => list_bucket(&state, stage, BucketKind::Pending).await,
        Some("approved") => list_bucket(&state, stage, BucketKind::Approved).await,
        Some("rejected") => list_bucket(&state, stage, BucketKind::Rejected).await,
        Some("approve") => {
            let reference = args.get(1).context("Usage: gatepass approve <ref> [comment]")?;
            approve(&state, stage, reference, args.get(2).cloned()).await
        }
        Some("reject") => {
            let reference = args.get(1).context("Usage: gatepass reject <ref> <comment>")?;
            let comment = args.get(2).context("Usage: gatepass reject <ref> <comment>")?;
            reject(&state, stage, reference, comment).await
        }
        Some("return") => {
            let reference = args.get(1).context("Usage: gatepass return <ref> <serial,serial...>")?;
            let serials = args
                .get(2)
                .context("Usage: gatepass return <ref> <serial,serial...>")?;
            mark_returned(&state, stage, reference, serials).await
        }
        Some("submit") => {
            let path = args.get(1).context("Usage: gatepass submit <form.json>")?;
            submit(&state, path).await
        }
        Some("watch") => watch(state, stage).await,
        _ => {
            eprintln!(
                "Usage: gatepass <pending|approved|rejected|approve|reject|return|submit|watch>"
            );
            Ok(())
        }
    }
}

async fn list_bucket(state: &AppState, stage: Stage, kind: BucketKind) -> anyhow::Result<()> {
    let mut desk = state.desk(stage);
    desk.load_more(kind).await?;
    let bucket = desk.bucket(kind);
    println!(
        "{} {} request(s) for the {}, showing {}",
        bucket.total,
        kind.as_str(),
        stage.label(),
        bucket.len()
    );
    for entry in &bucket.entries {
        let receiver = entry
            .receiver
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or("non-member");
        println!(
            "  {}  {}  {} -> {}",
            entry.listing.status.reference_no,
            entry.listing.status.created_at,
            entry.sender.name,
            receiver
        );
    }
    Ok(())
}

/// Page through the pending bucket until the reference shows up.
async fn locate_pending(desk: &mut ApprovalDesk, reference_no: &str) -> anyhow::Result<()> {
    desk.load_more(BucketKind::Pending).await?;
    while desk.pending.find(reference_no).is_none() && desk.pending.has_more {
        desk.load_more(BucketKind::Pending).await?;
    }
    Ok(())
}

fn print_report(report: &gatepass::workflow::ActionReport) {
    println!("{}", report.message);
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
}

async fn approve(
    state: &AppState,
    stage: Stage,
    reference_no: &str,
    comment: Option<String>,
) -> anyhow::Result<()> {
    let mut desk = state.desk(stage);
    locate_pending(&mut desk, reference_no).await?;
    let report = desk.approve(reference_no, comment, None).await?;
    print_report(&report);
    Ok(())
}

async fn reject(
    state: &AppState,
    stage: Stage,
    reference_no: &str,
    comment: &str,
) -> anyhow::Result<()> {
    let mut desk = state.desk(stage);
    locate_pending(&mut desk, reference_no).await?;
    let report = desk.reject(reference_no, comment).await?;
    print_report(&report);
    Ok(())
}

async fn mark_returned(
    state: &AppState,
    stage: Stage,
    reference_no: &str,
    serials: &str,
) -> anyhow::Result<()> {
    let role = match stage {
        Stage::Dispatch => ReturnRole::PetrolLeader,
        Stage::Executive => ReturnRole::ExecutiveOfficer,
        _ => bail!("The {} holds no return obligation", stage.label()),
    };
    let serial_numbers: Vec<String> = serials
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let desk = state.return_desk(role);
    let mut listing = state.gateway.fetch_status(reference_no).await?;
    // The console invocation itself is the confirmation prompt.
    let report = desk.mark_returned(&mut listing, &serial_numbers, true).await?;
    print_report(&report);
    Ok(())
}

async fn submit(state: &AppState, path: &str) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read form file {path}"))?;
    let form: SubmissionForm = serde_json::from_str(&raw)?;
    let created = form.submit(state.gateway.as_ref()).await?;
    println!(
        "Submitted request {} with {} item(s)",
        created.reference_no,
        created.items.len()
    );
    Ok(())
}

/// Keep the desk fresh from the event bridge until Ctrl+C.
async fn watch(state: AppState, stage: Stage) -> anyhow::Result<()> {
    let config = Config::get();
    let channel = Arc::new(InProcessChannel::new(64));
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let mut desk = state.desk(stage);
    desk.refresh().await?;
    println!(
        "{}: {} pending / {} approved / {} rejected",
        stage.label(),
        desk.pending.total,
        desk.approved.total,
        desk.rejected.total
    );

    let poller = PollAdapter::new(state.gateway.clone(), channel.clone(), stage, POLL_INTERVAL);
    let poll_task = tokio::spawn(poller.run(shutdown_tx.subscribe()));

    let bridge = RefreshBridge::new(channel.clone(), RefreshFilter::any(), config.debounce_window);
    let desk = Arc::new(tokio::sync::Mutex::new(desk));
    let bridge_desk = desk.clone();
    let bridge_task = tokio::spawn(bridge.run(
        state.session.profile.clone(),
        stage,
        move || {
            let desk = bridge_desk.clone();
            async move {
                let mut desk = desk.lock().await;
                desk.refresh().await?;
                tracing::info!(
                    pending = desk.pending.total,
                    approved = desk.approved.total,
                    rejected = desk.rejected.total,
                    "Buckets refreshed"
                );
                Ok(())
            }
        },
    ));

    signal::ctrl_c().await?;
    println!("Shutting down...");
    let _ = shutdown_tx.send(());
    bridge_task.abort();
    poll_task.await.ok();
    Ok(())
}
