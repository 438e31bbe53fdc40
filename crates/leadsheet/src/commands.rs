use std::sync::Arc;
use std::time::Duration;

use leadsheet_core::lead::{LeadPatch, LeadStatus};
use leadsheet_error::Result;
use leadsheet_http::{HttpClient, LeadSheetClient, RefreshEvent, UpdateOutcome, spawn_silent_refresh};
use tracing::info;

use crate::output;

pub async fn list<C: HttpClient>(
    client: &LeadSheetClient<C>,
    status: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut leads = client.fetch_all().await?;
    if let Some(status) = status {
        leads.retain(|lead| lead.status.as_ref().is_some_and(|s| s.label() == status));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&leads)?);
    } else {
        print!("{}", output::lead_table(&leads));
    }
    Ok(())
}

/// New leads are dated today and start out unfollowed unless told otherwise.
fn with_new_lead_defaults(mut lead: LeadPatch) -> LeadPatch {
    if lead.date.is_none() {
        lead.date = Some(chrono::Local::now().format("%Y-%m-%d").to_string());
    }
    if lead.status.is_none() {
        lead.status = Some(LeadStatus::Unfollowed);
    }
    lead
}

pub async fn add<C: HttpClient>(client: &LeadSheetClient<C>, lead: LeadPatch) -> Result<()> {
    let outcome = client.append(&with_new_lead_defaults(lead)).await?;
    match outcome.updated_range {
        Some(range) => println!("Added {} ({range})", outcome.trip_id),
        None => println!("Added {}", outcome.trip_id),
    }
    Ok(())
}

pub async fn update<C: HttpClient>(
    client: &LeadSheetClient<C>,
    trip_id: &str,
    updates: &LeadPatch,
) -> Result<()> {
    match client.update(trip_id, updates).await? {
        UpdateOutcome::Updated { row, ranges } => {
            println!("Updated {trip_id} in row {row}: {}", ranges.join(", "));
        }
        UpdateOutcome::NoOp => println!("Nothing to update for {trip_id}"),
    }
    Ok(())
}

pub async fn locate<C: HttpClient>(client: &LeadSheetClient<C>, trip_id: &str) -> Result<()> {
    let row = client.locate_row(trip_id).await?;
    println!("{row}");
    Ok(())
}

/// Refresh until interrupted. Failed refreshes only go to stderr.
pub async fn watch<C: HttpClient>(client: Arc<LeadSheetClient<C>>, interval: Duration) -> Result<()> {
    let (handle, mut events) = spawn_silent_refresh(client, interval);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(RefreshEvent::Leads(leads)) => {
                    let now = chrono::Local::now().format("%H:%M:%S");
                    println!("{now} {}", output::refresh_summary(&leads));
                }
                Some(RefreshEvent::Failed(msg)) => eprintln!("refresh failed, retrying: {msg}"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    handle.stop();
    Ok(())
}
