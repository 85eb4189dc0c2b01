//! Report tables for the startup merge and the shutdown pass.

use colored::Colorize;
use tabled::{builder::Builder, settings::Style, Table};

use fikasync_sync::{
    StartupAction, StartupReport, StartupStatus, ShutdownReport, UploadReason, UploadResult,
};

use crate::locale::{Messages, Msg};

/// Rounded table with a localized header row.
pub fn table<I, R>(header: [&str; 3], rows: I) -> Table
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut builder = Builder::default();
    builder.push_record(header.map(str::to_string));
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

pub fn startup_table(report: &StartupReport, msgs: &Messages) -> Table {
    let rows = report.rows.iter().map(|row| {
        [
            row.file.to_string(),
            status_label(row.status, msgs).to_string(),
            action_label(&row.action, msgs),
        ]
    });
    table(
        [
            msgs.text(Msg::TableFile),
            msgs.text(Msg::TableStatus),
            msgs.text(Msg::TableAction),
        ],
        rows,
    )
}

pub fn print_startup(report: &StartupReport, msgs: &Messages) {
    let remote_count = report
        .rows
        .iter()
        .filter(|row| row.status != StartupStatus::NewLocal)
        .count();
    if remote_count == 0 {
        println!("{}", msgs.text(Msg::SyncNoProfiles).yellow());
    } else {
        println!("{}", msgs.fill(Msg::SyncFound, &[&remote_count]).bold());
    }

    if !report.rows.is_empty() {
        println!();
        println!("{}", startup_table(report, msgs));
        println!();
    }
    if report.updated > 0 {
        println!("{}", msgs.fill(Msg::SyncUpdatedCount, &[&report.updated]).green());
    }
}

pub fn status_label(status: StartupStatus, msgs: &Messages) -> &'static str {
    msgs.text(match status {
        StartupStatus::Synced => Msg::StatusSynced,
        StartupStatus::LocalNewer => Msg::StatusLocalNewer,
        StartupStatus::Update => Msg::StatusUpdate,
        StartupStatus::NewLocal => Msg::StatusNewLocal,
    })
}

pub fn action_label(action: &StartupAction, msgs: &Messages) -> String {
    match action {
        StartupAction::None => msgs.text(Msg::ActionPass).to_string(),
        StartupAction::WillUpload => msgs.text(Msg::ActionWillUpload).to_string(),
        StartupAction::Downloaded => msgs.text(Msg::ActionDownloaded).to_string(),
        StartupAction::Failed(reason) => msgs.fill(Msg::ResultError, &[reason]),
    }
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

pub fn shutdown_table(report: &ShutdownReport, msgs: &Messages) -> Table {
    let rows = report.rows.iter().map(|row| {
        [
            row.file.to_string(),
            reason_label(row.reason, msgs).to_string(),
            result_label(&row.result, msgs),
        ]
    });
    table(
        [
            msgs.text(Msg::SyncProfileTitle),
            msgs.text(Msg::SyncReasonTitle),
            msgs.text(Msg::SyncResultTitle),
        ],
        rows,
    )
}

pub fn print_shutdown(report: &ShutdownReport, msgs: &Messages) {
    println!();
    println!("{}", msgs.text(Msg::SyncTitle).yellow().bold());
    if report.rows.is_empty() && report.unchanged == 0 {
        println!("{}", msgs.text(Msg::SyncNoLocal).bright_black());
        return;
    }
    if report.is_quiet() {
        println!("{}", msgs.text(Msg::SyncAllDone).bright_black());
        return;
    }

    println!("{}", shutdown_table(report, msgs));
    let count = msgs.fill(Msg::SyncUploadedCount, &[&report.uploaded]);
    if report.failures() > 0 || report.conflicts() > 0 {
        println!("{}", count.yellow());
    } else {
        println!("{}", count.green());
    }
}

pub fn reason_label(reason: UploadReason, msgs: &Messages) -> &'static str {
    msgs.text(match reason {
        UploadReason::NewProgress => Msg::ReasonNewProgress,
        UploadReason::PendingSync => Msg::ReasonPending,
        UploadReason::Conflict => Msg::ResultConflict,
    })
}

pub fn result_label(result: &UploadResult, msgs: &Messages) -> String {
    match result {
        UploadResult::Sent => msgs.text(Msg::ResultSent).to_string(),
        UploadResult::Failed(reason) => msgs.fill(Msg::ResultError, &[reason]),
        UploadResult::RemoteNewer { .. } => msgs.text(Msg::ResultRemoteNewer).to_string(),
    }
}
