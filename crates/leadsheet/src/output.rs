use std::collections::BTreeMap;
use std::fmt::Write as _;

use leadsheet_core::config::CredentialBundle;
use leadsheet_core::lead::Lead;

const HEADERS: [&str; 8] = [
    "TRIP ID",
    "DATE",
    "STATUS",
    "TRAVELLER",
    "CONSULTANT",
    "TRAVEL DATE",
    "DESTINATION",
    "PAX",
];

fn table_row(lead: &Lead) -> [String; 8] {
    [
        lead.trip_id.clone(),
        lead.date.clone(),
        lead.status
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_default(),
        lead.traveller_name.clone(),
        lead.consultant.clone(),
        lead.travel_date.clone(),
        lead.travel_state.clone(),
        lead.pax.map(|n| n.to_string()).unwrap_or_default(),
    ]
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Render leads as a plain text table, one line per lead.
pub fn lead_table(leads: &[Lead]) -> String {
    let rows: Vec<_> = leads.iter().map(table_row).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, HEADERS.iter().copied(), &widths);
    for row in &rows {
        push_line(&mut out, row.iter().map(|s| s.as_str()), &widths);
    }
    out
}

/// One line summary of a refresh, e.g. `3 leads (Hot Leads: 1, Unfollowed: 2)`.
pub fn refresh_summary(leads: &[Lead]) -> String {
    let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
    for lead in leads {
        let label = lead.status.as_ref().map(|s| s.label()).unwrap_or("No status");
        *by_status.entry(label).or_default() += 1;
    }

    let mut out = format!(
        "{} lead{}",
        leads.len(),
        if leads.len() == 1 { "" } else { "s" }
    );
    if !by_status.is_empty() {
        let parts: Vec<_> = by_status
            .iter()
            .map(|(label, count)| format!("{label}: {count}"))
            .collect();
        let _ = write!(out, " ({})", parts.join(", "));
    }
    out
}

/// How to get write access back after a protected range rejection.
pub fn protected_hint(bundle: &CredentialBundle) -> String {
    match &bundle.service_account {
        Some(key) => format!(
            "The worksheet or range is protected. Add {} as an editor of the protected range, or remove the protection.",
            key.client_email
        ),
        None => "The worksheet or range is protected. Add the service account as an editor of the protected range, or remove the protection.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use leadsheet_core::lead::LeadStatus;
    use pretty_assertions::assert_eq;

    use super::*;

    fn lead(trip_id: &str, status: Option<LeadStatus>, traveller: &str) -> Lead {
        Lead {
            trip_id: trip_id.to_string(),
            status,
            traveller_name: traveller.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn table_aligned() {
        let leads = vec![
            lead("T1", Some(LeadStatus::HotLeads), "Mehta"),
            lead("T200", None, "Ravi Kumar"),
        ];
        let expected = "\
TRIP ID  DATE  STATUS     TRAVELLER   CONSULTANT  TRAVEL DATE  DESTINATION  PAX
T1             Hot Leads  Mehta
T200                      Ravi Kumar
";
        assert_eq!(expected, lead_table(&leads));
    }

    #[test]
    fn summary_counts_statuses() {
        let leads = vec![
            lead("T1", Some(LeadStatus::Unfollowed), ""),
            lead("T2", Some(LeadStatus::HotLeads), ""),
            lead("T3", Some(LeadStatus::Unfollowed), ""),
            lead("T4", None, ""),
        ];
        assert_eq!(
            "4 leads (Hot Leads: 1, No status: 1, Unfollowed: 2)",
            refresh_summary(&leads)
        );
        assert_eq!("0 leads", refresh_summary(&[]));
        assert_eq!(
            "1 lead (Unfollowed: 1)",
            refresh_summary(&leads[..1])
        );
    }
}
