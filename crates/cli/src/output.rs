//! Terminal rendering of campaigns and dashboards.

use crowdfund_domain::{
    AccountId, Campaign, Donation, Feedback, Percentage, can_donate, can_withdraw,
};
use crowdfund_execution::prelude::*;
use prettytable::{Table, row};

const BAR_WIDTH: usize = 20;

pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| chrono::DateTime::from_timestamp(s, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn progress_bar(progress: Percentage) -> String {
    let filled = (progress.to_bps() as usize * BAR_WIDTH) / 10_000;
    format!(
        "[{}{}] {:.1}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress.0
    )
}

fn countdown(campaign: &Campaign, now: u64) -> String {
    campaign
        .time_remaining(now)
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".into())
}

pub fn print_campaigns(campaigns: &[Campaign], now: u64) {
    if campaigns.is_empty() {
        println!("No campaigns found.");
        return;
    }

    let mut table = Table::new();
    table.set_titles(row![
        "ID", "Title", "Category", "Type", "Raised (ETH)", "Target (ETH)", "Progress", "Status",
        "Ends in"
    ]);
    for c in campaigns {
        table.add_row(row![
            c.id,
            c.title,
            c.category,
            c.campaign_type,
            c.amount_collected.format_ether(),
            c.target.format_ether(),
            progress_bar(c.progress()),
            c.status(now),
            countdown(c, now)
        ]);
    }
    table.printstd();
}

pub fn print_campaign(
    campaign: &Campaign,
    viewer: &AccountId,
    now: u64,
    donations: &[Donation],
    feedback: &[Feedback],
) {
    println!("{} {}", campaign.id, campaign.title);
    println!("{}", campaign.description);
    println!();
    println!("Owner:      {}", campaign.owner);
    println!("Category:   {}", campaign.category);
    println!("Type:       {}", campaign.campaign_type);
    if campaign.reward_percentage > 0 {
        println!("Reward:     {}%", campaign.reward_percentage);
    }
    println!(
        "Raised:     {} / {} ETH",
        campaign.amount_collected.format_ether(),
        campaign.target.format_ether()
    );
    println!("Progress:   {}", progress_bar(campaign.progress()));
    println!("Deadline:   {}", format_timestamp(campaign.deadline));
    println!("Ends in:    {}", countdown(campaign, now));
    println!("Status:     {}", campaign.status(now));
    println!(
        "You can:    donate={} withdraw={}",
        can_donate(campaign, now),
        can_withdraw(campaign, viewer, now)
    );

    if !donations.is_empty() {
        println!();
        let mut table = Table::new();
        table.set_titles(row!["Donor", "Amount (ETH)"]);
        for d in donations {
            table.add_row(row![d.donor, d.amount.format_ether()]);
        }
        table.printstd();
    }

    print_feedback(feedback);
}

pub fn print_feedback(feedback: &[Feedback]) {
    if feedback.is_empty() {
        return;
    }
    println!();
    let mut table = Table::new();
    table.set_titles(row!["When", "From", "Message"]);
    for f in feedback {
        table.add_row(row![format_timestamp(f.timestamp), f.user, f.message]);
    }
    table.printstd();
}

pub fn print_outcome(label: &str, outcome: &MutationOutcome, now: u64) {
    println!("✅ {} confirmed in tx {}", label, outcome.receipt.tx_hash);
    if let Some(block) = outcome.receipt.block_number {
        println!("   block {block}");
    }
    match &outcome.campaign {
        Some(c) => println!(
            "   {} now {} with {} / {} ETH",
            c.id,
            c.status(now),
            c.amount_collected.format_ether(),
            c.target.format_ether()
        ),
        None => println!("   campaign view could not be refreshed; run `show` to retry"),
    }
}

pub fn print_dashboard(dashboard: &Dashboard) {
    println!("Dashboard for {}", dashboard.viewer);
    println!("Generated {}", format_timestamp(dashboard.generated_at));

    if dashboard.is_empty() {
        println!("Nothing here yet.");
        return;
    }

    if !dashboard.owned.is_empty() {
        println!();
        println!(
            "Your campaigns (raised {} ETH):",
            dashboard.total_raised().format_ether()
        );
        let mut table = Table::new();
        table.set_titles(row!["ID", "Title", "Raised (ETH)", "Donors", "Status", "Withdrawable"]);
        for o in &dashboard.owned {
            table.add_row(row![
                o.campaign.id,
                o.campaign.title,
                o.campaign.amount_collected.format_ether(),
                o.donations.len(),
                o.status,
                if o.can_withdraw { "yes" } else { "no" }
            ]);
        }
        table.printstd();
    }

    if !dashboard.contributions.is_empty() {
        println!();
        println!(
            "Your donations (total {} ETH):",
            dashboard.total_contributed().format_ether()
        );
        let mut table = Table::new();
        table.set_titles(row!["ID", "Title", "Donated (ETH)", "Status"]);
        for c in &dashboard.contributions {
            table.add_row(row![
                c.campaign.id,
                c.campaign.title,
                c.amount.format_ether(),
                c.status
            ]);
        }
        table.printstd();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdfund_domain::Amount;

    #[test]
    fn test_progress_bar() {
        assert_eq!(
            progress_bar(Percentage::of_ratio(Amount::from(1u64), Amount::from(2u64))),
            "[##########----------] 50.0%"
        );
        assert_eq!(
            progress_bar(Percentage::of_ratio(Amount::from(3u64), Amount::from(2u64))),
            "[####################] 100.0%"
        );
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00 UTC");
    }
}
