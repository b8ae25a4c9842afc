//! Command Line Interface for crowdfunding campaigns.
mod output;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use crowdfund_domain::{
    AccountId, Amount, CampaignId, CampaignType, Category, Clock, ManualClock, NewCampaign,
    SystemClock,
};
use crowdfund_execution::prelude::*;
use crowdfund_protocols::prelude::*;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "crowdfund-cli")]
#[command(about = "Browse, fund and manage on-chain crowdfunding campaigns", long_about = None)]
struct Cli {
    /// JSON-RPC gateway URL (falls back to CROWDFUND_RPC_URL)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Account to act as (falls back to CROWDFUND_ACCOUNT)
    #[arg(long, global = true)]
    account: Option<String>,

    /// Fetch campaign details one at a time instead of concurrently
    #[arg(long, global = true)]
    sequential: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all campaigns
    List,
    /// Show one campaign with its donors and feedback
    Show {
        /// Campaign id
        id: u64,
    },
    /// Donate to a campaign
    Donate {
        /// Campaign id
        id: u64,

        /// Amount in ETH (e.g., 0.5)
        amount: String,
    },
    /// Withdraw collected funds from a campaign you own
    Withdraw {
        /// Campaign id
        id: u64,
    },
    /// Create a new campaign
    Create {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Target in ETH
        #[arg(long)]
        target: String,

        /// Days until the deadline
        #[arg(long, default_value_t = 30)]
        days: u64,

        /// Technology, Arts, Health, Education, Environment, Community, Business or Other
        #[arg(long, default_value = "Other")]
        category: String,

        /// Reward, Donation or Lending
        #[arg(long = "type", default_value = "Donation")]
        campaign_type: String,

        /// Share of each donation paid back as reward
        #[arg(long, default_value_t = 0)]
        reward_percentage: u8,
    },
    /// Read or post campaign feedback
    Feedback {
        /// Campaign id
        id: u64,

        /// Message to post; omit to read the thread
        message: Option<String>,
    },
    /// Pay the reward owed to a donor
    PayReward {
        /// Campaign id
        id: u64,

        /// Donor address
        donor: String,
    },
    /// Repay a donor's loan
    RepayLoan {
        /// Campaign id
        id: u64,

        /// Donor address
        donor: String,
    },
    /// Show your campaigns and donations
    Dashboard,
    /// Keep refreshing campaigns in the background
    Watch {
        /// Seconds between refreshes
        #[arg(short, long, default_value_t = 30)]
        interval: u64,
    },
    /// Run a scripted walkthrough against an in-memory ledger
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Commands::Demo = cli.command {
        return run_demo().await;
    }

    let interval = match cli.command {
        Commands::Watch { interval } => interval,
        _ => SynchronizerConfig::default().refresh_interval_secs,
    };
    let sync = connect(&cli, interval)?;
    let now = sync.now();

    match cli.command {
        Commands::List => {
            let campaigns = sync.refresh_all().await?;
            output::print_campaigns(&campaigns, now);
        }
        Commands::Show { id } => {
            let id = CampaignId(id);
            let campaign = sync.refresh_one(id).await?;
            let donations = sync.refresh_donations(id).await?;
            let feedback = sync.refresh_feedback(id).await?;
            output::print_campaign(&campaign, &sync.viewer(), now, &donations, &feedback);
        }
        Commands::Donate { id, amount } => {
            let amount = parse_ether(&amount)?;
            println!("💸 Donating {} ETH to #{}...", amount.format_ether(), id);
            let outcome = sync.submit_donation(CampaignId(id), amount).await?;
            output::print_outcome("Donation", &outcome, now);
        }
        Commands::Withdraw { id } => {
            println!("🏦 Withdrawing funds from #{}...", id);
            let outcome = sync.submit_withdrawal(CampaignId(id)).await?;
            output::print_outcome("Withdrawal", &outcome, now);
        }
        Commands::Create {
            title,
            description,
            target,
            days,
            category,
            campaign_type,
            reward_percentage,
        } => {
            let params = NewCampaign {
                title,
                description,
                target: parse_ether(&target)?,
                deadline: now + days * 86_400,
                category: category.parse::<Category>()?,
                campaign_type: campaign_type.parse::<CampaignType>()?,
                reward_percentage,
            };
            println!("🚀 Creating campaign '{}'...", params.title);
            let outcome = sync.create_campaign(params).await?;
            output::print_outcome("Campaign creation", &outcome, now);
        }
        Commands::Feedback { id, message } => {
            let id = CampaignId(id);
            if let Some(message) = message {
                let outcome = sync.add_feedback(id, message).await?;
                output::print_outcome("Feedback", &outcome, now);
            }
            let feedback = sync.refresh_feedback(id).await?;
            if feedback.is_empty() {
                println!("No feedback yet.");
            }
            output::print_feedback(&feedback);
        }
        Commands::PayReward { id, donor } => {
            let outcome = sync.pay_reward(CampaignId(id), &AccountId::new(donor)).await?;
            output::print_outcome("Reward payment", &outcome, now);
        }
        Commands::RepayLoan { id, donor } => {
            let outcome = sync.repay_loan(CampaignId(id), &AccountId::new(donor)).await?;
            output::print_outcome("Loan repayment", &outcome, now);
        }
        Commands::Dashboard => {
            let dashboard = sync.dashboard(&sync.viewer()).await?;
            output::print_dashboard(&dashboard);
        }
        Commands::Watch { .. } => {
            tokio::select! {
                _ = sync.start() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down refresh loop");
                }
            }
            let stale = sync.stale_campaigns().await;
            if !stale.is_empty() {
                println!("⚠️  {} campaign(s) were behind at shutdown", stale.len());
            }
        }
        Commands::Demo => run_demo().await?,
    }

    Ok(())
}

fn parse_ether(value: &str) -> Result<Amount> {
    Amount::parse_ether(value).with_context(|| format!("invalid ETH amount '{value}'"))
}

fn setting(flag: &Option<String>, var: &str) -> Result<String> {
    match flag {
        Some(value) => Ok(value.clone()),
        None => env::var(var).with_context(|| format!("{var} must be set in .env or environment")),
    }
}

fn connect(cli: &Cli, refresh_interval_secs: u64) -> Result<ViewStateSynchronizer> {
    let url = setting(&cli.rpc_url, "CROWDFUND_RPC_URL")?;
    let account = AccountId::new(setting(&cli.account, "CROWDFUND_ACCOUNT")?);
    if account.as_str().is_empty() {
        bail!("account must not be empty");
    }

    info!(url = %url, account = %account, "Connecting to gateway");
    let store = Arc::new(JsonRpcStore::new(RpcConfig::new(url, account)));
    let config = SynchronizerConfig {
        concurrent_refresh: !cli.sequential,
        refresh_interval_secs,
        ..Default::default()
    };

    Ok(ViewStateSynchronizer::new(
        store.clone(),
        store,
        Arc::new(SystemClock),
        config,
    ))
}

async fn run_demo() -> Result<()> {
    let clock = ManualClock::new(SystemClock.now());
    let alice = AccountId::new("0x00000000000000000000000000000000000a11ce");
    let bob = AccountId::new("0x0000000000000000000000000000000000000b0b");
    let ledger = InMemoryLedger::new(Arc::new(clock.clone()), alice.clone());

    let as_account = |account: &AccountId| {
        let signer = ledger.as_signer(account.clone());
        ViewStateSynchronizer::new(
            Arc::new(signer.clone()),
            Arc::new(signer),
            Arc::new(clock.clone()),
            SynchronizerConfig::default(),
        )
    };
    let owner = as_account(&alice);
    let donor = as_account(&bob);

    println!("🚀 Alice creates a 1 ETH campaign ending in one hour");
    let created = owner
        .create_campaign(NewCampaign {
            title: "Community garden".into(),
            description: "Raised beds and a tool shed".into(),
            target: parse_ether("1")?,
            deadline: clock.now() + 3_600,
            category: Category::Community,
            campaign_type: CampaignType::Donation,
            reward_percentage: 0,
        })
        .await?;
    output::print_outcome("Campaign creation", &created, clock.now());
    let id = created
        .receipt
        .created_campaign
        .context("ledger did not report the new campaign")?;

    for amount in ["0.5", "0.5"] {
        println!("\n💸 Bob donates {amount} ETH");
        let outcome = donor.submit_donation(id, parse_ether(amount)?).await?;
        output::print_outcome("Donation", &outcome, clock.now());
    }

    println!("\n📋 Campaigns as seen by Bob");
    output::print_campaigns(&donor.refresh_all().await?, clock.now());

    println!("\n🚫 Bob tries to withdraw");
    match donor.submit_withdrawal(id).await {
        Ok(_) => bail!("withdrawal by a non-owner was accepted"),
        Err(e) => println!("   refused: {e}"),
    }

    println!("\n🏦 Alice withdraws before the deadline since the target is met");
    let outcome = owner.submit_withdrawal(id).await?;
    output::print_outcome("Withdrawal", &outcome, clock.now());

    clock.advance(7_200);
    println!("\n⏰ Two hours later");
    let campaign = owner.refresh_one(id).await?;
    let donations = owner.refresh_donations(id).await?;
    let feedback = owner.refresh_feedback(id).await?;
    output::print_campaign(&campaign, &alice, clock.now(), &donations, &feedback);

    println!();
    output::print_dashboard(&owner.dashboard(&alice).await?);
    Ok(())
}
