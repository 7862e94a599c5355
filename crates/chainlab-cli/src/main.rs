use anyhow::Result;
use chainlab_core::{Chain, Transaction};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "chainlab")]
#[command(about = "Demo driver for the in-process chainlab ledger")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a transfer, mine it and print the resulting state
    Demo {
        /// Sender of the demo transfer
        #[arg(long, default_value = "alice")]
        from: String,
        /// Recipient of the demo transfer
        #[arg(long, default_value = "bob")]
        to: String,
        /// Amount to transfer
        #[arg(long, default_value_t = 100.0)]
        amount: f64,
        /// Address credited with the mining reward
        #[arg(long, default_value = "miner")]
        reward_address: String,
        /// Extra empty blocks to mine after the transfer
        #[arg(long, default_value_t = 0)]
        extra_blocks: u32,
        /// Print the full chain as JSON
        #[arg(long)]
        json: bool,
    },
    /// Corrupt a transaction and a block, and show the validators catching it
    Tamper,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Demo {
            from,
            to,
            amount,
            reward_address,
            extra_blocks,
            json,
        } => demo(&from, &to, amount, &reward_address, extra_blocks, json),
        Command::Tamper => tamper(),
    }
}

fn demo(
    from: &str,
    to: &str,
    amount: f64,
    reward_address: &str,
    extra_blocks: u32,
    json: bool,
) -> Result<()> {
    let mut chain = Chain::new();

    let slot = chain.submit_transaction(Transaction::new(from, to, amount)?)?;
    info!("queued transfer of {amount} from {from} to {to}, expected in block {slot}");

    chain.mine_pending(reward_address)?;
    for _ in 0..extra_blocks {
        chain.mine_pending(reward_address)?;
    }

    println!("chain length: {}", chain.len());
    for address in [from, to, reward_address] {
        println!("balance of {address}: {}", chain.balance_of(address));
    }
    println!("chain valid: {}", chain.is_valid());

    if json {
        for block in chain.blocks() {
            println!("{}", serde_json::to_string_pretty(block)?);
        }
    }
    Ok(())
}

fn tamper() -> Result<()> {
    // A setter-driven change refreshes the live digest but leaves the frozen
    // original behind, so the transaction stops validating.
    let mut tx = Transaction::new("alice", "bob", 25.0)?;
    println!("fresh transaction valid: {}", tx.is_valid());
    tx.set_amount(2_500.0)?;
    println!("after amount rewrite:    {}", tx.is_valid());

    // Swapping a mined block's batch breaks the block digest.
    let mut chain = Chain::new();
    chain.submit_transaction(Transaction::new("alice", "bob", 25.0)?)?;
    chain.mine_pending("miner")?;

    let mut block = chain.tip()?.clone();
    println!("mined block valid:       {}", block.is_valid());
    block.set_transactions(vec![Transaction::new("mallory", "eve", 1_000_000.0)?]);
    println!("after batch swap:        {}", block.is_valid());

    // The chain itself never handed out a writable reference, so it is intact.
    println!("chain still valid:       {}", chain.is_valid());
    Ok(())
}
