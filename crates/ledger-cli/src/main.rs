use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ledger_core::{
    find_violation, generate_key_pair, KeyPair, Ledger, LedgerConfig, MiningMode, Signer,
    Transaction,
};
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "Drives an in-memory proof-of-work ledger")]
struct Cli {
    #[command(flatten)]
    ledger: LedgerArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct LedgerArgs {
    /// JSON file with `difficulty`, `mining_reward` and `mining` keys
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Leading zero hex characters required of block hashes
    #[arg(long, global = true)]
    difficulty: Option<u32>,

    /// Coins minted per mined block
    #[arg(long, global = true)]
    reward: Option<u64>,

    /// Search nonces on all cores
    #[arg(long, global = true)]
    parallel: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a fresh secp256k1 key pair
    Keygen,
    /// Mine a few rounds, transfer between two wallets, then tamper with a copy
    Demo {
        /// Print the final chain as JSON
        #[arg(long)]
        json: bool,
    },
}

impl LedgerArgs {
    fn load(&self) -> Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                LedgerConfig::from_json_str(&raw)?
            }
            None => LedgerConfig::default(),
        };
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(reward) = self.reward {
            config.mining_reward = reward;
        }
        if self.parallel {
            config.mining = MiningMode::Parallel;
        }
        config.validate()?;
        Ok(config)
    }
}

fn transfer(amount: u64, from: &KeyPair, to: &KeyPair) -> Result<Transaction> {
    let mut tx = Transaction::new(amount, from.public_id(), to.public_id());
    tx.sign(from)?;
    Ok(tx)
}

fn run_demo(config: LedgerConfig, json: bool) -> Result<()> {
    let alice = KeyPair::generate();
    let bob = KeyPair::generate();
    let miner = KeyPair::generate();
    let mut ledger = Ledger::new(config)?;

    ledger.mine_round(&alice.public_id())?;
    ledger.mine_round(&bob.public_id())?;

    ledger.submit(transfer(10, &alice, &bob)?);
    ledger.submit(transfer(20, &bob, &alice)?);
    ledger.mine_round(&miner.public_id())?;

    for (i, block) in ledger.blocks().iter().enumerate() {
        println!(
            "block {i}: nonce {} txs {} previous {} hash {}",
            block.nonce,
            block.transactions.len(),
            if block.previous_hash.is_empty() {
                "-"
            } else {
                block.previous_hash.as_str()
            },
            block.hash
        );
    }
    for (name, key) in [("alice", &alice), ("bob", &bob), ("miner", &miner)] {
        let balance = ledger.balance(&key.public_id()).unwrap_or_default();
        println!("{name:>5} {balance:>6}  {}", key.public_id());
    }
    println!("chain valid: {}", ledger.verify());

    let mut tampered = ledger.blocks().to_vec();
    if let Some(tx) = tampered.get_mut(1).and_then(|b| b.transactions.first_mut()) {
        tx.amount = 50;
    }
    match find_violation(&tampered) {
        Some(violation) => println!("tampered copy: {violation}"),
        None => println!("tampered copy: valid"),
    }

    if json {
        println!("{}", serde_json::to_string_pretty(ledger.blocks())?);
    }
    Ok(())
}

fn log_subscriber() -> impl tracing::Subscriber + Send + Sync + 'static {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .finish()
}

fn main() -> Result<()> {
    log_subscriber().init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Keygen => {
            let (public_id, secret) = generate_key_pair();
            println!("public:  {public_id}");
            println!("private: {secret}");
        }
        Command::Demo { json } => {
            let config = cli.ledger.load()?;
            info!(
                difficulty = config.difficulty,
                reward = config.mining_reward,
                mining = ?config.mining,
                "starting demo ledger"
            );
            run_demo(config, json)?;
        }
    }
    Ok(())
}
