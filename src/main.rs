// Entry point for the ledger CLI
use clap::Parser;
use log::{error, LevelFilter};
use powledger::{
    validate_address, Blockchain, Command, LedgerConfig, LedgerService, Opt, Server, Wallet,
};
use serde_json::json;
use std::process;
use std::sync::Arc;

fn main() {
    // Info by default; RUST_LOG still overrides it
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let config = LedgerConfig::load(opt.config.as_deref())?;

    match opt.command {
        Command::Createwallet => {
            let wallet = Wallet::new()?;
            println!("private key: {}", wallet.private_key_hex());
            println!("public key: {}", wallet.public_key_hex());
            println!("address: {}", wallet.get_address());
        }
        Command::ImportWallet {
            private_key,
            public_key,
        } => {
            let wallet = Wallet::from_private_key_hex(&private_key, &public_key)?;
            println!("address: {}", wallet.get_address());
        }
        Command::ValidateAddress { address } => {
            if validate_address(&address) {
                println!("{address} is valid");
            } else {
                return Err(format!("Invalid address: {address}").into());
            }
        }
        Command::Simulate { blocks } => {
            let wallet = Wallet::new()?;
            let config = config.with_miner_address(wallet.get_address());
            let blockchain = Blockchain::new(config)?;
            for _ in 0..blocks {
                blockchain.mining()?;
            }

            let report = json!({
                "chain": blockchain.get_chain(),
                "miner": wallet.get_address(),
                "balance": blockchain.calculate_total_amount(wallet.get_address()),
                "valid": blockchain.is_valid_chain(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Serve { miner } => {
            let config = match miner {
                Some(address) => {
                    if !validate_address(&address) {
                        return Err(format!("Invalid miner address: {address}").into());
                    }
                    config.with_miner_address(&address)
                }
                None => config,
            };
            let listen_addr = config.listen_addr.clone();
            let blockchain = Blockchain::new(config)?;
            let server = Server::new(LedgerService::new(Arc::new(blockchain)));
            server.run(&listen_addr)?;
        }
    }
    Ok(())
}
