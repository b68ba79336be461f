use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "powledger")]
pub struct Opt {
    #[arg(long = "config", global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "createwallet", about = "Create a new keypair and address")]
    Createwallet,
    #[command(
        name = "importwallet",
        about = "Load a keypair from its hex private and public keys and print the address"
    )]
    ImportWallet {
        #[arg(help = "Raw 32-byte private key, hex")]
        private_key: String,
        #[arg(help = "Public key, hex (X || Y or SEC1 uncompressed)")]
        public_key: String,
    },
    #[command(name = "validateaddress", about = "Check an address checksum")]
    ValidateAddress {
        #[arg(help = "The address to check")]
        address: String,
    },
    #[command(
        name = "simulate",
        about = "Mine blocks on an in-memory ledger and print the chain"
    )]
    Simulate {
        #[arg(long = "blocks", default_value_t = 3, help = "Number of blocks to mine")]
        blocks: usize,
    },
    #[command(name = "serve", about = "Serve the ledger over line-delimited JSON")]
    Serve {
        #[arg(long = "miner", help = "Address to receive mining rewards")]
        miner: Option<String>,
    },
}
