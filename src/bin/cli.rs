//! tickstore CLI client
//!
//! Command-line interface for issuing tickstore commands.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tickstore_client::{Client, ClientConfig, GetFormat, ReqCount, Update};

/// tickstore CLI
#[derive(Parser, Debug)]
#[command(name = "tickstore-cli")]
#[command(about = "CLI for the tickstore tick database")]
// The server has its own HELP command; keep `help` for it
#[command(disable_help_subcommand = true)]
struct Args {
    /// Server host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(long, default_value_t = 9001)]
    port: u16,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ping the server
    Ping,

    /// Show server build and store information
    Info,

    /// Show server-side command help
    Help,

    /// Count stored records
    Count {
        /// Count only records held in memory
        #[arg(long)]
        in_mem: bool,
    },

    /// Insert one tick into the currently selected store
    Add {
        ts: u64,
        seq: u32,
        price: f32,
        size: f32,

        /// Mark the tick as a trade
        #[arg(long)]
        trade: bool,

        /// Mark the tick as bid side
        #[arg(long)]
        bid: bool,
    },

    /// Insert one tick into a named store
    Insert {
        db: String,
        ts: u64,
        seq: u32,
        price: f32,
        size: f32,

        #[arg(long)]
        trade: bool,

        #[arg(long)]
        bid: bool,
    },

    /// Fetch records (all of them when no count is given)
    Get {
        /// Number of most recent records
        count: Option<u64>,

        /// Request CSV instead of JSON
        #[arg(long)]
        csv: bool,

        /// Range start timestamp (ms), requires --to
        #[arg(long)]
        from: Option<u64>,

        /// Range end timestamp (ms), requires --from
        #[arg(long)]
        to: Option<u64>,
    },

    /// Create a named store
    Create { db: String },

    /// Select a named store
    Use { db: String },

    /// Drop records in the selected store
    Clear {
        /// Drop records in every store
        #[arg(long)]
        all: bool,
    },

    /// Persist the selected store to disk
    Flush {
        /// Persist every store
        #[arg(long)]
        all: bool,
    },

    /// Subscribe to a store and print records as they arrive
    Subscribe { db: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> tickstore_client::Result<()> {
    let config = ClientConfig::builder()
        .host(args.host)
        .port(args.port)
        .build();
    let mut client = Client::with_config(config)?;

    match args.command {
        Commands::Ping => println!("{}", client.ping()?),
        Commands::Info => println!("{}", client.info()?),
        Commands::Help => println!("{}", client.help()?),
        Commands::Count { in_mem } => {
            let count = if in_mem {
                client.count_all_in_mem()?
            } else {
                client.count_all()?
            };
            println!("{}", count);
        }
        Commands::Add {
            ts,
            seq,
            price,
            size,
            trade,
            bid,
        } => {
            let update = Update {
                ts,
                seq,
                is_trade: trade,
                is_bid: bid,
                price,
                size,
            };
            println!("{}", client.add(&update)?);
        }
        Commands::Insert {
            db,
            ts,
            seq,
            price,
            size,
            trade,
            bid,
        } => {
            let update = Update {
                ts,
                seq,
                is_trade: trade,
                is_bid: bid,
                price,
                size,
            };
            println!("{}", client.insert(&update, &db)?);
        }
        Commands::Get {
            count,
            csv,
            from,
            to,
        } => {
            let count = match count {
                Some(n) => ReqCount::Count(n),
                None => ReqCount::All,
            };
            let format = if csv { GetFormat::Csv } else { GetFormat::Json };
            let range = from.zip(to);
            match client.get_raw(count, format, range)? {
                Some(body) => println!("{}", String::from_utf8_lossy(&body)),
                None => println!("(no value)"),
            }
        }
        Commands::Create { db } => println!("{}", client.create(&db)?),
        Commands::Use { db } => println!("{}", client.use_db(&db)?),
        Commands::Clear { all } => {
            let msg = if all { client.clear_all()? } else { client.clear()? };
            println!("{}", msg);
        }
        Commands::Flush { all } => {
            let msg = if all { client.flush_all()? } else { client.flush()? };
            println!("{}", msg);
        }
        Commands::Subscribe { db } => {
            client.subscribe(&db)?;
            for record in client.updates() {
                let update = record?;
                println!(
                    "{} {} {} {} {} {}",
                    update.ts, update.seq, update.is_trade, update.is_bid, update.price, update.size
                );
            }
        }
    }

    Ok(())
}
