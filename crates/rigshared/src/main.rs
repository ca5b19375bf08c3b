//! rigshared - the rigshare marketplace service
//!
//! This is the main entry point for the marketplace. It wires together
//! all the components:
//! - Configuration loading
//! - Store and audit log initialization
//! - Demo launcher
//! - Marketplace engine
//!
//! Role-scoped subcommands act as the presentation shell: `slots` and
//! `approve` for the admin, `submit` for sellers, `book` for buyers,
//! `sessions` and `log` as the shared views. `serve` runs the periodic
//! expiry sweep until signalled.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rigshare_config::{MarketConfig, load_config};
use rigshare_core::Marketplace;
use rigshare_launcher::ProcessLauncher;
use rigshare_store::{AuditEvent, AuditLog, SlotStatus, SqliteStore, Store};
use rigshare_util::{SlotId, format_duration};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// rigshared - PC capacity marketplace service
#[derive(Parser, Debug)]
#[command(name = "rigshared")]
#[command(about = "PC capacity marketplace service", long_about = None)]
struct Args {
    /// Configuration file path; defaults apply when the file is absent
    #[arg(short, long, default_value = "/etc/rigshare/config.toml")]
    config: PathBuf,

    /// Data directory override for db and audit log (or set RIGSHARE_DATA_DIR)
    #[arg(short, long, env = "RIGSHARE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the service: sweep expired bookings on a fixed interval
    Serve,

    /// Seller: submit a slot for admin approval
    Submit {
        seller: String,
        pc_name: String,
        hours: u32,
        price: u32,
    },

    /// Admin: approve a pending slot
    Approve { id: i64 },

    /// List slots; --approved narrows to the buyer view
    Slots {
        #[arg(long)]
        approved: bool,
    },

    /// Buyer: book an approved slot
    Book { id: i64, buyer: String },

    /// Sweep expired bookings, then list active sessions
    Sessions,

    /// Print the audit log
    Log,
}

/// Main service state
struct Service {
    config: MarketConfig,
    market: Marketplace,
    audit: Arc<AuditLog>,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let mut config = if args.config.exists() {
            load_config(&args.config)
                .with_context(|| format!("Failed to load config from {:?}", args.config))?
        } else {
            debug!(config_path = %args.config.display(), "No config file, using defaults");
            MarketConfig::default()
        };

        if let Some(dir) = &args.data_dir {
            config.service.data_dir = dir.clone();
            config.service.audit_log = dir.join("execution.log");
        }

        std::fs::create_dir_all(&config.service.data_dir).with_context(|| {
            format!(
                "Failed to create data directory {:?}",
                config.service.data_dir
            )
        })?;

        let db_path = config.service.data_dir.join("rigshare.db");
        let store: Arc<dyn Store> = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );

        if !store.is_healthy() {
            anyhow::bail!("Store health check failed for {:?}", db_path);
        }

        info!(db_path = %db_path.display(), "Store initialized");

        let audit = Arc::new(AuditLog::open(&config.service.audit_log).with_context(|| {
            format!(
                "Failed to open audit log {:?}",
                config.service.audit_log
            )
        })?);

        let launcher = Arc::new(ProcessLauncher::new(
            config.launcher.argv.clone(),
            audit.clone(),
        ));

        let market = Marketplace::new(store, audit.clone(), config.bounds, launcher);

        Ok(Self {
            config,
            market,
            audit,
        })
    }

    /// Periodic sweep loop, until SIGTERM or SIGINT
    async fn serve(self) -> Result<()> {
        self.audit.append(&AuditEvent::ServiceStarted);

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

        let mut sweep_timer = tokio::time::interval(self.config.service.sweep_interval);

        info!(
            interval_secs = self.config.service.sweep_interval.as_secs(),
            "Service running"
        );

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sweep_timer.tick() => {
                    match self.market.sweep_expired(rigshare_util::now()) {
                        Ok(ended) if !ended.is_empty() => {
                            info!(count = ended.len(), "Sweep ended sessions");
                        }
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "Sweep failed"),
                    }
                }
            }
        }

        self.market.abort_launches();
        self.audit.append(&AuditEvent::ServiceStopped);
        info!("Shutdown complete");
        Ok(())
    }

    async fn run(self, command: Command) -> Result<()> {
        match command {
            Command::Serve => return self.serve().await,

            Command::Submit {
                seller,
                pc_name,
                hours,
                price,
            } => {
                let slot = self.market.submit_slot(&seller, &pc_name, hours, price)?;
                println!("Slot {} submitted for admin approval", slot.id);
            }

            Command::Approve { id } => {
                let slot = self.market.approve_slot(SlotId::new(id))?;
                println!("Slot {} approved", slot.id);
            }

            Command::Slots { approved } => {
                let filter = approved.then_some(SlotStatus::Approved);
                let slots = self.market.slots(filter)?;

                if slots.is_empty() {
                    if approved {
                        println!("No approved slots available.");
                    } else {
                        println!("No slots submitted yet.");
                    }
                }
                for slot in slots {
                    println!(
                        "Slot {} | Seller: {} | PC: {} | {} hrs | {}/hr | Status: {}",
                        slot.id, slot.seller, slot.pc_name, slot.hours, slot.price, slot.status
                    );
                }
            }

            Command::Book { id, buyer } => {
                let booking = self.market.book_slot(SlotId::new(id), &buyer, rigshare_util::now())?;
                println!("Session started: booking {}", booking.id);

                // Let the detached spawn finish before the process exits;
                // the outcome still goes only to the audit log.
                self.market.drain_launches().await;
            }

            Command::Sessions => {
                let now = rigshare_util::now();
                for ended in self.market.sweep_expired(now)? {
                    println!("Booking {} ended", ended);
                }

                let active = self.market.active_bookings()?;
                if active.is_empty() {
                    println!("No active sessions.");
                }
                for booking in active {
                    println!(
                        "Booking {} | Buyer: {} | Remaining: {}",
                        booking.id,
                        booking.buyer,
                        format_duration(booking.remaining(now))
                    );
                }
            }

            Command::Log => {
                print!("{}", self.audit.read_all()?);
            }
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let service = Service::new(&args)?;
    service.run(args.command).await
}
