use cardemo::{Car, CarTransaction, LedgerConnection, LocalGateway, Wallet,
    backend::JsonStore,
    car::Price};

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Context;
use chrono::Local;
use colored::Colorize;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(version, about, propagate_version = true)]
struct Cli {
    /// Path to the world state file to operate on
    #[clap(short, long, value_parser, default_value = "resources/world_state.json")]
    state: PathBuf,

    /// Path to the wallet holding caller identities
    #[clap(short, long, value_parser, default_value = "resources/wallet.json")]
    wallet: PathBuf,

    /// Wallet label to connect as; defaults to the role the action needs
    #[clap(short, long, value_parser)]
    identity: Option<String>,

    /// Action to perform
    #[clap(subcommand)]
    action: Subcommands,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Seed the ledger with sample cars
    Init,
    /// List every car on the ledger
    List,
    /// Show a single car
    Get(CarRef),
    /// Manufacture a new car
    Create(Create),
    /// Ship a car to a dealer
    Ship(Ship),
    /// Record delivery of a car at the dealer
    Receive(CarRef),
    /// Sell a car to a customer
    Sell(Sell),
    /// Run a car through its whole lifecycle, printing every step
    Smoke
}

#[derive(Args, Debug)]
struct CarRef {
    /// Id of the car
    #[clap(value_parser)]
    car_id: String
}

#[derive(Args, Debug)]
struct Create {
    #[clap(value_parser)]
    car_id: String,

    #[clap(short='m', long, value_parser)]
    manufacturer: String,

    #[clap(long, value_parser, default_value_t = String::from("2022"))]
    make: String,

    #[clap(long, value_parser)]
    model: String,

    #[clap(short='c', long, value_parser)]
    color: String,

    #[clap(short='p', long, value_parser)]
    price: Price
}

#[derive(Args, Debug)]
struct Ship {
    #[clap(value_parser)]
    car_id: String,

    #[clap(short='d', long, value_parser)]
    dealer: String,

    #[clap(short='p', long, value_parser)]
    price: Price
}

#[derive(Args, Debug)]
struct Sell {
    #[clap(value_parser)]
    car_id: String,

    #[clap(short='c', long, value_parser)]
    consumer: String,

    #[clap(short='p', long, value_parser)]
    price: Price
}

impl Cli {
    /// Wallet label the action runs as. `smoke` always connects with the
    /// demo wallet labels, so naming an identity for it is an error.
    fn identity(&self) -> anyhow::Result<String> {
        match (&self.identity, &self.action) {
            (Some(label), Subcommands::Smoke) =>
                anyhow::bail!("smoke runs as the demo wallet identities, --identity {} cannot be used with it", label),
            (Some(label), _) => Ok(label.clone()),
            (None, action) => Ok(action.default_identity().to_owned())
        }
    }
}

fn today() -> String {
    Local::now().format("%Y/%m/%d").to_string()
}

impl Subcommands {
    /// Wallet label used when none is given on the command line.
    fn default_identity(&self) -> &'static str {
        match self {
            Self::Create(_) | Self::Ship(_) => Wallet::MANUFACTURER,
            Self::Receive(_) | Self::Sell(_) => Wallet::DEALER,
            _ => Wallet::APP_USER
        }
    }

    fn transaction(self) -> Option<CarTransaction> {
        let tx = match self {
            Self::Init => CarTransaction::InitLedger,
            Self::List => CarTransaction::QueryAllCars,
            Self::Get(car) => CarTransaction::QueryCar { car_id: car.car_id },
            Self::Create(create) => CarTransaction::CreateNewCar(Car::new(
                &create.manufacturer, &create.car_id, &create.make, &create.model,
                &create.color, &today(), create.price)),
            Self::Ship(ship) => CarTransaction::ShipToDealer {
                car_id: ship.car_id, dealer_id: ship.dealer, shipping_price: ship.price },
            Self::Receive(car) => CarTransaction::ReceiveDelivery { car_id: car.car_id },
            Self::Sell(sell) => CarTransaction::SellToCustomer {
                car_id: sell.car_id, consumer_id: sell.consumer, customer_price: sell.price },
            Self::Smoke => return None
        };
        Some(tx)
    }
}

/// Evaluates queries, submits everything else, and prints the raw result.
fn run(conn: &dyn LedgerConnection, tx: &CarTransaction) -> anyhow::Result<()> {
    let payload = if tx.is_read_only() {
        conn.evaluate(tx)
            .with_context(|| format!("failed to evaluate {} transaction", tx.name()))?
    } else {
        conn.submit(tx)
            .with_context(|| format!("failed to submit {} transaction", tx.name()))?
    };

    if payload.is_empty() {
        println!("{} {}", tx.to_string().bold(), "ok".green());
    } else {
        println!("{}", String::from_utf8_lossy(&payload));
    }
    return Ok(());
}

/// The fixed lifecycle script: one car from the factory to its owner.
fn smoke(gateway: &Arc<LocalGateway<JsonStore>>, wallet: &Wallet) -> anyhow::Result<()> {
    let app_user = gateway.connect(wallet.get(Wallet::APP_USER)?.clone());
    let manufacturer = gateway.connect(wallet.get(Wallet::MANUFACTURER)?.clone());
    let dealer = gateway.connect(wallet.get(Wallet::DEALER)?.clone());
    let reader: &dyn LedgerConnection = &app_user;
    let maker: &dyn LedgerConnection = &manufacturer;
    let seller: &dyn LedgerConnection = &dealer;

    let query = CarTransaction::QueryCar { car_id: "M105".to_owned() };
    let steps: Vec<(&dyn LedgerConnection, CarTransaction)> = vec![
        (reader, CarTransaction::QueryAllCars),
        (maker, CarTransaction::CreateNewCar(Car::new(
            "MOrg03", "M105", "2022", "MOrg03CM101", "White", &today(), 450000))),
        (reader, query.clone()),
        (maker, CarTransaction::ShipToDealer {
            car_id: "M105".to_owned(), dealer_id: "D101".to_owned(), shipping_price: 12000 }),
        (reader, query.clone()),
        (seller, CarTransaction::ReceiveDelivery { car_id: "M105".to_owned() }),
        (reader, query.clone()),
        (seller, CarTransaction::SellToCustomer {
            car_id: "M105".to_owned(), consumer_id: "CUST103".to_owned(), customer_price: 950000 }),
        (reader, query),
    ];

    for (conn, tx) in &steps {
        run(*conn, tx)?;
    }
    return Ok(());
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
    let args = Cli::parse();

    let wallet = Wallet::read_or_populate(&args.wallet)
        .with_context(|| "failed to load wallet")?;
    let store = JsonStore::open(&args.state)
        .with_context(|| "failed to open world state")?;
    let gateway = LocalGateway::new(store, "mychannel");

    let label = args.identity()?;
    match args.action.transaction() {
        Some(tx) => {
            let conn = gateway.connect(wallet.get(&label)?.clone());
            run(&conn, &tx)
        },
        None => smoke(&gateway, &wallet)
    }
}
