//! Trolley Application CLI
//!
//! One process is one shopping session: the cart slot outlives it, the
//! undo affordance does not. Commands are read line by line from stdin.

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process,
    sync::Arc,
};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use trolley::items::{LineItem, NewLineItem, ProductId, money_from_minor};
use trolley_app::{
    context::AppContext,
    domain::{
        cart::CartEvent,
        checkout::{CheckoutRequest, SandboxPaymentGateway},
        orders::JsonFileOrderService,
        session::{Credentials, StaticIdentityProvider},
    },
    storage::JsonFileStore,
};

#[derive(Debug, Parser)]
#[command(name = "trolley-app", about = "Trolley shopping session", long_about = None)]
struct Cli {
    /// Path of the persistent cart slot
    #[arg(long, env = "TROLLEY_CART_SLOT", default_value = "trolley-cart.json")]
    cart_slot: PathBuf,

    /// Path of the order ledger
    #[arg(long, env = "TROLLEY_ORDER_LEDGER", default_value = "trolley-orders.json")]
    order_ledger: PathBuf,

    /// JSON fixture of the server-side cart installed on login
    #[arg(long, env = "TROLLEY_SERVER_CART")]
    server_cart: Option<PathBuf>,

    /// Decline every payment capture
    #[arg(long)]
    decline_payments: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,
}

#[derive(Debug, Parser)]
#[command(name = "trolley", no_binary_name = true, about = None, long_about = None)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Debug, Subcommand)]
enum SessionCommand {
    /// Add a product to the cart
    Add(AddArgs),
    /// Show the cart
    List,
    /// Set the quantity of a cart line
    Update {
        /// Product identifier
        id: String,
        /// New quantity
        quantity: u32,
    },
    /// Remove a cart line
    Remove {
        /// Product identifier
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Restore what the last remove or clear took away
    Undo,
    /// Sign in and merge the server-side cart into this one
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
    /// Pay and place the order
    Checkout(CheckoutArgs),
    /// Show a placed order
    Order {
        /// Order id from the checkout confirmation
        uuid: Uuid,
    },
    /// End the session
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product identifier
    id: String,

    /// Unit price in minor units
    price: u64,

    /// Display name; spaces allowed
    #[arg(num_args = 1.., required = true)]
    name: Vec<String>,

    /// Units to add
    #[arg(short, long, default_value_t = 1)]
    quantity: u32,

    /// Catalog image URL
    #[arg(long)]
    image_url: Option<String>,

    /// Variant label such as a size or colour
    #[arg(long)]
    variant: Option<String>,
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    /// Shipping in minor units
    #[arg(long, default_value_t = 5_00)]
    shipping: u64,

    /// Tax in minor units
    #[arg(long, default_value_t = 0)]
    tax: u64,

    /// Redirect target after payment approval
    #[arg(long, default_value = "https://shop.example/checkout/success")]
    return_url: String,

    /// Redirect target after payment cancellation
    #[arg(long, default_value = "https://shop.example/checkout/cancelled")]
    cancel_url: String,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut ctx = build_context(&cli)?;

    println!("Trolley session started; `help` lists commands, `quit` ends the session.");

    let mut lines = io::stdin().lines();

    loop {
        print!("trolley> ");
        let _ = io::stdout().flush();

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|error| format!("failed to read input: {error}"))?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        match SessionLine::try_parse_from(line.split_whitespace()) {
            Ok(SessionLine {
                command: SessionCommand::Quit,
            }) => break,
            Ok(SessionLine { command }) => dispatch(&mut ctx, command).await,
            Err(error) => {
                let _ = error.print();
            }
        }
    }

    ctx.shutdown()
        .map_err(|error| format!("failed to flush the cart slot: {error}"))
}

fn build_context(cli: &Cli) -> Result<AppContext, String> {
    let identity = match &cli.server_cart {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|error| {
                format!("failed to read server cart fixture {}: {error}", path.display())
            })?;
            let lines: Vec<LineItem> = serde_json::from_str(&raw)
                .map_err(|error| format!("failed to parse server cart fixture: {error}"))?;

            StaticIdentityProvider::with_server_cart(lines)
        }
        None => StaticIdentityProvider::new(),
    };

    let payments = if cli.decline_payments {
        SandboxPaymentGateway::declining()
    } else {
        SandboxPaymentGateway::new()
    };

    Ok(AppContext::init(
        Arc::new(JsonFileStore::new(cli.cart_slot.clone())),
        Arc::new(identity),
        Arc::new(payments),
        Arc::new(JsonFileOrderService::new(cli.order_ledger.clone())),
    ))
}

async fn dispatch(ctx: &mut AppContext, command: SessionCommand) {
    match command {
        SessionCommand::Add(args) => add(ctx, args),
        SessionCommand::List => list(ctx),
        SessionCommand::Update { id, quantity } => update(ctx, &id, quantity),
        SessionCommand::Remove { id } => remove(ctx, &id),
        SessionCommand::Clear => clear(ctx),
        SessionCommand::Undo => undo(ctx),
        SessionCommand::Login { email, password } => login(ctx, email, password).await,
        SessionCommand::Checkout(args) => checkout(ctx, args).await,
        SessionCommand::Order { uuid } => show_order(ctx, uuid).await,
        SessionCommand::Quit => {}
    }
}

fn add(ctx: &mut AppContext, args: AddArgs) {
    let item = NewLineItem {
        id: ProductId::new(args.id),
        name: args.name.join(" "),
        unit_price: args.price,
        quantity: args.quantity,
        image_url: args.image_url,
        variant: args.variant,
    };

    match ctx.cart.add_item(item) {
        Ok(event) => println!("{}", describe(&event)),
        Err(error) => println!("That item can't be added: {error}."),
    }
}

fn list(ctx: &AppContext) {
    let cart = ctx.cart.cart();

    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.lines() {
        let variant = line
            .variant
            .as_deref()
            .map(|variant| format!(" ({variant})"))
            .unwrap_or_default();

        println!(
            "  {} × {}{} [{}] at {} each, {} total",
            line.quantity,
            line.name,
            variant,
            line.id,
            line.unit_price,
            line.line_total()
        );
    }

    println!(
        "{} items, subtotal {}",
        ctx.cart.item_count(),
        ctx.cart.subtotal()
    );
}

fn update(ctx: &mut AppContext, id: &str, quantity: u32) {
    match ctx.cart.update_quantity(&id.into(), quantity) {
        Ok(Some(event)) => println!("{}", describe(&event)),
        Ok(None) => println!("There's no {id} in your cart."),
        Err(error) => println!("That quantity can't be set: {error}."),
    }
}

fn remove(ctx: &mut AppContext, id: &str) {
    match ctx.cart.remove_item(&id.into()) {
        Some(event) => println!("{}", describe(&event)),
        None => println!("There's no {id} in your cart."),
    }
}

fn clear(ctx: &mut AppContext) {
    match ctx.cart.clear() {
        Some(event) => println!("{}", describe(&event)),
        None => println!("Your cart is already empty."),
    }
}

fn undo(ctx: &mut AppContext) {
    match ctx.cart.undo() {
        Some(event) => println!("{}", describe(&event)),
        None => println!("There's nothing to undo."),
    }
}

async fn login(ctx: &mut AppContext, email: String, password: String) {
    let credentials = Credentials { email, password };

    match ctx.sign_in(&credentials).await {
        Ok(signin) => println!(
            "Signed in as {}; your cart now has {} lines.",
            signin.account_uuid, signin.lines_merged
        ),
        Err(error) => println!("{error}."),
    }
}

async fn checkout(ctx: &mut AppContext, args: CheckoutArgs) {
    let request = CheckoutRequest {
        shipping: args.shipping,
        tax: args.tax,
        return_url: args.return_url,
        cancel_url: args.cancel_url,
    };

    match ctx.place_order(&request).await {
        Ok(order) => {
            println!(
                "Order {} placed; charged {}.",
                order.uuid,
                money_from_minor(order.total)
            );
            println!(
                "Confirmation {}; `order {}` shows it again.",
                order.payment_confirmation, order.uuid
            );
        }
        Err(error) => println!("Checkout didn't go through: {error}."),
    }
}

async fn show_order(ctx: &AppContext, uuid: Uuid) {
    match ctx.checkout.order_by_id(uuid).await {
        Ok(Some(order)) => {
            println!("Order {} ({}), placed {}", order.uuid, order.status, order.placed_at);

            for line in &order.items {
                println!("  {} × {}, {}", line.quantity, line.name, line.line_total());
            }

            println!(
                "Charged {} ({})",
                money_from_minor(order.total),
                order.payment_confirmation
            );
        }
        Ok(None) => println!("We couldn't find that order."),
        Err(error) => println!("That order can't be shown right now: {error}."),
    }
}

fn describe(event: &CartEvent) -> String {
    match event {
        CartEvent::ItemAdded {
            name,
            quantity_added,
        } => format!("Added {quantity_added} × {name}."),
        CartEvent::QuantityUpdated { name, quantity } => {
            format!("{name} is now {quantity} in your cart.")
        }
        CartEvent::ItemRemoved { name } => {
            format!("Removed {name}. `undo` puts it back.")
        }
        CartEvent::CartCleared { lines_cleared } => {
            format!("Cleared {lines_cleared} lines. `undo` restores them.")
        }
        CartEvent::ItemRestored { name } => format!("Restored {name}."),
        CartEvent::CartRestored { lines_restored } => {
            format!("Restored {lines_restored} lines.")
        }
    }
}
