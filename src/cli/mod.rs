use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{
    BackofficeService, LedgerEntryDraft, PaymentDraft, PayoutDraft,
};
use crate::domain::{
    AdPatch, AdPlacement, ArticlePatch, ArticleStatus, Identity, LedgerEntryKind,
    LedgerEntryPatch, NoteColor, OrderPatch, PaymentMethod, PaymentPatch, Role, format_cents,
    parse_cents,
};

/// Vestnik - Newsroom Back Office
#[derive(Parser)]
#[command(name = "vestnik")]
#[command(about = "Back office for a local news site: publishing, ads and the money ledger")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "vestnik.db")]
    pub database: String,

    /// Email of the staff member running the command
    #[arg(long = "as", value_name = "EMAIL", global = true)]
    pub acting_user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database and seed the first admin account
    Init {
        /// Email for the first admin
        #[arg(long)]
        admin_email: String,

        /// Display name for the first admin
        #[arg(long)]
        admin_name: String,
    },

    /// Staff management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Customer order commands
    #[command(subcommand)]
    Order(OrderCommands),

    /// Customer payment commands
    #[command(subcommand)]
    Payment(PaymentCommands),

    /// Employee payout commands
    #[command(subcommand)]
    Payout(PayoutCommands),

    /// Manual ledger entry commands
    #[command(subcommand)]
    Entry(EntryCommands),

    /// Show the aggregated business view
    Business {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Newsroom notification commands
    #[command(subcommand)]
    Notification(NotificationCommands),

    /// Article commands
    #[command(subcommand)]
    Article(ArticleCommands),

    /// Article category commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Advertisement commands
    #[command(subcommand)]
    Ad(AdCommands),

    /// Dashboard sticky note commands
    #[command(subcommand)]
    Note(NoteCommands),

    /// Shared whiteboard commands
    #[command(subcommand)]
    Board(BoardCommands),

    /// Export the ledger as CSV or the full database as JSON
    Export {
        /// What to export: ledger, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Restore a full-database JSON snapshot
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Report counts without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a staff account (admin only)
    Create {
        /// Email (must be unique)
        email: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Role: admin, chief_editor, editor, author
        #[arg(short, long, default_value = "author")]
        role: String,
    },

    /// List staff accounts
    List,

    /// Archive a staff account (admin only)
    Archive {
        /// User ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Create a customer order
    Create {
        /// Order title
        title: String,

        /// Customer name
        #[arg(long)]
        customer: String,

        /// Agreed price (e.g., "1200.00")
        #[arg(long)]
        price: String,

        /// Description
        #[arg(short, long)]
        description: Option<String>,

        /// Free-text employee name working the order
        #[arg(long)]
        employee: Option<String>,

        /// Staff member ID working the order
        #[arg(long)]
        employee_id: Option<String>,
    },

    /// List orders
    List,

    /// Show one order with its payments and payouts
    Show {
        /// Order ID
        id: String,
    },

    /// Update descriptive order fields
    Update {
        /// Order ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        customer: Option<String>,

        #[arg(long)]
        price: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        employee: Option<String>,

        #[arg(long)]
        employee_id: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PaymentCommands {
    /// Record a customer payment against an order
    Add {
        /// Order ID
        #[arg(long)]
        order: String,

        /// Amount received (e.g., "600.00")
        amount: String,

        /// Method: cash, bank, card
        #[arg(short, long, default_value = "bank")]
        method: String,

        /// Payment date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Update a customer payment
    Update {
        /// Payment ID
        id: String,

        #[arg(long)]
        amount: Option<String>,

        #[arg(short, long)]
        method: Option<String>,

        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a customer payment
    Delete {
        /// Payment ID
        id: String,
    },

    /// List customer payments
    List {
        /// Filter by order ID
        #[arg(long)]
        order: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PayoutCommands {
    /// Record a payout to an employee for an order
    Add {
        /// Order ID
        #[arg(long)]
        order: String,

        /// Amount paid out (e.g., "500.00")
        amount: String,

        /// Method: cash, bank, card
        #[arg(short, long, default_value = "bank")]
        method: String,

        /// Payout date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Payee name (overrides --employee-id resolution)
        #[arg(long)]
        employee: Option<String>,

        /// Staff member being paid
        #[arg(long)]
        employee_id: Option<String>,

        /// Notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a payout, writing the compensating income entry
    Delete {
        /// Payout ID
        id: String,
    },

    /// List payouts
    List {
        /// Filter by order ID
        #[arg(long)]
        order: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum EntryCommands {
    /// Add a manual ledger entry (admin or chief editor)
    Add {
        /// Kind: income, expense
        kind: String,

        /// Amount (e.g., "75.50")
        amount: String,

        /// Category (e.g., "printing", "rent")
        #[arg(short, long)]
        category: String,

        /// Description
        #[arg(short, long)]
        description: String,

        /// Entry date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Related order ID
        #[arg(long)]
        order: Option<String>,
    },

    /// Update a manual ledger entry (admin or chief editor)
    Update {
        /// Entry ID
        id: String,

        #[arg(long)]
        kind: Option<String>,

        #[arg(long)]
        amount: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a ledger entry (admin or chief editor)
    Delete {
        /// Entry ID
        id: String,
    },

    /// List ledger entries
    List {
        /// Filter by kind: income, expense
        #[arg(long)]
        kind: Option<String>,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Filter by related order ID
        #[arg(long)]
        order: Option<String>,

        /// Maximum number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// Create a notification
    Create {
        /// Title
        title: String,
    },

    /// Add a history line under a notification
    AddEntry {
        /// Notification ID
        notification: String,

        /// Message
        message: String,
    },

    /// Mark a history line as covered by a payout
    MarkPaid {
        /// History entry ID
        entry: String,

        /// Payout ID
        payout: String,
    },

    /// List notifications with their history
    List,
}

#[derive(Subcommand)]
pub enum ArticleCommands {
    /// Create an article draft
    Create {
        /// Title
        title: String,

        /// Body text
        #[arg(short, long)]
        body: String,

        /// Category slug
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Update an article (own, or any for editors and above)
    Update {
        /// Article ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        body: Option<String>,

        /// Category slug
        #[arg(short, long)]
        category: Option<String>,

        /// Remove the category
        #[arg(long, conflicts_with = "category")]
        clear_category: bool,
    },

    /// Delete an article (own, or any for editors and above)
    Delete {
        /// Article ID
        id: String,
    },

    /// Publish an article (editors and above)
    Publish {
        /// Article ID
        id: String,
    },

    /// Send a published article back to draft (editors and above)
    Unpublish {
        /// Article ID
        id: String,
    },

    /// List articles
    List {
        /// Filter by status: draft, published
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a category (editors and above)
    Create {
        /// Name; the slug is derived from it
        name: String,
    },

    /// Delete a category by slug (editors and above)
    Delete {
        /// Category slug
        slug: String,
    },

    /// List categories
    List,
}

#[derive(Subcommand)]
pub enum AdCommands {
    /// Create an ad (admin or chief editor)
    Create {
        /// Advertiser name
        advertiser: String,

        /// Image URL
        #[arg(long)]
        image: String,

        /// Click-through URL
        #[arg(long)]
        link: Option<String>,

        /// Placement: banner, sidebar, footer
        #[arg(short, long, default_value = "banner")]
        placement: String,
    },

    /// Update an ad (admin or chief editor)
    Update {
        /// Ad ID
        id: String,

        #[arg(long)]
        advertiser: Option<String>,

        #[arg(long)]
        image: Option<String>,

        #[arg(long)]
        link: Option<String>,

        /// Remove the click-through URL
        #[arg(long, conflicts_with = "link")]
        clear_link: bool,

        #[arg(short, long)]
        placement: Option<String>,

        /// Activate the ad
        #[arg(long, conflicts_with = "inactive")]
        active: bool,

        /// Deactivate the ad
        #[arg(long)]
        inactive: bool,
    },

    /// Delete an ad (admin or chief editor)
    Delete {
        /// Ad ID
        id: String,
    },

    /// List ads
    List {
        /// Show only active ads
        #[arg(long)]
        active: bool,
    },
}

#[derive(Subcommand)]
pub enum NoteCommands {
    /// Pin a sticky note to the dashboard
    Add {
        /// Note text
        body: String,

        /// Color: yellow, pink, blue, green
        #[arg(short, long, default_value = "yellow")]
        color: String,
    },

    /// Edit your own note
    Update {
        /// Note ID
        id: String,

        #[arg(long)]
        body: Option<String>,

        #[arg(short, long)]
        color: Option<String>,
    },

    /// Take a note down (own, or any for admins)
    Delete {
        /// Note ID
        id: String,
    },

    /// List notes
    List,
}

#[derive(Subcommand)]
pub enum BoardCommands {
    /// Show the whiteboard
    Show,

    /// Replace the whiteboard content
    Write {
        /// New content
        content: String,
    },
}

impl Cli {
    /// Resolve the acting staff member. Every command except `init` and
    /// the backup pair runs as somebody.
    async fn identify(&self, service: &BackofficeService) -> Result<Identity> {
        let email = self.acting_user.as_deref().ok_or_else(|| {
            anyhow::anyhow!("No acting user. Pass --as <email> to run commands as a staff member")
        })?;
        Ok(service.identify(email).await?)
    }

    pub async fn run(self) -> Result<()> {
        match &self.command {
            Commands::Init {
                admin_email,
                admin_name,
            } => {
                let service = BackofficeService::init(&self.database).await?;
                let admin = service
                    .bootstrap_admin(admin_email.clone(), admin_name.clone())
                    .await?;
                println!("Database initialized: {}", self.database);
                println!("Created admin: {} <{}>", admin.name, admin.email);
            }

            Commands::User(cmd) => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                run_user_command(&service, &actor, cmd).await?;
            }

            Commands::Order(cmd) => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                run_order_command(&service, &actor, cmd).await?;
            }

            Commands::Payment(cmd) => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                run_payment_command(&service, &actor, cmd).await?;
            }

            Commands::Payout(cmd) => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                run_payout_command(&service, &actor, cmd).await?;
            }

            Commands::Entry(cmd) => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                run_entry_command(&service, &actor, cmd).await?;
            }

            Commands::Business { format } => {
                let service = BackofficeService::connect(&self.database).await?;
                self.identify(&service).await?;
                run_business_command(&service, format).await?;
            }

            Commands::Notification(cmd) => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                run_notification_command(&service, &actor, cmd).await?;
            }

            Commands::Article(cmd) => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                run_article_command(&service, &actor, cmd).await?;
            }

            Commands::Category(cmd) => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                run_category_command(&service, &actor, cmd).await?;
            }

            Commands::Ad(cmd) => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                run_ad_command(&service, &actor, cmd).await?;
            }

            Commands::Note(cmd) => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                run_note_command(&service, &actor, cmd).await?;
            }

            Commands::Board(cmd) => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                run_board_command(&service, &actor, cmd).await?;
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                anyhow::ensure!(
                    actor.role == Role::Admin,
                    "Only admins may export the database"
                );
                run_export_command(&service, export_type, output.as_deref()).await?;
            }

            Commands::Import { input, dry_run } => {
                let service = BackofficeService::connect(&self.database).await?;
                let actor = self.identify(&service).await?;
                anyhow::ensure!(
                    actor.role == Role::Admin,
                    "Only admins may restore a snapshot"
                );
                run_import_command(&service, input.as_deref(), *dry_run).await?;
            }
        }

        Ok(())
    }
}

async fn run_user_command(
    service: &BackofficeService,
    actor: &Identity,
    cmd: &UserCommands,
) -> Result<()> {
    match cmd {
        UserCommands::Create { email, name, role } => {
            let role = parse_role(role)?;
            let user = service
                .create_user(actor, email.clone(), name.clone(), role)
                .await?;
            println!("Created user: {} <{}> as {} ({})", user.name, user.email, user.role, user.id);
        }

        UserCommands::List => {
            let users = service.list_users().await?;
            if users.is_empty() {
                println!("No staff accounts found.");
            } else {
                println!("{:<22} {:<28} {:<14} {}", "NAME", "EMAIL", "ROLE", "ID");
                println!("{}", "-".repeat(102));
                for user in users {
                    let role = if user.is_archived() {
                        format!("{} (archived)", user.role)
                    } else {
                        user.role.to_string()
                    };
                    println!(
                        "{:<22} {:<28} {:<14} {}",
                        truncate(&user.name, 22),
                        truncate(&user.email, 28),
                        role,
                        user.id
                    );
                }
            }
        }

        UserCommands::Archive { id } => {
            let user_id = parse_uuid(id, "user")?;
            let user = service.archive_user(actor, user_id).await?;
            println!("Archived user: {} <{}>", user.name, user.email);
        }
    }
    Ok(())
}

async fn run_order_command(
    service: &BackofficeService,
    actor: &Identity,
    cmd: &OrderCommands,
) -> Result<()> {
    match cmd {
        OrderCommands::Create {
            title,
            customer,
            price,
            description,
            employee,
            employee_id,
        } => {
            let price = parse_cents(price).context("Invalid price format. Use '1200.00'")?;
            let employee_id = employee_id
                .as_deref()
                .map(|id| parse_uuid(id, "employee"))
                .transpose()?;
            let order = service
                .create_order(
                    actor,
                    title.clone(),
                    customer.clone(),
                    price,
                    description.clone(),
                    employee.clone(),
                    employee_id,
                )
                .await?;
            println!(
                "Created order: {} for {} at {} ({})",
                order.title,
                order.customer,
                format_cents(order.price),
                order.id
            );
        }

        OrderCommands::List => {
            let orders = service.list_orders().await?;
            if orders.is_empty() {
                println!("No orders found.");
            } else {
                println!(
                    "{:<10} {:<26} {:<18} {:>12} {:>12}",
                    "ID", "TITLE", "CUSTOMER", "PRICE", "PAID OUT"
                );
                println!("{}", "-".repeat(82));
                for order in orders {
                    println!(
                        "{:<10.8} {:<26} {:<18} {:>12} {:>12}",
                        order.id.to_string(),
                        truncate(&order.title, 26),
                        truncate(&order.customer, 18),
                        format_cents(order.price),
                        format_cents(order.employee_paid_amount)
                    );
                }
            }
        }

        OrderCommands::Show { id } => {
            let order_id = parse_uuid(id, "order")?;
            let order = service.get_order(order_id).await?;

            println!("Order: {}", order.title);
            println!("  ID:        {}", order.id);
            println!("  Customer:  {}", order.customer);
            println!("  Price:     {}", format_cents(order.price));
            println!("  Paid out:  {}", format_cents(order.employee_paid_amount));
            if let Some(desc) = &order.description {
                println!("  Notes:     {}", desc);
            }
            if let Some(employee) = &order.employee {
                println!("  Employee:  {}", employee);
            }
            println!(
                "  Created:   {}",
                order.created_at.format("%Y-%m-%d %H:%M:%S")
            );

            let payments = service.list_payments(Some(order_id)).await?;
            if !payments.is_empty() {
                println!();
                println!("  Payments:");
                for payment in payments {
                    println!(
                        "    {} {:>10} {} ({})",
                        payment.payment_date.format("%Y-%m-%d"),
                        format_cents(payment.amount),
                        payment.method,
                        payment.id
                    );
                }
            }

            let payouts = service.list_employee_payments(Some(order_id)).await?;
            if !payouts.is_empty() {
                println!();
                println!("  Payouts:");
                for payout in payouts {
                    println!(
                        "    {} {:>10} {} to {} ({})",
                        payout.payment_date.format("%Y-%m-%d"),
                        format_cents(payout.amount),
                        payout.method,
                        payout.recipient.as_deref().unwrap_or("-"),
                        payout.id
                    );
                }
            }
        }

        OrderCommands::Update {
            id,
            title,
            customer,
            price,
            description,
            employee,
            employee_id,
        } => {
            let order_id = parse_uuid(id, "order")?;
            let patch = OrderPatch {
                title: title.clone(),
                customer: customer.clone(),
                description: description.clone(),
                price: price
                    .as_deref()
                    .map(parse_cents)
                    .transpose()
                    .context("Invalid price format. Use '1200.00'")?,
                employee: employee.clone(),
                employee_id: employee_id
                    .as_deref()
                    .map(|id| parse_uuid(id, "employee"))
                    .transpose()?,
            };
            let order = service.update_order(actor, order_id, patch).await?;
            println!("Updated order: {} ({})", order.title, order.id);
        }
    }
    Ok(())
}

async fn run_payment_command(
    service: &BackofficeService,
    actor: &Identity,
    cmd: &PaymentCommands,
) -> Result<()> {
    match cmd {
        PaymentCommands::Add {
            order,
            amount,
            method,
            date,
        } => {
            let draft = PaymentDraft {
                order_id: parse_uuid(order, "order")?,
                amount: parse_cents(amount).context("Invalid amount format. Use '600.00'")?,
                payment_date: parse_date_or_now(date.as_deref())?,
                method: parse_method(method)?,
            };
            let payment = service.add_payment(actor, draft).await?;
            println!(
                "Recorded payment: {} via {} ({})",
                format_cents(payment.amount),
                payment.method,
                payment.id
            );
        }

        PaymentCommands::Update {
            id,
            amount,
            method,
            date,
        } => {
            let payment_id = parse_uuid(id, "payment")?;
            let patch = PaymentPatch {
                amount: amount
                    .as_deref()
                    .map(parse_cents)
                    .transpose()
                    .context("Invalid amount format. Use '600.00'")?,
                payment_date: date.as_deref().map(parse_date).transpose()?,
                method: method.as_deref().map(parse_method).transpose()?,
            };
            let payment = service.update_payment(actor, payment_id, patch).await?;
            println!(
                "Updated payment: {} via {} ({})",
                format_cents(payment.amount),
                payment.method,
                payment.id
            );
        }

        PaymentCommands::Delete { id } => {
            // The raw string goes through so a malformed id surfaces as the
            // invalid-identifier error rather than a parse failure here.
            let outcome = service.delete_payment(actor, id).await?;
            if outcome.already_deleted {
                println!("Payment {} was already deleted.", id);
            } else {
                println!("Deleted payment: {}", id);
            }
        }

        PaymentCommands::List { order } => {
            let order_id = order
                .as_deref()
                .map(|id| parse_uuid(id, "order"))
                .transpose()?;
            let payments = service.list_payments(order_id).await?;
            if payments.is_empty() {
                println!("No payments found.");
            } else {
                println!(
                    "{:<10} {:<10} {:<12} {:>12} {:<6} RECEIVED BY",
                    "ID", "ORDER", "DATE", "AMOUNT", "VIA"
                );
                println!("{}", "-".repeat(78));
                for payment in payments {
                    println!(
                        "{:<10.8} {:<10.8} {:<12} {:>12} {:<6} {}",
                        payment.id.to_string(),
                        payment.order_id.to_string(),
                        payment.payment_date.format("%Y-%m-%d"),
                        format_cents(payment.amount),
                        payment.method,
                        payment.received_by.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_payout_command(
    service: &BackofficeService,
    actor: &Identity,
    cmd: &PayoutCommands,
) -> Result<()> {
    match cmd {
        PayoutCommands::Add {
            order,
            amount,
            method,
            date,
            employee,
            employee_id,
            notes,
        } => {
            let draft = PayoutDraft {
                order_id: parse_uuid(order, "order")?,
                amount: parse_cents(amount).context("Invalid amount format. Use '500.00'")?,
                payment_date: parse_date_or_now(date.as_deref())?,
                method: parse_method(method)?,
                notes: notes.clone(),
                employee_name: employee.clone(),
                target_employee_id: employee_id
                    .as_deref()
                    .map(|id| parse_uuid(id, "employee"))
                    .transpose()?,
            };
            let recorded = service.add_employee_payment(actor, draft).await?;
            println!(
                "Recorded payout: {} to {} ({})",
                format_cents(recorded.payment.amount),
                recorded.payment.recipient.as_deref().unwrap_or("employee"),
                recorded.payment.id
            );
            println!(
                "Ledger entry: {} {} - {}",
                recorded.entry.kind,
                format_cents(recorded.entry.amount),
                recorded.entry.description
            );
        }

        PayoutCommands::Delete { id } => {
            let payout_id = parse_uuid(id, "payout")?;
            let removal = service.delete_employee_payment(actor, payout_id).await?;
            println!(
                "Deleted payout: {} ({})",
                format_cents(removal.payment.amount),
                removal.payment.id
            );
            println!(
                "Ledger entry: {} {} - {}",
                removal.reversal.kind,
                format_cents(removal.reversal.amount),
                removal.reversal.description
            );
            if removal.cleared_history > 0 {
                println!(
                    "Cleared {} notification history line(s).",
                    removal.cleared_history
                );
            }
        }

        PayoutCommands::List { order } => {
            let order_id = order
                .as_deref()
                .map(|id| parse_uuid(id, "order"))
                .transpose()?;
            let payouts = service.list_employee_payments(order_id).await?;
            if payouts.is_empty() {
                println!("No payouts found.");
            } else {
                println!(
                    "{:<10} {:<10} {:<12} {:>12} {:<6} RECIPIENT",
                    "ID", "ORDER", "DATE", "AMOUNT", "VIA"
                );
                println!("{}", "-".repeat(78));
                for payout in payouts {
                    println!(
                        "{:<10.8} {:<10.8} {:<12} {:>12} {:<6} {}",
                        payout.id.to_string(),
                        payout.order_id.to_string(),
                        payout.payment_date.format("%Y-%m-%d"),
                        format_cents(payout.amount),
                        payout.method,
                        payout.recipient.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_entry_command(
    service: &BackofficeService,
    actor: &Identity,
    cmd: &EntryCommands,
) -> Result<()> {
    match cmd {
        EntryCommands::Add {
            kind,
            amount,
            category,
            description,
            date,
            order,
        } => {
            let draft = LedgerEntryDraft {
                kind: parse_kind(kind)?,
                amount: parse_cents(amount).context("Invalid amount format. Use '75.50'")?,
                category: category.clone(),
                entry_date: parse_date_or_now(date.as_deref())?,
                description: description.clone(),
                order_id: order
                    .as_deref()
                    .map(|id| parse_uuid(id, "order"))
                    .transpose()?,
            };
            let entry = service.create_ledger_entry(actor, draft).await?;
            println!(
                "Added {} entry: {} in {} ({})",
                entry.kind,
                format_cents(entry.amount),
                entry.category,
                entry.id
            );
        }

        EntryCommands::Update {
            id,
            kind,
            amount,
            category,
            description,
            date,
        } => {
            let entry_id = parse_uuid(id, "entry")?;
            let patch = LedgerEntryPatch {
                kind: kind.as_deref().map(parse_kind).transpose()?,
                amount: amount
                    .as_deref()
                    .map(parse_cents)
                    .transpose()
                    .context("Invalid amount format. Use '75.50'")?,
                category: category.clone(),
                entry_date: date.as_deref().map(parse_date).transpose()?,
                description: description.clone(),
            };
            let entry = service.update_ledger_entry(actor, entry_id, patch).await?;
            println!(
                "Updated entry: {} {} in {} ({})",
                entry.kind,
                format_cents(entry.amount),
                entry.category,
                entry.id
            );
        }

        EntryCommands::Delete { id } => {
            let entry_id = parse_uuid(id, "entry")?;
            service.delete_ledger_entry(actor, entry_id).await?;
            println!("Deleted entry: {}", id);
        }

        EntryCommands::List {
            kind,
            category,
            order,
            limit,
        } => {
            let kind = kind.as_deref().map(parse_kind).transpose()?;
            let order_id = order
                .as_deref()
                .map(|id| parse_uuid(id, "order"))
                .transpose()?;
            let entries = service
                .list_ledger_entries(kind, category.as_deref(), order_id, *limit)
                .await?;
            if entries.is_empty() {
                println!("No ledger entries found.");
            } else {
                println!(
                    "{:<10} {:<12} {:<8} {:>12} {:<16} DESCRIPTION",
                    "ID", "DATE", "KIND", "AMOUNT", "CATEGORY"
                );
                println!("{}", "-".repeat(96));
                for entry in entries {
                    println!(
                        "{:<10.8} {:<12} {:<8} {:>12} {:<16} {}",
                        entry.id.to_string(),
                        entry.entry_date.format("%Y-%m-%d"),
                        entry.kind,
                        format_cents(entry.amount),
                        truncate(&entry.category, 16),
                        truncate(&entry.description, 36)
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_business_command(service: &BackofficeService, format: &str) -> Result<()> {
    let data = service.business_data().await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("Business overview");
    println!();

    if data.orders.is_empty() {
        println!("No orders.");
    } else {
        println!(
            "{:<10} {:<24} {:<16} {:>10} {:>10} {:>10} EMPLOYEE",
            "ID", "TITLE", "CUSTOMER", "PRICE", "RECEIVED", "PAID OUT"
        );
        println!("{}", "-".repeat(100));
        for view in &data.orders {
            println!(
                "{:<10.8} {:<24} {:<16} {:>10} {:>10} {:>10} {}",
                view.order.id.to_string(),
                truncate(&view.order.title, 24),
                truncate(&view.order.customer, 16),
                format_cents(view.order.price),
                format_cents(view.customer_paid),
                format_cents(view.order.employee_paid_amount),
                view.employee_name.as_deref().unwrap_or("-")
            );
        }
    }

    println!();
    if data.ledger.is_empty() {
        println!("Ledger is empty.");
    } else {
        println!(
            "{:<12} {:<8} {:>12} {:<16} {:<34} BY",
            "DATE", "KIND", "AMOUNT", "CATEGORY", "DESCRIPTION"
        );
        println!("{}", "-".repeat(104));
        for view in &data.ledger {
            println!(
                "{:<12} {:<8} {:>12} {:<16} {:<34} {}",
                view.entry.entry_date.format("%Y-%m-%d"),
                view.entry.kind,
                format_cents(view.entry.amount),
                truncate(&view.entry.category, 16),
                truncate(&view.entry.description, 34),
                view.created_by_name
            );
        }
    }

    println!();
    println!("Income:  {:>12}", format_cents(data.total_income));
    println!("Expense: {:>12}", format_cents(data.total_expense));
    println!("Net:     {:>12}", format_cents(data.net()));

    Ok(())
}

async fn run_notification_command(
    service: &BackofficeService,
    actor: &Identity,
    cmd: &NotificationCommands,
) -> Result<()> {
    match cmd {
        NotificationCommands::Create { title } => {
            let notification = service.create_notification(actor, title.clone()).await?;
            println!(
                "Created notification: {} ({})",
                notification.title, notification.id
            );
        }

        NotificationCommands::AddEntry {
            notification,
            message,
        } => {
            let notification_id = parse_uuid(notification, "notification")?;
            let entry = service
                .add_history_entry(actor, notification_id, message.clone())
                .await?;
            println!("Added history entry: {}", entry.id);
        }

        NotificationCommands::MarkPaid { entry, payout } => {
            let entry_id = parse_uuid(entry, "history entry")?;
            let payout_id = parse_uuid(payout, "payout")?;
            let entry = service.mark_history_paid(actor, entry_id, payout_id).await?;
            println!("Marked paid: {}", entry.message);
        }

        NotificationCommands::List => {
            let notifications = service.list_notifications().await?;
            if notifications.is_empty() {
                println!("No notifications found.");
            } else {
                for item in notifications {
                    println!(
                        "{} - {} ({})",
                        item.notification.created_at.format("%Y-%m-%d"),
                        item.notification.title,
                        item.notification.id
                    );
                    for entry in item.entries {
                        let marker = if entry.is_paid { "[paid]" } else { "      " };
                        println!("  {} {} ({})", marker, entry.message, entry.id);
                    }
                }
            }
        }
    }
    Ok(())
}

async fn run_article_command(
    service: &BackofficeService,
    actor: &Identity,
    cmd: &ArticleCommands,
) -> Result<()> {
    match cmd {
        ArticleCommands::Create {
            title,
            body,
            category,
        } => {
            let category_id = match category {
                Some(slug) => Some(service.get_category_by_slug(slug).await?.id),
                None => None,
            };
            let article = service
                .create_article(actor, title.clone(), body.clone(), category_id)
                .await?;
            println!("Created draft: {} ({})", article.title, article.id);
        }

        ArticleCommands::Update {
            id,
            title,
            body,
            category,
            clear_category,
        } => {
            let article_id = parse_uuid(id, "article")?;
            let category_id = if *clear_category {
                Some(None)
            } else {
                match category {
                    Some(slug) => Some(Some(service.get_category_by_slug(slug).await?.id)),
                    None => None,
                }
            };
            let patch = ArticlePatch {
                title: title.clone(),
                body: body.clone(),
                category_id,
            };
            let article = service.update_article(actor, article_id, patch).await?;
            println!("Updated article: {} ({})", article.title, article.id);
        }

        ArticleCommands::Delete { id } => {
            let article_id = parse_uuid(id, "article")?;
            service.delete_article(actor, article_id).await?;
            println!("Deleted article: {}", id);
        }

        ArticleCommands::Publish { id } => {
            let article_id = parse_uuid(id, "article")?;
            let article = service.publish_article(actor, article_id).await?;
            println!("Published: {}", article.title);
        }

        ArticleCommands::Unpublish { id } => {
            let article_id = parse_uuid(id, "article")?;
            let article = service.unpublish_article(actor, article_id).await?;
            println!("Back to draft: {}", article.title);
        }

        ArticleCommands::List { status } => {
            let status = status
                .as_deref()
                .map(|s| {
                    ArticleStatus::from_str(s).ok_or_else(|| {
                        anyhow::anyhow!("Invalid status '{}'. Valid: draft, published", s)
                    })
                })
                .transpose()?;
            let articles = service.list_articles(status).await?;
            if articles.is_empty() {
                println!("No articles found.");
            } else {
                println!("{:<10} {:<11} {:<36} AUTHOR", "ID", "STATUS", "TITLE");
                println!("{}", "-".repeat(80));
                for article in articles {
                    println!(
                        "{:<10.8} {:<11} {:<36} {}",
                        article.id.to_string(),
                        article.status,
                        truncate(&article.title, 36),
                        article.author.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_category_command(
    service: &BackofficeService,
    actor: &Identity,
    cmd: &CategoryCommands,
) -> Result<()> {
    match cmd {
        CategoryCommands::Create { name } => {
            let category = service.create_category(actor, name.clone()).await?;
            println!("Created category: {} ({})", category.name, category.slug);
        }

        CategoryCommands::Delete { slug } => {
            let category = service.get_category_by_slug(slug).await?;
            service.delete_category(actor, category.id).await?;
            println!("Deleted category: {}", category.name);
        }

        CategoryCommands::List => {
            let categories = service.list_categories().await?;
            if categories.is_empty() {
                println!("No categories found.");
            } else {
                println!("{:<24} SLUG", "NAME");
                println!("{}", "-".repeat(48));
                for category in categories {
                    println!("{:<24} {}", truncate(&category.name, 24), category.slug);
                }
            }
        }
    }
    Ok(())
}

async fn run_ad_command(
    service: &BackofficeService,
    actor: &Identity,
    cmd: &AdCommands,
) -> Result<()> {
    match cmd {
        AdCommands::Create {
            advertiser,
            image,
            link,
            placement,
        } => {
            let placement = parse_placement(placement)?;
            let ad = service
                .create_ad(
                    actor,
                    advertiser.clone(),
                    image.clone(),
                    link.clone(),
                    placement,
                )
                .await?;
            println!("Created ad: {} in {} ({})", ad.advertiser, ad.placement, ad.id);
        }

        AdCommands::Update {
            id,
            advertiser,
            image,
            link,
            clear_link,
            placement,
            active,
            inactive,
        } => {
            let ad_id = parse_uuid(id, "ad")?;
            let link_url = if *clear_link {
                Some(None)
            } else {
                link.clone().map(Some)
            };
            let patch = AdPatch {
                advertiser: advertiser.clone(),
                image_url: image.clone(),
                link_url,
                placement: placement.as_deref().map(parse_placement).transpose()?,
                active: match (active, inactive) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            let ad = service.update_ad(actor, ad_id, patch).await?;
            println!("Updated ad: {} ({})", ad.advertiser, ad.id);
        }

        AdCommands::Delete { id } => {
            let ad_id = parse_uuid(id, "ad")?;
            service.delete_ad(actor, ad_id).await?;
            println!("Deleted ad: {}", id);
        }

        AdCommands::List { active } => {
            let ads = service.list_ads(*active).await?;
            if ads.is_empty() {
                println!("No ads found.");
            } else {
                println!(
                    "{:<10} {:<22} {:<10} {:<8} IMAGE",
                    "ID", "ADVERTISER", "PLACEMENT", "ACTIVE"
                );
                println!("{}", "-".repeat(84));
                for ad in ads {
                    println!(
                        "{:<10.8} {:<22} {:<10} {:<8} {}",
                        ad.id.to_string(),
                        truncate(&ad.advertiser, 22),
                        ad.placement,
                        if ad.active { "yes" } else { "no" },
                        truncate(&ad.image_url, 30)
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_note_command(
    service: &BackofficeService,
    actor: &Identity,
    cmd: &NoteCommands,
) -> Result<()> {
    match cmd {
        NoteCommands::Add { body, color } => {
            let color = parse_color(color)?;
            let note = service.add_note(actor, body.clone(), color).await?;
            println!("Pinned note: {} ({})", truncate(&note.body, 40), note.id);
        }

        NoteCommands::Update { id, body, color } => {
            let note_id = parse_uuid(id, "note")?;
            let color = color.as_deref().map(parse_color).transpose()?;
            let note = service
                .update_note(actor, note_id, body.clone(), color)
                .await?;
            println!("Updated note: {}", note.id);
        }

        NoteCommands::Delete { id } => {
            let note_id = parse_uuid(id, "note")?;
            service.delete_note(actor, note_id).await?;
            println!("Removed note: {}", id);
        }

        NoteCommands::List => {
            let notes = service.list_notes().await?;
            if notes.is_empty() {
                println!("No notes on the board.");
            } else {
                println!("{:<10} {:<8} {:<20} BODY", "ID", "COLOR", "AUTHOR");
                println!("{}", "-".repeat(84));
                for note in notes {
                    println!(
                        "{:<10.8} {:<8} {:<20} {}",
                        note.id.to_string(),
                        note.color,
                        truncate(&note.author, 20),
                        truncate(&note.body, 40)
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_board_command(
    service: &BackofficeService,
    actor: &Identity,
    cmd: &BoardCommands,
) -> Result<()> {
    match cmd {
        BoardCommands::Show => {
            let board = service.whiteboard().await?;
            if board.content.is_empty() {
                println!("The whiteboard is clean.");
            } else {
                println!("{}", board.content);
                if let Some(by) = &board.updated_by {
                    println!();
                    println!(
                        "Last updated by {} at {}",
                        by,
                        board.updated_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
            }
        }

        BoardCommands::Write { content } => {
            service.write_whiteboard(actor, content.clone()).await?;
            println!("Whiteboard updated.");
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &BackofficeService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service.repository());

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "ledger" => {
            let count = exporter.ledger_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} ledger entries", count);
            }
        }
        "full" => {
            let snapshot = exporter.write_snapshot(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full database: {} users, {} orders, {} payments, {} payouts, {} ledger entries",
                    snapshot.users.len(),
                    snapshot.orders.len(),
                    snapshot.payments.len(),
                    snapshot.employee_payments.len(),
                    snapshot.ledger_entries.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: ledger, full",
                export_type
            );
        }
    }

    Ok(())
}

async fn run_import_command(
    service: &BackofficeService,
    input: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::Importer;
    use std::fs::File;
    use std::io::{Read, stdin};

    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let snapshot = Importer::read_snapshot(reader)?;
    let report = if dry_run {
        println!("Dry run; nothing written.");
        Importer::preview(&snapshot)
    } else {
        let importer = Importer::new(service.repository());
        let report = importer.restore(&snapshot).await?;
        println!("Restore complete.");
        report
    };

    println!("  Users:         {}", report.users);
    println!("  Orders:        {}", report.orders);
    println!("  Payments:      {}", report.payments);
    println!("  Payouts:       {}", report.employee_payments);
    println!("  Ledger:        {}", report.ledger_entries);
    println!("  Notifications: {}", report.notifications);
    println!("  History:       {}", report.notification_history);
    println!("  Categories:    {}", report.categories);
    println!("  Articles:      {}", report.articles);
    println!("  Ads:           {}", report.ads);
    println!("  Notes:         {}", report.notes);
    println!("  Total:         {}", report.total());

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

fn parse_uuid(value: &str, label: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .with_context(|| format!("Invalid {} ID format (expected UUID): {}", label, value))
}

fn parse_role(role: &str) -> Result<Role> {
    Role::from_str(role).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid role '{}'. Valid roles: admin, chief_editor, editor, author",
            role
        )
    })
}

fn parse_method(method: &str) -> Result<PaymentMethod> {
    PaymentMethod::from_str(method).ok_or_else(|| {
        anyhow::anyhow!("Invalid method '{}'. Valid methods: cash, bank, card", method)
    })
}

fn parse_kind(kind: &str) -> Result<LedgerEntryKind> {
    LedgerEntryKind::from_str(kind)
        .ok_or_else(|| anyhow::anyhow!("Invalid kind '{}'. Valid kinds: income, expense", kind))
}

fn parse_placement(placement: &str) -> Result<AdPlacement> {
    AdPlacement::from_str(placement).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid placement '{}'. Valid placements: banner, sidebar, footer",
            placement
        )
    })
}

fn parse_color(color: &str) -> Result<NoteColor> {
    NoteColor::from_str(color).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid color '{}'. Valid colors: yellow, pink, blue, green",
            color
        )
    })
}

fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    use chrono::NaiveDate;

    let naive_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")?;

    let naive_datetime = naive_date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;

    Ok(DateTime::from_naive_utc_and_offset(naive_datetime, Utc))
}

fn parse_date_or_now(date_str: Option<&str>) -> Result<DateTime<Utc>> {
    match date_str {
        Some(s) => parse_date(s)
            .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", s)),
        None => Ok(Utc::now()),
    }
}
