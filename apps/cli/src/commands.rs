//! Command handlers. Each returns the text to print on stdout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use stockroom_core::export::{
    export_file_name, to_delimited_text, to_tabular_report, ExportKind, TabularReport,
    INVENTORY_COLUMNS, REPORT_COLUMNS, TRANSACTION_COLUMNS,
};
use stockroom_core::query::{
    filter_items, filter_transactions, low_stock_items, parse_date, recent_issues, CatalogFilter,
    InventorySummary, LedgerFilter,
};
use stockroom_core::{
    Category, OverrideRequest, Snapshot, SubmitRequest, Transaction, TransactionType,
    ValidationError,
};
use stockroom_db::{Database, DbConfig, SqliteStore};
use stockroom_engine::{
    hash_password, save_endpoint, stored_endpoint, Authenticator, CredentialTable, EngineError,
    InventoryStore, MemoryStore, Session, StockroomConfig, StoreEndpoint,
};

use crate::{
    Cli, Command, ConfigAction, ExportTarget, HistoryArgs, ItemArgs, ReportFormat, SessionCommand,
};

/// Dispatches a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let Cli {
        config: config_path,
        user,
        password,
        command,
    } = cli;

    match command {
        Command::HashPassword { password } => Ok(format!("{}\n", hash_password(&password)?)),
        Command::Config { action } => config_command(config_path, action),
        Command::Session(command) => {
            let config = StockroomConfig::load(config_path)?;
            let store = open_store(&config).await?;
            let session = Session::open(store)
                .await
                .context("Could not load the inventory")?;
            let ctx = Context {
                config,
                session,
                today: Utc::now().date_naive(),
                user,
                password,
            };
            ctx.execute(command).await
        }
    }
}

async fn open_store(config: &StockroomConfig) -> anyhow::Result<Arc<dyn InventoryStore>> {
    match config.store_endpoint()? {
        StoreEndpoint::Sqlite(path) => {
            let db = Database::new(DbConfig::new(&path))
                .await
                .with_context(|| format!("Could not open database {}", path.display()))?;
            Ok(Arc::new(SqliteStore::new(db)))
        }
        StoreEndpoint::Memory => {
            warn!("Using the in-memory store: changes are lost when the command exits");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn config_command(config_path: Option<PathBuf>, action: ConfigAction) -> anyhow::Result<String> {
    match action {
        ConfigAction::Show => {
            let path = config_path.clone().or_else(StockroomConfig::default_config_path);
            let config = StockroomConfig::load(config_path)?;
            let mut out = String::new();
            out.push_str(&format!(
                "Config file:   {}\n",
                path.as_ref().map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string())
            ));
            let saved = stored_endpoint(path.as_deref())?;
            out.push_str(&format!("Store:         {}\n", config.store.endpoint));
            out.push_str(&format!(
                "Saved store:   {}{}\n",
                saved,
                if saved == config.store.endpoint { "" } else { " (overridden)" }
            ));
            out.push_str(&format!(
                "Export dir:    {}\n",
                config.export.directory.display()
            ));
            out.push_str(&format!("File prefix:   {}\n", config.export.file_prefix));
            out.push_str(&format!("Report title:  {}\n", config.export.report_title));
            if config.users.is_empty() {
                out.push_str("Users:         (sign-in not required)\n");
            } else {
                for user in &config.users {
                    out.push_str(&format!("User:          {} ({})\n", user.username, user.role));
                }
            }
            Ok(out)
        }
        ConfigAction::SetEndpoint { endpoint } => {
            let path = save_endpoint(config_path.as_deref(), &endpoint)?;
            info!(endpoint = %endpoint, path = %path.display(), "Store endpoint saved");
            Ok(format!("Saved store endpoint to {}\n", path.display()))
        }
    }
}

// =============================================================================
// Session Commands
// =============================================================================

/// Everything a session command needs.
pub struct Context {
    pub config: StockroomConfig,
    pub session: Session,
    pub today: NaiveDate,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Context {
    pub async fn execute(&self, command: SessionCommand) -> anyhow::Result<String> {
        match command {
            SessionCommand::Items(args) => list_items(&*self.session.snapshot().await, &args),

            SessionCommand::Issue {
                item,
                quantity,
                location,
                person,
                notes,
            } => {
                let person_name = self.sign_in(person).await?;
                let tx = self
                    .session
                    .submit(&SubmitRequest {
                        kind: TransactionType::Issue,
                        item_name: item,
                        quantity,
                        unit: None,
                        location,
                        person_name,
                        notes,
                        category_hint: None,
                    })
                    .await?;
                Ok(self.describe_commit(&tx).await)
            }

            SessionCommand::Receive {
                item,
                quantity,
                location,
                unit,
                category,
                person,
                notes,
            } => {
                let person_name = self.sign_in(person).await?;
                let tx = self
                    .session
                    .submit(&SubmitRequest {
                        kind: TransactionType::Receive,
                        item_name: item,
                        quantity,
                        unit,
                        location,
                        person_name,
                        notes,
                        category_hint: category,
                    })
                    .await?;
                Ok(self.describe_commit(&tx).await)
            }

            SessionCommand::Adjust {
                item,
                to,
                person,
                notes,
            } => {
                let person_name = self.sign_in(person).await?;
                let tx = self
                    .session
                    .override_quantity(&OverrideRequest {
                        item_name: item,
                        new_quantity: to,
                        person_name,
                        notes,
                    })
                    .await?;
                Ok(self.describe_commit(&tx).await)
            }

            SessionCommand::History(args) => history(&*self.session.snapshot().await, &args),

            SessionCommand::Export { target } => self.export(target).await,

            SessionCommand::Summary { recent } => Ok(summary(&*self.session.snapshot().await, recent)),

        }
    }

    /// Checks credentials when users are configured and picks the person
    /// recorded on the transaction.
    async fn sign_in(&self, person: Option<String>) -> anyhow::Result<String> {
        let signed_in = if self.config.requires_sign_in() {
            let username = self
                .user
                .as_deref()
                .context("Sign-in required: pass --user")?;
            let password = self
                .password
                .clone()
                .or_else(|| std::env::var("STOCKROOM_PASSWORD").ok())
                .context("Sign-in required: pass --password or set STOCKROOM_PASSWORD")?;

            let table = CredentialTable::new(self.config.users.clone());
            let role = table
                .verify(username, &password)
                .await
                .map_err(EngineError::from)?;
            info!(user = %username.trim(), %role, "Signed in");
            Some(username.trim().to_string())
        } else {
            None
        };

        // An empty name is rejected by validation with a field error.
        Ok(person.or(signed_in).unwrap_or_default())
    }

    async fn describe_commit(&self, tx: &Transaction) -> String {
        let snapshot = self.session.snapshot().await;
        let mut out = match (tx.kind, tx.previous_quantity) {
            (TransactionType::Adjustment, Some(previous)) => format!(
                "Set {} to {} {} (was {})",
                tx.item_name, tx.quantity, tx.unit, previous
            ),
            _ => format!(
                "Recorded {} of {} {} {}",
                tx.kind, tx.quantity, tx.unit, tx.item_name
            ),
        };
        out.push_str(&format!(" [{}]\n", tx.id));

        if let Some(item) = snapshot.catalog().get(&tx.item_name) {
            out.push_str(&format!(
                "{} on hand: {} {}\n",
                item.name, item.quantity, item.unit
            ));
            if item.is_low_stock() {
                out.push_str(&format!(
                    "Low stock: at or below the minimum of {} {}\n",
                    item.min_level, item.unit
                ));
            }
        }
        out
    }

    async fn export(&self, target: ExportTarget) -> anyhow::Result<String> {
        let snapshot = self.session.snapshot().await;
        let prefix = self.config.export.file_prefix.as_str();

        match target {
            ExportTarget::Inventory { filter, output } => {
                let catalog_filter = catalog_filter(&filter)?;
                let visible = filter_items(snapshot.items(), &catalog_filter, filter.sort);
                let csv = to_delimited_text(visible.iter().copied(), INVENTORY_COLUMNS)?;

                let path = output.unwrap_or_else(|| {
                    self.config.export_path(&export_file_name(
                        prefix,
                        ExportKind::InventoryCsv,
                        self.today,
                    ))
                });
                write_export(&path, &csv)?;
                Ok(format!("Wrote {} items to {}\n", visible.len(), path.display()))
            }

            ExportTarget::Report {
                filter,
                format,
                output,
            } => {
                let ledger_filter = ledger_filter(&filter)?;
                let visible = filter_transactions(snapshot.transactions(), &ledger_filter);

                let (kind, contents) = match format {
                    ReportFormat::Csv => (
                        ExportKind::ReportCsv,
                        to_delimited_text(visible.iter().copied(), TRANSACTION_COLUMNS)?,
                    ),
                    ReportFormat::Txt => (
                        ExportKind::ReportText,
                        TabularReport {
                            title: self.config.export.report_title.clone(),
                            generated_on: self.today,
                            filter_label: ledger_filter.to_string(),
                            table: to_tabular_report(visible.iter().copied(), REPORT_COLUMNS),
                        }
                        .render_text(),
                    ),
                };

                let path = output.unwrap_or_else(|| {
                    self.config
                        .export_path(&export_file_name(prefix, kind, self.today))
                });
                write_export(&path, &contents)?;
                Ok(format!(
                    "Wrote {} transactions to {}\n",
                    visible.len(),
                    path.display()
                ))
            }
        }
    }
}

// =============================================================================
// Views
// =============================================================================

fn catalog_filter(args: &ItemArgs) -> Result<CatalogFilter, ValidationError> {
    Ok(CatalogFilter {
        category: Category::parse_filter(&args.category)?,
        search_text: args.search.clone().filter(|s| !s.trim().is_empty()),
    })
}

fn ledger_filter(args: &HistoryArgs) -> Result<LedgerFilter, ValidationError> {
    Ok(LedgerFilter {
        kind: TransactionType::parse_filter(&args.kind)?,
        start_date: args
            .start
            .as_deref()
            .map(|s| parse_date("start_date", s))
            .transpose()?,
        end_date: args
            .end
            .as_deref()
            .map(|s| parse_date("end_date", s))
            .transpose()?,
    })
}

fn list_items(snapshot: &Snapshot, args: &ItemArgs) -> anyhow::Result<String> {
    let filter = catalog_filter(args)?;
    let visible = filter_items(snapshot.items(), &filter, args.sort);
    let low = visible.iter().filter(|i| i.is_low_stock()).count();

    let mut out = to_tabular_report(visible.iter().copied(), INVENTORY_COLUMNS).render_text();
    out.push_str(&format!("\n{} items, {} low stock\n", visible.len(), low));
    Ok(out)
}

fn history(snapshot: &Snapshot, args: &HistoryArgs) -> anyhow::Result<String> {
    let filter = ledger_filter(args)?;
    let visible = filter_transactions(snapshot.transactions(), &filter);

    let mut out = to_tabular_report(visible.iter().copied(), TRANSACTION_COLUMNS).render_text();
    out.push_str(&format!("\n{} transactions | Filter: {}\n", visible.len(), filter));
    Ok(out)
}

fn summary(snapshot: &Snapshot, recent: Option<usize>) -> String {
    let counts = InventorySummary::from_items(snapshot.items());

    let mut out = String::new();
    out.push_str(&format!("Total items:  {}\n", counts.total_items));
    out.push_str(&format!("Low stock:    {}\n", counts.low_stock_count));
    for (category, count) in &counts.per_category {
        out.push_str(&format!("{:<13} {}\n", format!("{}:", category), count));
    }

    let low = low_stock_items(snapshot.items());
    if !low.is_empty() {
        out.push_str("\nLow stock items\n");
        out.push_str(&to_tabular_report(low, INVENTORY_COLUMNS).render_text());
    }

    let issues = recent_issues(snapshot.transactions(), recent);
    out.push_str("\nRecent issues\n");
    if issues.is_empty() {
        out.push_str("(none)\n");
    } else {
        out.push_str(&to_tabular_report(issues, REPORT_COLUMNS).render_text());
    }
    out
}

fn write_export(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Could not write {}", path.display()))?;
    info!(path = %path.display(), bytes = contents.len(), "Export written");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{FloorLocation, Item, Quantity};
    use stockroom_engine::{Role, UserEntry};

    fn items() -> Vec<Item> {
        vec![
            Item {
                id: "t1".into(),
                name: "Tissue Roll".into(),
                category: Category::Housekeeping,
                quantity: Quantity::from_units(10),
                unit: "pcs".into(),
                min_level: Quantity::from_units(5),
            },
            Item {
                id: "p1".into(),
                name: "Sugar".into(),
                category: Category::Pantry,
                quantity: Quantity::from_units(1),
                unit: "kg".into(),
                min_level: Quantity::from_units(2),
            },
        ]
    }

    async fn context(config: StockroomConfig) -> Context {
        let store = Arc::new(MemoryStore::with_data(items(), Vec::new()));
        Context {
            config,
            session: Session::open(store).await.unwrap(),
            today: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            user: None,
            password: None,
        }
    }

    fn issue(units: i64, person: Option<&str>) -> SessionCommand {
        SessionCommand::Issue {
            item: "Tissue Roll".into(),
            quantity: Quantity::from_units(units),
            location: FloorLocation::GroundFloor,
            person: person.map(str::to_string),
            notes: None,
        }
    }

    fn item_args(category: &str, search: Option<&str>) -> ItemArgs {
        ItemArgs {
            category: category.into(),
            search: search.map(str::to_string),
            sort: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_items_filter_by_category() {
        let ctx = context(StockroomConfig::default()).await;
        let out = ctx
            .execute(SessionCommand::Items(item_args("Pantry", None)))
            .await
            .unwrap();
        assert!(out.contains("Sugar"));
        assert!(!out.contains("Tissue Roll"));
        assert!(out.contains("1 items, 1 low stock"));

        assert!(ctx
            .execute(SessionCommand::Items(item_args("Garden", None)))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_issue_reports_new_level() {
        let ctx = context(StockroomConfig::default()).await;
        let out = ctx.execute(issue(6, Some("Asha"))).await.unwrap();
        assert!(out.starts_with("Recorded Issue of 6 pcs Tissue Roll"));
        assert!(out.contains("Tissue Roll on hand: 4 pcs"));
        assert!(out.contains("Low stock"));
    }

    #[tokio::test]
    async fn test_issue_without_person_is_rejected() {
        let ctx = context(StockroomConfig::default()).await;
        let err = ctx.execute(issue(1, None)).await.unwrap_err();
        let engine = err.downcast_ref::<EngineError>().unwrap();
        assert!(engine.is_validation());
    }

    #[tokio::test]
    async fn test_sign_in_when_users_configured() {
        let mut config = StockroomConfig::default();
        config.users.push(UserEntry {
            username: "staff".into(),
            role: Role::Staff,
            password_hash: hash_password("staff123").unwrap(),
        });

        let mut ctx = context(config).await;
        assert!(ctx.execute(issue(1, Some("Asha"))).await.is_err());

        ctx.user = Some("Staff".into());
        ctx.password = Some("wrong".into());
        let err = ctx.execute(issue(1, None)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::AuthRejected)
        ));

        // The signed-in user becomes the person on the record.
        ctx.password = Some("staff123".into());
        ctx.execute(issue(1, None)).await.unwrap();
        let snapshot = ctx.session.snapshot().await;
        assert_eq!(snapshot.transactions()[0].person_name, "Staff");
    }

    #[tokio::test]
    async fn test_adjust_and_history() {
        let ctx = context(StockroomConfig::default()).await;
        ctx.execute(issue(2, Some("Asha"))).await.unwrap();
        let out = ctx
            .execute(SessionCommand::Adjust {
                item: "Tissue Roll".into(),
                to: Quantity::from_units(12),
                person: Some("Ravi".into()),
                notes: Some("recount".into()),
            })
            .await
            .unwrap();
        assert!(out.starts_with("Set Tissue Roll to 12 pcs (was 8)"));

        let all = ctx
            .execute(SessionCommand::History(HistoryArgs {
                kind: "All".into(),
                start: None,
                end: None,
            }))
            .await
            .unwrap();
        assert!(all.contains("2 transactions | Filter: All"));

        let issues = ctx
            .execute(SessionCommand::History(HistoryArgs {
                kind: "Issue".into(),
                start: None,
                end: None,
            }))
            .await
            .unwrap();
        assert!(issues.contains("1 transactions | Filter: Issue"));
        assert!(!issues.contains("Adjustment"));
    }

    #[tokio::test]
    async fn test_exports_use_dated_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StockroomConfig::default();
        config.export.directory = dir.path().to_path_buf();

        let ctx = context(config).await;
        ctx.execute(issue(3, Some("Asha"))).await.unwrap();

        ctx.execute(SessionCommand::Export {
            target: ExportTarget::Inventory {
                filter: item_args("All", None),
                output: None,
            },
        })
        .await
        .unwrap();
        let csv =
            std::fs::read_to_string(dir.path().join("stockroom_inventory_2026-03-14.csv")).unwrap();
        assert!(csv.starts_with("ID,Item Name,Category,Quantity,Unit,Min Level,Status\n"));
        assert!(csv.contains("t1,Tissue Roll,Housekeeping,7,pcs,5,In Stock\n"));

        ctx.execute(SessionCommand::Export {
            target: ExportTarget::Report {
                filter: HistoryArgs {
                    kind: "All".into(),
                    start: None,
                    end: None,
                },
                format: ReportFormat::Txt,
                output: None,
            },
        })
        .await
        .unwrap();
        let text =
            std::fs::read_to_string(dir.path().join("stockroom_report_2026-03-14.txt")).unwrap();
        assert!(text.starts_with("Stockroom - Inventory Report\nGenerated on: 2026-03-14 | Filter: All\n"));
        assert!(text.contains("3 pcs"));
    }

    #[tokio::test]
    async fn test_summary_lists_low_stock_and_recent_issues() {
        let ctx = context(StockroomConfig::default()).await;
        let before = ctx
            .execute(SessionCommand::Summary { recent: None })
            .await
            .unwrap();
        assert!(before.contains("Total items:  2"));
        assert!(before.contains("Low stock:    1"));
        assert!(before.contains("Recent issues\n(none)"));

        ctx.execute(issue(1, Some("Asha"))).await.unwrap();
        let after = ctx
            .execute(SessionCommand::Summary { recent: Some(1) })
            .await
            .unwrap();
        assert!(after.contains("Tissue Roll"));
        assert!(!after.contains("(none)"));
    }

    #[test]
    fn test_config_show_reports_saved_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockroom.toml");
        let endpoint = format!("sqlite://{}", dir.path().join("stock.db").display());

        config_command(
            Some(path.clone()),
            ConfigAction::SetEndpoint {
                endpoint: endpoint.clone(),
            },
        )
        .unwrap();

        let out = config_command(Some(path.clone()), ConfigAction::Show).unwrap();
        assert!(out.contains(&format!("Config file:   {}\n", path.display())));
        assert!(out.contains(&format!("Saved store:   {}", endpoint)));
    }
}
