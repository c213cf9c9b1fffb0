//! These structs provide the CLI interface for the cuan CLI.

use crate::config::DEFAULT_API_URL;
use crate::export::ExportFormat;
use crate::model::{Amount, TransactionKind};
use crate::report::{KindFilter, Period};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// cuan: CuanBook, a bookkeeping tool for small businesses.
///
/// Record income and expenses against your CuanBook account, then see where the money went:
/// dashboard totals, daily/weekly/monthly/yearly reports, a category breakdown and PDF or CSV
/// exports.
///
/// Start with `cuan init`, then `cuan register` (once) and `cuan login`.
#[derive(Debug, Parser, Clone)]
#[command(name = "cuan")]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the CuanBook home directory and its config file.
    ///
    /// The home directory defaults to $HOME/cuanbook. Pass --cuan-home (or set CUANBOOK_HOME) to
    /// put it somewhere else. --api-url points the CLI at your CuanBook backend.
    Init(InitArgs),
    /// Create a new account.
    Register(RegisterArgs),
    /// Log in and remember the session for later commands.
    Login(LoginArgs),
    /// Forget the saved session.
    Logout,
    /// List, add or set up transaction categories.
    Categories(CategoriesArgs),
    /// Record or list transactions.
    Tx(TxArgs),
    /// Show income, expense and balance for a period.
    Summary(SummaryArgs),
    /// Show a period broken into buckets, with the trend against the previous period.
    Report(ReportArgs),
    /// Show how each category contributed to a period's income and expense.
    Breakdown(BreakdownArgs),
    /// Write a period's report to a PDF or CSV file.
    Export(ExportArgs),
    /// Show or change the business profile printed on exported reports.
    Profile(ProfileArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where CuanBook keeps its config, session and exports. Defaults to ~/cuanbook
    #[arg(long, env = "CUANBOOK_HOME", default_value_t = default_cuan_home())]
    cuan_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, cuan_home: PathBuf) -> Self {
        Self {
            log_level,
            cuan_home: cuan_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn cuan_home(&self) -> &DisplayPath {
        &self.cuan_home
    }
}

/// (Not shown): Args for the `cuan init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Base URL of the CuanBook REST backend.
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,
}

impl InitArgs {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// (Not shown): Args for the `cuan register` command.
#[derive(Debug, Parser, Clone)]
pub struct RegisterArgs {
    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,

    /// Must repeat --password exactly.
    #[arg(long)]
    confirm: String,
}

impl RegisterArgs {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            confirm: confirm.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn confirm(&self) -> &str {
        &self.confirm
    }
}

/// (Not shown): Args for the `cuan login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,
}

impl LoginArgs {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// (Not shown): Args for the `cuan categories` command.
#[derive(Debug, Parser, Clone)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    command: CategoriesCommand,
}

impl CategoriesArgs {
    pub fn new(command: CategoriesCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &CategoriesCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategoriesCommand {
    /// List your categories.
    List {
        /// Only list categories of this kind: income or expense.
        #[arg(long)]
        kind: Option<TransactionKind>,
    },
    /// Add a category.
    Add {
        #[arg(long)]
        name: String,

        /// income or expense
        #[arg(long)]
        kind: TransactionKind,
    },
    /// Create the starter categories. Does nothing if you already have categories.
    Setup,
}

/// (Not shown): Args for the `cuan tx` command.
#[derive(Debug, Parser, Clone)]
pub struct TxArgs {
    #[command(subcommand)]
    command: TxCommand,
}

impl TxArgs {
    pub fn new(command: TxCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &TxCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum TxCommand {
    /// Record a transaction.
    Add(TxAddArgs),
    /// List transactions, newest first.
    List(TxListArgs),
}

/// (Not shown): Args for the `cuan tx add` command.
#[derive(Debug, Parser, Clone)]
pub struct TxAddArgs {
    /// income or expense
    #[arg(long)]
    kind: TransactionKind,

    /// A positive amount in rupiah, e.g. 150000
    #[arg(long)]
    amount: Amount,

    /// The day of the transaction as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// The id of the category, see `cuan categories list`.
    #[arg(long)]
    category_id: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    description: Option<String>,
}

impl TxAddArgs {
    pub fn new(
        kind: TransactionKind,
        amount: Amount,
        date: Option<NaiveDate>,
        category_id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            kind,
            amount,
            date,
            category_id: category_id.into(),
            name: name.into(),
            description,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// (Not shown): Args for the `cuan tx list` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct TxListArgs {
    /// Only list transactions of this kind: income or expense.
    #[arg(long)]
    kind: Option<TransactionKind>,

    /// First day to include, YYYY-MM-DD.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day to include, YYYY-MM-DD.
    #[arg(long)]
    end: Option<NaiveDate>,

    /// The maximum number of transactions to list.
    #[arg(long)]
    limit: Option<u32>,

    /// Only list transactions whose name contains this text, ignoring case.
    #[arg(long)]
    search: Option<String>,
}

impl TxListArgs {
    pub fn new(
        kind: Option<TransactionKind>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        limit: Option<u32>,
        search: Option<String>,
    ) -> Self {
        Self {
            kind,
            start,
            end,
            limit,
            search,
        }
    }

    pub fn kind(&self) -> Option<TransactionKind> {
        self.kind
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// Which period to look at. Shared by the reporting commands.
#[derive(Debug, Default, Parser, Clone)]
pub struct PeriodArgs {
    /// daily, weekly, monthly or yearly
    #[arg(long, default_value_t = Period::Monthly)]
    period: Period,

    /// Any day inside the period, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl PeriodArgs {
    pub fn new(period: Period, date: Option<NaiveDate>) -> Self {
        Self { period, date }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// The reference day: `--date`, or today in local time.
    pub fn reference(&self) -> NaiveDate {
        self.date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// (Not shown): Args for the `cuan summary` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct SummaryArgs {
    #[clap(flatten)]
    period: PeriodArgs,
}

impl SummaryArgs {
    pub fn new(period: PeriodArgs) -> Self {
        Self { period }
    }

    pub fn period(&self) -> &PeriodArgs {
        &self.period
    }
}

/// (Not shown): Args for the `cuan report` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ReportArgs {
    #[clap(flatten)]
    period: PeriodArgs,

    /// Which transactions to total: income, expense or net
    #[arg(long, default_value_t = KindFilter::Net)]
    kind: KindFilter,

    /// Print the report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl ReportArgs {
    pub fn new(period: PeriodArgs, kind: KindFilter, json: bool) -> Self {
        Self { period, kind, json }
    }

    pub fn period(&self) -> &PeriodArgs {
        &self.period
    }

    pub fn kind(&self) -> KindFilter {
        self.kind
    }

    pub fn json(&self) -> bool {
        self.json
    }
}

/// (Not shown): Args for the `cuan breakdown` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct BreakdownArgs {
    #[clap(flatten)]
    period: PeriodArgs,

    /// Ask the backend's category report endpoint instead of computing the shares from the
    /// period's transactions. Yearly periods are always computed locally.
    #[arg(long)]
    server: bool,

    /// Print the breakdown as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl BreakdownArgs {
    pub fn new(period: PeriodArgs, server: bool, json: bool) -> Self {
        Self {
            period,
            server,
            json,
        }
    }

    pub fn period(&self) -> &PeriodArgs {
        &self.period
    }

    pub fn server(&self) -> bool {
        self.server
    }

    pub fn json(&self) -> bool {
        self.json
    }
}

/// (Not shown): Args for the `cuan export` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    period: PeriodArgs,

    /// pdf or csv
    #[arg(long, default_value_t = ExportFormat::Pdf)]
    format: ExportFormat,

    /// Where to write the file. Defaults to a dated file name in $CUANBOOK_HOME/exports
    #[arg(long)]
    out: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(period: PeriodArgs, format: ExportFormat, out: Option<PathBuf>) -> Self {
        Self {
            period,
            format,
            out,
        }
    }

    pub fn period(&self) -> &PeriodArgs {
        &self.period
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }
}

/// (Not shown): Args for the `cuan profile` command.
#[derive(Debug, Parser, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    command: ProfileCommand,
}

impl ProfileArgs {
    pub fn new(command: ProfileCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &ProfileCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommand {
    /// Print the business profile.
    Show,
    /// Change one or more profile fields.
    Set(ProfileSetArgs),
}

/// (Not shown): Args for the `cuan profile set` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ProfileSetArgs {
    #[arg(long)]
    business_name: Option<String>,

    #[arg(long)]
    owner_name: Option<String>,

    /// A phone number such as 081234567890 or +6281234567890
    #[arg(long)]
    contact: Option<String>,

    #[arg(long)]
    email: Option<String>,
}

impl ProfileSetArgs {
    pub fn new(
        business_name: Option<String>,
        owner_name: Option<String>,
        contact: Option<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            business_name,
            owner_name,
            contact,
            email,
        }
    }

    pub fn business_name(&self) -> Option<&str> {
        self.business_name.as_deref()
    }

    pub fn owner_name(&self) -> Option<&str> {
        self.owner_name.as_deref()
    }

    pub fn contact(&self) -> Option<&str> {
        self.contact.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

fn default_cuan_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("cuanbook"),
        None => {
            error!(
                "Unable to find your home directory. Pass --cuan-home or set CUANBOOK_HOME \
                instead of relying on the default location. Continuing with './cuanbook'.",
            );
            PathBuf::from("cuanbook")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("cuan").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_tx_add() {
        let args = parse(&[
            "--cuan-home",
            "/tmp/cuan",
            "tx",
            "add",
            "--kind",
            "expense",
            "--amount",
            "150000",
            "--date",
            "2024-01-12",
            "--category-id",
            "cat-1",
            "--name",
            "Listrik",
        ]);
        assert_eq!(args.common().cuan_home().path(), Path::new("/tmp/cuan"));
        let Command::Tx(tx) = args.command() else {
            panic!("expected tx, got {:?}", args.command());
        };
        let TxCommand::Add(add) = tx.command() else {
            panic!("expected tx add");
        };
        assert_eq!(add.kind(), TransactionKind::Expense);
        assert_eq!(add.amount(), Amount::from(150_000));
        assert_eq!(add.date(), NaiveDate::from_ymd_opt(2024, 1, 12));
        assert!(add.description().is_none());
    }

    #[test]
    fn test_parse_report_defaults() {
        let args = parse(&["report"]);
        let Command::Report(report) = args.command() else {
            panic!("expected report");
        };
        assert_eq!(report.period().period(), Period::Monthly);
        assert_eq!(report.kind(), KindFilter::Net);
        assert!(!report.json());
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
    }

    #[test]
    fn test_parse_export() {
        let args = parse(&[
            "export", "--period", "weekly", "--date", "2024-01-03", "--format", "csv",
        ]);
        let Command::Export(export) = args.command() else {
            panic!("expected export");
        };
        assert_eq!(export.period().period(), Period::Weekly);
        assert_eq!(export.format(), ExportFormat::Csv);
        assert!(export.out().is_none());
    }

    #[test]
    fn test_reject_bad_amount() {
        let result = Args::try_parse_from([
            "cuan",
            "tx",
            "add",
            "--kind",
            "income",
            "--amount",
            "banyak",
            "--category-id",
            "c",
            "--name",
            "n",
        ]);
        assert!(result.is_err());
    }
}
