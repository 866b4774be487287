use anyhow::Result;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use super::util::cycle;
use crate::db::Database;
use crate::import::{
    self, AmountStyle, ColumnMapping, DateOrder, DelimiterMode, Field, FormatConfig,
    ImportProfile, ImportResult, Lookups, NormalizedBatch, ParsedFile, TypeRule,
};
use crate::models::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Import,
    Review,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Import, Self::Review]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import => write!(f, "Import"),
            Self::Review => write!(f, "Review"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Filter,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Filter => write!(f, "FILTER"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// The three phases of an import: pick a file, configure it, see the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImportStep {
    SelectFile,
    Configure,
    Report,
}

impl std::fmt::Display for ImportStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelectFile => write!(f, "Select File"),
            Self::Configure => write!(f, "Configure"),
            Self::Report => write!(f, "Report"),
        }
    }
}

/// One editable line of the configuration panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigRow {
    Column(Field),
    Delimiter,
    DateOrder,
    AmountStyle,
    TypeRule,
    DefaultAccount,
}

impl ConfigRow {
    pub(crate) fn all() -> Vec<ConfigRow> {
        let mut rows: Vec<ConfigRow> = Field::all().iter().map(|f| Self::Column(*f)).collect();
        rows.extend([
            Self::Delimiter,
            Self::DateOrder,
            Self::AmountStyle,
            Self::TypeRule,
            Self::DefaultAccount,
        ]);
        rows
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Column(field) => field.label(),
            Self::Delimiter => "Delimiter",
            Self::DateOrder => "Date order",
            Self::AmountStyle => "Amount style",
            Self::TypeRule => "Type rule",
            Self::DefaultAccount => "Default account",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    ExecuteImport,
    DeleteProfile { name: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    // Reference data
    pub(crate) accounts: Vec<Account>,
    pub(crate) profiles: Vec<ImportProfile>,
    pub(crate) lookups: Lookups,

    // Import wizard
    pub(crate) import_step: ImportStep,
    pub(crate) import_path: Option<PathBuf>,
    pub(crate) import_text: String,
    pub(crate) import_file: ParsedFile,
    pub(crate) import_mapping: ColumnMapping,
    pub(crate) import_config: FormatConfig,
    pub(crate) import_preview: NormalizedBatch,
    pub(crate) import_result: Option<ImportResult>,
    pub(crate) config_index: usize,
    pub(crate) preview_scroll: usize,

    // File browser
    pub(crate) file_browser_path: PathBuf,
    pub(crate) file_browser_entries: Vec<PathBuf>,
    pub(crate) file_browser_index: usize,
    pub(crate) file_browser_scroll: usize,
    pub(crate) file_browser_filter: String,
    pub(crate) file_browser_show_hidden: bool,

    // Review
    pub(crate) review_from: Option<NaiveDate>,
    pub(crate) review_to: Option<NaiveDate>,
    pub(crate) review_account: Option<i64>,
    pub(crate) review_transactions: Vec<Transaction>,
    pub(crate) review_index: usize,
    pub(crate) review_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            running: true,
            screen: Screen::Import,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,

            accounts: Vec::new(),
            profiles: Vec::new(),
            lookups: Lookups::default(),

            import_step: ImportStep::SelectFile,
            import_path: None,
            import_text: String::new(),
            import_file: ParsedFile::default(),
            import_mapping: ColumnMapping::default(),
            import_config: FormatConfig::default(),
            import_preview: NormalizedBatch::default(),
            import_result: None,
            config_index: 0,
            preview_scroll: 0,

            file_browser_path: directories::UserDirs::new()
                .map(|d| d.home_dir().to_path_buf())
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"))),
            file_browser_entries: Vec::new(),
            file_browser_index: 0,
            file_browser_scroll: 0,
            file_browser_filter: String::new(),
            file_browser_show_hidden: false,

            review_from: None,
            review_to: None,
            review_account: None,
            review_transactions: Vec::new(),
            review_index: 0,
            review_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn refresh_reference_data(&mut self, db: &Database) -> Result<()> {
        self.accounts = db.get_accounts()?;
        self.profiles = db.get_profiles()?;
        self.lookups = db.lookups()?;
        Ok(())
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.refresh_reference_data(db)?;
        self.refresh_review(db)?;
        Ok(())
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    pub(crate) fn account_name(&self, id: i64) -> &str {
        self.lookups.accounts.name_of(id).unwrap_or("?")
    }

    // ── Import wizard ────────────────────────────────────────

    /// Load a statement and move to the configuration phase with a guessed
    /// mapping and a fresh preview.
    pub(crate) fn load_import_file(&mut self, path: &Path) -> Result<()> {
        let text = import::read_statement(path)?;
        let file = import::parse_text(&text, DelimiterMode::Auto);
        if file.headers.is_empty() {
            anyhow::bail!("{} is empty", path.display());
        }

        let mapping = import::suggest_mapping(&file.headers);
        let date_order = import::suggest_date_order(file.column_values(&mapping, Field::Date))
            .unwrap_or_default();
        let default_account_id = match self.accounts.as_slice() {
            [only] => only.id,
            _ => None,
        };

        self.import_config = FormatConfig {
            date_order,
            default_account_id,
            ..FormatConfig::default()
        };
        self.import_mapping = mapping;
        self.import_text = text;
        self.import_file = file;
        self.import_path = Some(path.to_path_buf());
        self.import_result = None;
        self.config_index = 0;
        self.rebuild_preview();
        self.import_step = ImportStep::Configure;

        let mapped = self.import_mapping.iter().count();
        self.set_status(format!(
            "{} rows, {mapped} columns recognised. Adjust with +/-, Enter to import",
            self.import_file.rows.len()
        ));
        Ok(())
    }

    /// Normalize the loaded file with the current settings. Nothing is written.
    pub(crate) fn rebuild_preview(&mut self) {
        self.import_preview = import::normalize(
            &self.import_file,
            &self.import_mapping,
            &self.import_config,
            &self.lookups,
        );
        self.preview_scroll = 0;
    }

    fn reparse(&mut self) {
        self.import_file = import::parse_text(&self.import_text, self.import_config.delimiter);
    }

    pub(crate) fn selected_config_row(&self) -> Option<ConfigRow> {
        ConfigRow::all().get(self.config_index).copied()
    }

    /// Display value of a configuration row.
    pub(crate) fn config_value(&self, row: ConfigRow) -> String {
        match row {
            ConfigRow::Column(field) => self
                .import_mapping
                .get(field)
                .map(str::to_string)
                .unwrap_or_else(|| "—".into()),
            ConfigRow::Delimiter => match self.import_config.delimiter {
                DelimiterMode::Auto => format!("auto ({:?})", self.import_file.delimiter),
                other => other.to_string(),
            },
            ConfigRow::DateOrder => self.import_config.date_order.to_string(),
            ConfigRow::AmountStyle => self.import_config.amount_style.to_string(),
            ConfigRow::TypeRule => self.import_config.type_rule.to_string(),
            ConfigRow::DefaultAccount => self
                .import_config
                .default_account_id
                .map(|id| self.account_name(id).to_string())
                .unwrap_or_else(|| "—".into()),
        }
    }

    /// Cycle the selected configuration row and refresh the preview.
    pub(crate) fn adjust_config(&mut self, delta: i32) {
        let Some(row) = self.selected_config_row() else {
            return;
        };
        match row {
            ConfigRow::Column(field) => {
                let mut options: Vec<Option<String>> = vec![None];
                options.extend(self.import_file.headers.iter().cloned().map(Some));
                let current = self.import_mapping.get(field).map(str::to_string);
                match cycle(&options, &current, delta).flatten() {
                    Some(header) => self.import_mapping.set(field, header),
                    None => self.import_mapping.clear(field),
                }
            }
            ConfigRow::Delimiter => {
                if let Some(next) =
                    cycle(DelimiterMode::all(), &self.import_config.delimiter, delta)
                {
                    self.import_config.delimiter = next;
                    self.reparse();
                }
            }
            ConfigRow::DateOrder => {
                if let Some(next) = cycle(DateOrder::all(), &self.import_config.date_order, delta) {
                    self.import_config.date_order = next;
                }
            }
            ConfigRow::AmountStyle => {
                if let Some(next) =
                    cycle(AmountStyle::all(), &self.import_config.amount_style, delta)
                {
                    self.import_config.amount_style = next;
                }
            }
            ConfigRow::TypeRule => {
                if let Some(next) = cycle(TypeRule::all(), &self.import_config.type_rule, delta) {
                    self.import_config.type_rule = next;
                }
            }
            ConfigRow::DefaultAccount => {
                let mut options: Vec<Option<i64>> = vec![None];
                options.extend(self.accounts.iter().filter_map(|a| a.id).map(Some));
                if let Some(next) = cycle(&options, &self.import_config.default_account_id, delta) {
                    self.import_config.default_account_id = next;
                }
            }
        }
        self.rebuild_preview();
    }

    pub(crate) fn apply_profile(&mut self, profile: &ImportProfile) {
        let reparse = profile.config.delimiter != self.import_config.delimiter;
        self.import_mapping = profile.mapping.clone();
        self.import_config = profile.config.clone();
        if reparse {
            self.reparse();
        }
        self.rebuild_preview();
    }

    pub(crate) fn current_profile(&self, name: &str) -> ImportProfile {
        ImportProfile {
            name: name.trim().to_string(),
            mapping: self.import_mapping.clone(),
            config: self.import_config.clone(),
        }
    }

    /// Persist the previewed batch, then point the Review tab at the imported window.
    pub(crate) fn execute_import(&mut self, db: &mut Database) -> Result<ImportResult> {
        // Names may have been added since the preview was built
        self.refresh_reference_data(db)?;
        self.rebuild_preview();

        let result = import::execute(&self.import_preview, &self.lookups, db)?;
        self.import_result = Some(result);
        self.import_step = ImportStep::Report;

        self.review_from = result.min_date;
        self.review_to = result.max_date;
        self.review_account = if self.import_mapping.is_mapped(Field::AccountId) {
            None
        } else {
            self.import_config.default_account_id
        };
        self.refresh_review(db)?;
        self.set_status(format!(
            "Imported {} transactions ({} skipped, {} dropped)",
            result.inserted, result.skipped, result.dropped
        ));
        Ok(result)
    }

    pub(crate) fn reset_import(&mut self) {
        self.import_step = ImportStep::SelectFile;
        self.import_result = None;
        self.refresh_file_browser();
    }

    // ── Review ───────────────────────────────────────────────

    pub(crate) fn refresh_review(&mut self, db: &Database) -> Result<()> {
        self.review_transactions = match (self.review_from, self.review_to) {
            (Some(from), Some(to)) => db.get_transactions_in_window(from, to, self.review_account)?,
            _ => Vec::new(),
        };
        if self.review_index >= self.review_transactions.len() {
            self.review_index = self.review_transactions.len().saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn cycle_review_account(&mut self, db: &Database) -> Result<()> {
        let mut options: Vec<Option<i64>> = vec![None];
        options.extend(self.accounts.iter().filter_map(|a| a.id).map(Some));
        if let Some(next) = cycle(&options, &self.review_account, 1) {
            self.review_account = next;
        }
        self.review_index = 0;
        self.review_scroll = 0;
        self.refresh_review(db)?;
        let label = self
            .review_account
            .map(|id| self.account_name(id).to_string())
            .unwrap_or_else(|| "all accounts".into());
        self.set_status(format!("Showing {label}"));
        Ok(())
    }

    // ── File browser ─────────────────────────────────────────

    pub(crate) fn refresh_file_browser(&mut self) {
        let mut entries: Vec<PathBuf> = Vec::new();

        if let Some(parent) = self.file_browser_path.parent() {
            entries.push(parent.to_path_buf());
        }

        if let Ok(read_dir) = std::fs::read_dir(&self.file_browser_path) {
            let is_hidden = |p: &PathBuf| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'))
            };

            let all: Vec<PathBuf> = read_dir
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    (self.file_browser_show_hidden || !is_hidden(p))
                        && (p.is_dir()
                            || p.extension().and_then(|e| e.to_str()).is_some_and(|ext| {
                                matches!(ext.to_ascii_lowercase().as_str(), "csv" | "txt")
                            }))
                })
                .collect();

            let (mut dirs, mut files): (Vec<PathBuf>, Vec<PathBuf>) =
                all.into_iter().partition(|p| p.is_dir());
            dirs.sort();
            files.sort();
            entries.extend(dirs);
            entries.extend(files);
        }

        self.file_browser_entries = entries;
        self.file_browser_index = 0;
        self.file_browser_scroll = 0;
        self.file_browser_filter.clear();
    }

    /// Indices into `file_browser_entries` matching the filter. `..` always matches.
    pub(crate) fn file_browser_filtered(&self) -> Vec<usize> {
        if self.file_browser_filter.is_empty() {
            return (0..self.file_browser_entries.len()).collect();
        }
        let filter = self.file_browser_filter.to_lowercase();
        self.file_browser_entries
            .iter()
            .enumerate()
            .filter(|(_, path)| {
                Some(path.as_path()) == self.file_browser_path.parent()
                    || path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|name| name.to_lowercase().contains(&filter))
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn selected_browser_entry(&self) -> Option<PathBuf> {
        let filtered = self.file_browser_filtered();
        filtered
            .get(self.file_browser_index)
            .and_then(|&i| self.file_browser_entries.get(i))
            .cloned()
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
