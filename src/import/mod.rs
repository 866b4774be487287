mod config;
mod detect;
mod lookup;
mod normalize;
mod pipeline;
mod row;
mod tokenize;

pub(crate) use config::{
    AmountStyle, ColumnMapping, DateOrder, DelimiterMode, Field, FormatConfig, ImportProfile,
    TypeRule,
};
pub(crate) use detect::{suggest_date_order, suggest_mapping};
pub(crate) use lookup::Lookups;
pub(crate) use pipeline::{
    execute, normalize, parse_text, read_statement, run_import, BatchOutcome, ImportResult,
    NormalizedBatch, ParsedFile, TransactionSink, TransferRequest,
};
pub(crate) use row::{NormalizedTransaction, TransferDescriptor};
