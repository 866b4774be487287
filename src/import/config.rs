use std::collections::BTreeMap;

/// Canonical transaction fields a statement column can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Field {
    Date,
    Description,
    DescriptionExtra,
    Type,
    Amount,
    AccountId,
    ToAccountId,
    CategoryId,
    PayeeId,
    Status,
}

impl Field {
    pub(crate) fn all() -> &'static [Field] {
        &[
            Self::Date,
            Self::Description,
            Self::DescriptionExtra,
            Self::Type,
            Self::Amount,
            Self::AccountId,
            Self::ToAccountId,
            Self::CategoryId,
            Self::PayeeId,
            Self::Status,
        ]
    }

    pub(crate) fn key(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Description => "description",
            Self::DescriptionExtra => "description_extra",
            Self::Type => "type",
            Self::Amount => "amount",
            Self::AccountId => "account_id",
            Self::ToAccountId => "to_account_id",
            Self::CategoryId => "category_id",
            Self::PayeeId => "payee_id",
            Self::Status => "status",
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Description => "Description",
            Self::DescriptionExtra => "Extra Description",
            Self::Type => "Type",
            Self::Amount => "Amount",
            Self::AccountId => "Account",
            Self::ToAccountId => "To Account",
            Self::CategoryId => "Category",
            Self::PayeeId => "Payee",
            Self::Status => "Status",
        }
    }

    /// Accepts the canonical key plus a few short aliases used on the command line.
    pub(crate) fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace('-', "_");
        match key.as_str() {
            "date" => Some(Self::Date),
            "description" | "desc" => Some(Self::Description),
            "description_extra" | "extra" => Some(Self::DescriptionExtra),
            "type" => Some(Self::Type),
            "amount" => Some(Self::Amount),
            "account_id" | "account" => Some(Self::AccountId),
            "to_account_id" | "to_account" => Some(Self::ToAccountId),
            "category_id" | "category" => Some(Self::CategoryId),
            "payee_id" | "payee" => Some(Self::PayeeId),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// User-chosen association between canonical fields and the file's header names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ColumnMapping {
    columns: BTreeMap<Field, String>,
}

impl ColumnMapping {
    /// Map `field` onto `header`. An empty header unmaps the field.
    pub(crate) fn set(&mut self, field: Field, header: impl Into<String>) {
        let header = header.into();
        if header.is_empty() {
            self.columns.remove(&field);
        } else {
            self.columns.insert(field, header);
        }
    }

    pub(crate) fn clear(&mut self, field: Field) {
        self.columns.remove(&field);
    }

    pub(crate) fn get(&self, field: Field) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    pub(crate) fn is_mapped(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.columns.iter().map(|(f, h)| (*f, h.as_str()))
    }

    /// Resolve header names to column positions. Exact matches win; otherwise a
    /// trimmed, case-insensitive match is accepted. Unknown headers stay unmapped.
    pub(crate) fn resolve(&self, headers: &[String]) -> ResolvedColumns {
        let mut positions = BTreeMap::new();
        for (field, wanted) in &self.columns {
            let exact = headers.iter().position(|h| h == wanted);
            let loose = || {
                let wanted = wanted.trim().to_lowercase();
                headers
                    .iter()
                    .position(|h| h.trim().to_lowercase() == wanted)
            };
            if let Some(idx) = exact.or_else(loose) {
                positions.insert(*field, idx);
            }
        }
        ResolvedColumns { positions }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ResolvedColumns {
    positions: BTreeMap<Field, usize>,
}

impl ResolvedColumns {
    pub(crate) fn position(&self, field: Field) -> Option<usize> {
        self.positions.get(&field).copied()
    }

    pub(crate) fn is_mapped(&self, field: Field) -> bool {
        self.positions.contains_key(&field)
    }
}

macro_rules! config_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub(crate) enum $name {
            #[default]
            $($variant),+
        }

        impl $name {
            pub(crate) fn all() -> &'static [$name] {
                &[$(Self::$variant),+]
            }

            pub(crate) fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }

            pub(crate) fn parse(s: &str) -> Option<Self> {
                let wanted = s.trim();
                Self::all()
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

config_enum!(
    /// How the field separator is chosen.
    DelimiterMode {
        Auto => "auto",
        Comma => "comma",
        Semicolon => "semicolon",
    }
);

config_enum!(
    /// Component order for dates that are neither ISO nor slash-separated.
    DateOrder {
        Ymd => "Y-M-D",
        Dmy => "D-M-Y",
        Mdy => "M-D-Y",
    }
);

config_enum!(
    /// Which character is the decimal separator in amounts.
    AmountStyle {
        Auto => "auto",
        CommaDecimal => "comma-decimal",
        DotDecimal => "dot-decimal",
    }
);

config_enum!(
    /// Fallback classification for rows without a recognised type.
    TypeRule {
        BySign => "by-sign",
        ForceIncome => "force-income",
        ForceExpense => "force-expense",
    }
);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FormatConfig {
    pub(crate) delimiter: DelimiterMode,
    pub(crate) date_order: DateOrder,
    pub(crate) amount_style: AmountStyle,
    pub(crate) type_rule: TypeRule,
    pub(crate) default_account_id: Option<i64>,
}

/// A saved mapping + format pair, reusable across statements from the same bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportProfile {
    pub(crate) name: String,
    pub(crate) mapping: ColumnMapping,
    pub(crate) config: FormatConfig,
}
