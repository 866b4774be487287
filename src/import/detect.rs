use super::config::{ColumnMapping, DateOrder, Field};

/// Header names we recognise for each canonical field, lower-cased.
/// Earlier entries are preferred when a file has several candidates.
const SYNONYMS: &[(Field, &[&str])] = &[
    (
        Field::Date,
        &[
            "date",
            "data",
            "transaction date",
            "posted date",
            "posting date",
            "data lançamento",
            "data lancamento",
            "data da transação",
        ],
    ),
    (
        Field::Description,
        &[
            "description",
            "descrição",
            "descricao",
            "histórico",
            "historico",
            "lançamento",
            "lancamento",
            "memo",
            "details",
            "title",
        ],
    ),
    (
        Field::DescriptionExtra,
        &[
            "description_extra",
            "notes",
            "observação",
            "observacao",
            "complemento",
            "detalhes",
        ],
    ),
    (Field::Type, &["type", "tipo", "kind", "natureza"]),
    (
        Field::Amount,
        &["amount", "valor", "value", "quantia", "transaction amount", "valor (r$)"],
    ),
    (
        Field::AccountId,
        &["account_id", "account", "conta", "from account", "conta origem"],
    ),
    (
        Field::ToAccountId,
        &["to_account_id", "to account", "conta destino", "destino"],
    ),
    (Field::CategoryId, &["category_id", "category", "categoria"]),
    (
        Field::PayeeId,
        &["payee_id", "payee", "favorecido", "beneficiário", "beneficiario", "merchant"],
    ),
    (Field::Status, &["status", "situação", "situacao", "state"]),
];

/// Guess a column mapping from header names. Each header is used at most once.
pub(crate) fn suggest_mapping(headers: &[String]) -> ColumnMapping {
    let normalized: Vec<String> = headers
        .iter()
        .map(|s| s.to_lowercase().trim().to_string())
        .collect();
    let mut taken = vec![false; headers.len()];
    let mut mapping = ColumnMapping::default();

    for (field, names) in SYNONYMS {
        let hit = names.iter().find_map(|name| {
            normalized
                .iter()
                .enumerate()
                .position(|(i, h)| !taken[i] && h == name)
        });
        if let Some(idx) = hit {
            taken[idx] = true;
            mapping.set(*field, headers[idx].clone());
        }
    }

    mapping
}

/// Guess the component order of non-ISO, non-slash dates from sample values.
///
/// A leading component above 12 can only be a day; a middle one above 12 can
/// only be a day in month-first data; a four-digit leading component is a year.
/// Returns `None` when the samples don't settle it.
pub(crate) fn suggest_date_order<'a>(samples: impl IntoIterator<Item = &'a str>) -> Option<DateOrder> {
    for sample in samples {
        let parts: Vec<&str> = sample.trim().split(['-', '/', '.']).collect();
        if parts.len() != 3 {
            continue;
        }
        let nums: Vec<Option<u32>> = parts.iter().map(|p| p.parse().ok()).collect();
        let (Some(a), Some(b), Some(_)) = (nums[0], nums[1], nums[2]) else {
            continue;
        };
        if parts[0].len() == 4 {
            return Some(DateOrder::Ymd);
        }
        if a > 12 {
            return Some(DateOrder::Dmy);
        }
        if b > 12 {
            return Some(DateOrder::Mdy);
        }
    }
    None
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
