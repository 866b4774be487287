use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::import::{
    AmountStyle, ColumnMapping, DateOrder, DelimiterMode, Field, FormatConfig, ImportProfile,
    TypeRule,
};

impl Database {
    /// Insert or replace a named import profile with its column mapping.
    pub(crate) fn save_profile(&mut self, profile: &ImportProfile) -> Result<()> {
        let name = profile.name.trim();
        if name.is_empty() {
            anyhow::bail!("Profile name cannot be empty");
        }
        let config = &profile.config;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO import_profiles (name, delimiter, date_order, amount_style, type_rule, default_account_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(name) DO UPDATE SET
                delimiter = excluded.delimiter,
                date_order = excluded.date_order,
                amount_style = excluded.amount_style,
                type_rule = excluded.type_rule,
                default_account_id = excluded.default_account_id",
            params![
                name,
                config.delimiter.as_str(),
                config.date_order.as_str(),
                config.amount_style.as_str(),
                config.type_rule.as_str(),
                config.default_account_id,
            ],
        )
        .with_context(|| format!("Failed to save profile '{name}'"))?;
        tx.execute(
            "DELETE FROM import_profile_columns WHERE profile_name = ?1",
            params![name],
        )?;
        for (field, header) in profile.mapping.iter() {
            tx.execute(
                "INSERT INTO import_profile_columns (profile_name, field, header) VALUES (?1, ?2, ?3)",
                params![name, field.key(), header],
            )?;
        }
        tx.commit()?;
        log::info!("Saved import profile '{name}'");
        Ok(())
    }

    pub(crate) fn get_profile(&self, name: &str) -> Result<Option<ImportProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT name, delimiter, date_order, amount_style, type_rule, default_account_id
                 FROM import_profiles WHERE name = ?1",
                params![name.trim()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<i64>>(5)?,
                    ))
                },
            )
            .optional()?;
        let Some((name, delimiter, date_order, amount_style, type_rule, default_account_id)) = row
        else {
            return Ok(None);
        };

        // Values written by older builds fall back to defaults instead of failing
        let config = FormatConfig {
            delimiter: DelimiterMode::parse(&delimiter).unwrap_or_default(),
            date_order: DateOrder::parse(&date_order).unwrap_or_default(),
            amount_style: AmountStyle::parse(&amount_style).unwrap_or_default(),
            type_rule: TypeRule::parse(&type_rule).unwrap_or_default(),
            default_account_id,
        };

        let mut stmt = self.conn.prepare(
            "SELECT field, header FROM import_profile_columns WHERE profile_name = ?1",
        )?;
        let columns = stmt
            .query_map(params![name], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut mapping = ColumnMapping::default();
        for (key, header) in columns {
            match Field::parse(&key) {
                Some(field) => mapping.set(field, header),
                None => log::warn!("Profile '{name}': ignoring unknown field '{key}'"),
            }
        }

        Ok(Some(ImportProfile {
            name,
            mapping,
            config,
        }))
    }

    pub(crate) fn get_profiles(&self) -> Result<Vec<ImportProfile>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM import_profiles ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut profiles = Vec::with_capacity(names.len());
        for name in names {
            if let Some(profile) = self.get_profile(&name)? {
                profiles.push(profile);
            }
        }
        Ok(profiles)
    }

    /// Returns false when no profile had that name.
    pub(crate) fn delete_profile(&self, name: &str) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM import_profiles WHERE name = ?1",
            params![name.trim()],
        )?;
        Ok(n > 0)
    }
}
