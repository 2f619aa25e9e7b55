//! Report

use std::{fmt::Write, io};

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    lifecycle::{Action, Role},
    status::{Locale, TransactionStatus},
    transactions::Transaction,
};

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable summary of a transaction and its history.
#[derive(Debug, Clone, Copy)]
pub struct TransactionReport<'a> {
    transaction: &'a Transaction,
    locale: Locale,
}

impl<'a> TransactionReport<'a> {
    /// Report on `transaction` with labels in `locale`.
    pub fn new(transaction: &'a Transaction, locale: Locale) -> Self {
        Self {
            transaction,
            locale,
        }
    }

    /// Writes the history table followed by the status and price summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Time", "Status", "Description"]);

        let mut color_ops = Vec::with_capacity(self.transaction.history().len());

        for (idx, entry) in self.transaction.history().iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                entry.at.strftime("%Y-%m-%d %H:%M").to_string(),
                entry.status.label(self.locale).to_string(),
                entry.description(self.locale),
            ]);

            if let Some(color) = status_color(entry.status) {
                color_ops.push((idx + 1, 2, color));
            }
        }

        write_table(&mut out, builder, color_ops)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        let transaction = self.transaction;
        let not_set = "-".to_string();

        let progress = transaction
            .progress_percent()
            .map_or_else(
                || not_set.clone(),
                |percent| format!("{:.1}%", percent.round_dp(1)),
            );

        let unit_price = transaction.unit_price().map_or_else(
            || not_set.clone(),
            |price| format!("{price} / {}", transaction.unit()),
        );

        let total = transaction
            .total_price()
            .map_or_else(|| not_set.clone(), ToString::to_string);

        let shipping = transaction
            .shipping_status()
            .map_or_else(
                || not_set.clone(),
                |status| status.label(self.locale).to_string(),
            );

        let lines = [
            (
                " Commodity:",
                format!(
                    "{} {} {}",
                    transaction.commodity(),
                    transaction.quantity(),
                    transaction.unit()
                ),
            ),
            (" Status:", transaction.status().label(self.locale).to_string()),
            (" Progress:", progress),
            (" Unit price:", unit_price),
            (" Total:", total),
            (" Shipping:", shipping),
        ];

        let label_width = lines
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or_default();

        for (label, value) in &lines {
            writeln!(out, "{label:>label_width$}  {value}").map_err(|_err| ReportError::IO)?;
        }

        if let Some(tracking) = &transaction.shipment().tracking_number {
            writeln!(out, "{:>label_width$}  {tracking}", " Tracking:")
                .map_err(|_err| ReportError::IO)?;
        }

        writeln!(out).map_err(|_err| ReportError::IO)
    }
}

/// Printable table of the lifecycle actions and who may take them.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    locale: Locale,
}

impl TransitionTable {
    /// Table with status labels in `locale`.
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Writes the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        let mut builder = Builder::default();

        builder.push_record(["Action", "From", "To", "Performed by"]);

        for action in Action::ALL {
            let sources: Vec<&str> = action
                .sources()
                .iter()
                .map(|status| status.label(self.locale))
                .collect();

            let roles: Vec<String> = [Role::Farmer, Role::Buyer]
                .into_iter()
                .filter(|role| action.allowed_for(*role))
                .map(|role| role.to_string())
                .collect();

            builder.push_record([
                action.to_string(),
                sources.join("\n"),
                action.target().label(self.locale).to_string(),
                roles.join(", "),
            ]);
        }

        write_table(&mut out, builder, Vec::new())?;

        writeln!(out).map_err(|_err| ReportError::IO)
    }
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    color_ops: Vec<(usize, usize, Color)>,
) -> Result<(), ReportError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::first(), color_dark_grey());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReportError::IO)
}

/// Highlight for the end states; intermediate statuses keep the default color.
fn status_color(status: TransactionStatus) -> Option<Color> {
    match status {
        TransactionStatus::Selesai => Some(Color::FG_GREEN),
        TransactionStatus::Dibatalkan => Some(Color::FG_RED),
        _ => None,
    }
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
