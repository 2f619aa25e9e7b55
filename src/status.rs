//! Statuses
//!
//! The transaction status set, its canonical order and the derived progress
//! percentage. Every screen that shows a status badge or progress bar reads
//! from here instead of keeping its own list.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display language for status labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    /// Bahasa Indonesia
    #[default]
    Indonesian,

    /// English
    English,
}

/// A status string that doesn't name any known status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

/// Lifecycle stage of a commodity-sale transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Waiting for the seller to confirm the request.
    MenungguKonfirmasi,

    /// Confirmed by the seller.
    Dikonfirmasi,

    /// Seller has set a price, under negotiation.
    Negosiasi,

    /// Terms agreed and payment recorded.
    Dibayar,

    /// Seller is preparing the shipment.
    PersiapanPengiriman,

    /// In transit.
    SedangDikirim,

    /// Marked delivered by the seller.
    SudahDikirim,

    /// Receipt confirmed by the buyer.
    Diterima,

    /// Completed.
    Selesai,

    /// Cancelled or declined.
    Dibatalkan,
}

impl TransactionStatus {
    /// The happy-path sequence, initial status first and `Selesai` last.
    ///
    /// `Dibatalkan` is not part of it.
    pub const ORDERED: [TransactionStatus; 9] = [
        TransactionStatus::MenungguKonfirmasi,
        TransactionStatus::Dikonfirmasi,
        TransactionStatus::Negosiasi,
        TransactionStatus::Dibayar,
        TransactionStatus::PersiapanPengiriman,
        TransactionStatus::SedangDikirim,
        TransactionStatus::SudahDikirim,
        TransactionStatus::Diterima,
        TransactionStatus::Selesai,
    ];

    /// Every status, including `Dibatalkan`.
    pub const ALL: [TransactionStatus; 10] = [
        TransactionStatus::MenungguKonfirmasi,
        TransactionStatus::Dikonfirmasi,
        TransactionStatus::Negosiasi,
        TransactionStatus::Dibayar,
        TransactionStatus::PersiapanPengiriman,
        TransactionStatus::SedangDikirim,
        TransactionStatus::SudahDikirim,
        TransactionStatus::Diterima,
        TransactionStatus::Selesai,
        TransactionStatus::Dibatalkan,
    ];

    /// The status every new transaction starts in.
    pub const INITIAL: TransactionStatus = TransactionStatus::MenungguKonfirmasi;

    /// Whether no further transition is possible.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            TransactionStatus::Selesai | TransactionStatus::Dibatalkan
        )
    }

    /// Whether the transaction is still in progress.
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// 1-based position in [`TransactionStatus::ORDERED`], `None` for `Dibatalkan`.
    pub fn position(self) -> Option<usize> {
        Self::ORDERED
            .iter()
            .position(|status| *status == self)
            .map(|index| index + 1)
    }

    /// Progress through the happy path as a percentage.
    ///
    /// `Selesai` is exactly 100. Cancelled transactions have no meaningful
    /// progress, so callers must handle `None` themselves.
    pub fn progress_percent(self) -> Option<Decimal> {
        let position = self.position()?;
        let steps = Decimal::from(Self::ORDERED.len());

        Decimal::from(position)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(steps))
    }

    /// Machine name, as stored and serialised.
    pub const fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::MenungguKonfirmasi => "menunggu_konfirmasi",
            TransactionStatus::Dikonfirmasi => "dikonfirmasi",
            TransactionStatus::Negosiasi => "negosiasi",
            TransactionStatus::Dibayar => "dibayar",
            TransactionStatus::PersiapanPengiriman => "persiapan_pengiriman",
            TransactionStatus::SedangDikirim => "sedang_dikirim",
            TransactionStatus::SudahDikirim => "sudah_dikirim",
            TransactionStatus::Diterima => "diterima",
            TransactionStatus::Selesai => "selesai",
            TransactionStatus::Dibatalkan => "dibatalkan",
        }
    }

    /// Human readable label.
    pub const fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (TransactionStatus::MenungguKonfirmasi, Locale::Indonesian) => "Menunggu Konfirmasi",
            (TransactionStatus::MenungguKonfirmasi, Locale::English) => "Awaiting Confirmation",
            (TransactionStatus::Dikonfirmasi, Locale::Indonesian) => "Dikonfirmasi",
            (TransactionStatus::Dikonfirmasi, Locale::English) => "Confirmed",
            (TransactionStatus::Negosiasi, Locale::Indonesian) => "Negosiasi",
            (TransactionStatus::Negosiasi, Locale::English) => "Negotiating",
            (TransactionStatus::Dibayar, Locale::Indonesian) => "Dibayar",
            (TransactionStatus::Dibayar, Locale::English) => "Paid",
            (TransactionStatus::PersiapanPengiriman, Locale::Indonesian) => "Persiapan Pengiriman",
            (TransactionStatus::PersiapanPengiriman, Locale::English) => "Preparing Shipment",
            (TransactionStatus::SedangDikirim, Locale::Indonesian) => "Sedang Dikirim",
            (TransactionStatus::SedangDikirim, Locale::English) => "In Transit",
            (TransactionStatus::SudahDikirim, Locale::Indonesian) => "Sudah Dikirim",
            (TransactionStatus::SudahDikirim, Locale::English) => "Shipped",
            (TransactionStatus::Diterima, Locale::Indonesian) => "Diterima",
            (TransactionStatus::Diterima, Locale::English) => "Received",
            (TransactionStatus::Selesai, Locale::Indonesian) => "Selesai",
            (TransactionStatus::Selesai, Locale::English) => "Completed",
            (TransactionStatus::Dibatalkan, Locale::Indonesian) => "Dibatalkan",
            (TransactionStatus::Dibatalkan, Locale::English) => "Cancelled",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Physical delivery progress, tracked alongside the main status once shipping starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    /// Shipment is being prepared but hasn't left.
    BelumDikirim,

    /// In transit.
    SedangDikirim,

    /// Delivered.
    SudahDikirim,

    /// Received by the buyer.
    Diterima,
}

impl ShippingStatus {
    /// Machine name, as stored and serialised.
    pub const fn as_str(self) -> &'static str {
        match self {
            ShippingStatus::BelumDikirim => "belum_dikirim",
            ShippingStatus::SedangDikirim => "sedang_dikirim",
            ShippingStatus::SudahDikirim => "sudah_dikirim",
            ShippingStatus::Diterima => "diterima",
        }
    }

    /// Human readable label.
    pub const fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (ShippingStatus::BelumDikirim, Locale::Indonesian) => "Belum Dikirim",
            (ShippingStatus::BelumDikirim, Locale::English) => "Not Shipped",
            (ShippingStatus::SedangDikirim, Locale::Indonesian) => "Sedang Dikirim",
            (ShippingStatus::SedangDikirim, Locale::English) => "Shipping",
            (ShippingStatus::SudahDikirim, Locale::Indonesian) => "Terkirim",
            (ShippingStatus::SudahDikirim, Locale::English) => "Delivered",
            (ShippingStatus::Diterima, Locale::Indonesian) => "Diterima",
            (ShippingStatus::Diterima, Locale::English) => "Received",
        }
    }
}

impl fmt::Display for ShippingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
