use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Display metadata for a category label. The label itself stays a plain
/// string so providers and CSV files can introduce new ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
    /// Monthly budget target.
    pub target: Option<Money>,
}

/// Labels the UI has artwork for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownCategory {
    Income,
    Housing,
    Transport,
    Groceries,
    FoodAndDining,
    Shopping,
    Healthcare,
    Entertainment,
    BankingFees,
    Insurance,
    Utilities,
    Communications,
    Uncategorized,
}

impl KnownCategory {
    pub const ALL: [KnownCategory; 13] = [
        KnownCategory::Income,
        KnownCategory::Housing,
        KnownCategory::Transport,
        KnownCategory::Groceries,
        KnownCategory::FoodAndDining,
        KnownCategory::Shopping,
        KnownCategory::Healthcare,
        KnownCategory::Entertainment,
        KnownCategory::BankingFees,
        KnownCategory::Insurance,
        KnownCategory::Utilities,
        KnownCategory::Communications,
        KnownCategory::Uncategorized,
    ];

    /// Exact label match; unknown labels yield `None` and render with
    /// [`FALLBACK_ICON`] / [`FALLBACK_COLOR`].
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            KnownCategory::Income => "Income",
            KnownCategory::Housing => "Housing",
            KnownCategory::Transport => "Transport",
            KnownCategory::Groceries => "Groceries",
            KnownCategory::FoodAndDining => "Food & Dining",
            KnownCategory::Shopping => "Shopping",
            KnownCategory::Healthcare => "Healthcare",
            KnownCategory::Entertainment => "Entertainment",
            KnownCategory::BankingFees => "Banking Fees",
            KnownCategory::Insurance => "Insurance",
            KnownCategory::Utilities => "Utilities",
            KnownCategory::Communications => "Communications",
            KnownCategory::Uncategorized => "Uncategorized",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            KnownCategory::Income => "💰",
            KnownCategory::Housing => "🏠",
            KnownCategory::Transport => "🚗",
            KnownCategory::Groceries => "🛒",
            KnownCategory::FoodAndDining => "🍽️",
            KnownCategory::Shopping => "🛍️",
            KnownCategory::Healthcare => "🏥",
            KnownCategory::Entertainment => "🎬",
            KnownCategory::BankingFees => "🏛️",
            KnownCategory::Insurance => "🛡️",
            KnownCategory::Utilities => "💡",
            KnownCategory::Communications => "📱",
            KnownCategory::Uncategorized => FALLBACK_ICON,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            KnownCategory::Income => "bg-green-500",
            KnownCategory::Housing => "bg-blue-500",
            KnownCategory::Transport => "bg-yellow-500",
            KnownCategory::Groceries => "bg-green-600",
            KnownCategory::FoodAndDining => "bg-orange-500",
            KnownCategory::Shopping => "bg-purple-500",
            KnownCategory::Healthcare => "bg-red-500",
            KnownCategory::Entertainment => "bg-pink-500",
            KnownCategory::BankingFees => "bg-slate-500",
            KnownCategory::Insurance => "bg-gray-500",
            KnownCategory::Utilities => "bg-cyan-500",
            KnownCategory::Communications => "bg-indigo-500",
            KnownCategory::Uncategorized => FALLBACK_COLOR,
        }
    }

    /// Default monthly spending target in rand, for expense categories.
    pub fn monthly_target(self) -> Option<Money> {
        let rand = match self {
            KnownCategory::Housing => 14_300,
            KnownCategory::Groceries => 4_964,
            KnownCategory::Transport => 2_989,
            KnownCategory::Healthcare => 2_000,
            KnownCategory::Communications => 800,
            KnownCategory::Insurance => 1_344,
            KnownCategory::BankingFees => 747,
            KnownCategory::Entertainment => 300,
            KnownCategory::FoodAndDining => 800,
            KnownCategory::Shopping => 1_000,
            KnownCategory::Income | KnownCategory::Utilities | KnownCategory::Uncategorized => {
                return None
            }
        };
        Some(Money::from_cents(rand * 100))
    }

    fn subcategories(self) -> &'static [&'static str] {
        match self {
            KnownCategory::Income => &["Salary", "Interest", "Dividends", "Bonus"],
            KnownCategory::Housing => &["Rent", "Mortgage", "Property Tax", "Maintenance"],
            KnownCategory::Transport => &["Fuel", "Public Transport", "Ride Sharing", "Car Maintenance"],
            KnownCategory::Groceries => &["Food & Beverages", "Household Items", "Personal Care"],
            KnownCategory::FoodAndDining => &["Restaurants", "Fast Food", "Coffee", "Takeaway"],
            KnownCategory::Shopping => &["Clothing", "Electronics", "Online Shopping", "Gifts"],
            KnownCategory::Healthcare => &["Medical Aid", "Doctor Visits", "Pharmacy", "Dental"],
            KnownCategory::Entertainment => &["Movies", "Streaming", "Games", "Events", "Sports"],
            KnownCategory::BankingFees => &["Account Fees", "ATM Fees", "Card Fees"],
            KnownCategory::Insurance => &["Life", "Vehicle", "Household"],
            KnownCategory::Utilities => &["Electricity", "Water", "Rates & Taxes"],
            KnownCategory::Communications => &["Mobile", "Internet"],
            KnownCategory::Uncategorized => &[],
        }
    }
}

impl fmt::Display for KnownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const FALLBACK_ICON: &str = "❓";
pub const FALLBACK_COLOR: &str = "bg-gray-400";

pub fn icon_for(label: &str) -> &'static str {
    KnownCategory::from_label(label).map_or(FALLBACK_ICON, KnownCategory::icon)
}

pub fn color_for(label: &str) -> &'static str {
    KnownCategory::from_label(label).map_or(FALLBACK_COLOR, KnownCategory::color)
}

/// One entry per known label, in display order.
pub fn default_categories() -> Vec<Category> {
    KnownCategory::ALL
        .into_iter()
        .enumerate()
        .map(|(i, known)| Category {
            id: (i + 1).to_string(),
            name: known.label().to_string(),
            icon: known.icon().to_string(),
            color: known.color().to_string(),
            subcategories: known.subcategories().iter().map(|s| s.to_string()).collect(),
            target: known.monthly_target(),
        })
        .collect()
}
