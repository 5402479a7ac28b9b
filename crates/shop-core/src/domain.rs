//! Retail domain enumerations: catalog categories, customer segments, and
//! staff roles with their service coefficients.

use std::fmt;

use crate::Money;

// ── Category ──────────────────────────────────────────────────────────────────

/// Catalog category of a title.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    Fiction,
    Mystery,
    Romance,
    Fantasy,
    Science,
    Technology,
    History,
    Biography,
    Children,
    Textbook,
    Reference,
    NonFiction,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Fiction,
        Category::Mystery,
        Category::Romance,
        Category::Fantasy,
        Category::Science,
        Category::Technology,
        Category::History,
        Category::Biography,
        Category::Children,
        Category::Textbook,
        Category::Reference,
        Category::NonFiction,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ── CustomerType ──────────────────────────────────────────────────────────────

/// Customer segment.  Determines the standing discount and the budget range
/// a generated customer draws from.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CustomerType {
    Regular,
    Premium,
    Student,
    Senior,
}

impl CustomerType {
    pub const ALL: [CustomerType; 4] = [
        CustomerType::Regular,
        CustomerType::Premium,
        CustomerType::Student,
        CustomerType::Senior,
    ];

    /// Standing discount in basis points.
    pub fn discount_bps(self) -> u32 {
        match self {
            CustomerType::Regular => 500,
            CustomerType::Premium => 1_500,
            CustomerType::Student => 1_000,
            CustomerType::Senior  => 1_200,
        }
    }

    /// Inclusive budget range for generated customers.
    pub fn budget_range(self) -> (Money, Money) {
        let (lo, hi) = match self {
            CustomerType::Regular => (50, 200),
            CustomerType::Premium => (100, 500),
            CustomerType::Student => (20, 100),
            CustomerType::Senior  => (30, 150),
        };
        (Money::from_cents(lo * 100), Money::from_cents(hi * 100))
    }
}

// ── EmployeeRole ──────────────────────────────────────────────────────────────

/// Staff role.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmployeeRole {
    Cashier,
    SalesAssociate,
    Manager,
    InventoryClerk,
    CustomerService,
}

/// Service coefficients of a role.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct RoleProfile {
    /// Ticks a customer-facing task (checkout or assistance) keeps the
    /// employee busy.
    pub service_ticks: u32,
    /// Quality coefficient in `[0, 1]`; scales the satisfaction a customer
    /// gains from the interaction and the employee's rating drift.
    pub quality: f64,
}

impl EmployeeRole {
    /// Round-robin order used when generating staff.
    pub const ROTATION: [EmployeeRole; 5] = [
        EmployeeRole::Cashier,
        EmployeeRole::SalesAssociate,
        EmployeeRole::Manager,
        EmployeeRole::InventoryClerk,
        EmployeeRole::CustomerService,
    ];

    pub fn profile(self) -> RoleProfile {
        let (service_ticks, quality) = match self {
            EmployeeRole::Cashier         => (2, 0.80),
            EmployeeRole::SalesAssociate  => (3, 0.70),
            EmployeeRole::Manager         => (2, 0.90),
            EmployeeRole::InventoryClerk  => (4, 0.60),
            EmployeeRole::CustomerService => (3, 0.75),
        };
        RoleProfile { service_ticks, quality }
    }

    /// May ring up a purchase.
    pub fn can_checkout(self) -> bool {
        !matches!(self, EmployeeRole::CustomerService)
    }

    /// May answer a help request.
    pub fn can_assist(self) -> bool {
        !matches!(self, EmployeeRole::Cashier)
    }

    /// May service a restock request.
    pub fn can_restock(self) -> bool {
        matches!(self, EmployeeRole::InventoryClerk | EmployeeRole::Manager)
    }
}

impl fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
